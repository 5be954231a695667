//! The host-server boundary a [`crate::WebSocket`] drives. A real server
//! adapter implements this over its ASGI-equivalent send/receive channels;
//! tests implement it over an in-memory queue (see `socket.rs`'s test
//! module).

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{IncomingMessage, OutgoingMessage};

#[async_trait]
pub trait Transport: Send {
	async fn receive(&mut self) -> Result<IncomingMessage>;
	async fn send(&mut self, message: OutgoingMessage) -> Result<()>;
}

/// Lets a router keyed on a single concrete type hold any transport behind
/// one `WebSocket<Box<dyn Transport>>`, the same erasure `corvid_core::Handler`
/// uses for routes.
#[async_trait]
impl Transport for Box<dyn Transport> {
	async fn receive(&mut self) -> Result<IncomingMessage> {
		(**self).receive().await
	}

	async fn send(&mut self, message: OutgoingMessage) -> Result<()> {
		(**self).send(message).await
	}
}
