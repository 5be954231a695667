//! First-match-wins path routing for WebSocket handlers (SPEC_FULL §4.5's
//! `"websocket"` scope dispatch), built on the same [`corvid_router`] pattern
//! compiler the HTTP router uses rather than a separate matcher.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_router::{compile_pattern, CompiledPattern};
use corvid_websocket::{Transport, WebSocket};

/// A WebSocket endpoint. Erased over [`Transport`] the same way
/// `corvid_core::Handler` erases over the HTTP body, so one router can hold
/// handlers built against any host adapter.
#[async_trait]
pub trait WebSocketHandler: Send + Sync {
	async fn handle(&self, socket: WebSocket<Box<dyn Transport>>) -> Result<()>;
}

#[async_trait]
impl<F, Fut> WebSocketHandler for F
where
	F: Fn(WebSocket<Box<dyn Transport>>) -> Fut + Send + Sync,
	Fut: std::future::Future<Output = Result<()>> + Send,
{
	async fn handle(&self, socket: WebSocket<Box<dyn Transport>>) -> Result<()> {
		(self)(socket).await
	}
}

struct WebSocketRoute {
	pattern: CompiledPattern,
	handler: Arc<dyn WebSocketHandler>,
}

/// Registered once at startup, read concurrently afterwards (same
/// shared-resource policy as the HTTP router, SPEC_FULL §5).
#[derive(Default)]
pub struct WebSocketRouter {
	routes: Vec<WebSocketRoute>,
}

impl WebSocketRouter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, pattern: &str, handler: Arc<dyn WebSocketHandler>) -> Result<()> {
		let pattern = compile_pattern(pattern)?;
		self.routes.push(WebSocketRoute { pattern, handler });
		Ok(())
	}

	/// First pattern that matches `path` wins, mirroring `DefaultRouter`'s
	/// registration-order precedence.
	fn find_match(&self, path: &str) -> Option<(Arc<dyn WebSocketHandler>, HashMap<String, String>)> {
		self.routes.iter().find_map(|route| {
			route
				.pattern
				.matches(path)
				.map(|params| (route.handler.clone(), params))
		})
	}

	pub async fn dispatch(&self, scope: corvid_core::Scope, path: &str, transport: Box<dyn Transport>) -> Result<()> {
		match self.find_match(path) {
			Some((handler, params)) => {
				let socket = WebSocket::new(scope, params, transport);
				handler.handle(socket).await.map_err(websocket_error_to_core)
			}
			None => {
				let mut socket = WebSocket::new(scope, HashMap::new(), transport);
				let _ = socket.close(1000).await;
				Err(Error::RouteNotFound)
			}
		}
	}
}

fn websocket_error_to_core(error: corvid_websocket::WebSocketError) -> Error {
	Error::internal(error)
}

#[cfg(test)]
mod tests {
	use super::*;
	use corvid_websocket::{IncomingMessage, MessageData, OutgoingMessage};
	use std::collections::VecDeque;

	#[derive(Default)]
	struct QueueTransport {
		incoming: VecDeque<IncomingMessage>,
		sent: Vec<OutgoingMessage>,
	}

	impl QueueTransport {
		fn new(incoming: Vec<IncomingMessage>) -> Self {
			Self {
				incoming: incoming.into(),
				sent: Vec::new(),
			}
		}
	}

	#[async_trait]
	impl Transport for QueueTransport {
		async fn receive(&mut self) -> corvid_websocket::Result<IncomingMessage> {
			Ok(self.incoming.pop_front().expect("test transport ran out of messages"))
		}

		async fn send(&mut self, message: OutgoingMessage) -> corvid_websocket::Result<()> {
			self.sent.push(message);
			Ok(())
		}
	}

	async fn echo_once(mut socket: WebSocket<Box<dyn Transport>>) -> Result<()> {
		socket.accept(Vec::new(), None).await.map_err(websocket_error_to_core)?;
		let text = socket.receive_text().await.map_err(websocket_error_to_core)?;
		socket.send_text(text).await.map_err(websocket_error_to_core)?;
		Ok(())
	}

	#[tokio::test]
	async fn dispatches_to_the_first_matching_route() {
		let mut router = WebSocketRouter::new();
		router.add("/ws/{room}", Arc::new(echo_once)).unwrap();

		let transport: Box<dyn Transport> = Box::new(QueueTransport::new(vec![
			IncomingMessage::Connect,
			IncomingMessage::Receive(MessageData::Text("hi".to_string())),
		]));
		let outcome = router.dispatch(corvid_core::Scope::default(), "/ws/lobby", transport).await;
		assert!(outcome.is_ok());
	}

	#[tokio::test]
	async fn an_unmatched_path_closes_without_accepting() {
		let router = WebSocketRouter::new();
		let transport: Box<dyn Transport> = Box::new(QueueTransport::new(vec![]));
		let outcome = router.dispatch(corvid_core::Scope::default(), "/missing", transport).await;
		assert!(matches!(outcome, Err(Error::RouteNotFound)));
	}
}
