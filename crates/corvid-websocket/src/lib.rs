//! WebSocket client/application state machine (SPEC_FULL §4.6), grounded on
//! `examples/original_source/blacksheep/server/websocket.py`.
//!
//! The crate is transport-agnostic: a host adapter implements [`Transport`]
//! over its own send/receive channels (or, in tests, over an in-memory
//! queue) and hands it to [`WebSocket::new`].

pub mod error;
pub mod message;
pub mod socket;
pub mod state;
pub mod transport;

pub use error::{Result, WebSocketError};
pub use message::{IncomingMessage, MessageData, MessageMode, OutgoingMessage};
pub use socket::WebSocket;
pub use state::{Party, WebSocketState};
pub use transport::Transport;
