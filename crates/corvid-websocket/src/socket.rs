//! [`WebSocket`]: the accept/receive/send/close state machine, grounded on
//! `examples/original_source/blacksheep/server/websocket.py`'s `WebSocket`
//! class. Where the source asserts and lets the interpreter raise
//! `AssertionError`, this returns a typed [`WebSocketError::InvalidState`]
//! (SPEC_FULL §4.6, REDESIGN FLAGS "exceptions-for-control-flow").

use std::collections::HashMap;

use corvid_core::request::Scope;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, WebSocketError};
use crate::message::{IncomingMessage, MessageData, MessageMode, OutgoingMessage};
use crate::state::{Party, WebSocketState};
use crate::transport::Transport;

/// One WebSocket exchange: the ASGI scope, the path parameters the router
/// matched, and the two state machines tracking how far the handshake and
/// teardown have progressed.
pub struct WebSocket<T: Transport> {
	pub scope: Scope,
	pub route_params: HashMap<String, String>,
	transport: T,
	client_state: WebSocketState,
	application_state: WebSocketState,
}

impl<T: Transport> WebSocket<T> {
	pub fn new(scope: Scope, route_params: HashMap<String, String>, transport: T) -> Self {
		Self {
			scope,
			route_params,
			transport,
			client_state: WebSocketState::Connecting,
			application_state: WebSocketState::Connecting,
		}
	}

	pub fn client_state(&self) -> WebSocketState {
		self.client_state
	}

	pub fn application_state(&self) -> WebSocketState {
		self.application_state
	}

	fn require_client(&self, expected: WebSocketState) -> Result<()> {
		if self.client_state == expected {
			Ok(())
		} else {
			Err(WebSocketError::InvalidState {
				expected,
				current: self.client_state,
				party: Party::Client,
			})
		}
	}

	fn require_application(&self, expected: WebSocketState) -> Result<()> {
		if self.application_state == expected {
			Ok(())
		} else {
			Err(WebSocketError::InvalidState {
				expected,
				current: self.application_state,
				party: Party::Application,
			})
		}
	}

	/// Awaits the initial `websocket.connect` event, moving the client side
	/// to CONNECTED. Called internally by [`Self::accept`]; exposed for
	/// callers that need to split connect from accept (e.g. to inspect the
	/// scope before deciding whether to accept at all).
	pub async fn connect(&mut self) -> Result<()> {
		match self.transport.receive().await? {
			IncomingMessage::Connect => {
				self.client_state = WebSocketState::Connected;
				Ok(())
			}
			other => Err(unexpected("websocket.connect", &other)),
		}
	}

	/// Completes the handshake: awaits `websocket.connect` (if not already
	/// connected), then sends `websocket.accept`.
	pub async fn accept(&mut self, headers: Vec<(String, String)>, subprotocol: Option<String>) -> Result<()> {
		self.require_client(WebSocketState::Connecting)?;
		self.connect().await?;

		self.transport.send(OutgoingMessage::Accept { headers, subprotocol }).await?;
		self.application_state = WebSocketState::Connected;
		Ok(())
	}

	pub async fn receive(&mut self) -> Result<MessageData> {
		self.require_application(WebSocketState::Connected)?;

		match self.transport.receive().await? {
			IncomingMessage::Receive(data) => Ok(data),
			IncomingMessage::Disconnect { code } => {
				self.client_state = WebSocketState::Disconnected;
				self.application_state = WebSocketState::Disconnected;
				Err(WebSocketError::Disconnect { code })
			}
			other => Err(unexpected("websocket.receive", &other)),
		}
	}

	pub async fn receive_text(&mut self) -> Result<String> {
		match self.receive().await? {
			MessageData::Text(text) => Ok(text),
			MessageData::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
		}
	}

	pub async fn receive_bytes(&mut self) -> Result<bytes::Bytes> {
		match self.receive().await? {
			MessageData::Bytes(bytes) => Ok(bytes),
			MessageData::Text(text) => Ok(bytes::Bytes::from(text.into_bytes())),
		}
	}

	pub async fn receive_json<D: DeserializeOwned>(&mut self, mode: MessageMode) -> Result<D> {
		let raw = match mode {
			MessageMode::Text => self.receive_text().await?,
			MessageMode::Bytes => String::from_utf8_lossy(&self.receive_bytes().await?).into_owned(),
		};
		serde_json::from_str(&raw).map_err(|err| WebSocketError::UnexpectedMessage {
			expected: "json body",
			got: err.to_string(),
		})
	}

	pub async fn send(&mut self, data: MessageData) -> Result<()> {
		self.require_client(WebSocketState::Connected)?;
		self.transport.send(OutgoingMessage::Send(data)).await
	}

	pub async fn send_text(&mut self, data: impl Into<String>) -> Result<()> {
		self.send(MessageData::Text(data.into())).await
	}

	pub async fn send_bytes(&mut self, data: impl Into<bytes::Bytes>) -> Result<()> {
		self.send(MessageData::Bytes(data.into())).await
	}

	pub async fn send_json<S: Serialize + Sync>(&mut self, data: &S, mode: MessageMode) -> Result<()> {
		let text = serde_json::to_string(data).map_err(|err| WebSocketError::UnexpectedMessage {
			expected: "serializable json body",
			got: err.to_string(),
		})?;
		match mode {
			MessageMode::Text => self.send_text(text).await,
			MessageMode::Bytes => self.send_bytes(text.into_bytes()).await,
		}
	}

	pub async fn close(&mut self, code: u16) -> Result<()> {
		self.transport.send(OutgoingMessage::Close { code }).await
	}
}

fn unexpected(expected: &'static str, got: &IncomingMessage) -> WebSocketError {
	let got = match got {
		IncomingMessage::Connect => "websocket.connect",
		IncomingMessage::Receive(_) => "websocket.receive",
		IncomingMessage::Disconnect { .. } => "websocket.disconnect",
	};
	WebSocketError::UnexpectedMessage { expected, got: got.to_string() }
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::collections::VecDeque;

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
		async fn receive(&mut self) -> Result<IncomingMessage> {
			Ok(self.incoming.pop_front().expect("test transport ran out of messages"))
		}

		async fn send(&mut self, message: OutgoingMessage) -> Result<()> {
			self.sent.push(message);
			Ok(())
		}
	}

	fn socket(incoming: Vec<IncomingMessage>) -> WebSocket<QueueTransport> {
		WebSocket::new(Scope::default(), HashMap::new(), QueueTransport::new(incoming))
	}

	#[tokio::test]
	async fn accept_drives_both_sides_to_connected() {
		let mut ws = socket(vec![IncomingMessage::Connect]);
		ws.accept(Vec::new(), None).await.unwrap();
		assert_eq!(ws.client_state(), WebSocketState::Connected);
		assert_eq!(ws.application_state(), WebSocketState::Connected);
		assert_eq!(ws.transport.sent.len(), 1);
	}

	#[tokio::test]
	async fn receive_before_accept_is_an_invalid_state_error() {
		let mut ws = socket(vec![]);
		let err = ws.receive().await.unwrap_err();
		assert_eq!(
			err,
			WebSocketError::InvalidState {
				expected: WebSocketState::Connected,
				current: WebSocketState::Connecting,
				party: Party::Application,
			}
		);
	}

	#[tokio::test]
	async fn disconnect_event_moves_both_sides_to_disconnected() {
		let mut ws = socket(vec![IncomingMessage::Connect, IncomingMessage::Disconnect { code: 1000 }]);
		ws.accept(Vec::new(), None).await.unwrap();
		let err = ws.receive().await.unwrap_err();
		assert_eq!(err, WebSocketError::Disconnect { code: 1000 });
		assert_eq!(ws.client_state(), WebSocketState::Disconnected);
		assert_eq!(ws.application_state(), WebSocketState::Disconnected);
	}

	#[tokio::test]
	async fn echoes_text_after_accepting() {
		let mut ws = socket(vec![IncomingMessage::Connect, IncomingMessage::Receive(MessageData::Text("hi".to_string()))]);
		ws.accept(Vec::new(), None).await.unwrap();
		let text = ws.receive_text().await.unwrap();
		ws.send_text(text.clone()).await.unwrap();
		assert_eq!(text, "hi");
		assert_eq!(ws.transport.sent.last(), Some(&OutgoingMessage::Send(MessageData::Text("hi".to_string()))));
	}

	#[tokio::test]
	async fn send_before_accept_is_an_invalid_state_error() {
		let mut ws = socket(vec![]);
		let err = ws.send_text("too soon").await.unwrap_err();
		assert_eq!(
			err,
			WebSocketError::InvalidState {
				expected: WebSocketState::Connected,
				current: WebSocketState::Connecting,
				party: Party::Client,
			}
		);
	}

	#[tokio::test]
	async fn json_round_trips_through_text_mode() {
		#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
		struct Ping {
			n: u32,
		}

		let mut ws = socket(vec![IncomingMessage::Connect, IncomingMessage::Receive(MessageData::Text("{\"n\":7}".to_string()))]);
		ws.accept(Vec::new(), None).await.unwrap();
		let ping: Ping = ws.receive_json(MessageMode::Text).await.unwrap();
		assert_eq!(ping, Ping { n: 7 });
		ws.send_json(&ping, MessageMode::Text).await.unwrap();
	}

	#[tokio::test]
	async fn close_sends_the_close_message_regardless_of_state() {
		let mut ws = socket(vec![]);
		ws.close(1001).await.unwrap();
		assert_eq!(ws.transport.sent, vec![OutgoingMessage::Close { code: 1001 }]);
	}
}
