//! The ASGI-style message vocabulary a [`crate::Transport`] exchanges with
//! the host server, grounded on the `message["type"]` dispatch in
//! `examples/original_source/blacksheep/server/websocket.py`.

use bytes::Bytes;

/// Payload carried by a `websocket.receive`/`websocket.send` event. ASGI
/// hosts send exactly one of `text`/`bytes` per message; this enum mirrors
/// that exclusivity instead of an `Option<String>, Option<Bytes>` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageData {
	Text(String),
	Bytes(Bytes),
}

impl MessageData {
	pub fn as_text(&self) -> Option<&str> {
		match self {
			MessageData::Text(text) => Some(text),
			MessageData::Bytes(_) => None,
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		match self {
			MessageData::Text(text) => text.as_bytes(),
			MessageData::Bytes(bytes) => bytes,
		}
	}
}

/// Which half of `(text, bytes)` a `*_json` call should (de)serialize
/// through, mirroring the source's `MessageMode` string enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageMode {
	#[default]
	Text,
	Bytes,
}

/// What the transport hands back from a `receive()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
	Connect,
	Receive(MessageData),
	Disconnect { code: u16 },
}

/// What [`crate::WebSocket`] hands to the transport's `send()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
	Accept {
		headers: Vec<(String, String)>,
		subprotocol: Option<String>,
	},
	Send(MessageData),
	Close {
		code: u16,
	},
}
