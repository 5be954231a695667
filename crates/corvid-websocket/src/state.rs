//! The two parallel state machines a WebSocket exchange carries (SPEC_FULL
//! §4.6), grounded on `examples/original_source/blacksheep/server/websocket.py`'s
//! `WebSocketState` enum and its `client_state`/`application_state` pair.

/// One side's position in the connection lifecycle. The client side tracks
/// what the peer has told us; the application side tracks what we've told
/// the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebSocketState {
	Connecting,
	Connected,
	Disconnected,
}

impl std::fmt::Display for WebSocketState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let label = match self {
			WebSocketState::Connecting => "CONNECTING",
			WebSocketState::Connected => "CONNECTED",
			WebSocketState::Disconnected => "DISCONNECTED",
		};
		f.write_str(label)
	}
}

/// Which side an [`InvalidWebSocketStateError`] was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
	Client,
	Application,
}

impl std::fmt::Display for Party {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let label = match self {
			Party::Client => "client",
			Party::Application => "application",
		};
		f.write_str(label)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn states_compare_by_value() {
		assert_eq!(WebSocketState::Connecting, WebSocketState::Connecting);
		assert_ne!(WebSocketState::Connecting, WebSocketState::Connected);
	}

	#[test]
	fn displays_the_asgi_style_uppercase_name() {
		assert_eq!(WebSocketState::Connected.to_string(), "CONNECTED");
		assert_eq!(Party::Application.to_string(), "application");
	}
}
