//! WebSocket-specific errors. Kept separate from
//! [`corvid_core::exception::Error`]: neither variant here maps to an HTTP
//! status, since by the time either fires the exchange has already upgraded
//! past the request/response model (SPEC_FULL §4.6 invariant 9).

use crate::state::{Party, WebSocketState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebSocketError {
	/// The peer sent `websocket.disconnect`; both sides are now
	/// [`WebSocketState::Disconnected`].
	#[error("websocket disconnected with code {code}")]
	Disconnect { code: u16 },

	/// An operation was attempted while a side was in the wrong state, e.g.
	/// `receive()` before `accept()`.
	#[error("invalid websocket state: expected {expected} {party} state, found {current}")]
	InvalidState {
		expected: WebSocketState,
		current: WebSocketState,
		party: Party,
	},

	/// The underlying transport produced something other than the expected
	/// ASGI-style message type for the current operation.
	#[error("unexpected message: expected {expected}, got {got}")]
	UnexpectedMessage { expected: &'static str, got: String },
}

pub type Result<T> = std::result::Result<T, WebSocketError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disconnect_carries_the_close_code() {
		let err = WebSocketError::Disconnect { code: 1001 };
		assert_eq!(err.to_string(), "websocket disconnected with code 1001");
	}

	#[test]
	fn invalid_state_names_expected_current_and_party() {
		let err = WebSocketError::InvalidState {
			expected: WebSocketState::Connected,
			current: WebSocketState::Connecting,
			party: Party::Application,
		};
		assert_eq!(err.to_string(), "invalid websocket state: expected CONNECTED application state, found CONNECTING");
	}
}
