//! Maps `Error` to `Response`. A handler-registered override preempts the
//! defaults baked into `corvid_core::response::error_to_response`
//! (SPEC_FULL §4.5/§7).

use std::sync::Arc;

use corvid_core::exception::Error;
use corvid_core::response::{error_to_response, Response};

/// Tried in registration order before the default mapping. Returning `None`
/// declines the error and lets the next handler (or the default) take it.
pub type ExceptionHandler = Arc<dyn Fn(&Error) -> Option<Response> + Send + Sync>;

#[derive(Default, Clone)]
pub struct ExceptionHandlerRegistry {
	handlers: Vec<ExceptionHandler>,
	show_error_details: bool,
}

impl ExceptionHandlerRegistry {
	pub fn new(show_error_details: bool) -> Self {
		Self {
			handlers: Vec::new(),
			show_error_details,
		}
	}

	pub fn register(&mut self, handler: ExceptionHandler) {
		self.handlers.push(handler);
	}

	/// Runs registered handlers in order, falling back to the default
	/// status/body mapping when none of them claim the error.
	pub fn resolve(&self, error: &Error) -> Response {
		for handler in &self.handlers {
			if let Some(response) = handler(error) {
				return response;
			}
		}
		error_to_response(error, self.show_error_details)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::StatusCode;

	#[test]
	fn falls_back_to_the_default_mapping() {
		let registry = ExceptionHandlerRegistry::new(false);
		let response = registry.resolve(&Error::NotFound("cats".into()));
		assert_eq!(response.status, StatusCode::NOT_FOUND);
	}

	#[test]
	fn a_registered_handler_preempts_the_default() {
		let mut registry = ExceptionHandlerRegistry::new(false);
		registry.register(Arc::new(|error: &Error| match error {
			Error::RateLimitExceeded => Some(Response::ok().with_body(bytes::Bytes::from_static(b"slow down"))),
			_ => None,
		}));
		let response = registry.resolve(&Error::RateLimitExceeded);
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body(), &bytes::Bytes::from_static(b"slow down"));
	}

	#[test]
	fn a_handler_that_declines_falls_through_to_the_next() {
		let mut registry = ExceptionHandlerRegistry::new(false);
		registry.register(Arc::new(|_: &Error| None));
		let response = registry.resolve(&Error::Forbidden("no".into()));
		assert_eq!(response.status, StatusCode::FORBIDDEN);
	}
}
