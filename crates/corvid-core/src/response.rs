//! The `Response` value returned by handlers and middlewares.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::cookie::Cookie;
use crate::exception::{Error, Result};

#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub cookies: Vec<Cookie>,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			cookies: Vec::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	/// Redirect responses are, by definition, any 3xx status (invariant
	/// referenced by the router's `url_for`-based redirect helpers).
	pub fn redirect(location: impl AsRef<str>, status: StatusCode) -> Self {
		debug_assert!(status.is_redirection());
		Self::new(status).with_header("Location", location.as_ref())
	}

	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn set_body(&mut self, body: impl Into<Bytes>) {
		self.body = body.into();
	}

	pub fn body(&self) -> &Bytes {
		&self.body
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			http::HeaderName::from_bytes(name.as_bytes()),
			http::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_cookie(mut self, cookie: Cookie) -> Self {
		self.headers.append(
			"set-cookie",
			http::HeaderValue::from_str(&cookie.to_set_cookie_header()).unwrap(),
		);
		self.cookies.push(cookie);
		self
	}

	pub fn with_json<T: serde::Serialize>(mut self, value: &T) -> Result<Self> {
		let body = serde_json::to_vec(value).map_err(Error::from)?;
		self.body = Bytes::from(body);
		self.headers.insert(
			"content-type",
			http::HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	pub fn text(value: impl Into<String>) -> Self {
		Self::ok()
			.with_header("content-type", "text/plain; charset=utf-8")
			.with_body(Bytes::from(value.into()))
	}

	pub fn html(value: impl Into<String>) -> Self {
		Self::ok()
			.with_header("content-type", "text/html; charset=utf-8")
			.with_body(Bytes::from(value.into()))
	}

	pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
		Self::ok().with_json(value)
	}
}

/// Maps a core error to the response the orchestrator should emit when no
/// user-registered exception handler intercepts it (SPEC_FULL §4.5/§7).
pub fn error_to_response(error: &Error, show_details: bool) -> Response {
	let status = error.status_code();
	let mut response = Response::new(status);
	if let Error::AuthenticateChallenge {
		scheme, realm, parameters,
	} = error
	{
		let mut value = scheme.clone();
		if let Some(realm) = realm {
			value.push_str(&format!(" realm=\"{realm}\""));
		}
		for (k, v) in parameters {
			value.push_str(&format!(", {k}=\"{v}\""));
		}
		response = response.with_header("WWW-Authenticate", &value);
	}
	if let Error::UnauthorizedReason { reason } = error {
		response = response.with_header("Reason", reason);
	}
	let message = if error.is_expected() || show_details {
		error.to_string()
	} else {
		"internal server error".to_string()
	};
	response.with_json(&serde_json::json!({ "error": message })).unwrap_or(response)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_ok_with_body() {
		let response = Response::ok().with_body(Bytes::from("hi"));
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, Bytes::from("hi"));
	}

	#[test]
	fn error_mapping_covers_status_codes() {
		let response = error_to_response(&Error::Forbidden("no".into()), false);
		assert_eq!(response.status, StatusCode::FORBIDDEN);
	}

	#[test]
	fn challenge_emits_www_authenticate() {
		let error = Error::AuthenticateChallenge {
			scheme: "Bearer".to_string(),
			realm: Some("api".to_string()),
			parameters: vec![],
		};
		let response = error_to_response(&error, false);
		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert!(response.headers.get("WWW-Authenticate").is_some());
	}

	#[test]
	fn unauthorized_reason_emits_reason_header() {
		let error = Error::UnauthorizedReason {
			reason: "Missing anti-forgery token cookie".to_string(),
		};
		let response = error_to_response(&error, false);
		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(response.headers.get("Reason").unwrap(), "Missing anti-forgery token cookie");
	}
}
