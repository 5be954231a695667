//! API key authentication: a static or provider-sourced secret checked
//! against a header, query parameter, or cookie, grounded on
//! `examples/original_source/blacksheep/server/authentication/apikey.py`.

use async_trait::async_trait;
use corvid_core::Request;

use crate::{AuthenticationBackend, AuthenticationError, SimpleUser, User};

/// Where the caller is expected to place the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
	Header,
	Query,
	Cookie,
}

/// API key authentication backend.
///
/// Holds a single static secret; the referenced implementation supports
/// pluggable secret providers (e.g. rotating keys) but a fixed secret is the
/// common case and is what's implemented here.
pub struct ApiKeyAuthentication {
	scheme: &'static str,
	key_name: String,
	location: ApiKeyLocation,
	secret: String,
}

impl ApiKeyAuthentication {
	pub fn new(scheme: &'static str, key_name: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			scheme,
			key_name: key_name.into(),
			location: ApiKeyLocation::Header,
			secret: secret.into(),
		}
	}

	pub fn with_location(mut self, location: ApiKeyLocation) -> Self {
		self.location = location;
		self
	}

	fn extract_key(&self, request: &Request) -> Option<String> {
		match self.location {
			ApiKeyLocation::Header => request.header(&self.key_name).map(|v| v.to_string()),
			ApiKeyLocation::Query => request
				.query()
				.get(&self.key_name)
				.and_then(|values| values.last())
				.cloned(),
			ApiKeyLocation::Cookie => request.cookies().get(&self.key_name).cloned(),
		}
	}

	/// Constant-time comparison; a static key compared with `==` would leak
	/// timing information proportional to the matching prefix length.
	fn keys_match(&self, candidate: &str) -> bool {
		let expected = self.secret.as_bytes();
		let given = candidate.as_bytes();
		if expected.len() != given.len() {
			return false;
		}
		let mut diff = 0u8;
		for (a, b) in expected.iter().zip(given.iter()) {
			diff |= a ^ b;
		}
		diff == 0
	}
}

#[async_trait]
impl AuthenticationBackend for ApiKeyAuthentication {
	fn scheme(&self) -> &'static str {
		self.scheme
	}

	async fn authenticate(&self, request: &Request) -> Result<Option<Box<dyn User>>, AuthenticationError> {
		let Some(candidate) = self.extract_key(request) else {
			return Ok(None);
		};

		if self.keys_match(&candidate) {
			Ok(Some(Box::new(SimpleUser {
				id: uuid::Uuid::nil(),
				username: self.scheme.to_string(),
				email: String::new(),
				is_active: true,
				is_admin: false,
				is_staff: false,
				is_superuser: false,
			})))
		} else {
			Err(AuthenticationError::InvalidCredentials)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use http::{HeaderMap, Method, Uri, Version};

	fn request_with_header(name: &str, value: &str) -> Request {
		let mut headers = HeaderMap::new();
		headers.insert(
			http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
			value.parse().unwrap(),
		);
		Request::new(
			Method::GET,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			headers,
			Bytes::new(),
		)
	}

	#[tokio::test]
	async fn accepts_matching_header_key() {
		let backend = ApiKeyAuthentication::new("ApiKey", "X-Api-Key", "secret-value");
		let request = request_with_header("X-Api-Key", "secret-value");
		let user = backend.authenticate(&request).await.unwrap();
		assert!(user.is_some());
	}

	#[tokio::test]
	async fn rejects_mismatched_key() {
		let backend = ApiKeyAuthentication::new("ApiKey", "X-Api-Key", "secret-value");
		let request = request_with_header("X-Api-Key", "wrong");
		let err = backend.authenticate(&request).await.unwrap_err();
		assert_eq!(err, AuthenticationError::InvalidCredentials);
	}

	#[tokio::test]
	async fn missing_key_falls_through_to_next_backend() {
		let backend = ApiKeyAuthentication::new("ApiKey", "X-Api-Key", "secret-value");
		let request = Request::new(
			Method::GET,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		);
		let user = backend.authenticate(&request).await.unwrap();
		assert!(user.is_none());
	}
}
