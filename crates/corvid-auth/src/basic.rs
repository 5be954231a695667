//! HTTP Basic Authentication.
//!
//! Passwords are hashed with Argon2id on storage and verified using the
//! constant-time comparison built into the `argon2` crate.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use corvid_core::Request;
use uuid::Uuid;

use crate::core::hasher::{Argon2Hasher, PasswordHasher};
use crate::{AuthenticationBackend, AuthenticationError, SimpleUser, User};

/// Basic Authentication backend holding an in-memory username -> password
/// hash table. Applications with a real user store implement
/// [`AuthenticationBackend`] directly rather than populating this one.
pub struct BasicAuthentication {
	users: HashMap<String, String>,
	hasher: Argon2Hasher,
}

impl BasicAuthentication {
	/// Creates a new `BasicAuthentication` backend with no users.
	///
	/// # Examples
	///
	/// ```
	/// use corvid_auth::{HttpBasicAuth, AuthenticationBackend};
	/// use bytes::Bytes;
	/// use corvid_core::Request;
	/// use http::{HeaderMap, Method, Uri, Version};
	///
	/// # async fn example() {
	/// let auth = HttpBasicAuth::new();
	/// let request = Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, HeaderMap::new(), Bytes::new());
	///
	/// let result = auth.authenticate(&request).await.unwrap();
	/// assert!(result.is_none());
	/// # }
	/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
	/// ```
	pub fn new() -> Self {
		Self {
			users: HashMap::new(),
			hasher: Argon2Hasher::new(),
		}
	}

	/// Adds a user with the given username and password. The password is
	/// hashed with Argon2id before storage.
	///
	/// # Panics
	///
	/// Panics if password hashing fails (should not happen in practice).
	pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
		let hash = self
			.hasher
			.hash(&password.into())
			.expect("argon2 hashing should not fail");
		self.users.insert(username.into(), hash);
	}

	fn parse_auth_header(&self, header: &str) -> Option<(String, String)> {
		let encoded = header.strip_prefix("Basic ")?;
		let decoded = STANDARD.decode(encoded).ok()?;
		let decoded_str = String::from_utf8(decoded).ok()?;
		let (username, password) = decoded_str.split_once(':')?;
		Some((username.to_string(), password.to_string()))
	}
}

impl Default for BasicAuthentication {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AuthenticationBackend for BasicAuthentication {
	fn scheme(&self) -> &'static str {
		"Basic"
	}

	async fn authenticate(&self, request: &Request) -> Result<Option<Box<dyn User>>, AuthenticationError> {
		let Some(header) = request.header("authorization") else {
			return Ok(None);
		};
		let Some((username, password)) = self.parse_auth_header(header) else {
			return Ok(None);
		};

		let Some(stored_hash) = self.users.get(&username) else {
			return Err(AuthenticationError::InvalidCredentials);
		};

		if self.hasher.verify(&password, stored_hash).unwrap_or(false) {
			Ok(Some(Box::new(SimpleUser {
				id: Uuid::new_v4(),
				username: username.clone(),
				email: format!("{username}@example.com"),
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
