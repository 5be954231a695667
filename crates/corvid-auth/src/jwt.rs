//! JWT bearer authentication.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use corvid_core::exception::{Error, Result};
use corvid_core::Request;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthenticationBackend, AuthenticationError, SimpleUser, User};

/// Registered + application claims carried by a token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub sub: String,
	pub exp: i64,
	pub iat: i64,
	pub username: String,
}

impl Claims {
	/// Creates new claims for `user_id`/`username`, expiring after `expires_in`.
	///
	/// # Examples
	///
	/// ```
	/// use corvid_auth::Claims;
	/// use chrono::Duration;
	///
	/// let claims = Claims::new("user123".to_string(), "john_doe".to_string(), Duration::hours(24));
	/// assert_eq!(claims.sub, "user123");
	/// assert!(claims.exp > claims.iat);
	/// ```
	pub fn new(user_id: String, username: String, expires_in: Duration) -> Self {
		let now = Utc::now();
		Self {
			sub: user_id,
			username,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
		}
	}

	pub fn is_expired(&self) -> bool {
		Utc::now().timestamp() > self.exp
	}
}

/// Encodes and verifies HS256 JWTs against a single shared secret.
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
}

impl JwtAuth {
	pub fn new(secret: &[u8]) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation: Validation::default(),
		}
	}

	pub fn encode(&self, claims: &Claims) -> Result<String> {
		encode(&Header::default(), claims, &self.encoding_key)
			.map_err(|e| Error::Authentication(e.to_string()))
	}

	pub fn decode(&self, token: &str) -> Result<Claims> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| Error::Authentication(e.to_string()))
	}

	/// Generates a token for `user_id`/`username` with a 24-hour expiration.
	pub fn generate_token(&self, user_id: String, username: String) -> Result<String> {
		let claims = Claims::new(user_id, username, Duration::hours(24));
		self.encode(&claims)
	}

	/// Decodes `token` and rejects it if its expiration has passed.
	pub fn verify_token(&self, token: &str) -> Result<Claims> {
		let claims = self.decode(token)?;
		if claims.is_expired() {
			return Err(Error::Authentication("token expired".to_string()));
		}
		Ok(claims)
	}
}

#[async_trait]
impl AuthenticationBackend for JwtAuth {
	fn scheme(&self) -> &'static str {
		"Bearer"
	}

	async fn authenticate(&self, request: &Request) -> Result<Option<Box<dyn User>>, AuthenticationError> {
		let Some(header) = request.header("authorization") else {
			return Ok(None);
		};
		let Some(token) = header.strip_prefix("Bearer ") else {
			return Ok(None);
		};

		match self.verify_token(token) {
			Ok(claims) => Ok(Some(Box::new(SimpleUser {
				id: Uuid::parse_str(&claims.sub).unwrap_or_else(|_| Uuid::new_v4()),
				username: claims.username.clone(),
				email: format!("{}@example.com", claims.username),
				is_active: true,
				is_admin: false,
				is_staff: false,
				is_superuser: false,
			}))),
			Err(_) => Err(AuthenticationError::InvalidToken),
		}
	}
}
