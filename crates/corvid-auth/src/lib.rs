//! Authentication schemes (HTTP Basic, JWT bearer, API key) and the
//! authorization policy layer that turns a failed check into a challenge
//! response (SPEC_FULL §4.6).
//!
//! Password hashing uses Argon2id (OWASP's current recommendation); token
//! verification uses `jsonwebtoken`'s constant-time signature checks.

pub mod apikey;
pub mod authorization;
pub mod basic;
pub mod core;
pub mod jwt;

pub use apikey::ApiKeyAuthentication;
pub use authorization::{AuthenticatedRequirement, AuthorizationStrategy, Policy, Requirement, RolesRequirement};
pub use basic::BasicAuthentication as HttpBasicAuth;
pub use core::{AnonymousUser, Argon2Hasher, PasswordHasher, SimpleUser, User};
pub use jwt::{Claims, JwtAuth};

use async_trait::async_trait;
use corvid_core::Request;

/// Errors produced while authenticating a request. Distinct from
/// [`corvid_core::exception::Error`] because "no credentials supplied" is not
/// itself a failure: callers fall through to the next backend on `Ok(None)`
/// and only map to a 401/403 once every backend has been tried.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
	InvalidCredentials,
	UserNotFound,
	InvalidToken,
	NotAuthenticated,
	Unknown(String),
}

impl std::fmt::Display for AuthenticationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AuthenticationError::InvalidCredentials => write!(f, "invalid credentials"),
			AuthenticationError::UserNotFound => write!(f, "user not found"),
			AuthenticationError::InvalidToken => write!(f, "invalid token"),
			AuthenticationError::NotAuthenticated => write!(f, "not authenticated"),
			AuthenticationError::Unknown(msg) => write!(f, "authentication error: {}", msg),
		}
	}
}

impl std::error::Error for AuthenticationError {}

/// A single authentication scheme. Application startup chains several of
/// these; the first to return `Ok(Some(user))` wins, `Ok(None)` tries the
/// next, and `Err` short-circuits with a challenge.
#[async_trait]
pub trait AuthenticationBackend: Send + Sync {
	/// The scheme name sent back in a `WWW-Authenticate` challenge, e.g. `"Basic"`.
	fn scheme(&self) -> &'static str;

	async fn authenticate(&self, request: &Request) -> Result<Option<Box<dyn User>>, AuthenticationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_simple_user_implementation() {
		let user = SimpleUser {
			id: uuid::Uuid::new_v4(),
			username: "testuser".to_string(),
			email: "test@example.com".to_string(),
			is_active: true,
			is_admin: false,
			is_staff: false,
			is_superuser: false,
		};

		assert!(!user.id().is_empty());
		assert_eq!(user.username(), "testuser");
		assert!(user.is_authenticated());
		assert!(user.is_active());
		assert!(!user.is_admin());
	}

	#[test]
	fn test_anonymous_user() {
		let user = AnonymousUser;

		assert_eq!(user.id(), "");
		assert_eq!(user.username(), "");
		assert!(!user.is_authenticated());
		assert!(!user.is_active());
		assert!(!user.is_admin());
	}
}
