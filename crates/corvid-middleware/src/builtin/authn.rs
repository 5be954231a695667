//! Runs the configured [`AuthenticationBackend`]s in order and attaches the
//! first successful [`Identity`] to the request (SPEC_FULL §4.4 AUTHN,
//! §4.6). `Ok(None)` tries the next backend; every backend declining leaves
//! `request.identity` unset rather than failing the request outright, since
//! anonymous access is a matter for the AUTHZ stage, not AUTHN.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_auth::{AuthenticationBackend, AuthenticationError};
use corvid_core::exception::{Error, Result};
use corvid_core::request::Identity;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

pub struct AuthenticationMiddleware {
	backends: Vec<Arc<dyn AuthenticationBackend>>,
}

impl AuthenticationMiddleware {
	pub fn new(backends: Vec<Arc<dyn AuthenticationBackend>>) -> Self {
		Self { backends }
	}
}

#[async_trait]
impl Middleware for AuthenticationMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		for backend in &self.backends {
			match backend.authenticate(&request).await {
				Ok(Some(user)) => {
					let mut claims = std::collections::HashMap::new();
					claims.insert("sub".to_string(), user.id());
					claims.insert("username".to_string(), user.username().to_string());
					request.identity = Some(Identity {
						claims,
						scheme: Some(backend.scheme().to_string()),
					});
					break;
				}
				Ok(None) => continue,
				Err(AuthenticationError::NotAuthenticated) => continue,
				Err(err) => {
					return Err(Error::AuthenticateChallenge {
						scheme: backend.scheme().to_string(),
						realm: None,
						parameters: vec![("error_description".to_string(), err.to_string())],
					});
				}
			}
		}
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use corvid_auth::core::SimpleUser;
	use http::{HeaderMap, Method, Uri, Version};

	struct AlwaysUser;

	#[async_trait]
	impl AuthenticationBackend for AlwaysUser {
		fn scheme(&self) -> &'static str {
			"Test"
		}

		async fn authenticate(&self, _request: &Request) -> std::result::Result<Option<Box<dyn corvid_auth::core::User>>, AuthenticationError> {
			Ok(Some(Box::new(SimpleUser {
				id: uuid::Uuid::new_v4(),
				username: "alice".to_string(),
				email: "alice@example.com".to_string(),
				is_active: true,
				is_admin: false,
				is_staff: false,
				is_superuser: false,
			})))
		}
	}

	struct NeverUser;

	#[async_trait]
	impl AuthenticationBackend for NeverUser {
		fn scheme(&self) -> &'static str {
			"Never"
		}

		async fn authenticate(&self, _request: &Request) -> std::result::Result<Option<Box<dyn corvid_auth::core::User>>, AuthenticationError> {
			Ok(None)
		}
	}

	fn request() -> Request {
		Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, HeaderMap::new(), bytes::Bytes::new())
	}

	#[tokio::test]
	async fn first_successful_backend_wins() {
		let middleware = AuthenticationMiddleware::new(vec![Arc::new(NeverUser), Arc::new(AlwaysUser)]);
		let next = Arc::new(|req: Request| async move {
			assert!(req.identity.is_some());
			assert_eq!(req.identity.unwrap().scheme.as_deref(), Some("Test"));
			Ok(Response::ok())
		});
		middleware.process(request(), next).await.unwrap();
	}

	#[tokio::test]
	async fn no_backend_leaves_identity_unset() {
		let middleware = AuthenticationMiddleware::new(vec![Arc::new(NeverUser)]);
		let next = Arc::new(|req: Request| async move {
			assert!(req.identity.is_none());
			Ok(Response::ok())
		});
		middleware.process(request(), next).await.unwrap();
	}
}
