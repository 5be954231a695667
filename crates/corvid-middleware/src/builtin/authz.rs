//! Evaluates a configured [`AuthorizationStrategy`] policy against whatever
//! [`Identity`] the AUTHN stage attached (SPEC_FULL §4.4 AUTHZ, §4.6).
//!
//! Per-route policy/role markers are not modeled on [`corvid_router::Route`]
//! yet (see DESIGN.md); until the root facade grows that attachment point,
//! one middleware instance enforces one fixed policy name, which is enough
//! to guard a whole router mount at a uniform access level.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_auth::AuthorizationStrategy;
use corvid_core::exception::Result;
use corvid_core::request::Identity;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

pub struct AuthorizationMiddleware {
	strategy: Arc<AuthorizationStrategy>,
	policy_name: Option<String>,
	roles: Vec<String>,
}

impl AuthorizationMiddleware {
	pub fn new(strategy: Arc<AuthorizationStrategy>, policy_name: Option<impl Into<String>>) -> Self {
		Self {
			strategy,
			policy_name: policy_name.map(Into::into),
			roles: Vec::new(),
		}
	}

	pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.roles = roles.into_iter().map(Into::into).collect();
		self
	}
}

#[async_trait]
impl Middleware for AuthorizationMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let identity = request.identity.clone().unwrap_or_default();
		let roles = if self.roles.is_empty() { None } else { Some(self.roles.as_slice()) };
		self.strategy.authorize(self.policy_name.as_deref(), &identity, roles).await?;
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use corvid_auth::authorization::{AuthenticatedRequirement, Policy};
	use http::{HeaderMap, Method, Uri, Version};

	fn request(identity: Option<Identity>) -> Request {
		let mut request = Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, HeaderMap::new(), bytes::Bytes::new());
		request.identity = identity;
		request
	}

	async fn ok(_req: Request) -> Result<Response> {
		Ok(Response::ok())
	}

	fn authenticated_only() -> AuthorizationStrategy {
		let mut strategy = AuthorizationStrategy::new();
		strategy.add(Policy::new("strict").with_requirement(Arc::new(AuthenticatedRequirement)));
		strategy
	}

	#[tokio::test]
	async fn unauthenticated_identity_is_rejected_by_strict_policy() {
		let middleware = AuthorizationMiddleware::new(Arc::new(authenticated_only()), Some("strict"));
		let response = middleware.process(request(None), Arc::new(ok)).await;
		assert!(response.is_err());
	}

	#[tokio::test]
	async fn authenticated_identity_passes_strict_policy() {
		let middleware = AuthorizationMiddleware::new(Arc::new(authenticated_only()), Some("strict"));
		let identity = Identity {
			claims: Default::default(),
			scheme: Some("Test".to_string()),
		};
		let response = middleware.process(request(Some(identity)), Arc::new(ok)).await;
		assert!(response.is_ok());
	}

	#[tokio::test]
	async fn default_policy_permits_anonymous_access() {
		let middleware = AuthorizationMiddleware::new(Arc::new(AuthorizationStrategy::new()), None::<String>);
		let response = middleware.process(request(None), Arc::new(ok)).await;
		assert!(response.is_ok());
	}
}
