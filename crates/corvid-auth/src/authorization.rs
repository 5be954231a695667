//! Authorization policies: named sets of requirements evaluated against the
//! identity attached to a request, grounded on
//! `examples/original_source/blacksheep/server/authorization/__init__.py`.
//!
//! A [`Requirement`] answers a single yes/no question about an identity. A
//! [`Policy`] groups requirements (all must pass). An [`AuthorizationStrategy`]
//! holds named policies plus a default used for handlers that carry no
//! explicit policy name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Error;
use corvid_core::request::Identity;

/// A single authorization check against an [`Identity`].
#[async_trait]
pub trait Requirement: Send + Sync {
	async fn is_satisfied(&self, identity: &Identity) -> bool;
}

/// Requires that the identity carries at least one authentication scheme.
pub struct AuthenticatedRequirement;

#[async_trait]
impl Requirement for AuthenticatedRequirement {
	async fn is_satisfied(&self, identity: &Identity) -> bool {
		identity.is_authenticated()
	}
}

/// Requires that the identity's `roles` claim contains one of the given roles.
pub struct RolesRequirement {
	roles: Vec<String>,
}

impl RolesRequirement {
	pub fn new(roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			roles: roles.into_iter().map(Into::into).collect(),
		}
	}
}

#[async_trait]
impl Requirement for RolesRequirement {
	async fn is_satisfied(&self, identity: &Identity) -> bool {
		let Some(claim) = identity.claims.get("roles") else {
			return false;
		};
		claim.split(',').any(|role| self.roles.iter().any(|r| r == role.trim()))
	}
}

/// A named group of requirements; every requirement must be satisfied.
pub struct Policy {
	pub name: String,
	requirements: Vec<Arc<dyn Requirement>>,
}

impl Policy {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			requirements: Vec::new(),
		}
	}

	pub fn with_requirement(mut self, requirement: Arc<dyn Requirement>) -> Self {
		self.requirements.push(requirement);
		self
	}

	async fn is_satisfied(&self, identity: &Identity) -> bool {
		for requirement in &self.requirements {
			if !requirement.is_satisfied(identity).await {
				return false;
			}
		}
		true
	}
}

/// Registry of named policies plus a default applied to undecorated handlers.
///
/// The default policy has no requirements, matching the referenced
/// implementation's choice to allow anonymous access unless a handler opts
/// into a stricter policy.
pub struct AuthorizationStrategy {
	policies: HashMap<String, Policy>,
	default_policy: Policy,
}

impl AuthorizationStrategy {
	pub fn new() -> Self {
		let mut strategy = Self {
			policies: HashMap::new(),
			default_policy: Policy::new("default"),
		};
		strategy.add(Policy::new("authenticated").with_requirement(Arc::new(AuthenticatedRequirement)));
		strategy
	}

	pub fn add(&mut self, policy: Policy) {
		self.policies.insert(policy.name.clone(), policy);
	}

	pub fn set_default(&mut self, policy: Policy) {
		self.default_policy = policy;
	}

	/// Evaluates `policy_name` (or the default policy, if `None`) plus an
	/// optional sufficient-roles shortcut against `identity`.
	pub async fn authorize(
		&self,
		policy_name: Option<&str>,
		identity: &Identity,
		roles: Option<&[String]>,
	) -> Result<(), Error> {
		if let Some(roles) = roles
			&& !roles.is_empty()
		{
			let requirement = RolesRequirement::new(roles.iter().cloned());
			if requirement.is_satisfied(identity).await {
				return Ok(());
			}
		}

		let policy = match policy_name {
			Some(name) => self
				.policies
				.get(name)
				.ok_or_else(|| Error::Configuration(format!("unknown authorization policy: {name}")))?,
			None => &self.default_policy,
		};

		if policy.is_satisfied(identity).await {
			Ok(())
		} else if identity.is_authenticated() {
			Err(Error::Forbidden(format!(
				"identity does not satisfy policy {}",
				policy.name
			)))
		} else {
			Err(Error::Unauthorized("authentication required".to_string()))
		}
	}
}

impl Default for AuthorizationStrategy {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn identity_with_role(role: &str) -> Identity {
		let mut identity = Identity::default();
		identity.scheme = Some("Bearer".to_string());
		identity.claims.insert("roles".to_string(), role.to_string());
		identity
	}

	#[tokio::test]
	async fn default_policy_rejects_unauthenticated_for_authenticated_check() {
		let strategy = AuthorizationStrategy::new();
		let identity = Identity::default();
		let err = strategy
			.authorize(Some("authenticated"), &identity, None)
			.await
			.unwrap_err();
		assert!(matches!(err, Error::Unauthorized(_)));
	}

	#[tokio::test]
	async fn default_policy_allows_anonymous() {
		let strategy = AuthorizationStrategy::new();
		let identity = Identity::default();
		strategy.authorize(None, &identity, None).await.unwrap();
	}

	#[tokio::test]
	async fn roles_shortcut_grants_access() {
		let strategy = AuthorizationStrategy::new();
		let identity = identity_with_role("admin");
		strategy
			.authorize(Some("authenticated"), &identity, Some(&["admin".to_string()]))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn authenticated_identity_failing_policy_is_forbidden_not_unauthorized() {
		let mut strategy = AuthorizationStrategy::new();
		strategy.add(Policy::new("admin-only").with_requirement(Arc::new(RolesRequirement::new(["admin"]))));
		let identity = identity_with_role("member");
		let err = strategy.authorize(Some("admin-only"), &identity, None).await.unwrap_err();
		assert!(matches!(err, Error::Forbidden(_)));
	}
}
