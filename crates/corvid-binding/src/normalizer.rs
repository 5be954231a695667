//! Startup-time handler normalization (SPEC_FULL §4.3).
//!
//! The referenced implementation inspects a callable's signature at
//! registration time and picks a binder per parameter by precedence. Rust
//! handlers don't carry runtime-inspectable signatures, so the precedence
//! table becomes an explicit builder: a route registers a [`HandlerSpec`]
//! naming each parameter's origin, and [`HandlerSpec::validate`] enforces the
//! same startup-time invariants (one body binder, route names that exist,
//! no duplicate parameter names).

use std::collections::HashMap;
use std::sync::Arc;

use corvid_core::exception::{Error, Result};
use corvid_core::Request;

use crate::binder::Binder;
use crate::value::BoundValue;

/// Where a declared parameter's value comes from. Mirrors the precedence
/// list in SPEC_FULL §4.3, steps 3-8 (steps 1-2, raw `Binder`/typed-holder
/// annotations, collapse to `Explicit` once a concrete binder is built).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterOrigin {
	Explicit,
	Request,
	Identity,
	Services,
	ServiceByName(String),
	RouteCapture(String),
	Query(String),
	Body,
}

pub struct ParameterSpec {
	pub name: String,
	pub origin: ParameterOrigin,
	pub binder: Arc<dyn Binder>,
}

/// A route's resolved parameter list, validated once at startup.
pub struct HandlerSpec {
	parameters: Vec<ParameterSpec>,
}

impl HandlerSpec {
	pub fn builder() -> HandlerSpecBuilder {
		HandlerSpecBuilder::default()
	}

	pub async fn bind_all(&self, request: &Request) -> Result<HashMap<String, BoundValue>> {
		let mut bound = HashMap::with_capacity(self.parameters.len());
		for parameter in &self.parameters {
			let value = parameter.binder.get_parameter(request).await?;
			bound.insert(parameter.name.clone(), value);
		}
		Ok(bound)
	}

	pub fn parameters(&self) -> &[ParameterSpec] {
		&self.parameters
	}
}

#[derive(Default)]
pub struct HandlerSpecBuilder {
	parameters: Vec<ParameterSpec>,
	route_capture_names: Vec<String>,
}

impl HandlerSpecBuilder {
	/// Names the route captures this handler's route pattern declares, so
	/// `RouteCapture` origins can be checked against them.
	pub fn with_route_captures(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.route_capture_names = names.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_parameter(mut self, name: impl Into<String>, origin: ParameterOrigin, binder: Arc<dyn Binder>) -> Self {
		self.parameters.push(ParameterSpec {
			name: name.into(),
			origin,
			binder,
		});
		self
	}

	/// Enforces: at most one body binder, every `RouteCapture` origin names
	/// an existing capture, and parameter names are unique.
	pub fn validate(self) -> Result<HandlerSpec> {
		let mut seen_names = std::collections::HashSet::new();
		let mut body_binders = 0usize;

		for parameter in &self.parameters {
			if !seen_names.insert(parameter.name.clone()) {
				return Err(Error::Configuration(format!(
					"duplicate handler parameter: {}",
					parameter.name
				)));
			}
			match &parameter.origin {
				ParameterOrigin::Body => body_binders += 1,
				ParameterOrigin::RouteCapture(name) => {
					if !self.route_capture_names.iter().any(|c| c == name) {
						return Err(Error::Configuration(format!(
							"route capture '{name}' does not exist on this route's pattern"
						)));
					}
				}
				_ => {}
			}
		}

		if body_binders > 1 {
			return Err(Error::Configuration(
				"a handler may declare at most one body binder".to_string(),
			));
		}

		Ok(HandlerSpec {
			parameters: self.parameters,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binder::RouteBinder;
	use crate::body::JsonBinder;
	use crate::converters::IntConverter;

	#[test]
	fn rejects_route_capture_not_present_on_pattern() {
		let spec = HandlerSpec::builder()
			.with_route_captures(["id"])
			.with_parameter(
				"category",
				ParameterOrigin::RouteCapture("category".to_string()),
				Arc::new(RouteBinder::new("category", Box::new(IntConverter))),
			)
			.validate();
		assert!(spec.is_err());
	}

	#[test]
	fn rejects_more_than_one_body_binder() {
		let spec = HandlerSpec::builder()
			.with_parameter("payload", ParameterOrigin::Body, Arc::new(JsonBinder::new(true)))
			.with_parameter("payload2", ParameterOrigin::Body, Arc::new(JsonBinder::new(true)))
			.validate();
		assert!(spec.is_err());
	}

	#[test]
	fn accepts_well_formed_spec() {
		let spec = HandlerSpec::builder()
			.with_route_captures(["id"])
			.with_parameter(
				"id",
				ParameterOrigin::RouteCapture("id".to_string()),
				Arc::new(RouteBinder::new("id", Box::new(IntConverter))),
			)
			.validate();
		assert!(spec.is_ok());
	}
}
