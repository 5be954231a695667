//! Cross-Origin Resource Sharing: preflight short-circuit and
//! `Access-Control-*` response headers (SPEC_FULL §4.4 MESSAGE, §4.8
//! original-source supplement).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

#[derive(Debug, Clone)]
pub struct CorsConfig {
	pub allowed_origins: HashSet<String>,
	pub allow_any_origin: bool,
	pub allowed_methods: Vec<String>,
	pub allowed_headers: Vec<String>,
	pub allow_credentials: bool,
	pub max_age: Option<u64>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allowed_origins: HashSet::new(),
			allow_any_origin: false,
			allowed_methods: vec!["GET".into(), "POST".into(), "PUT".into(), "PATCH".into(), "DELETE".into(), "OPTIONS".into()],
			allowed_headers: vec!["content-type".into(), "authorization".into()],
			allow_credentials: false,
			max_age: Some(600),
		}
	}
}

impl CorsConfig {
	pub fn allow_origins(origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			allowed_origins: origins.into_iter().map(Into::into).collect(),
			..Default::default()
		}
	}

	pub fn allow_any() -> Self {
		Self {
			allow_any_origin: true,
			..Default::default()
		}
	}

	pub fn with_credentials(mut self, value: bool) -> Self {
		self.allow_credentials = value;
		self
	}

	fn origin_allowed(&self, origin: &str) -> bool {
		self.allow_any_origin || self.allowed_origins.contains(origin)
	}
}

pub struct CorsMiddleware {
	config: CorsConfig,
}

impl CorsMiddleware {
	pub fn new(config: CorsConfig) -> Self {
		Self { config }
	}

	fn cors_headers(&self, origin: &str, response: Response) -> Response {
		let allow_origin = if self.config.allow_any_origin && !self.config.allow_credentials {
			"*"
		} else {
			origin
		};
		let mut response = response
			.with_header("access-control-allow-origin", allow_origin)
			.with_header("vary", "origin");
		if self.config.allow_credentials {
			response = response.with_header("access-control-allow-credentials", "true");
		}
		response
	}
}

#[async_trait]
impl Middleware for CorsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let origin = request.header("origin").map(str::to_string);
		let Some(origin) = origin else {
			return next.handle(request).await;
		};
		if !self.config.origin_allowed(&origin) {
			return next.handle(request).await;
		}

		if request.method == http::Method::OPTIONS && request.header("access-control-request-method").is_some() {
			let mut response = Response::no_content()
				.with_header("access-control-allow-methods", &self.config.allowed_methods.join(", "))
				.with_header("access-control-allow-headers", &self.config.allowed_headers.join(", "));
			if let Some(max_age) = self.config.max_age {
				response = response.with_header("access-control-max-age", &max_age.to_string());
			}
			return Ok(self.cors_headers(&origin, response));
		}

		let response = next.handle(request).await?;
		Ok(self.cors_headers(&origin, response))
	}
}
