//! Sets a `Cache-Control` response header from static configuration
//! (SPEC_FULL §4.4, MESSAGE). Unlike the teacher's `reinhardt-middleware`
//! response-store cache (ETag + a backing store), this directive-only form
//! is what the specification actually asks for: shape the outgoing header,
//! nothing is cached inside the process.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

#[derive(Debug, Clone)]
pub struct CacheControlConfig {
	pub max_age: Option<u64>,
	pub no_store: bool,
	pub no_cache: bool,
	pub private: bool,
	pub immutable: bool,
}

impl Default for CacheControlConfig {
	fn default() -> Self {
		Self {
			max_age: None,
			no_store: false,
			no_cache: false,
			private: false,
			immutable: false,
		}
	}
}

impl CacheControlConfig {
	pub fn max_age(seconds: u64) -> Self {
		Self {
			max_age: Some(seconds),
			..Default::default()
		}
	}

	pub fn no_store() -> Self {
		Self {
			no_store: true,
			..Default::default()
		}
	}

	pub fn with_private(mut self, value: bool) -> Self {
		self.private = value;
		self
	}

	pub fn with_immutable(mut self, value: bool) -> Self {
		self.immutable = value;
		self
	}

	pub fn build_header(&self) -> String {
		if self.no_store {
			return "no-store".to_string();
		}
		let mut directives = Vec::new();
		directives.push(if self.private { "private" } else { "public" }.to_string());
		if self.no_cache {
			directives.push("no-cache".to_string());
		}
		if let Some(max_age) = self.max_age {
			directives.push(format!("max-age={max_age}"));
		}
		if self.immutable {
			directives.push("immutable".to_string());
		}
		directives.join(", ")
	}
}

pub struct CacheControlMiddleware {
	config: CacheControlConfig,
}

impl CacheControlMiddleware {
	pub fn new(config: CacheControlConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl Middleware for CacheControlMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let mut response = next.handle(request).await?;
		if !response.headers.contains_key("cache-control") {
			response = response.with_header("cache-control", &self.config.build_header());
		}
		Ok(response)
	}
}
