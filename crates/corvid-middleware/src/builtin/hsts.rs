//! `Strict-Transport-Security` response header (SPEC_FULL §4.4, MESSAGE).
//!
//! Grounded on `reinhardt-core/crates/security/tests/hsts_tests.rs`.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HstsConfig {
	pub max_age: u64,
	pub include_subdomains: bool,
	pub preload: bool,
}

impl Default for HstsConfig {
	fn default() -> Self {
		Self {
			max_age: 31_536_000,
			include_subdomains: false,
			preload: false,
		}
	}
}

impl HstsConfig {
	pub fn new(max_age: u64) -> Self {
		Self {
			max_age,
			..Default::default()
		}
	}

	pub fn with_subdomains(mut self, value: bool) -> Self {
		self.include_subdomains = value;
		self
	}

	pub fn with_preload(mut self, value: bool) -> Self {
		self.preload = value;
		self
	}

	pub fn build_header(&self) -> String {
		let mut parts = vec![format!("max-age={}", self.max_age)];
		if self.include_subdomains {
			parts.push("includeSubDomains".to_string());
		}
		if self.preload {
			parts.push("preload".to_string());
		}
		parts.join("; ")
	}
}

/// Only applied to responses served over HTTPS; sending it over plain HTTP
/// would instruct clients to upgrade a scheme the connection never had.
pub struct HstsMiddleware {
	config: HstsConfig,
}

impl HstsMiddleware {
	pub fn new(config: HstsConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl Middleware for HstsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let is_https = request.scope.scheme == "https";
		let mut response = next.handle(request).await?;
		if is_https {
			response = response.with_header("strict-transport-security", &self.config.build_header());
		}
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::{HeaderMap, Method, Uri, Version};

	fn request_with_scheme(scheme: &str) -> Request {
		let mut request = Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, HeaderMap::new(), bytes::Bytes::new());
		request.scope.scheme = scheme.to_string();
		request
	}

	async fn ok(_req: Request) -> Result<Response> {
		Ok(Response::ok())
	}

	#[test]
	fn basic_header() {
		assert_eq!(HstsConfig::new(3600).build_header(), "max-age=3600");
	}

	#[test]
	fn subdomains_and_preload_compose() {
		let config = HstsConfig::new(10_886_400).with_subdomains(true).with_preload(true);
		assert_eq!(config.build_header(), "max-age=10886400; includeSubDomains; preload");
	}

	#[test]
	fn default_is_one_year() {
		let config = HstsConfig::default();
		assert_eq!(config.max_age, 31_536_000);
		assert!(!config.include_subdomains);
		assert!(!config.preload);
	}

	#[tokio::test]
	async fn applies_header_only_over_https() {
		let middleware = HstsMiddleware::new(HstsConfig::default());
		let response = middleware.process(request_with_scheme("https"), Arc::new(ok)).await.unwrap();
		assert!(response.headers.contains_key("strict-transport-security"));

		let response = middleware.process(request_with_scheme("http"), Arc::new(ok)).await.unwrap();
		assert!(!response.headers.contains_key("strict-transport-security"));
	}
}
