//! Static security response headers: `X-Frame-Options`, `X-Content-Type-Options`,
//! `X-XSS-Protection`, `Referrer-Policy`, the `Cross-Origin-*` family and an
//! optional `Content-Security-Policy` (SPEC_FULL §4.4 MESSAGE).
//!
//! Grounded on `reinhardt-core/crates/security/tests/security_headers_tests.rs`.
//! HSTS is handled separately by [`crate::builtin::hsts`] since it only
//! applies over a secure scheme; here it is folded into the same config for
//! parity with the teacher's `SecurityHeadersConfig`, but applied
//! unconditionally, matching the teacher's test expectations.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
	pub default_src: Vec<String>,
	pub script_src: Vec<String>,
	pub style_src: Vec<String>,
	pub img_src: Vec<String>,
	pub connect_src: Vec<String>,
	pub font_src: Vec<String>,
	pub object_src: Vec<String>,
	pub media_src: Vec<String>,
	pub frame_src: Vec<String>,
	pub report_uri: Option<String>,
	pub report_to: Option<String>,
	pub auto_nonce: bool,
}

impl Default for ContentSecurityPolicy {
	fn default() -> Self {
		Self {
			default_src: Vec::new(),
			script_src: Vec::new(),
			style_src: Vec::new(),
			img_src: Vec::new(),
			connect_src: Vec::new(),
			font_src: Vec::new(),
			object_src: Vec::new(),
			media_src: Vec::new(),
			frame_src: Vec::new(),
			report_uri: None,
			report_to: None,
			auto_nonce: false,
		}
	}
}

impl ContentSecurityPolicy {
	pub fn new() -> Self {
		Self {
			default_src: vec!["'self'".to_string()],
			script_src: vec!["'self'".to_string()],
			style_src: vec!["'self'".to_string()],
			img_src: vec!["'self'".to_string()],
			..Default::default()
		}
	}

	pub fn to_header_value(&self) -> String {
		let mut directives = Vec::new();
		let push = |directives: &mut Vec<String>, name: &str, values: &[String]| {
			if !values.is_empty() {
				directives.push(format!("{name} {}", values.join(" ")));
			}
		};
		push(&mut directives, "default-src", &self.default_src);
		push(&mut directives, "script-src", &self.script_src);
		push(&mut directives, "style-src", &self.style_src);
		push(&mut directives, "img-src", &self.img_src);
		push(&mut directives, "connect-src", &self.connect_src);
		push(&mut directives, "font-src", &self.font_src);
		push(&mut directives, "object-src", &self.object_src);
		push(&mut directives, "media-src", &self.media_src);
		push(&mut directives, "frame-src", &self.frame_src);
		if let Some(uri) = &self.report_uri {
			directives.push(format!("report-uri {uri}"));
		}
		if let Some(endpoint) = &self.report_to {
			directives.push(format!("report-to {endpoint}"));
		}
		directives.join("; ")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeadersConfig {
	pub x_frame_options: Option<String>,
	pub x_content_type_options: bool,
	pub x_xss_protection: bool,
	pub strict_transport_security: Option<String>,
	pub content_security_policy: Option<ContentSecurityPolicy>,
	pub referrer_policy: Option<String>,
	pub permissions_policy: Option<String>,
	pub cross_origin_embedder_policy: Option<String>,
	pub cross_origin_opener_policy: Option<String>,
	pub cross_origin_resource_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
	fn default() -> Self {
		Self {
			x_frame_options: Some("DENY".to_string()),
			x_content_type_options: true,
			x_xss_protection: true,
			strict_transport_security: Some(crate::builtin::hsts::HstsConfig::default().with_subdomains(true).build_header()),
			content_security_policy: None,
			referrer_policy: Some("same-origin".to_string()),
			permissions_policy: None,
			cross_origin_embedder_policy: None,
			cross_origin_opener_policy: Some("same-origin".to_string()),
			cross_origin_resource_policy: Some("same-origin".to_string()),
		}
	}
}

pub struct SecurityHeadersMiddleware {
	config: SecurityHeadersConfig,
}

impl SecurityHeadersMiddleware {
	pub fn new(config: SecurityHeadersConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl Middleware for SecurityHeadersMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let mut response = next.handle(request).await?;
		if let Some(value) = &self.config.x_frame_options {
			response = response.with_header("x-frame-options", value);
		}
		if self.config.x_content_type_options {
			response = response.with_header("x-content-type-options", "nosniff");
		}
		if self.config.x_xss_protection {
			response = response.with_header("x-xss-protection", "1; mode=block");
		}
		if let Some(value) = &self.config.strict_transport_security {
			response = response.with_header("strict-transport-security", value);
		}
		if let Some(csp) = &self.config.content_security_policy {
			response = response.with_header("content-security-policy", &csp.to_header_value());
		}
		if let Some(value) = &self.config.referrer_policy {
			response = response.with_header("referrer-policy", value);
		}
		if let Some(value) = &self.config.permissions_policy {
			response = response.with_header("permissions-policy", value);
		}
		if let Some(value) = &self.config.cross_origin_embedder_policy {
			response = response.with_header("cross-origin-embedder-policy", value);
		}
		if let Some(value) = &self.config.cross_origin_opener_policy {
			response = response.with_header("cross-origin-opener-policy", value);
		}
		if let Some(value) = &self.config.cross_origin_resource_policy {
			response = response.with_header("cross-origin-resource-policy", value);
		}
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::{HeaderMap, Method, Uri, Version};

	fn request() -> Request {
		Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, HeaderMap::new(), bytes::Bytes::new())
	}

	async fn ok(_req: Request) -> Result<Response> {
		Ok(Response::ok())
	}

	#[test]
	fn default_config_has_secure_defaults() {
		let config = SecurityHeadersConfig::default();
		assert_eq!(config.x_frame_options.as_deref(), Some("DENY"));
		assert!(config.x_content_type_options);
		assert!(config.strict_transport_security.as_deref().unwrap().contains("max-age="));
	}

	#[test]
	fn csp_renders_configured_directives() {
		let csp = ContentSecurityPolicy {
			script_src: vec!["'self'".to_string(), "'unsafe-inline'".to_string()],
			..Default::default()
		};
		assert!(csp.to_header_value().contains("script-src 'self' 'unsafe-inline'"));
	}

	#[test]
	fn csp_new_seeds_self_everywhere() {
		let csp = ContentSecurityPolicy::new();
		assert_eq!(csp.default_src, vec!["'self'".to_string()]);
	}

	#[tokio::test]
	async fn middleware_applies_every_configured_header() {
		let middleware = SecurityHeadersMiddleware::new(SecurityHeadersConfig::default());
		let response = middleware.process(request(), Arc::new(ok)).await.unwrap();
		assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
		assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
		assert!(response.headers.contains_key("strict-transport-security"));
	}

	#[tokio::test]
	async fn all_headers_can_be_disabled() {
		let config = SecurityHeadersConfig {
			x_frame_options: None,
			x_content_type_options: false,
			x_xss_protection: false,
			strict_transport_security: None,
			content_security_policy: None,
			referrer_policy: None,
			permissions_policy: None,
			cross_origin_embedder_policy: None,
			cross_origin_opener_policy: None,
			cross_origin_resource_policy: None,
		};
		let middleware = SecurityHeadersMiddleware::new(config);
		let response = middleware.process(request(), Arc::new(ok)).await.unwrap();
		assert!(response.headers.get("x-frame-options").is_none());
		assert!(response.headers.get("strict-transport-security").is_none());
	}
}
