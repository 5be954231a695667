//! Matches `request.host()` against an allowlist; mismatch -> 400
//! (SPEC_FULL §4.4, INIT).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

pub struct TrustedHostsMiddleware {
	allowed_hosts: HashSet<String>,
}

impl TrustedHostsMiddleware {
	pub fn new(allowed_hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			allowed_hosts: allowed_hosts.into_iter().map(Into::into).collect(),
		}
	}
}

#[async_trait]
impl Middleware for TrustedHostsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if self.allowed_hosts.is_empty() {
			return next.handle(request).await;
		}
		let host = request.host().map(|h| h.split(':').next().unwrap_or(h).to_string());
		match host {
			Some(host) if self.allowed_hosts.contains(&host) => next.handle(request).await,
			Some(host) => Err(Error::BadRequest(format!("host not allowed: {host}"))),
			None => Err(Error::BadRequest("missing Host header".to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::{HeaderMap, Method, Uri, Version};

	fn request_with_host(host: Option<&str>) -> Request {
		let mut headers = HeaderMap::new();
		if let Some(host) = host {
			headers.insert("host", host.parse().unwrap());
		}
		Request::new(Method::GET, "/".parse::<Uri>().unwrap(), Version::HTTP_11, headers, bytes::Bytes::new())
	}

	async fn ok(_req: Request) -> Result<Response> {
		Ok(Response::ok())
	}

	#[tokio::test]
	async fn allows_a_listed_host() {
		let middleware = TrustedHostsMiddleware::new(["example.com"]);
		let response = middleware.process(request_with_host(Some("example.com")), Arc::new(ok)).await;
		assert!(response.is_ok());
	}

	#[tokio::test]
	async fn rejects_an_unlisted_host() {
		let middleware = TrustedHostsMiddleware::new(["example.com"]);
		let response = middleware.process(request_with_host(Some("evil.example")), Arc::new(ok)).await;
		assert!(response.is_err());
	}

	#[tokio::test]
	async fn strips_port_before_comparing() {
		let middleware = TrustedHostsMiddleware::new(["example.com"]);
		let response = middleware.process(request_with_host(Some("example.com:8080")), Arc::new(ok)).await;
		assert!(response.is_ok());
	}

	#[tokio::test]
	async fn empty_allowlist_permits_everything() {
		let middleware = TrustedHostsMiddleware::new(Vec::<String>::new());
		let response = middleware.process(request_with_host(None), Arc::new(ok)).await;
		assert!(response.is_ok());
	}
}
