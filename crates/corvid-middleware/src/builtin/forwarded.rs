//! Validates and applies `X-Forwarded-*` headers under a trust policy
//! (SPEC_FULL §4.4 INIT, §6 "Forwarded headers").
//!
//! Rejects (400): unknown host, more forwards than `forward_limit`,
//! duplicate `X-Forwarded-Host`/`X-Forwarded-Proto` headers, a
//! comma-separated `X-Forwarded-Proto` with more than one value, and a
//! peer not in the known-proxies/known-networks allowlist. Accepted
//! rewrites update `Request.scope.{host,scheme,client}`.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::{Handler, Request, Response, Settings};

use crate::pipeline::Middleware;

pub struct XForwardedHeadersMiddleware {
	settings: Arc<Settings>,
}

impl XForwardedHeadersMiddleware {
	pub fn new(settings: Arc<Settings>) -> Self {
		Self { settings }
	}

	fn apply(&self, request: &mut Request) -> Result<()> {
		let policy = &self.settings.forwarded_headers;

		let Some((peer_ip, _)) = request.scope.client.clone() else {
			return Ok(());
		};
		let Ok(peer_ip) = peer_ip.parse::<IpAddr>() else {
			return Ok(());
		};
		if !policy.trusts(peer_ip) {
			return Ok(());
		}

		let host_headers: Vec<&str> = request.headers.get_all("x-forwarded-host").iter().filter_map(|v| v.to_str().ok()).collect();
		if host_headers.len() > 1 {
			return Err(Error::BadRequest("duplicate X-Forwarded-Host header".to_string()));
		}

		let proto_headers: Vec<&str> = request.headers.get_all("x-forwarded-proto").iter().filter_map(|v| v.to_str().ok()).collect();
		if proto_headers.len() > 1 {
			return Err(Error::BadRequest("duplicate X-Forwarded-Proto header".to_string()));
		}
		if let Some(proto) = proto_headers.first()
			&& proto.contains(',')
		{
			return Err(Error::BadRequest(
				"X-Forwarded-Proto must not carry multiple comma-separated values".to_string(),
			));
		}

		if let Some(forwarded_for) = request.header("x-forwarded-for") {
			let hops = forwarded_for.split(',').count();
			if hops > policy.forward_limit {
				return Err(Error::BadRequest("too many forwarded hops".to_string()));
			}
		}

		if let Some(host) = host_headers.first() {
			if !policy.host_allowed(host) {
				return Err(Error::BadRequest(format!("unknown forwarded host: {host}")));
			}
			request.scope.host = Some(host.to_string());
		}

		if let Some(proto) = proto_headers.first() {
			request.scope.scheme = proto.to_string();
		}

		if let Some(forwarded_for) = request.header("x-forwarded-for") {
			if let Some(first) = forwarded_for.split(',').next() {
				let ip = first.trim().to_string();
				let port = request.scope.client.as_ref().map(|(_, port)| *port).unwrap_or(0);
				request.scope.client = Some((ip, port));
			}
		}

		Ok(())
	}
}

#[async_trait]
impl Middleware for XForwardedHeadersMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		self.apply(&mut request)?;
		next.handle(request).await
	}
}
