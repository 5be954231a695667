//! Redirects a path ending in `/` to its slash-less form, or the reverse,
//! ahead of routing (SPEC_FULL §4.4 INIT, §4.8 original-source supplement).

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};
use http::StatusCode;

use crate::pipeline::Middleware;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSlashPolicy {
	Strip,
	Append,
}

pub struct TrailingSlashMiddleware {
	policy: TrailingSlashPolicy,
}

impl TrailingSlashMiddleware {
	pub fn new(policy: TrailingSlashPolicy) -> Self {
		Self { policy }
	}
}

#[async_trait]
impl Middleware for TrailingSlashMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let path = request.path();
		let normalized = match self.policy {
			TrailingSlashPolicy::Strip if path.len() > 1 && path.ends_with('/') => Some(path.trim_end_matches('/').to_string()),
			TrailingSlashPolicy::Append if !path.ends_with('/') => Some(format!("{path}/")),
			_ => None,
		};

		let Some(mut normalized) = normalized else {
			return next.handle(request).await;
		};
		if !request.query_string().is_empty() {
			normalized.push('?');
			normalized.push_str(request.query_string());
		}
		Ok(Response::redirect(normalized, StatusCode::PERMANENT_REDIRECT))
	}
}
