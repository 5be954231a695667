//! Rewrites `request.scope.scheme` from configuration, for deployments
//! behind a TLS-terminating proxy that only ever speaks plain HTTP to this
//! process (SPEC_FULL §4.4, INIT, priority -100).

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::pipeline::Middleware;

pub struct HttpSchemeMiddleware {
	scheme: String,
}

impl HttpSchemeMiddleware {
	pub fn new(scheme: impl Into<String>) -> Self {
		Self { scheme: scheme.into() }
	}
}

#[async_trait]
impl Middleware for HttpSchemeMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		request.scope.scheme = self.scheme.clone();
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::{HeaderMap, Method, Uri, Version};

	fn request() -> Request {
		Request::new(
			Method::GET,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			bytes::Bytes::new(),
		)
	}

	#[tokio::test]
	async fn overwrites_scheme_before_the_handler_runs() {
		let middleware = HttpSchemeMiddleware::new("https");
		let next = Arc::new(|req: Request| async move {
			assert_eq!(req.scope.scheme, "https");
			Ok(Response::ok())
		});
		middleware.process(request(), next).await.unwrap();
	}
}
