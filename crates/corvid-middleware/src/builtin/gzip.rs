//! Compresses the response body when the client advertises `gzip` support,
//! the content-type is compressible and the body exceeds
//! `Settings::gzip_min_size` (SPEC_FULL §4.4, MESSAGE).
//!
//! Compression itself runs through `tokio::task::spawn_blocking` so a large
//! body doesn't block the event loop (§5's "offloaded via an executor
//! abstraction" suspension point).

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response, Settings};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::pipeline::Middleware;

const COMPRESSIBLE_PREFIXES: &[&str] = &["text/", "application/json", "application/xml", "application/javascript"];

fn is_compressible(content_type: Option<&str>) -> bool {
	let Some(content_type) = content_type else {
		return false;
	};
	let content_type = content_type.split(';').next().unwrap_or(content_type).trim();
	COMPRESSIBLE_PREFIXES.iter().any(|prefix| content_type.starts_with(prefix))
}

pub struct GzipMiddleware {
	settings: Arc<Settings>,
}

impl GzipMiddleware {
	pub fn new(settings: Arc<Settings>) -> Self {
		Self { settings }
	}
}

#[async_trait]
impl Middleware for GzipMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let accepts_gzip = request
			.header("accept-encoding")
			.map(|v| v.split(',').any(|enc| enc.trim().eq_ignore_ascii_case("gzip")))
			.unwrap_or(false);

		let mut response = next.handle(request).await?;
		if !accepts_gzip {
			return Ok(response);
		}
		if response.body.len() < self.settings.gzip_min_size {
			return Ok(response);
		}
		let content_type = response.headers.get("content-type").and_then(|v| v.to_str().ok()).map(str::to_string);
		if !is_compressible(content_type.as_deref()) {
			return Ok(response);
		}
		if response.headers.contains_key("content-encoding") {
			return Ok(response);
		}

		let body = response.body.clone();
		let compressed = tokio::task::spawn_blocking(move || {
			let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
			encoder.write_all(&body)?;
			encoder.finish()
		})
		.await
		.map_err(|e| corvid_core::Error::internal(anyhow::anyhow!(e)))?
		.map_err(|e: std::io::Error| corvid_core::Error::from(e))?;

		response.set_body(compressed);
		response = response.with_header("content-encoding", "gzip");
		response.headers.remove("content-length");
		Ok(response)
	}
}
