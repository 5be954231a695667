//! HMAC-SHA256 CSRF tokens: generation, constant-time verification and the
//! cookie/header double-submit middleware (SPEC_FULL §4.4 MESSAGE, §6).
//!
//! Grounded on `reinhardt-core/crates/security/tests/csrf_hmac_tests.rs` and
//! `tests/integration/tests/middleware/csrf_middleware_integration.rs`: the
//! token travels in a `csrftoken` cookie and is echoed back by unsafe
//! requests in an `x-csrftoken` header; safe methods bypass the check.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::cookie::Cookie;
use corvid_core::exception::{Error, Result};
use corvid_core::{Handler, Request, Response, Settings};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::pipeline::Middleware;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "csrftoken";
pub const HEADER_NAME: &str = "x-csrftoken";

pub fn generate_token_hmac(secret: &[u8], message: &str) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
	mac.update(message.as_bytes());
	hex::encode(mac.finalize().into_bytes())
}

pub fn verify_token_hmac(token: &str, secret: &[u8], message: &str) -> bool {
	let Ok(given) = hex::decode(token) else {
		return false;
	};
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
	mac.update(message.as_bytes());
	mac.verify_slice(&given).is_ok()
}

pub fn get_secret_bytes() -> Vec<u8> {
	let mut bytes = vec![0u8; 32];
	rand::rng().fill_bytes(&mut bytes);
	bytes
}

pub fn get_token_hmac(secret: &[u8], session_id: &str) -> String {
	generate_token_hmac(secret, session_id)
}

#[derive(Debug, Clone)]
pub struct CsrfCheckError {
	pub reason: String,
}

pub fn check_token_hmac(token: &str, secret: &[u8], session_id: &str) -> std::result::Result<(), CsrfCheckError> {
	if verify_token_hmac(token, secret, session_id) {
		Ok(())
	} else {
		Err(CsrfCheckError {
			reason: "HMAC verification failed".to_string(),
		})
	}
}

fn is_safe_method(method: &http::Method) -> bool {
	matches!(method, &http::Method::GET | &http::Method::HEAD | &http::Method::OPTIONS | &http::Method::TRACE)
}

/// Double-submit CSRF guard: a safe request gets a fresh `csrftoken` cookie
/// tied to the caller's session id, an unsafe request must echo that same
/// token back in `X-CSRFToken`.
pub struct CsrfMiddleware {
	settings: Arc<Settings>,
}

impl CsrfMiddleware {
	pub fn new(settings: Arc<Settings>) -> Self {
		Self { settings }
	}

	fn session_id(request: &Request) -> String {
		request
			.cookies()
			.get("sessionid")
			.cloned()
			.unwrap_or_else(|| request.client_ip().unwrap_or("anonymous").to_string())
	}
}

#[async_trait]
impl Middleware for CsrfMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let session_id = Self::session_id(&request);
		let secret = &self.settings.csrf_secret;

		if !is_safe_method(&request.method) {
			let cookie_token = request.cookies().get(COOKIE_NAME).cloned();
			let Some(cookie_token) = cookie_token else {
				return Err(Error::UnauthorizedReason {
					reason: "Missing anti-forgery token cookie".to_string(),
				});
			};
			let header_token = request.header(HEADER_NAME).map(str::to_string);
			match header_token {
				Some(header_token) if cookie_token == header_token => {
					if check_token_hmac(&cookie_token, secret, &session_id).is_err() {
						return Err(Error::Forbidden("CSRF token verification failed".to_string()));
					}
				}
				_ => return Err(Error::Forbidden("CSRF token missing or mismatched".to_string())),
			}
		}

		let mut response = next.handle(request).await?;
		if !response.headers.contains_key("set-cookie") {
			let token = get_token_hmac(secret, &session_id);
			response = response.with_cookie(Cookie::new(COOKIE_NAME, token).http_only(false).same_site(corvid_core::cookie::SameSite::Lax));
		}
		Ok(response)
	}
}
