//! End-to-end scenario tests for SPEC_FULL §8, driving a fully built
//! `Application` through `TestClient` the way a host server would.
//!
//! S6 (multipart + disk spool) and S7 (WebSocket echo) are not repeated
//! here: S6 is exercised at the component level by
//! `corvid-multipart/src/parser.rs`'s `part_past_spool_threshold_reads_back_in_full`
//! test, and S7 by `src/testing.rs`'s `drives_a_scripted_websocket_exchange`.

use std::sync::Arc;

use corvid::core::request::Identity;
use corvid::core::settings::SettingsBuilder;
use corvid::core::{self, Response};
use corvid::middleware::builtin::authz::AuthorizationMiddleware;
use corvid::middleware::builtin::csrf::{self, CsrfMiddleware};
use corvid::middleware::MiddlewareCategory;
use corvid::routing::{path, DefaultRouter, Router};
use corvid::{Application, TestClient};
use corvid_auth::authorization::{Policy, RolesRequirement};
use corvid_auth::AuthorizationStrategy;
use serde::{Deserialize, Serialize};

// S1: text query binding.

async fn greet(request: core::Request) -> core::Result<Response> {
	let query = request.query();
	let name = query.get("name").and_then(|values| values.first()).cloned().unwrap_or_default();
	Ok(Response::text(format!("Hello, {name}")))
}

#[tokio::test]
async fn s1_text_query_binding() {
	let mut router = DefaultRouter::new();
	router.add_route(path("/greet", Arc::new(greet))).unwrap();
	let app = Application::builder(Arc::new(router)).build();

	let response = TestClient::new(&app).get("/greet?name=world").send().await;
	assert_eq!(response.status, http::StatusCode::OK);
	assert_eq!(String::from_utf8_lossy(response.body()), "Hello, world");
}

// S2: JSON body binding.

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Item {
	id: u64,
	name: String,
}

async fn create_item(request: core::Request) -> core::Result<Response> {
	let item: Item = serde_json::from_slice(&request.body).map_err(|e| core::Error::BadRequest(e.to_string()))?;
	let body = serde_json::to_vec(&item).expect("echo body serializes");
	Ok(Response::ok().with_body(body))
}

#[tokio::test]
async fn s2_json_body_binding() {
	let mut router = DefaultRouter::new();
	router.add_route(path("/items", Arc::new(create_item)).with_method(http::Method::POST)).unwrap();
	let app = Application::builder(Arc::new(router)).build();

	let item = Item { id: 1, name: "Hello".to_string() };
	let response = TestClient::new(&app).post("/items").json(&item).send().await;
	assert_eq!(response.status, http::StatusCode::OK);
	let echoed: Item = serde_json::from_slice(response.body()).unwrap();
	assert_eq!(echoed, item);
}

// S3: mount + named URL.

async fn cat_detail(_request: core::Request) -> core::Result<Response> {
	Ok(Response::ok())
}

#[tokio::test]
async fn s3_mount_and_named_url() {
	let mut sub = DefaultRouter::with_prefix("/sub");
	sub.add_route(path("/cats/{cat_id}", Arc::new(cat_detail)).with_name("cat-detail")).unwrap();

	let location = sub.reverse_with("cat-detail", &[("cat_id", "7")]).unwrap();
	assert_eq!(location, "/sub/cats/7");

	let app = Application::builder(Arc::new(sub)).build();
	let response = TestClient::new(&app).get(&location).send().await;
	assert_eq!(response.status, http::StatusCode::OK);
}

// S4: anti-forgery (CSRF).

async fn form(_request: core::Request) -> core::Result<Response> {
	Ok(Response::ok().with_header("content-type", "text/html").with_body("<form></form>"))
}

async fn create_user(_request: core::Request) -> core::Result<Response> {
	Ok(Response::no_content())
}

#[tokio::test]
async fn s4_anti_forgery_token_roundtrip() {
	let settings = SettingsBuilder::new().csrf_secret(b"0123456789abcdef0123456789abcdef".to_vec()).build();
	let secret = settings.csrf_secret.clone();

	let mut router = DefaultRouter::new();
	router.add_route(path("/form", Arc::new(form))).unwrap();
	router.add_route(path("/user", Arc::new(create_user)).with_method(http::Method::POST)).unwrap();

	let app = Application::builder(Arc::new(router))
		.settings(settings.clone())
		.middleware(MiddlewareCategory::Message, 0, CsrfMiddleware::new(Arc::new(settings)))
		.build();
	let client = TestClient::new(&app);

	let response = client.get("/form").send().await;
	assert_eq!(response.status, http::StatusCode::OK);
	let cookie = response.cookies.iter().find(|c| c.name == csrf::COOKIE_NAME).expect("form response sets an anti-forgery cookie");
	let token = cookie.value.clone();
	assert_eq!(token, csrf::get_token_hmac(&secret, "anonymous"));

	let response = client.post("/user").send().await;
	assert_eq!(response.status, http::StatusCode::UNAUTHORIZED);
	assert_eq!(response.headers.get("Reason").unwrap(), "Missing anti-forgery token cookie");

	let response = client
		.post("/user")
		.header("cookie", &format!("csrftoken={token}"))
		.header(csrf::HEADER_NAME, &token)
		.send()
		.await;
	assert_eq!(response.status, http::StatusCode::NO_CONTENT);
}

// S5: authz denial.

async fn admin_only(_request: core::Request) -> core::Result<Response> {
	Ok(Response::no_content())
}

fn identity_with_role(role: &str) -> Identity {
	let mut identity = Identity::default();
	identity.claims.insert("roles".to_string(), role.to_string());
	identity.scheme = Some("Test".to_string());
	identity
}

#[tokio::test]
async fn s5_authz_denies_wrong_role_and_allows_admin() {
	let mut router = DefaultRouter::new();
	router.add_route(path("/admin", Arc::new(admin_only))).unwrap();

	let mut strategy = AuthorizationStrategy::new();
	strategy.add(Policy::new("admin-only").with_requirement(Arc::new(RolesRequirement::new(["admin"]))));
	let middleware = AuthorizationMiddleware::new(Arc::new(strategy), Some("admin-only"));

	let app = Application::builder(Arc::new(router))
		.middleware(MiddlewareCategory::Authz, 0, middleware)
		.build();
	let client = TestClient::new(&app);

	let response = client.get("/admin").identity(identity_with_role("user")).send().await;
	assert_eq!(response.status, http::StatusCode::FORBIDDEN);

	let response = client.get("/admin").identity(identity_with_role("admin")).send().await;
	assert_eq!(response.status, http::StatusCode::NO_CONTENT);
}
