//! An in-process client that drives a built [`Application`] without a real
//! host server (SPEC_FULL §4.8 "Test tooling"): it builds a `Request`
//! straight from a builder-style description and returns whatever
//! `handle_http`/`handle_websocket` produced, for assertion in `tokio::test`s.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use corvid_core::request::Identity;
use corvid_core::{Request, Response, Scope};
use corvid_websocket::{IncomingMessage, OutgoingMessage, Transport};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::application::Application;

pub struct TestClient<'a> {
	app: &'a Application,
}

impl<'a> TestClient<'a> {
	pub fn new(app: &'a Application) -> Self {
		Self { app }
	}

	pub fn request(&self, method: Method, uri: &str) -> TestRequestBuilder<'a> {
		TestRequestBuilder {
			app: self.app,
			method,
			uri: uri.parse().expect("invalid test request URI"),
			headers: HeaderMap::new(),
			body: Bytes::new(),
			scope: Scope::default(),
			identity: None,
		}
	}

	pub fn get(&self, uri: &str) -> TestRequestBuilder<'a> {
		self.request(Method::GET, uri)
	}

	pub fn post(&self, uri: &str) -> TestRequestBuilder<'a> {
		self.request(Method::POST, uri)
	}

	/// Feeds `incoming` to the handler matching `path` as a scripted
	/// `receive()` queue and returns every message it sent back.
	pub async fn websocket(&self, path: &str, incoming: Vec<IncomingMessage>) -> (corvid_core::Result<()>, Vec<OutgoingMessage>) {
		let sent = Arc::new(Mutex::new(Vec::new()));
		let transport: Box<dyn Transport> = Box::new(ScriptedTransport {
			incoming: incoming.into(),
			sent: sent.clone(),
		});
		let outcome = self.app.handle_websocket(Scope::default(), path, transport).await;
		let sent = sent.lock().unwrap().clone();
		(outcome, sent)
	}
}

pub struct TestRequestBuilder<'a> {
	app: &'a Application,
	method: Method,
	uri: Uri,
	headers: HeaderMap,
	body: Bytes,
	scope: Scope,
	identity: Option<Identity>,
}

impl<'a> TestRequestBuilder<'a> {
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
			self.headers.append(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
		self.body = Bytes::from(serde_json::to_vec(value).expect("test body must serialize"));
		self.headers.insert("content-type", HeaderValue::from_static("application/json"));
		self
	}

	pub fn scope(mut self, scope: Scope) -> Self {
		self.scope = scope;
		self
	}

	pub fn identity(mut self, identity: Identity) -> Self {
		self.identity = Some(identity);
		self
	}

	pub async fn send(self) -> Response {
		let mut builder = Request::builder()
			.method(self.method)
			.uri(self.uri)
			.headers(self.headers)
			.body(self.body)
			.scope(self.scope);
		if let Some(identity) = self.identity {
			builder = builder.identity(identity);
		}
		let request = builder.build().expect("test request must be well-formed");
		self.app.handle_http(request).await
	}
}

/// Replays a fixed queue of incoming messages and records every outgoing
/// one, grounded on the same pattern `corvid-websocket`'s own unit tests use
/// for their transport double.
struct ScriptedTransport {
	incoming: VecDeque<IncomingMessage>,
	sent: Arc<Mutex<Vec<OutgoingMessage>>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn receive(&mut self) -> corvid_websocket::Result<IncomingMessage> {
		self.incoming
			.pop_front()
			.ok_or(corvid_websocket::WebSocketError::Disconnect { code: 1000 })
	}

	async fn send(&mut self, message: OutgoingMessage) -> corvid_websocket::Result<()> {
		self.sent.lock().unwrap().push(message);
		Ok(())
	}
}
