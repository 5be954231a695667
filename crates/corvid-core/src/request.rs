//! The per-exchange `Request` value, combining the wire-level pieces
//! (method/uri/version/headers/body) the router tests construct directly
//! with the scope metadata ASGI hosts provide (`root_path`, `client`,
//! `server`, `scheme`).

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

use crate::cookie::parse_cookie_header;
use crate::exception::{Error, Result};
use crate::services::ServiceScope;

/// Per-connection metadata supplied by the host server, mirroring the ASGI
/// `scope` dict. Never mutate `path`/`raw_path` when forwarding into a
/// mounted child application — only ever extend `root_path` (invariant 8).
#[derive(Debug, Clone, Default)]
pub struct Scope {
	pub root_path: String,
	pub scheme: String,
	pub host: Option<String>,
	pub client: Option<(String, u16)>,
	pub server: Option<(String, u16)>,
}

#[derive(Debug, Clone, Default)]
pub struct Identity {
	pub claims: HashMap<String, String>,
	pub scheme: Option<String>,
}

impl Identity {
	pub fn is_authenticated(&self) -> bool {
		self.scheme.is_some()
	}
}

#[derive(Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub scope: Scope,
	/// Path-capture values produced by the router match.
	pub route_params: HashMap<String, String>,
	pub identity: Option<Identity>,
	pub services: Arc<ServiceScope>,
}

impl std::fmt::Debug for Request {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Request")
			.field("method", &self.method)
			.field("uri", &self.uri)
			.field("route_params", &self.route_params)
			.finish()
	}
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			scope: Scope::default(),
			route_params: HashMap::new(),
			identity: None,
			services: Arc::new(ServiceScope::empty()),
		}
	}

	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Application-relative path: the request path with `scope.root_path`
	/// stripped, never the other way around.
	pub fn relative_path(&self) -> &str {
		self.uri
			.path()
			.strip_prefix(self.scope.root_path.as_str())
			.unwrap_or_else(|| self.uri.path())
	}

	pub fn query_string(&self) -> &str {
		self.uri.query().unwrap_or("")
	}

	/// Parses the query string into a multimap (repeated keys collect).
	pub fn query(&self) -> HashMap<String, Vec<String>> {
		let mut map: HashMap<String, Vec<String>> = HashMap::new();
		if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(self.query_string())
		{
			for (k, v) in pairs {
				map.entry(k).or_default().push(v);
			}
		}
		map
	}

	pub fn cookies(&self) -> HashMap<String, String> {
		self.headers
			.get("cookie")
			.and_then(|v| v.to_str().ok())
			.map(parse_cookie_header)
			.unwrap_or_default()
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.header("content-type")
	}

	pub fn is_body_excluded_method(&self) -> bool {
		matches!(self.method, Method::GET | Method::HEAD | Method::TRACE)
	}

	pub fn client_ip(&self) -> Option<&str> {
		self.scope.client.as_ref().map(|(ip, _)| ip.as_str())
	}

	pub fn host(&self) -> Option<&str> {
		self.scope
			.host
			.as_deref()
			.or_else(|| self.header("host"))
	}
}

#[derive(Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<Uri>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Bytes,
	scope: Scope,
	identity: Option<Identity>,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn identity(mut self, identity: Identity) -> Self {
		self.identity = Some(identity);
		self
	}

	pub fn uri(mut self, uri: impl TryInto<Uri>) -> Self {
		self.uri = uri.try_into().ok();
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			http::HeaderName::from_bytes(name.as_bytes()),
			http::HeaderValue::from_str(value),
		) {
			self.headers.append(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn scope(mut self, scope: Scope) -> Self {
		self.scope = scope;
		self
	}

	pub fn build(self) -> Result<Request> {
		let method = self.method.ok_or_else(|| Error::BadRequest("missing method".into()))?;
		let uri = self.uri.ok_or_else(|| Error::BadRequest("missing uri".into()))?;
		Ok(Request {
			method,
			uri,
			version: self.version.unwrap_or(Version::HTTP_11),
			headers: self.headers,
			body: self.body,
			scope: self.scope,
			route_params: HashMap::new(),
			identity: self.identity,
			services: Arc::new(ServiceScope::empty()),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_collects_repeated_keys() {
		let request = Request::builder()
			.method(Method::GET)
			.uri("/search?tag=a&tag=b")
			.body(Bytes::new())
			.build()
			.unwrap();
		let query = request.query();
		assert_eq!(query.get("tag").unwrap(), &vec!["a".to_string(), "b".to_string()]);
	}

	#[test]
	fn relative_path_strips_root_path_once() {
		let mut request = Request::builder()
			.method(Method::GET)
			.uri("/sub/cats/7")
			.body(Bytes::new())
			.build()
			.unwrap();
		request.scope.root_path = "/sub".to_string();
		assert_eq!(request.relative_path(), "/cats/7");
	}
}
