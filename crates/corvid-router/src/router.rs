//! Method-indexed router: registration, first-match-wins dispatch, mounts,
//! and named-route URL generation.
//!
//! API shape grounded on
//! `reinhardt-urls/crates/routers/tests/{router_basic_tests.rs,middleware_integration.rs}`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::{Handler, Request, Response};
use http::Method;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::cache::LruCache;
use crate::pattern::compile_pattern;
use crate::route::Route;

/// Builder returned by [`path`]/[`re_path`]; finalized into a [`Route`] when
/// added to a router.
pub struct RouteBuilder {
	method: Option<Method>,
	path: String,
	name: Option<String>,
	handler: Arc<dyn Handler>,
}

impl RouteBuilder {
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	fn into_route(self, prefix: &str, namespace: Option<String>) -> Result<Route> {
		let full_path = corvid_core::url::join_prefix(prefix, &self.path);
		let pattern = compile_pattern(&full_path)?;
		Ok(Route {
			method: self.method,
			path: full_path,
			name: self.name,
			namespace,
			pattern,
			handler: self.handler,
		})
	}
}

/// Registers a route with a `{name}`/`:name`/`*` pattern (SPEC_FULL §4.1).
pub fn path(pattern: impl Into<String>, handler: Arc<dyn Handler>) -> RouteBuilder {
	RouteBuilder {
		method: None,
		path: pattern.into(),
		name: None,
		handler,
	}
}

/// Registers a route from a Django-style regex with named groups
/// (`(?P<name>...)`), converting it to the matcher's `{name}` display form.
pub fn re_path(pattern: &str, handler: Arc<dyn Handler>) -> RouteBuilder {
	static GROUP_RE: OnceCell<Regex> = OnceCell::new();
	let group_re = GROUP_RE.get_or_init(|| Regex::new(r"\(\?P<([A-Za-z_][A-Za-z0-9_]*)>[^)]*\)").unwrap());
	let trimmed = pattern.trim_start_matches('^').trim_end_matches('$');
	let display = group_re.replace_all(trimmed, "{$1}").into_owned();
	RouteBuilder {
		method: None,
		path: display,
		name: None,
		handler,
	}
}

fn method_key(method: &Method) -> &'static str {
	match *method {
		Method::GET => "GET",
		Method::POST => "POST",
		Method::PUT => "PUT",
		Method::DELETE => "DELETE",
		Method::PATCH => "PATCH",
		Method::HEAD => "HEAD",
		Method::OPTIONS => "OPTIONS",
		Method::TRACE => "TRACE",
		_ => "OTHER",
	}
}

/// The router contract: registration, introspection, mounting and URL
/// reversal. A trait so application code can depend on an abstract router.
#[async_trait]
pub trait Router: Send + Sync {
	/// Registers a route. Fails if `(method, pattern)` was already
	/// registered (invariant 2) — a startup-time configuration error, never
	/// silently ignored.
	fn add_route(&mut self, route: RouteBuilder) -> Result<()>;
	fn get_routes(&self) -> &[Route];
	fn include(&mut self, prefix: &str, routes: Vec<RouteBuilder>, namespace: Option<String>) -> Result<()>;
	fn reverse(&self, name: &str, params: &HashMap<String, String>) -> Result<String>;
	fn reverse_with(&self, name: &str, params: &[(&str, &str)]) -> Result<String>;
	async fn route(&self, request: Request) -> Result<Response>;
}

/// The default, in-process router implementation.
pub struct DefaultRouter {
	prefix: String,
	routes: Vec<Route>,
	/// `(method, normalized pattern)` dedup set (invariant 2).
	registered: std::collections::HashSet<(String, String)>,
	cache: LruCache<(String, String), usize>,
}

impl DefaultRouter {
	pub fn new() -> Self {
		Self {
			prefix: String::new(),
			routes: Vec::new(),
			registered: std::collections::HashSet::new(),
			cache: LruCache::new(1200),
		}
	}

	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		let mut router = Self::new();
		router.prefix = prefix.into();
		router
	}

	/// Inserts `route` unless its `(method, pattern)` was already registered
	/// (invariant 2), in which case it's rejected rather than shadowed.
	fn add_route_checked(&mut self, route: Route) -> Result<()> {
		let method_label = route
			.method
			.as_ref()
			.map(method_key)
			.unwrap_or("*")
			.to_string();
		let key = (method_label, route.path.to_lowercase());
		if !self.registered.insert(key) {
			return Err(Error::DuplicateRoute {
				method: route.method.map(|m| m.to_string()).unwrap_or_else(|| "*".into()),
				pattern: route.path,
			});
		}
		self.routes.push(route);
		Ok(())
	}

	fn find_match(&self, method: &Method, path: &str) -> Option<(&Route, HashMap<String, String>)> {
		let cache_key = (method_key(method).to_string(), path.to_string());
		if let Some(index) = self.cache.get(&cache_key) {
			if let Some(route) = self.routes.get(index) {
				if let Some(params) = route.pattern_matches(path) {
					return Some((route, params));
				}
			}
		}
		for (index, route) in self.routes.iter().enumerate() {
			let method_matches = route
				.method
				.as_ref()
				.map(|m| m == method)
				.unwrap_or(true);
			if !method_matches {
				continue;
			}
			if let Some(params) = route.pattern_matches(path) {
				self.cache.put(cache_key, index);
				return Some((route, params));
			}
		}
		None
	}
}

impl Route {
	pub(crate) fn pattern_matches(&self, path: &str) -> Option<HashMap<String, String>> {
		self.pattern.matches(path)
	}
}

impl Default for DefaultRouter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Router for DefaultRouter {
	fn add_route(&mut self, route: RouteBuilder) -> Result<()> {
		let route = route.into_route(&self.prefix, None)?;
		self.add_route_checked(route)
	}

	fn get_routes(&self) -> &[Route] {
		&self.routes
	}

	fn include(&mut self, prefix: &str, routes: Vec<RouteBuilder>, namespace: Option<String>) -> Result<()> {
		let joined_prefix = corvid_core::url::join_prefix(&self.prefix, prefix);
		for builder in routes {
			let route = builder.into_route(&joined_prefix, namespace.clone())?;
			self.add_route_checked(route)?;
		}
		Ok(())
	}

	fn reverse(&self, name: &str, params: &HashMap<String, String>) -> Result<String> {
		let route = self
			.routes
			.iter()
			.find(|r| r.reverse_key().as_deref() == Some(name))
			.ok_or_else(|| Error::UnknownRouteName(name.to_string()))?;
		substitute_captures(&route.path, params)
	}

	fn reverse_with(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
		let map: HashMap<String, String> = params
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		self.reverse(name, &map)
	}

	async fn route(&self, mut request: Request) -> Result<Response> {
		let path = request.relative_path().to_string();
		let method = request.method.clone();
		match self.find_match(&method, &path) {
			Some((route, params)) => {
				request.route_params = params;
				route.handler.handle(request).await
			}
			None => Err(Error::RouteNotFound),
		}
	}
}

/// Substitutes captures back into a `{name}` pattern; unmatched names are
/// appended as a percent-encoded query string (SPEC_FULL §4.1).
fn substitute_captures(pattern: &str, params: &HashMap<String, String>) -> Result<String> {
	let mut out = String::new();
	let mut used = std::collections::HashSet::new();
	let mut chars = pattern.chars().peekable();
	while let Some(c) = chars.next() {
		if c == '{' {
			let mut name = String::new();
			let mut closed = false;
			for n in chars.by_ref() {
				if n == '}' {
					closed = true;
					break;
				}
				name.push(n);
			}
			if !closed {
				return Err(Error::InvalidPattern(pattern.to_string()));
			}
			let key = name.split_once(':').map(|(_, n)| n).unwrap_or(&name).to_string();
			let value = params
				.get(&key)
				.ok_or_else(|| Error::MissingParameter(key.clone()))?;
			out.push_str(value);
			used.insert(key);
		} else if c == ':' {
			let mut name = String::new();
			while let Some(&n) = chars.peek() {
				if n == '/' {
					break;
				}
				name.push(n);
				chars.next();
			}
			let value = params
				.get(&name)
				.ok_or_else(|| Error::MissingParameter(name.clone()))?;
			out.push_str(value);
			used.insert(name);
		} else {
			out.push(c);
		}
	}
	let extra: Vec<(String, String)> = params
		.iter()
		.filter(|(k, _)| !used.contains(*k))
		.map(|(k, v)| (k.clone(), v.clone()))
		.collect();
	if !extra.is_empty() {
		out.push('?');
		out.push_str(&serde_urlencoded::to_string(&extra).unwrap_or_default());
	}
	Ok(out)
}
