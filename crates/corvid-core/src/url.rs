//! Structured URL value, mirroring the split BlackSheep keeps between a raw
//! byte value and its parsed components (`blacksheep/url.py`).

use crate::exception::{Error, Result};

/// A parsed URL (or a path-only reference when `host` is empty).
///
/// Equality and hashing are defined over the raw byte value, not over the
/// parsed components, matching the source's `URL.__eq__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
	value: Vec<u8>,
	schema: Vec<u8>,
	host: Vec<u8>,
	port: Option<u16>,
	path: Vec<u8>,
	query: Vec<u8>,
	fragment: Vec<u8>,
	is_absolute: bool,
}

impl Url {
	pub fn parse(value: impl AsRef<[u8]>) -> Result<Self> {
		let value = value.as_ref().to_vec();
		let text = String::from_utf8_lossy(&value).into_owned();

		let (before_fragment, fragment) = match text.split_once('#') {
			Some((a, b)) => (a.to_string(), b.as_bytes().to_vec()),
			None => (text, Vec::new()),
		};
		let (before_query, query) = match before_fragment.split_once('?') {
			Some((a, b)) => (a.to_string(), b.as_bytes().to_vec()),
			None => (before_fragment, Vec::new()),
		};

		let is_absolute = before_query.contains("://");
		let (schema, host, port, path) = if is_absolute {
			let (schema, rest) = before_query
				.split_once("://")
				.ok_or_else(|| Error::BadRequest("malformed absolute url".into()))?;
			let (authority, path) = match rest.find('/') {
				Some(idx) => (&rest[..idx], &rest[idx..]),
				None => (rest, ""),
			};
			let (host, port) = match authority.rsplit_once(':') {
				Some((h, p)) if p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty() => {
					(h, p.parse::<u16>().ok())
				}
				_ => (authority, None),
			};
			(
				schema.as_bytes().to_vec(),
				host.as_bytes().to_vec(),
				port,
				path.as_bytes().to_vec(),
			)
		} else {
			(Vec::new(), Vec::new(), None, before_query.as_bytes().to_vec())
		};

		Ok(Self {
			value,
			schema,
			host,
			port,
			path,
			query,
			fragment,
			is_absolute,
		})
	}

	pub fn value(&self) -> &[u8] {
		&self.value
	}

	pub fn path(&self) -> &[u8] {
		&self.path
	}

	pub fn path_str(&self) -> std::borrow::Cow<'_, str> {
		String::from_utf8_lossy(&self.path)
	}

	pub fn schema(&self) -> &[u8] {
		&self.schema
	}

	pub fn host(&self) -> &[u8] {
		&self.host
	}

	pub fn port(&self) -> Option<u16> {
		self.port
	}

	pub fn query(&self) -> &[u8] {
		&self.query
	}

	pub fn fragment(&self) -> &[u8] {
		&self.fragment
	}

	pub fn is_absolute(&self) -> bool {
		self.is_absolute
	}

	/// Returns the scheme+host[:port] prefix of an absolute URL, empty otherwise.
	pub fn base_url(&self) -> Vec<u8> {
		if !self.is_absolute {
			return Vec::new();
		}
		let mut out = self.schema.clone();
		out.extend_from_slice(b"://");
		out.extend_from_slice(&self.host);
		if let Some(port) = self.port {
			out.extend_from_slice(format!(":{port}").as_bytes());
		}
		out
	}

	pub fn with_host(&self, host: impl AsRef<[u8]>) -> Self {
		let mut clone = self.clone();
		clone.host = host.as_ref().to_vec();
		clone.value = clone.rebuild();
		clone
	}

	pub fn with_scheme(&self, schema: impl AsRef<[u8]>) -> Self {
		let mut clone = self.clone();
		clone.schema = schema.as_ref().to_vec();
		clone.value = clone.rebuild();
		clone
	}

	pub fn with_query(&self, query: impl AsRef<[u8]>) -> Self {
		let mut clone = self.clone();
		clone.query = query.as_ref().to_vec();
		clone.value = clone.rebuild();
		clone
	}

	fn rebuild(&self) -> Vec<u8> {
		let mut out = self.base_url();
		out.extend_from_slice(&self.path);
		if !self.query.is_empty() {
			out.push(b'?');
			out.extend_from_slice(&self.query);
		}
		if !self.fragment.is_empty() {
			out.push(b'#');
			out.extend_from_slice(&self.fragment);
		}
		out
	}

	/// Joins another URL onto this one, refusing to merge an absolute URL
	/// onto another, or to concatenate paths when either side carries a
	/// query/fragment — matching `URL.join` in the source.
	pub fn join(&self, other: &Url) -> Result<Url> {
		if self.is_absolute && other.is_absolute {
			return Err(Error::BadRequest(
				"cannot join two absolute urls".to_string(),
			));
		}
		if !self.query.is_empty() || !self.fragment.is_empty() {
			return Err(Error::BadRequest(
				"cannot join onto a url with a query or fragment".to_string(),
			));
		}
		let joined_path = join_prefix(&self.path_str(), &other.path_str());
		let mut value = self.base_url();
		value.extend_from_slice(joined_path.as_bytes());
		if !other.query.is_empty() {
			value.push(b'?');
			value.extend_from_slice(&other.query);
		}
		if !other.fragment.is_empty() {
			value.push(b'#');
			value.extend_from_slice(&other.fragment);
		}
		Url::parse(value)
	}
}

impl std::fmt::Display for Url {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", String::from_utf8_lossy(&self.value))
	}
}

/// Builds an absolute URL string from parts, matching
/// `blacksheep.url.build_absolute_url`.
pub fn build_absolute_url(scheme: &str, host: &str, base_path: &str, path: &str) -> String {
	format!("{scheme}://{host}{}", join_prefix(base_path, path))
}

/// Joins a mount prefix and an application-relative path, normalizing
/// duplicate or missing slashes exactly once (never double-prefixing).
pub fn join_prefix(prefix: &str, path: &str) -> String {
	if prefix.is_empty() {
		return if path.starts_with('/') {
			path.to_string()
		} else {
			format!("/{path}")
		};
	}
	let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
	let path = if path.starts_with('/') { path } else {
		return format!("{prefix}/{path}");
	};
	format!("{prefix}{path}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_absolute_url() {
		let url = Url::parse("https://example.com:8443/a/b?x=1#frag").unwrap();
		assert!(url.is_absolute());
		assert_eq!(url.schema(), b"https");
		assert_eq!(url.host(), b"example.com");
		assert_eq!(url.port(), Some(8443));
		assert_eq!(url.path_str(), "/a/b");
		assert_eq!(url.query(), b"x=1");
		assert_eq!(url.fragment(), b"frag");
	}

	#[test]
	fn parses_relative_path() {
		let url = Url::parse("/a/b").unwrap();
		assert!(!url.is_absolute());
		assert_eq!(url.path_str(), "/a/b");
	}

	#[test]
	fn join_refuses_absolute_onto_absolute() {
		let a = Url::parse("https://a.test/").unwrap();
		let b = Url::parse("https://b.test/").unwrap();
		assert!(a.join(&b).is_err());
	}

	#[test]
	fn join_refuses_query_bearing_base() {
		let a = Url::parse("/a?x=1").unwrap();
		let b = Url::parse("/b").unwrap();
		assert!(a.join(&b).is_err());
	}

	#[test]
	fn join_prefix_applies_exactly_once() {
		assert_eq!(join_prefix("/sub", "/cats/7"), "/sub/cats/7");
		assert_eq!(join_prefix("/sub/", "/cats/7"), "/sub/cats/7");
		assert_eq!(join_prefix("", "/cats/7"), "/cats/7");
	}

	#[test]
	fn build_absolute_url_joins_base_and_path_once() {
		let url = build_absolute_url("https", "example.com", "/sub", "/cats/7");
		assert_eq!(url, "https://example.com/sub/cats/7");
	}
}
