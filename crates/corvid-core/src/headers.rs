//! Ordered, case-insensitive header list.
//!
//! Built atop `http::HeaderMap` (the teacher's router tests construct
//! requests directly from `hyper::HeaderMap`), wrapped to preserve the
//! "multiple values per name" semantics the source relies on for things
//! like repeated `Set-Cookie` headers.

use http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, Default)]
pub struct HeaderList {
	inner: HeaderMap,
}

impl HeaderList {
	pub fn new() -> Self {
		Self {
			inner: HeaderMap::new(),
		}
	}

	pub fn from_map(inner: HeaderMap) -> Self {
		Self { inner }
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.inner.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn get_all(&self, name: &str) -> Vec<&str> {
		self.inner
			.get_all(name)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.collect()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner.contains_key(name)
	}

	pub fn append(&mut self, name: &str, value: impl AsRef<str>) {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value.as_ref()),
		) {
			self.inner.append(name, value);
		}
	}

	pub fn insert(&mut self, name: &str, value: impl AsRef<str>) {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value.as_ref()),
		) {
			self.inner.insert(name, value);
		}
	}

	pub fn remove(&mut self, name: &str) {
		self.inner.remove(name);
	}

	pub fn as_map(&self) -> &HeaderMap {
		&self.inner
	}

	pub fn into_map(self) -> HeaderMap {
		self.inner
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.inner
			.iter()
			.filter_map(|(k, v)| Some((k.as_str(), v.to_str().ok()?)))
	}
}

impl From<HeaderMap> for HeaderList {
	fn from(value: HeaderMap) -> Self {
		Self::from_map(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_is_case_insensitive() {
		let mut h = HeaderList::new();
		h.insert("Content-Type", "application/json");
		assert_eq!(h.get("content-type"), Some("application/json"));
	}

	#[test]
	fn append_preserves_multiple_values() {
		let mut h = HeaderList::new();
		h.append("Set-Cookie", "a=1");
		h.append("Set-Cookie", "b=2");
		assert_eq!(h.get_all("set-cookie"), vec!["a=1", "b=2"]);
	}
}
