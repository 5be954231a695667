//! Binder base contract and the simple (non-body) built-in binders
//! (SPEC_FULL §4.2).

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::Request;

use crate::converters::{convert_collection, Converter};
use crate::value::BoundValue;

/// A single parameter extractor. `get_parameter` is the only method callers
/// invoke; it applies the required/default rule uniformly so individual
/// binders only need to implement raw value lookup in `get_value`.
#[async_trait]
pub trait Binder: Send + Sync {
	/// Parameter name as it appears in the handler signature.
	fn parameter_name(&self) -> &str;

	fn required(&self) -> bool;

	/// Looks up and converts the raw value, without applying the
	/// required/default rule. `Ok(None)` means "absent", not an error.
	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>>;

	/// Applies steps 1-2 of the binder algorithm: decode, then fall back to
	/// a default (or reject) when absent.
	async fn get_parameter(&self, request: &Request) -> Result<BoundValue> {
		match self.get_value(request).await? {
			Some(value) => Ok(value),
			None if self.required() => {
				Err(Error::MissingParameter(self.parameter_name().to_string()))
			}
			None => Ok(BoundValue::Null),
		}
	}
}

/// Binds a captured path segment. Required by default, since an unmatched
/// capture means the route itself wouldn't have matched.
pub struct RouteBinder {
	name: String,
	converter: Box<dyn Converter>,
}

impl RouteBinder {
	pub fn new(name: impl Into<String>, converter: Box<dyn Converter>) -> Self {
		Self {
			name: name.into(),
			converter,
		}
	}
}

#[async_trait]
impl Binder for RouteBinder {
	fn parameter_name(&self) -> &str {
		&self.name
	}

	fn required(&self) -> bool {
		true
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		match request.route_params.get(&self.name) {
			Some(raw) => Ok(Some(BoundValue::Scalar(self.converter.convert(raw)?))),
			None => Ok(None),
		}
	}
}

/// Binds a query-string parameter. List-aware: repeated keys collect.
pub struct QueryBinder {
	name: String,
	converter: Box<dyn Converter>,
	required: bool,
	multiple: bool,
}

impl QueryBinder {
	pub fn new(name: impl Into<String>, converter: Box<dyn Converter>, required: bool, multiple: bool) -> Self {
		Self {
			name: name.into(),
			converter,
			required,
			multiple,
		}
	}
}

#[async_trait]
impl Binder for QueryBinder {
	fn parameter_name(&self) -> &str {
		&self.name
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		let query = request.query();
		let Some(values) = query.get(&self.name) else {
			return Ok(None);
		};
		if values.is_empty() {
			return Ok(None);
		}
		if self.multiple {
			let scalars = convert_collection(self.converter.as_ref(), values)?;
			Ok(Some(BoundValue::List(scalars)))
		} else {
			let scalar = self.converter.convert(&values[values.len() - 1])?;
			Ok(Some(BoundValue::Scalar(scalar)))
		}
	}
}

/// Binds an HTTP header. Case-insensitive (via `http::HeaderMap`);
/// supports multiple values for the same header name.
pub struct HeaderBinder {
	name: String,
	converter: Box<dyn Converter>,
	required: bool,
	multiple: bool,
}

impl HeaderBinder {
	pub fn new(name: impl Into<String>, converter: Box<dyn Converter>, required: bool, multiple: bool) -> Self {
		Self {
			name: name.into(),
			converter,
			required,
			multiple,
		}
	}
}

#[async_trait]
impl Binder for HeaderBinder {
	fn parameter_name(&self) -> &str {
		&self.name
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		let values: Vec<String> = request
			.headers
			.get_all(self.name.as_str())
			.iter()
			.filter_map(|v| v.to_str().ok())
			.map(str::to_string)
			.collect();
		if values.is_empty() {
			return Ok(None);
		}
		if self.multiple {
			let scalars = convert_collection(self.converter.as_ref(), &values)?;
			Ok(Some(BoundValue::List(scalars)))
		} else {
			let scalar = self.converter.convert(&values[0])?;
			Ok(Some(BoundValue::Scalar(scalar)))
		}
	}
}

/// Binds a single cookie value.
pub struct CookieBinder {
	name: String,
	converter: Box<dyn Converter>,
	required: bool,
}

impl CookieBinder {
	pub fn new(name: impl Into<String>, converter: Box<dyn Converter>, required: bool) -> Self {
		Self {
			name: name.into(),
			converter,
			required,
		}
	}
}

#[async_trait]
impl Binder for CookieBinder {
	fn parameter_name(&self) -> &str {
		&self.name
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		match request.cookies().get(&self.name) {
			Some(raw) => Ok(Some(BoundValue::Scalar(self.converter.convert(raw)?))),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::converters::{IntConverter, StringConverter};
	use bytes::Bytes;
	use http::{HeaderMap, Method, Uri, Version};

	fn request_with_query(query: &str) -> Request {
		Request::new(
			Method::GET,
			format!("/?{query}").parse::<Uri>().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		)
	}

	#[tokio::test]
	async fn route_binder_requires_capture() {
		let mut request = Request::new(
			Method::GET,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		);
		let binder = RouteBinder::new("id", Box::new(IntConverter));
		assert!(binder.get_parameter(&request).await.is_err());
		request.route_params.insert("id".to_string(), "42".to_string());
		let value = binder.get_parameter(&request).await.unwrap();
		let BoundValue::Scalar(scalar) = value else {
			panic!("expected scalar");
		};
		assert_eq!(scalar.as_int(), Some(42));
	}

	#[tokio::test]
	async fn query_binder_collects_repeated_keys() {
		let request = request_with_query("tag=a&tag=b");
		let binder = QueryBinder::new("tag", Box::new(StringConverter), true, true);
		let value = binder.get_parameter(&request).await.unwrap();
		let BoundValue::List(values) = value else {
			panic!("expected list");
		};
		assert_eq!(values.len(), 2);
	}

	#[tokio::test]
	async fn query_binder_uses_default_when_missing_and_not_required() {
		let request = request_with_query("");
		let binder = QueryBinder::new("limit", Box::new(IntConverter), false, false);
		let value = binder.get_parameter(&request).await.unwrap();
		assert!(value.is_null());
	}
}
