//! Body binders: JSON, form, XML, raw text/bytes, and the content-type
//! dispatching `MultiFormatBodyBinder` (SPEC_FULL §4.2).
//!
//! Skipped entirely for idempotent methods ({GET, HEAD, TRACE}); an empty
//! body on a required binder is `MissingBody`, not a successful absence.

use async_trait::async_trait;
use corvid_core::exception::{Error, Result};
use corvid_core::Request;

use crate::binder::Binder;
use crate::value::BoundValue;

fn content_type_matches(request: &Request, expected: &[&str]) -> bool {
	request
		.content_type()
		.map(|ct| {
			let ct = ct.split(';').next().unwrap_or(ct).trim();
			expected.iter().any(|e| e.eq_ignore_ascii_case(ct))
		})
		.unwrap_or(false)
}

/// Decodes a JSON body. `required` controls whether a missing/empty body or
/// a content-type mismatch is an error or a silent `Null`.
pub struct JsonBinder {
	required: bool,
}

impl JsonBinder {
	pub fn new(required: bool) -> Self {
		Self { required }
	}
}

#[async_trait]
impl Binder for JsonBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		if request.is_body_excluded_method() {
			return Ok(None);
		}
		if !content_type_matches(request, &["application/json"]) {
			return Ok(None);
		}
		if request.body.is_empty() {
			return if self.required { Err(Error::MissingBody) } else { Ok(None) };
		}
		let value: serde_json::Value =
			serde_json::from_slice(&request.body).map_err(|e| Error::InvalidRequestBody(e.to_string()))?;
		Ok(Some(BoundValue::Json(value)))
	}
}

/// Decodes `application/x-www-form-urlencoded` or `multipart/form-data`
/// bodies into a JSON object (duplicate keys collapse into a JSON array).
pub struct FormBinder {
	required: bool,
}

impl FormBinder {
	pub fn new(required: bool) -> Self {
		Self { required }
	}
}

#[async_trait]
impl Binder for FormBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		if request.is_body_excluded_method() {
			return Ok(None);
		}
		if !content_type_matches(request, &["application/x-www-form-urlencoded"]) {
			return Ok(None);
		}
		if request.body.is_empty() {
			return if self.required { Err(Error::MissingBody) } else { Ok(None) };
		}
		let pairs = corvid_core::content::parse_www_form_urlencoded(&request.body);
		let mut grouped: serde_json::Map<String, serde_json::Value> = serde_json::Map::new();
		for (key, value) in pairs {
			match grouped.get_mut(&key) {
				Some(serde_json::Value::Array(existing)) => existing.push(serde_json::Value::String(value)),
				Some(existing) => {
					let prior = existing.take();
					*existing = serde_json::Value::Array(vec![prior, serde_json::Value::String(value)]);
				}
				None => {
					grouped.insert(key, serde_json::Value::String(value));
				}
			}
		}
		Ok(Some(BoundValue::Json(serde_json::Value::Object(grouped))))
	}
}

/// Decodes `application/xml`/`text/xml` into a nested-object JSON value.
///
/// Uses `quick-xml`'s non-validating reader, which never resolves DTDs or
/// external entities, so XXE and entity-expansion payloads fail to parse
/// rather than being silently honored.
pub struct XmlBinder {
	required: bool,
}

impl XmlBinder {
	pub fn new(required: bool) -> Self {
		Self { required }
	}

	fn parse(raw: &[u8]) -> Result<serde_json::Value> {
		use quick_xml::events::Event;
		use quick_xml::reader::Reader;

		let mut reader = Reader::from_reader(raw);
		let mut stack: Vec<(String, serde_json::Map<String, serde_json::Value>)> = Vec::new();
		let mut root: Option<serde_json::Value> = None;
		let mut buf = Vec::new();

		loop {
			match reader.read_event_into(&mut buf).map_err(|e| Error::InvalidRequestBody(e.to_string()))? {
				Event::Start(e) => {
					let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
					stack.push((name, serde_json::Map::new()));
				}
				Event::Empty(e) => {
					let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
					Self::append_child(&mut stack, &mut root, name, serde_json::Value::Null)?;
				}
				Event::Text(e) => {
					let text = e.unescape().map_err(|err| Error::InvalidRequestBody(err.to_string()))?;
					if let Some((_, map)) = stack.last_mut()
						&& !text.trim().is_empty()
					{
						map.insert("_text".to_string(), serde_json::Value::String(text.trim().to_string()));
					}
				}
				Event::End(_) => {
					let (name, map) = stack
						.pop()
						.ok_or_else(|| Error::InvalidRequestBody("unbalanced XML element".to_string()))?;
					let value = if map.len() == 1 && map.contains_key("_text") {
						map.get("_text").cloned().unwrap_or(serde_json::Value::Null)
					} else {
						serde_json::Value::Object(map)
					};
					Self::append_child(&mut stack, &mut root, name, value)?;
				}
				Event::DocType(_) => {
					return Err(Error::InvalidRequestBody("DOCTYPE declarations are not permitted".to_string()));
				}
				Event::Eof => break,
				_ => {}
			}
			buf.clear();
		}

		root.ok_or_else(|| Error::InvalidRequestBody("empty XML document".to_string()))
	}

	fn append_child(
		stack: &mut Vec<(String, serde_json::Map<String, serde_json::Value>)>,
		root: &mut Option<serde_json::Value>,
		name: String,
		value: serde_json::Value,
	) -> Result<()> {
		match stack.last_mut() {
			Some((_, parent)) => {
				match parent.get_mut(&name) {
					Some(serde_json::Value::Array(existing)) => existing.push(value),
					Some(existing) => {
						let prior = existing.take();
						*existing = serde_json::Value::Array(vec![prior, value]);
					}
					None => {
						parent.insert(name, value);
					}
				}
				Ok(())
			}
			None => {
				let mut map = serde_json::Map::new();
				map.insert(name, value);
				*root = Some(serde_json::Value::Object(map));
				Ok(())
			}
		}
	}
}

#[async_trait]
impl Binder for XmlBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		if request.is_body_excluded_method() {
			return Ok(None);
		}
		if !content_type_matches(request, &["application/xml", "text/xml"]) {
			return Ok(None);
		}
		if request.body.is_empty() {
			return if self.required { Err(Error::MissingBody) } else { Ok(None) };
		}
		Ok(Some(BoundValue::Json(Self::parse(&request.body)?)))
	}
}

/// Decodes the body as UTF-8 text, regardless of declared content-type.
pub struct TextBinder {
	required: bool,
}

impl TextBinder {
	pub fn new(required: bool) -> Self {
		Self { required }
	}
}

#[async_trait]
impl Binder for TextBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		if request.is_body_excluded_method() {
			return Ok(None);
		}
		if request.body.is_empty() {
			return if self.required { Err(Error::MissingBody) } else { Ok(None) };
		}
		let text = String::from_utf8(request.body.to_vec()).map_err(|e| Error::InvalidRequestBody(e.to_string()))?;
		Ok(Some(BoundValue::Text(text)))
	}
}

/// Hands back the raw body bytes, uninterpreted.
pub struct BytesBinder {
	required: bool,
}

impl BytesBinder {
	pub fn new(required: bool) -> Self {
		Self { required }
	}
}

#[async_trait]
impl Binder for BytesBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		if request.is_body_excluded_method() {
			return Ok(None);
		}
		if request.body.is_empty() {
			return if self.required { Err(Error::MissingBody) } else { Ok(None) };
		}
		Ok(Some(BoundValue::Bytes(request.body.clone())))
	}
}

/// Dispatches to the first sub-binder whose content-type matches; if none
/// match and the parameter is required, fails with `UnsupportedMediaType`.
pub struct MultiFormatBodyBinder {
	binders: Vec<Box<dyn Binder>>,
	required: bool,
}

impl MultiFormatBodyBinder {
	/// Order fixed as JSON -> form -> text -> bytes (SPEC_FULL §9a).
	pub fn new(required: bool) -> Self {
		Self {
			binders: vec![
				Box::new(JsonBinder::new(false)),
				Box::new(FormBinder::new(false)),
				Box::new(TextBinder::new(false)),
				Box::new(BytesBinder::new(false)),
			],
			required,
		}
	}
}

#[async_trait]
impl Binder for MultiFormatBodyBinder {
	fn parameter_name(&self) -> &str {
		"body"
	}

	fn required(&self) -> bool {
		self.required
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		for binder in &self.binders {
			if let Some(value) = binder.get_value(request).await? {
				return Ok(Some(value));
			}
		}
		if self.required && !request.body.is_empty() {
			return Err(Error::UnsupportedMediaType(
				request.content_type().unwrap_or("unknown").to_string(),
			));
		}
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use http::{HeaderMap, Method, Uri, Version};

	fn json_request(body: &str) -> Request {
		let mut headers = HeaderMap::new();
		headers.insert("content-type", "application/json".parse().unwrap());
		Request::new(
			Method::POST,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			headers,
			Bytes::from(body.to_string()),
		)
	}

	#[tokio::test]
	async fn json_binder_decodes_object() {
		let binder = JsonBinder::new(true);
		let request = json_request(r#"{"name": "ada"}"#);
		let value = binder.get_parameter(&request).await.unwrap();
		let BoundValue::Json(json) = value else {
			panic!("expected json");
		};
		assert_eq!(json["name"], "ada");
	}

	#[tokio::test]
	async fn json_binder_rejects_empty_required_body() {
		let binder = JsonBinder::new(true);
		let request = json_request("");
		assert!(binder.get_parameter(&request).await.is_err());
	}

	#[tokio::test]
	async fn get_requests_skip_body_binding_entirely() {
		let binder = JsonBinder::new(true);
		let mut request = json_request(r#"{"x": 1}"#);
		request.method = Method::GET;
		let value = binder.get_parameter(&request).await.unwrap();
		assert!(value.is_null());
	}

	#[tokio::test]
	async fn xml_binder_rejects_doctype_declarations() {
		let mut headers = HeaderMap::new();
		headers.insert("content-type", "application/xml".parse().unwrap());
		let request = Request::new(
			Method::POST,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			headers,
			Bytes::from(
				"<!DOCTYPE foo [<!ENTITY xxe SYSTEM \"file:///etc/passwd\">]><foo>&xxe;</foo>".to_string(),
			),
		);
		let binder = XmlBinder::new(true);
		assert!(binder.get_parameter(&request).await.is_err());
	}

	#[tokio::test]
	async fn xml_binder_parses_nested_elements() {
		let mut headers = HeaderMap::new();
		headers.insert("content-type", "application/xml".parse().unwrap());
		let request = Request::new(
			Method::POST,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			headers,
			Bytes::from("<user><name>ada</name></user>".to_string()),
		);
		let binder = XmlBinder::new(true);
		let value = binder.get_parameter(&request).await.unwrap();
		let BoundValue::Json(json) = value else {
			panic!("expected json");
		};
		assert_eq!(json["user"]["name"], "ada");
	}

	#[tokio::test]
	async fn multi_format_binder_falls_back_to_form_then_text() {
		let mut headers = HeaderMap::new();
		headers.insert("content-type", "application/x-www-form-urlencoded".parse().unwrap());
		let request = Request::new(
			Method::POST,
			"/".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			headers,
			Bytes::from("name=ada".to_string()),
		);
		let binder = MultiFormatBodyBinder::new(true);
		let value = binder.get_parameter(&request).await.unwrap();
		let BoundValue::Json(json) = value else {
			panic!("expected json");
		};
		assert_eq!(json["name"], "ada");
	}
}
