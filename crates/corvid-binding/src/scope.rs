//! Scope-accessor binders: values read off the request/connection itself
//! rather than converted from raw wire bytes (SPEC_FULL §4.2).

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::Request;

use crate::binder::Binder;
use crate::value::{BoundValue, Scalar};

/// Resolves a service from the DI container by name; unresolved is `Null`,
/// never an error (services are optional dependencies, not parameters).
pub struct ServiceBinder {
	name: String,
}

impl ServiceBinder {
	pub fn by_name(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

#[async_trait]
impl Binder for ServiceBinder {
	fn parameter_name(&self) -> &str {
		&self.name
	}

	fn required(&self) -> bool {
		false
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		Ok(request
			.services
			.get_by_name::<serde_json::Value>(&self.name)
			.map(|v| BoundValue::Json((*v).clone())))
	}
}

macro_rules! scope_accessor {
	($doc:literal, $binder:ident, $name:literal, $body:expr) => {
		#[doc = $doc]
		pub struct $binder;

		#[async_trait]
		impl Binder for $binder {
			fn parameter_name(&self) -> &str {
				$name
			}

			fn required(&self) -> bool {
				true
			}

			async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
				let f: fn(&Request) -> Option<BoundValue> = $body;
				Ok(f(request))
			}
		}
	};
}

scope_accessor!(
	"Binds the request's URL path as a string.",
	RequestUrlBinder,
	"url",
	|request| Some(BoundValue::Scalar(Scalar::Str(request.uri.to_string())))
);

scope_accessor!(
	"Binds the request method name (`GET`, `POST`, ...).",
	RequestMethodBinder,
	"method",
	|request| Some(BoundValue::Scalar(Scalar::Str(request.method.to_string())))
);

scope_accessor!(
	"Binds the caller's identity, if authentication populated one.",
	IdentityBinder,
	"identity",
	|request| request.identity.as_ref().map(|identity| {
		let mut map = serde_json::Map::new();
		for (key, value) in &identity.claims {
			map.insert(key.clone(), serde_json::Value::String(value.clone()));
		}
		if let Some(scheme) = &identity.scheme {
			map.insert("__scheme".to_string(), serde_json::Value::String(scheme.clone()));
		}
		BoundValue::Json(serde_json::Value::Object(map))
	})
);

scope_accessor!(
	"Binds the connecting client's `(host, port)`.",
	ClientInfoBinder,
	"client",
	|request| request
		.scope
		.client
		.as_ref()
		.map(|(host, port)| BoundValue::Text(format!("{host}:{port}")))
);

scope_accessor!(
	"Binds the local server's `(host, port)`.",
	ServerInfoBinder,
	"server",
	|request| request
		.scope
		.server
		.as_ref()
		.map(|(host, port)| BoundValue::Text(format!("{host}:{port}")))
);

/// Parses a `multipart/form-data` body and hands back the parts that
/// spooled to disk (those over `Settings::spool_max_size`); in-memory parts
/// are reached through the `Form`/`Multipart` binders instead.
pub struct FilesBinder {
	settings: std::sync::Arc<corvid_core::Settings>,
}

impl FilesBinder {
	pub fn new(settings: std::sync::Arc<corvid_core::Settings>) -> Self {
		Self { settings }
	}
}

#[async_trait]
impl Binder for FilesBinder {
	fn parameter_name(&self) -> &str {
		"files"
	}

	fn required(&self) -> bool {
		false
	}

	async fn get_value(&self, request: &Request) -> Result<Option<BoundValue>> {
		let Some(content_type) = request.content_type() else {
			return Ok(None);
		};
		if !content_type.starts_with("multipart/form-data") {
			return Ok(None);
		}
		let parts = corvid_multipart::parse_spooled(&request.body, content_type, &self.settings).await?;
		if parts.is_empty() {
			Ok(None)
		} else {
			Ok(Some(BoundValue::Files(parts)))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use http::{HeaderMap, Method, Uri, Version};

	fn base_request() -> Request {
		Request::new(
			Method::GET,
			"/items/42".parse::<Uri>().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		)
	}

	#[tokio::test]
	async fn request_method_binder_reports_method() {
		let request = base_request();
		let value = RequestMethodBinder.get_parameter(&request).await.unwrap();
		let BoundValue::Scalar(Scalar::Str(method)) = value else {
			panic!("expected scalar string");
		};
		assert_eq!(method, "GET");
	}

	#[tokio::test]
	async fn client_info_binder_reports_none_without_scope() {
		let request = base_request();
		let value = ClientInfoBinder.get_value(&request).await.unwrap();
		assert!(value.is_none());
	}
}
