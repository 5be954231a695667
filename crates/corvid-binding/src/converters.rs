//! String-to-`Scalar` converters, first-match-wins (SPEC_FULL §4.2).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use corvid_core::exception::{Error, Result};
use percent_encoding::percent_decode_str;
use uuid::Uuid;

use crate::value::Scalar;

/// Converts a single raw (already percent-decoded by the caller where
/// relevant) string into a [`Scalar`].
pub trait Converter: Send + Sync {
	fn name(&self) -> &'static str;
	fn convert(&self, raw: &str) -> Result<Scalar>;
}

pub struct StringConverter;

impl Converter for StringConverter {
	fn name(&self) -> &'static str {
		"string"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		let decoded = percent_decode_str(raw)
			.decode_utf8()
			.map_err(|e| Error::BadRequest(e.to_string()))?;
		Ok(Scalar::Str(decoded.into_owned()))
	}
}

pub struct IntConverter;

impl Converter for IntConverter {
	fn name(&self) -> &'static str {
		"int"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		raw.trim()
			.parse::<i64>()
			.map(Scalar::Int)
			.map_err(|_| Error::BadRequest(format!("'{raw}' is not a valid integer")))
	}
}

pub struct FloatConverter;

impl Converter for FloatConverter {
	fn name(&self) -> &'static str {
		"float"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		raw.trim()
			.parse::<f64>()
			.map(Scalar::Float)
			.map_err(|_| Error::BadRequest(format!("'{raw}' is not a valid number")))
	}
}

/// Accepts `"true"|"1"|"false"|"0"`, case-insensitively; anything else fails.
pub struct BoolConverter;

impl Converter for BoolConverter {
	fn name(&self) -> &'static str {
		"bool"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		match raw.to_ascii_lowercase().as_str() {
			"true" | "1" => Ok(Scalar::Bool(true)),
			"false" | "0" => Ok(Scalar::Bool(false)),
			_ => Err(Error::BadRequest(format!("'{raw}' is not a valid boolean"))),
		}
	}
}

pub struct UuidConverter;

impl Converter for UuidConverter {
	fn name(&self) -> &'static str {
		"uuid"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		Uuid::parse_str(raw)
			.map(Scalar::Uuid)
			.map_err(|_| Error::BadRequest(format!("'{raw}' is not a valid UUID")))
	}
}

/// Url-safe base64, no padding.
pub struct BytesConverter;

impl Converter for BytesConverter {
	fn name(&self) -> &'static str {
		"bytes"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		URL_SAFE_NO_PAD
			.decode(raw)
			.map(|bytes| Scalar::Bytes(Bytes::from(bytes)))
			.map_err(|_| Error::BadRequest("invalid base64 payload".to_string()))
	}
}

/// ISO-8601 date: `YYYY-MM-DD`.
pub struct DateConverter;

impl Converter for DateConverter {
	fn name(&self) -> &'static str {
		"date"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		NaiveDate::parse_from_str(raw, "%Y-%m-%d")
			.map(Scalar::Date)
			.map_err(|_| Error::BadRequest(format!("'{raw}' is not a valid date")))
	}
}

/// ISO-8601 datetime, accepting `…T…`, `…T…Z`, and `…T….ffffff` forms.
pub struct DateTimeConverter;

impl Converter for DateTimeConverter {
	fn name(&self) -> &'static str {
		"datetime"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
			if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), fmt) {
				return Ok(Scalar::DateTime(Utc.from_utc_datetime(&naive)));
			}
		}
		Err(Error::BadRequest(format!("'{raw}' is not a valid datetime")))
	}
}

/// Exact (or case-insensitive) match against a fixed set of allowed strings,
/// modeling a `Literal[...]` annotation.
pub struct LiteralConverter {
	allowed: Vec<String>,
	case_insensitive: bool,
}

impl LiteralConverter {
	pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>, case_insensitive: bool) -> Self {
		Self {
			allowed: allowed.into_iter().map(Into::into).collect(),
			case_insensitive,
		}
	}
}

impl Converter for LiteralConverter {
	fn name(&self) -> &'static str {
		"literal"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		let matched = if self.case_insensitive {
			self.allowed.iter().any(|a| a.eq_ignore_ascii_case(raw))
		} else {
			self.allowed.iter().any(|a| a == raw)
		};
		if matched {
			Ok(Scalar::Str(raw.to_string()))
		} else {
			Err(Error::BadRequest(format!(
				"'{raw}' is not one of {}",
				self.allowed.join(", ")
			)))
		}
	}
}

/// Matches an enum variant by its serialized name (case-sensitive) or, for
/// integer-backed enums, by its numeric value.
pub struct EnumConverter {
	variants: Vec<(String, i64)>,
}

impl EnumConverter {
	pub fn new(variants: impl IntoIterator<Item = (impl Into<String>, i64)>) -> Self {
		Self {
			variants: variants.into_iter().map(|(name, value)| (name.into(), value)).collect(),
		}
	}
}

impl Converter for EnumConverter {
	fn name(&self) -> &'static str {
		"enum"
	}

	fn convert(&self, raw: &str) -> Result<Scalar> {
		if let Some((name, _)) = self.variants.iter().find(|(name, _)| name == raw) {
			return Ok(Scalar::Str(name.clone()));
		}
		if let Ok(n) = raw.parse::<i64>()
			&& let Some((name, _)) = self.variants.iter().find(|(_, value)| *value == n)
		{
			return Ok(Scalar::Str(name.clone()));
		}
		Err(Error::BadRequest(format!("'{raw}' is not a valid enum value")))
	}
}

/// Applies an inner converter to each of several raw values, for a
/// `list`/`tuple`/`set`-of-`T` declared parameter type.
pub fn convert_collection(converter: &dyn Converter, raw_values: &[String]) -> Result<Vec<Scalar>> {
	raw_values.iter().map(|raw| converter.convert(raw)).collect()
}
