//! The converted/bound value shapes every binder produces.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A single converted scalar. Converters (`crate::converters`) parse raw
/// strings into one of these; collection-of-T binders wrap several.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Str(String),
	Bool(bool),
	Int(i64),
	Float(f64),
	Uuid(Uuid),
	Date(NaiveDate),
	DateTime(DateTime<Utc>),
	Bytes(Bytes),
}

impl Scalar {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Scalar::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Scalar::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Scalar::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Scalar::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_uuid(&self) -> Option<Uuid> {
		match self {
			Scalar::Uuid(u) => Some(*u),
			_ => None,
		}
	}
}

/// What a binder ultimately hands the handler. Not every binder produces
/// every variant; each binder's doc comment says which it returns.
///
/// Not `Clone`: a `Files` value owns open spool-file handles.
#[derive(Debug)]
pub enum BoundValue {
	Scalar(Scalar),
	List(Vec<Scalar>),
	Json(serde_json::Value),
	Bytes(Bytes),
	Text(String),
	Files(Vec<corvid_core::content::SpooledPart>),
	Null,
}

impl BoundValue {
	pub fn is_null(&self) -> bool {
		matches!(self, BoundValue::Null)
	}
}
