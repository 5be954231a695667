//! Typed body content, mirroring `blacksheep/contents.py`'s `Content`
//! hierarchy: in-memory bytes, an async stream, an ASGI-receive-backed
//! stream, multipart/form parts, server-sent events, and disk-spooled
//! uploads.

use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::exception::{Error, Result};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// One multipart/form-data part.
#[derive(Debug, Clone)]
pub struct FormPart {
	pub name: String,
	pub data: Bytes,
	pub content_type: Option<String>,
	pub file_name: Option<String>,
	pub charset: Option<String>,
}

impl PartialEq for FormPart {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.data == other.data
			&& self.content_type == other.content_type
			&& self.file_name == other.file_name
	}
}

/// A multipart part whose body spilled to disk because it exceeded the
/// configured `spool_max_size`.
#[derive(Debug)]
pub struct SpooledPart {
	pub name: String,
	pub content_type: Option<String>,
	pub file_name: Option<String>,
	pub path: PathBuf,
	pub size: u64,
	handle: std::fs::File,
}

impl SpooledPart {
	pub fn new(
		name: String,
		content_type: Option<String>,
		file_name: Option<String>,
		path: PathBuf,
		size: u64,
		handle: std::fs::File,
	) -> Self {
		Self {
			name,
			content_type,
			file_name,
			path,
			size,
			handle,
		}
	}

	/// Reads the full spooled body back into memory. Intended for tests and
	/// small-scale handlers; large uploads should stream from `path()`.
	pub fn read_to_end(&mut self) -> std::io::Result<Vec<u8>> {
		use std::io::{Read, Seek, SeekFrom};
		self.handle.seek(SeekFrom::Start(0))?;
		let mut buf = Vec::new();
		self.handle.read_to_end(&mut buf)?;
		Ok(buf)
	}

	pub fn path(&self) -> &std::path::Path {
		&self.path
	}
}

/// One Server-Sent Event.
#[derive(Debug, Clone, Default)]
pub struct ServerSentEvent {
	pub id: Option<String>,
	pub event: Option<String>,
	pub data: String,
	pub retry: Option<u64>,
	pub comment: Option<String>,
}

impl ServerSentEvent {
	pub fn new(data: impl Into<String>) -> Self {
		Self {
			data: data.into(),
			..Default::default()
		}
	}

	/// Renders the event using the SSE wire format (§6 of the specification):
	/// `id:`/`event:`/`data:`/`retry:` lines (each value with embedded
	/// newlines escaped onto their own `data:` line) followed by a blank
	/// line terminator.
	pub fn to_wire_format(&self) -> String {
		let mut out = String::new();
		if let Some(comment) = &self.comment {
			for line in comment.split('\n') {
				out.push_str(&format!(": {line}\n"));
			}
		}
		if let Some(id) = &self.id {
			out.push_str(&format!("id: {id}\n"));
		}
		if let Some(event) = &self.event {
			out.push_str(&format!("event: {event}\n"));
		}
		for line in self.data.split('\n') {
			out.push_str(&format!("data: {line}\n"));
		}
		if let Some(retry) = self.retry {
			out.push_str(&format!("retry: {retry}\n"));
		}
		out.push('\n');
		out
	}
}

/// A request/response body.
pub enum Content {
	/// Fully buffered body of known length.
	InMemory {
		content_type: Option<String>,
		body: Bytes,
	},
	/// An async source yielding chunks; length may be unknown.
	Streamed {
		content_type: Option<String>,
		stream: ByteStream,
		declared_length: Option<u64>,
	},
	/// Parsed `application/x-www-form-urlencoded` or `multipart/form-data`.
	Form(Vec<(String, String)>),
	/// Parsed `multipart/form-data`, in-memory parts.
	Multipart(Vec<FormPart>),
	/// Parsed `multipart/form-data` parts that spilled to disk.
	SpooledMultipart(Vec<SpooledPart>),
	/// Lazily produced SSE stream.
	ServerSentEvents(Pin<Box<dyn Stream<Item = ServerSentEvent> + Send>>),
	/// No body at all.
	Empty,
}

impl Content {
	pub fn text(value: impl Into<String>) -> Self {
		Content::InMemory {
			content_type: Some("text/plain; charset=utf-8".to_string()),
			body: Bytes::from(value.into()),
		}
	}

	pub fn html(value: impl Into<String>) -> Self {
		Content::InMemory {
			content_type: Some("text/html; charset=utf-8".to_string()),
			body: Bytes::from(value.into()),
		}
	}

	pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
		let body = serde_json::to_vec(value).map_err(Error::from)?;
		Ok(Content::InMemory {
			content_type: Some("application/json".to_string()),
			body: Bytes::from(body),
		})
	}

	pub fn bytes(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
		Content::InMemory {
			content_type: Some(content_type.into()),
			body: body.into(),
		}
	}

	pub fn content_type(&self) -> Option<&str> {
		match self {
			Content::InMemory { content_type, .. } => content_type.as_deref(),
			Content::Streamed { content_type, .. } => content_type.as_deref(),
			Content::Form(_) => Some("application/x-www-form-urlencoded"),
			Content::Multipart(_) | Content::SpooledMultipart(_) => Some("multipart/form-data"),
			Content::ServerSentEvents(_) => Some("text/event-stream"),
			Content::Empty => None,
		}
	}

	pub fn declared_length(&self) -> Option<u64> {
		match self {
			Content::InMemory { body, .. } => Some(body.len() as u64),
			Content::Streamed {
				declared_length, ..
			} => *declared_length,
			_ => None,
		}
	}

	/// Reads the whole body into memory, if it is the in-memory variant.
	/// Other variants return an error: callers should match on the
	/// variant they expect instead of assuming bytes are always available.
	pub fn as_bytes(&self) -> Result<&Bytes> {
		match self {
			Content::InMemory { body, .. } => Ok(body),
			_ => Err(Error::BadRequest(
				"content is not an in-memory body".to_string(),
			)),
		}
	}
}

/// `application/x-www-form-urlencoded` encode/decode, matching
/// `parse_www_form_urlencoded`/`write_www_form_urlencoded` in the source.
pub fn parse_www_form_urlencoded(body: &[u8]) -> Vec<(String, String)> {
	serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).unwrap_or_default()
}

pub fn write_www_form_urlencoded(pairs: &[(String, String)]) -> Bytes {
	Bytes::from(serde_urlencoded::to_string(pairs).unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sse_wire_format_single_line() {
		let event = ServerSentEvent {
			id: Some("1".to_string()),
			event: Some("message".to_string()),
			data: "hello".to_string(),
			retry: Some(1000),
			comment: None,
		};
		let wire = event.to_wire_format();
		assert_eq!(wire, "id: 1\nevent: message\ndata: hello\nretry: 1000\n\n");
	}

	#[test]
	fn sse_wire_format_multiline_data() {
		let event = ServerSentEvent::new("line1\nline2");
		let wire = event.to_wire_format();
		assert_eq!(wire, "data: line1\ndata: line2\n\n");
	}

	#[test]
	fn form_urlencoded_round_trip() {
		let pairs = vec![("a".to_string(), "1".to_string()), ("b".to_string(), "x y".to_string())];
		let encoded = write_www_form_urlencoded(&pairs);
		let decoded = parse_www_form_urlencoded(&encoded);
		assert_eq!(decoded, pairs);
	}
}
