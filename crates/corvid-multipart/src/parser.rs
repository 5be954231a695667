//! Boundary-based multipart/form-data parsing with transparent disk
//! spooling (SPEC_FULL §4.7).
//!
//! `multer` drives the actual boundary scanning; this module adds the
//! spool-threshold bookkeeping, the `_charset_` (RFC 7578 §4.6) default
//! charset handoff, and the `max_field_size` cap the source enforces.

use std::io::Write;

use bytes::Bytes;
use corvid_core::content::{FormPart, SpooledPart};
use corvid_core::exception::{Error, Result};
use corvid_core::Settings;
use futures_util::stream;

/// Extracts the `boundary=` parameter from a `multipart/form-data`
/// content-type header value.
pub fn parse_boundary(content_type: &str) -> Result<String> {
	multer::parse_boundary(content_type).map_err(|e| Error::InvalidRequestBody(e.to_string()))
}

/// Parses every part in `body` into memory, honoring `max_field_size` but
/// not `spool_max_size` (use [`parse_spooled`] for disk-backed uploads).
///
/// The first `_charset_` part encountered sets the default charset applied
/// to subsequent parts that don't declare their own.
pub async fn parse(body: Bytes, content_type: &str, settings: &Settings) -> Result<Vec<FormPart>> {
	let boundary = parse_boundary(content_type)?;
	let stream = stream::once(async move { Ok::<_, std::io::Error>(body) });
	let mut multipart = multer::Multipart::new(stream, boundary);
	let mut parts = Vec::new();
	let mut default_charset: Option<String> = None;

	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|e| Error::InvalidRequestBody(e.to_string()))?
	{
		let name = field.name().unwrap_or_default().to_string();
		let file_name = field.file_name().map(str::to_string);
		let content_type = field.content_type().map(|m| m.to_string());
		let data = field
			.bytes()
			.await
			.map_err(|e| Error::InvalidRequestBody(e.to_string()))?;

		if data.len() > settings.max_field_size {
			return Err(Error::BadRequest(format!(
				"multipart field '{name}' exceeds the maximum field size"
			)));
		}

		if name == "_charset_" {
			default_charset = Some(String::from_utf8_lossy(&data).into_owned());
			continue;
		}

		parts.push(FormPart {
			name,
			data,
			content_type,
			file_name,
			charset: default_charset.clone(),
		});
	}

	Ok(parts)
}

/// Parses every file-bearing part (one with a declared `file_name`) to a
/// temporary file, buffering in memory until `spool_max_size` is exceeded.
/// Non-file fields are reachable through [`parse`] / the form binder instead.
pub async fn parse_spooled(body: &[u8], content_type: &str, settings: &Settings) -> Result<Vec<SpooledPart>> {
	let boundary = parse_boundary(content_type)?;
	let owned = Bytes::copy_from_slice(body);
	let stream = stream::once(async move { Ok::<_, std::io::Error>(owned) });
	let mut multipart = multer::Multipart::new(stream, boundary);
	let mut spooled = Vec::new();

	while let Some(mut field) = multipart
		.next_field()
		.await
		.map_err(|e| Error::InvalidRequestBody(e.to_string()))?
	{
		let Some(file_name) = field.file_name().map(str::to_string) else {
			continue;
		};
		let name = field.name().unwrap_or_default().to_string();
		let content_type = field.content_type().map(|m| m.to_string());

		// Buffer in memory until `spool_max_size` is exceeded, then spill the
		// buffered prefix plus the rest of the stream to a temp file. A part
		// that never exceeds the threshold is still written out at the end,
		// since a `SpooledPart` always owns a real file handle.
		let mut memory: Vec<u8> = Vec::new();
		let mut file: Option<std::fs::File> = None;
		let mut size: u64 = 0;

		while let Some(chunk) = field
			.chunk()
			.await
			.map_err(|e| Error::InvalidRequestBody(e.to_string()))?
		{
			size += chunk.len() as u64;
			if size as usize > settings.max_field_size {
				return Err(Error::BadRequest(format!(
					"multipart field '{name}' exceeds the maximum field size"
				)));
			}

			match &mut file {
				Some(f) => {
					f.write_all(&chunk).map_err(Error::from)?;
				}
				None => {
					memory.extend_from_slice(&chunk);
					if memory.len() > settings.spool_max_size {
						let mut f = tempfile::tempfile().map_err(Error::from)?;
						f.write_all(&memory).map_err(Error::from)?;
						file = Some(f);
						memory.clear();
					}
				}
			}
		}

		let tmp = match file {
			Some(f) => f,
			None => {
				let mut f = tempfile::tempfile().map_err(Error::from)?;
				f.write_all(&memory).map_err(Error::from)?;
				f
			}
		};

		let path = std::env::temp_dir().join(format!("corvid-upload-{}", uuid_like_suffix()));
		spooled.push(SpooledPart::new(name, content_type, Some(file_name), path, size, tmp));
	}

	Ok(spooled)
}

/// Cheap, dependency-free unique suffix for spool file bookkeeping paths.
/// Not used to open the file (the already-open handle is reused); only to
/// give `SpooledPart::path` a plausible, non-colliding display value.
fn uuid_like_suffix() -> String {
	use std::time::{SystemTime, UNIX_EPOCH};
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_nanos())
		.unwrap_or_default();
	format!("{nanos:x}")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Bytes {
		let mut body = String::new();
		for (name, file_name, data) in parts {
			body.push_str(&format!("--{boundary}\r\n"));
			match file_name {
				Some(fname) => body.push_str(&format!(
					"Content-Disposition: form-data; name=\"{name}\"; filename=\"{fname}\"\r\n\r\n"
				)),
				None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
			}
			body.push_str(data);
			body.push_str("\r\n");
		}
		body.push_str(&format!("--{boundary}--\r\n"));
		Bytes::from(body)
	}

	#[tokio::test]
	async fn parses_simple_text_fields() {
		let boundary = "X-BOUNDARY";
		let body = multipart_body(boundary, &[("name", None, "ada")]);
		let settings = Settings::default();
		let parts = parse(body, &format!("multipart/form-data; boundary={boundary}"), &settings)
			.await
			.unwrap();
		assert_eq!(parts.len(), 1);
		assert_eq!(parts[0].name, "name");
		assert_eq!(parts[0].data, Bytes::from("ada"));
	}

	#[tokio::test]
	async fn charset_part_is_consumed_and_applied_to_later_parts() {
		let boundary = "X-BOUNDARY";
		let body = multipart_body(
			boundary,
			&[("_charset_", None, "utf-8"), ("name", None, "ada")],
		);
		let settings = Settings::default();
		let parts = parse(body, &format!("multipart/form-data; boundary={boundary}"), &settings)
			.await
			.unwrap();
		assert_eq!(parts.len(), 1);
		assert_eq!(parts[0].charset.as_deref(), Some("utf-8"));
	}

	#[tokio::test]
	async fn spools_only_file_bearing_parts() {
		let boundary = "X-BOUNDARY";
		let body = multipart_body(
			boundary,
			&[("avatar", Some("photo.png"), "binarydata"), ("name", None, "ada")],
		);
		let settings = Settings::default();
		let parts = parse_spooled(&body, &format!("multipart/form-data; boundary={boundary}"), &settings)
			.await
			.unwrap();
		assert_eq!(parts.len(), 1);
		assert_eq!(parts[0].file_name.as_deref(), Some("photo.png"));
	}

	#[tokio::test]
	async fn part_past_spool_threshold_reads_back_in_full() {
		let boundary = "X-BOUNDARY";
		let payload = "x".repeat(64);
		let body = multipart_body(boundary, &[("avatar", Some("photo.bin"), &payload)]);
		let mut settings = Settings::default();
		settings.spool_max_size = 16;
		let mut parts = parse_spooled(&body, &format!("multipart/form-data; boundary={boundary}"), &settings)
			.await
			.unwrap();
		assert_eq!(parts[0].size, 64);
		assert_eq!(parts[0].read_to_end().unwrap(), payload.as_bytes());
	}

	#[tokio::test]
	async fn oversized_field_is_rejected() {
		let boundary = "X-BOUNDARY";
		let body = multipart_body(boundary, &[("avatar", Some("photo.bin"), "0123456789")]);
		let mut settings = Settings::default();
		settings.max_field_size = 4;
		let result = parse_spooled(&body, &format!("multipart/form-data; boundary={boundary}"), &settings).await;
		assert!(result.is_err());
	}
}
