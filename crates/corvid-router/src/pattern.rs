//! Path pattern compilation: literal segments, `:name`/`{name}`/`{conv:name}`
//! captures, and `*`/`*.ext` trailing wildcards.
//!
//! Grounded on `examples/original_source/blacksheep/server/routing.py`'s
//! `_get_regex_for_pattern`: escape literals, turn `*` into a greedy tail
//! group, turn named segments into `[^/]+` groups (or a conv-specific
//! class), anchor case-insensitively, and reject duplicate capture names.

use std::collections::HashMap;

use corvid_core::exception::{Error, Result};
use regex::Regex;

/// A restriction on what a captured segment may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conv {
	Str,
	Int,
	Float,
	Uuid,
}

impl Conv {
	fn from_name(name: &str) -> Self {
		match name {
			"int" => Conv::Int,
			"float" => Conv::Float,
			"uuid" => Conv::Uuid,
			_ => Conv::Str,
		}
	}

	fn char_class(self) -> &'static str {
		match self {
			Conv::Str => "[^/]+",
			Conv::Int => "[0-9]+",
			Conv::Float => r"[0-9]+(?:\.[0-9]+)?",
			Conv::Uuid => "[0-9a-fA-F-]{36}",
		}
	}
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
	pub source: String,
	pub param_names: Vec<String>,
	regex: Option<Regex>,
	literal: Option<String>,
}

impl CompiledPattern {
	/// Literal-only patterns skip the regex engine entirely (fast path),
	/// matching case-insensitively by byte value.
	pub fn is_literal(&self) -> bool {
		self.literal.is_some()
	}

	pub fn matches<'a>(&self, path: &'a str) -> Option<HashMap<String, String>> {
		if let Some(literal) = &self.literal {
			return if literal.eq_ignore_ascii_case(path) {
				Some(HashMap::new())
			} else {
				None
			};
		}
		let regex = self.regex.as_ref()?;
		let captures = regex.captures(path)?;
		let mut values = HashMap::new();
		for name in &self.param_names {
			if let Some(m) = captures.name(name) {
				let decoded = percent_encoding::percent_decode_str(m.as_str())
					.decode_utf8_lossy()
					.into_owned();
				values.insert(name.clone(), decoded);
			}
		}
		Some(values)
	}
}

/// Compiles a `:name` / `{name}` / `{conv:name}` / `*` pattern into a
/// [`CompiledPattern`].
pub fn compile_pattern(pattern: &str) -> Result<CompiledPattern> {
	if pattern.is_empty() {
		return Ok(CompiledPattern {
			source: pattern.to_string(),
			param_names: Vec::new(),
			regex: None,
			literal: Some(String::new()),
		});
	}

	let mut param_names: Vec<String> = Vec::new();
	let mut regex_src = String::from("^");
	let mut chars = pattern.chars().peekable();
	let mut has_dynamic = false;

	while let Some(c) = chars.next() {
		match c {
			':' => {
				has_dynamic = true;
				let mut name = String::new();
				while let Some(&n) = chars.peek() {
					if n == '/' {
						break;
					}
					name.push(n);
					chars.next();
				}
				push_named_group(&mut regex_src, &mut param_names, &name, Conv::Str)?;
			}
			'{' => {
				has_dynamic = true;
				let mut inner = String::new();
				let mut closed = false;
				for n in chars.by_ref() {
					if n == '}' {
						closed = true;
						break;
					}
					inner.push(n);
				}
				if !closed {
					return Err(Error::InvalidPattern(format!(
						"unterminated '{{' in pattern {pattern}"
					)));
				}
				let (conv, name) = match inner.split_once(':') {
					Some((conv, name)) => (Conv::from_name(conv), name.to_string()),
					None => (Conv::Str, inner),
				};
				push_named_group(&mut regex_src, &mut param_names, &name, conv)?;
			}
			'*' => {
				has_dynamic = true;
				// `*` or `*.ext`: capture the remainder, optionally requiring a suffix.
				let mut suffix = String::new();
				while let Some(&n) = chars.peek() {
					suffix.push(n);
					chars.next();
				}
				if suffix.is_empty() {
					regex_src.push_str("(?P<tail>.+)");
				} else {
					regex_src.push_str(&format!("(?P<tail>.+{})", regex::escape(&suffix)));
				}
				param_names.push("tail".to_string());
			}
			other => {
				regex_src.push_str(&regex::escape(&other.to_string()));
			}
		}
	}
	regex_src.push('$');

	if !has_dynamic {
		return Ok(CompiledPattern {
			source: pattern.to_string(),
			param_names: Vec::new(),
			regex: None,
			literal: Some(pattern.to_string()),
		});
	}

	let regex = Regex::new(&format!("(?i){regex_src}"))
		.map_err(|e| Error::InvalidPattern(format!("{pattern}: {e}")))?;

	Ok(CompiledPattern {
		source: pattern.to_string(),
		param_names,
		regex: Some(regex),
		literal: None,
	})
}

fn push_named_group(
	regex_src: &mut String,
	param_names: &mut Vec<String>,
	name: &str,
	conv: Conv,
) -> Result<()> {
	if param_names.iter().any(|p| p == name) {
		return Err(Error::InvalidPattern(format!(
			"duplicate capture name '{name}'"
		)));
	}
	regex_src.push_str(&format!("(?P<{name}>{})", conv.char_class()));
	param_names.push(name.to_string());
	Ok(())
}

/// Trivial passthrough macro kept for parity with call sites that annotate a
/// literal pattern string (useful as a single place to later add compile-time
/// pattern validation).
#[macro_export]
macro_rules! path {
	($s:literal) => {
		$s
	};
}

/// A named pattern plus the opaque handler identifier it resolves to.
pub struct PathPattern {
	compiled: CompiledPattern,
}

impl PathPattern {
	pub fn new(pattern: impl AsRef<str>) -> Result<Self> {
		Ok(Self {
			compiled: compile_pattern(pattern.as_ref())?,
		})
	}
}

/// Matches a flat list of registered patterns against a path. This is the
/// matching primitive `corvid_router::Router` builds method-indexing on top
/// of.
#[derive(Default)]
pub struct PathMatcher {
	entries: Vec<(CompiledPattern, String)>,
}

impl PathMatcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_pattern(&mut self, pattern: PathPattern, handler_id: String) {
		self.entries.push((pattern.compiled, handler_id));
	}

	/// First-match-wins lookup (registration order), per invariant 3.
	pub fn match_path(&self, path: &str) -> Option<(String, HashMap<String, String>)> {
		for (pattern, handler_id) in &self.entries {
			if let Some(params) = pattern.matches(path) {
				return Some((handler_id.clone(), params));
			}
		}
		None
	}
}
