//! A single registered route: method, compiled pattern, handler and the
//! metadata (name/namespace) used for `reverse()`.

use std::sync::Arc;

use corvid_core::Handler;
use http::Method;

use crate::pattern::CompiledPattern;

#[derive(Clone)]
pub struct Route {
	pub method: Option<Method>,
	pub path: String,
	pub name: Option<String>,
	pub namespace: Option<String>,
	pub(crate) pattern: CompiledPattern,
	pub handler: Arc<dyn Handler>,
}

impl Route {
	pub(crate) fn reverse_key(&self) -> Option<String> {
		let name = self.name.as_ref()?;
		Some(match &self.namespace {
			Some(ns) => format!("{ns}:{name}"),
			None => name.clone(),
		})
	}
}
