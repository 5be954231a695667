//! Minimal type- and name-keyed service container backing `ServiceBinder`.
//!
//! This is intentionally a small stand-in for a full dependency-injection
//! crate: the specification's binder precedence only requires resolving a
//! parameter "by name" or "by declared type" and getting back `None` when
//! nothing is registered (never an error — see SPEC_FULL §4.2).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type AnyService = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ServiceScope {
	by_type: HashMap<TypeId, AnyService>,
	by_name: HashMap<String, AnyService>,
}

impl ServiceScope {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn builder() -> ServiceScopeBuilder {
		ServiceScopeBuilder::default()
	}

	pub fn get_by_type<T: 'static + Send + Sync>(&self) -> Option<Arc<T>> {
		self.by_type
			.get(&TypeId::of::<T>())
			.cloned()
			.and_then(|svc| svc.downcast::<T>().ok())
	}

	pub fn get_by_name<T: 'static + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
		self.by_name
			.get(name)
			.cloned()
			.and_then(|svc| svc.downcast::<T>().ok())
	}

	/// True when either lookup mechanism would resolve a value for `T`.
	pub fn contains_type<T: 'static + Send + Sync>(&self) -> bool {
		self.by_type.contains_key(&TypeId::of::<T>())
	}
}

#[derive(Default)]
pub struct ServiceScopeBuilder {
	by_type: HashMap<TypeId, AnyService>,
	by_name: HashMap<String, AnyService>,
}

impl ServiceScopeBuilder {
	pub fn with_type<T: 'static + Send + Sync>(mut self, value: Arc<T>) -> Self {
		self.by_type.insert(TypeId::of::<T>(), value);
		self
	}

	pub fn with_named<T: 'static + Send + Sync>(mut self, name: impl Into<String>, value: Arc<T>) -> Self {
		self.by_name.insert(name.into(), value);
		self
	}

	pub fn build(self) -> ServiceScope {
		ServiceScope {
			by_type: self.by_type,
			by_name: self.by_name,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Counter(u32);

	#[test]
	fn resolves_by_type_and_name() {
		let scope = ServiceScope::builder()
			.with_type(Arc::new(Counter(7)))
			.with_named("limit", Arc::new(42u32))
			.build();
		assert_eq!(scope.get_by_type::<Counter>().unwrap().0, 7);
		assert_eq!(*scope.get_by_name::<u32>("limit").unwrap(), 42);
		assert!(scope.get_by_type::<String>().is_none());
	}
}
