//! The `Middleware` trait and the right-to-left fold that composes a
//! sorted middleware list with a terminal handler into a single `Handler`
//! (SPEC_FULL §4.4).
//!
//! Grounded on `reinhardt-urls/crates/routers/tests/middleware_integration.rs`,
//! which exercises this exact composition order (global, then group, then
//! route, then handler) through a `Middleware::process(request, next)` trait.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_core::exception::Result;
use corvid_core::{Handler, Request, Response};

use crate::category::MiddlewareCategory;

#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

#[async_trait]
impl<F, Fut> Middleware for F
where
	F: Fn(Request, Arc<dyn Handler>) -> Fut + Send + Sync,
	Fut: std::future::Future<Output = Result<Response>> + Send,
{
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		(self)(request, next).await
	}
}

/// A middleware plus its place in the ordering. Stable-sorted by
/// `(category, priority)`; registration order breaks remaining ties.
#[derive(Clone)]
pub struct CategorizedMiddleware {
	pub category: MiddlewareCategory,
	pub priority: i32,
	pub middleware: Arc<dyn Middleware>,
}

impl CategorizedMiddleware {
	pub fn new(category: MiddlewareCategory, priority: i32, middleware: Arc<dyn Middleware>) -> Self {
		Self {
			category,
			priority,
			middleware,
		}
	}
}

/// A composed, frozen middleware chain terminating in a handler. Built once
/// at startup; adding middleware after [`Pipeline::build`] is not possible
/// by construction (no `push` is exposed on the built value).
pub struct Pipeline {
	entry: Arc<dyn Handler>,
}

impl Pipeline {
	/// Sorts `middlewares` by `(category, priority)`, stable on ties, then
	/// folds right-to-left: the last middleware wraps `terminal` directly,
	/// the first wraps everything after it.
	pub fn build(mut middlewares: Vec<CategorizedMiddleware>, terminal: Arc<dyn Handler>) -> Self {
		middlewares.sort_by(|a, b| (a.category, a.priority).cmp(&(b.category, b.priority)));

		let entry = middlewares
			.into_iter()
			.rev()
			.fold(terminal, |next, entry| -> Arc<dyn Handler> {
				Arc::new(MiddlewareHandler {
					middleware: entry.middleware,
					next,
				})
			});

		Self { entry }
	}

	pub fn handler(&self) -> Arc<dyn Handler> {
		self.entry.clone()
	}
}

struct MiddlewareHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for MiddlewareHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}
