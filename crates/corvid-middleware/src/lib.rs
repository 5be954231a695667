//! The middleware pipeline: a fixed category ordering, priority-broken ties
//! within a category, and the built-in cross-cutting middlewares that plug
//! into it (SPEC_FULL §4.4).

pub mod builtin;
pub mod category;
pub mod pipeline;

pub use builtin::*;
pub use category::MiddlewareCategory;
pub use pipeline::{CategorizedMiddleware, Middleware, Pipeline};
