//! Pattern compilation and method-indexed request routing (SPEC_FULL §4.1).

pub mod cache;
pub mod pattern;
pub mod route;
pub mod router;

pub use pattern::{compile_pattern, CompiledPattern, Conv, PathMatcher, PathPattern};
pub use route::Route;
pub use router::{path, re_path, DefaultRouter, Router, RouteBuilder};
