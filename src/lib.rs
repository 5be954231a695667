//! The application orchestrator: wires a router, a locked middleware
//! pipeline, WebSocket routes, settings and exception handling into the
//! `(scope, receive, send)` surface a host server drives (SPEC_FULL §4.5).
//!
//! Everything below this facade — routing, binding, middleware, auth,
//! WebSockets, multipart parsing — lives in its own `corvid-*` crate and is
//! re-exported here for convenience.

pub mod application;
pub mod exception_handlers;
pub mod testing;
pub mod websocket;

pub use application::{Application, ApplicationBuilder, LifespanHook};
pub use exception_handlers::{ExceptionHandler, ExceptionHandlerRegistry};
pub use testing::{TestClient, TestRequestBuilder};
pub use websocket::{WebSocketHandler, WebSocketRouter};

pub use corvid_core as core;
pub use corvid_router as routing;

pub use corvid_auth as auth;
pub use corvid_binding as binding;
pub use corvid_middleware as middleware;
pub use corvid_multipart as multipart;
pub use corvid_websocket as websocket_protocol;
