//! Built-in cross-cutting middlewares, one module per concern. See
//! [`crate::category::MiddlewareCategory`] for how these are expected to be
//! ordered once registered with a [`crate::pipeline::Pipeline`].

pub mod authn;
pub mod authz;
pub mod cache_control;
pub mod cors;
pub mod csrf;
pub mod forwarded;
pub mod gzip;
pub mod hsts;
pub mod scheme;
pub mod security_headers;
pub mod trailing_slash;
pub mod trusted_hosts;

pub use authn::AuthenticationMiddleware;
pub use authz::AuthorizationMiddleware;
pub use cache_control::{CacheControlConfig, CacheControlMiddleware};
pub use cors::{CorsConfig, CorsMiddleware};
pub use csrf::CsrfMiddleware;
pub use forwarded::XForwardedHeadersMiddleware;
pub use gzip::GzipMiddleware;
pub use hsts::{HstsConfig, HstsMiddleware};
pub use scheme::HttpSchemeMiddleware;
pub use security_headers::{ContentSecurityPolicy, SecurityHeadersConfig, SecurityHeadersMiddleware};
pub use trailing_slash::{TrailingSlashMiddleware, TrailingSlashPolicy};
pub use trusted_hosts::TrustedHostsMiddleware;
