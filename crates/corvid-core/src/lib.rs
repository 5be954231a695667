//! Core URL, header, cookie, content, request/response, error and settings
//! primitives shared by every other `corvid` crate.

pub mod content;
pub mod cookie;
pub mod exception;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod services;
pub mod settings;
pub mod url;

pub use content::Content;
pub use cookie::Cookie;
pub use exception::{Error, Result};
pub use handler::Handler;
pub use headers::HeaderList;
pub use request::{Identity, Request, RequestBuilder, Scope};
pub use response::Response;
pub use services::ServiceScope;
pub use settings::{ForwardedHeadersPolicy, Settings, SettingsBuilder};
pub use url::Url;
