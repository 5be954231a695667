//! Crate-wide error taxonomy.
//!
//! Every fallible operation in the core returns [`Result<T>`]. Variants are
//! split into "expected" errors, each carrying the status code it maps to,
//! and a catch-all [`Error::Internal`] for truly unexpected failures. Only
//! the application orchestrator performs the `Error` -> `Response`
//! translation; nothing else should know about HTTP status codes.

use http::StatusCode;

/// Alias used throughout the core instead of `std::result::Result`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("missing parameter: {0}")]
	MissingParameter(String),

	#[error("missing request body")]
	MissingBody,

	#[error("invalid request body: {0}")]
	InvalidRequestBody(String),

	#[error("unsupported media type: {0}")]
	UnsupportedMediaType(String),

	#[error("authentication failed: {0}")]
	Authentication(String),

	#[error("authentication challenge required")]
	AuthenticateChallenge {
		scheme: String,
		realm: Option<String>,
		parameters: Vec<(String, String)>,
	},

	#[error("unauthorized: {0}")]
	Unauthorized(String),

	/// A 401 whose cause must reach the caller in a `Reason` header rather
	/// than only the JSON body (SPEC_FULL §6 CSRF: "failures surface as 401
	/// with a reason header").
	#[error("unauthorized: {reason}")]
	UnauthorizedReason { reason: String },

	#[error("forbidden: {0}")]
	Forbidden(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("route not found")]
	RouteNotFound,

	#[error("duplicate route: {method} {pattern}")]
	DuplicateRoute { method: String, pattern: String },

	#[error("invalid route pattern: {0}")]
	InvalidPattern(String),

	#[error("named route not found: {0}")]
	UnknownRouteName(String),

	#[error("rate limit exceeded")]
	RateLimitExceeded,

	#[error("configuration error: {0}")]
	Configuration(String),

	#[error("message aborted")]
	MessageAborted,

	#[error("internal error")]
	Internal(#[source] anyhow::Error),
}

impl Error {
	/// Status code this error maps to when no exception handler intercepts it.
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::BadRequest(_)
			| Error::MissingParameter(_)
			| Error::MissingBody
			| Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
			Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Error::Authentication(_) | Error::Unauthorized(_) | Error::UnauthorizedReason { .. } => StatusCode::UNAUTHORIZED,
			Error::AuthenticateChallenge { .. } => StatusCode::UNAUTHORIZED,
			Error::Forbidden(_) => StatusCode::FORBIDDEN,
			Error::NotFound(_) | Error::RouteNotFound | Error::UnknownRouteName(_) => {
				StatusCode::NOT_FOUND
			}
			Error::DuplicateRoute { .. } | Error::InvalidPattern(_) | Error::Configuration(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
			Error::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
			Error::MessageAborted => StatusCode::BAD_REQUEST,
			Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// True for errors that should never be logged as internal failures.
	pub fn is_expected(&self) -> bool {
		!matches!(
			self,
			Error::Internal(_)
				| Error::DuplicateRoute { .. }
				| Error::InvalidPattern(_)
				| Error::Configuration(_)
		)
	}

	pub fn internal(err: impl Into<anyhow::Error>) -> Self {
		Error::Internal(err.into())
	}
}

impl From<anyhow::Error> for Error {
	fn from(err: anyhow::Error) -> Self {
		Error::Internal(err)
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Error::Internal(err.into())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::InvalidRequestBody(err.to_string())
	}
}
