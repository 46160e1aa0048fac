//! Client-level error types shared across flows, providers, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem or misuse of a flow.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure or non-success HTTP status.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The request token presented with the callback is not the one held by the client.
	#[error("Request token does not match the token held by the client.")]
	RequestTokenMismatch,
	/// Provider response lacked the keys required by the current exchange step.
	#[error("Provider returned a malformed {stage} response: {reason}.")]
	MalformedResponse {
		/// Exchange step that received the response.
		stage: &'static str,
		/// Which expectation the response failed.
		reason: String,
		/// Raw response body, kept so callers can diagnose provider-side issues.
		body: String,
	},
	/// Provider declared a JSON body that could not be decoded.
	#[error("Provider returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Operation is not available for the provider or protocol.
	#[error("Provider `{provider}` does not support {operation}.")]
	Unsupported {
		/// Provider identifier string.
		provider: String,
		/// Operation label.
		operation: &'static str,
	},
}

/// Configuration and validation failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A URL supplied by the caller or descriptor cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// OAuth 1.0a requests must pass parameters through the params channel so they get signed.
	#[error("Request parameters must be passed as params, not inlined in the URL `{url}`.")]
	InlineQuery {
		/// URL that carried a query string.
		url: String,
	},
	/// The operation requires an OAuth 1.0a token that the client does not hold yet.
	#[error("Client does not hold an OAuth 1.0a token; obtain a request token first.")]
	MissingRequestToken,
	/// Callback parameters did not include the expected key.
	#[error("Callback parameters are missing `{key}`.")]
	MissingCallbackParameter {
		/// Expected parameter name.
		key: &'static str,
	},
	/// Registry lookup failed.
	#[error("Provider `{name}` is not registered.")]
	UnknownProvider {
		/// Requested provider name.
		name: String,
	},
	/// Descriptor was handed to a flow implementing the other protocol version.
	#[error("Descriptor `{descriptor}` targets {found}, expected {expected}.")]
	ProtocolMismatch {
		/// Provider identifier string.
		descriptor: String,
		/// Protocol version the flow implements.
		expected: &'static str,
		/// Protocol version declared by the descriptor.
		found: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// HTTP client failure that carries no structured error.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied message.
		message: String,
	},
	/// Provider answered a required exchange step with a non-success status.
	#[error("Provider responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Raw response body.
		body: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns the HTTP status when the failure came from a provider response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
