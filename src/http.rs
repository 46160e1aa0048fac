//! Transport primitives for OAuth exchanges and signed resource requests.
//!
//! The module exposes [`OAuthHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can plug in custom HTTP clients
//! without losing the client's instrumentation hooks. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status or retry hint is known.
//! Flows never talk to an HTTP stack directly: they describe a request, hand it to the
//! dispatcher, and receive a [`ProviderResponse`].

mod payload;

pub use payload::*;

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderMap, Request,
		header::{CONTENT_TYPE, RETRY_AFTER},
	},
};
use time::format_description::well_known::Rfc2822;
use url::{Position, form_urlencoded};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Content type sent with form-encoded request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Abstraction over HTTP transports capable of executing provider requests while
/// publishing response metadata to the client's instrumentation pipeline.
///
/// The trait acts as the crate's only dependency on an HTTP stack. Callers provide
/// an implementation (typically behind `Arc<T>` where `T: OAuthHttpClient`) and the flows
/// request short-lived [`AsyncHttpClient`] handles that each carry a clone of a
/// [`ResponseMetadataSlot`]. Implementations must be `Send + Sync + 'static` so they
/// can be shared across client instances, and the handles they return must own whatever
/// state is required so their request futures remain `Send` while in flight.
pub trait OAuthHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send` so flow
	/// futures inherit the same guarantee.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request so stale
	///   information never leaks across calls.
	/// - Once an HTTP response provides status headers, save them with
	///   [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with a custom user agent.
	pub fn with_user_agent(user_agent: &str) -> Result<Self> {
		let client =
			ReqwestClient::builder().user_agent(user_agent).build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl OAuthHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient { client: self.0.clone(), slot }))
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that records response metadata.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Outbound request assembled by a flow before it reaches the transport.
#[derive(Clone, Debug)]
pub(crate) struct ProviderRequest {
	pub(crate) method: Method,
	pub(crate) url: Url,
	pub(crate) query: Vec<(String, String)>,
	pub(crate) headers: Vec<(String, String)>,
	pub(crate) form: Option<Vec<(String, String)>>,
}
impl ProviderRequest {
	pub(crate) fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), headers: Vec::new(), form: None }
	}

	/// Endpoint without query string, safe to log.
	pub(crate) fn endpoint(&self) -> &str {
		&self.url[..Position::AfterPath]
	}

	pub(crate) fn into_http(self) -> Result<HttpRequest> {
		let Self { method, mut url, query, headers, form } = self;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(&query);
		}

		let mut builder = Request::builder().method(method).uri(url.as_str());
		let mut has_content_type = false;

		for (name, value) in &headers {
			has_content_type |= name.eq_ignore_ascii_case(CONTENT_TYPE.as_str());
			builder = builder.header(name.as_str(), value.as_str());
		}

		let body = match form {
			Some(form) => {
				if !has_content_type {
					builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
				}

				form_urlencoded::Serializer::new(String::new())
					.extend_pairs(&form)
					.finish()
					.into_bytes()
			},
			None => Vec::new(),
		};

		builder.body(body).map_err(|e| ConfigError::from(e).into())
	}
}

/// Raw provider response collected from the transport.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, if present and valid UTF-8.
	pub content_type: Option<String>,
	/// Retry-After hint, if supplied.
	pub retry_after: Option<Duration>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body according to its content type.
	pub fn payload(&self) -> Result<Payload> {
		Payload::parse(self.content_type.as_deref(), &self.body, self.status)
	}

	/// Converts non-2xx responses into [`TransportError::Status`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}

		Err(TransportError::Status {
			status: self.status,
			retry_after: self.retry_after,
			body: self.text(),
		}
		.into())
	}
}

/// Sends `request` through `http_client` and collects the response.
pub(crate) async fn dispatch<C>(http_client: &C, request: ProviderRequest) -> Result<ProviderResponse>
where
	C: ?Sized + OAuthHttpClient,
{
	crate::obs::log_request(request.method.as_str(), request.endpoint());

	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone());
	let request = request.into_http()?;
	let response = handle.call(request).await.map_err(map_client_error)?;
	let meta = slot.take().unwrap_or_default();
	let headers = response.headers();
	let content_type =
		headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).map(str::to_owned);
	let retry_after = meta.retry_after.or_else(|| parse_retry_after(headers));

	Ok(ProviderResponse {
		status: response.status().as_u16(),
		content_type,
		retry_after,
		body: response.into_body(),
	})
}

/// Maps the `oauth2` crate's transport errors into the crate taxonomy.
pub(crate) fn map_client_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner }.into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: err.to_string() }.into(),
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
