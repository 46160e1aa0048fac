//! Shared request types and helpers for both protocol flows.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::ConfigError,
	http::Payload,
};

const NONCE_LEN: usize = 32;

/// Verifier (OAuth 1.0a) or authorization code (OAuth 2.0) as delivered to the callback.
///
/// Hosts may forward the raw value or the whole parsed callback query; the flow picks the
/// value out of the map under `oauth_verifier` or `code` respectively.
#[derive(Clone, PartialEq, Eq)]
pub enum CallbackValue {
	/// Bare verifier or code.
	Value(String),
	/// Parsed callback query parameters.
	Params(BTreeMap<String, String>),
}
impl CallbackValue {
	/// Extracts the value, looking it up under `key` when given the callback map.
	pub fn resolve(&self, key: &'static str) -> Result<&str> {
		match self {
			Self::Value(value) => Ok(value),
			Self::Params(params) => params
				.get(key)
				.map(String::as_str)
				.ok_or_else(|| ConfigError::MissingCallbackParameter { key }.into()),
		}
	}
}
impl From<&str> for CallbackValue {
	fn from(value: &str) -> Self {
		Self::Value(value.to_owned())
	}
}
impl From<String> for CallbackValue {
	fn from(value: String) -> Self {
		Self::Value(value)
	}
}
impl From<BTreeMap<String, String>> for CallbackValue {
	fn from(params: BTreeMap<String, String>) -> Self {
		Self::Params(params)
	}
}
impl From<HashMap<String, String>> for CallbackValue {
	fn from(params: HashMap<String, String>) -> Self {
		Self::Params(params.into_iter().collect())
	}
}
impl Debug for CallbackValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Value(_) => f.write_str("CallbackValue::Value(<redacted>)"),
			Self::Params(params) =>
				f.debug_tuple("CallbackValue::Params").field(&params.keys().collect::<Vec<_>>()).finish(),
		}
	}
}

/// Input to the access-token exchange of either protocol.
#[derive(Clone, Debug)]
pub struct AccessTokenRequest {
	/// Verifier or authorization code.
	pub callback: CallbackValue,
	/// OAuth 1.0a request token the callback claims to belong to; checked against the held token.
	pub request_token: Option<String>,
	/// OAuth 2.0 redirect URI; falls back to the descriptor's `redirect_uri` default.
	pub redirect_uri: Option<String>,
	/// Extra OAuth 2.0 form fields, e.g. `grant_type`.
	pub params: Vec<(String, String)>,
	/// Extra headers sent with the exchange.
	pub headers: Vec<(String, String)>,
}
impl AccessTokenRequest {
	/// Creates an exchange request for `callback`.
	pub fn new(callback: impl Into<CallbackValue>) -> Self {
		Self {
			callback: callback.into(),
			request_token: None,
			redirect_uri: None,
			params: Vec::new(),
			headers: Vec::new(),
		}
	}

	/// Sets the request token expected by the callback.
	pub fn with_request_token(mut self, token: impl Into<String>) -> Self {
		self.request_token = Some(token.into());

		self
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Adds or replaces an extra form field.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		upsert(&mut self.params, key.into(), value.into());

		self
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}
}

/// Result of a token exchange.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Issued token; empty when an OAuth 2.0 provider answered without one.
	pub access_token: Secret,
	/// OAuth 1.0a token secret.
	pub token_secret: Option<Secret>,
	/// Decoded provider response, for provider-specific fields such as `refresh_token`.
	pub payload: Payload,
}
impl TokenGrant {
	/// Returns `true` when the provider issued a non-empty token.
	pub fn is_issued(&self) -> bool {
		!self.access_token.is_empty()
	}
}

/// Authenticated request against a provider API.
#[derive(Clone, Debug)]
pub struct ResourceRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL or path relative to the descriptor's base URL.
	pub url: String,
	/// Query parameters; OAuth 1.0a signs them.
	pub params: Vec<(String, String)>,
	/// Request headers. When empty, OAuth 2.0 requests send JSON/form defaults.
	pub headers: Vec<(String, String)>,
	/// Form body; OAuth 1.0a includes these pairs in the signature.
	pub form: Option<Vec<(String, String)>>,
	/// OAuth 2.0 bearer override for this request only.
	pub access_token: Option<Secret>,
}
impl ResourceRequest {
	/// Creates a request.
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			params: Vec::new(),
			headers: Vec::new(),
			form: None,
			access_token: None,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::GET, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: impl Into<String>) -> Self {
		Self::new(Method::POST, url)
	}

	/// Adds or replaces a query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		upsert(&mut self.params, key.into(), value.into());

		self
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Adds a form body field.
	pub fn with_form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.get_or_insert_with(Vec::new).push((key.into(), value.into()));

		self
	}

	/// Overrides the OAuth 2.0 bearer token for this request.
	pub fn with_access_token(mut self, token: impl Into<Secret>) -> Self {
		self.access_token = Some(token.into());

		self
	}
}

/// Inserts `key`, replacing an existing value in place.
pub(crate) fn upsert(params: &mut Vec<(String, String)>, key: String, value: String) {
	match params.iter_mut().find(|(k, _)| *k == key) {
		Some(slot) => slot.1 = value,
		None => params.push((key, value)),
	}
}

/// Merges `extra` over `base` with [`upsert`] semantics.
pub(crate) fn merge<'a, I>(base: &[(String, String)], extra: I) -> Vec<(String, String)>
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut merged = base.to_vec();

	for (k, v) in extra {
		upsert(&mut merged, k.to_owned(), v.to_owned());
	}

	merged
}

/// Moves the query of `url` into a parameter list, leaving `url` without a query.
pub(crate) fn split_query(url: &mut Url) -> Vec<(String, String)> {
	let params =
		url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect::<Vec<_>>();

	url.set_query(None);

	params
}

pub(crate) fn random_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
