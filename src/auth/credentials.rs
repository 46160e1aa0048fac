//! Per-client credential state.
//!
//! One client instance drives one authorization flow for one end user. The OAuth 1.0a state
//! moves `Unauthenticated -> RequestToken -> AccessToken` and only the flow mutates it; hosts
//! that persist state between the redirect and the callback restore it through the
//! `with_*` constructors.

// self
use crate::{_prelude::*, auth::Secret};

/// Position of an OAuth 1.0a client in the three-legged handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuth1Stage {
	/// No token held yet.
	#[default]
	Unauthenticated,
	/// Holding a temporary request token awaiting user authorization.
	RequestToken,
	/// Holding an access token usable for signed resource requests.
	AccessToken,
}

/// OAuth 1.0a token and its secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Public token value (`oauth_token`).
	pub token: String,
	/// Token secret (`oauth_token_secret`) used in the signing key.
	pub secret: Secret,
}

/// Consumer credentials plus the evolving OAuth 1.0a token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Credentials {
	/// Consumer key sent as `oauth_consumer_key`.
	pub consumer_key: String,
	/// Consumer secret; first half of the signing key.
	pub consumer_secret: Secret,
	token: Option<TokenPair>,
	stage: OAuth1Stage,
}
impl OAuth1Credentials {
	/// Creates unauthenticated credentials.
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<Secret>) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			token: None,
			stage: OAuth1Stage::Unauthenticated,
		}
	}

	/// Restores a request token persisted between redirect and callback.
	pub fn with_request_token(mut self, token: impl Into<String>, secret: impl Into<Secret>) -> Self {
		self.store_request_token(token.into(), secret.into());

		self
	}

	/// Restores a previously issued access token.
	pub fn with_access_token(mut self, token: impl Into<String>, secret: impl Into<Secret>) -> Self {
		self.store_access_token(token.into(), secret.into());

		self
	}

	/// Current handshake stage.
	pub fn stage(&self) -> OAuth1Stage {
		self.stage
	}

	/// Held token pair, if any.
	pub fn token_pair(&self) -> Option<&TokenPair> {
		self.token.as_ref()
	}

	/// Held `oauth_token` value, if any.
	pub fn token(&self) -> Option<&str> {
		self.token.as_ref().map(|pair| pair.token.as_str())
	}

	/// Held token secret, if any.
	pub fn token_secret(&self) -> Option<&str> {
		self.token.as_ref().map(|pair| pair.secret.expose())
	}

	pub(crate) fn store_request_token(&mut self, token: String, secret: Secret) {
		self.token = Some(TokenPair { token, secret });
		self.stage = OAuth1Stage::RequestToken;
	}

	pub(crate) fn store_access_token(&mut self, token: String, secret: Secret) {
		self.token = Some(TokenPair { token, secret });
		self.stage = OAuth1Stage::AccessToken;
	}
}

/// OAuth 2.0 client registration plus the bearer token, once issued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Credentials {
	/// Client identifier.
	pub client_id: String,
	/// Client secret sent with token exchanges.
	pub client_secret: Secret,
	access_token: Option<Secret>,
}
impl OAuth2Credentials {
	/// Creates credentials without an access token.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into(), access_token: None }
	}

	/// Restores a previously issued access token.
	pub fn with_access_token(mut self, token: impl Into<Secret>) -> Self {
		self.store_access_token(token.into());

		self
	}

	/// Held access token, if any. Empty tokens count as absent.
	pub fn access_token(&self) -> Option<&str> {
		self.access_token.as_ref().map(Secret::expose).filter(|token| !token.is_empty())
	}

	pub(crate) fn store_access_token(&mut self, token: Secret) {
		self.access_token = Some(token);
	}
}
