//! Protocol flows and the protocol-agnostic [`Client`] facade.

pub mod common;

mod oauth1;
mod oauth2;
mod user_info;

pub use common::*;
pub use oauth1::*;
pub use oauth2::*;

// self
use crate::{
	_prelude::*,
	auth::{OAuth1Credentials, OAuth2Credentials, User},
	http::{OAuthHttpClient, Payload, ProviderResponse},
	provider::{ProtocolVersion, ProviderDescriptor},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by [`OAuthFlow`] methods.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestOAuthClient = Client<ReqwestHttpClient>;

/// Operations shared by both protocol versions.
///
/// Implemented by [`OAuth1Flow`], [`OAuth2Flow`], and [`Client`] so hosts can hold any of
/// them behind one interface.
pub trait OAuthFlow
where
	Self: Send + Sync,
{
	/// Provider descriptor.
	fn descriptor(&self) -> &ProviderDescriptor;

	/// URL the end user visits to grant access.
	fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url>;

	/// Exchanges a verifier or authorization code for an access token.
	fn access_token<'a>(&'a mut self, request: AccessTokenRequest) -> FlowFuture<'a, TokenGrant>;

	/// Sends an authenticated request.
	fn request<'a>(&'a self, request: ResourceRequest) -> FlowFuture<'a, ProviderResponse>;

	/// Loads and projects the end user's profile.
	fn user_info<'a>(&'a self) -> FlowFuture<'a, (User, Payload)>;
}
impl<C> OAuthFlow for OAuth1Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		OAuth1Flow::descriptor(self)
	}

	fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url> {
		OAuth1Flow::authorize_url(self, params)
	}

	fn access_token<'a>(&'a mut self, request: AccessTokenRequest) -> FlowFuture<'a, TokenGrant> {
		Box::pin(OAuth1Flow::access_token(self, request))
	}

	fn request<'a>(&'a self, request: ResourceRequest) -> FlowFuture<'a, ProviderResponse> {
		Box::pin(OAuth1Flow::request(self, request))
	}

	fn user_info<'a>(&'a self) -> FlowFuture<'a, (User, Payload)> {
		Box::pin(OAuth1Flow::user_info(self))
	}
}
impl<C> OAuthFlow for OAuth2Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		OAuth2Flow::descriptor(self)
	}

	fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url> {
		OAuth2Flow::authorize_url(self, params)
	}

	fn access_token<'a>(&'a mut self, request: AccessTokenRequest) -> FlowFuture<'a, TokenGrant> {
		Box::pin(OAuth2Flow::access_token(self, request))
	}

	fn request<'a>(&'a self, request: ResourceRequest) -> FlowFuture<'a, ProviderResponse> {
		Box::pin(OAuth2Flow::request(self, request))
	}

	fn user_info<'a>(&'a self) -> FlowFuture<'a, (User, Payload)> {
		Box::pin(OAuth2Flow::user_info(self))
	}
}

/// Provider client whose protocol is chosen by the descriptor.
///
/// Built from a [`ProviderDescriptor`] plus the application's key and secret, which become
/// the consumer key/secret for OAuth 1.0a providers and the client id/secret for OAuth 2.0
/// providers.
pub enum Client<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// OAuth 1.0a provider.
	OAuth1(OAuth1Flow<C>),
	/// OAuth 2.0 provider.
	OAuth2(OAuth2Flow<C>),
}
impl<C> Client<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a client in its initial state for `descriptor`.
	pub fn new(
		descriptor: ProviderDescriptor,
		key: impl Into<String>,
		secret: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let http_client = http_client.into();
		let secret = secret.into();

		match descriptor.protocol {
			ProtocolVersion::OAuth1 => Self::OAuth1(OAuth1Flow::from_parts(
				descriptor,
				OAuth1Credentials::new(key, secret),
				http_client,
			)),
			ProtocolVersion::OAuth2 => Self::OAuth2(OAuth2Flow::from_parts(
				descriptor,
				OAuth2Credentials::new(key, secret),
				http_client,
			)),
		}
	}

	/// Protocol spoken by the provider.
	pub fn protocol(&self) -> ProtocolVersion {
		self.flow().descriptor().protocol
	}

	/// Returns the OAuth 1.0a flow, if this is an OAuth 1.0a client.
	pub fn as_oauth1(&self) -> Option<&OAuth1Flow<C>> {
		match self {
			Self::OAuth1(flow) => Some(flow),
			Self::OAuth2(_) => None,
		}
	}

	/// Mutable variant of [`Client::as_oauth1`].
	pub fn as_oauth1_mut(&mut self) -> Option<&mut OAuth1Flow<C>> {
		match self {
			Self::OAuth1(flow) => Some(flow),
			Self::OAuth2(_) => None,
		}
	}

	/// Returns the OAuth 2.0 flow, if this is an OAuth 2.0 client.
	pub fn as_oauth2(&self) -> Option<&OAuth2Flow<C>> {
		match self {
			Self::OAuth2(flow) => Some(flow),
			Self::OAuth1(_) => None,
		}
	}

	/// Mutable variant of [`Client::as_oauth2`].
	pub fn as_oauth2_mut(&mut self) -> Option<&mut OAuth2Flow<C>> {
		match self {
			Self::OAuth2(flow) => Some(flow),
			Self::OAuth1(_) => None,
		}
	}

	/// Obtains OAuth 1.0a temporary credentials; unsupported for OAuth 2.0 providers.
	pub async fn request_token(&mut self, params: &[(&str, &str)]) -> Result<TokenGrant> {
		match self {
			Self::OAuth1(flow) => flow.request_token(params).await,
			Self::OAuth2(flow) => Err(Error::Unsupported {
				provider: flow.descriptor().id.to_string(),
				operation: "request_token",
			}),
		}
	}

	/// Refreshes an OAuth 2.0 access token; unsupported for OAuth 1.0a providers.
	pub async fn refresh_access_token(&mut self, refresh_token: impl Into<String>) -> Result<TokenGrant> {
		match self {
			Self::OAuth2(flow) => flow.refresh_access_token(refresh_token).await,
			Self::OAuth1(flow) => Err(Error::Unsupported {
				provider: flow.descriptor().id.to_string(),
				operation: "refresh_access_token",
			}),
		}
	}

	fn flow(&self) -> &dyn OAuthFlow {
		match self {
			Self::OAuth1(flow) => flow,
			Self::OAuth2(flow) => flow,
		}
	}

	fn flow_mut(&mut self) -> &mut dyn OAuthFlow {
		match self {
			Self::OAuth1(flow) => flow,
			Self::OAuth2(flow) => flow,
		}
	}
}
impl<C> OAuthFlow for Client<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		self.flow().descriptor()
	}

	fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url> {
		self.flow().authorize_url(params)
	}

	fn access_token<'a>(&'a mut self, request: AccessTokenRequest) -> FlowFuture<'a, TokenGrant> {
		self.flow_mut().access_token(request)
	}

	fn request<'a>(&'a self, request: ResourceRequest) -> FlowFuture<'a, ProviderResponse> {
		self.flow().request(request)
	}

	fn user_info<'a>(&'a self) -> FlowFuture<'a, (User, Payload)> {
		self.flow().user_info()
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::OAuth1(flow) => f.debug_tuple("Client::OAuth1").field(flow).finish(),
			Self::OAuth2(flow) => f.debug_tuple("Client::OAuth2").field(flow).finish(),
		}
	}
}
