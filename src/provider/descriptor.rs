//! Provider descriptor data structures shared by all flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, UserField},
	error::ConfigError,
	signature::{ParamEncoding, SignatureMethod},
};

/// Maps a decoded user-info payload into profile fields.
pub type UserProjection = fn(&Value) -> Vec<(UserField, String)>;

/// Adjusts user-info query parameters before the request is signed or sent.
///
/// Receives the parameter list and the access token held by the client, if any.
pub type UserInfoHook = fn(&mut Vec<(String, String)>, Option<&str>);

/// OAuth protocol generation implemented by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
	/// Three-legged OAuth 1.0a with signed requests.
	#[serde(rename = "oauth1")]
	OAuth1,
	/// OAuth 2.0 authorization code grant with bearer tokens.
	#[serde(rename = "oauth2")]
	OAuth2,
}
impl ProtocolVersion {
	/// Returns a human-readable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::OAuth1 => "OAuth 1.0a",
			Self::OAuth2 => "OAuth 2.0",
		}
	}

	/// Key under which the provider returns the issued token by default.
	pub const fn default_access_token_key(self) -> &'static str {
		match self {
			Self::OAuth1 => "oauth_token",
			Self::OAuth2 => "access_token",
		}
	}
}
impl Display for ProtocolVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where OAuth 2.0 resource requests carry the bearer token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearerPlacement {
	/// `Authorization: Bearer <token>` header.
	#[default]
	Header,
	/// Query parameter named after the descriptor's access-token key, sent alongside the
	/// `Authorization` header.
	Query,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Base URL that relative resource paths are joined onto.
	pub base: Option<Url>,
	/// Page the user is redirected to for consent.
	pub authorize: Url,
	/// Token exchange endpoint.
	pub access_token: Url,
	/// OAuth 1.0a temporary credential endpoint.
	pub request_token: Option<Url>,
	/// Profile endpoint queried by `user_info`.
	pub user_info: Option<Url>,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Protocol generation.
	pub protocol: ProtocolVersion,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Key holding the issued token in exchange responses, and the bearer query key.
	pub access_token_key: String,
	/// OAuth 1.0a signature method.
	pub signature_method: SignatureMethod,
	/// OAuth 1.0a parameter canonicalization.
	pub param_encoding: ParamEncoding,
	/// OAuth 2.0 bearer placement.
	pub bearer_placement: BearerPlacement,
	/// Parameters merged into authorize URLs and request-token calls.
	pub default_params: Vec<(String, String)>,
	/// Projection applied to user-info payloads.
	pub user_projection: UserProjection,
	/// Optional user-info parameter adjustment.
	pub user_info_hook: Option<UserInfoHook>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier and protocol.
	pub fn builder(id: ProviderId, protocol: ProtocolVersion) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id, protocol)
	}

	/// Looks up a default parameter.
	pub fn default_param(&self, key: &str) -> Option<&str> {
		self.default_params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Resolves `raw` against the base URL unless it is already absolute.
	pub fn resolve_url(&self, raw: &str) -> Result<Url> {
		let invalid = |source| ConfigError::InvalidUrl { url: raw.to_owned(), source };

		if raw.starts_with("http://") || raw.starts_with("https://") {
			return Url::parse(raw).map_err(|e| invalid(e).into());
		}

		match self.endpoints.base.as_ref() {
			Some(base) => base.join(raw).map_err(|e| invalid(e).into()),
			None => Url::parse(raw).map_err(|e| invalid(e).into()),
		}
	}

	pub(crate) fn expect_protocol(&self, expected: ProtocolVersion) -> Result<()> {
		if self.protocol == expected {
			Ok(())
		} else {
			Err(ConfigError::ProtocolMismatch {
				descriptor: self.id.to_string(),
				expected: expected.as_str(),
				found: self.protocol.as_str(),
			}
			.into())
		}
	}
}

/// Projection that yields no fields.
pub fn empty_projection(_: &Value) -> Vec<(UserField, String)> {
	Vec::new()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor(base: &str) -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("demo").expect("Provider fixture should be valid."),
			ProtocolVersion::OAuth2,
		)
		.base_url(base)
		.authorize_endpoint("https://demo.test/authorize")
		.access_token_endpoint("https://demo.test/token")
		.build()
		.expect("Descriptor fixture should build.")
	}

	#[test]
	fn relative_urls_join_onto_base() {
		let demo = descriptor("https://api.demo.test/v2/");

		assert_eq!(
			demo.resolve_url("users/me").expect("Relative URL should resolve.").as_str(),
			"https://api.demo.test/v2/users/me"
		);
		assert_eq!(
			demo
				.resolve_url("https://other.test/x")
				.expect("Absolute URL should pass through.")
				.as_str(),
			"https://other.test/x"
		);
		assert_eq!(
			descriptor("https://api.github.com")
				.resolve_url("user")
				.expect("Host-only base should resolve.")
				.as_str(),
			"https://api.github.com/user"
		);
	}

	#[test]
	fn protocol_mismatch_is_reported() {
		let err = descriptor("https://api.demo.test/")
			.expect_protocol(ProtocolVersion::OAuth1)
			.expect_err("OAuth 2.0 descriptor should not pass an OAuth 1.0a check.");

		assert!(matches!(err, Error::Config(ConfigError::ProtocolMismatch { .. })));
	}
}
