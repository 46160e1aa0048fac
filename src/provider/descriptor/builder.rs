// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{
		BearerPlacement, ProtocolVersion, ProviderDescriptor, ProviderEndpoints, UserInfoHook,
		UserProjection, empty_projection,
	},
	signature::{ParamEncoding, SignatureMethod},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A mandatory endpoint was not configured.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// An endpoint only meaningful for the other protocol version was configured.
	#[error("The {endpoint} endpoint is not used by {protocol} providers.")]
	UnexpectedEndpoint {
		/// Offending endpoint.
		endpoint: &'static str,
		/// Protocol declared by the descriptor.
		protocol: ProtocolVersion,
	},
	/// Endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint `{url}` is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint string that failed validation.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTP or HTTPS.
	#[error("The {endpoint} endpoint must use HTTP(S): {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Access-token key must be non-empty.
	#[error("Access token key cannot be empty.")]
	EmptyAccessTokenKey,
}

/// Builder for [`ProviderDescriptor`] values. Endpoints are parsed and checked in
/// [`ProviderDescriptorBuilder::build`].
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	id: ProviderId,
	protocol: ProtocolVersion,
	base_url: Option<String>,
	authorize_endpoint: Option<String>,
	access_token_endpoint: Option<String>,
	request_token_endpoint: Option<String>,
	user_info_endpoint: Option<String>,
	access_token_key: Option<String>,
	signature_method: SignatureMethod,
	param_encoding: ParamEncoding,
	bearer_placement: BearerPlacement,
	default_params: Vec<(String, String)>,
	user_projection: UserProjection,
	user_info_hook: Option<UserInfoHook>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and protocol.
	pub fn new(id: ProviderId, protocol: ProtocolVersion) -> Self {
		Self {
			id,
			protocol,
			base_url: None,
			authorize_endpoint: None,
			access_token_endpoint: None,
			request_token_endpoint: None,
			user_info_endpoint: None,
			access_token_key: None,
			signature_method: SignatureMethod::default(),
			param_encoding: ParamEncoding::default(),
			bearer_placement: BearerPlacement::default(),
			default_params: Vec::new(),
			user_projection: empty_projection,
			user_info_hook: None,
		}
	}

	/// Sets the base URL for relative resource paths.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the authorize endpoint.
	pub fn authorize_endpoint(mut self, url: impl Into<String>) -> Self {
		self.authorize_endpoint = Some(url.into());

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: impl Into<String>) -> Self {
		self.access_token_endpoint = Some(url.into());

		self
	}

	/// Sets the request-token endpoint (OAuth 1.0a only).
	pub fn request_token_endpoint(mut self, url: impl Into<String>) -> Self {
		self.request_token_endpoint = Some(url.into());

		self
	}

	/// Sets the user-info endpoint.
	pub fn user_info_endpoint(mut self, url: impl Into<String>) -> Self {
		self.user_info_endpoint = Some(url.into());

		self
	}

	/// Overrides the key holding the issued token.
	pub fn access_token_key(mut self, key: impl Into<String>) -> Self {
		self.access_token_key = Some(key.into());

		self
	}

	/// Overrides the OAuth 1.0a signature method.
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Overrides the OAuth 1.0a parameter encoding.
	pub fn param_encoding(mut self, encoding: ParamEncoding) -> Self {
		self.param_encoding = encoding;

		self
	}

	/// Overrides where OAuth 2.0 bearer tokens are attached.
	pub fn bearer_placement(mut self, placement: BearerPlacement) -> Self {
		self.bearer_placement = placement;

		self
	}

	/// Adds or replaces a default parameter.
	pub fn default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();

		match self.default_params.iter_mut().find(|(k, _)| *k == key) {
			Some(slot) => slot.1 = value,
			None => self.default_params.push((key, value)),
		}

		self
	}

	/// Sets the user-profile projection.
	pub fn user_projection(mut self, projection: UserProjection) -> Self {
		self.user_projection = projection;

		self
	}

	/// Installs a user-info parameter hook.
	pub fn user_info_hook(mut self, hook: UserInfoHook) -> Self {
		self.user_info_hook = Some(hook);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorize = parse_endpoint("authorize", self.authorize_endpoint)?
			.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: "authorize" })?;
		let access_token = parse_endpoint("access_token", self.access_token_endpoint)?
			.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: "access_token" })?;
		let request_token = parse_endpoint("request_token", self.request_token_endpoint)?;

		match (self.protocol, request_token.is_some()) {
			(ProtocolVersion::OAuth1, false) =>
				return Err(ProviderDescriptorError::MissingEndpoint { endpoint: "request_token" }),
			(ProtocolVersion::OAuth2, true) =>
				return Err(ProviderDescriptorError::UnexpectedEndpoint {
					endpoint: "request_token",
					protocol: self.protocol,
				}),
			_ => (),
		}

		let access_token_key = self
			.access_token_key
			.unwrap_or_else(|| self.protocol.default_access_token_key().to_owned());

		if access_token_key.is_empty() {
			return Err(ProviderDescriptorError::EmptyAccessTokenKey);
		}

		let endpoints = ProviderEndpoints {
			base: parse_endpoint("base", self.base_url)?,
			authorize,
			access_token,
			request_token,
			user_info: parse_endpoint("user_info", self.user_info_endpoint)?,
		};

		Ok(ProviderDescriptor {
			id: self.id,
			protocol: self.protocol,
			endpoints,
			access_token_key,
			signature_method: self.signature_method,
			param_encoding: self.param_encoding,
			bearer_placement: self.bearer_placement,
			default_params: self.default_params,
			user_projection: self.user_projection,
			user_info_hook: self.user_info_hook,
		})
	}
}

fn parse_endpoint(
	endpoint: &'static str,
	raw: Option<String>,
) -> Result<Option<Url>, ProviderDescriptorError> {
	let Some(raw) = raw else {
		return Ok(None);
	};
	let url = Url::parse(&raw)
		.map_err(|source| ProviderDescriptorError::InvalidEndpoint { endpoint, url: raw.clone(), source })?;

	match url.scheme() {
		"http" | "https" => Ok(Some(url)),
		_ => Err(ProviderDescriptorError::UnsupportedScheme { endpoint, url: raw }),
	}
}
