//! OAuth 2.0 authorization-code exchange, refresh, and bearer-authenticated requests.

// crates.io
use oauth2::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{OAuth2Credentials, Secret, User},
	flows::{
		AccessTokenRequest, ResourceRequest, TokenGrant,
		common::{self, upsert},
		user_info,
	},
	http::{self, FORM_CONTENT_TYPE, OAuthHttpClient, Payload, ProviderRequest, ProviderResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{BearerPlacement, ProtocolVersion, ProviderDescriptor},
};

const JSON_CONTENT_TYPE: &str = "application/json";
const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// OAuth 2.0 client bound to one provider and one end user.
pub struct OAuth2Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	descriptor: ProviderDescriptor,
	credentials: OAuth2Credentials,
	http_client: Arc<C>,
}
impl<C> OAuth2Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a flow; fails when `descriptor` is not an OAuth 2.0 provider.
	pub fn new(
		descriptor: ProviderDescriptor,
		credentials: OAuth2Credentials,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		descriptor.expect_protocol(ProtocolVersion::OAuth2)?;

		Ok(Self::from_parts(descriptor, credentials, http_client.into()))
	}

	pub(crate) fn from_parts(
		descriptor: ProviderDescriptor,
		credentials: OAuth2Credentials,
		http_client: Arc<C>,
	) -> Self {
		Self { descriptor, credentials, http_client }
	}

	/// Provider descriptor.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Current credential state.
	pub fn credentials(&self) -> &OAuth2Credentials {
		&self.credentials
	}

	/// Builds the authorization URL: defaults, then `params`, then `client_id` and
	/// `response_type=code`.
	pub fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url> {
		let mut query = common::merge(&self.descriptor.default_params, params.iter().copied());

		upsert(&mut query, "client_id".into(), self.credentials.client_id.clone());
		upsert(&mut query, "response_type".into(), "code".into());

		let mut url = self.descriptor.endpoints.authorize.clone();

		url.query_pairs_mut().extend_pairs(&query);

		Ok(url)
	}

	/// Exchanges an authorization code (or, with `grant_type=refresh_token`, a refresh
	/// token) for an access token.
	///
	/// A 2xx answer without `access_token` is not an error: the grant comes back empty with
	/// the decoded payload and the held token stays untouched.
	pub async fn access_token(&mut self, request: AccessTokenRequest) -> Result<TokenGrant> {
		let refresh = request
			.params
			.iter()
			.any(|(k, v)| k == "grant_type" && v == GRANT_REFRESH_TOKEN);
		let kind = if refresh { FlowKind::RefreshToken } else { FlowKind::AccessToken };
		let span = FlowSpan::new(kind, &self.descriptor.id);

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange(kind, request)).await;

		obs::record_flow_outcome(kind, FlowOutcome::of(&result));

		result
	}

	/// Runs the exchange with `grant_type=refresh_token`.
	pub async fn refresh_access_token(&mut self, refresh_token: impl Into<String>) -> Result<TokenGrant> {
		self.access_token(
			AccessTokenRequest::new(refresh_token.into())
				.with_param("grant_type", GRANT_REFRESH_TOKEN),
		)
		.await
	}

	/// Sends a bearer-authenticated request.
	///
	/// The token is `request.access_token` if set, else the held token. Without caller
	/// headers the request carries JSON `Accept` and form `Content-Type` defaults.
	pub async fn request(&self, request: ResourceRequest) -> Result<ProviderResponse> {
		const KIND: FlowKind = FlowKind::Resource;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let url = self.descriptor.resolve_url(&request.url)?;
				let token = request
					.access_token
					.as_ref()
					.map(Secret::expose)
					.filter(|t| !t.is_empty())
					.or_else(|| self.credentials.access_token())
					.map(str::to_owned);

				self.send(request.method, url, request.params, request.headers, request.form, token.as_deref())
					.await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Loads the user profile with the held token and projects it into a [`User`].
	pub async fn user_info(&self) -> Result<(User, Payload)> {
		const KIND: FlowKind = FlowKind::UserInfo;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let token = self.credentials.access_token();
				let (url, params) = user_info::prepare(&self.descriptor, token)?;
				let response = self.send(Method::GET, url, params, Vec::new(), None, token).await?;

				user_info::project(&self.descriptor, response)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	async fn exchange(&mut self, kind: FlowKind, request: AccessTokenRequest) -> Result<TokenGrant> {
		let code = request.callback.resolve("code")?.to_owned();
		let mut form = vec![("grant_type".to_owned(), GRANT_AUTHORIZATION_CODE.to_owned())];

		for (k, v) in request.params {
			upsert(&mut form, k, v);
		}

		upsert(&mut form, "client_id".into(), self.credentials.client_id.clone());
		upsert(&mut form, "client_secret".into(), self.credentials.client_secret.expose().to_owned());

		let code_key = match kind {
			FlowKind::RefreshToken => GRANT_REFRESH_TOKEN,
			_ => "code",
		};

		upsert(&mut form, code_key.into(), code);

		let redirect_uri = request
			.redirect_uri
			.or_else(|| self.descriptor.default_param("redirect_uri").map(str::to_owned));

		if let Some(redirect_uri) = redirect_uri {
			upsert(&mut form, "redirect_uri".into(), redirect_uri);
		}

		let url = self.descriptor.endpoints.access_token.clone();
		let response = self
			.send(Method::POST, url, Vec::new(), request.headers, Some(form), None)
			.await?
			.error_for_status()?;
		let payload = response.payload()?;
		let Some(token) = payload.get_str("access_token").filter(|t| !t.is_empty()) else {
			obs::log_missing_access_token(&self.descriptor.id, &payload.keys());

			return Ok(TokenGrant { access_token: Secret::default(), token_secret: None, payload });
		};
		let token = Secret::new(token);

		self.credentials.store_access_token(token.clone());
		obs::log_token_issued(kind, &self.descriptor.id);

		Ok(TokenGrant { access_token: token, token_secret: None, payload })
	}

	async fn send(
		&self,
		method: Method,
		url: Url,
		mut params: Vec<(String, String)>,
		mut headers: Vec<(String, String)>,
		form: Option<Vec<(String, String)>>,
		token: Option<&str>,
	) -> Result<ProviderResponse> {
		if headers.is_empty() {
			headers.push((ACCEPT.to_string(), JSON_CONTENT_TYPE.to_owned()));
			headers.push((CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_owned()));
		}

		if let Some(token) = token {
			// Query placement keeps the header too; providers that read the query ignore it.
			if self.descriptor.bearer_placement == BearerPlacement::Query {
				let key = &self.descriptor.access_token_key;

				if !params.iter().any(|(k, _)| k == key) {
					params.push((key.clone(), token.to_owned()));
				}
			}
			if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION.as_str())) {
				headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
			}
		}

		let mut request = ProviderRequest::new(method, url);

		request.query = params;
		request.headers = headers;
		request.form = form;

		http::dispatch(self.http_client.as_ref(), request).await
	}
}
impl<C> Debug for OAuth2Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Flow")
			.field("provider", &self.descriptor.id)
			.field("credentials", &self.credentials)
			.finish_non_exhaustive()
	}
}
