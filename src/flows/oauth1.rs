//! Three-legged OAuth 1.0a handshake and signed resource requests.
//!
//! The flow walks `Unauthenticated -> RequestToken -> AccessToken`: [`OAuth1Flow::request_token`]
//! obtains temporary credentials, the user visits [`OAuth1Flow::authorize_url`], and
//! [`OAuth1Flow::access_token`] trades the callback verifier for the access token. Every
//! outbound request, handshake steps included, carries a freshly signed parameter set.

// self
use crate::{
	_prelude::*,
	auth::{OAuth1Credentials, OAuth1Stage, Secret, TokenPair, User},
	error::ConfigError,
	flows::{
		AccessTokenRequest, ResourceRequest, TokenGrant,
		common::{self, upsert},
		user_info,
	},
	http::{self, OAuthHttpClient, Payload, ProviderRequest, ProviderResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{ProtocolVersion, ProviderDescriptor},
};

const OAUTH_VERSION: &str = "1.0";
const VERIFIER_KEY: &str = "oauth_verifier";
const TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// OAuth 1.0a client bound to one provider and one end user.
pub struct OAuth1Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	descriptor: ProviderDescriptor,
	credentials: OAuth1Credentials,
	http_client: Arc<C>,
}
impl<C> OAuth1Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a flow; fails when `descriptor` is not an OAuth 1.0a provider.
	pub fn new(
		descriptor: ProviderDescriptor,
		credentials: OAuth1Credentials,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		descriptor.expect_protocol(ProtocolVersion::OAuth1)?;

		Ok(Self::from_parts(descriptor, credentials, http_client.into()))
	}

	pub(crate) fn from_parts(
		descriptor: ProviderDescriptor,
		credentials: OAuth1Credentials,
		http_client: Arc<C>,
	) -> Self {
		Self { descriptor, credentials, http_client }
	}

	/// Provider descriptor.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Current credential state.
	pub fn credentials(&self) -> &OAuth1Credentials {
		&self.credentials
	}

	/// Current handshake stage.
	pub fn stage(&self) -> OAuth1Stage {
		self.credentials.stage()
	}

	/// Builds `{authorize}?oauth_token=..&{defaults}&{params}` for the held token.
	pub fn authorize_url(&self, params: &[(&str, &str)]) -> Result<Url> {
		let token = self.credentials.token().ok_or(ConfigError::MissingRequestToken)?;
		let mut query = vec![("oauth_token".to_owned(), token.to_owned())];

		for (k, v) in &self.descriptor.default_params {
			upsert(&mut query, k.clone(), v.clone());
		}
		for (k, v) in params {
			upsert(&mut query, (*k).to_owned(), (*v).to_owned());
		}

		let mut url = self.descriptor.endpoints.authorize.clone();

		url.query_pairs_mut().extend_pairs(&query);

		Ok(url)
	}

	/// Obtains temporary credentials and moves the flow to [`OAuth1Stage::RequestToken`].
	///
	/// `params` are merged over the descriptor defaults (e.g. `oauth_callback`).
	pub async fn request_token(&mut self, params: &[(&str, &str)]) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let url = self.descriptor.endpoints.request_token.clone().ok_or_else(|| {
					Error::Unsupported {
						provider: self.descriptor.id.to_string(),
						operation: "request_token",
					}
				})?;
				let params = common::merge(&self.descriptor.default_params, params.iter().copied());
				let response = self
					.send_signed(Method::GET, url, params, None, Vec::new(), None)
					.await?
					.error_for_status()?;
				let (pair, payload) = read_token_pair(&response, "oauth_token", "request_token")?;

				self.credentials.store_request_token(pair.token.clone(), pair.secret.clone());
				obs::log_token_issued(KIND, &self.descriptor.id);

				Ok(TokenGrant {
					access_token: Secret::new(pair.token),
					token_secret: Some(pair.secret),
					payload,
				})
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Trades the callback verifier for an access token.
	///
	/// When `request.request_token` is set it must equal the held token; a mismatch fails
	/// before any network traffic.
	pub async fn access_token(&mut self, request: AccessTokenRequest) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::AccessToken;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let verifier = request.callback.resolve(VERIFIER_KEY)?.to_owned();

				if let Some(expected) = request.request_token.as_deref()
					&& self.credentials.token() != Some(expected)
				{
					return Err(Error::RequestTokenMismatch);
				}

				let held = self.credentials.token_pair().cloned().ok_or(ConfigError::MissingRequestToken)?;
				let url = self.descriptor.endpoints.access_token.clone();
				let params = vec![(VERIFIER_KEY.to_owned(), verifier)];
				let response = self
					.send_signed(Method::POST, url, params, None, request.headers, Some(&held))
					.await?
					.error_for_status()?;
				let (pair, payload) =
					read_token_pair(&response, &self.descriptor.access_token_key, "access_token")?;

				self.credentials.store_access_token(pair.token.clone(), pair.secret.clone());
				obs::log_token_issued(KIND, &self.descriptor.id);

				Ok(TokenGrant {
					access_token: Secret::new(pair.token),
					token_secret: Some(pair.secret),
					payload,
				})
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Sends a signed request. Parameters must travel in `request.params`, not in the URL.
	///
	/// The response is returned whatever its status; call
	/// [`ProviderResponse::error_for_status`] to reject non-2xx answers.
	pub async fn request(&self, request: ResourceRequest) -> Result<ProviderResponse> {
		const KIND: FlowKind = FlowKind::Resource;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let url = self.descriptor.resolve_url(&request.url)?;

				self.send_signed(
					request.method,
					url,
					request.params,
					request.form,
					request.headers,
					self.credentials.token_pair(),
				)
				.await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Loads the user profile and projects it into a [`User`].
	pub async fn user_info(&self) -> Result<(User, Payload)> {
		const KIND: FlowKind = FlowKind::UserInfo;

		let span = FlowSpan::new(KIND, &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let (url, params) = user_info::prepare(&self.descriptor, self.credentials.token())?;
				let response = self
					.send_signed(Method::GET, url, params, None, Vec::new(), self.credentials.token_pair())
					.await?;

				user_info::project(&self.descriptor, response)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Returns the full signed parameter set for a request, `oauth_signature` last.
	///
	/// `form` pairs take part in the signature but are not returned. Exposed so hosts can
	/// sign requests they send through their own HTTP stack; the flow itself supplies a
	/// fresh nonce and the current timestamp on every call.
	pub fn signed_params(
		&self,
		method: &Method,
		url: &Url,
		params: Vec<(String, String)>,
		form: &[(String, String)],
		nonce: &str,
		timestamp: i64,
	) -> Vec<(String, String)> {
		self.sign(method, url, params, form, self.credentials.token_pair(), nonce, timestamp)
	}

	#[allow(clippy::too_many_arguments)]
	fn sign(
		&self,
		method: &Method,
		url: &Url,
		params: Vec<(String, String)>,
		form: &[(String, String)],
		token: Option<&TokenPair>,
		nonce: &str,
		timestamp: i64,
	) -> Vec<(String, String)> {
		let signature_method = self.descriptor.signature_method;
		let mut signed = vec![
			("oauth_consumer_key".to_owned(), self.credentials.consumer_key.clone()),
			("oauth_nonce".to_owned(), nonce.to_owned()),
			("oauth_signature_method".to_owned(), signature_method.as_str().to_owned()),
			("oauth_timestamp".to_owned(), timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		];

		for (k, v) in params {
			upsert(&mut signed, k, v);
		}

		if let Some(pair) = token {
			upsert(&mut signed, "oauth_token".to_owned(), pair.token.clone());
		}

		let signature = {
			let mut base = signed.clone();

			base.extend(form.iter().cloned());

			signature_method.sign(
				self.credentials.consumer_secret.expose(),
				method.as_str(),
				url.as_str(),
				token.map(|pair| pair.secret.expose()),
				&base,
				self.descriptor.param_encoding,
			)
		};

		signed.push(("oauth_signature".to_owned(), signature));

		signed
	}

	async fn send_signed(
		&self,
		method: Method,
		url: Url,
		params: Vec<(String, String)>,
		form: Option<Vec<(String, String)>>,
		headers: Vec<(String, String)>,
		token: Option<&TokenPair>,
	) -> Result<ProviderResponse> {
		if url.query().is_some() {
			return Err(ConfigError::InlineQuery { url: url.to_string() }.into());
		}

		let query = self.sign(
			&method,
			&url,
			params,
			form.as_deref().unwrap_or_default(),
			token,
			&common::random_nonce(),
			OffsetDateTime::now_utc().unix_timestamp(),
		);
		let mut request = ProviderRequest::new(method, url);

		request.query = query;
		request.headers = headers;
		request.form = form;

		http::dispatch(self.http_client.as_ref(), request).await
	}
}
impl<C> Debug for OAuth1Flow<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Flow")
			.field("provider", &self.descriptor.id)
			.field("credentials", &self.credentials)
			.finish_non_exhaustive()
	}
}

/// Reads `token_key` and `oauth_token_secret` from a handshake response.
fn read_token_pair(
	response: &ProviderResponse,
	token_key: &str,
	stage: &'static str,
) -> Result<(TokenPair, Payload)> {
	let payload = response.payload()?;
	let token = payload.get_str(token_key).filter(|v| !v.is_empty());
	let secret = payload.get_str(TOKEN_SECRET_KEY).filter(|v| !v.is_empty());
	let (Some(token), Some(secret)) = (token, secret) else {
		return Err(Error::MalformedResponse {
			stage,
			reason: format!("expected `{token_key}` and `{TOKEN_SECRET_KEY}`"),
			body: response.text(),
		});
	};
	let pair = TokenPair { token: token.to_owned(), secret: Secret::new(secret) };

	Ok((pair, payload))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		signature::{self, ParamEncoding},
	};

	struct NoopHttpClient;
	impl OAuthHttpClient for NoopHttpClient {
		type Handle = NoopHandle;
		type TransportError = std::io::Error;

		fn with_metadata(&self, _: http::ResponseMetadataSlot) -> Self::Handle {
			NoopHandle
		}
	}

	struct NoopHandle;
	impl<'c> oauth2::AsyncHttpClient<'c> for NoopHandle {
		type Error = oauth2::HttpClientError<std::io::Error>;
		type Future = Pin<Box<dyn Future<Output = Result<oauth2::HttpResponse, Self::Error>> + 'c + Send>>;

		fn call(&'c self, _: oauth2::HttpRequest) -> Self::Future {
			Box::pin(async { Err(oauth2::HttpClientError::Other("offline".into())) })
		}
	}

	fn flow(encoding: ParamEncoding) -> OAuth1Flow<NoopHttpClient> {
		let descriptor = ProviderDescriptor::builder(
			ProviderId::new("site").expect("Provider fixture should be valid."),
			ProtocolVersion::OAuth1,
		)
		.request_token_endpoint("https://site.com/request_token")
		.authorize_endpoint("https://site.com/authorize")
		.access_token_endpoint("https://site.com/access_token")
		.base_url("https://site.com/")
		.default_param("oauth_callback", "https://app.test/cb")
		.param_encoding(encoding)
		.build()
		.expect("Descriptor fixture should build.");
		let credentials = OAuth1Credentials::new("blablabla", "consumer_secret")
			.with_access_token("bliblibli", "oauth_token_secret");

		OAuth1Flow::new(descriptor, credentials, NoopHttpClient).expect("Flow should build.")
	}

	#[test]
	fn signed_params_match_reference_signature() {
		let flow = flow(ParamEncoding::FormUrlEncoded);
		let url = Url::parse("https://site.com/endpoint.json").expect("Fixture URL should parse.");
		let params = flow.signed_params(
			&Method::GET,
			&url,
			vec![("tweet_mode".into(), "extended".into())],
			&[],
			"blublublu",
			1644067741,
		);
		let (last_key, last_value) = params.last().expect("Signature should be appended.");

		assert_eq!(last_key, "oauth_signature");
		assert_eq!(last_value, "eqgTuU6+8g4Op1Cyu0QWk+watto=");
		assert!(params.iter().any(|(k, v)| k == "oauth_token" && v == "bliblibli"));
		assert!(params.iter().any(|(k, v)| k == "oauth_version" && v == "1.0"));
	}

	#[test]
	fn form_fields_are_signed_but_not_returned() {
		let flow = flow(ParamEncoding::Rfc3986);
		let url = Url::parse("https://site.com/update.json").expect("Fixture URL should parse.");
		let form = vec![("status".to_owned(), "hi there".to_owned())];
		let with_form = flow.signed_params(&Method::POST, &url, Vec::new(), &form, "n", 1);
		let without_form = flow.signed_params(&Method::POST, &url, Vec::new(), &[], "n", 1);

		assert!(!with_form.iter().any(|(k, _)| k == "status"));
		assert_ne!(with_form.last(), without_form.last());

		let mut expected_base = with_form[..with_form.len() - 1].to_vec();

		expected_base.extend(form);

		let expected = signature::SignatureMethod::HmacSha1.sign(
			"consumer_secret",
			"POST",
			url.as_str(),
			Some("oauth_token_secret"),
			&expected_base,
			ParamEncoding::Rfc3986,
		);

		assert_eq!(with_form.last().map(|(_, v)| v.as_str()), Some(expected.as_str()));
	}

	#[test]
	fn authorize_url_orders_token_defaults_then_params() {
		let flow = flow(ParamEncoding::FormUrlEncoded);
		let url = flow.authorize_url(&[("force_login", "true")]).expect("Token is held.");

		assert_eq!(
			url.as_str(),
			"https://site.com/authorize?oauth_token=bliblibli&oauth_callback=https%3A%2F%2Fapp.test%2Fcb&force_login=true"
		);
		assert_eq!(url, flow.authorize_url(&[("force_login", "true")]).expect("Token is held."));
	}

	#[tokio::test]
	async fn inline_query_is_rejected_before_dispatch() {
		let flow = flow(ParamEncoding::FormUrlEncoded);
		let err = flow
			.request(ResourceRequest::get("statuses/home.json?count=5"))
			.await
			.expect_err("Inline query must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InlineQuery { .. })));
	}

	#[test]
	fn oauth2_descriptor_is_rejected() {
		let descriptor = ProviderDescriptor::builder(
			ProviderId::new("o2").expect("Provider fixture should be valid."),
			ProtocolVersion::OAuth2,
		)
		.authorize_endpoint("https://o2.test/authorize")
		.access_token_endpoint("https://o2.test/token")
		.build()
		.expect("Descriptor fixture should build.");
		let result =
			OAuth1Flow::<NoopHttpClient>::new(descriptor, OAuth1Credentials::new("k", "s"), NoopHttpClient);

		assert!(matches!(result, Err(Error::Config(ConfigError::ProtocolMismatch { .. }))));
	}
}
