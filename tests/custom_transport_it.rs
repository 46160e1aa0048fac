// std
use std::collections::VecDeque;
// self
use oauth_bridge::{
	_preludet::*,
	auth::{OAuth1Credentials, OAuth2Credentials},
	flows::{AccessTokenRequest, OAuth1Flow, OAuth2Flow, ResourceRequest},
	http::{OAuthHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
	},
	provider::{ProtocolVersion, ProviderDescriptor, catalog},
	signature::{ParamEncoding, SignatureMethod},
	url::form_urlencoded,
};

#[derive(Clone, Debug)]
struct Recorded {
	method: String,
	url: Url,
	headers: Vec<(String, String)>,
	body: String,
}
impl Recorded {
	fn query(&self) -> Vec<(String, String)> {
		self.url.query_pairs().into_owned().collect()
	}

	fn form(&self) -> BTreeMap<String, String> {
		form_urlencoded::parse(self.body.as_bytes()).into_owned().collect()
	}

	fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}
}

#[derive(Default)]
struct Inner {
	requests: Mutex<Vec<Recorded>>,
	responses: Mutex<VecDeque<(u16, &'static str, &'static str)>>,
}

/// Transport that records requests and replays canned responses.
#[derive(Clone, Default)]
struct RecordingTransport(Arc<Inner>);
impl RecordingTransport {
	fn respond(&self, status: u16, content_type: &'static str, body: &'static str) -> &Self {
		self.0.responses.lock().push_back((status, content_type, body));

		self
	}

	fn requests(&self) -> Vec<Recorded> {
		self.0.requests.lock().clone()
	}
}
impl OAuthHttpClient for RecordingTransport {
	type Handle = RecordingHandle;
	type TransportError = std::io::Error;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		RecordingHandle { inner: Arc::clone(&self.0), slot }
	}
}

struct RecordingHandle {
	inner: Arc<Inner>,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for RecordingHandle {
	type Error = HttpClientError<std::io::Error>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let recorded = Recorded {
				method: request.method().to_string(),
				url: Url::parse(&request.uri().to_string())
					.map_err(|e| HttpClientError::Other(e.to_string()))?,
				headers: request
					.headers()
					.iter()
					.map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_owned()))
					.collect(),
				body: String::from_utf8_lossy(request.body()).into_owned(),
			};

			self.inner.requests.lock().push(recorded);

			let (status, content_type, body) = self
				.inner
				.responses
				.lock()
				.pop_front()
				.ok_or_else(|| HttpClientError::Other("No canned response left.".into()))?;
			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).map_err(|e| HttpClientError::Other(e.to_string()))?;
			response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

			self.slot.store(ResponseMetadata { status: Some(status), retry_after: None });

			Ok(response)
		})
	}
}

fn oauth1_descriptor(encoding: ParamEncoding) -> ProviderDescriptor {
	let mut descriptor = mock_descriptor(ProtocolVersion::OAuth1, "https://provider.test");

	descriptor.param_encoding = encoding;

	descriptor
}

fn assert_signature_valid(request: &Recorded, token_secret: Option<&str>, encoding: ParamEncoding) {
	let mut params = request.query();
	let position = params
		.iter()
		.position(|(k, _)| k == "oauth_signature")
		.expect("Request should carry a signature.");
	let (_, signature) = params.remove(position);

	params.extend(request.form());

	let mut endpoint = request.url.clone();

	endpoint.set_query(None);

	let expected = SignatureMethod::HmacSha1.sign(
		"consumer-secret",
		&request.method,
		endpoint.as_str(),
		token_secret,
		&params,
		encoding,
	);

	assert_eq!(signature, expected);
}

#[tokio::test]
async fn oauth1_signatures_verify_against_recorded_requests() {
	for encoding in [ParamEncoding::FormUrlEncoded, ParamEncoding::Rfc3986] {
		let transport = RecordingTransport::default();
		let credentials =
			OAuth1Credentials::new("consumer-key", "consumer-secret").with_access_token("tok", "tok-secret");
		let flow = OAuth1Flow::new(oauth1_descriptor(encoding), credentials, transport.clone())
			.expect("OAuth 1.0a flow should build.");

		transport.respond(200, "application/json", r#"{"id_str":"1"}"#);

		flow.request(
			ResourceRequest::post("statuses/update.json")
				.with_param("include_entities", "true")
				.with_form_param("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
		)
		.await
		.expect("Signed request should succeed.");

		let requests = transport.requests();
		let request = &requests[0];

		assert_eq!(request.method, "POST");
		assert_eq!(request.url.path(), "/api/statuses/update.json");
		assert_eq!(
			request.form().get("status").map(String::as_str),
			Some("Hello Ladies + Gentlemen, a signed OAuth request!")
		);
		assert!(!request.query().iter().any(|(k, _)| k == "status"));
		assert_signature_valid(request, Some("tok-secret"), encoding);
	}
}

#[tokio::test]
async fn oauth1_request_token_is_signed_without_token_secret() {
	let transport = RecordingTransport::default();
	let mut flow = OAuth1Flow::new(
		oauth1_descriptor(ParamEncoding::FormUrlEncoded),
		OAuth1Credentials::new("consumer-key", "consumer-secret"),
		transport.clone(),
	)
	.expect("OAuth 1.0a flow should build.");

	transport.respond(200, "text/html", "oauth_token=rt&oauth_token_secret=rs");

	flow.request_token(&[("oauth_callback", "oob")]).await.expect("Request token should succeed.");

	let requests = transport.requests();
	let query = requests[0].query();

	assert_eq!(requests[0].method, "GET");
	assert!(!query.iter().any(|(k, _)| k == "oauth_token"));
	assert_eq!(query.last().map(|(k, _)| k.as_str()), Some("oauth_signature"));
	assert_signature_valid(&requests[0], None, ParamEncoding::FormUrlEncoded);
}

#[tokio::test]
async fn oauth1_user_info_signs_endpoint_query() {
	let transport = RecordingTransport::default();
	let descriptor = catalog::descriptor("flickr").expect("Flickr should be in the catalog.");
	let encoding = descriptor.param_encoding;
	let credentials =
		OAuth1Credentials::new("consumer-key", "consumer-secret").with_access_token("acc-token", "acc-secret");
	let flow = OAuth1Flow::new(descriptor, credentials, transport.clone())
		.expect("OAuth 1.0a flow should build.");

	transport.respond(
		200,
		"application/json",
		r#"{"user":{"id":"35468159852@N01","username":{"_content":"jdoe"}},"stat":"ok"}"#,
	);

	let (user, payload) = flow.user_info().await.expect("User info should succeed.");
	let requests = transport.requests();
	let request = &requests[0];
	let query = request.query();
	let value = |key: &str| query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

	assert_eq!(request.method, "GET");
	assert_eq!(request.url.path(), "/services/rest");
	assert_eq!(value("method"), Some("flickr.test.login"));
	assert_eq!(value("format"), Some("json"));
	assert_eq!(value("nojsoncallback"), Some("1"));
	assert_eq!(value("oauth_token"), Some("acc-token"));
	assert_eq!(query.iter().filter(|(k, _)| k == "method").count(), 1);
	assert_signature_valid(request, Some("acc-secret"), encoding);
	assert_eq!(user.id.as_deref(), Some("35468159852@N01"));
	assert_eq!(user.username.as_deref(), Some("jdoe"));
	assert_eq!(payload.get_str("stat"), Some("ok"));
}

#[tokio::test]
async fn oauth2_exchange_posts_expected_form() {
	let transport = RecordingTransport::default();
	let mut descriptor = catalog::descriptor("google").expect("Google should be in the catalog.");

	descriptor.default_params.push(("redirect_uri".into(), "https://app.test/cb".into()));

	let mut flow =
		OAuth2Flow::new(descriptor, OAuth2Credentials::new("cid", "csecret"), transport.clone())
			.expect("OAuth 2.0 flow should build.");

	transport
		.respond(200, "application/json", r#"{"access_token":"a1","refresh_token":"r1"}"#)
		.respond(200, "application/json", r#"{"access_token":"a2"}"#);

	let callback = HashMap::from([("code".to_owned(), "c0de".to_owned())]);

	flow.access_token(AccessTokenRequest::new(callback)).await.expect("Exchange should succeed.");
	flow.refresh_access_token("r1").await.expect("Refresh should succeed.");

	let requests = transport.requests();
	let exchange = requests[0].form();
	let refresh = requests[1].form();

	assert_eq!(requests[0].method, "POST");
	assert_eq!(requests[0].header("accept"), Some("application/json"));
	assert_eq!(requests[0].header("authorization"), None);
	assert_eq!(exchange.get("grant_type").map(String::as_str), Some("authorization_code"));
	assert_eq!(exchange.get("code").map(String::as_str), Some("c0de"));
	assert_eq!(exchange.get("client_id").map(String::as_str), Some("cid"));
	assert_eq!(exchange.get("client_secret").map(String::as_str), Some("csecret"));
	assert_eq!(exchange.get("redirect_uri").map(String::as_str), Some("https://app.test/cb"));
	assert_eq!(refresh.get("grant_type").map(String::as_str), Some("refresh_token"));
	assert_eq!(refresh.get("refresh_token").map(String::as_str), Some("r1"));
	assert!(!refresh.contains_key("code"));
	assert_eq!(flow.credentials().access_token(), Some("a2"));
}

#[tokio::test]
async fn oauth2_caller_headers_replace_defaults() {
	let transport = RecordingTransport::default();
	let descriptor = mock_descriptor(ProtocolVersion::OAuth2, "https://provider.test");
	let flow = OAuth2Flow::new(
		descriptor,
		OAuth2Credentials::new("cid", "csecret").with_access_token("held"),
		transport.clone(),
	)
	.expect("OAuth 2.0 flow should build.");

	transport.respond(200, "application/json", "{}").respond(200, "application/json", "{}");

	flow.request(ResourceRequest::get("a")).await.expect("Default header request should succeed.");
	flow.request(ResourceRequest::get("b").with_header("Authorization", "token custom"))
		.await
		.expect("Custom header request should succeed.");

	let requests = transport.requests();

	assert_eq!(requests[0].header("accept"), Some("application/json"));
	assert_eq!(requests[0].header("authorization"), Some("Bearer held"));
	assert_eq!(requests[1].header("accept"), None);
	assert_eq!(requests[1].header("authorization"), Some("token custom"));
}
