//! Walks through the OAuth 1.0a three-legged handshake against a local mock provider.
//!
//! 1. Obtain temporary credentials with [`Client::request_token`].
//! 2. Send the user to [`OAuthFlow::authorize_url`].
//! 3. Trade the callback verifier for an access token.
//! 4. Call a protected API and load the user profile.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth_bridge::{
	auth::ProviderId,
	flows::{AccessTokenRequest, Client, OAuthFlow, ResourceRequest},
	http::ReqwestHttpClient,
	provider::{ProtocolVersion, ProviderDescriptor},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let request_token = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/request_token");
			then.status(200).body("oauth_token=demo-request&oauth_token_secret=demo-request-secret");
		})
		.await;
	let access_token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token").query_param("oauth_verifier", "demo-verifier");
			then.status(200).body("oauth_token=demo-access&oauth_token_secret=demo-access-secret");
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/1.1/account/verify_credentials.json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id_str":"12","screen_name":"demo","name":"Demo User","location":"Oslo, Norway"}"#);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-oauth1")?, ProtocolVersion::OAuth1)
		.base_url(server.url("/1.1/"))
		.request_token_endpoint(server.url("/oauth/request_token"))
		.authorize_endpoint(server.url("/oauth/authenticate"))
		.access_token_endpoint(server.url("/oauth/access_token"))
		.user_info_endpoint(server.url("/1.1/account/verify_credentials.json"))
		.default_param("oauth_callback", "http://localhost:8080/callback")
		.build()?;
	let mut client = <Client<ReqwestHttpClient>>::new(
		descriptor,
		"demo-consumer-key",
		"demo-consumer-secret",
		ReqwestHttpClient::default(),
	);

	client.request_token(&[]).await?;
	request_token.assert_async().await;

	println!("Visit {} to authorize the demo application.", client.authorize_url(&[])?);

	client
		.access_token(AccessTokenRequest::new("demo-verifier").with_request_token("demo-request"))
		.await?;
	access_token.assert_async().await;

	let response = client
		.request(ResourceRequest::get("account/verify_credentials.json").with_param("skip_status", "1"))
		.await?
		.error_for_status()?;

	println!("Signed request returned HTTP {}.", response.status);

	let (user, _) = client.user_info().await?;

	profile.assert_calls_async(2).await;

	println!("Loaded profile: {user:?}.");

	Ok(())
}
