//! Demonstrates the OAuth 2.0 authorization-code login against a local mock provider,
//! including a token refresh and a profile lookup through a built-in catalog projection.

// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
use url::Url;
// self
use oauth_bridge::{
	flows::{AccessTokenRequest, OAuthFlow, ReqwestOAuthClient, ResourceRequest},
	http::ReqwestHttpClient,
	provider::ProviderRegistry,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/login/oauth/access_token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"demo-access","token_type":"bearer","refresh_token":"demo-refresh"}"#,
			);
		})
		.await;
	let user = server
		.mock_async(|when, then| {
			when.method(GET).path("/user").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":1,"login":"demo","name":"Demo User","email":"demo@example.com","html_url":"https://example.com/demo"}"#,
			);
		})
		.await;
	let mut registry = ProviderRegistry::builtin();
	let mut github =
		registry.get("github").cloned().ok_or_else(|| eyre!("GitHub is missing from the catalog."))?;

	// Point the built-in descriptor at the mock server.
	github.endpoints.access_token = Url::parse(&server.url("/login/oauth/access_token"))?;
	github.endpoints.user_info = Some(Url::parse(&server.url("/user"))?);
	github.endpoints.base = Some(Url::parse(&server.url("/"))?);

	registry.register(github);

	let mut client: ReqwestOAuthClient =
		registry.client("github", "demo-client", "demo-secret", ReqwestHttpClient::default())?;

	println!("Visit {} to sign in.", client.authorize_url(&[("state", "demo-state")])?);

	let grant = client
		.access_token(AccessTokenRequest::new("demo-code").with_redirect_uri("http://localhost:8080/cb"))
		.await?;

	token.assert_async().await;

	println!(
		"Issued a token: {}; refresh token present: {}.",
		grant.is_issued(),
		grant.payload.contains_key("refresh_token")
	);

	let (profile, _) = client.user_info().await?;

	println!("Signed in as {:?} <{:?}>.", profile.username, profile.email);

	let response = client.request(ResourceRequest::get("user")).await?;

	user.assert_calls_async(2).await;

	println!("Resource request returned HTTP {}.", response.status);

	Ok(())
}
