// self
use oauth_bridge::{
	_preludet::*,
	auth::ProviderId,
	error::ConfigError,
	flows::{OAuthFlow, ReqwestOAuthClient},
	provider::{ProtocolVersion, ProviderDescriptor, ProviderRegistry, catalog},
	signature::ParamEncoding,
};

fn client(registry: &ProviderRegistry, name: &str) -> Result<ReqwestOAuthClient> {
	registry.client(name, "key", "secret", test_reqwest_http_client())
}

#[test]
fn builtin_catalog_builds_every_descriptor() {
	let registry = ProviderRegistry::builtin();

	for name in catalog::names() {
		let descriptor = registry.get(name).expect("Catalog entries should be registered.");

		assert_eq!(&*descriptor.id, name);
		assert_eq!(
			descriptor.endpoints.request_token.is_some(),
			descriptor.protocol == ProtocolVersion::OAuth1
		);
	}

	assert_eq!(
		registry.get("trello").map(|d| d.param_encoding),
		Some(ParamEncoding::Rfc3986)
	);
	assert_eq!(registry.get("yandex").map(|d| d.access_token_key.as_str()), Some("oauth_token"));
}

#[test]
fn registry_clients_follow_descriptor_protocol() {
	let registry = ProviderRegistry::builtin();
	let twitter = client(&registry, "twitter").expect("Twitter client should build.");
	let github = client(&registry, "github").expect("GitHub client should build.");

	assert_eq!(twitter.protocol(), ProtocolVersion::OAuth1);
	assert_eq!(github.protocol(), ProtocolVersion::OAuth2);
	assert_eq!(twitter.descriptor().id.as_ref(), "twitter");
	assert!(matches!(
		client(&registry, "myspace"),
		Err(Error::Config(ConfigError::UnknownProvider { ref name })) if name == "myspace"
	));
}

#[tokio::test]
async fn protocol_specific_operations_are_unsupported_elsewhere() {
	let registry = ProviderRegistry::builtin();
	let mut github = client(&registry, "github").expect("GitHub client should build.");
	let mut twitter = client(&registry, "twitter").expect("Twitter client should build.");

	assert!(matches!(
		github.request_token(&[]).await,
		Err(Error::Unsupported { operation: "request_token", .. })
	));
	assert!(matches!(
		twitter.refresh_access_token("r").await,
		Err(Error::Unsupported { operation: "refresh_access_token", .. })
	));
}

#[test]
fn custom_descriptors_register_and_override() {
	let mut registry = ProviderRegistry::new();
	let descriptor = ProviderDescriptor::builder(
		ProviderId::new("intranet").expect("Provider fixture should be valid."),
		ProtocolVersion::OAuth2,
	)
	.authorize_endpoint("http://sso.intranet.test/authorize")
	.access_token_endpoint("http://sso.intranet.test/token")
	.default_param("scope", "profile")
	.build()
	.expect("Intranet descriptor should build.");

	assert!(registry.register(descriptor).is_none());

	let client = client(&registry, "intranet").expect("Intranet client should build.");
	let url = client.authorize_url(&[("state", "s1")]).expect("Authorize URL should build.");

	assert_eq!(
		url.as_str(),
		"http://sso.intranet.test/authorize?scope=profile&state=s1&client_id=key&response_type=code"
	);
}
