//! Built-in provider descriptors and their user-profile projections.
//!
//! The catalog is representative rather than exhaustive; anything missing can be described
//! with [`ProviderDescriptor::builder`] and added to a
//! [`ProviderRegistry`](crate::provider::ProviderRegistry).

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, UserField, render_scalar},
	provider::{BearerPlacement, ProtocolVersion, ProviderDescriptor, ProviderDescriptorBuilder},
	signature::ParamEncoding,
};

type Configure = fn(ProviderDescriptorBuilder) -> ProviderDescriptorBuilder;

const CATALOG: &[(&str, ProtocolVersion, Configure)] = &[
	("discord", ProtocolVersion::OAuth2, discord),
	("facebook", ProtocolVersion::OAuth2, facebook),
	("flickr", ProtocolVersion::OAuth1, flickr),
	("github", ProtocolVersion::OAuth2, github),
	("gitlab", ProtocolVersion::OAuth2, gitlab),
	("google", ProtocolVersion::OAuth2, google),
	("microsoft", ProtocolVersion::OAuth2, microsoft),
	("slack", ProtocolVersion::OAuth2, slack),
	("todoist", ProtocolVersion::OAuth2, todoist),
	("trello", ProtocolVersion::OAuth1, trello),
	("tumblr", ProtocolVersion::OAuth1, tumblr),
	("twitter", ProtocolVersion::OAuth1, twitter),
	("vk", ProtocolVersion::OAuth2, vk),
	("yandex", ProtocolVersion::OAuth2, yandex),
];

/// Version parameter appended to VK API calls.
pub const VK_API_VERSION: &str = "5.9.2";

/// Names of every built-in provider.
pub fn names() -> impl Iterator<Item = &'static str> {
	CATALOG.iter().map(|(name, _, _)| *name)
}

/// Builds the descriptor for a built-in provider.
pub fn descriptor(name: &str) -> Option<ProviderDescriptor> {
	let (name, protocol, configure) = CATALOG.iter().find(|(n, _, _)| *n == name)?;
	let id = ProviderId::new(name).ok()?;

	configure(ProviderDescriptor::builder(id, *protocol)).build().ok()
}

/// Builds every built-in descriptor.
pub fn all() -> Vec<ProviderDescriptor> {
	names().filter_map(descriptor).collect()
}

fn twitter(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.twitter.com/1.1/")
		.request_token_endpoint("https://api.twitter.com/oauth/request_token")
		.authorize_endpoint("https://api.twitter.com/oauth/authorize")
		.access_token_endpoint("https://api.twitter.com/oauth/access_token")
		.user_info_endpoint("https://api.twitter.com/1.1/account/verify_credentials.json")
		.user_projection(|data| {
			let mut out = Projection::default();

			out.scalar(UserField::Id, data, "id");
			out.fallback(UserField::Id, data, "user_id");
			out.full_name(data.get("name"));
			out.scalar(UserField::Email, data, "email");
			out.scalar(UserField::Picture, data, "profile_image_url");
			out.scalar(UserField::Locale, data, "lang");
			out.scalar(UserField::Link, data, "url");
			out.scalar(UserField::Username, data, "screen_name");

			if let Some((city, country)) = str_at(data, "location").and_then(|l| l.split_once(',')) {
				out.text(UserField::City, city.trim());
				out.text(UserField::Country, country.trim());
			} else if let Some(location) = str_at(data, "location") {
				out.text(UserField::City, location.trim());
			}

			out.finish()
		})
}

fn trello(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.trello.com/1/")
		.request_token_endpoint("https://trello.com/1/OAuthGetRequestToken")
		.authorize_endpoint("https://trello.com/1/authorize")
		.access_token_endpoint("https://trello.com/1/OAuthGetAccessToken")
		.user_info_endpoint("https://api.trello.com/1/members/me/")
		.param_encoding(ParamEncoding::Rfc3986)
}

fn flickr(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.flickr.com/")
		.request_token_endpoint("http://www.flickr.com/services/oauth/request_token")
		.authorize_endpoint("http://www.flickr.com/services/oauth/authorize")
		.access_token_endpoint("http://www.flickr.com/services/oauth/access_token")
		.user_info_endpoint(
			"http://api.flickr.com/services/rest?method=flickr.test.login&format=json&nojsoncallback=1",
		)
		.user_projection(|data| {
			let mut out = Projection::default();
			let user = data.get("user").unwrap_or(&Value::Null);

			out.scalar(UserField::Id, data, "user_nsid");
			out.fallback(UserField::Id, user, "id");
			out.value(UserField::Username, user.pointer("/username/_content"));
			out.full_name(data.pointer("/fullname/_content"));

			out.finish()
		})
}

fn tumblr(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.tumblr.com/v2/")
		.request_token_endpoint("http://www.tumblr.com/oauth/request_token")
		.authorize_endpoint("http://www.tumblr.com/oauth/authorize")
		.access_token_endpoint("http://www.tumblr.com/oauth/access_token")
		.user_info_endpoint("http://api.tumblr.com/v2/user/info")
		.user_projection(|data| {
			let mut out = Projection::default();
			let user = data.pointer("/response/user").unwrap_or(&Value::Null);

			out.scalar(UserField::Id, user, "name");
			out.scalar(UserField::Username, user, "name");
			out.value(UserField::Link, user.pointer("/blogs/0/url"));

			out.finish()
		})
}

fn github(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.github.com")
		.authorize_endpoint("https://github.com/login/oauth/authorize")
		.access_token_endpoint("https://github.com/login/oauth/access_token")
		.user_info_endpoint("https://api.github.com/user")
		.user_projection(|data| forge_projection(data, "html_url"))
}

fn gitlab(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://gitlab.com/api/v4")
		.authorize_endpoint("https://gitlab.com/oauth/authorize")
		.access_token_endpoint("https://gitlab.com/oauth/token")
		.user_info_endpoint("https://gitlab.com/api/v4/user")
		.user_projection(|data| forge_projection(data, "web_url"))
}

fn google(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://www.googleapis.com/userinfo/v2/")
		.authorize_endpoint("https://accounts.google.com/o/oauth2/v2/auth")
		.access_token_endpoint("https://oauth2.googleapis.com/token")
		.user_info_endpoint("https://www.googleapis.com/userinfo/v2/me")
		.user_projection(|data| {
			let mut out = Projection::default();

			out.scalar(UserField::Id, data, "id");
			out.scalar(UserField::Email, data, "email");
			out.scalar(UserField::FirstName, data, "given_name");
			out.scalar(UserField::LastName, data, "family_name");
			out.scalar(UserField::Link, data, "link");
			out.scalar(UserField::Locale, data, "locale");
			out.scalar(UserField::Picture, data, "picture");
			out.scalar(UserField::Gender, data, "gender");

			out.finish()
		})
}

fn facebook(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://graph.facebook.com/v2.4")
		.authorize_endpoint("https://www.facebook.com/dialog/oauth")
		.access_token_endpoint("https://graph.facebook.com/oauth/access_token")
		.user_info_endpoint("https://graph.facebook.com/me")
		.user_info_hook(|params, _| {
			set_param(params, "fields", "id,email,first_name,last_name,name,link,locale,gender,location");
		})
		.user_projection(|data| {
			let mut out = Projection::default();
			let id = data.get("id").and_then(render_scalar);

			out.scalar(UserField::Id, data, "id");
			out.scalar(UserField::Email, data, "email");
			out.scalar(UserField::FirstName, data, "first_name");
			out.scalar(UserField::LastName, data, "last_name");
			out.scalar(UserField::Username, data, "name");

			if let Some(id) = id {
				out.text(UserField::Picture, &format!("http://graph.facebook.com/{id}/picture?type=large"));
			}

			out.scalar(UserField::Link, data, "link");
			out.scalar(UserField::Locale, data, "locale");
			out.scalar(UserField::Gender, data, "gender");

			if let Some(location) = data.pointer("/location/name").and_then(Value::as_str) {
				let mut parts = location.split(", ");

				if let Some(city) = parts.next() {
					out.text(UserField::City, city.trim());
				}
				if let Some(country) = parts.next() {
					out.text(UserField::Country, country.trim());
				}
			}

			out.finish()
		})
}

fn microsoft(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://graph.microsoft.com/v1.0")
		.authorize_endpoint("https://login.microsoftonline.com/common/oauth2/v2.0/authorize")
		.access_token_endpoint("https://login.microsoftonline.com/common/oauth2/v2.0/token")
		.user_info_endpoint("https://graph.microsoft.com/v1.0/me")
		.user_projection(|data| {
			let mut out = Projection::default();

			out.scalar(UserField::Id, data, "id");
			out.scalar(UserField::Username, data, "displayName");
			out.scalar(UserField::FirstName, data, "givenName");
			out.scalar(UserField::LastName, data, "surname");
			out.scalar(UserField::Email, data, "userPrincipalName");

			out.finish()
		})
}

fn discord(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://discordapp.com/api/v6/")
		.authorize_endpoint("https://discordapp.com/api/oauth2/authorize")
		.access_token_endpoint("https://discordapp.com/api/oauth2/token")
		.user_info_endpoint("https://discordapp.com/api/v6/users/@me")
		.user_projection(|data| {
			let mut out = Projection::default();
			let id = data.get("id").and_then(render_scalar);
			let avatar = data.get("avatar").and_then(render_scalar);

			out.scalar(UserField::Id, data, "id");
			out.scalar(UserField::Username, data, "username");

			if let (Some(id), Some(avatar)) = (id, avatar) {
				out.text(UserField::Picture, &format!("https://cdn.discordapp.com/avatars/{id}/{avatar}.png"));
			}

			out.finish()
		})
}

fn vk(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.vk.com")
		.authorize_endpoint("http://api.vk.com/oauth/authorize")
		.access_token_endpoint("https://api.vk.com/oauth/access_token")
		.user_info_endpoint(
			"https://api.vk.com/method/getProfiles?fields=uid,first_name,last_name,nickname,sex,bdate,city,country,timezone,photo_big",
		)
		.bearer_placement(BearerPlacement::Query)
		.default_param("scope", "offline")
		.user_info_hook(|params, _| set_param(params, "v", VK_API_VERSION))
		.user_projection(|data| {
			let mut out = Projection::default();
			let profile = data.pointer("/response/0").unwrap_or(&Value::Null);

			out.scalar(UserField::Id, profile, "id");
			out.scalar(UserField::FirstName, profile, "first_name");
			out.scalar(UserField::LastName, profile, "last_name");
			out.scalar(UserField::Username, profile, "nickname");
			out.scalar(UserField::City, profile, "city");
			out.scalar(UserField::Country, profile, "country");
			out.scalar(UserField::Picture, profile, "photo_big");

			out.finish()
		})
}

fn yandex(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://login.yandex.ru/info")
		.authorize_endpoint("https://oauth.yandex.com/authorize")
		.access_token_endpoint("https://oauth.yandex.com/token")
		.access_token_key("oauth_token")
		.user_info_endpoint("https://login.yandex.ru/info")
		.user_projection(|data| {
			let mut out = Projection::default();
			let avatar = data.get("default_avatar_id").and_then(render_scalar);

			out.scalar(UserField::Id, data, "id");
			out.scalar(UserField::Username, data, "login");
			out.scalar(UserField::Email, data, "default_email");
			out.scalar(UserField::FirstName, data, "first_name");
			out.scalar(UserField::LastName, data, "last_name");
			out.text(
				UserField::Picture,
				&format!(
					"https://avatars.yandex.net/get-yapic/{}/islands-200",
					avatar.as_deref().unwrap_or("0")
				),
			);

			out.finish()
		})
}

fn slack(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://slack.com/api")
		.authorize_endpoint("https://slack.com/oauth/v2/authorize")
		.access_token_endpoint("https://slack.com/api/oauth.v2.access")
		.user_info_endpoint("https://slack.com/api/users.profile.get")
		.user_projection(|data| {
			let mut out = Projection::default();
			let profile = data.get("profile").unwrap_or(&Value::Null);

			out.scalar(UserField::Username, profile, "display_name");
			out.fallback(UserField::Username, profile, "real_name_normalized");
			out.scalar(UserField::Picture, profile, "image_72");
			out.scalar(UserField::FirstName, profile, "first_name");
			out.scalar(UserField::LastName, profile, "last_name");
			out.scalar(UserField::Email, profile, "email");

			out.finish()
		})
}

fn todoist(builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
	builder
		.base_url("https://api.todoist.com/rest/v2")
		.authorize_endpoint("https://todoist.com/oauth/authorize")
		.access_token_endpoint("https://todoist.com/oauth/access_token")
		.user_info_endpoint("https://api.todoist.com/sync/v9/sync")
		.user_info_hook(|params, access_token| {
			if let Some(token) = access_token {
				set_param(params, "token", token);
			}

			set_param(params, "sync_token", "*");
			set_param(params, "resource_types", "[\"user\"]");
		})
		.user_projection(|data| {
			let mut out = Projection::default();
			let user = data.get("user").unwrap_or(&Value::Null);

			out.scalar(UserField::Id, user, "id");
			out.scalar(UserField::Email, user, "email");
			out.full_name(user.get("full_name"));
			out.scalar(UserField::Picture, user, "avatar_big");
			out.scalar(UserField::Locale, user, "lang");

			out.finish()
		})
}

/// Shared shape of the GitHub and GitLab user payloads.
fn forge_projection(data: &Value, link_key: &str) -> Vec<(UserField, String)> {
	let mut out = Projection::default();

	out.scalar(UserField::Id, data, "id");
	out.scalar(UserField::Email, data, "email");
	out.full_name(data.get("name"));
	out.scalar(UserField::Username, data, "username");
	out.fallback(UserField::Username, data, "login");
	out.scalar(UserField::Picture, data, "avatar_url");
	out.scalar(UserField::Link, data, link_key);

	if let Some(location) = str_at(data, "location").filter(|l| !l.is_empty()) {
		let mut parts = location.split(',');

		if let Some(country) = parts.next() {
			out.text(UserField::Country, country.trim());
		}
		if let Some(city) = parts.next() {
			out.text(UserField::City, city.trim());
		}
	}

	out.finish()
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
	match params.iter_mut().find(|(k, _)| k == key) {
		Some(slot) => slot.1 = value.to_owned(),
		None => params.push((key.to_owned(), value.to_owned())),
	}
}

fn str_at<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
	data.get(key).and_then(Value::as_str)
}

/// Accumulates projected fields, skipping nulls and empty strings.
#[derive(Default)]
struct Projection(Vec<(UserField, String)>);
impl Projection {
	fn value(&mut self, field: UserField, value: Option<&Value>) {
		if let Some(rendered) = value.and_then(render_scalar) {
			self.text(field, &rendered);
		}
	}

	fn scalar(&mut self, field: UserField, data: &Value, key: &str) {
		self.value(field, data.get(key));
	}

	/// Sets `field` from `key` only when nothing was projected for it yet.
	fn fallback(&mut self, field: UserField, data: &Value, key: &str) {
		if !self.0.iter().any(|(f, _)| *f == field) {
			self.scalar(field, data, key);
		}
	}

	fn text(&mut self, field: UserField, value: &str) {
		if !value.is_empty() {
			self.0.push((field, value.to_owned()));
		}
	}

	/// Splits a display name at the first space into first and last name.
	fn full_name(&mut self, value: Option<&Value>) {
		let Some(name) = value.and_then(Value::as_str) else {
			return;
		};
		let (first, last) = name.split_once(' ').unwrap_or((name, ""));

		self.text(UserField::FirstName, first);
		self.text(UserField::LastName, last);
	}

	fn finish(self) -> Vec<(UserField, String)> {
		self.0
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::auth::User;

	fn project(name: &str, data: Value) -> User {
		let descriptor = descriptor(name).expect("Built-in provider should build.");

		User::from_fields((descriptor.user_projection)(&data))
	}

	#[test]
	fn every_entry_builds() {
		assert_eq!(all().len(), CATALOG.len());
		assert!(descriptor("unknown").is_none());
	}

	#[test]
	fn oauth1_entries_carry_signing_options() {
		let trello = descriptor("trello").expect("Trello should build.");
		let twitter = descriptor("twitter").expect("Twitter should build.");

		assert_eq!(trello.param_encoding, ParamEncoding::Rfc3986);
		assert_eq!(twitter.param_encoding, ParamEncoding::FormUrlEncoded);
		assert_eq!(twitter.access_token_key, "oauth_token");
		assert!(twitter.endpoints.request_token.is_some());
	}

	#[test]
	fn vk_uses_query_bearer_and_offline_scope() {
		let vk = descriptor("vk").expect("VK should build.");
		let mut params = Vec::new();

		assert_eq!(vk.bearer_placement, BearerPlacement::Query);
		assert_eq!(vk.default_param("scope"), Some("offline"));

		(vk.user_info_hook.expect("VK should install a hook."))(&mut params, Some("t"));

		assert_eq!(params, vec![("v".to_owned(), VK_API_VERSION.to_owned())]);
	}

	#[test]
	fn github_projection_splits_name_and_location() {
		let user = project(
			"github",
			json!({
				"id": 583231,
				"login": "octocat",
				"name": "Mona Lisa Octocat",
				"email": "octocat@github.com",
				"avatar_url": "https://avatars.githubusercontent.com/u/583231",
				"html_url": "https://github.com/octocat",
				"location": "USA, San Francisco"
			}),
		);

		assert_eq!(user.id.as_deref(), Some("583231"));
		assert_eq!(user.username.as_deref(), Some("octocat"));
		assert_eq!(user.first_name.as_deref(), Some("Mona"));
		assert_eq!(user.last_name.as_deref(), Some("Lisa Octocat"));
		assert_eq!(user.country.as_deref(), Some("USA"));
		assert_eq!(user.city.as_deref(), Some("San Francisco"));
		assert_eq!(user.link.as_deref(), Some("https://github.com/octocat"));
	}

	#[test]
	fn twitter_projection_reads_location() {
		let user = project(
			"twitter",
			json!({
				"user_id": "12",
				"name": "Jack Dorsey",
				"screen_name": "jack",
				"lang": "en",
				"location": "San Francisco, USA"
			}),
		);

		assert_eq!(user.id.as_deref(), Some("12"));
		assert_eq!(user.username.as_deref(), Some("jack"));
		assert_eq!(user.locale.as_deref(), Some("en"));
		assert_eq!(user.city.as_deref(), Some("San Francisco"));
		assert_eq!(user.country.as_deref(), Some("USA"));
	}

	#[test]
	fn facebook_hook_and_projection() {
		let facebook = descriptor("facebook").expect("Facebook should build.");
		let mut params = vec![("fields".to_owned(), "id".to_owned())];

		(facebook.user_info_hook.expect("Facebook should install a hook."))(&mut params, None);

		assert_eq!(params.len(), 1);
		assert!(params[0].1.starts_with("id,email"));

		let user = project(
			"facebook",
			json!({ "id": "10", "name": "Ada L", "location": { "name": "London, United Kingdom" } }),
		);

		assert_eq!(user.picture.as_deref(), Some("http://graph.facebook.com/10/picture?type=large"));
		assert_eq!(user.username.as_deref(), Some("Ada L"));
		assert_eq!(user.city.as_deref(), Some("London"));
		assert_eq!(user.country.as_deref(), Some("United Kingdom"));
	}

	#[test]
	fn nested_payload_projections() {
		let vk = project(
			"vk",
			json!({ "response": [{ "id": 1, "first_name": "Pavel", "nickname": "durov" }] }),
		);

		assert_eq!(vk.id.as_deref(), Some("1"));
		assert_eq!(vk.username.as_deref(), Some("durov"));

		let tumblr = project(
			"tumblr",
			json!({ "response": { "user": { "name": "staff", "blogs": [{ "url": "https://staff.tumblr.com/" }] } } }),
		);

		assert_eq!(tumblr.id.as_deref(), Some("staff"));
		assert_eq!(tumblr.link.as_deref(), Some("https://staff.tumblr.com/"));

		let flickr = project(
			"flickr",
			json!({ "user": { "id": "35468159852@N01", "username": { "_content": "flickr" } } }),
		);

		assert_eq!(flickr.id.as_deref(), Some("35468159852@N01"));
		assert_eq!(flickr.username.as_deref(), Some("flickr"));
	}

	#[test]
	fn todoist_hook_injects_sync_params() {
		let todoist = descriptor("todoist").expect("Todoist should build.");
		let mut params = Vec::new();

		(todoist.user_info_hook.expect("Todoist should install a hook."))(&mut params, Some("tok"));

		assert_eq!(
			params,
			vec![
				("token".to_owned(), "tok".to_owned()),
				("sync_token".to_owned(), "*".to_owned()),
				("resource_types".to_owned(), "[\"user\"]".to_owned()),
			]
		);
	}

	#[test]
	fn yandex_defaults_avatar_and_token_key() {
		let yandex = descriptor("yandex").expect("Yandex should build.");
		let user = project("yandex", json!({ "id": "1", "login": "ya" }));

		assert_eq!(yandex.access_token_key, "oauth_token");
		assert_eq!(
			user.picture.as_deref(),
			Some("https://avatars.yandex.net/get-yapic/0/islands-200")
		);
	}

	#[test]
	fn slack_falls_back_to_normalized_name() {
		let user = project(
			"slack",
			json!({ "profile": { "display_name": "", "real_name_normalized": "Ada", "email": "a@x.test" } }),
		);

		assert_eq!(user.username.as_deref(), Some("Ada"));
		assert_eq!(user.email.as_deref(), Some("a@x.test"));
	}
}
