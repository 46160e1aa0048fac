//! OAuth 1.0a request signing.
//!
//! [`SignatureMethod::sign`] is a pure function of its inputs: callers supply the nonce and
//! timestamp as ordinary parameters, so identical inputs always produce identical signatures.
//! Two parameter encodings are supported because providers disagree on how the parameter
//! string is canonicalized; see [`ParamEncoding`].

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
// self
use crate::_prelude::*;

/// Characters left untouched by [`escape`]: ASCII alphanumerics plus `-._~`.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Signature methods supported by OAuth 1.0a flows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// HMAC-SHA1 over the signature base string.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// Sends the signing key itself; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the wire name sent as `oauth_signature_method`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::HmacSha1 => "HMAC-SHA1",
			Self::Plaintext => "PLAINTEXT",
		}
	}

	/// Computes the `oauth_signature` value.
	///
	/// Any query string on `url` is ignored; parameters must arrive through `params`.
	/// `token_secret` is omitted from the key when absent or empty.
	pub fn sign<K, V>(
		self,
		consumer_secret: &str,
		method: &str,
		url: &str,
		token_secret: Option<&str>,
		params: &[(K, V)],
		encoding: ParamEncoding,
	) -> String
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let key = signing_key(consumer_secret, token_secret);

		match self {
			Self::Plaintext => key,
			Self::HmacSha1 => {
				let base = base_string(method, url, params, encoding);
				let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(key.as_bytes()) else {
					unreachable!("HMAC accepts keys of any length");
				};

				mac.update(base.as_bytes());

				STANDARD.encode(mac.finalize().into_bytes())
			},
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Canonicalization rules for the parameter string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamEncoding {
	/// Sort the raw pairs, then form-encode them (space becomes `+`).
	#[default]
	FormUrlEncoded,
	/// Escape keys and values per RFC 3986, then sort the escaped pairs.
	Rfc3986,
}

/// Percent-escapes `value`, keeping ASCII alphanumerics and `-._~`; hex digits are uppercase.
pub fn escape(value: &str) -> String {
	utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Builds the signing key `escape(consumer_secret)&escape(token_secret)`.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	let mut key = escape(consumer_secret);

	key.push('&');

	if let Some(secret) = token_secret.filter(|s| !s.is_empty()) {
		key.push_str(&escape(secret));
	}

	key
}

/// Builds the signature base string `METHOD&escape(url)&escape(params)`.
pub fn base_string<K, V>(method: &str, url: &str, params: &[(K, V)], encoding: ParamEncoding) -> String
where
	K: AsRef<str>,
	V: AsRef<str>,
{
	let param_string = parameter_string(params, encoding);

	format!(
		"{}&{}&{}",
		escape(&method.to_ascii_uppercase()),
		escape(&strip_query(url)),
		escape(&param_string)
	)
}

/// Removes the query and fragment from `url`, leaving the base-string URI.
///
/// Absolute URLs are normalized by [`Url`]; relative references are cut at the first `?` or `#`.
pub fn strip_query(url: &str) -> String {
	if let Ok(mut parsed) = Url::parse(url) {
		parsed.set_query(None);
		parsed.set_fragment(None);

		return parsed.into();
	}

	match url.find(['?', '#']) {
		Some(end) => url[..end].to_owned(),
		None => url.to_owned(),
	}
}

fn parameter_string<K, V>(params: &[(K, V)], encoding: ParamEncoding) -> String
where
	K: AsRef<str>,
	V: AsRef<str>,
{
	match encoding {
		ParamEncoding::FormUrlEncoded => {
			let mut raw = params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect::<Vec<_>>();

			raw.sort_unstable();

			join_pairs(raw.into_iter().map(|(k, v)| (form_encode(k), form_encode(v))))
		},
		ParamEncoding::Rfc3986 => {
			let mut escaped = params
				.iter()
				.map(|(k, v)| (escape(k.as_ref()), escape(v.as_ref())))
				.collect::<Vec<_>>();

			escaped.sort_unstable();

			join_pairs(escaped.into_iter())
		},
	}
}

fn join_pairs(pairs: impl Iterator<Item = (String, String)>) -> String {
	pairs.map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

fn form_encode(value: &str) -> String {
	value.split(' ').map(escape).collect::<Vec<_>>().join("+")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn twitter_params() -> Vec<(&'static str, &'static str)> {
		vec![
			("oauth_consumer_key", "blablabla"),
			("oauth_nonce", "blublublu"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "1644067741"),
			("oauth_version", "1.0"),
			("tweet_mode", "extended"),
			("oauth_token", "bliblibli"),
		]
	}

	#[test]
	fn hmac_sha1_matches_known_vector() {
		let params = twitter_params();

		for encoding in [ParamEncoding::FormUrlEncoded, ParamEncoding::Rfc3986] {
			let signature = SignatureMethod::HmacSha1.sign(
				"consumer_secret",
				"GET",
				"https://site.com/endpoint.json",
				Some("oauth_token_secret"),
				&params,
				encoding,
			);

			assert_eq!(signature, "eqgTuU6+8g4Op1Cyu0QWk+watto=");
		}
	}

	#[test]
	fn base_string_is_canonical() {
		let base = base_string(
			"get",
			"https://site.com/endpoint.json",
			&twitter_params(),
			ParamEncoding::FormUrlEncoded,
		);

		assert_eq!(
			base,
			"GET&https%3A%2F%2Fsite.com%2Fendpoint.json&oauth_consumer_key%3Dblablabla%26oauth_nonce%3Dblublublu%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1644067741%26oauth_token%3Dbliblibli%26oauth_version%3D1.0%26tweet_mode%3Dextended"
		);
	}

	#[test]
	fn query_string_never_enters_base_string() {
		let params = [("a", "1")];
		let with_query =
			base_string("GET", "https://a/b?x=1", &params, ParamEncoding::FormUrlEncoded);
		let without_query = base_string("GET", "https://a/b", &params, ParamEncoding::FormUrlEncoded);

		assert_eq!(with_query, without_query);
	}

	#[test]
	fn fragment_never_enters_base_string() {
		let params = [("a", "1")];
		let plain = base_string("GET", "https://a/b", &params, ParamEncoding::FormUrlEncoded);

		for url in ["https://a/b#frag", "https://a/b?x=1#frag", "https://a/b#x?y"] {
			assert_eq!(base_string("GET", url, &params, ParamEncoding::FormUrlEncoded), plain);
		}

		assert_eq!(strip_query("https://a/b?x=1#frag"), "https://a/b");
		assert_eq!(strip_query("https://a/b#x?y"), "https://a/b");
		assert_eq!(strip_query("/test?x=1"), "/test");
		assert_eq!(strip_query("/test#x?y"), "/test");
	}

	#[test]
	fn encodings_diverge_on_reserved_characters() {
		let mut params = twitter_params();

		params.push(("status", "Hello Ladies + Gentlemen, a signed OAuth request!"));
		params.push(("include_entities", "true"));

		let sign = |encoding| {
			SignatureMethod::HmacSha1.sign(
				"kd94hf93k423kf44",
				"post",
				"https://api.twitter.com/1.1/statuses/update.json",
				Some("pfkkdhi9sl3r4s00"),
				&params,
				encoding,
			)
		};

		assert_eq!(sign(ParamEncoding::FormUrlEncoded), "PfGVvi3Ym3E0M9vLnVA8TAZmu4E=");
		assert_eq!(sign(ParamEncoding::Rfc3986), "DlZoRH9to/+9oIfI/Vu3ii7RsUs=");
	}

	#[test]
	fn empty_token_secret_keeps_separator() {
		let params: [(&str, &str); 0] = [];

		assert_eq!(signing_key("secret", None), "secret&");
		assert_eq!(signing_key("secret", Some("")), "secret&");
		assert_eq!(signing_key("s e", Some("t~k")), "s%20e&t~k");
		assert_eq!(
			SignatureMethod::HmacSha1.sign(
				"secret",
				"GET",
				"/test",
				None,
				&params,
				ParamEncoding::default()
			),
			"aKSt6pcdKNPLUxSB4bMeu/MSyTs="
		);
	}

	#[test]
	fn plaintext_returns_signing_key() {
		let params = [("ignored", "value")];
		let signature = SignatureMethod::Plaintext.sign(
			"consumer",
			"GET",
			"https://a/b",
			Some("token secret"),
			&params,
			ParamEncoding::default(),
		);

		assert_eq!(signature, "consumer&token%20secret");
		assert_eq!(SignatureMethod::Plaintext.as_str(), "PLAINTEXT");
	}

	#[test]
	fn escape_keeps_unreserved_only() {
		assert_eq!(escape("a-b._~c"), "a-b._~c");
		assert_eq!(escape("a b/c=d&é"), "a%20b%2Fc%3Dd%26%C3%A9");
	}
}
