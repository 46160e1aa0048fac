//! Decoded provider response bodies.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Provider response body normalized by content type.
///
/// Bodies whose `Content-Type` mentions `json` are decoded as JSON. Everything else is
/// parsed as a form (`a=1&b=2`, dropping blank values); bodies yielding no pairs are kept
/// verbatim as text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
	/// JSON document.
	Json(Value),
	/// Form-encoded key/value pairs; the last occurrence of a key wins.
	Form(BTreeMap<String, String>),
	/// Raw text that was neither JSON nor form data.
	Text(String),
}
impl Payload {
	/// Decodes `body` according to `content_type`.
	pub fn parse(content_type: Option<&str>, body: &[u8], status: u16) -> Result<Self> {
		if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json")) {
			let de = &mut serde_json::Deserializer::from_slice(body);
			let value = serde_path_to_error::deserialize(de)
				.map_err(|source| Error::ResponseParse { source, status })?;

			return Ok(Self::Json(value));
		}

		let form = form_urlencoded::parse(body)
			.filter(|(_, v)| !v.is_empty())
			.map(|(k, v)| (k.into_owned(), v.into_owned()))
			.collect::<BTreeMap<_, _>>();

		if form.is_empty() {
			Ok(Self::Text(String::from_utf8_lossy(body).into_owned()))
		} else {
			Ok(Self::Form(form))
		}
	}

	/// Looks up a top-level string value.
	///
	/// JSON numbers are not coerced; use [`Payload::to_json`] for typed access.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		match self {
			Self::Json(value) => value.get(key)?.as_str(),
			Self::Form(map) => map.get(key).map(String::as_str),
			Self::Text(_) => None,
		}
	}

	/// Returns `true` when the payload carries `key` at the top level.
	pub fn contains_key(&self, key: &str) -> bool {
		match self {
			Self::Json(value) => value.get(key).is_some(),
			Self::Form(map) => map.contains_key(key),
			Self::Text(_) => false,
		}
	}

	/// Top-level key names, used for logging without values.
	pub fn keys(&self) -> Vec<&str> {
		match self {
			Self::Json(Value::Object(map)) => map.keys().map(String::as_str).collect(),
			Self::Form(map) => map.keys().map(String::as_str).collect(),
			_ => Vec::new(),
		}
	}

	/// Converts the payload into a JSON value; forms become objects of strings.
	pub fn to_json(&self) -> Value {
		match self {
			Self::Json(value) => value.clone(),
			Self::Form(map) => Value::Object(
				map.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect(),
			),
			Self::Text(text) => Value::String(text.clone()),
		}
	}
}
