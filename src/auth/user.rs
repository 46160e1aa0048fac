//! Provider-neutral user profile.

// self
use crate::_prelude::*;

/// Fields a provider projection may populate on [`User`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
	/// Provider-scoped user identifier.
	Id,
	/// Primary e-mail address.
	Email,
	/// Given name.
	FirstName,
	/// Family name.
	LastName,
	/// Login or display handle.
	Username,
	/// Avatar URL.
	Picture,
	/// Profile URL.
	Link,
	/// Preferred locale.
	Locale,
	/// City.
	City,
	/// Country.
	Country,
	/// Gender as reported by the provider.
	Gender,
}

/// Normalized user record; only fields yielded by the provider projection are set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Provider-scoped user identifier.
	pub id: Option<String>,
	/// Primary e-mail address.
	pub email: Option<String>,
	/// Given name.
	pub first_name: Option<String>,
	/// Family name.
	pub last_name: Option<String>,
	/// Login or display handle.
	pub username: Option<String>,
	/// Avatar URL.
	pub picture: Option<String>,
	/// Profile URL.
	pub link: Option<String>,
	/// Preferred locale.
	pub locale: Option<String>,
	/// City.
	pub city: Option<String>,
	/// Country.
	pub country: Option<String>,
	/// Gender as reported by the provider.
	pub gender: Option<String>,
}
impl User {
	/// Builds a user from projected `(field, value)` pairs; later pairs overwrite earlier ones.
	pub fn from_fields<I>(fields: I) -> Self
	where
		I: IntoIterator<Item = (UserField, String)>,
	{
		let mut user = Self::default();

		for (field, value) in fields {
			user.set(field, value);
		}

		user
	}

	/// Sets a single field.
	pub fn set(&mut self, field: UserField, value: String) {
		let slot = match field {
			UserField::Id => &mut self.id,
			UserField::Email => &mut self.email,
			UserField::FirstName => &mut self.first_name,
			UserField::LastName => &mut self.last_name,
			UserField::Username => &mut self.username,
			UserField::Picture => &mut self.picture,
			UserField::Link => &mut self.link,
			UserField::Locale => &mut self.locale,
			UserField::City => &mut self.city,
			UserField::Country => &mut self.country,
			UserField::Gender => &mut self.gender,
		};

		*slot = Some(value);
	}
}

/// Renders a scalar JSON value as a profile string. Numbers keep their JSON spelling.
pub fn render_scalar(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
