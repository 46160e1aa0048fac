//! Name-to-descriptor registry.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::Client,
	http::OAuthHttpClient,
	provider::{ProviderDescriptor, catalog},
};

/// Explicit map from provider name to descriptor.
///
/// [`ProviderRegistry::builtin`] seeds the map with the static catalog; hosts add or
/// replace entries with [`ProviderRegistry::register`].
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
	descriptors: BTreeMap<String, ProviderDescriptor>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding every built-in provider.
	pub fn builtin() -> Self {
		let mut registry = Self::new();

		for descriptor in catalog::all() {
			registry.register(descriptor);
		}

		registry
	}

	/// Inserts `descriptor` under its identifier, returning the entry it replaced.
	pub fn register(&mut self, descriptor: ProviderDescriptor) -> Option<ProviderDescriptor> {
		self.descriptors.insert(descriptor.id.to_string(), descriptor)
	}

	/// Looks up a descriptor by name.
	pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
		self.descriptors.get(name)
	}

	/// Registered provider names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.descriptors.keys().map(String::as_str)
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	/// Returns `true` when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}

	/// Builds a client for the named provider.
	pub fn client<C>(
		&self,
		name: &str,
		key: impl Into<String>,
		secret: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Client<C>>
	where
		C: ?Sized + OAuthHttpClient,
	{
		let descriptor = self
			.get(name)
			.cloned()
			.ok_or_else(|| ConfigError::UnknownProvider { name: name.to_owned() })?;

		Ok(Client::new(descriptor, key, secret, http_client))
	}
}
