// self
use crate::{
	_prelude::*,
	auth::User,
	flows::common,
	http::{Payload, ProviderResponse},
	provider::ProviderDescriptor,
};

/// Resolves the user-info endpoint and its parameters.
///
/// Any query configured on the endpoint moves into the parameter list, then the provider
/// hook gets a chance to add its own parameters.
pub(crate) fn prepare(
	descriptor: &ProviderDescriptor,
	access_token: Option<&str>,
) -> Result<(Url, Vec<(String, String)>)> {
	let mut url = descriptor.endpoints.user_info.clone().ok_or_else(|| Error::Unsupported {
		provider: descriptor.id.to_string(),
		operation: "user_info",
	})?;
	let mut params = common::split_query(&mut url);

	if let Some(hook) = descriptor.user_info_hook {
		hook(&mut params, access_token);
	}

	Ok((url, params))
}

/// Decodes a user-info response and applies the provider projection.
pub(crate) fn project(
	descriptor: &ProviderDescriptor,
	response: ProviderResponse,
) -> Result<(User, Payload)> {
	let payload = response.error_for_status()?.payload()?;
	let user = User::from_fields((descriptor.user_projection)(&payload.to_json()));

	Ok((user, payload))
}
