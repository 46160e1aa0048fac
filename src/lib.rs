//! Async OAuth 1.0a + OAuth 2.0 client toolkit: signed request flows, token exchanges, and
//! normalized user profiles across providers, with the HTTP transport kept behind one seam.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod signature;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		flows::{Client, ReqwestOAuthClient},
		http::ReqwestHttpClient,
		provider::{ProtocolVersion, ProviderDescriptor},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Describes a mock provider whose endpoints all live under `base_url`.
	///
	/// OAuth 1.0a descriptors expose `/request_token`, `/authorize`, `/access_token`, and
	/// `/me`; OAuth 2.0 descriptors expose the same set minus the request-token endpoint.
	pub fn mock_descriptor(protocol: ProtocolVersion, base_url: &str) -> ProviderDescriptor {
		let id = ProviderId::new("mock").expect("Failed to build mock provider identifier.");
		let base = base_url.trim_end_matches('/');
		let mut builder = ProviderDescriptor::builder(id, protocol)
			.base_url(format!("{base}/api/"))
			.authorize_endpoint(format!("{base}/authorize"))
			.access_token_endpoint(format!("{base}/access_token"))
			.user_info_endpoint(format!("{base}/me"));

		if protocol == ProtocolVersion::OAuth1 {
			builder = builder.request_token_endpoint(format!("{base}/request_token"));
		}

		builder.build().expect("Failed to build mock provider descriptor.")
	}

	/// Constructs a [`Client`] backed by the insecure reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_client(
		descriptor: ProviderDescriptor,
		key: &str,
		secret: &str,
	) -> ReqwestOAuthClient {
		Client::new(descriptor, key, secret, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use oauth2::http::Method;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {color_eyre as _, httpmock as _, tokio as _, tracing_subscriber as _};
