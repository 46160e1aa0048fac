// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by OAuth flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the exchange step and provider identifier.
	pub fn new(kind: FlowKind, provider: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth_bridge.flow", flow = kind.as_str(), provider);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, provider);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for an outbound request. `endpoint` must not carry a query string.
pub(crate) fn log_request(method: &str, endpoint: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(method, endpoint, "Dispatching provider request.");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, endpoint);
}

/// Emits a debug event once a token was stored; the token itself is never recorded.
pub(crate) fn log_token_issued(kind: FlowKind, provider: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(flow = kind.as_str(), provider, "Provider issued a token.");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, provider);
}

/// Warns that a token payload lacked `access_token`, listing key names only.
pub(crate) fn log_missing_access_token(provider: &str, keys: &[&str]) {
	#[cfg(feature = "tracing")]
	tracing::warn!(provider, keys = ?keys, "Token response did not include an access token.");
	#[cfg(not(feature = "tracing"))]
	let _ = (provider, keys);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_helpers_accept_any_subscriber_state() {
		log_request("GET", "https://p.test/me");
		log_token_issued(FlowKind::AccessToken, "github");
		log_missing_access_token("github", &["error", "error_description"]);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::RequestToken, "twitter");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
