//! Provider authorize URL construction for the login redirect.

// crates.io
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, basic::BasicClient};
// self
use crate::{_prelude::*, config::StrategyConfig, provider::ProviderDescriptor};

/// Authorize URL plus the CSRF `state` the host must keep for the callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Provider URL the user agent is redirected to.
	pub url: Url,
	/// Random state value embedded in [`AuthorizationRequest::url`].
	pub state: String,
}

/// Builds the provider authorize URL for `strategy`.
///
/// Only the scopes the configured checks need are requested, so a strategy without guild
/// requirements never asks for guild access.
pub fn authorization_request(
	strategy: &StrategyConfig,
	descriptor: &ProviderDescriptor,
) -> Result<AuthorizationRequest> {
	let config = strategy.authorization()?;
	let client = BasicClient::new(ClientId::new(strategy.client_id.clone()))
		.set_auth_uri(AuthUrl::from_url(descriptor.endpoints.authorization.clone()))
		.set_redirect_uri(RedirectUrl::from_url(strategy.callback_url()?));
	let mut request = client.authorize_url(CsrfToken::new_random);

	if let Some(scope) = config.login_scopes().join(descriptor.quirks.scope_delimiter) {
		request = request.add_extra_param("scope", scope);
	}
	if let Some(prompt) = descriptor.quirks.prompt.as_deref() {
		request = request.add_extra_param("prompt", prompt);
	}

	let (url, state) = request.url();

	Ok(AuthorizationRequest { url, state: state.secret().to_owned() })
}
