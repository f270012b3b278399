//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use oauth2_guild::{
	auth::{GuildId, StrategyKey},
	config::{AuthorizationConfig, StrategyConfig},
	http::{HttpFuture, HttpRequest, HttpResponse, ProviderHttpClient},
	oauth2::http::{
		HeaderName, HeaderValue, StatusCode,
		header::{AUTHORIZATION, RETRY_AFTER, USER_AGENT},
	},
	profile::{GuildSummary, ProviderProfile},
	provider::{Delay, DelayFuture, GuildClient, ProviderDescriptor, RetryPolicy},
	url::Url,
};

/// Fake clock recording every requested delay and resolving immediately.
#[derive(Debug, Default)]
pub struct RecordingDelay {
	delays: Mutex<Vec<Duration>>,
}
impl RecordingDelay {
	pub fn recorded(&self) -> Vec<Duration> {
		self.delays.lock().clone()
	}
}
impl Delay for RecordingDelay {
	fn delay(&self, duration: Duration) -> DelayFuture<'_> {
		self.delays.lock().push(duration);

		Box::pin(async {})
	}
}

/// Canned response served by [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct Scripted {
	status: u16,
	body: String,
	retry_after: Option<&'static str>,
}
impl Scripted {
	pub fn status(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into(), retry_after: None }
	}

	pub fn member(roles: &[&str]) -> Self {
		let roles = roles.iter().map(|role| format!("\"{role}\"")).collect::<Vec<_>>().join(",");

		Self::status(200, format!("{{\"roles\":[{roles}],\"nick\":null}}"))
	}

	pub fn with_retry_after(mut self, value: &'static str) -> Self {
		self.retry_after = Some(value);

		self
	}
}

#[derive(Debug)]
pub struct TransportDown;
impl std::fmt::Display for TransportDown {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str("Scripted transport ran out of responses.")
	}
}
impl std::error::Error for TransportDown {}

/// Request fields captured by [`ScriptedHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
	pub uri: String,
	pub authorization: Option<String>,
	pub user_agent: Option<String>,
}
impl RecordedRequest {
	fn capture(request: &HttpRequest) -> Self {
		let header = |name: HeaderName| {
			request.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
		};

		Self {
			uri: request.uri().to_string(),
			authorization: header(AUTHORIZATION),
			user_agent: header(USER_AGENT),
		}
	}
}

/// Transport replaying a fixed queue of responses and recording every request.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
	script: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<RecordedRequest>>,
}
impl ScriptedHttpClient {
	pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
		Self { script: Mutex::new(script.into_iter().collect()), requests: Default::default() }
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}
}
impl ProviderHttpClient for ScriptedHttpClient {
	type TransportError = TransportDown;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		self.requests.lock().push(RecordedRequest::capture(&request));

		let next = self.script.lock().pop_front();

		Box::pin(async move {
			let scripted = next.ok_or(TransportDown)?;
			let mut response = HttpResponse::new(scripted.body.into_bytes());

			*response.status_mut() =
				StatusCode::from_u16(scripted.status).expect("Scripted status should be valid.");

			if let Some(value) = scripted.retry_after {
				response.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static(value));
			}

			Ok::<_, TransportDown>(response)
		})
	}
}

pub fn discord() -> ProviderDescriptor {
	ProviderDescriptor::discord().expect("Discord descriptor should build.")
}

/// Descriptor whose API base points at a local mock server.
pub fn mock_descriptor(base: &str) -> ProviderDescriptor {
	let url = |path: &str| {
		Url::parse(&format!("{base}{path}")).expect("Mock endpoint URL should parse.")
	};

	ProviderDescriptor::builder(
		oauth2_guild::auth::ProviderId::new("discord-mock").expect("Provider id should be valid."),
	)
	.authorization_endpoint(url("/oauth2/authorize"))
	.token_endpoint(url("/oauth2/token"))
	.api_base(url("/api"))
	.build()
	.expect("Mock descriptor should build.")
}

/// Scripted client paired with a recording delay and the default retry policy.
pub fn scripted_client(
	script: impl IntoIterator<Item = Scripted>,
) -> (GuildClient<ScriptedHttpClient>, Arc<ScriptedHttpClient>, Arc<RecordingDelay>) {
	let transport = Arc::new(ScriptedHttpClient::new(script));
	let delay = Arc::new(RecordingDelay::default());
	let client = GuildClient::with_http_client(discord(), transport.clone())
		.with_retry(RetryPolicy::default())
		.with_delay(delay.clone());

	(client, transport, delay)
}

pub fn guild(id: &str) -> GuildId {
	GuildId::new(id).expect("Guild fixture should be valid.")
}

pub fn strategy_key() -> StrategyKey {
	StrategyKey::new("discord").expect("Strategy key should be valid.")
}

/// Parses a strategy with the common client fields plus `extra` JSON members.
pub fn authorization(extra: &str) -> AuthorizationConfig {
	let raw = format!(
		r#"{{"clientId":"cid","clientSecret":"shh","callbackURL":"https://wiki.example.com/login/discord/callback","key":"discord"{extra}}}"#
	);

	StrategyConfig::from_json(&raw)
		.expect("Strategy fixture should parse.")
		.authorization()
		.expect("Strategy fixture should validate.")
}

pub fn profile(guilds: &[&str]) -> ProviderProfile {
	ProviderProfile {
		id: "80351110224678912".into(),
		username: "nelly".into(),
		global_name: Some("Nelly".into()),
		discriminator: Some("0".into()),
		avatar: Some("8342729096ea3675442027381ff50dfe".into()),
		email: Some("nelly@example.com".into()),
		guilds: guilds.iter().map(|id| GuildSummary { id: guild(id), name: None }).collect(),
	}
}
