//! Guild member client with bounded, strategy-driven retries.

// crates.io
use oauth2::http::{
	HeaderValue, Method, Request,
	header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	auth::{GuildId, Secret},
	error::ConfigError,
	http::{HttpRequest, ProviderHttpClient, parse_retry_after},
	obs::{self, LoginSpan, LoginStage, StageOutcome},
	profile::GuildMember,
	provider::{
		Delay, DefaultProviderStrategy, ProviderDescriptor, ProviderErrorContext,
		ProviderErrorKind, ProviderStrategy, RetryPolicy, TokioDelay,
	},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// User agent sent when the caller does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!(
	"DiscordBot (",
	env!("CARGO_PKG_REPOSITORY"),
	", ",
	env!("CARGO_PKG_VERSION"),
	")"
);

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestGuildClient = GuildClient<ReqwestHttpClient>;

/// Calls the provider's member endpoint on behalf of a logged-in user.
///
/// Every call makes at most [`RetryPolicy::attempts`] requests. Failed responses are classified by
/// the configured [`ProviderStrategy`]: rejections return immediately, retryable failures wait on
/// the injected [`Delay`] before the next attempt. The bearer token is only ever placed in the
/// outgoing `Authorization` header.
#[derive(Clone)]
pub struct GuildClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Provider descriptor that defines the API base.
	pub descriptor: ProviderDescriptor,
	/// Strategy classifying failed responses.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Attempt budget and backoff schedule.
	pub retry: RetryPolicy,
	/// Delay awaited between attempts.
	pub delay: Arc<dyn Delay>,
	/// Value of the `User-Agent` header.
	pub user_agent: String,
}
impl<C> GuildClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_http_client(descriptor: ProviderDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			retry: RetryPolicy::default(),
			delay: Arc::new(TokioDelay),
			user_agent: DEFAULT_USER_AGENT.into(),
		}
	}

	/// Replaces the failure classifier.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the retry policy.
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Replaces the delay awaited between attempts.
	pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
		self.delay = delay;

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Fetches the current user's member record inside `guild`.
	///
	/// Returns [`Error::ProviderRejected`] for permanent failures (including a member payload
	/// that does not parse) and [`Error::ProviderUnavailable`] once the attempt budget is spent.
	pub async fn fetch_guild_member(&self, token: &Secret, guild: &GuildId) -> Result<GuildMember> {
		const STAGE: LoginStage = LoginStage::MemberFetch;

		let span = LoginSpan::new(STAGE, "fetch_guild_member");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span.instrument(self.fetch_with_retry(token, guild)).await;
		let outcome = if result.is_ok() { StageOutcome::Success } else { StageOutcome::Failure };

		obs::record_stage_outcome(STAGE, outcome);

		result
	}

	async fn fetch_with_retry(&self, token: &Secret, guild: &GuildId) -> Result<GuildMember> {
		let url = self.descriptor.member_url(guild)?;
		let attempts = self.retry.attempts();
		let mut last_status = None;

		for attempt in 1..=attempts {
			let request = self.member_request(&url, token)?;
			let ctx = match self.http_client.execute(request).await {
				Ok(response) if response.status().is_success() => {
					let status = response.status().as_u16();

					return GuildMember::from_json(response.body()).map_err(|e| {
						Error::ProviderRejected { status: Some(status), reason: e.to_string() }
					});
				},
				Ok(response) => ProviderErrorContext::new(response.status().as_u16())
					.with_retry_after(parse_retry_after(response.headers()))
					.with_body_preview(String::from_utf8_lossy(response.body())),
				Err(e) => ProviderErrorContext::network_failure().with_body_preview(e.to_string()),
			};

			last_status = ctx.http_status;

			let kind = self.strategy.classify_api_error(&ctx);

			obs::log_provider_failure(guild, attempt, kind.into(), &ctx.summary());

			match kind {
				ProviderErrorKind::Rejected =>
					return Err(Error::ProviderRejected {
						status: ctx.http_status,
						reason: ctx.summary(),
					}),
				ProviderErrorKind::Retryable =>
					if attempt < attempts {
						self.delay.delay(self.retry.delay_for(attempt, ctx.retry_after)).await;
					},
			}
		}

		obs::warn_retries_exhausted(guild, attempts);

		Err(Error::ProviderUnavailable { attempts, last_status })
	}

	fn member_request(&self, url: &Url, token: &Secret) -> Result<HttpRequest, ConfigError> {
		let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
			.map_err(oauth2::http::Error::from)?;

		bearer.set_sensitive(true);

		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, bearer)
			.header(USER_AGENT, self.user_agent.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())?;

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl GuildClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(descriptor: ProviderDescriptor) -> Self {
		Self::with_http_client(descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Debug for GuildClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GuildClient")
			.field("descriptor", &self.descriptor)
			.field("retry", &self.retry)
			.field("user_agent", &self.user_agent)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{HttpFuture, HttpResponse};

	struct Unreachable;
	impl ProviderHttpClient for Unreachable {
		type TransportError = std::io::Error;

		fn execute(&self, _: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
			Box::pin(async { Err::<HttpResponse, _>(std::io::Error::other("connection refused")) })
		}
	}

	fn client() -> GuildClient<Unreachable> {
		let descriptor = ProviderDescriptor::discord().expect("Discord descriptor should build.");

		GuildClient::with_http_client(descriptor, Unreachable)
	}

	#[test]
	fn member_request_carries_bearer_and_user_agent() {
		let client = client().with_user_agent("tests/1.0");
		let guild = GuildId::new("42").expect("Guild fixture should be valid.");
		let url = client.descriptor.member_url(&guild).expect("Member URL should build.");
		let request = client
			.member_request(&url, &Secret::new("tok"))
			.expect("Request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(request.uri(), "https://discord.com/api/v10/users/@me/guilds/42/member");
		assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");
		assert!(request.headers()[AUTHORIZATION].is_sensitive());
		assert_eq!(request.headers()[USER_AGENT], "tests/1.0");
	}

	#[test]
	fn debug_output_omits_transport() {
		let rendered = format!("{:?}", client());

		assert!(rendered.contains("GuildClient"));
		assert!(rendered.contains(DEFAULT_USER_AGENT));
		assert!(!rendered.contains("http_client"));
	}

	#[tokio::test]
	async fn network_failures_exhaust_the_budget() {
		let client = client().with_retry(RetryPolicy::new(2, Duration::ZERO));
		let guild = GuildId::new("42").expect("Guild fixture should be valid.");
		let err = client
			.fetch_guild_member(&Secret::new("tok"), &guild)
			.await
			.expect_err("Unreachable transport must fail.");

		assert!(matches!(err, Error::ProviderUnavailable { attempts: 2, last_status: None }));
	}
}
