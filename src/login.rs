//! Login orchestrator run after the host's OAuth library finished the code exchange.
//!
//! [`GuildLogin::handle_callback`] fetches the guild member at most once, authorizes the
//! identity, provisions the host user, and finally reconciles managed groups. Authorization runs
//! before any host mutation; group sync is advisory and never fails a login.

pub mod request;

pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::{Secret, StrategyKey},
	authorize::{self, Decision, DenyReason},
	config::AuthorizationConfig,
	host::{HostServices, ProvisionRequest, User},
	http::ProviderHttpClient,
	obs::{self, LoginSpan, LoginStage, StageOutcome},
	profile::{self, GuildMember, ProviderProfile},
	provider::GuildClient,
	reconcile::{self, SyncReport},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Login pipeline specialized for the crate's default reqwest transport.
pub type ReqwestGuildLogin = GuildLogin<ReqwestHttpClient>;

/// Data handed over by the OAuth library once the token exchange succeeded.
#[derive(Clone, Debug)]
pub struct OAuthCallbackContext {
	/// Access token of the logged-in user.
	pub access_token: Secret,
	/// Raw `users/@me` profile, including the inline guild list.
	pub raw_profile: ProviderProfile,
	/// Host key of the strategy instance that ran the exchange.
	pub strategy_key: StrategyKey,
}
impl OAuthCallbackContext {
	/// Bundles the callback inputs.
	pub fn new(
		access_token: impl Into<Secret>,
		raw_profile: ProviderProfile,
		strategy_key: StrategyKey,
	) -> Self {
		Self { access_token: access_token.into(), raw_profile, strategy_key }
	}
}

/// Successful pipeline outcomes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
	/// The user passed authorization and was provisioned.
	Provisioned {
		/// Stored host user.
		user: User,
		/// Group sync result.
		///
		/// `None` when mapping is disabled or sync was skipped: member data was unavailable, the
		/// mapping did not parse, or the user's current groups could not be read. No group was
		/// changed in any of those cases.
		sync: Option<SyncReport>,
	},
	/// Guild or role requirements were not met; nothing was written to the host.
	Denied(DenyReason),
}

/// Runs the guild-gated login pipeline for one configured strategy.
#[derive(Clone)]
pub struct GuildLogin<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Member API client.
	pub client: GuildClient<C>,
	/// Guild and role requirements.
	pub config: AuthorizationConfig,
	/// Host collaborators.
	pub host: HostServices,
}
impl<C> GuildLogin<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a pipeline from its collaborators.
	pub fn new(client: GuildClient<C>, config: AuthorizationConfig, host: HostServices) -> Self {
		Self { client, config, host }
	}

	/// Runs the pipeline and reports denials as a regular outcome.
	///
	/// Errors are limited to provisioning failures; provider and group sync problems are
	/// logged and absorbed.
	pub async fn handle_callback(&self, ctx: &OAuthCallbackContext) -> Result<LoginOutcome> {
		const STAGE: LoginStage = LoginStage::Callback;

		let span = LoginSpan::new(STAGE, "handle_callback");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span.instrument(self.run(ctx)).await;
		let outcome = match &result {
			Ok(LoginOutcome::Provisioned { .. }) => StageOutcome::Success,
			Ok(LoginOutcome::Denied(_)) => StageOutcome::Denied,
			Err(_) => StageOutcome::Failure,
		};

		obs::record_stage_outcome(STAGE, outcome);

		result
	}

	/// Runs the pipeline and returns the provisioned user, mapping denials to
	/// [`Error::AuthorizationDenied`].
	pub async fn login(&self, ctx: &OAuthCallbackContext) -> Result<User> {
		match self.handle_callback(ctx).await? {
			LoginOutcome::Provisioned { user, .. } => Ok(user),
			LoginOutcome::Denied(reason) => Err(Error::AuthorizationDenied { reason }),
		}
	}

	async fn run(&self, ctx: &OAuthCallbackContext) -> Result<LoginOutcome> {
		let member = self.fetch_member(ctx).await;

		if let Decision::Deny(reason) =
			authorize::authorize(&ctx.raw_profile, member.as_ref(), &self.config)
		{
			obs::warn_login_denied(reason);

			return Ok(LoginOutcome::Denied(reason));
		}

		let user = self.provision(ctx).await?;
		let sync = match member {
			Some(member) if self.config.map_roles_enabled => self.sync_groups(&user, &member).await,
			_ => None,
		};

		Ok(LoginOutcome::Provisioned { user, sync })
	}

	async fn fetch_member(&self, ctx: &OAuthCallbackContext) -> Option<GuildMember> {
		let guild = self.config.guild_id.as_ref().filter(|_| self.config.needs_member())?;

		match self.client.fetch_guild_member(&ctx.access_token, guild).await {
			Ok(member) => Some(member),
			Err(e) => {
				obs::warn_member_unavailable(guild, &e);

				None
			},
		}
	}

	async fn provision(&self, ctx: &OAuthCallbackContext) -> Result<User> {
		const STAGE: LoginStage = LoginStage::Provision;

		let span = LoginSpan::new(STAGE, "provision");
		let request = ProvisionRequest {
			provider_key: ctx.strategy_key.clone(),
			profile: profile::normalize(&ctx.raw_profile),
		};

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(self.host.users.process_profile(request))
			.await
			.map_err(|source| Error::ProvisioningFailed { source });
		let outcome = if result.is_ok() { StageOutcome::Success } else { StageOutcome::Failure };

		obs::record_stage_outcome(STAGE, outcome);

		result
	}

	async fn sync_groups(&self, user: &User, member: &GuildMember) -> Option<SyncReport> {
		const STAGE: LoginStage = LoginStage::GroupSync;

		let span = LoginSpan::new(STAGE, "sync_groups");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let report = span
			.instrument(async {
				let mappings = match self.config.role_mappings() {
					Ok(mappings) => mappings,
					Err(e) => {
						obs::warn_mapping_invalid(&e);

						return None;
					},
				};
				let current = match self.host.relations.user_group_ids(user.id).await {
					Ok(current) => current,
					Err(e) => {
						obs::warn_group_sync_failure(user.id, None, &e);

						return None;
					},
				};
				let plan = reconcile::reconcile(
					&member.roles,
					&mappings,
					&current,
					self.host.directory.as_ref(),
				);

				Some(reconcile::apply_plan(self.host.relations.as_ref(), user, &plan).await)
			})
			.await;
		let outcome = match &report {
			Some(report) if report.is_complete() => StageOutcome::Success,
			_ => StageOutcome::Failure,
		};

		obs::record_stage_outcome(STAGE, outcome);

		report
	}
}
#[cfg(feature = "reqwest")]
impl GuildLogin<ReqwestHttpClient> {
	/// Creates a pipeline with a reqwest-backed client for `descriptor`.
	pub fn with_descriptor(
		descriptor: crate::provider::ProviderDescriptor,
		config: AuthorizationConfig,
		host: HostServices,
	) -> Self {
		Self::new(GuildClient::new(descriptor), config, host)
	}
}
impl<C> Debug for GuildLogin<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GuildLogin")
			.field("client", &self.client)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}
