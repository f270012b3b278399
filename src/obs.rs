//! Optional observability helpers for the login pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `oauth2_guild.login` with the
//!   `stage` and `call_site` fields, plus the warning events in [`events`](self::events).
//! - Enable `metrics` to increment the `oauth2_guild_login_total` counter for every
//!   attempt/success/failure/denial, labeled by `stage` + `outcome`.

mod events;
mod metrics;
mod tracing;

pub use events::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, provider::ProviderErrorKind};

/// Pipeline stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginStage {
	/// Whole callback, from token hand-off to outcome.
	Callback,
	/// Guild member lookup against the provider API.
	MemberFetch,
	/// Host user upsert.
	Provision,
	/// Managed group reconciliation.
	GroupSync,
}
impl LoginStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginStage::Callback => "callback",
			LoginStage::MemberFetch => "member_fetch",
			LoginStage::Provision => "provision",
			LoginStage::GroupSync => "group_sync",
		}
	}
}
impl Display for LoginStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated or absorbed.
	Failure,
	/// Guild or role requirements were not met.
	Denied,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
			StageOutcome::Denied => "denied",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Log level used for one failed member lookup attempt.
///
/// Retryable attempts stay at debug level since a later attempt may still succeed; exhaustion is
/// reported separately by [`warn_retries_exhausted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptSeverity {
	/// The attempt will be retried.
	Debug,
	/// The provider rejected the request for good.
	Warn,
}
impl From<ProviderErrorKind> for AttemptSeverity {
	fn from(kind: ProviderErrorKind) -> Self {
		match kind {
			ProviderErrorKind::Rejected => AttemptSeverity::Warn,
			ProviderErrorKind::Retryable => AttemptSeverity::Debug,
		}
	}
}
