// self
use crate::{
	auth::{GroupId, GuildId, UserId},
	authorize::DenyReason,
	error::{Error, MappingConfigError},
	host::HostError,
	obs::AttemptSeverity,
};

/// Emits an event for one failed member lookup attempt at `severity`.
pub fn log_provider_failure(
	guild: &GuildId,
	attempt: u32,
	severity: AttemptSeverity,
	detail: &str,
) {
	#[cfg(feature = "tracing")]
	match severity {
		AttemptSeverity::Debug => {
			tracing::debug!(guild = %guild, attempt, detail, "Guild member lookup attempt failed.")
		},
		AttemptSeverity::Warn => {
			tracing::warn!(guild = %guild, attempt, detail, "Guild member lookup rejected.")
		},
	}

	#[cfg(not(feature = "tracing"))]
	let _ = (guild, attempt, severity, detail);
}

/// Emits a warning when every permitted member lookup attempt failed.
pub fn warn_retries_exhausted(guild: &GuildId, attempts: u32) {
	#[cfg(feature = "tracing")]
	tracing::warn!(guild = %guild, attempts, "Guild member lookup gave up.");

	#[cfg(not(feature = "tracing"))]
	let _ = (guild, attempts);
}

/// Emits a warning when a login continues without member data.
pub fn warn_member_unavailable(guild: &GuildId, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(guild = %guild, error = %error, "Continuing login without guild member data.");

	#[cfg(not(feature = "tracing"))]
	let _ = (guild, error);
}

/// Emits a warning for a role mapping that failed to parse.
pub fn warn_mapping_invalid(error: &MappingConfigError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %error, "Ignoring malformed role mapping.");

	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Emits a warning for a group change or lookup the host refused.
pub fn warn_group_sync_failure(user: UserId, group: Option<GroupId>, error: &HostError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(user = %user, group = ?group, error = %error, "Group sync step failed.");

	#[cfg(not(feature = "tracing"))]
	let _ = (user, group, error);
}

/// Emits a warning for a login denied by guild or role checks.
pub fn warn_login_denied(reason: DenyReason) {
	#[cfg(feature = "tracing")]
	tracing::warn!(reason = reason.as_str(), "Login denied.");

	#[cfg(not(feature = "tracing"))]
	let _ = reason;
}
