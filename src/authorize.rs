//! Access validator deciding whether a provider identity may log in.

// self
use crate::{
	_prelude::*,
	config::AuthorizationConfig,
	profile::{GuildMember, ProviderProfile},
};

/// Outcome of [`authorize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	/// The login may proceed to provisioning.
	Allow,
	/// The login must stop before any host mutation.
	Deny(DenyReason),
}
impl Decision {
	/// Returns true for [`Decision::Allow`].
	pub fn is_allow(self) -> bool {
		matches!(self, Self::Allow)
	}
}

/// Check that produced a [`Decision::Deny`].
///
/// Only ever logged server-side; end users see a generic login failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
	/// The member record was unavailable or held none of the required roles.
	Roles,
	/// The inline guild list did not contain the configured guild.
	Guild,
}
impl DenyReason {
	/// Stable label for logs and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			DenyReason::Roles => "roles",
			DenyReason::Guild => "guild",
		}
	}
}
impl Display for DenyReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Evaluates the configured guild and role requirements; the first matching rule decides.
///
/// 1. Required roles: the member must be known and hold at least one of them.
/// 2. Guild only: the profile's inline guild list must contain the guild.
/// 3. Nothing configured: allow.
///
/// A missing `member` under rule 1 denies, so an unreachable provider fails closed.
pub fn authorize(
	profile: &ProviderProfile,
	member: Option<&GuildMember>,
	config: &AuthorizationConfig,
) -> Decision {
	if !config.required_roles.is_empty() {
		let granted = member
			.is_some_and(|member| member.roles.iter().any(|role| config.required_roles.contains(role)));

		return if granted { Decision::Allow } else { Decision::Deny(DenyReason::Roles) };
	}
	if let Some(guild) = &config.guild_id {
		return if profile.is_in_guild(guild) {
			Decision::Allow
		} else {
			Decision::Deny(DenyReason::Guild)
		};
	}

	Decision::Allow
}
