//! Provider profile schema types and the identity normalizer.
//!
//! Provider payloads are loosely typed JSON. Everything the pipeline reads is parsed into the
//! explicit types below at the boundary, with absent or `null` collections defaulted to empty so
//! downstream code never distinguishes "missing" from "none".

pub mod avatar;

pub use avatar::*;

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{GuildId, RoleId},
};

/// Failure to parse a provider payload into its schema type.
#[derive(Debug, ThisError)]
#[error("Provider {payload} payload is malformed at `{path}`.")]
pub struct ProfileParseError {
	/// Which payload failed (`profile` or `guild member`).
	pub payload: &'static str,
	/// JSON path of the offending field.
	pub path: String,
	/// Underlying deserialization failure.
	#[source]
	pub source: serde_json::Error,
}

/// Raw user profile returned by the provider's `users/@me` endpoint, plus the inline guild list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Provider user snowflake.
	pub id: String,
	/// Unique provider username.
	pub username: String,
	/// Display name chosen by the user, when set.
	#[serde(default)]
	pub global_name: Option<String>,
	/// Legacy four-digit discriminator; `"0"` for migrated accounts.
	#[serde(default)]
	pub discriminator: Option<String>,
	/// Avatar hash, absent when the user never uploaded one.
	#[serde(default)]
	pub avatar: Option<String>,
	/// Verified email, present when the `email` scope was granted.
	#[serde(default)]
	pub email: Option<String>,
	/// Guilds the user belongs to, present when the `guilds` scope was granted.
	#[serde(default, deserialize_with = "null_as_default")]
	pub guilds: Vec<GuildSummary>,
}
impl ProviderProfile {
	/// Parses a raw profile payload.
	pub fn from_json(raw: &str) -> Result<Self, ProfileParseError> {
		parse_payload("profile", raw)
	}

	/// Returns true when the inline guild list contains `guild`.
	pub fn is_in_guild(&self, guild: &GuildId) -> bool {
		self.guilds.iter().any(|summary| &summary.id == guild)
	}
}

/// Partial guild entry from the `guilds` scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSummary {
	/// Guild snowflake.
	pub id: GuildId,
	/// Guild name.
	#[serde(default)]
	pub name: Option<String>,
}

/// Member record returned by `users/@me/guilds/{guild}/member`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
	/// Role snowflakes held by the member inside the guild.
	#[serde(default, deserialize_with = "null_as_default")]
	pub roles: Vec<RoleId>,
	/// Guild-specific nickname.
	#[serde(default)]
	pub nick: Option<String>,
}
impl GuildMember {
	/// Parses a raw member payload.
	pub fn from_json(raw: &[u8]) -> Result<Self, ProfileParseError> {
		let mut de = serde_json::Deserializer::from_slice(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|err| path_error("guild member", err))
	}

	/// Returns true when the member holds `role`.
	pub fn has_role(&self, role: &RoleId) -> bool {
		self.roles.iter().any(|held| held == role)
	}
}

/// Host-facing profile produced by [`normalize`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProfile {
	/// Provider user snowflake.
	pub id: String,
	/// Provider username.
	pub username: String,
	/// Verified email, when granted.
	pub email: Option<String>,
	/// Preferred display name.
	pub display_name: String,
	/// Absolute avatar URL.
	pub picture_url: String,
}

/// Maps a raw provider profile into the host's canonical shape.
pub fn normalize(profile: &ProviderProfile) -> CanonicalProfile {
	let display_name = match profile.global_name.as_deref() {
		Some(name) if !name.is_empty() => name.to_owned(),
		_ => profile.username.clone(),
	};

	CanonicalProfile {
		id: profile.id.clone(),
		username: profile.username.clone(),
		email: profile.email.clone(),
		display_name,
		picture_url: avatar_url(profile),
	}
}

fn parse_payload<T>(payload: &'static str, raw: &str) -> Result<T, ProfileParseError>
where
	T: for<'de> Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_str(raw);

	serde_path_to_error::deserialize(&mut de).map_err(|err| path_error(payload, err))
}

fn path_error(
	payload: &'static str,
	err: serde_path_to_error::Error<serde_json::Error>,
) -> ProfileParseError {
	let path = err.path().to_string();

	ProfileParseError { payload, path, source: err.into_inner() }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
