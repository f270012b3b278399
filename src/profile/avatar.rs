//! Avatar URL derivation, including the provider's stock-avatar algorithm.

// self
use crate::profile::ProviderProfile;

const CDN_BASE: &str = "https://cdn.discordapp.com";
const LEGACY_DISCRIMINATOR_MODULUS: u64 = 5;
const MODERN_AVATAR_COUNT: u64 = 6;
const SNOWFLAKE_TIMESTAMP_SHIFT: u32 = 22;

/// Returns the avatar URL for `profile`, falling back to its stock avatar.
pub fn avatar_url(profile: &ProviderProfile) -> String {
	match profile.avatar.as_deref() {
		Some(hash) if !hash.is_empty() => format!("{CDN_BASE}/avatars/{}/{hash}.png", profile.id),
		_ => default_avatar_url(default_avatar_index(&profile.id, profile.discriminator.as_deref())),
	}
}

/// Computes the stock avatar index the provider shows for users without a custom avatar.
///
/// Accounts that still carry a legacy discriminator use `discriminator % 5`; migrated accounts
/// (discriminator absent or `"0"`) use `(id >> 22) % 6`. Identifiers that are not numeric fall
/// back to index `0`.
pub fn default_avatar_index(user_id: &str, discriminator: Option<&str>) -> u64 {
	let legacy = discriminator
		.filter(|value| *value != "0")
		.and_then(|value| value.parse::<u64>().ok());

	match legacy {
		Some(discriminator) => discriminator % LEGACY_DISCRIMINATOR_MODULUS,
		None => user_id
			.parse::<u64>()
			.map(|id| (id >> SNOWFLAKE_TIMESTAMP_SHIFT) % MODERN_AVATAR_COUNT)
			.unwrap_or(0),
	}
}

/// Builds the CDN URL of a stock avatar.
pub fn default_avatar_url(index: u64) -> String {
	format!("{CDN_BASE}/embed/avatars/{index}.png")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile(id: &str, discriminator: Option<&str>, avatar: Option<&str>) -> ProviderProfile {
		ProviderProfile {
			id: id.into(),
			username: "user".into(),
			global_name: None,
			discriminator: discriminator.map(Into::into),
			avatar: avatar.map(Into::into),
			email: None,
			guilds: Vec::new(),
		}
	}

	#[test]
	fn legacy_discriminator_uses_modulo_five() {
		assert_eq!(default_avatar_index("1000000000000000000", Some("1337")), 2);
		assert_eq!(default_avatar_index("1", Some("0005")), 0);
	}

	#[test]
	fn migrated_accounts_use_snowflake_shift() {
		assert_eq!(default_avatar_index("1000000000000000000", Some("0")), 1);
		assert_eq!(default_avatar_index("1000000000000000000", None), 1);
		assert_eq!(
			default_avatar_index("80351110224678912", None),
			(80351110224678912_u64 >> 22) % 6
		);
	}

	#[test]
	fn unparsable_inputs_stay_deterministic() {
		assert_eq!(default_avatar_index("not-a-snowflake", None), 0);
		assert_eq!(default_avatar_index("1000000000000000000", Some("abcd")), 1);
	}

	#[test]
	fn urls_follow_cdn_layout() {
		assert_eq!(
			avatar_url(&profile("42", None, Some("a_hash"))),
			"https://cdn.discordapp.com/avatars/42/a_hash.png"
		);
		assert_eq!(
			avatar_url(&profile("1000000000000000000", Some("0"), None)),
			"https://cdn.discordapp.com/embed/avatars/1.png"
		);
		assert_eq!(
			avatar_url(&profile("1", Some("1337"), Some(""))),
			"https://cdn.discordapp.com/embed/avatars/2.png"
		);
	}
}
