//! Strategy configuration as supplied by the host, and the validated authorization view.
//!
//! Hosts store one [`StrategyConfig`] per configured login strategy. Text fields arrive straight
//! from admin forms, so empty strings mean "unset" and the role list is comma-separated. The
//! role mapping stays raw until a login needs it: a malformed mapping must never block logins,
//! so it is parsed (and reported) per login by [`AuthorizationConfig::role_mappings`].

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{GuildId, RoleId, ScopeSet, Secret, StrategyKey},
	error::{ConfigError, MappingConfigError},
};

/// Scope granting the user's identity.
pub const SCOPE_IDENTIFY: &str = "identify";
/// Scope granting the user's email address.
pub const SCOPE_EMAIL: &str = "email";
/// Scope granting the inline guild list.
pub const SCOPE_GUILDS: &str = "guilds";
/// Scope granting access to the member endpoint.
pub const SCOPE_GUILDS_MEMBERS_READ: &str = "guilds.members.read";

/// Host-supplied configuration for one strategy instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret, handed to the host's OAuth library for the code exchange.
	pub client_secret: Secret,
	/// Redirect URI registered with the provider.
	#[serde(rename = "callbackURL", alias = "callbackUrl")]
	pub callback_url: String,
	/// Host key of the strategy instance.
	pub key: StrategyKey,
	/// Guild the user must belong to.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub guild_id: Option<String>,
	/// Comma-separated role identifiers, any of which grants access.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub roles: Option<String>,
	/// Enables group reconciliation from member roles.
	#[serde(default)]
	pub map_roles: bool,
	/// JSON object mapping role identifiers to host group names.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub role_mappings: Option<String>,
}
impl StrategyConfig {
	/// Parses the host's JSON representation, reporting the offending field path on failure.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|err| {
			let path = err.path().to_string();

			ConfigError::InvalidStrategy { path, source: err.into_inner() }
		})
	}

	/// Validates the callback URL.
	pub fn callback_url(&self) -> Result<Url, ConfigError> {
		Url::parse(&self.callback_url).map_err(|source| ConfigError::InvalidCallback { source })
	}

	/// Derives the validated authorization view.
	pub fn authorization(&self) -> Result<AuthorizationConfig, ConfigError> {
		let guild_id = self.guild_id.as_deref().map(GuildId::new).transpose()?;
		let required_roles = self
			.roles
			.as_deref()
			.map(parse_role_list)
			.transpose()?
			.unwrap_or_default();
		let config = AuthorizationConfig {
			guild_id,
			required_roles,
			map_roles_enabled: self.map_roles,
			role_mappings: self.role_mappings.clone(),
		};

		config.validate()?;

		Ok(config)
	}
}

/// Guild and role requirements evaluated for every login.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationConfig {
	/// Guild the user must belong to.
	pub guild_id: Option<GuildId>,
	/// Roles granting access; holding any one of them is sufficient.
	pub required_roles: BTreeSet<RoleId>,
	/// Enables group reconciliation.
	pub map_roles_enabled: bool,
	/// Raw JSON role mapping.
	pub role_mappings: Option<String>,
}
impl AuthorizationConfig {
	/// Returns true when the login needs the member endpoint.
	pub fn needs_member(&self) -> bool {
		self.guild_id.is_some() && (!self.required_roles.is_empty() || self.map_roles_enabled)
	}

	/// Scopes the strategy must request; guild scopes are only requested when needed.
	pub fn login_scopes(&self) -> ScopeSet {
		let mut scopes = vec![SCOPE_IDENTIFY, SCOPE_EMAIL];

		if self.guild_id.is_some() {
			scopes.push(SCOPE_GUILDS);
		}
		if self.needs_member() {
			scopes.push(SCOPE_GUILDS_MEMBERS_READ);
		}

		// Constant scope names always validate.
		ScopeSet::new(scopes).unwrap_or_default()
	}

	/// Parses the role mapping; an absent mapping is empty.
	pub fn role_mappings(&self) -> Result<RoleMappings, MappingConfigError> {
		match self.role_mappings.as_deref() {
			Some(raw) => RoleMappings::from_json(raw),
			None => Ok(RoleMappings::default()),
		}
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.guild_id.is_none() {
			if !self.required_roles.is_empty() {
				return Err(ConfigError::GuildRequired { feature: "roles" });
			}
			if self.map_roles_enabled {
				return Err(ConfigError::GuildRequired { feature: "mapRoles" });
			}
		}

		Ok(())
	}
}

/// Mapping from provider role identifiers to host group names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMappings(BTreeMap<RoleId, String>);
impl RoleMappings {
	/// Parses a JSON object of role identifiers to group names.
	pub fn from_json(raw: &str) -> Result<Self, MappingConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(MappingConfigError::from_path_error)
	}

	/// Returns true when nothing is mapped.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of mapped roles.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates `(role, group name)` pairs in role order.
	pub fn iter(&self) -> impl Iterator<Item = (&RoleId, &str)> {
		self.0.iter().map(|(role, group)| (role, group.as_str()))
	}

	/// Distinct group names targeted by the mapping.
	pub fn group_names(&self) -> BTreeSet<&str> {
		self.0.values().map(String::as_str).collect()
	}
}
impl FromIterator<(RoleId, String)> for RoleMappings {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (RoleId, String)>,
	{
		Self(iter.into_iter().collect())
	}
}

fn parse_role_list(raw: &str) -> Result<BTreeSet<RoleId>, ConfigError> {
	raw.split(',')
		.map(str::trim)
		.filter(|role| !role.is_empty())
		.map(|role| RoleId::new(role).map_err(ConfigError::from))
		.collect()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;

	Ok(value.map(|raw| raw.trim().to_owned()).filter(|raw| !raw.is_empty()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn strategy(extra: &str) -> StrategyConfig {
		let raw = format!(
			r#"{{"clientId":"cid","clientSecret":"shh","callbackURL":"https://wiki.example.com/login/discord/callback","key":"discord"{extra}}}"#
		);

		StrategyConfig::from_json(&raw).expect("Strategy fixture should parse.")
	}

	fn role(id: &str) -> RoleId {
		RoleId::new(id).expect("Role fixture should be valid.")
	}

	#[test]
	fn blank_fields_are_unset() {
		let config = strategy(r#","guildId":"","roles":" ","roleMappings":"""#);

		assert_eq!(config.guild_id, None);
		assert_eq!(config.roles, None);
		assert_eq!(config.role_mappings, None);
		assert!(!config.map_roles);
		assert_eq!(config.authorization().expect("Open config should validate."), Default::default());
	}

	#[test]
	fn roles_split_on_commas_and_trim() {
		let config = strategy(r#","guildId":"g1","roles":"r1, r2,,r3 ""#)
			.authorization()
			.expect("Role config should validate.");

		assert_eq!(config.required_roles, BTreeSet::from([role("r1"), role("r2"), role("r3")]));
		assert!(config.needs_member());
	}

	#[test]
	fn roles_and_mapping_require_a_guild() {
		let err = strategy(r#","roles":"r1""#)
			.authorization()
			.expect_err("Roles without a guild must be rejected.");

		assert!(matches!(err, ConfigError::GuildRequired { feature: "roles" }));

		let err = strategy(r#","mapRoles":true"#)
			.authorization()
			.expect_err("Mapping without a guild must be rejected.");

		assert!(matches!(err, ConfigError::GuildRequired { feature: "mapRoles" }));
	}

	#[test]
	fn invalid_strategy_reports_path() {
		let err = StrategyConfig::from_json(r#"{"clientId":1}"#)
			.expect_err("Numeric client identifiers must be rejected.");

		assert!(matches!(err, ConfigError::InvalidStrategy { ref path, .. } if path == "clientId"));
	}

	#[test]
	fn secret_stays_out_of_debug_output() {
		let config = strategy("");

		assert!(!format!("{config:?}").contains("shh"));
		assert_eq!(config.client_secret.expose(), "shh");
	}

	#[test]
	fn scopes_grow_with_requirements() {
		let open = AuthorizationConfig::default();

		assert_eq!(open.login_scopes().normalized(), "email identify");

		let guild_only = strategy(r#","guildId":"g1""#)
			.authorization()
			.expect("Guild config should validate.");

		assert_eq!(guild_only.login_scopes().normalized(), "email guilds identify");

		let mapped = strategy(r#","guildId":"g1","mapRoles":true"#)
			.authorization()
			.expect("Mapping config should validate.");

		assert!(mapped.login_scopes().contains(SCOPE_GUILDS_MEMBERS_READ));
	}

	#[test]
	fn role_mappings_parse_lazily() {
		let config = strategy(r#","guildId":"g1","mapRoles":true,"roleMappings":"{\"r1\":\"Editors\",\"r2\":\"Reviewers\"}""#)
			.authorization()
			.expect("Mapping config should validate.");
		let mappings = config.role_mappings().expect("Mapping should parse.");

		assert_eq!(mappings.len(), 2);
		assert_eq!(mappings.group_names(), BTreeSet::from(["Editors", "Reviewers"]));

		let broken = AuthorizationConfig {
			role_mappings: Some("{not json".into()),
			..config
		};

		assert!(broken.role_mappings().is_err());
	}

	#[test]
	fn role_mappings_reject_non_string_groups() {
		assert!(RoleMappings::from_json(r#"{"r1": ["Editors"]}"#).is_err());
		assert!(RoleMappings::from_json(r#"["r1"]"#).is_err());
		assert!(RoleMappings::from_json(r#"{"": "Editors"}"#).is_err());
		assert!(RoleMappings::from_json("{}").expect("Empty mapping should parse.").is_empty());
	}
}
