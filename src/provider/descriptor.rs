//! Provider descriptor data structures shared by the strategy helpers and the API client.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{GuildId, ProviderId},
	error::ConfigError,
};

const DISCORD_AUTHORIZATION_URL: &str = "https://discord.com/api/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_API_BASE: &str = "https://discord.com/api/v10/";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the browser is sent to.
	pub authorization: Url,
	/// Token endpoint used by the host's OAuth library.
	pub token: Url,
	/// Versioned REST API base; always ends with `/`.
	pub api_base: Url,
}

/// Immutable provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Descriptor for Discord's public OAuth and v10 REST endpoints.
	pub fn discord() -> Result<Self, ProviderDescriptorError> {
		Self::builder(ProviderId::new("discord")?)
			.authorization_endpoint(parse_endpoint("authorization", DISCORD_AUTHORIZATION_URL)?)
			.token_endpoint(parse_endpoint("token", DISCORD_TOKEN_URL)?)
			.api_base(parse_endpoint("api", DISCORD_API_BASE)?)
			.build()
	}

	/// URL of the current user's member record inside `guild`.
	pub fn member_url(&self, guild: &GuildId) -> Result<Url, ConfigError> {
		let mut url = self.endpoints.api_base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidDescriptor {
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			})?
			.pop_if_empty()
			.extend(["users", "@me", "guilds", guild.as_ref(), "member"]);

		Ok(url)
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidUrl { endpoint, source })
}
