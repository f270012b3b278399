// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how the strategy talks to the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// `prompt` value appended to authorize URLs; `none` skips the consent screen for users
	/// who already authorized the application.
	pub prompt: Option<String>,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { prompt: Some("none".into()), scope_delimiter: ' ' }
	}
}
