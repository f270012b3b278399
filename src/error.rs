//! Crate-level error types shared by the provider client, the login pipeline, and hosts.

// self
use crate::{_prelude::*, authorize::DenyReason, host::HostError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Role mapping configuration could not be parsed.
	#[error(transparent)]
	MappingConfigInvalid(#[from] MappingConfigError),

	/// Provider refused the request with a client error; retrying will not help.
	#[error("Provider rejected the request: {reason}.")]
	ProviderRejected {
		/// HTTP status code, when the provider responded at all.
		status: Option<u16>,
		/// Short provider- or crate-supplied explanation.
		reason: String,
	},
	/// Provider stayed throttled or unavailable for every permitted attempt.
	#[error("Provider is unavailable after {attempts} attempts.")]
	ProviderUnavailable {
		/// Number of attempts performed.
		attempts: u32,
		/// Status of the last response, when one was received.
		last_status: Option<u16>,
	},
	/// Guild or role requirements were not met.
	///
	/// The rendered message stays generic so unauthenticated callers cannot probe which check
	/// failed; the reason is kept for server-side logging only.
	#[error("Login failed.")]
	AuthorizationDenied {
		/// Check that denied the login.
		reason: DenyReason,
	},
	/// Host user upsert failed.
	#[error("Login failed.")]
	ProvisioningFailed {
		/// Underlying host failure.
		#[source]
		source: HostError,
	},
}
impl Error {
	/// Returns true when the error must be shown to end users as a generic login failure.
	pub fn is_login_failure(&self) -> bool {
		matches!(self, Self::AuthorizationDenied { .. } | Self::ProvisioningFailed { .. })
	}

	/// Returns true when the failure may clear up on a later attempt.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::ProviderUnavailable { .. })
	}
}

/// Configuration and request-building failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Callback URL cannot be parsed.
	#[error("Callback URL is invalid.")]
	InvalidCallback {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Strategy configuration JSON does not match the expected schema.
	#[error("Strategy configuration is invalid at `{path}`.")]
	InvalidStrategy {
		/// JSON path of the offending field.
		path: String,
		/// Underlying deserialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// An identifier inside the configuration failed validation.
	#[error("Configuration contains an invalid identifier.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Role checks or role mapping were enabled without a guild to check against.
	#[error("The {feature} option requires a guild identifier.")]
	GuildRequired {
		/// Option that needs the guild (`roles` or `mapRoles`).
		feature: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Role mapping configuration failures.
///
/// These never fail a login: the pipeline logs them and continues with an empty mapping.
#[derive(Debug, ThisError)]
pub enum MappingConfigError {
	/// Mapping is not a JSON object of role identifiers to group names.
	#[error("Role mapping is malformed at `{path}`.")]
	Malformed {
		/// JSON path of the offending entry.
		path: String,
		/// Underlying deserialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl MappingConfigError {
	pub(crate) fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::Malformed { path, source: err.into_inner() }
	}
}
