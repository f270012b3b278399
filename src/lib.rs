//! Guild-gated OAuth 2.0 login for Discord: verify guild membership and member roles with
//! resilient provider calls, normalize identities, and reconcile managed host groups.
//!
//! The OAuth exchange itself belongs to the host's OAuth library. This crate starts where that
//! library hands over an access token plus the raw provider profile: [`login::GuildLogin`] runs
//! the authorization pipeline and talks to the host through the collaborator traits in
//! [`host`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authorize;
pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod login;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod reconcile;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
