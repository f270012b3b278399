//! Provider-facing descriptors (data), strategies (behavior), and the member API client.
//!
//! `descriptor` exposes validated endpoint metadata (`ProviderDescriptor`) for the OAuth
//! handshake and the REST API. `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic
//! hook classifying failed API responses. `retry` holds the bounded backoff policy and the
//! pluggable delay, and `client` combines them into [`GuildClient`].

pub mod client;
pub mod descriptor;
pub mod retry;
pub mod strategy;

pub use client::*;
pub use descriptor::*;
pub use retry::*;
pub use strategy::*;
