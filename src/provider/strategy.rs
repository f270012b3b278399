//! Provider strategy hooks that classify failed API responses.
//!
//! The client never decides on its own whether a failure is worth retrying; it builds a
//! [`ProviderErrorContext`] from plain data and asks the strategy.

// self
use crate::_prelude::*;

/// Strategy hook that classifies failed provider API calls.
///
/// Implementors are required to be `Send + Sync`, and the hook intentionally uses crate-owned
/// data types so strategies never depend on reqwest-specific structures.
pub trait ProviderStrategy: Send + Sync {
	/// Decides whether a failed call is permanent or worth retrying.
	fn classify_api_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Client error that will not resolve by retrying (missing scope, not a member).
	Rejected,
	/// Throttling, server failure, or network trouble; retry with backoff.
	Retryable,
}

/// Context passed to provider strategies when classifying API errors.
///
/// The struct keeps only primitive data (status code, retry hint, body preview) so strategies
/// stay decoupled from any HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Retry-After hint supplied with the response.
	pub retry_after: Option<Duration>,
	/// Preview of the response body or transport error message.
	pub body_preview: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a context for an HTTP response with the given status.
	pub fn new(status: u16) -> Self {
		Self { http_status: Some(status), retry_after: None, body_preview: None, network_error: false }
	}

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure() -> Self {
		Self { http_status: None, retry_after: None, body_preview: None, network_error: true }
	}

	/// Adds a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Adds a body preview, truncated to a bounded length.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		let body = body.into();

		self.body_preview = if body.trim().is_empty() { None } else { Some(truncate_preview(body)) };

		self
	}

	/// Short human-readable summary used for error reasons and log fields.
	pub fn summary(&self) -> String {
		match (self.http_status, self.body_preview.as_deref()) {
			(Some(status), Some(body)) => format!("status {status}: {body}"),
			(Some(status), None) => format!("status {status}"),
			(None, Some(detail)) => format!("network failure: {detail}"),
			(None, None) => "network failure".into(),
		}
	}
}

/// Default strategy following the provider's documented semantics.
///
/// 429 and 5xx responses, plus network failures, are retryable. Every other non-success status
/// is a permanent rejection.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_api_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if ctx.network_error {
			return ProviderErrorKind::Retryable;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProviderErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(429) => ProviderErrorKind::Retryable,
		Some(code) if code >= 500 => ProviderErrorKind::Retryable,
		Some(_) => ProviderErrorKind::Rejected,
		None => ProviderErrorKind::Retryable,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn throttling_and_server_errors_are_retryable() {
		let strategy = DefaultProviderStrategy;

		for status in [429, 500, 502, 503] {
			assert_eq!(
				strategy.classify_api_error(&ProviderErrorContext::new(status)),
				ProviderErrorKind::Retryable,
				"Status {status} should be retryable."
			);
		}

		assert_eq!(
			strategy.classify_api_error(&ProviderErrorContext::network_failure()),
			ProviderErrorKind::Retryable
		);
	}

	#[test]
	fn client_errors_are_rejected() {
		let strategy = DefaultProviderStrategy;

		for status in [400, 401, 403, 404] {
			assert_eq!(
				strategy.classify_api_error(&ProviderErrorContext::new(status)),
				ProviderErrorKind::Rejected,
				"Status {status} should be rejected."
			);
		}
	}

	#[test]
	fn previews_are_truncated_and_summarized() {
		let ctx = ProviderErrorContext::new(403).with_body_preview("x".repeat(300));
		let preview = ctx.body_preview.clone().expect("Preview should be kept.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(ProviderErrorContext::new(404).with_body_preview("  ").summary(), "status 404");
		assert_eq!(ProviderErrorContext::network_failure().summary(), "network failure");
	}
}
