mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use common::*;
use oauth2_guild::{
	auth::{RoleId, Secret},
	error::Error,
	http::ReqwestHttpClient,
	provider::{GuildClient, RetryPolicy},
};

const MEMBER_PATH: &str = "/api/users/@me/guilds/613425648685547541/member";

fn mock_client(server: &MockServer) -> (GuildClient<ReqwestHttpClient>, Arc<RecordingDelay>) {
	let delay = Arc::new(RecordingDelay::default());
	let client = GuildClient::with_http_client(
		mock_descriptor(&server.base_url()),
		ReqwestHttpClient::default(),
	)
	.with_delay(delay.clone());

	(client, delay)
}

fn role(id: &str) -> RoleId {
	RoleId::new(id).expect("Role fixture should be valid.")
}

#[tokio::test]
async fn member_fetch_sends_bearer_and_parses_roles() {
	let server = MockServer::start_async().await;
	let (client, delay) = mock_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(MEMBER_PATH)
				.header("authorization", "Bearer member-token")
				.header_exists("user-agent");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"roles":["r1","r2"],"nick":"Nel","joined_at":"2021-01-01T00:00:00Z"}"#);
		})
		.await;
	let member = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("613425648685547541"))
		.await
		.expect("Member fetch should succeed.");

	assert_eq!(member.roles, vec![role("r1"), role("r2")]);
	assert_eq!(member.nick.as_deref(), Some("Nel"));
	assert!(delay.recorded().is_empty());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let server = MockServer::start_async().await;
	let (client, delay) = mock_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(MEMBER_PATH);
			then.status(403).body(r#"{"message":"Missing Access","code":50001}"#);
		})
		.await;
	let err = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("613425648685547541"))
		.await
		.expect_err("A 403 should be rejected.");

	match err {
		Error::ProviderRejected { status, reason } => {
			assert_eq!(status, Some(403));
			assert!(reason.contains("Missing Access"));
			assert!(!reason.contains("member-token"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert!(delay.recorded().is_empty());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn server_errors_exhaust_the_attempt_budget() {
	let server = MockServer::start_async().await;
	let (client, delay) = mock_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(MEMBER_PATH);
			then.status(500);
		})
		.await;
	let err = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("613425648685547541"))
		.await
		.expect_err("Persistent 500s should exhaust retries.");

	assert!(matches!(err, Error::ProviderUnavailable { attempts: 3, last_status: Some(500) }));
	assert!(err.is_transient());
	assert_eq!(delay.recorded(), vec![Duration::seconds(1), Duration::seconds(2)]);

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn throttling_backs_off_then_succeeds() {
	let (client, transport, delay) = scripted_client([
		Scripted::status(429, r#"{"message":"You are being rate limited.","retry_after":0.5}"#),
		Scripted::status(429, ""),
		Scripted::member(&["r1"]),
	]);
	let member = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect("Third attempt should succeed.");

	assert_eq!(member.roles, vec![role("r1")]);
	assert_eq!(transport.calls(), 3);
	assert_eq!(delay.recorded(), vec![Duration::seconds(1), Duration::seconds(2)]);

	for request in transport.requests() {
		assert_eq!(request.uri, "https://discord.com/api/v10/users/@me/guilds/42/member");
		assert_eq!(request.authorization.as_deref(), Some("Bearer member-token"));
		assert!(request.user_agent.is_some_and(|agent| agent.starts_with("DiscordBot (")));
	}
}

#[tokio::test]
async fn retry_after_extends_the_backoff() {
	let (client, transport, delay) = scripted_client([
		Scripted::status(429, "").with_retry_after("5"),
		Scripted::status(503, "").with_retry_after("0.25"),
		Scripted::member(&[]),
	]);

	client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect("Third attempt should succeed.");

	assert_eq!(transport.calls(), 3);
	assert_eq!(delay.recorded(), vec![Duration::seconds(5), Duration::seconds(2)]);
}

#[tokio::test]
async fn custom_budget_bounds_attempts() {
	let (client, transport, delay) =
		scripted_client([Scripted::status(502, ""), Scripted::status(502, ""), Scripted::member(&[])]);
	let client = client.with_retry(RetryPolicy::new(2, Duration::milliseconds(100)));
	let err = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect_err("Two failures should exhaust a budget of two.");

	assert!(matches!(err, Error::ProviderUnavailable { attempts: 2, last_status: Some(502) }));
	assert_eq!(transport.calls(), 2);
	assert_eq!(delay.recorded(), vec![Duration::milliseconds(100)]);
}

#[tokio::test]
async fn transport_failures_are_retried() {
	let (client, transport, _) = scripted_client([]);
	let err = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect_err("An empty script should fail every attempt.");

	assert!(matches!(err, Error::ProviderUnavailable { attempts: 3, last_status: None }));
	assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn malformed_member_payload_is_rejected() {
	let (client, transport, _) = scripted_client([Scripted::status(200, r#"{"roles":"r1"}"#)]);
	let err = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect_err("A non-array role list should be rejected.");

	assert!(matches!(err, Error::ProviderRejected { status: Some(200), .. }));
	assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn null_roles_default_to_empty() {
	let (client, _, _) = scripted_client([Scripted::status(200, r#"{"roles":null}"#)]);
	let member = client
		.fetch_guild_member(&Secret::new("member-token"), &guild("42"))
		.await
		.expect("Null roles should parse.");

	assert!(member.roles.is_empty());
}
