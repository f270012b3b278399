//! Demonstrates the guild-gated login pipeline end to end without contacting Discord.
//!
//! 1. Parse a strategy configuration the way a host stores it.
//! 2. Build the authorize URL the user would be redirected to.
//! 3. Serve the member endpoint from a local mock and replay an OAuth callback.
//! 4. Inspect the provisioned user and the managed group changes.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_guild::{
	auth::ProviderId,
	config::StrategyConfig,
	host::{HostServices, MemoryHost},
	login::{self, GuildLogin, LoginOutcome, OAuthCallbackContext},
	profile::ProviderProfile,
	provider::{GuildClient, ProviderDescriptor},
};

const STRATEGY: &str = r#"{
	"clientId": "1049283740192837465",
	"clientSecret": "demo-secret",
	"callbackURL": "https://wiki.example.com/login/discord/callback",
	"key": "discord",
	"guildId": "613425648685547541",
	"roles": "900000000000000001, 900000000000000002",
	"mapRoles": true,
	"roleMappings": "{\"900000000000000001\": \"Editors\", \"900000000000000002\": \"Reviewers\"}"
}"#;
const PROFILE: &str = r#"{
	"id": "80351110224678912",
	"username": "nelly",
	"global_name": "Nelly",
	"discriminator": "0",
	"avatar": null,
	"email": "nelly@example.com",
	"guilds": [{ "id": "613425648685547541", "name": "Wiki Editors" }]
}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let strategy = StrategyConfig::from_json(STRATEGY)?;
	let authorize = login::authorization_request(&strategy, &ProviderDescriptor::discord()?)?;

	println!("Redirect the user to: {}", authorize.url);
	println!("Expect state `{}` on the callback.", authorize.state);

	let server = MockServer::start_async().await;
	let member_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/users/@me/guilds/613425648685547541/member")
				.header("authorization", "Bearer demo-access-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"roles":["900000000000000001"],"nick":null}"#);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("discord-mock")?)
		.authorization_endpoint(Url::parse(&server.url("/oauth2/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/oauth2/token"))?)
		.api_base(Url::parse(&server.url("/api"))?)
		.build()?;
	let host = Arc::new(MemoryHost::default());
	let editors = host.define_group("Editors");
	let reviewers = host.define_group("Reviewers");
	let pipeline = GuildLogin::new(
		GuildClient::new(descriptor),
		strategy.authorization()?,
		HostServices::from_host(host.clone()),
	);
	let callback = OAuthCallbackContext::new(
		"demo-access-token",
		ProviderProfile::from_json(PROFILE)?,
		strategy.key.clone(),
	);

	match pipeline.handle_callback(&callback).await? {
		LoginOutcome::Provisioned { user, sync } => {
			println!("Provisioned {:?} as {}.", user.id, user.profile.display_name);
			println!("Avatar: {}", user.profile.picture_url);
			println!("Group sync: {sync:?}");
			println!("Editors: {}", host.groups_of(user.id).contains(&editors));
			println!("Reviewers: {}", host.groups_of(user.id).contains(&reviewers));
		},
		LoginOutcome::Denied(reason) => println!("Login denied by the {reason} check."),
	}

	member_mock.assert_calls_async(1).await;

	Ok(())
}
