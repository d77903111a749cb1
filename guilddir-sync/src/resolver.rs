//! Invite resolution service client
//!
//! Maps an invite token to the external identifier of the community behind
//! it. Ordinary not-found is a normal reply, never an error; only transport
//! and service failures surface as errors (and the validator absorbs those
//! too).

use async_trait::async_trait;
use guilddir_common::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Discord invite lookup endpoint
const INVITE_API_URL: &str = "https://discord.com/api/v10/invites";

/// External invite resolution service
#[async_trait]
pub trait InviteResolver: Send + Sync {
    /// Resolve an invite token to its community's external identifier.
    ///
    /// Returns `Ok(Some(id))` on success, `Ok(None)` when the service has
    /// no community for the token, and an error only for service failures
    /// (timeouts, server errors).
    async fn resolve(&self, token: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct InviteResponse {
    guild: Option<GuildRef>,
}

#[derive(Debug, Deserialize)]
struct GuildRef {
    id: String,
}

/// Resolver backed by the public Discord invites API
pub struct DiscordInviteResolver {
    http: Client,
}

impl DiscordInviteResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

#[async_trait]
impl InviteResolver for DiscordInviteResolver {
    async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", INVITE_API_URL, token);
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(token, "invite not known to resolution service");
            return Ok(None);
        }

        let invite: InviteResponse = response.error_for_status()?.json().await?;
        // group-DM invites carry no guild; treat them as unresolved
        Ok(invite.guild.map(|g| g.id))
    }
}
