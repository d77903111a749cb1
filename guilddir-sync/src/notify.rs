//! Operational notification channel
//!
//! Fire-and-forget text messages carrying duplicate reports and validation
//! removal diagnostics. Delivery failures are logged, never escalated.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// Sink for operational diagnostics
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a diagnostic message. Must not fail the caller.
    async fn notify(&self, text: &str);
}

/// Notifier that writes diagnostics to the service log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        info!(target: "guilddir::notify", "{text}");
    }
}

/// Notifier that posts diagnostics to a webhook
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            http: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) {
        let result = self
            .http
            .post(&self.url)
            .json(&json!({ "content": text }))
            .send()
            .await
            .and_then(|r| r.error_for_status());
        if let Err(e) = result {
            warn!(error = %e, "failed to deliver notification");
        }
    }
}
