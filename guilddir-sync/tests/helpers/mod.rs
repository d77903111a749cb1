//! Shared fakes for integration tests: in-memory content sources, a
//! table-driven invite resolver, and a collecting notification channel.

#![allow(dead_code)]

use async_trait::async_trait;
use guilddir_common::config::ValidationConfig;
use guilddir_common::{Error, Result, SourceLabel};
use guilddir_sync::loader::DirectoryLoader;
use guilddir_sync::notify::Notifier;
use guilddir_sync::orchestrator::Reconciler;
use guilddir_sync::resolver::InviteResolver;
use guilddir_sync::source::RawSource;
use guilddir_sync::store::DirectoryStore;
use guilddir_sync::validator::InviteValidator;
use guilddir_sync::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Content source serving from memory. `None` behaves as an unavailable
/// source; the text can be swapped between reconciliation cycles.
pub struct StaticSource {
    label: SourceLabel,
    text: Mutex<Option<String>>,
}

impl StaticSource {
    pub fn new(label: SourceLabel, text: Option<&str>) -> Self {
        Self {
            label,
            text: Mutex::new(text.map(str::to_string)),
        }
    }

    pub fn set(&self, text: Option<&str>) {
        *self.text.lock().unwrap() = text.map(str::to_string);
    }
}

#[async_trait]
impl RawSource for StaticSource {
    fn label(&self) -> SourceLabel {
        self.label
    }

    async fn fetch(&self) -> Result<String> {
        self.text
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::NotFound("static source empty".to_string()))
    }
}

/// Resolver answering from a fixed token -> external identifier table;
/// unknown tokens are ordinary not-found replies
pub struct TableResolver {
    table: HashMap<String, String>,
}

impl TableResolver {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(token, id)| (token.to_string(), id.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl InviteResolver for TableResolver {
    async fn resolve(&self, token: &str) -> Result<Option<String>> {
        Ok(self.table.get(token).cloned())
    }
}

/// Resolver that parks every request until released, to hold a
/// reconciliation cycle open mid-validation
pub struct GateResolver {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    id: String,
}

impl GateResolver {
    pub fn new(id: &str) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl InviteResolver for GateResolver {
    async fn resolve(&self, _token: &str) -> Result<Option<String>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Some(self.id.clone()))
    }
}

/// Notifier that records every message for assertions
#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Validation config with no pre-validation delays
pub fn no_delays() -> ValidationConfig {
    ValidationConfig {
        startup_delay_secs: 0,
        refresh_delay_secs: 0,
        request_timeout_secs: 1,
    }
}

/// Directory JSON with one "servers" category. Display name is the
/// capitalized keyword; invite token is given per entry.
pub fn directory_json(entries: &[(&str, &str, &str)]) -> String {
    let servers: Vec<String> = entries
        .iter()
        .map(|(keyword, id, token)| {
            format!(
                r#""{keyword}": {{"id": "{id}", "name": "{keyword}", "invite": "https://discord.gg/{token}"}}"#
            )
        })
        .collect();
    format!(r#"{{"servers": {{{}}}}}"#, servers.join(", "))
}

pub struct Harness {
    pub store: Arc<DirectoryStore>,
    pub reconciler: Arc<Reconciler>,
    pub notifier: Arc<CollectingNotifier>,
}

impl Harness {
    pub fn app_state(&self) -> AppState {
        AppState::new(Arc::clone(&self.store), Arc::clone(&self.reconciler))
    }
}

/// Wire a full engine from in-memory collaborators
pub fn harness(
    local: Option<Box<dyn RawSource>>,
    remote: Box<dyn RawSource>,
    resolver: Arc<dyn InviteResolver>,
) -> Harness {
    let notifier = Arc::new(CollectingNotifier::default());
    let store = Arc::new(DirectoryStore::new());
    let loader = DirectoryLoader::new(local, remote);
    let validator = InviteValidator::new(resolver, notifier.clone());
    let reconciler = Arc::new(Reconciler::new(
        loader,
        validator,
        Arc::clone(&store),
        notifier.clone(),
        &no_delays(),
    ));
    Harness {
        store,
        reconciler,
        notifier,
    }
}
