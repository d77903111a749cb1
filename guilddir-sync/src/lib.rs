//! guilddir-sync library - Directory Synchronization & Validation Engine
//!
//! Keeps a directory of named external communities consistent with a remote
//! source of truth: loads a candidate snapshot with source fallback, reports
//! identifier collisions, validates every invite reference concurrently
//! against the invite resolution service, and atomically publishes the
//! confirmed snapshot for lookup.

use axum::Router;
use std::sync::Arc;

pub mod api;
pub mod commands;
pub mod detector;
pub mod loader;
pub mod notify;
pub mod orchestrator;
pub mod resolver;
pub mod source;
pub mod store;
pub mod validator;

use commands::{CommandContext, CommandRouter};
use orchestrator::Reconciler;
use store::DirectoryStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Published-snapshot store; the only thing lookups touch
    pub store: Arc<DirectoryStore>,
    /// Reconciliation orchestrator; one cycle at a time
    pub reconciler: Arc<Reconciler>,
    /// Text command table
    pub commands: Arc<CommandRouter>,
}

impl AppState {
    pub fn new(store: Arc<DirectoryStore>, reconciler: Arc<Reconciler>) -> Self {
        Self {
            store,
            reconciler,
            commands: Arc::new(CommandRouter::new()),
        }
    }

    /// Collaborators handed to command handlers
    pub fn command_context(&self) -> CommandContext {
        CommandContext {
            store: Arc::clone(&self.store),
            reconciler: Arc::clone(&self.reconciler),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    api::routes().with_state(state)
}
