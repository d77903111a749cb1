//! guilddir-sync - Guild Directory Synchronization Service
//!
//! Loads the community directory from an operator override or the remote
//! repository, validates every invite against the invite resolution
//! service, and serves validated lookups over a small admin API.

use anyhow::Result;
use clap::Parser;
use guilddir_common::config::{self, ServiceConfig};
use guilddir_sync::loader::DirectoryLoader;
use guilddir_sync::notify::{LogNotifier, Notifier, WebhookNotifier};
use guilddir_sync::orchestrator::{Reconciler, RefreshKind};
use guilddir_sync::resolver::DiscordInviteResolver;
use guilddir_sync::source::{LocalOverrideSource, RawSource, RemoteContentSource};
use guilddir_sync::store::DirectoryStore;
use guilddir_sync::validator::InviteValidator;
use guilddir_sync::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "guilddir-sync", about = "Guild directory synchronization service")]
struct Args {
    /// Path to the TOML config file (falls back to $GUILDDIR_CONFIG, then
    /// ./guilddir.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Guild Directory Sync (guilddir-sync) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config_path = config::resolve_config_path(args.config.as_deref());
    let config = config::load_config(&config_path)?;
    info!(path = %config_path.display(), "configuration loaded");

    let state = build_state(&config);

    // Startup reconciliation runs in the background so the admin API (and
    // lookups against any earlier snapshot) come up immediately.
    let startup = Arc::clone(&state.reconciler);
    tokio::spawn(async move {
        match startup.reconcile(RefreshKind::Startup).await {
            Ok(summary) => info!(
                source = %summary.source,
                kept = summary.kept,
                removed = summary.removed,
                "startup reconciliation complete"
            ),
            Err(e) => error!(error = %e, "startup reconciliation failed"),
        }
    });

    let addr = format!("{}:{}", config.listen.host, config.listen.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("guilddir-sync listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

fn build_state(config: &ServiceConfig) -> AppState {
    let timeout = Duration::from_secs(config.validation.request_timeout_secs);

    let local: Option<Box<dyn RawSource>> = config
        .content
        .local_override
        .as_ref()
        .map(|path| Box::new(LocalOverrideSource::new(path.clone())) as Box<dyn RawSource>);
    let remote = Box::new(RemoteContentSource::new(&config.content.remote, timeout));
    let loader = DirectoryLoader::new(local, remote);

    let notifier: Arc<dyn Notifier> = match &config.notify.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), timeout)),
        None => Arc::new(LogNotifier),
    };

    let resolver = Arc::new(DiscordInviteResolver::new(timeout));
    let validator = InviteValidator::new(resolver, Arc::clone(&notifier));

    let store = Arc::new(DirectoryStore::new());
    let reconciler = Arc::new(Reconciler::new(
        loader,
        validator,
        Arc::clone(&store),
        notifier,
        &config.validation,
    ));

    AppState::new(store, reconciler)
}
