//! Reconciliation orchestration
//!
//! Sequences one full cycle: load -> duplicate detection (report-only) ->
//! optional delay -> invite validation -> atomic publish. Load and parse
//! failures abort the cycle and surface to the caller; the store keeps its
//! last good snapshot. No retries at this level.
//!
//! Cycles are serialized by rejection: a refresh arriving while another
//! cycle is in flight fails fast with `ReconciliationInProgress` rather
//! than queueing.

use crate::detector;
use crate::loader::DirectoryLoader;
use crate::notify::Notifier;
use crate::store::DirectoryStore;
use crate::validator::InviteValidator;
use guilddir_common::config::ValidationConfig;
use guilddir_common::{Error, Result, Snapshot, SourceLabel};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What triggered a reconciliation cycle. Startup cycles wait longer before
/// validating, to avoid racing the external service's own start-up
/// throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Startup,
    Manual,
}

/// Operator-facing summary of one successful cycle
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub source: SourceLabel,
    pub kept: usize,
    pub removed: usize,
}

pub struct Reconciler {
    loader: DirectoryLoader,
    validator: InviteValidator,
    store: Arc<DirectoryStore>,
    notifier: Arc<dyn Notifier>,
    startup_delay: Duration,
    refresh_delay: Duration,
    in_flight: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        loader: DirectoryLoader,
        validator: InviteValidator,
        store: Arc<DirectoryStore>,
        notifier: Arc<dyn Notifier>,
        validation: &ValidationConfig,
    ) -> Self {
        Self {
            loader,
            validator,
            store,
            notifier,
            startup_delay: Duration::from_secs(validation.startup_delay_secs),
            refresh_delay: Duration::from_secs(validation.refresh_delay_secs),
            in_flight: Mutex::new(()),
        }
    }

    /// Run one reconciliation cycle and publish the validated snapshot.
    ///
    /// Fails with [`Error::ReconciliationInProgress`] if another cycle is
    /// already running; the caller may retry once that cycle finishes.
    pub async fn reconcile(&self, kind: RefreshKind) -> Result<ReconcileSummary> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| Error::ReconciliationInProgress)?;

        info!(?kind, "reconciliation cycle started");
        let (candidates, source) = self.loader.load().await?;

        // report-only: duplicate findings warn but never block publication
        let reports = detector::detect(&candidates);
        for report in &reports {
            warn!(key = %report.key, "duplicate identifying key in candidate set");
            self.notifier.notify(&report.to_string()).await;
        }

        let delay = match kind {
            RefreshKind::Startup => self.startup_delay,
            RefreshKind::Manual => self.refresh_delay,
        };
        if !delay.is_zero() {
            // suspends only this cycle; lookups against the published
            // snapshot are unaffected
            tokio::time::sleep(delay).await;
        }

        let (confirmed, removed) = self.validator.validate(candidates).await;
        let kept = confirmed.len();

        self.store.publish(Snapshot::new(confirmed, source));
        info!(source = %source, kept, removed, "reconciliation cycle published");
        Ok(ReconcileSummary {
            source,
            kept,
            removed,
        })
    }
}
