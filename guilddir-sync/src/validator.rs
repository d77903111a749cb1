//! Concurrent invite validation
//!
//! Fans out one resolution request per candidate record, waits for every
//! request to complete or fail, then aggregates the per-record outcomes into
//! the confirmed subset. No early return, no partial results, and no shared
//! collection mutated from multiple tasks: each task returns its own
//! outcome and aggregation happens after the join point.
//!
//! Resolution failures (timeouts, service errors) are absorbed as
//! `NotResolvable` rather than aborting the batch.

use crate::notify::Notifier;
use crate::resolver::InviteResolver;
use futures::future::join_all;
use guilddir_common::{DirectoryRecord, ValidationOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct InviteValidator {
    resolver: Arc<dyn InviteResolver>,
    notifier: Arc<dyn Notifier>,
}

impl InviteValidator {
    pub fn new(resolver: Arc<dyn InviteResolver>, notifier: Arc<dyn Notifier>) -> Self {
        Self { resolver, notifier }
    }

    /// Validate every candidate against the invite resolution service.
    ///
    /// Returns the confirmed subset and the number of records removed.
    /// A diagnostic naming each removed record is sent to the notification
    /// channel.
    pub async fn validate(
        &self,
        candidates: HashSet<DirectoryRecord>,
    ) -> (HashSet<DirectoryRecord>, usize) {
        let checks = candidates.into_iter().map(|record| {
            let resolver = Arc::clone(&self.resolver);
            async move {
                let outcome = Self::check(resolver.as_ref(), &record).await;
                (record, outcome)
            }
        });

        // fan-out / fan-in barrier: every outstanding request completes
        // before any result is acted on
        let results = join_all(checks).await;

        let mut confirmed = HashSet::new();
        let mut removed = 0;
        for (record, outcome) in results {
            match outcome {
                ValidationOutcome::Confirmed => {
                    debug!(keyword = %record.keyword, "invite confirmed");
                    confirmed.insert(record);
                }
                ValidationOutcome::NotResolvable => {
                    removed += 1;
                    self.notifier
                        .notify(&format!(
                            "Removed server '{}': invite '{}' does not resolve",
                            record.keyword, record.invite_reference
                        ))
                        .await;
                }
                ValidationOutcome::IdentifierMismatch { expected, actual } => {
                    removed += 1;
                    self.notifier
                        .notify(&format!(
                            "Removed server '{}': invite resolves to id {} but directory expects {}",
                            record.keyword, actual, expected
                        ))
                        .await;
                }
            }
        }
        (confirmed, removed)
    }

    async fn check(resolver: &dyn InviteResolver, record: &DirectoryRecord) -> ValidationOutcome {
        match resolver.resolve(record.invite_token()).await {
            Ok(Some(actual)) if actual == record.external_id => ValidationOutcome::Confirmed,
            Ok(Some(actual)) => ValidationOutcome::IdentifierMismatch {
                expected: record.external_id.clone(),
                actual,
            },
            Ok(None) => ValidationOutcome::NotResolvable,
            Err(e) => {
                warn!(
                    keyword = %record.keyword,
                    error = %e,
                    "invite resolution failed, treating as not resolvable"
                );
                ValidationOutcome::NotResolvable
            }
        }
    }
}
