//! End-to-end reconciliation cycle tests with in-memory collaborators

mod helpers;

use guilddir_common::{Error, SourceLabel};
use guilddir_sync::orchestrator::RefreshKind;
use guilddir_sync::source::RawSource;
use helpers::{directory_json, harness, GateResolver, StaticSource, TableResolver};
use std::sync::Arc;

fn remote(text: Option<&str>) -> Box<StaticSource> {
    Box::new(StaticSource::new(SourceLabel::Remote, text))
}

fn local(text: Option<&str>) -> Box<dyn RawSource> {
    Box::new(StaticSource::new(SourceLabel::LocalOverride, text))
}

#[tokio::test]
async fn confirmed_record_is_published() {
    let json = directory_json(&[("abc", "123", "xyz")]);
    let h = harness(
        None,
        remote(Some(&json)),
        Arc::new(TableResolver::new(&[("xyz", "123")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.source, SourceLabel::Remote);
    assert_eq!(summary.kept, 1);
    assert_eq!(summary.removed, 0);

    let record = h.store.lookup("abc").unwrap();
    assert_eq!(record.external_id, "123");
}

#[tokio::test]
async fn identifier_mismatch_drops_exactly_that_record() {
    let json = directory_json(&[("abc", "123", "xyz"), ("ok", "7", "tok")]);
    let h = harness(
        None,
        remote(Some(&json)),
        Arc::new(TableResolver::new(&[("xyz", "999"), ("tok", "7")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.kept, 1);
    assert!(h.store.lookup("abc").is_none());
    assert!(h.store.lookup("ok").is_some());

    // diagnostic names both identifiers
    let messages = h.notifier.messages();
    let diagnostic = messages.iter().find(|m| m.contains("'abc'")).unwrap();
    assert!(diagnostic.contains("123"));
    assert!(diagnostic.contains("999"));
}

#[tokio::test]
async fn all_unresolvable_invites_publish_an_empty_snapshot() {
    let json = directory_json(&[("a", "1", "ta"), ("b", "2", "tb"), ("c", "3", "tc")]);
    let h = harness(None, remote(Some(&json)), Arc::new(TableResolver::new(&[])));

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.removed, 3);
    assert_eq!(summary.kept, 0);
    assert!(h.store.snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn local_override_wins_when_present() {
    let local_json = directory_json(&[("fromlocal", "1", "t1")]);
    let remote_json = directory_json(&[("fromremote", "2", "t2")]);
    let h = harness(
        Some(local(Some(&local_json))),
        remote(Some(&remote_json)),
        Arc::new(TableResolver::new(&[("t1", "1"), ("t2", "2")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.source, SourceLabel::LocalOverride);
    assert!(h.store.lookup("fromlocal").is_some());
    assert!(h.store.lookup("fromremote").is_none());
}

#[tokio::test]
async fn missing_local_override_falls_back_to_remote() {
    let remote_json = directory_json(&[("fromremote", "2", "t2")]);
    let h = harness(
        Some(local(None)),
        remote(Some(&remote_json)),
        Arc::new(TableResolver::new(&[("t2", "2")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.source, SourceLabel::Remote);
    assert!(h.store.lookup("fromremote").is_some());
}

#[tokio::test]
async fn malformed_local_override_falls_back_to_remote() {
    let remote_json = directory_json(&[("fromremote", "2", "t2")]);
    let h = harness(
        Some(local(Some("not json at all"))),
        remote(Some(&remote_json)),
        Arc::new(TableResolver::new(&[("t2", "2")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert_eq!(summary.source, SourceLabel::Remote);
}

#[tokio::test]
async fn malformed_remote_content_aborts_the_cycle() {
    let h = harness(
        None,
        remote(Some("garbage")),
        Arc::new(TableResolver::new(&[])),
    );

    let err = h
        .reconciler
        .reconcile(RefreshKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedContent(_)));
    assert!(h.store.snapshot().is_none());
}

#[tokio::test]
async fn failed_cycle_retains_the_previous_snapshot() {
    let json = directory_json(&[("abc", "123", "xyz")]);
    // keep a handle so the source can be broken after the first cycle
    let remote_handle = Arc::new(StaticSource::new(SourceLabel::Remote, Some(&json)));
    struct Shared(Arc<StaticSource>);
    #[async_trait::async_trait]
    impl RawSource for Shared {
        fn label(&self) -> SourceLabel {
            self.0.label()
        }
        async fn fetch(&self) -> guilddir_common::Result<String> {
            self.0.fetch().await
        }
    }

    let h = harness(
        None,
        Box::new(Shared(Arc::clone(&remote_handle))),
        Arc::new(TableResolver::new(&[("xyz", "123")])),
    );

    h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    assert!(h.store.lookup("abc").is_some());

    remote_handle.set(None);
    let err = h
        .reconciler
        .reconcile(RefreshKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));

    // prior snapshot still answers lookups
    assert!(h.store.lookup("abc").is_some());
    assert_eq!(h.store.snapshot().unwrap().source(), SourceLabel::Remote);
}

#[tokio::test]
async fn duplicate_findings_reach_the_notification_channel() {
    // "shared" is one record's keyword and another's alias
    let json = r#"{"servers": {
        "shared": {"id": "1", "name": "First", "invite": "https://discord.gg/t1"},
        "other": {"id": "2", "name": "Second", "invite": "https://discord.gg/t2",
                  "aliases": ["shared"]}
    }}"#;
    let h = harness(
        None,
        remote(Some(json)),
        Arc::new(TableResolver::new(&[("t1", "1"), ("t2", "2")])),
    );

    let summary = h.reconciler.reconcile(RefreshKind::Manual).await.unwrap();
    // detection warns, it never removes
    assert_eq!(summary.kept, 2);
    assert_eq!(summary.removed, 0);

    let messages = h.notifier.messages();
    assert!(messages
        .iter()
        .any(|m| m.contains("duplicate identifying key 'shared'")));
}

#[tokio::test]
async fn concurrent_refresh_is_rejected_not_interleaved() {
    let json = directory_json(&[("abc", "123", "xyz")]);
    let resolver = GateResolver::new("123");
    let entered = Arc::clone(&resolver.entered);
    let release = Arc::clone(&resolver.release);

    let h = harness(None, remote(Some(&json)), Arc::new(resolver));

    let first = {
        let reconciler = Arc::clone(&h.reconciler);
        tokio::spawn(async move { reconciler.reconcile(RefreshKind::Manual).await })
    };

    // wait until the first cycle is parked inside validation
    entered.notified().await;

    let err = h
        .reconciler
        .reconcile(RefreshKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReconciliationInProgress));

    release.notify_one();
    let summary = first.await.unwrap().unwrap();
    assert_eq!(summary.kept, 1);
    assert!(h.store.lookup("abc").is_some());
}
