//! Directory data model
//!
//! Value types shared by the loader, detector, validator, and store:
//! - [`DirectoryRecord`] - one server entry with its identifying keys
//! - [`Snapshot`] - an immutable, fully-validated directory state
//! - [`SourceLabel`] - provenance of a loaded snapshot
//! - [`ValidationOutcome`] - per-record result of invite validation
//!
//! Record identity is the full value tuple; uniqueness of identifying keys
//! is enforced separately by the duplicate detector, not by the containers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// One server/community entry in the directory.
///
/// `keyword` and `aliases` are normalized to lowercase by the parser.
/// `display_name` keeps its original casing; lookups against it are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Canonical lowercase identifier
    pub keyword: String,
    /// Authoritative identifier expected from the invite resolution service
    pub external_id: String,
    /// Human-readable name
    pub display_name: String,
    /// Opaque invite URL; the resolver token is its last path segment
    pub invite_reference: String,
    /// Free-form description, may be empty
    pub description: String,
    /// Lowercase alternative lookup keys, may be empty
    pub aliases: BTreeSet<String>,
}

impl DirectoryRecord {
    /// Token portion of the invite reference: the path segment following
    /// the last `/`. A reference with no `/` is already a bare token.
    pub fn invite_token(&self) -> &str {
        match self.invite_reference.rsplit_once('/') {
            Some((_, token)) => token,
            None => &self.invite_reference,
        }
    }

    /// Every string a lookup may match this record against:
    /// keyword, display name, and each alias, all lowercased.
    pub fn identifying_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(2 + self.aliases.len());
        keys.push(self.keyword.to_lowercase());
        keys.push(self.display_name.to_lowercase());
        keys.extend(self.aliases.iter().map(|a| a.to_lowercase()));
        keys
    }
}

/// Which content source a snapshot was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLabel {
    /// Operator-supplied override read from local disk
    LocalOverride,
    /// Remote content source (repository file)
    Remote,
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLabel::LocalOverride => write!(f, "local override"),
            SourceLabel::Remote => write!(f, "remote"),
        }
    }
}

/// Per-record result of invite validation.
///
/// Only `Confirmed` records survive into the published snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Invite resolved and the external identifier matches the record
    Confirmed,
    /// The resolution service has no community for this invite token
    NotResolvable,
    /// Invite resolved, but to a different external identifier
    IdentifierMismatch { expected: String, actual: String },
}

/// An immutable, fully-validated directory state published for lookup.
///
/// Created by the reconciliation orchestrator after validation, published
/// into the directory store by atomic replacement, and superseded (never
/// mutated) by the next successful cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: HashSet<DirectoryRecord>,
    source: SourceLabel,
}

impl Snapshot {
    pub fn new(records: HashSet<DirectoryRecord>, source: SourceLabel) -> Self {
        Self { records, source }
    }

    pub fn source(&self) -> SourceLabel {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DirectoryRecord> {
        self.records.iter()
    }

    /// Case-insensitive lookup, checked in order: exact keyword match,
    /// exact display-name match, membership in any record's aliases.
    /// First match wins. Iteration order within a colliding (malformed)
    /// snapshot is unspecified; lookup still returns some member of the
    /// colliding set, never an error.
    pub fn lookup(&self, name: &str) -> Option<&DirectoryRecord> {
        let needle = name.to_lowercase();
        self.records
            .iter()
            .find(|r| r.keyword == needle)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|r| r.display_name.to_lowercase() == needle)
            })
            .or_else(|| self.records.iter().find(|r| r.aliases.contains(&needle)))
    }
}
