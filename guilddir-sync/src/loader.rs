//! Directory content loader and parser
//!
//! Obtains raw directory text from the local override, falling back to the
//! remote content source, and parses it into a candidate record set. The
//! fallback is deliberately narrow: only an unavailable override (missing
//! file) or an override that fails to parse triggers it. Other local errors
//! (permissions, I/O) surface to the caller rather than being masked.

use crate::source::RawSource;
use guilddir_common::{DirectoryRecord, Error, Result, SourceLabel};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// Raw server definition as it appears in the directory JSON
#[derive(Debug, Deserialize)]
struct RawServer {
    /// Authoritative external identifier
    id: String,
    /// Display name
    name: String,
    /// Invite reference; resolver token is the last path segment
    invite: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Nested directory structure: category name -> keyword -> definition
type RawDirectory = BTreeMap<String, BTreeMap<String, RawServer>>;

/// Parse raw directory text into a candidate record set.
///
/// Keywords and aliases are normalized to lowercase. A definition with no
/// `aliases` field yields an empty alias set. Any structural mismatch fails
/// with [`Error::MalformedContent`].
pub fn parse_directory(text: &str) -> Result<HashSet<DirectoryRecord>> {
    let categories: RawDirectory =
        serde_json::from_str(text).map_err(|e| Error::MalformedContent(e.to_string()))?;

    let mut records = HashSet::new();
    for servers in categories.into_values() {
        for (keyword, raw) in servers {
            records.insert(DirectoryRecord {
                keyword: keyword.to_lowercase(),
                external_id: raw.id,
                display_name: raw.name,
                invite_reference: raw.invite,
                description: raw.description,
                aliases: raw.aliases.into_iter().map(|a| a.to_lowercase()).collect(),
            });
        }
    }
    Ok(records)
}

/// Loads a candidate record set from the first available content source
pub struct DirectoryLoader {
    local: Option<Box<dyn RawSource>>,
    remote: Box<dyn RawSource>,
}

impl DirectoryLoader {
    pub fn new(local: Option<Box<dyn RawSource>>, remote: Box<dyn RawSource>) -> Self {
        Self { local, remote }
    }

    /// Load and parse the directory, reporting which source won.
    ///
    /// Fails with [`Error::SourceUnavailable`] only when the local override
    /// (if configured) and the remote source both fail.
    pub async fn load(&self) -> Result<(HashSet<DirectoryRecord>, SourceLabel)> {
        let local_failure = match &self.local {
            Some(local) => match Self::try_source(local.as_ref()).await {
                Ok(records) => {
                    info!(count = records.len(), "loaded directory from local override");
                    return Ok((records, local.label()));
                }
                Err(e @ (Error::NotFound(_) | Error::MalformedContent(_))) => {
                    warn!(error = %e, "local override unusable, falling back to remote");
                    e.to_string()
                }
                Err(e) => return Err(e),
            },
            None => "not configured".to_string(),
        };

        match Self::try_source(self.remote.as_ref()).await {
            Ok(records) => {
                info!(count = records.len(), "loaded directory from remote source");
                Ok((records, self.remote.label()))
            }
            // remote content that fetched but does not parse is a content
            // problem, not an availability problem
            Err(e @ Error::MalformedContent(_)) => Err(e),
            Err(remote_failure) => Err(Error::SourceUnavailable {
                local: local_failure,
                remote: remote_failure.to_string(),
            }),
        }
    }

    async fn try_source(source: &dyn RawSource) -> Result<HashSet<DirectoryRecord>> {
        let text = source.fetch().await?;
        parse_directory(&text)
    }
}
