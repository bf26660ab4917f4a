// src/snapshot.rs
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tokio::fs;

use crate::fetch::Fetcher;
use crate::sources::Config;

/// Outcome of polling one source.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Parsed body, or the single extracted element in latest-only mode.
    Ok(Value),
    /// Upstream 404: the endpoint is intentionally absent, not broken.
    Skipped,
    /// Non-success status or transport/parse failure, kept as data.
    Error(String),
}

const SKIPPED_MARKER: &str = "not found";

// On disk, `Ok` is the raw value while the failure variants keep the
// one-key object shape the persisted file has always used
// ({"error": msg} / {"skipped": "not found"}), so old files reload cleanly.
impl Serialize for FetchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FetchResult::Ok(v) => v.serialize(serializer),
            FetchResult::Skipped => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("skipped", SKIPPED_MARKER)?;
                m.end()
            }
            FetchResult::Error(msg) => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("error", msg)?;
                m.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FetchResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(FetchResult::from_value(Value::deserialize(deserializer)?))
    }
}

impl FetchResult {
    fn from_value(v: Value) -> Self {
        if let Value::Object(map) = &v {
            if map.len() == 1 {
                if let Some(Value::String(msg)) = map.get("error") {
                    return FetchResult::Error(msg.clone());
                }
                if map.get("skipped") == Some(&Value::String(SKIPPED_MARKER.into())) {
                    return FetchResult::Skipped;
                }
            }
        }
        FetchResult::Ok(v)
    }
}

/// The merged state of one run: group name → source key → result, stamped
/// with the fetch time. Built fresh every run and never mutated afterwards.
/// `BTreeMap` keeps the serialized key order stable for reproducible diffs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub last_updated: String,
    #[serde(flatten)]
    pub groups: BTreeMap<String, BTreeMap<String, FetchResult>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Updated,
    Unchanged,
}

/// Read the previously persisted snapshot. A missing or unparseable file
/// yields an empty snapshot; corruption is recovered from, never fatal.
pub async fn load_previous(path: &Path) -> Snapshot {
    match fs::read_to_string(path).await {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "previous snapshot unreadable, treating as empty");
            Snapshot::default()
        }),
        Err(_) => Snapshot::default(),
    }
}

/// Poll every configured source in declaration order and assemble the new
/// snapshot. Per-source failures land inside the snapshot as data.
pub async fn assemble(config: &Config, fetcher: &Fetcher) -> Snapshot {
    let mut groups = BTreeMap::new();
    for group in &config.groups {
        let mut results = BTreeMap::new();
        for source in &group.sources {
            results.insert(source.key.clone(), fetcher.fetch(source).await);
        }
        groups.insert(group.name.clone(), results);
    }
    Snapshot {
        last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        groups,
    }
}

/// One full poll cycle: load the previous snapshot, fetch everything,
/// and overwrite the file only when the merged content actually changed.
/// `last_updated` is excluded from the comparison; otherwise every run
/// would look changed and the guarantee would be vacuous.
///
/// The comparison runs on the serialized forms, not the enums. A reloaded
/// file can only distinguish a 200 body that happened to be a one-key
/// `{"error": ...}` object from a recorded failure by guessing, so the
/// freshly fetched `Ok` and the reloaded `Error` would never compare equal
/// as variants and the file would be rewritten on every run.
pub async fn run(config: &Config, fetcher: &Fetcher) -> Result<RunOutcome> {
    let previous = load_previous(&config.output_path).await;
    let snapshot = assemble(config, fetcher).await;

    let previous_groups =
        serde_json::to_value(&previous.groups).context("serialize previous snapshot")?;
    let new_groups = serde_json::to_value(&snapshot.groups).context("serialize snapshot")?;
    if previous_groups == new_groups {
        tracing::info!("war status unchanged, skipping write");
        return Ok(RunOutcome::Unchanged);
    }

    let body = serde_json::to_vec_pretty(&snapshot).context("serialize snapshot")?;
    fs::write(&config.output_path, body)
        .await
        .with_context(|| format!("write snapshot to {}", config.output_path.display()))?;
    tracing::info!(path = %config.output_path.display(), "war status updated");
    Ok(RunOutcome::Updated)
}
