//! Compliance logging for blocked queries.
//!
//! Append-only JSONL audit trail written whenever the safety filter
//! overrides a draft answer.
//!
//! Privacy stance: the raw query text is never persisted. Events carry a
//! salted one-way fingerprint and the query length; an optional truncated
//! preview is off by default and should stay off unless a privacy review
//! approves it.
//!
//! The logger is resilient: storage faults are swallowed here so a logging
//! outage can never block or alter a safety decision.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::config::ComplianceConfig;
use crate::types::QueryCategory;

/// Maximum stored preview length, ellipsis included.
pub const PREVIEW_MAX_LEN: usize = 80;

/// A minimal, privacy-preserving record for one blocked query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedQueryEvent {
    /// ISO-8601 UTC timestamp with a literal `Z` suffix.
    pub timestamp_utc: String,

    /// Classification that caused the override.
    pub category: QueryCategory,

    /// Reason codes, in derivation order.
    pub reasons: Vec<String>,

    /// System the learner had selected, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_focus: Option<String>,

    /// Salted SHA-256 of the normalized query. Supports deduplication and
    /// trend review without retaining text.
    pub query_fingerprint: String,

    /// Character length of the original (non-normalized) query.
    pub query_length: usize,

    /// Truncated, whitespace-normalized preview. Present only when
    /// explicitly enabled in configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_preview: Option<String>,
}

/// Writes privacy-preserving compliance events to a JSONL file.
pub struct ComplianceLogger {
    enabled: bool,
    store_query_preview: bool,
    hash_salt: String,
    log_path: PathBuf,
    // Serializes appends to the log target so each event lands as one
    // complete, non-interleaved line.
    write_lock: Mutex<()>,
}

impl ComplianceLogger {
    pub fn new(config: &ComplianceConfig) -> Self {
        Self {
            enabled: config.enabled,
            store_query_preview: config.store_query_preview,
            hash_salt: config.hash_salt.clone(),
            log_path: config.log_dir.join(&config.log_name),
            write_lock: Mutex::new(()),
        }
    }

    /// Record a blocked query. No-op when logging is disabled.
    ///
    /// Never fails from the caller's perspective: any storage error is
    /// logged at `warn` level and discarded.
    pub fn log_blocked_query(
        &self,
        query: &str,
        category: QueryCategory,
        reasons: &[String],
        system_focus: Option<&str>,
    ) {
        if !self.enabled {
            return;
        }

        let event = BlockedQueryEvent {
            timestamp_utc: utc_now_iso(),
            category,
            reasons: reasons.to_vec(),
            system_focus: system_focus.map(str::to_string),
            query_fingerprint: fingerprint_query(query, &self.hash_salt),
            query_length: query.chars().count(),
            query_preview: self.store_query_preview.then(|| safe_preview(query)),
        };

        if let Err(err) = self.append(&event) {
            warn!("compliance log write failed: {err}");
        }
    }

    fn append(&self, event: &BlockedQueryEvent) -> std::io::Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;

        Ok(())
    }

    /// Most recent events, newest first, for audit review.
    pub fn recent(&self, limit: usize) -> Vec<BlockedQueryEvent> {
        if !self.log_path.exists() {
            return Vec::new();
        }

        let content = match fs::read_to_string(&self.log_path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .rev()
            .take(limit)
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Path of the audit log target.
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

fn utc_now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Lowercase, trim, and collapse internal whitespace runs. Fingerprints of
/// queries that differ only in case or spacing are identical.
fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Salted SHA-256 fingerprint of the normalized query.
pub fn fingerprint_query(query: &str, salt: &str) -> String {
    let normalized = normalize_query(query);
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whitespace-normalized preview, truncated to [`PREVIEW_MAX_LEN`] with an
/// ellipsis. No PII detection is attempted; keep previews disabled unless
/// storing any user text has been approved.
fn safe_preview(query: &str) -> String {
    let preview = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if preview.chars().count() <= PREVIEW_MAX_LEN {
        return preview;
    }
    let truncated: String = preview.chars().take(PREVIEW_MAX_LEN - 3).collect();
    format!("{}...", truncated)
}
