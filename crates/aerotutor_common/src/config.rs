//! Aerotutor configuration.
//!
//! All tunable behavior lives here so that safety parameters stay explicit
//! and reviewable. Configuration is an explicit value passed into each
//! component at construction; there is no ambient/static lookup.
//!
//! Config file: ./aerotutor.toml (or `--config`/`AEROTUTOR_CONFIG`),
//! with `AEROTUTOR_*` environment overrides on top.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Retrieval layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Root of the training corpus directory tree. A missing directory is
    /// not an error; the engine answers from an empty index.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Safety filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Task verbs treated as procedural even when phrased as a question.
    #[serde(default = "default_blocked_verbs")]
    pub blocked_verbs: Vec<String>,

    /// Reserved for stricter classification. Read and exposed, but the
    /// rule cascade does not consult it; its intended effect is
    /// unspecified upstream.
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            blocked_verbs: default_blocked_verbs(),
            strict_mode: default_strict_mode(),
        }
    }
}

fn default_blocked_verbs() -> Vec<String> {
    [
        "remove",
        "install",
        "torque",
        "replace",
        "adjust",
        "troubleshoot",
        "repair",
        "fix",
        "service",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_strict_mode() -> bool {
    true
}

/// Compliance logging configuration.
///
/// Logging is designed for review and auditability without collecting
/// personal data: by default only a salted one-way fingerprint of the
/// query is stored, never the raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Master switch. When false, no audit events are written at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for audit logs; created on first write if needed.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Audit log filename (JSONL, one event per line).
    #[serde(default = "default_log_name")]
    pub log_name: String,

    /// Salt mixed into query fingerprints. Set per deployment to make
    /// hash brute-forcing harder.
    #[serde(default)]
    pub hash_salt: String,

    /// Store a truncated, whitespace-normalized preview of blocked
    /// queries. Keep disabled unless a privacy review approves it.
    #[serde(default)]
    pub store_query_preview: bool,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: default_log_dir(),
            log_name: default_log_name(),
            hash_salt: String::new(),
            store_query_preview: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_name() -> String {
    "blocked_queries.jsonl".to_string()
}

/// Top-level tutor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub compliance: ComplianceConfig,
}

impl TutorConfig {
    /// Load configuration.
    ///
    /// Priority:
    /// 1. Explicit path (e.g. from `--config`)
    /// 2. `AEROTUTOR_CONFIG` environment variable
    /// 3. `./aerotutor.toml` if present
    /// 4. Defaults
    ///
    /// `AEROTUTOR_*` environment overrides are applied on the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::resolve_path(path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a specific TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("AEROTUTOR_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from("aerotutor.toml");
        local.exists().then_some(local)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("AEROTUTOR_DATA_DIR") {
            self.rag.data_dir = PathBuf::from(dir);
        }
        if let Ok(v) = std::env::var("AEROTUTOR_COMPLIANCE_LOG") {
            self.compliance.enabled = v != "0";
        }
        if let Ok(dir) = std::env::var("AEROTUTOR_LOG_DIR") {
            self.compliance.log_dir = PathBuf::from(dir);
        }
        if let Ok(salt) = std::env::var("AEROTUTOR_LOG_SALT") {
            self.compliance.hash_salt = salt;
        }
        if let Ok(v) = std::env::var("AEROTUTOR_STORE_QUERY_PREVIEW") {
            self.compliance.store_query_preview = v == "1";
        }
        if let Ok(v) = std::env::var("AEROTUTOR_STRICT_MODE") {
            self.safety.strict_mode = v != "0";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TutorConfig::default();
        assert_eq!(config.rag.data_dir, PathBuf::from("data"));
        assert!(config.compliance.enabled);
        assert!(!config.compliance.store_query_preview);
        assert_eq!(config.compliance.log_name, "blocked_queries.jsonl");
        assert!(config.safety.blocked_verbs.contains(&"torque".to_string()));
        assert!(config.safety.strict_mode);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [compliance]
            store_query_preview = true
            hash_salt = "pepper"
        "#;
        let config: TutorConfig = toml::from_str(toml).unwrap();
        assert!(config.compliance.store_query_preview);
        assert_eq!(config.compliance.hash_salt, "pepper");
        // Untouched sections keep their defaults.
        assert!(config.compliance.enabled);
        assert_eq!(config.rag.data_dir, PathBuf::from("data"));
        assert!(!config.safety.blocked_verbs.is_empty());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut original = TutorConfig::default();
        original.compliance.enabled = false;
        original.safety.blocked_verbs = vec!["remove".to_string()];

        let toml = toml::to_string(&original).unwrap();
        let parsed: TutorConfig = toml::from_str(&toml).unwrap();

        assert!(!parsed.compliance.enabled);
        assert_eq!(parsed.safety.blocked_verbs, vec!["remove".to_string()]);
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        let err = TutorConfig::from_file(Path::new("/nonexistent/aerotutor.toml"));
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_from_file_bad_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aerotutor.toml");
        fs::write(&path, "not toml [").unwrap();
        let err = TutorConfig::from_file(&path);
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }
}
