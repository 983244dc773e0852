//! Shared types for the tutor pipeline.
//!
//! These are the only values that cross module boundaries: the closed
//! system-focus label set, the query classification, and the structured
//! response handed back to front-ends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of aircraft systems the tutor can focus on.
///
/// Front-ends map user input onto this enum at their boundary; the core
/// pipeline never sees an out-of-set label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemFocus {
    Electrical,
    Hydraulic,
}

impl SystemFocus {
    /// All valid labels, for front-end help text.
    pub const LABELS: &'static [&'static str] = &["electrical", "hydraulic"];

    /// Lowercase label used for retrieval hints and audit records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Electrical => "electrical",
            Self::Hydraulic => "hydraulic",
        }
    }

    /// Parse a user-supplied label. Returns `None` for anything outside
    /// the closed set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "electrical" => Some(Self::Electrical),
            "hydraulic" => Some(Self::Hydraulic),
            _ => None,
        }
    }
}

impl fmt::Display for SystemFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification of a learner's query intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// System architecture, behavior, or fault logic; answerable without
    /// task guidance.
    Conceptual,
    /// Seeks maintenance steps, diagnostics, or real-world action guidance.
    Procedural,
    /// Matches neither signal set; treated conservatively as non-passable.
    Ambiguous,
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Conceptual => "conceptual",
            Self::Procedural => "procedural",
            Self::Ambiguous => "ambiguous",
        };
        write!(f, "{}", s)
    }
}

/// Structured response from the tutor orchestrator.
///
/// Fields are explicit so calling layers can surface whether a query was
/// blocked for safety reasons alongside the answer text.
#[derive(Debug, Clone, Serialize)]
pub struct TutorResponse {
    /// Final answer text (disclaimer-wrapped draft, or redirection message).
    pub answer: String,

    /// System the learner selected.
    pub system_focus: SystemFocus,

    /// How the safety filter classified the query.
    pub category: QueryCategory,

    /// True if the draft answer was overridden.
    pub blocked: bool,
}
