//! Aerotutor Common - Core library for the training-only aircraft systems tutor
//!
//! Mediates natural-language questions about aircraft systems so answers
//! never drift into operational maintenance procedures: retrieval and
//! templated synthesis, deterministic intent classification, an override
//! policy, and a privacy-preserving compliance log.

pub mod compliance;
pub mod config;
pub mod rag;
pub mod safety;
pub mod tutor;
pub mod types;

pub use compliance::{BlockedQueryEvent, ComplianceLogger};
pub use config::{ComplianceConfig, ConfigError, RagConfig, SafetyConfig, TutorConfig};
pub use rag::{RagEngine, RetrievedSnippet};
pub use safety::{SafetyDecision, SafetyFilter};
pub use tutor::AiTutor;
pub use types::{QueryCategory, SystemFocus, TutorResponse};
