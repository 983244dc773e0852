//! Tutor orchestration.
//!
//! Connects the retrieval engine and the safety filter into one call.
//! Every draft is routed through the safety filter unconditionally; there
//! is no branch that can return retriever output directly.

use tracing::debug;

use crate::compliance::ComplianceLogger;
use crate::config::TutorConfig;
use crate::rag::RagEngine;
use crate::safety::SafetyFilter;
use crate::types::{SystemFocus, TutorResponse};

/// Orchestrates conceptual Q&A for aircraft systems.
///
/// The tutor never returns maintenance steps; answers emphasize system
/// architecture, flows, and fault logic, and all output passes through the
/// safety filter.
pub struct AiTutor {
    rag: RagEngine,
    safety: SafetyFilter,
}

impl AiTutor {
    pub fn new(config: &TutorConfig) -> Self {
        let compliance = ComplianceLogger::new(&config.compliance);
        Self {
            rag: RagEngine::new(&config.rag),
            safety: SafetyFilter::new(&config.safety, compliance),
        }
    }

    /// Answer a learner's question in a safety-aware way.
    pub fn answer_conceptual_question(
        &mut self,
        question: &str,
        system_focus: SystemFocus,
    ) -> TutorResponse {
        // Draft first, then the filter decides what the learner sees.
        let draft = self.rag.answer_question(question, system_focus.label());
        let decision = self
            .safety
            .apply(question, &draft, Some(system_focus.label()));

        debug!(
            category = %decision.category,
            blocked = !decision.allow,
            "tutor decision"
        );

        TutorResponse {
            answer: decision.safe_answer,
            system_focus,
            category: decision.category,
            blocked: !decision.allow,
        }
    }

    /// Snippets currently indexed, for front-end status reporting.
    pub fn indexed_snippets(&mut self) -> usize {
        self.rag.indexed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryCategory;
    use std::path::PathBuf;

    fn tutor() -> AiTutor {
        let mut config = TutorConfig::default();
        config.rag.data_dir = PathBuf::from("/nonexistent/aerotutor-corpus");
        config.compliance.enabled = false;
        AiTutor::new(&config)
    }

    #[test]
    fn test_blocked_response_mirrors_decision() {
        let mut tutor = tutor();
        let response =
            tutor.answer_conceptual_question("how do i remove the pump", SystemFocus::Hydraulic);
        assert!(response.blocked);
        assert_eq!(response.category, QueryCategory::Procedural);
        assert_eq!(response.system_focus, SystemFocus::Hydraulic);
        assert!(response.answer.contains("training-only"));
    }

    #[test]
    fn test_conceptual_response_is_draft_plus_disclaimer() {
        let mut tutor = tutor();
        let response = tutor.answer_conceptual_question(
            "how does the generator feed the bus",
            SystemFocus::Electrical,
        );
        assert!(!response.blocked);
        assert_eq!(response.category, QueryCategory::Conceptual);
        assert!(response.answer.starts_with("Electrical"));
        assert!(response.answer.contains("\n\n---\n"));
    }
}
