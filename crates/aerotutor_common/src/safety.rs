//! Safety and intent filtering.
//!
//! The sole gate between draft content and the learner. Enforces the core
//! constraints of the tutor:
//! - Educational and training use only.
//! - No step-by-step maintenance instructions.
//! - No real aircraft diagnostics.
//! - Redirect procedural language to approved manuals and instructors.
//!
//! Classification is a deterministic rule cascade held as a literal ordered
//! list of typed rules, evaluated top to bottom with first match winning.
//! Procedural signals are checked before conceptual cues so task intent
//! dressed up as a question ("how does one remove the pump") cannot leak
//! through. Anything matching neither signal set defaults to ambiguous,
//! which does not pass.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use tracing::info;

use crate::compliance::ComplianceLogger;
use crate::config::SafetyConfig;
use crate::types::QueryCategory;

/// Task-seeking phrasing cues. Any match classifies as procedural.
const PROCEDURAL_PATTERNS: &[&str] = &[
    r"\bhow\s+to\b",
    r"\bhow\s+do\s+i\b",
    r"\bwalk\s+me\s+through\b",
    r"\bsteps?\b",
    r"\bprocedure\b",
    r"\bchecklist\b",
    r"\bwhat\s+should\s+i\s+do\b",
    r"\btroubleshoot(ing)?\b",
    r"\bdiagnos(e|is|tic|tics)\b",
    r"\brepair\b",
    r"\bfix\b",
];

/// System-understanding language. Checked only after procedural rules.
const CONCEPTUAL_CUES: &[&str] = &[
    "how does",
    "explain",
    "overview",
    "conceptual",
    "why does",
    "what happens when",
    "what happens if",
    "cause effect",
    "fault logic",
    "system architecture",
    "flow of",
    "role of",
];

static PROCEDURAL_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(PROCEDURAL_PATTERNS).expect("static procedural patterns must compile")
});

// Reason-code detectors, independent of the classification cascade.
static HOW_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bhow\s+to\b|\bhow\s+do\s+i\b").expect("static pattern"));
static STEPWISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsteps?\b|\bprocedure\b|\bchecklist\b").expect("static pattern"));
static DIAGNOSTIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\btroubleshoot(ing)?\b|\bdiagnos(e|is|tic|tics)\b").expect("static pattern")
});

/// Result of applying the safety filter to a query and draft answer.
///
/// Invariant: `allow` is true iff `category` is conceptual. Contains no
/// personal identifiers.
#[derive(Debug, Clone)]
pub struct SafetyDecision {
    /// Whether the draft may be returned (disclaimer-wrapped).
    pub allow: bool,
    /// Classified intent of the query.
    pub category: QueryCategory,
    /// Final response text after override or disclaimer wrapping.
    pub safe_answer: String,
}

/// One step of the classification cascade.
///
/// Keeping the cascade as data makes the precedence auditable and testable
/// independent of surrounding control flow.
enum IntentRule {
    /// Regex cue set.
    PatternSet {
        category: QueryCategory,
        patterns: &'static RegexSet,
    },
    /// Configured verb substrings.
    VerbSet {
        category: QueryCategory,
        verbs: Vec<String>,
    },
    /// Plain substring cues.
    CueSet {
        category: QueryCategory,
        cues: &'static [&'static str],
    },
}

impl IntentRule {
    fn matches(&self, text: &str) -> Option<QueryCategory> {
        match self {
            Self::PatternSet { category, patterns } => {
                patterns.is_match(text).then_some(*category)
            }
            Self::VerbSet { category, verbs } => verbs
                .iter()
                .any(|verb| text.contains(verb.as_str()))
                .then_some(*category),
            Self::CueSet { category, cues } => {
                cues.iter().any(|cue| text.contains(cue)).then_some(*category)
            }
        }
    }
}

/// Conservative intent filter for aviation training use.
///
/// When in doubt about whether a question is procedural, it is treated as
/// such and redirected toward conceptual learning and official
/// documentation.
pub struct SafetyFilter {
    rules: Vec<IntentRule>,
    blocked_verbs: Vec<String>,
    compliance: ComplianceLogger,
}

impl SafetyFilter {
    pub fn new(config: &SafetyConfig, compliance: ComplianceLogger) -> Self {
        // config.strict_mode is reserved; the cascade does not consult it.
        let rules = vec![
            IntentRule::PatternSet {
                category: QueryCategory::Procedural,
                patterns: &*PROCEDURAL_SET,
            },
            IntentRule::VerbSet {
                category: QueryCategory::Procedural,
                verbs: config.blocked_verbs.clone(),
            },
            IntentRule::CueSet {
                category: QueryCategory::Conceptual,
                cues: CONCEPTUAL_CUES,
            },
        ];

        Self {
            rules,
            blocked_verbs: config.blocked_verbs.clone(),
            compliance,
        }
    }

    /// Classify a query as conceptual, procedural, or ambiguous.
    ///
    /// Deterministic and total: any string input, including empty, yields a
    /// category without panicking.
    pub fn classify_query(&self, query: &str) -> QueryCategory {
        let text = query.to_lowercase();
        for rule in &self.rules {
            if let Some(category) = rule.matches(&text) {
                return category;
            }
        }
        QueryCategory::Ambiguous
    }

    /// Apply safety rules to a proposed answer.
    ///
    /// Procedural and ambiguous queries have the draft discarded entirely
    /// in favor of a redirection message, and the override is recorded in
    /// the compliance log. Conceptual queries pass with a training-only
    /// disclaimer appended.
    pub fn apply(
        &self,
        query: &str,
        raw_answer: &str,
        system_focus: Option<&str>,
    ) -> SafetyDecision {
        let category = self.classify_query(query);

        match category {
            QueryCategory::Procedural | QueryCategory::Ambiguous => {
                info!("overriding {} query for safety", category);
                let safe_answer = build_block_message(category);
                let reasons = self.derive_block_reasons(query);
                // A logging outage never blocks or alters the decision;
                // faults are swallowed inside the logger.
                self.compliance
                    .log_blocked_query(query, category, &reasons, system_focus);
                SafetyDecision {
                    allow: false,
                    category,
                    safe_answer,
                }
            }
            QueryCategory::Conceptual => SafetyDecision {
                allow: true,
                category,
                safe_answer: wrap_with_disclaimer(raw_answer),
            },
        }
    }

    /// Reason codes for audit detail. Independent of the cascade so the
    /// log captures every co-occurring signal, not only the first match.
    pub fn derive_block_reasons(&self, query: &str) -> Vec<String> {
        let text = query.to_lowercase();
        let mut reasons = Vec::new();

        let mut matched: Vec<&str> = self
            .blocked_verbs
            .iter()
            .filter(|verb| text.contains(verb.as_str()))
            .map(String::as_str)
            .collect();
        matched.sort_unstable();
        matched.dedup();
        if !matched.is_empty() {
            reasons.push(format!("blocked_verbs:{}", matched.join(",")));
        }

        if HOW_TO_RE.is_match(&text) {
            reasons.push("task_how_to_language".to_string());
        }
        if STEPWISE_RE.is_match(&text) {
            reasons.push("stepwise_language".to_string());
        }
        if DIAGNOSTIC_RE.is_match(&text) {
            reasons.push("diagnostic_or_troubleshooting_language".to_string());
        }

        if reasons.is_empty() {
            reasons.push("ambiguous_intent".to_string());
        }

        reasons
    }
}

/// Training-oriented redirection for procedural or ambiguous queries.
///
/// The message avoids task steps and real diagnostics, and deliberately
/// does not echo the original query, to avoid capturing personally
/// identifiable or sensitive operational detail.
fn build_block_message(category: QueryCategory) -> String {
    let base_notice = "Aerotutor is a training-only learning assistant for \
                       aircraft system understanding. It cannot provide maintenance \
                       procedures, troubleshooting steps, or real-world diagnostics.\n\n";

    let guidance = if category == QueryCategory::Procedural {
        "Your question appears to request task-level or procedural guidance. \
         For actual maintenance work, always consult the approved Aircraft \
         Maintenance Manual (AMM), applicable regulatory documents, and your \
         instructor or supervising engineer.\n\n\
         If you would like to continue using this tool, you can rephrase your \
         question to focus on:\n\
         - How the system is designed to operate.\n\
         - How energy or pressure flows through the system.\n\
         - What indications or protections are provided conceptually.\n"
    } else {
        "This question is somewhat ambiguous from a safety perspective. To \
         stay within training-only limits, the system will not offer \
         task-level advice.\n\n\
         You may instead ask about:\n\
         - System architecture and major components.\n\
         - High-level effects of component failures.\n\
         - The logic behind protections and redundancy.\n"
    };

    let reminder = "\nAlways defer to approved maintenance documentation, local \
                    procedures, and regulatory requirements before performing any \
                    maintenance activity.";

    format!("{}{}{}", base_notice, guidance, reminder)
}

/// Attach the training-only disclaimer to acceptable conceptual content.
fn wrap_with_disclaimer(answer: &str) -> String {
    let disclaimer = "\n\n---\n\
                      This explanation is for educational and training purposes only. \
                      It is not a substitute for the approved Aircraft Maintenance \
                      Manual (AMM), type-specific training, or regulatory guidance. \
                      Do not use this system to plan or perform real-world maintenance.";

    format!("{}{}", answer.trim(), disclaimer)
}
