//! Retrieval and draft synthesis over the training corpus.
//!
//! A deliberately simple in-process retrieval layer: the corpus is held in
//! memory as whole-file snippets and scored with transparent keyword
//! matching. Output from this module is always a candidate draft; callers
//! must route it through the safety filter before presenting it.

use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::RagConfig;

/// Snippets kept per answer.
pub const MAX_SNIPPETS: usize = 3;

/// Maximum rendered summary length per snippet, ellipsis included.
pub const SUMMARY_MAX_LEN: usize = 200;

/// Small unit of retrieved context from the training corpus.
#[derive(Debug, Clone)]
pub struct RetrievedSnippet {
    /// File name or logical source id.
    pub source: String,
    /// Text shown to the synthesis template.
    pub content: String,
}

/// Simple in-process retrieval engine.
///
/// The index is a flat snippet list rebuilt from scratch on every
/// [`RagEngine::build_index`] call; there is no incremental update.
pub struct RagEngine {
    data_dir: PathBuf,
    index_built: bool,
    documents: Vec<RetrievedSnippet>,
}

impl RagEngine {
    pub fn new(config: &RagConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            index_built: false,
            documents: Vec::new(),
        }
    }

    /// Scan the corpus directory into the in-memory snippet set.
    ///
    /// Plain-text files (`.md`, `.txt`) are stored verbatim; recognized
    /// visual/reference formats are stored as a templated placeholder. A
    /// missing corpus directory leaves the index empty, which is not an
    /// error. Idempotent: re-invocation clears and rescans.
    pub fn build_index(&mut self) {
        self.documents.clear();

        if !self.data_dir.exists() {
            info!(
                "corpus directory {} missing; answering from an empty index",
                self.data_dir.display()
            );
            self.index_built = true;
            return;
        }

        for entry in WalkDir::new(&self.data_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .unwrap_or_default();

            match ext.as_str() {
                "md" | "txt" => {
                    if let Ok(bytes) = fs::read(entry.path()) {
                        self.documents.push(RetrievedSnippet {
                            source: name,
                            content: String::from_utf8_lossy(&bytes).into_owned(),
                        });
                    }
                }
                "pdf" | "png" | "jpg" | "jpeg" => {
                    let pseudo_summary = format!(
                        "{}: training material (PDF/image). Refer to this resource for \
                         diagrams or figures related to the queried system.",
                        name
                    );
                    self.documents.push(RetrievedSnippet {
                        source: name,
                        content: pseudo_summary,
                    });
                }
                _ => {}
            }
        }

        debug!("indexed {} corpus snippets", self.documents.len());
        self.index_built = true;
    }

    /// Retrieve relevant training content and draft a concept-level answer.
    ///
    /// The index is built lazily on first use. The result is templated
    /// explanation text; it is not safety-checked here.
    pub fn answer_question(&mut self, question: &str, system_focus: &str) -> String {
        if !self.index_built {
            self.build_index();
        }

        let snippets = self.keyword_retrieval(question, system_focus);
        synthesize_explanation(system_focus, &snippets)
    }

    /// Number of snippets currently indexed (builds the index if needed).
    pub fn indexed_count(&mut self) -> usize {
        if !self.index_built {
            self.build_index();
        }
        self.documents.len()
    }

    /// Keyword scoring in place of a vector index: +2 when the system
    /// focus appears in a snippet, +1 per distinct question token found.
    /// Zero-score snippets are excluded; ties keep corpus order.
    fn keyword_retrieval(&self, question: &str, system_focus: &str) -> Vec<&RetrievedSnippet> {
        let text = question.to_lowercase();
        let focus = system_focus.to_lowercase();

        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.dedup();

        let mut scored: Vec<(usize, &RetrievedSnippet)> = Vec::new();
        for snippet in &self.documents {
            let content = snippet.content.to_lowercase();
            let mut score = 0;
            if !focus.is_empty() && content.contains(&focus) {
                score += 2;
            }
            for token in &tokens {
                if content.contains(token) {
                    score += 1;
                }
            }
            if score > 0 {
                scored.push((score, snippet));
            }
        }

        // sort_by is stable, so equal scores preserve corpus ordering.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SNIPPETS)
            .map(|(_, snippet)| snippet)
            .collect()
    }
}

/// Render the templated concept-level explanation.
fn synthesize_explanation(system_focus: &str, snippets: &[&RetrievedSnippet]) -> String {
    let system_label = capitalize(system_focus);

    let intro = format!(
        "{} can be understood as a set of major components and paths that \
         transfer energy or pressure between them. The description below is \
         conceptual and intended for training only.\n\n",
        system_label
    );

    let body = if snippets.is_empty() {
        "No detailed training documents are currently indexed for this topic. \
         However, you can still think about the system in terms of:\n\
         - Primary sources of power or pressure.\n\
         - Distribution paths and protection or regulation points.\n\
         - Typical loads or actuators that depend on the system.\n"
            .to_string()
    } else {
        let mut lines = vec!["Relevant training resources include:\n".to_string()];
        for snippet in snippets {
            lines.push(format!(
                "- {}: {}\n",
                snippet.source,
                summarize_snippet(&snippet.content)
            ));
        }
        lines.concat()
    };

    let reflection = "\nWhen reviewing your question, focus on how the system is \
                      designed to behave (normal operation, failure modes, and \
                      protections), rather than on specific maintenance tasks.";

    format!("{}{}{}", intro, body, reflection)
}

/// Whitespace-normalized, ellipsis-truncated rendering of snippet content.
fn summarize_snippet(content: &str) -> String {
    let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= SUMMARY_MAX_LEN {
        return text;
    }
    let truncated: String = text.chars().take(SUMMARY_MAX_LEN - 3).collect();
    format!("{}...", truncated)
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "The system".to_string(),
    }
}
