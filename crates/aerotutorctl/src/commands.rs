//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;

use aerotutor_common::{
    AiTutor, ComplianceLogger, QueryCategory, SystemFocus, TutorConfig, TutorResponse,
};

fn load_config(path: Option<&Path>) -> Result<TutorConfig> {
    TutorConfig::load(path).context("failed to load configuration")
}

/// Run one question through the tutor pipeline and render the response.
pub fn ask(config_path: Option<&Path>, question: &str, system: &str, json: bool) -> Result<()> {
    if question.trim().is_empty() {
        bail!("no question given; usage: aerotutorctl ask \"<question>\" --system <system>");
    }

    let Some(focus) = SystemFocus::from_label(system) else {
        bail!(
            "unknown system '{}'; valid values: {}",
            system,
            SystemFocus::LABELS.join(", ")
        );
    };

    let config = load_config(config_path)?;
    info!("answering with system focus {}", focus);
    let mut tutor = AiTutor::new(&config);
    let response = tutor.answer_conceptual_question(question, focus);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    render_response(&response);
    Ok(())
}

fn render_response(response: &TutorResponse) {
    println!("{}", response.answer);
    println!();

    let status = if response.blocked {
        format!("{}", "blocked".red())
    } else {
        format!("{}", "allowed".green())
    };
    let category = match response.category {
        QueryCategory::Conceptual => format!("{}", response.category.green()),
        QueryCategory::Procedural => format!("{}", response.category.red()),
        QueryCategory::Ambiguous => format!("{}", response.category.yellow()),
    };
    println!(
        "{}  system: {}  category: {}  status: {}",
        "--".dimmed(),
        response.system_focus,
        category,
        status
    );
}

/// List recent blocked-query audit events, newest first.
pub fn audit(config_path: Option<&Path>, recent: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let logger = ComplianceLogger::new(&config.compliance);
    let events = logger.recent(recent);

    if events.is_empty() {
        println!(
            "No blocked-query events in {}",
            logger.path().display()
        );
        return Ok(());
    }

    println!(
        "{} blocked-query event(s) from {}:",
        events.len(),
        logger.path().display()
    );
    for event in &events {
        println!(
            "  {}  {}  focus={}  reasons=[{}]  fingerprint={}",
            event.timestamp_utc.dimmed(),
            event.category.red(),
            event.system_focus.as_deref().unwrap_or("-"),
            event.reasons.join(", "),
            &event.query_fingerprint[..12.min(event.query_fingerprint.len())],
        );
        if let Some(preview) = &event.query_preview {
            println!("      preview: {}", preview.dimmed());
        }
    }

    Ok(())
}

/// Report what the retrieval index sees in the corpus directory.
pub fn corpus(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let dir = &config.rag.data_dir;

    let mut tutor = AiTutor::new(&config);
    let count = tutor.indexed_snippets();

    if !dir.exists() {
        println!(
            "Corpus directory {} does not exist; the tutor answers from the generic template.",
            dir.display()
        );
        return Ok(());
    }

    println!(
        "Corpus directory {}: {} snippet(s) indexed.",
        dir.display(),
        count
    );
    Ok(())
}
