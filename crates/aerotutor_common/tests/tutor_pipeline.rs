//! End-to-end pipeline scenarios: question in, safety-checked answer out,
//! with the compliance log as the only persistent side effect.

use std::fs;
use std::sync::Arc;
use std::thread;

use aerotutor_common::{
    AiTutor, BlockedQueryEvent, ComplianceConfig, ComplianceLogger, QueryCategory, SafetyConfig,
    SafetyFilter, SystemFocus, TutorConfig,
};
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> TutorConfig {
    let mut config = TutorConfig::default();
    config.rag.data_dir = dir.path().join("data");
    config.compliance.log_dir = dir.path().join("logs");
    config.compliance.hash_salt = "pipeline-salt".to_string();
    config
}

fn read_events(config: &TutorConfig) -> Vec<BlockedQueryEvent> {
    let path = config.compliance.log_dir.join(&config.compliance.log_name);
    if !path.exists() {
        return Vec::new();
    }
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("well-formed JSONL record"))
        .collect()
}

#[test]
fn procedural_question_is_blocked_and_audited() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let mut tutor = AiTutor::new(&config);

    let response =
        tutor.answer_conceptual_question("How do I remove the generator?", SystemFocus::Electrical);

    assert_eq!(response.category, QueryCategory::Procedural);
    assert!(response.blocked);
    assert!(response.answer.contains("Aircraft Maintenance Manual"));
    assert!(response.answer.contains("instructor"));
    assert!(!response.answer.contains("How do I remove the generator?"));

    let events = read_events(&config);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.category, QueryCategory::Procedural);
    assert_eq!(event.system_focus.as_deref(), Some("electrical"));
    assert!(event.reasons.contains(&"task_how_to_language".to_string()));
    assert!(event.reasons.contains(&"blocked_verbs:remove".to_string()));
    assert!(event.query_preview.is_none());
}

#[test]
fn conceptual_question_passes_with_disclaimer_and_no_audit() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    fs::create_dir_all(&config.rag.data_dir).unwrap();
    fs::write(
        config.rag.data_dir.join("electrical.md"),
        "The main AC bus is powered by either generator through the bus tie.",
    )
    .unwrap();

    let mut tutor = AiTutor::new(&config);
    let response = tutor.answer_conceptual_question(
        "How does the main AC bus stay powered if one generator fails?",
        SystemFocus::Electrical,
    );

    assert_eq!(response.category, QueryCategory::Conceptual);
    assert!(!response.blocked);
    assert!(response.answer.contains("electrical.md"));
    assert!(response.answer.contains("\n\n---\n"));
    assert!(response
        .answer
        .contains("educational and training purposes only"));

    assert!(read_events(&config).is_empty());
}

#[test]
fn empty_question_is_ambiguous_not_a_crash() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let mut tutor = AiTutor::new(&config);

    let response = tutor.answer_conceptual_question("", SystemFocus::Hydraulic);

    assert_eq!(response.category, QueryCategory::Ambiguous);
    assert!(response.blocked);

    let events = read_events(&config);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reasons, vec!["ambiguous_intent".to_string()]);
    assert_eq!(events[0].query_length, 0);
}

#[test]
fn empty_corpus_yields_generic_fallback_plus_disclaimer() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    fs::create_dir_all(&config.rag.data_dir).unwrap();

    let mut tutor = AiTutor::new(&config);
    let response = tutor.answer_conceptual_question(
        "explain the hydraulic system architecture",
        SystemFocus::Hydraulic,
    );

    assert!(!response.blocked);
    assert!(response
        .answer
        .contains("No detailed training documents are currently indexed"));
    assert!(response.answer.contains("\n\n---\n"));
}

#[test]
fn concurrent_overrides_append_whole_records() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let compliance = ComplianceLogger::new(&ComplianceConfig {
        enabled: true,
        log_dir: config.compliance.log_dir.clone(),
        log_name: config.compliance.log_name.clone(),
        hash_salt: config.compliance.hash_salt.clone(),
        store_query_preview: false,
    });
    let filter = Arc::new(SafetyFilter::new(&SafetyConfig::default(), compliance));

    let queries = [
        "how do i remove the generator",
        "walk me through the pump replacement",
    ];
    let handles: Vec<_> = queries
        .into_iter()
        .map(|query| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                let decision = filter.apply(query, "draft", Some("electrical"));
                assert!(!decision.allow);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Exactly two well-formed, non-interleaved records.
    let events = read_events(&config);
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event.category, QueryCategory::Procedural);
        assert!(event.timestamp_utc.ends_with('Z'));
        assert!(!event.query_fingerprint.is_empty());
    }
}
