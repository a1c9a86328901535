use form_autofill::{
    form::{
        form_model::{FormLocator, ScanOutcome},
        fulfill::fulfill_report,
        scanner::{scan_forms, ScanOptions},
    },
    trace::{
        logger::TraceLogger,
        trace::{PassKind, TraceEvent},
    },
};

use crate::common::{by_id, by_name, page};

mod common;

fn read_events(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// =========================================================================
// TraceLogger
// =========================================================================

#[test]
fn fill_pass_logs_one_event_per_field_and_a_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());

    let mut doc = page(r#"<form id="f"><input name="a"></form>"#);
    let report = fulfill_report(
        &mut doc,
        &FormLocator::from_id("f"),
        &[by_name("a", "1"), by_name("b", "2")],
    );
    tracer.log_fill(&report);

    let events = read_events(&path);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["pass"], "fulfill");
    assert_eq!(events[0]["outcome"], "applied");
    assert_eq!(events[0]["strategy"], "name");
    assert_eq!(events[0]["field"], "a");
    assert_eq!(events[1]["outcome"], "unresolved");
    assert!(events[1]["strategy"].is_null());
    assert_eq!(events[2]["outcome"], "completed");
    assert_eq!(events[2]["form_id"], "f");
    assert_eq!(events[2]["detail"], "1 applied, 1 unresolved");
}

#[test]
fn aborted_and_missing_forms_are_traced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());

    let mut doc = page(r#"<form><input id="9"></form>"#);
    let aborted = fulfill_report(&mut doc, &FormLocator::from_id("0"), &[by_id("9", "x")]);
    let missing = fulfill_report(&mut doc, &FormLocator::from_id("5"), &[by_id("9", "x")]);
    tracer.log_fill(&aborted);
    tracer.log_fill(&missing);

    let events = read_events(&path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["outcome"], "aborted");
    assert!(events[0]["detail"].as_str().unwrap().contains("not a valid selector"));
    assert_eq!(events[1]["outcome"], "form_not_found");
    assert_eq!(events[1]["form_id"], "5");
}

#[test]
fn scan_pass_is_traced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());

    let doc = page(r#"<form id="x"><input name="a"><input name="b"></form>"#);
    tracer.log_scan(&scan_forms(&doc, ScanOptions::default()));
    tracer.log_scan(&ScanOutcome::NoFormsDetected);

    let events = read_events(&path);
    assert_eq!(events[0]["pass"], "scan");
    assert_eq!(events[0]["form_id"], "x");
    assert_eq!(events[0]["detail"], "2 fields");
    assert_eq!(events[1]["outcome"], "no_forms_detected");
}

#[test]
fn trace_appends_across_loggers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");

    TraceLogger::new(path.to_str().unwrap())
        .log(&TraceEvent::now(PassKind::Highlight, "highlighted").with_form("a"));
    TraceLogger::new(path.to_str().unwrap())
        .log(&TraceEvent::now(PassKind::Highlight, "form_not_found").with_form("b"));

    let events = read_events(&path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["pass"], "highlight");
    assert!(events[0]["timestamp_ms"].as_u64().unwrap() > 0);
}

#[test]
fn unwritable_trace_path_disables_logging() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending
    let tracer = TraceLogger::new(dir.path().to_str().unwrap());

    tracer.log(&TraceEvent::now(PassKind::Scan, "no_forms_detected"));
    TraceLogger::disabled().log(&TraceEvent::now(PassKind::Scan, "no_forms_detected"));
}
