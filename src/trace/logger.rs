use std::{fs::OpenOptions, io::Write, sync::Mutex};

use tracing::warn;

use crate::form::form_model::ScanOutcome;
use crate::form::fulfill::{FieldOutcome, FillReport};
use crate::trace::trace::{PassKind, TraceEvent};

/// Append-only JSONL sink for pass audit events. Failing to open or write the
/// file never fails the pass itself.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!(path, error = %e, "could not open trace file");
                Self { file: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn log(&self, event: &TraceEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to serialize trace event");
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "trace logger lock poisoned");
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!(error = %e, "failed to write trace event");
        }
    }

    pub fn log_scan(&self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::NoFormsDetected => {
                self.log(&TraceEvent::now(PassKind::Scan, "no_forms_detected"));
            }
            ScanOutcome::Forms(forms) => {
                for form in forms {
                    self.log(
                        &TraceEvent::now(PassKind::Scan, "form_detected")
                            .with_form(&form.id)
                            .with_detail(format!("{} fields", form.fields.len())),
                    );
                }
            }
        }
    }

    /// One event per field plus a closing event for the whole pass.
    pub fn log_fill(&self, report: &FillReport) {
        for field in &report.fields {
            let outcome = match field.outcome {
                FieldOutcome::Applied { .. } => "applied",
                FieldOutcome::Unresolved => "unresolved",
            };
            self.log(
                &TraceEvent::now(PassKind::Fulfill, outcome)
                    .with_form(&report.form_id)
                    .with_field(field),
            );
        }

        let summary = if !report.form_found() {
            TraceEvent::now(PassKind::Fulfill, "form_not_found")
        } else if let Some(error) = &report.error {
            TraceEvent::now(PassKind::Fulfill, "aborted").with_detail(error)
        } else {
            TraceEvent::now(PassKind::Fulfill, "completed").with_detail(format!(
                "{} applied, {} unresolved",
                report.applied_count(),
                report.unresolved_count()
            ))
        };
        self.log(&summary.with_form(&report.form_id));
    }
}
