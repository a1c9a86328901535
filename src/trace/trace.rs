use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::fulfill::{FieldOutcome, FieldReport};
use crate::form::matcher::MatchStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Scan,
    Fulfill,
    Highlight,
}

/// One line of the JSONL audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub pass: PassKind,

    pub form_id: Option<String>,
    pub field: Option<String>,
    pub strategy: Option<MatchStrategy>,

    pub outcome: String,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(pass: PassKind, outcome: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            pass,
            form_id: None,
            field: None,
            strategy: None,
            outcome: outcome.to_string(),
            detail: None,
        }
    }

    pub fn with_form(mut self, form_id: &str) -> Self {
        self.form_id = Some(form_id.to_string());
        self
    }

    pub fn with_field(mut self, report: &FieldReport) -> Self {
        self.field = Some(report.key.clone());
        if let FieldOutcome::Applied { strategy, .. } = report.outcome {
            self.strategy = Some(strategy);
        }
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
