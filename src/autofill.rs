use serde_json::Value;
use tracing::{info, warn};

use crate::dom::{Document, NodeId};
use crate::enrich::enrich_model::EnrichmentRequest;
use crate::enrich::enricher::Enricher;
use crate::enrich::page_text::{visible_page_text, DEFAULT_PAGE_TEXT_BUDGET};
use crate::error::AutofillError;
use crate::form::form_model::{FormDescriptor, FormLocator, ScanOutcome};
use crate::form::fulfill::{fulfill_report, FillReport};
use crate::form::scanner::{scan_forms, ScanOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutofillOptions {
    pub scan: ScanOptions,
    /// Maximum number of page-text characters sent for enrichment.
    pub page_text_budget: usize,
}

impl Default for AutofillOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            page_text_budget: DEFAULT_PAGE_TEXT_BUDGET,
        }
    }
}

// ============================================================================
// Passes
// ============================================================================

pub fn scan_page<D: Document + ?Sized>(doc: &D, options: &AutofillOptions) -> ScanOutcome {
    scan_forms(doc, options.scan)
}

/// Everything the enrichment service needs for one form.
pub fn build_enrichment_request<D: Document + ?Sized>(
    doc: &D,
    form: &FormDescriptor,
    profile: Value,
    options: &AutofillOptions,
) -> EnrichmentRequest {
    EnrichmentRequest::new(
        &form.fields,
        &visible_page_text(doc),
        profile,
        options.page_text_budget,
    )
}

/// Enrich one scanned form and write the values back into `doc`.
///
/// A form that can no longer be located is an error here, even though the
/// underlying fulfillment pass only reports it.
pub fn autofill_form<D: Document + ?Sized>(
    doc: &mut D,
    form: &FormDescriptor,
    profile: Value,
    enricher: &dyn Enricher,
    options: &AutofillOptions,
) -> Result<FillReport, AutofillError> {
    let request = build_enrichment_request(&*doc, form, profile, options);
    if request.form_fields.is_empty() {
        warn!(form_id = %form.id, "form has no fields to enrich");
    }

    let enriched = enricher.enrich(&request)?;
    info!(
        form_id = %form.id,
        values = enriched.form_fields.len(),
        "applying enriched values"
    );

    let report = fulfill_report(doc, &FormLocator::from(form), &enriched.form_fields);
    if !report.form_found() {
        return Err(AutofillError::FormNotFound(form.id.clone()));
    }
    Ok(report)
}

/// Pick the form to autofill: the one with `form_id` when given, otherwise
/// the first form on the page.
pub fn select_form<'a>(
    outcome: &'a ScanOutcome,
    form_id: Option<&str>,
) -> Result<&'a FormDescriptor, AutofillError> {
    let forms = outcome.forms();
    match form_id {
        Some(id) => forms
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| AutofillError::FormNotFound(id.to_string())),
        None => forms
            .first()
            .ok_or_else(|| AutofillError::FormNotFound("<first form>".to_string())),
    }
}

pub fn highlight<D: Document + ?Sized>(doc: &mut D, form_id: &str) -> Option<NodeId> {
    crate::form::highlight::highlight_form(doc, &FormLocator::from_id(form_id))
}
