use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enrich::page_text::truncate_to_budget;
use crate::form::form_model::FieldDescriptor;
use crate::form::scanner::prepare_fields_for_enrichment;

/// Payload handed to the enrichment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
    pub form_fields: Vec<FieldDescriptor>,
    pub page_text: String,
    /// User profile, opaque to the core.
    pub profile: Value,
}

impl EnrichmentRequest {
    /// Build a request: drops fields with nothing to match on and cuts the
    /// page text to `budget` characters.
    pub fn new(fields: &[FieldDescriptor], page_text: &str, profile: Value, budget: usize) -> Self {
        Self {
            form_fields: prepare_fields_for_enrichment(fields),
            page_text: truncate_to_budget(page_text, budget),
            profile,
        }
    }
}

/// What the first inference stage pulls out of the page (a job posting, for
/// the profiles this tool fills in).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetails {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
}
