use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::enrich::enrich_model::{EnrichmentRequest, PageDetails};
use crate::enrich::enricher::Enricher;
use crate::enrich::page_text::{truncate_to_budget, DEFAULT_PAGE_TEXT_BUDGET};
use crate::error::AutofillError;
use crate::form::form_model::{EnrichedFields, FieldDescriptor};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";

/// Two-stage LLM enrichment over a local Ollama server: first summarise the
/// page, then assign a value to each field from the summary and the profile.
pub struct OllamaEnricher {
    pub endpoint: String,
    pub model: String,
    pub details_max_tokens: u32,
    pub fields_max_tokens: u32,
    pub context_budget: usize,
}

impl Default for OllamaEnricher {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            details_max_tokens: 6000,
            fields_max_tokens: 3000,
            context_budget: DEFAULT_PAGE_TEXT_BUDGET,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: String,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
pub struct OllamaResponse {
    pub response: String,
    #[serde(default)]
    pub done_reason: Option<String>,
}

const DETAILS_SYSTEM: &str = "You extract structured facts from the visible text of a web page, \
usually a job posting. Answer with one JSON object with the keys company_name, employment_type \
(Full-time, Part-time, Contract, Internship, Temporary or Other), experience, skills (array of \
strings) and description (plain-text summary of the posting). Use an empty string or empty array \
for anything the page does not state.";

const FIELDS_SYSTEM: &str = "You fill in web forms for a job applicant. For every form field you \
receive, pick the best value from the applicant profile or infer one from the page description. \
Match on label, placeholder, name and id. Format dates, phone numbers and URLs the way the \
placeholder suggests. For free-text fields asking for a message or introduction, write a short \
tailored note using the profile and the description. Leave a value empty only when nothing \
sensible can be inferred. Answer with one JSON object: {\"formFields\": [{\"name\", \"label\", \
\"placeholder\", \"id\", \"associatedValue\"}]}, echoing each field's identifying attributes.";

impl OllamaEnricher {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            ..Self::default()
        }
    }

    pub fn build_details_prompt(&self, page_text: &str) -> String {
        format!(
            "Extract the details from this page text:\n\n{}",
            truncate_to_budget(page_text, self.context_budget)
        )
    }

    pub fn build_fields_prompt(
        &self,
        fields: &[FieldDescriptor],
        description: &str,
        profile: &Value,
    ) -> String {
        format!(
            r#"Assign values to the form fields below.

FORM FIELDS:
{}

PAGE DESCRIPTION:
{}

APPLICANT PROFILE:
{}

Respond with ONLY valid JSON, no explanation."#,
            serde_json::to_string(fields).unwrap_or_else(|_| "[]".to_string()),
            serde_json::to_string(&truncate_to_budget(description, self.context_budget))
                .unwrap_or_default(),
            serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string()),
        )
    }

    fn generate(&self, system: &str, prompt: String, max_tokens: u32) -> Result<String, AutofillError> {
        let request = OllamaRequest {
            model: &self.model,
            system,
            prompt,
            stream: false,
            format: "json",
            options: OllamaOptions {
                num_predict: max_tokens,
            },
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()?
            .error_for_status()?;

        let body: OllamaResponse = response.json()?;
        read_answer(body)
    }

    pub fn extract_page_details(&self, page_text: &str) -> Result<PageDetails, AutofillError> {
        let raw = self.generate(
            DETAILS_SYSTEM,
            self.build_details_prompt(page_text),
            self.details_max_tokens,
        )?;
        parse_page_details(&raw)
    }
}

impl Enricher for OllamaEnricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichedFields, AutofillError> {
        let details = self.extract_page_details(&request.page_text)?;
        debug!(company = %details.company_name, "page details extracted");

        let raw = self.generate(
            FIELDS_SYSTEM,
            self.build_fields_prompt(&request.form_fields, &details.description, &request.profile),
            self.fields_max_tokens,
        )?;
        let enriched = parse_enriched_fields(&raw)?;
        info!(count = enriched.form_fields.len(), "enriched field values received");
        Ok(enriched)
    }
}

/// The generated text, unless generation stopped at the token limit.
pub fn read_answer(body: OllamaResponse) -> Result<String, AutofillError> {
    if body.done_reason.as_deref() == Some("length") {
        return Err(AutofillError::ContentTooLarge);
    }
    Ok(body.response)
}

/// Parse the first-stage answer.
pub fn parse_page_details(raw: &str) -> Result<PageDetails, AutofillError> {
    serde_json::from_str(raw.trim())
        .map_err(|e| AutofillError::NoEnrichedValues(format!("no page details found: {}", e)))
}

/// Parse the second-stage answer. An answer without any field is a failure.
pub fn parse_enriched_fields(raw: &str) -> Result<EnrichedFields, AutofillError> {
    let parsed: EnrichedFields = serde_json::from_str(raw.trim())
        .map_err(|e| AutofillError::NoEnrichedValues(format!("unparseable answer: {}", e)))?;
    if parsed.form_fields.is_empty() {
        return Err(AutofillError::NoEnrichedValues(
            "answer contained no fields".to_string(),
        ));
    }
    Ok(parsed)
}
