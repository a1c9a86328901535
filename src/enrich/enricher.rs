use serde_json::Value;

use crate::enrich::enrich_model::EnrichmentRequest;
use crate::error::AutofillError;
use crate::form::form_model::{EnrichedFieldValue, EnrichedFields, FieldDescriptor};

// ============================================================================
// Enricher trait: boundary to whatever infers field values
// ============================================================================

/// Turns scanned fields, page context and a user profile into values to write.
pub trait Enricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichedFields, AutofillError>;
}

/// Copy a descriptor's identifying attributes into an enriched record.
pub fn enriched_from(field: &FieldDescriptor, value: String) -> EnrichedFieldValue {
    EnrichedFieldValue {
        name: field.name.clone(),
        label: field.label.clone().unwrap_or_default(),
        placeholder: field.placeholder.clone(),
        id: field.id.clone(),
        associated_value: value,
    }
}

// ============================================================================
// Profile enricher (offline, deterministic)
// ============================================================================

/// Fills fields straight from profile keys using keyword matching on the
/// field's label, name, id and placeholder. Unmatched fields get an empty
/// value.
pub struct ProfileEnricher;

impl Enricher for ProfileEnricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichedFields, AutofillError> {
        if request.form_fields.is_empty() {
            return Err(AutofillError::NoEnrichedValues(
                "no fields to enrich".to_string(),
            ));
        }

        let form_fields = request
            .form_fields
            .iter()
            .map(|field| {
                let value = profile_value(&request.profile, field).unwrap_or_default();
                enriched_from(field, value)
            })
            .collect();

        Ok(EnrichedFields { form_fields })
    }
}

/// Lowercased text the keyword rules look at.
fn field_hints(field: &FieldDescriptor) -> String {
    format!(
        "{} {} {} {}",
        field.label.as_deref().unwrap_or(""),
        field.name,
        field.id,
        field.placeholder
    )
    .to_lowercase()
}

/// Best profile value for `field`, if any rule matches.
pub fn profile_value(profile: &Value, field: &FieldDescriptor) -> Option<String> {
    let hints = field_hints(field);
    let has = |k: &str| hints.contains(k);

    // Keyword rules, checked in order
    if has("email") || has("e-mail") {
        return text_at(profile, "/email");
    }
    if has("phone") || has("mobile") || has("tel") {
        return text_at(profile, "/phone");
    }
    if has("linkedin") {
        return social_href(profile, "linkedin");
    }
    if has("github") {
        return social_href(profile, "github");
    }
    if has("website") || has("portfolio") || has("url") {
        return social_href(profile, "");
    }
    if has("first") || has("fname") || has("given") {
        return text_at(profile, "/firstName");
    }
    if has("last") || has("surname") || has("lname") || has("family") {
        return text_at(profile, "/lastName");
    }
    if has("name") && !has("company") {
        return full_name(profile);
    }
    if has("salary") || has("compensation") || has("rate") {
        return salary(profile);
    }
    if has("city") || has("location") || has("address") {
        return text_at(profile, "/location/label");
    }
    if has("title") || has("position") || has("role") {
        return text_at(profile, "/currentJobTitle");
    }
    if has("notice") || has("availability") || has("start") {
        return text_at(profile, "/noticePeriod");
    }
    if has("skill") {
        return text_at(profile, "/skills");
    }

    // Fall back to the control type
    match field.field_type.as_str() {
        "email" => text_at(profile, "/email"),
        "tel" => text_at(profile, "/phone"),
        "url" => social_href(profile, ""),
        _ => None,
    }
}

/// Scalar or string-array value at a JSON pointer, rendered as text.
fn text_at(profile: &Value, pointer: &str) -> Option<String> {
    let text = match profile.pointer(pointer)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    if text.trim().is_empty() { None } else { Some(text) }
}

fn full_name(profile: &Value) -> Option<String> {
    let parts: Vec<String> = ["/firstName", "/lastName"]
        .iter()
        .filter_map(|p| text_at(profile, p))
        .collect();
    if parts.is_empty() { None } else { Some(parts.join(" ")) }
}

fn salary(profile: &Value) -> Option<String> {
    let value = text_at(profile, "/salaryExpectation/value")?;
    match text_at(profile, "/salaryExpectation/currency") {
        Some(currency) => Some(format!("{} {}", value, currency)),
        None => Some(value),
    }
}

/// First social link whose href contains `needle` (any link for "").
fn social_href(profile: &Value, needle: &str) -> Option<String> {
    profile
        .get("socials")?
        .as_array()?
        .iter()
        .filter_map(|s| s.pointer("/url/href").and_then(Value::as_str))
        .find(|href| href.to_lowercase().contains(needle))
        .map(str::to_string)
}
