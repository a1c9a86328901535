use serde::{Deserialize, Serialize};

/// One eligible input / textarea as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Explicit `id` attribute, or the form's zero-based position in the
    /// document when it has none.
    pub id: String,
    pub action: String,
    pub fields: Vec<FieldDescriptor>,
    /// Content-addressed identity of the form (structure + attributes).
    #[serde(default)]
    pub fingerprint: String,
}

/// A value to write back, as returned by the enrichment service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFieldValue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub id: String,
    /// May be empty; an empty value is still written.
    #[serde(default)]
    pub associated_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFields {
    #[serde(default)]
    pub form_fields: Vec<EnrichedFieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    NoFormsDetected,
    Forms(Vec<FormDescriptor>),
}

impl ScanOutcome {
    pub fn forms(&self) -> &[FormDescriptor] {
        match self {
            ScanOutcome::NoFormsDetected => &[],
            ScanOutcome::Forms(forms) => forms,
        }
    }
}

/// How a fulfillment or highlight pass finds its form again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLocator {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl FormLocator {
    pub fn from_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fingerprint: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        if !fingerprint.is_empty() {
            self.fingerprint = Some(fingerprint.to_string());
        }
        self
    }
}

impl From<&FormDescriptor> for FormLocator {
    fn from(form: &FormDescriptor) -> Self {
        FormLocator::from_id(&form.id).with_fingerprint(&form.fingerprint)
    }
}
