use thiserror::Error;

use crate::dom::DomError;

#[derive(Debug, Error)]
pub enum AutofillError {
    /// No page is loaded in the browser session to operate on
    #[error("No active page: {0}")]
    NoActiveContext(String),

    /// The fulfillment / highlight target form could not be located
    #[error("Form '{0}' not found on the page")]
    FormNotFound(String),

    /// The enrichment service ran out of room before finishing its answer
    #[error("Content too large")]
    ContentTooLarge,

    /// The enrichment service produced no usable field values
    #[error("No enriched fields found: {0}")]
    NoEnrichedValues(String),

    #[error("Structural match failed: {0}")]
    Dom(#[from] DomError),

    /// Node.js bridge failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Browser session I/O: {0}")]
    SessionIO(String),

    /// Bridge answered a command with ok=false or an unexpected payload
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    Input(String),
}
