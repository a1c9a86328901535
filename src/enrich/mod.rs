pub mod enrich_model;
pub mod enricher;
pub mod ollama;
pub mod page_text;
