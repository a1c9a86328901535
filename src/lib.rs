pub mod autofill;
pub mod browser;
pub mod cli;
pub mod dom;
pub mod enrich;
pub mod error;
pub mod form;
pub mod trace;

pub use autofill::{autofill_form, scan_page, AutofillOptions};
pub use dom::{Document, HeadlessDocument};
pub use error::AutofillError;
pub use form::form_model::{
    EnrichedFieldValue, EnrichedFields, FieldDescriptor, FormDescriptor, FormLocator, ScanOutcome,
};
pub use form::fulfill::{fulfill, FillReport};
pub use form::sanitize::sanitize_identifier;
