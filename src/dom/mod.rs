pub mod document;
pub mod headless;
pub mod selector;

pub use document::{control_type, Document, DomError, DomEvent, EventKind, NodeId};
pub use headless::HeadlessDocument;
