pub mod form_model;
pub mod fulfill;
pub mod highlight;
pub mod identity;
pub mod label;
pub mod matcher;
pub mod sanitize;
pub mod scanner;
