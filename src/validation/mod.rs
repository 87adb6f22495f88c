//! Structural, domain and path validation.

pub mod config;
pub mod path;
pub mod schema;
pub mod violation;

pub use config::ConfigValidator;
pub use path::{PathValidator, normalize};
pub use schema::{FieldType, Schema, SchemaField, SchemaValidator, non_empty_string};
pub use violation::{ValidationViolation, type_label};
