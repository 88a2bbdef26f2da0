//! Mapping between presence-tracking trees and schema-declared records.

pub mod engine;
pub mod record;
pub mod schema;

pub use engine::{project, project_record, reflect, reflect_record, ProjectError, TypedRecord};
pub use record::{FieldValue, Record};
pub use schema::{FieldDecl, FieldKind, RecordSchema};
