//! Structure-preserving XML handling for round-tripping game data files.
//!
//! The crate keeps track of whether each optional attribute or element was absent, present but
//! empty, or present with a value, and carries that distinction through typed projection,
//! spreadsheet flattening and back to XML. [`compare`] decides whether two documents are
//! equivalent under a configurable tolerance policy.

pub mod compare;
pub mod format;
pub mod parser;
pub mod presence;
pub mod projection;
pub mod roundtrip;
pub mod table;
pub mod tree;
pub mod writer;

pub use compare::{
    compare, compare_documents, ComparisonMode, ComparisonOptions, ComparisonResult, Difference,
};
pub use format::{format_json, format_summary, format_text};
pub use parser::{parse, parse_file, parse_str, ParseError};
pub use presence::PresenceState;
pub use projection::{
    project, project_record, reflect, reflect_record, FieldDecl, FieldKind, FieldValue,
    ProjectError, Record, RecordSchema, TypedRecord,
};
pub use roundtrip::{
    table_to_xml, validate, xml_to_table, RoundTrip, RoundTripError, RoundTripOutcome, RunOptions,
    Stage,
};
pub use table::{
    flatten, flatten_typed, flatten_with_schema, unflatten, unflatten_typed, FlattenOptions,
    SchemaInferenceError, TableRow, TableSchema,
};
pub use tree::ElementNode;
pub use writer::{emit, emit_document, write, write_file, WriteError};
