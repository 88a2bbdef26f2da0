//! Sequencing of parse, projection, reflection and emission, with optional verification.
//!
//! Stages run strictly in order and the first failure wins: no stage runs on the output of a
//! failed one, and nothing is emitted for a document that failed to project.

use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;

use thiserror::Error;

use crate::compare::{compare, ComparisonOptions, Difference};
use crate::parser::{parse, ParseError};
use crate::projection::{project, reflect, ProjectError, Record, TypedRecord};
use crate::table::{
    flatten_typed, unflatten_typed, FlattenOptions, SchemaInferenceError, TableRow, TableSchema,
};
use crate::tree::ElementNode;
use crate::writer::emit_document;

/// A step of the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsed,
    Projected,
    Mutated,
    Reflected,
    Emitted,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Projected => "projected",
            Self::Mutated => "mutated",
            Self::Reflected => "reflected",
            Self::Emitted => "emitted",
        };
        f.write_str(name)
    }
}

/// Errors from any stage, wrapped without loss.
#[derive(Debug, Error)]
pub enum RoundTripError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Table(#[from] SchemaInferenceError),
    /// Verification found the output differs from the source, or, after a mutation, from the
    /// reflected tree.
    #[error("round trip is not equivalent to the source ({} difference(s))", differences.len())]
    NotEquivalent { differences: Vec<Difference> },
    /// A table described several documents where one was expected.
    #[error("table describes {found} documents, expected one")]
    RecordCount { found: usize },
}

impl RoundTripError {
    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Parse(_) => Stage::Parsed,
            Self::Project(_) | Self::Table(_) | Self::RecordCount { .. } => Stage::Projected,
            Self::NotEquivalent { .. } => Stage::Reflected,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Compare the source tree with the reflected one and fail when they differ.
    pub verify: Option<ComparisonOptions>,
}

impl RunOptions {
    pub fn verified(options: ComparisonOptions) -> Self {
        Self {
            verify: Some(options),
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RoundTripOutcome<T> {
    pub value: T,
    pub tree: ElementNode,
    pub xml: String,
    pub stages: Vec<Stage>,
}

/// Round trip for one typed model.
pub struct RoundTrip<T>(PhantomData<T>);

impl<T: TypedRecord> RoundTrip<T> {
    /// Parse, project, apply `mutate`, reflect and emit. With verification on, the emitted XML
    /// is re-parsed and compared with the reflected tree.
    pub fn run<F>(xml: &[u8], mutate: F, opts: &RunOptions) -> Result<RoundTripOutcome<T>, RoundTripError>
    where
        F: FnOnce(&mut T),
    {
        Self::execute(xml, Some(mutate), opts)
    }

    /// Parse, project, reflect and emit without touching the typed value.
    pub fn run_unchanged(xml: &[u8], opts: &RunOptions) -> Result<RoundTripOutcome<T>, RoundTripError> {
        Self::execute(xml, None::<fn(&mut T)>, opts)
    }

    fn execute<F>(
        xml: &[u8],
        mutate: Option<F>,
        opts: &RunOptions,
    ) -> Result<RoundTripOutcome<T>, RoundTripError>
    where
        F: FnOnce(&mut T),
    {
        let mut stages = Vec::with_capacity(5);
        let source = parse(xml)?;
        enter(&mut stages, Stage::Parsed);

        let mut value: T = project(&source)?;
        enter(&mut stages, Stage::Projected);

        let mutated = mutate.is_some();
        if let Some(mutate) = mutate {
            mutate(&mut value);
            enter(&mut stages, Stage::Mutated);
        }

        let tree = reflect(&value);
        enter(&mut stages, Stage::Reflected);

        let xml = emit_document(&tree);
        if let Some(options) = &opts.verify {
            // A mutated value no longer matches its source; its own emitted text must.
            let result = if mutated {
                compare(&tree, &parse(xml.as_bytes())?, options)
            } else {
                compare(&source, &tree, options)
            };
            if !result.equivalent {
                return Err(RoundTripError::NotEquivalent {
                    differences: result.differences,
                });
            }
        }
        enter(&mut stages, Stage::Emitted);

        Ok(RoundTripOutcome {
            value,
            tree,
            xml,
            stages,
        })
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    tracing::debug!(%stage, "round trip stage complete");
    stages.push(stage);
}

/// Dry run: parse and project, reporting the first failure.
pub fn validate<T: TypedRecord>(xml: &[u8]) -> Result<(), RoundTripError> {
    let tree = parse(xml)?;
    project::<T>(&tree)?;
    Ok(())
}

/// Parse, project and flatten one document. With `verify` set, the XML round trip is checked
/// before anything is flattened.
pub fn xml_to_table<T: TypedRecord>(
    xml: &[u8],
    flatten: &FlattenOptions,
    opts: &RunOptions,
) -> Result<(TableSchema, Vec<TableRow>), RoundTripError> {
    let outcome = RoundTrip::<T>::run_unchanged(xml, opts)?;
    Ok(flatten_typed(std::slice::from_ref(&outcome.value), flatten)?)
}

/// Unflatten a table into one document and emit it.
pub fn table_to_xml<T: TypedRecord>(
    table: &TableSchema,
    rows: &[TableRow],
) -> Result<String, RoundTripError> {
    let mut values: Vec<T> = unflatten_typed(table, rows)?;
    let value = match values.len() {
        0 => T::from_record(&Record::empty(T::schema()))?,
        1 => values.remove(0),
        found => return Err(RoundTripError::RecordCount { found }),
    };
    Ok(emit_document(&reflect(&value)))
}
