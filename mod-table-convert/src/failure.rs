//! Mapping of command failures to process exit codes and hints.

use thiserror::Error;
use xml_presence_core::{ParseError, ProjectError, RoundTripError, SchemaInferenceError};

use crate::registry::ModelError;
use crate::workbook::WorkbookError;

/// Two documents were compared and found to differ.
#[derive(Debug, Error)]
#[error("documents are not equivalent ({differences} difference(s))")]
pub struct ComparisonFailed {
    pub differences: usize,
}

/// Broad class of a failure, one per exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Generic,
    Malformed,
    SchemaMismatch,
    TableInference,
    NotEquivalent,
}

impl FailureKind {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Generic => 1,
            Self::Malformed => 2,
            Self::SchemaMismatch => 3,
            Self::TableInference => 4,
            Self::NotEquivalent => 5,
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Generic => None,
            Self::Malformed => Some("check that the file is well-formed UTF-8 XML"),
            Self::SchemaMismatch => {
                Some("run `list-models --verbose` to see the expected roots and columns")
            }
            Self::TableInference => {
                Some("header cells must match the column names listed by `list-models --verbose`")
            }
            Self::NotEquivalent => Some("rerun `compare` to see every difference"),
        }
    }
}

/// Classify an error by the first recognised cause in its chain.
pub fn classify(err: &anyhow::Error) -> FailureKind {
    err.chain()
        .find_map(|cause| {
            if let Some(err) = cause.downcast_ref::<RoundTripError>() {
                return Some(match err {
                    RoundTripError::Parse(_) => FailureKind::Malformed,
                    RoundTripError::Project(_) | RoundTripError::RecordCount { .. } => {
                        FailureKind::SchemaMismatch
                    }
                    RoundTripError::Table(_) => FailureKind::TableInference,
                    RoundTripError::NotEquivalent { .. } => FailureKind::NotEquivalent,
                });
            }
            if cause.is::<ParseError>() {
                return Some(FailureKind::Malformed);
            }
            if cause.is::<ProjectError>() {
                return Some(FailureKind::SchemaMismatch);
            }
            if cause.is::<SchemaInferenceError>() {
                return Some(FailureKind::TableInference);
            }
            if cause.is::<ComparisonFailed>() {
                return Some(FailureKind::NotEquivalent);
            }
            match cause.downcast_ref::<ModelError>() {
                Some(ModelError::Unrecognized { .. }) => return Some(FailureKind::SchemaMismatch),
                Some(ModelError::Unknown { .. }) => return Some(FailureKind::Generic),
                None => {}
            }
            match cause.downcast_ref::<WorkbookError>() {
                Some(WorkbookError::Xml { .. } | WorkbookError::OutOfBounds { .. }) => {
                    Some(FailureKind::Malformed)
                }
                Some(_) => Some(FailureKind::Generic),
                None => None,
            }
        })
        .unwrap_or(FailureKind::Generic)
}
