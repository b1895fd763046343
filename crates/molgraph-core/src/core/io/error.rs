use super::perception::PerceptionError;
use crate::core::elements::registry::UnknownElementError;
use crate::core::models::graph::GraphError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported structure format '{0}'")]
    UnsupportedFormat(String),
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Malformed record in '{path}' on line {line}: {kind}")]
    Malformed {
        path: String,
        line: usize,
        kind: RecordErrorKind,
    },
    #[error("Unknown element in '{path}' on line {line}: {source}")]
    UnknownElement {
        path: String,
        line: usize,
        source: UnknownElementError,
    },
    #[error("No atom records found in '{path}'")]
    MissingAtoms { path: String },
    #[error("Bond perception failed for '{path}': {source}")]
    Perception {
        path: String,
        source: PerceptionError,
    },
    #[error("Graph construction failed for '{path}' on line {line}: {source}")]
    Graph {
        path: String,
        line: usize,
        source: GraphError,
    },
}

impl ParseError {
    /// Line number of the offending record, for errors tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. }
            | Self::UnknownElement { line, .. }
            | Self::Graph { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordErrorKind {
    #[error("Line is too short for a {record} record (must be at least {min} chars)")]
    LineTooShort { record: &'static str, min: usize },
    #[error("Invalid integer format in {field} (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float format in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Required field {field} is empty")]
    MissingRequiredField { field: String },
    #[error("Cannot determine an element symbol from '{0}'")]
    UnresolvableElement(String),
    #[error("Duplicate atom serial {0}")]
    DuplicateSerial(usize),
    #[error("Bond references unknown atom serial {0}")]
    UnknownAtomSerial(usize),
    #[error("Atom serial {0} is bonded to itself")]
    SelfBond(usize),
    #[error("Invalid bond order '{0}'")]
    InvalidBondOrder(String),
    #[error("{record} record requires at least two atoms")]
    IncompleteConnectivity { record: &'static str },
    #[error("Expected {expected} atom records, found {found}")]
    AtomCountMismatch { expected: usize, found: usize },
}

/// Source name carried into every error a reader raises.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordContext<'a> {
    pub path: &'a str,
}

impl<'a> RecordContext<'a> {
    pub fn new(path: &'a str) -> Self {
        Self { path }
    }

    pub fn malformed(&self, line: usize, kind: RecordErrorKind) -> ParseError {
        ParseError::Malformed {
            path: self.path.to_string(),
            line,
            kind,
        }
    }

    pub fn unknown_element(&self, line: usize, source: UnknownElementError) -> ParseError {
        ParseError::UnknownElement {
            path: self.path.to_string(),
            line,
            source,
        }
    }

    pub fn io(&self, source: io::Error) -> ParseError {
        ParseError::Io {
            path: self.path.to_string(),
            source,
        }
    }
}
