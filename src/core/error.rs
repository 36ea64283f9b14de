//! Error types for gtf2refbed
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gtf2refbed operations
#[derive(Debug, Error)]
pub enum Gtf2RefbedError {
    /// GTF line parsing errors
    #[error("GTF parse error: {0}")]
    GtfParse(#[from] GtfParseError),

    /// Aggregation errors
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Input file not found
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while parsing a single GTF line
///
/// All of these are recoverable per line: the converter logs them and
/// moves on to the next line.
#[derive(Debug, Error)]
pub enum GtfParseError {
    /// Line has fewer than the 9 mandatory tab-separated fields
    #[error("Too few fields at line {line}: expected {expected}, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Line contains bytes that are not valid UTF-8
    #[error("Invalid UTF-8 in field '{field}' at line {line}")]
    InvalidUtf8 { line: usize, field: &'static str },

    /// Failed to parse the start coordinate
    #[error("Failed to parse start coordinate '{value}' at line {line}")]
    ParseStart { line: usize, value: String },

    /// An attribute item has a key but no value token
    #[error("Malformed attribute item '{item}' at line {line}")]
    MalformedAttribute { line: usize, item: String },
}

/// Errors that can occur while grouping features under their gene
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The grouping attribute is absent from a transcript/exon/CDS line
    #[error("Missing gene_id attribute at line {line}")]
    MissingKey { line: usize },

    /// An exon/CDS line references a gene id no transcript introduced
    #[error("{key} error: exon/CDS at line {line} has no owning transcript")]
    OrphanChild { line: usize, key: String },
}

/// Result type alias for gtf2refbed operations
pub type Result<T> = std::result::Result<T, Gtf2RefbedError>;

/// Result type alias for GTF line parsing
pub type GtfResult<T> = std::result::Result<T, GtfParseError>;
