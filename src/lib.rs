//! gtf2refbed - Flatten GTF gene annotations into refbed records
//!
//! Converts GTF annotation files into the tab-delimited refbed format used
//! for genome-browser track rendering: one row per gene, aggregating the
//! transcript span with all child exon/CDS coordinates.
//!
//! # Features
//!
//! - Zero-copy GTF line parsing
//! - Transparent gzip input support
//! - Anomalies (orphan exons, missing gene ids, malformed attributes) are
//!   logged and skipped; only I/O failures are fatal
//!
//! # Example
//!
//! ```ignore
//! use gtf2refbed::formats::convert_gtf;
//!
//! // Writes annotation.gtf.refbed next to the input
//! let stats = convert_gtf("annotation.gtf")?;
//! eprintln!("{} genes written", stats.genes);
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    AggregationError, Gtf2RefbedError, GtfParseError, GtfResult, Result,
};
pub use formats::{
    aggregate, convert_gtf, refbed_output_path, ConversionStats, GeneRecord, GtfRecordView,
};
