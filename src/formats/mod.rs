//! File format adapters
//!
//! Adapters for the GTF input format and the refbed output format.

pub mod gtf;
pub mod refbed;

pub use gtf::{is_filtered, parse_attributes, FeatureKind, GtfRecordView};
pub use refbed::{
    aggregate, convert_gtf, refbed_output_path, unquote_plus, write_refbed, ConversionStats,
    GeneRecord,
};
