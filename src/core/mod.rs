//! Core error and I/O plumbing
//!
//! This module contains the error taxonomy and the buffered
//! (optionally gzip-compressed) input layer.

mod error;
pub mod io;

pub use error::{
    AggregationError, Gtf2RefbedError, GtfParseError, GtfResult, Result,
};
pub use io::{
    detect_compression, open_input, CompressionFormat, LineIterator, DEFAULT_BUFFER_SIZE,
};
