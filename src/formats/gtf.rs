//! GTF format adapter
//!
//! Zero-copy parsing of GTF annotation lines and their semicolon-delimited
//! attribute column. GTF uses 1-based, closed coordinates.

use crate::core::{GtfParseError, GtfResult};
use log::warn;
use memchr::memchr;
use std::collections::HashMap;

/// Prefixes of lines the converter ignores entirely
///
/// `unitig` and `Scaffold` cover non-standard contig naming conventions
/// seen in some assemblies; the match is case-sensitive.
const SKIP_PREFIXES: [&str; 3] = ["#", "unitig", "Scaffold"];

/// Returns true for lines the converter must ignore: blank lines,
/// comment headers, and known non-standard contig prefixes.
pub fn is_filtered(line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    SKIP_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Feature classification for the aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Parent record introducing a gene
    Transcript,
    /// Child record contributing exon coordinates (exon or CDS)
    Child,
    /// Anything else; ignored by the converter
    Other,
}

impl FeatureKind {
    /// Classify a feature-type field, case-insensitively
    pub fn classify(feature: &str) -> Self {
        if feature.eq_ignore_ascii_case("transcript") {
            FeatureKind::Transcript
        } else if feature.eq_ignore_ascii_case("exon") || feature.eq_ignore_ascii_case("cds") {
            FeatureKind::Child
        } else {
            FeatureKind::Other
        }
    }
}

/// Zero-copy GTF record view for parsing
/// GTF format: seqname, source, feature, start, end, score, strand, frame, attributes
/// All coordinates are 1-based, closed interval [start, end]
pub struct GtfRecordView<'a> {
    /// Sequence name (chromosome)
    pub seqname: &'a str,
    /// Source field
    pub source: &'a str,
    /// Feature type
    pub feature: &'a str,
    /// Start position (1-based)
    pub start: u64,
    /// End position, kept as raw text so output echoes it verbatim
    pub end: &'a str,
    /// Score field (as string, may be ".")
    pub score: &'a str,
    /// Strand character ("+", "-" or ".")
    pub strand: &'a str,
    /// Frame field
    pub frame: &'a str,
    /// Attributes field
    pub attributes: &'a str,
}

impl<'a> GtfRecordView<'a> {
    /// Parse a GTF line with minimal allocation
    ///
    /// `line_no` is the 1-based input line number, carried into errors.
    pub fn parse(line: &'a [u8], line_no: usize) -> GtfResult<Self> {
        // Find field boundaries using memchr for tab characters
        let mut field_bounds = Vec::with_capacity(9);
        let mut start_pos = 0;
        let mut pos = 0;

        while pos < line.len() {
            if let Some(tab_pos) = memchr(b'\t', &line[pos..]) {
                let end_pos = pos + tab_pos;
                field_bounds.push((start_pos, end_pos));
                start_pos = end_pos + 1;
                pos = start_pos;
            } else {
                // Last field
                field_bounds.push((start_pos, line.len()));
                break;
            }
        }

        // GTF requires exactly 9 fields
        if field_bounds.len() < 9 {
            return Err(GtfParseError::TooFewFields {
                line: line_no,
                expected: 9,
                found: field_bounds.len(),
            });
        }

        // Helper to get field as str
        let get_field = |idx: usize, name: &'static str| -> GtfResult<&'a str> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GtfParseError::InvalidUtf8 {
                line: line_no,
                field: name,
            })
        };

        let seqname = get_field(0, "seqname")?;
        let source = get_field(1, "source")?;
        let feature = get_field(2, "feature")?;

        // Start is parsed to an integer; end is echoed verbatim at output
        // time, so it stays textual.
        let start_str = get_field(3, "start")?;
        let start: u64 = start_str.parse().map_err(|_| GtfParseError::ParseStart {
            line: line_no,
            value: start_str.to_string(),
        })?;

        let end = get_field(4, "end")?;
        let score = get_field(5, "score")?;
        let strand = get_field(6, "strand")?;
        let frame = get_field(7, "frame")?;
        let attributes = get_field(8, "attributes")?;

        Ok(Self {
            seqname,
            source,
            feature,
            start,
            end,
            score,
            strand,
            frame,
            attributes,
        })
    }

    /// Classify this record's feature type
    pub fn kind(&self) -> FeatureKind {
        FeatureKind::classify(self.feature)
    }

    /// 0-based start coordinate (GTF start is 1-based)
    pub fn start0(&self) -> u64 {
        self.start.saturating_sub(1)
    }
}

/// Parse one `key "value"` attribute item
///
/// The value token has surrounding double quotes stripped. An item with no
/// value token is malformed.
fn parse_attribute_item(item: &str, line_no: usize) -> GtfResult<(&str, &str)> {
    let (key, rest) = item
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| GtfParseError::MalformedAttribute {
            line: line_no,
            item: item.to_string(),
        })?;
    Ok((key, rest.trim_start().trim_matches('"')))
}

/// Parse the attribute column into a key/value map
///
/// Items are split on `;` (a trailing semicolon is stripped first), each
/// item on whitespace into key and value. Duplicate keys overwrite, so the
/// last occurrence wins. Malformed items are logged and skipped; the rest
/// of the line's attributes still parse.
pub fn parse_attributes(attributes: &str, line_no: usize) -> HashMap<String, String> {
    let mut details = HashMap::new();
    for item in attributes.trim_end_matches(';').split(';') {
        if item.trim().is_empty() {
            continue;
        }
        match parse_attribute_item(item, line_no) {
            Ok((key, value)) => {
                details.insert(key.to_string(), value.to_string());
            }
            Err(e) => warn!("{}", e),
        }
    }
    details
}
