//! refbed format adapter
//!
//! Aggregates GTF transcript/exon/CDS lines into one refbed row per gene.
//! A refbed row is 12 tab-separated fields: chrom, start, end, cdsstart,
//! cdsend, strand, symbol, gene id, a reserved blank column, comma-joined
//! exon starts, comma-joined exon ends, and a description.
//!
//! Output coordinates are 0-based starts (GTF start minus one) while end
//! coordinates echo the input text verbatim.

use crate::core::{AggregationError, Gtf2RefbedError, LineIterator, Result};
use crate::formats::gtf::{is_filtered, parse_attributes, FeatureKind, GtfRecordView};
use log::warn;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Decode a percent-plus-encoded attribute value
///
/// `+` means space, then `%XX` escapes are decoded. Matches the decoding
/// browsers apply to GTF attribute values (RFC 3986 plus form-encoding).
pub fn unquote_plus(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Per-gene accumulator for refbed output
///
/// Created by a transcript line, extended by exon/CDS lines sharing its
/// gene id. Starts are 0-based integers; ends stay as the raw input text.
#[derive(Debug, Clone)]
pub struct GeneRecord {
    pub chrom: String,
    pub start: u64,
    pub end: String,
    pub cds_start: u64,
    pub cds_end: String,
    pub strand: String,
    pub symbol: String,
    pub desc: String,
    pub exon_starts: Vec<u64>,
    pub exon_ends: Vec<String>,
}

impl GeneRecord {
    /// Build a record from a transcript line and its parsed attributes
    ///
    /// `key` is the gene id. Symbol falls back to the gene id when
    /// `gene_name` is absent; desc falls back to the decoded raw attribute
    /// column when `product` is absent. cdsstart/cdsend are pinned to the
    /// transcript span and never refined by CDS children.
    pub fn from_transcript(
        view: &GtfRecordView,
        details: &HashMap<String, String>,
        key: &str,
    ) -> Self {
        let symbol = details
            .get("gene_name")
            .cloned()
            .unwrap_or_else(|| key.to_string());
        let desc = details
            .get("product")
            .map(|p| unquote_plus(p))
            .unwrap_or_else(|| unquote_plus(view.attributes));

        Self {
            chrom: view.seqname.to_string(),
            start: view.start0(),
            end: view.end.to_string(),
            cds_start: view.start0(),
            cds_end: view.end.to_string(),
            strand: view.strand.to_string(),
            symbol,
            desc,
            exon_starts: Vec::new(),
            exon_ends: Vec::new(),
        }
    }

    /// Append an exon/CDS child's coordinates
    ///
    /// Exon and CDS lines feed the same two lists; CDS children are not
    /// tracked separately.
    pub fn push_child(&mut self, view: &GtfRecordView) {
        self.exon_starts.push(view.start0());
        self.exon_ends.push(view.end.to_string());
    }

    /// Write this record as one refbed line
    ///
    /// Exon lists are sorted ascending by numeric value first; the two
    /// lists are sorted independently. Field 9 is the reserved blank
    /// column of the refbed schema and is always present.
    pub fn write_refbed_line<W: Write>(&self, key: &str, writer: &mut W) -> io::Result<()> {
        let mut starts = self.exon_starts.clone();
        starts.sort_unstable();
        let mut ends = self.exon_ends.clone();
        // Ends are raw text but ordered numerically; anything unparseable
        // sorts last.
        ends.sort_by_key(|e| e.parse::<u64>().unwrap_or(u64::MAX));

        let starts_joined = starts
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let ends_joined = ends.join(",");

        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.end,
            self.cds_start,
            self.cds_end,
            self.strand,
            self.symbol,
            key,
            starts_joined,
            ends_joined,
            self.desc
        )
    }
}

/// Conversion statistics
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    /// Data lines that survived the line filter
    pub total: usize,
    /// Genes written to the output
    pub genes: usize,
    /// Exon/CDS coordinates appended across all genes
    pub exons: usize,
    /// Lines dropped by the filter (comments, unitig/Scaffold, blanks)
    pub filtered: usize,
    /// Exon/CDS lines whose gene id had no owning transcript
    pub orphans: usize,
    /// Lines skipped for recoverable parse/missing-key errors
    pub errors: usize,
}

/// Read GTF lines and group exon/CDS children under their transcripts
///
/// One sequential pass. Recoverable anomalies (short lines, missing
/// gene_id, orphan children) are logged and skipped; only I/O errors
/// propagate.
pub fn aggregate<R: BufRead>(reader: R) -> Result<(HashMap<String, GeneRecord>, ConversionStats)> {
    let mut genes: HashMap<String, GeneRecord> = HashMap::new();
    let mut stats = ConversionStats::default();

    let mut lines = LineIterator::new(reader);
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line() {
        let line = line?;
        line_no += 1;

        if is_filtered(line) {
            stats.filtered += 1;
            continue;
        }
        stats.total += 1;

        let view = match GtfRecordView::parse(line.as_bytes(), line_no) {
            Ok(view) => view,
            Err(e) => {
                warn!("{}", e);
                stats.errors += 1;
                continue;
            }
        };

        let kind = view.kind();
        if kind == FeatureKind::Other {
            continue;
        }

        let details = parse_attributes(view.attributes, line_no);
        let key = match details.get("gene_id") {
            Some(key) => key.clone(),
            None => {
                warn!("{}", AggregationError::MissingKey { line: line_no });
                stats.errors += 1;
                continue;
            }
        };

        match kind {
            FeatureKind::Transcript => {
                // Last transcript line wins if a gene id repeats
                let record = GeneRecord::from_transcript(&view, &details, &key);
                genes.insert(key, record);
            }
            FeatureKind::Child => match genes.get_mut(&key) {
                Some(record) => {
                    record.push_child(&view);
                    stats.exons += 1;
                }
                None => {
                    warn!("{}", AggregationError::OrphanChild { line: line_no, key });
                    stats.orphans += 1;
                }
            },
            FeatureKind::Other => {}
        }
    }

    Ok((genes, stats))
}

/// Write all accumulated genes as refbed lines, sorted by gene id
///
/// Sorting the keys makes repeated runs byte-identical.
pub fn write_refbed<W: Write>(
    genes: &HashMap<String, GeneRecord>,
    writer: &mut W,
) -> io::Result<usize> {
    let mut keys: Vec<&String> = genes.keys().collect();
    keys.sort_unstable();
    for key in &keys {
        genes[*key].write_refbed_line(key, writer)?;
    }
    Ok(keys.len())
}

/// Output path for an input file: the input path with `.refbed` appended
pub fn refbed_output_path(input: &Path) -> PathBuf {
    let mut out = input.as_os_str().to_owned();
    out.push(".refbed");
    PathBuf::from(out)
}

/// Convert a GTF file to `<input>.refbed`
///
/// The input is opened before the output is created, so a missing input
/// never leaves a truncated output file behind. Gzip-compressed input is
/// decompressed transparently.
///
/// # Returns
/// Conversion statistics
pub fn convert_gtf<P: AsRef<Path>>(input: P) -> Result<ConversionStats> {
    let input = input.as_ref();
    let reader = crate::core::open_input(input).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Gtf2RefbedError::FileNotFound(input.to_path_buf())
        } else {
            Gtf2RefbedError::Io(e)
        }
    })?;

    let (genes, mut stats) = aggregate(reader)?;

    let output_path = refbed_output_path(input);
    let mut writer = BufWriter::new(std::fs::File::create(&output_path)?);
    stats.genes = write_refbed(&genes, &mut writer)?;
    writer.flush()?;

    Ok(stats)
}
