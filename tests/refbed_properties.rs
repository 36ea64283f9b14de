//! Property-based and end-to-end tests for GTF -> refbed conversion

use gtf2refbed::formats::{aggregate, convert_gtf, refbed_output_path, write_refbed};
use proptest::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

/// Generate a valid chromosome name
fn arb_chrom_name() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=22).prop_map(|n| format!("chr{}", n)),
        Just("chrX".to_string()),
        Just("NW_023276806.1".to_string()),
    ]
}

/// Generate a valid gene id
fn arb_gene_id() -> impl Strategy<Value = String> {
    (1u32..100000).prop_map(|n| format!("gene-LOC{}", n))
}

/// Generate a valid strand field
fn arb_strand() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("+".to_string()),
        Just("-".to_string()),
        Just(".".to_string()),
    ]
}

/// Generate a transcript span and a set of child spans inside it
fn arb_gene_structure() -> impl Strategy<Value = (u64, u64, Vec<(u64, u64)>)> {
    (1000u64..100000, 1u64..20)
        .prop_flat_map(|(start, n_children)| {
            let end = start + 10000;
            let children = prop::collection::vec(
                (start..end).prop_map(move |s| (s, s + 50)),
                n_children as usize,
            );
            (Just(start), Just(end), children)
        })
}

/// Build a GTF document: one transcript line plus its exon children
fn build_gtf(chrom: &str, gene_id: &str, strand: &str, start: u64, end: u64, children: &[(u64, u64)]) -> String {
    let mut doc = format!(
        "{}\tGnomon\ttranscript\t{}\t{}\t.\t{}\t.\tgene_id \"{}\"; gene_name \"{}\";\n",
        chrom, start, end, strand, gene_id, gene_id
    );
    for (i, (cs, ce)) in children.iter().enumerate() {
        let feature = if i % 2 == 0 { "exon" } else { "CDS" };
        doc.push_str(&format!(
            "{}\tGnomon\t{}\t{}\t{}\t.\t{}\t.\tgene_id \"{}\";\n",
            chrom, feature, cs, ce, strand, gene_id
        ));
    }
    doc
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: N children yield exactly N exon starts and N exon ends
    #[test]
    fn prop_child_counts_preserved(
        chrom in arb_chrom_name(),
        gene_id in arb_gene_id(),
        strand in arb_strand(),
        (start, end, children) in arb_gene_structure()
    ) {
        let doc = build_gtf(&chrom, &gene_id, &strand, start, end, &children);
        let (genes, stats) = aggregate(doc.as_bytes()).unwrap();

        prop_assert_eq!(genes.len(), 1);
        prop_assert_eq!(stats.exons, children.len());
        let record = &genes[&gene_id];
        prop_assert_eq!(record.exon_starts.len(), children.len());
        prop_assert_eq!(record.exon_ends.len(), children.len());

        // Starts are 0-based, ends verbatim
        let mut expected_starts: Vec<u64> = children.iter().map(|(s, _)| s - 1).collect();
        expected_starts.sort_unstable();
        let mut actual_starts = record.exon_starts.clone();
        actual_starts.sort_unstable();
        prop_assert_eq!(actual_starts, expected_starts);
    }

    /// Property: output exon lists are numerically non-decreasing
    #[test]
    fn prop_exon_lists_non_decreasing(
        chrom in arb_chrom_name(),
        gene_id in arb_gene_id(),
        strand in arb_strand(),
        (start, end, children) in arb_gene_structure()
    ) {
        let doc = build_gtf(&chrom, &gene_id, &strand, start, end, &children);
        let (genes, _) = aggregate(doc.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_refbed(&genes, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let fields: Vec<&str> = text.trim_end().split('\t').collect();

        let starts: Vec<u64> = fields[9].split(',').map(|s| s.parse().unwrap()).collect();
        let ends: Vec<u64> = fields[10].split(',').map(|s| s.parse().unwrap()).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(ends.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Property: transcript coordinates shift start by one, keep end verbatim
    #[test]
    fn prop_coordinate_shift(
        chrom in arb_chrom_name(),
        gene_id in arb_gene_id(),
        strand in arb_strand(),
        start in 1u64..1_000_000,
    ) {
        let end = start + 500;
        let doc = build_gtf(&chrom, &gene_id, &strand, start, end, &[]);
        let (genes, _) = aggregate(doc.as_bytes()).unwrap();
        let record = &genes[&gene_id];
        prop_assert_eq!(record.start, start - 1);
        prop_assert_eq!(record.cds_start, start - 1);
        prop_assert_eq!(&record.end, &end.to_string());
        prop_assert_eq!(&record.cds_end, &end.to_string());
        prop_assert_eq!(&record.strand, &strand);
    }

    /// Property: filtered prefixes never contribute to output
    #[test]
    fn prop_filtered_lines_ignored(
        gene_id in arb_gene_id(),
        prefix in prop_oneof![
            Just("#".to_string()),
            Just("unitig".to_string()),
            Just("Scaffold".to_string()),
        ]
    ) {
        let doc = format!(
            "{}_x\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"{}\";\n",
            prefix, gene_id
        );
        let (genes, stats) = aggregate(doc.as_bytes()).unwrap();
        prop_assert!(genes.is_empty());
        prop_assert_eq!(stats.filtered, 1);
        prop_assert_eq!(stats.total, 0);
    }

    /// Property: an orphan child yields exactly one diagnostic count and
    /// no record
    #[test]
    fn prop_orphan_counted_once(
        chrom in arb_chrom_name(),
        gene_id in arb_gene_id(),
    ) {
        let doc = format!(
            "{}\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"{}\";\n",
            chrom, gene_id
        );
        let (genes, stats) = aggregate(doc.as_bytes()).unwrap();
        prop_assert!(genes.is_empty());
        prop_assert_eq!(stats.orphans, 1);
    }
}

// ============================================================================
// End-to-end file conversion
// ============================================================================

const SAMPLE_GTF: &str = "NW_023276806.1\tGnomon\ttranscript\t34709\t35129\t.\t+\t.\ttranscript_id \"rna-XM_035450640.1\"; gene_id \"gene-LOC100752894\"; gene_name \"LOC100752894\"; product \"FGFR1 oncogene partner 2 homolog%2C transcript variant X2\";\n\
NW_023276806.1\tGnomon\texon\t34709\t35129\t.\t+\t.\ttranscript_id \"rna-XM_035450640.1\"; gene_id \"gene-LOC100752894\"; gene_name \"LOC100752894\";\n\
NW_023276806.1\tGnomon\tCDS\t34746\t35129\t.\t+\t0\ttranscript_id \"rna-XM_035450640.1\"; gene_id \"gene-LOC100752894\"; gene_name \"LOC100752894\";\n";

#[test]
fn test_convert_sample_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sample.gtf");
    fs::write(&input, SAMPLE_GTF).unwrap();

    let stats = convert_gtf(&input).unwrap();
    assert_eq!(stats.genes, 1);
    assert_eq!(stats.exons, 2);

    let output = refbed_output_path(&input);
    let text = fs::read_to_string(output).unwrap();
    assert_eq!(
        text,
        "NW_023276806.1\t34708\t35129\t34708\t35129\t+\tLOC100752894\tgene-LOC100752894\t\t34708,34745\t35129,35129\tFGFR1 oncogene partner 2 homolog, transcript variant X2\n"
    );
}

#[test]
fn test_convert_gzip_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sample.gtf.gz");
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(SAMPLE_GTF.as_bytes()).unwrap();
    fs::write(&input, encoder.finish().unwrap()).unwrap();

    let stats = convert_gtf(&input).unwrap();
    assert_eq!(stats.genes, 1);

    let text = fs::read_to_string(dir.path().join("sample.gtf.gz.refbed")).unwrap();
    assert!(text.starts_with("NW_023276806.1\t34708\t35129"));
}

#[test]
fn test_idempotent_reruns_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("genes.gtf");
    let doc = "chr2\tsrc\ttranscript\t500\t900\t.\t-\t.\tgene_id \"b\";\n\
chr2\tsrc\texon\t500\t700\t.\t-\t.\tgene_id \"b\";\n\
chr1\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"a\";\n\
chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"a\";\n";
    fs::write(&input, doc).unwrap();

    convert_gtf(&input).unwrap();
    let first = fs::read(refbed_output_path(&input)).unwrap();
    convert_gtf(&input).unwrap();
    let second = fs::read(refbed_output_path(&input)).unwrap();
    assert_eq!(first, second);

    // Sorted by gene id regardless of input order
    let text = String::from_utf8(first).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("chr1\t"));
    assert!(lines[1].starts_with("chr2\t"));
}

#[test]
fn test_missing_input_is_fatal_and_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does_not_exist.gtf");
    assert!(convert_gtf(&input).is_err());
    assert!(!refbed_output_path(&input).exists());
}

#[test]
fn test_mixed_anomalies_still_produce_well_formed_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("messy.gtf");
    let doc = "# header comment\n\
chr1\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"g1\"; gene_name \"G1\";\n\
chr1\tsrc\texon\t100\t150\t.\t+\t.\tgene_id \"g1\";\n\
chr1\tsrc\texon\t400\t500\t.\t+\t.\tgene_id \"ghost\";\n\
chr1\tsrc\ttranscript\t300\t400\t.\t+\t.\ttranscript_id \"no-gene-id\";\n\
chr1\ttruncated\n\
chr1\tsrc\texon\t160\t200\t.\t+\t.\tgene_id \"g1\"; malformed; note \"kept\";\n";
    fs::write(&input, doc).unwrap();

    let stats = convert_gtf(&input).unwrap();
    assert_eq!(stats.genes, 1);
    assert_eq!(stats.exons, 2);
    assert_eq!(stats.orphans, 1);
    assert_eq!(stats.errors, 2);
    assert_eq!(stats.filtered, 1);

    let text = fs::read_to_string(refbed_output_path(&input)).unwrap();
    let fields: Vec<&str> = text.trim_end().split('\t').collect();
    assert_eq!(fields.len(), 12);
    assert_eq!(fields[6], "G1");
    assert_eq!(fields[9], "99,159");
    assert_eq!(fields[10], "150,200");
}
