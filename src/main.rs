//! gtf2refbed CLI entry point
//!
//! Converts a GTF annotation file into refbed browser-track records.

use clap::Parser;
use gtf2refbed::formats::{convert_gtf, refbed_output_path};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "gtf2refbed")]
#[command(about = "Flatten GTF gene annotations into refbed browser-track records")]
#[command(version)]
#[command(author = "gtf2refbed Contributors")]
struct Cli {
    /// Input GTF file (plain or gzip-compressed)
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let output_path = refbed_output_path(&cli.input);
    eprintln!("Converting GTF file: {:?} -> {:?}", cli.input, output_path);

    // A failed Result from main exits with code 1 and the message on stderr
    let stats = convert_gtf(&cli.input)
        .map_err(|e| anyhow::anyhow!("cannot convert {:?}: {}", cli.input, e))?;

    eprintln!("\n=== Conversion Statistics ===");
    eprintln!("Data lines:      {}", stats.total);
    eprintln!("Genes written:   {}", stats.genes);
    eprintln!("Exon/CDS spans:  {}", stats.exons);
    eprintln!("Filtered lines:  {}", stats.filtered);
    eprintln!("Orphan children: {}", stats.orphans);
    eprintln!("Skipped lines:   {}", stats.errors);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
