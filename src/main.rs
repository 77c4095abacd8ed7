// src/main.rs
// DNAKIT: sequence distance trees and primer pair search.
// Entry point for the Command Line Interface. Status lines go to stderr so that
// results written to stdout can be piped.

mod cli;

use dnakit::diversity::shannon_diversity;
use dnakit::distance_matrix::DistanceMatrixBuilder;
use dnakit::dna_mapper::DnaMapper;
use dnakit::fasta::{FastaReader, FastaRecord};
use dnakit::oligo::{PrimerPair, TargetRegion};
use dnakit::primer_search::{PrimerSearch, PrimerSearchParams};
use dnakit::sequence::prepare_tree_input;
use dnakit::upgma::TreeBuilder;
use dnakit::{DnakitError, MIN_TREE_SEQUENCE_LEN};
use crate::cli::{Cli, Commands, PrimerFormat, TreeFormat};

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

// Human-facing status line on stderr, silenced by --quiet.
macro_rules! status {
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.quiet { "warn" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // CONCURRENCY CONFIGURATION
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to configure thread pool: {}", e))?;

    let quiet = cli.quiet;

    match &cli.command {
        // COMMAND: TREE (Pairwise alignment -> UPGMA)
        Commands::Tree { input, output, format, matrix } => {
            let records = read_records(input)?;
            let total = records.len();

            let sequences = match prepare_tree_input(records.into_iter().map(FastaRecord::into_sequence).collect()) {
                Ok(sequences) => sequences,
                Err(DnakitError::InsufficientSequences { found }) => anyhow::bail!(
                    "[!] Please enter at least two valid sequences: {} of {} records have {} or more bases.",
                    found, total, MIN_TREE_SEQUENCE_LEN
                ),
                Err(e) => return Err(e.into()),
            };

            let n = sequences.len();
            if n < total {
                status!(quiet, "[i] Skipped {} record(s) shorter than {} bases.", total - n, MIN_TREE_SEQUENCE_LEN);
            }
            status!(quiet, "[*] Aligning {} sequences ({} pairs, {} threads)...", n, n * (n - 1) / 2, rayon::current_num_threads());

            let distances = DistanceMatrixBuilder::build(&sequences);
            let tree = TreeBuilder::cluster(&sequences, &distances)?;

            let mut out = open_output(output.as_deref())?;
            match format {
                TreeFormat::Newick => {
                    if *matrix {
                        for (seq, row) in sequences.iter().zip(distances.rows()) {
                            let cells: Vec<String> = row.iter().map(|d| format!("{:.4}", d)).collect();
                            writeln!(out, "{}\t{}", seq.name, cells.join("\t"))?;
                        }
                        writeln!(out)?;
                    }
                    writeln!(out, "{}", tree.to_newick())?;
                }
                TreeFormat::Json => {
                    let doc = if *matrix {
                        serde_json::json!({ "matrix": distances, "tree": tree })
                    } else {
                        serde_json::to_value(&tree)?
                    };
                    serde_json::to_writer_pretty(&mut out, &doc)?;
                    writeln!(out)?;
                }
            }
            out.flush()?;

            status!(quiet, "[✔] Tree built: {} leaves, {} merges, root height {:.4}.", tree.leaf_count(), tree.internal_count(), tree.height());
        }

        // COMMAND: PRIMERS (Checkpointed pair search)
        Commands::Primers { input, region_start, region_end, tm, max_diff, pairs, format } => {
            let template = read_records(input)?
                .into_iter()
                .next()
                .map(|r| DnaMapper::clean(&r.sequence))
                .unwrap_or_default();
            if template.is_empty() {
                anyhow::bail!("[!] Enter a valid DNA sequence: {} contains no A/C/G/T bases.", input);
            }

            let region = TargetRegion::resolve(*region_start, *region_end, template.len());
            status!(
                quiet,
                "[i] Template: {} bp | Target: {}-{} | Tm: {:.1}±{:.1}°C | Pairs: {}",
                template.len(), region.start + 1, region.end + 1, tm, max_diff, pairs
            );

            let params = PrimerSearchParams { region, desired_tm: *tm, max_tm_diff: *max_diff, pair_count: *pairs };
            let mut search = PrimerSearch::new(&template, params);
            for progress in search.by_ref() {
                if !quiet {
                    eprint!("\r    -> Searching... {} found so far (position {})... ", progress.found, progress.position + 1);
                    io::stderr().flush()?;
                }
            }
            let results = search.finish();
            status!(quiet, "\n[+] Search complete: {} unique pair(s).", results.len());

            let mut out = open_output(None)?;
            match format {
                PrimerFormat::Table => write_primer_table(&mut out, &results)?,
                PrimerFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &results)?;
                    writeln!(out)?;
                }
            }
            out.flush()?;
        }

        // COMMAND: REVCOMP
        Commands::Revcomp { input } => {
            let mut out = open_output(None)?;
            for record in read_records(input)? {
                let dna = DnaMapper::clean(&record.sequence);
                write_record(&mut out, &record, &DnaMapper::reverse_complement(&dna))?;
            }
            out.flush()?;
        }

        // COMMAND: TRANSLATE
        Commands::Translate { input } => {
            let mut out = open_output(None)?;
            for record in read_records(input)? {
                let dna = DnaMapper::clean(&record.sequence);
                write_record(&mut out, &record, &DnaMapper::translate(&dna))?;
            }
            out.flush()?;
        }

        // COMMAND: DIVERSITY
        Commands::Diversity { counts } => {
            let report = shannon_diversity(counts).context("[!] Please enter some counts")?;
            println!("Shannon Diversity Index (H): {:.4}", report.shannon);
            match report.evenness {
                Some(j) => println!("Pielou's Evenness Index (J): {:.4}", j),
                None => println!("Pielou's Evenness Index (J): undefined (fewer than two species)"),
            }
            println!("Total number of individuals: {}", report.total);
        }
    }
    Ok(())
}

fn read_records(path: &str) -> Result<Vec<FastaRecord>> {
    let reader = FastaReader::from_path(path).with_context(|| format!("Failed to open input: {}", path))?;
    reader
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read input: {}", path))
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create output: {}", p))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_record(out: &mut dyn Write, record: &FastaRecord, body: &str) -> Result<()> {
    if let Some(header) = &record.header {
        writeln!(out, ">{}", header)?;
    }
    writeln!(out, "{}", body)?;
    Ok(())
}

/// Tab-separated table with 1-based coordinates for display.
fn write_primer_table(out: &mut dyn Write, results: &[PrimerPair]) -> Result<()> {
    if results.is_empty() {
        writeln!(out, "No primers found.")?;
        return Ok(());
    }

    writeln!(out, "#\tFwd Start\tRev Start\tFwd Primer\tRev Primer\tFwd Len\tRev Len\tFwd Tm\tRev Tm\tFwd GC\tRev GC\tPCR Len")?;
    for (i, pair) in results.iter().enumerate() {
        let (f, r) = (&pair.forward, &pair.reverse);
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
            i + 1, f.start + 1, r.start + 1, f.sequence, r.sequence, f.length, r.length,
            f.melting_temp, r.melting_temp, f.gc_percent, r.gc_percent, pair.product_length
        )?;
    }
    Ok(())
}
