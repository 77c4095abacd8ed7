// src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};

use dnakit::primer_search::{DEFAULT_MAX_TM_DIFF, DEFAULT_PAIR_COUNT, DEFAULT_TM};

#[derive(Parser)]
#[command(name = "dnakit", author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(help_template = "\
{before-help}{name} v{version}
{author-with-newline}{about-with-newline}
{usage-heading}
{usage}

{all-args}{after-help}
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set the number of threads used for pairwise alignment.
    ///
    /// - 0: Auto-detect (Use all available cores).
    /// - 1: Sequential (Single-threaded, good for debugging).
    /// - >1: Force specific thread count.
    #[arg(short = 'j', long, global = true, default_value_t = 0, value_name = "THREADS")]
    pub jobs: usize,

    /// Suppress status lines and log only warnings and errors (RUST_LOG overrides the log level)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    Newick,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PrimerFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a UPGMA tree from the sequences in a FASTA file.
    #[command(visible_alias = "phylo")]
    Tree {
        /// Input FASTA file (one record per taxon)
        #[arg(value_name = "FASTA")]
        input: String,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "OUT_FILE")]
        output: Option<String>,

        /// Tree serialization
        #[arg(short, long, value_enum, default_value_t = TreeFormat::Newick)]
        format: TreeFormat,

        /// Also print the pairwise distance matrix
        #[arg(long)]
        matrix: bool,
    },

    /// Search a template for primer pairs flanking a target region.
    #[command(visible_alias = "pcr")]
    Primers {
        /// Input FASTA or raw sequence file (first record is used)
        #[arg(value_name = "FASTA")]
        input: String,

        /// First base of the target region (1-based)
        #[arg(long, value_name = "POS")]
        region_start: Option<usize>,

        /// Last base of the target region (1-based)
        #[arg(long, value_name = "POS")]
        region_end: Option<usize>,

        /// Desired melting temperature (°C)
        #[arg(long, default_value_t = DEFAULT_TM, value_name = "TM")]
        tm: f64,

        /// Allowed deviation from the desired melting temperature (°C)
        #[arg(long, default_value_t = DEFAULT_MAX_TM_DIFF, value_name = "DELTA")]
        max_diff: f64,

        /// Number of primer pairs to report
        #[arg(short = 'n', long, default_value_t = DEFAULT_PAIR_COUNT, value_name = "N")]
        pairs: usize,

        /// Result layout
        #[arg(short, long, value_enum, default_value_t = PrimerFormat::Table)]
        format: PrimerFormat,
    },

    /// Print the reverse complement of each record.
    #[command(visible_alias = "rc")]
    Revcomp {
        #[arg(value_name = "FASTA")]
        input: String,
    },

    /// Translate each record from its first base using the standard code.
    Translate {
        #[arg(value_name = "FASTA")]
        input: String,
    },

    /// Shannon diversity and Pielou evenness of class counts.
    Diversity {
        /// Individuals per species
        #[arg(value_name = "COUNT", required = true, num_args = 1..)]
        counts: Vec<u64>,
    },
}
