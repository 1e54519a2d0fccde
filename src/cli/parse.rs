//! CLI parse: clap types for shardfold, plus the default-command fallback.

use crate::tree::TraversalOptions;
use crate::tree::ReportMode;
use crate::types::Level;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

/// Subcommand assumed when the first argument names none.
const DEFAULT_COMMAND: &str = "hash";

/// Shardfold CLI - merge sharded JSON artifacts and compare their hash trees
#[derive(Parser, Debug)]
#[command(name = "shardfold")]
#[command(about = "Merge sharded JSON artifacts and compare their Merkle hash trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces the global and workspace files)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parse `args`; `shardfold <folder> [flags]` reads as `shardfold hash <folder> [flags]`.
    ///
    /// The fallback is only tried when the first positional is not a subcommand, and
    /// the original error is returned if it does not parse either.
    pub fn try_parse_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match Self::try_parse_from(args.clone()) {
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument) => {
                let mut with_default = args;
                with_default.insert(with_default.len().min(1), OsString::from(DEFAULT_COMMAND));
                Self::try_parse_from(with_default).map_err(|_| e)
            }
            parsed => parsed,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the hashes of a folder of canonical JSON files
    Hash {
        /// Folder to hash
        folder: PathBuf,

        #[command(flatten)]
        selection: HashSelection,

        /// Name shown for the root line (default: the folder's name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Compare two folders; exits 1 when their hashes differ
    Compare {
        left: PathBuf,
        right: PathBuf,

        #[command(flatten)]
        selection: HashSelection,
    },
    /// Merge partial files into canonical files, then merge the index
    Merge {
        /// Output root holding the partial files
        dir: PathBuf,

        /// Skip merging index partials
        #[arg(long)]
        no_index: bool,
    },
    /// Write artifacts read as JSON lines into partial files
    Collect {
        /// Output root
        dir: PathBuf,

        /// Worker id (default: read from the configured environment variable)
        #[arg(long)]
        worker: Option<String>,

        /// JSON lines input file (default: standard input)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
}

/// Which nodes a hash report or comparison covers.
#[derive(Args, Debug, Clone, Default)]
pub struct HashSelection {
    /// Finest level to report
    #[arg(long, short = 'g', value_enum, conflicts_with_all = ["files", "tests"])]
    pub granularity: Option<GranularityArg>,

    /// Report down to files (same as --granularity file)
    #[arg(long, short = 'f', conflicts_with = "tests")]
    pub files: bool,

    /// Report down to tests (same as --granularity test)
    #[arg(long, short = 't')]
    pub tests: bool,

    /// Limit to N levels below the root (0 = root only)
    #[arg(long, short = 'd')]
    pub depth: Option<usize>,

    /// Only the root hash
    #[arg(long, short = 'r')]
    pub root: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranularityArg {
    Folder,
    File,
    Test,
}

impl From<GranularityArg> for Level {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Folder => Level::Folder,
            GranularityArg::File => Level::File,
            GranularityArg::Test => Level::Test,
        }
    }
}

impl HashSelection {
    pub fn granularity(&self) -> Option<Level> {
        if let Some(granularity) = self.granularity {
            Some(granularity.into())
        } else if self.files {
            Some(Level::File)
        } else if self.tests {
            Some(Level::Test)
        } else {
            None
        }
    }

    pub fn traversal(&self) -> TraversalOptions {
        if self.root {
            return TraversalOptions::root_only();
        }
        TraversalOptions {
            granularity: self.granularity(),
            max_depth: self.depth,
        }
    }

    pub fn report_mode(&self) -> ReportMode {
        if self.root {
            ReportMode::RootOnly
        } else {
            ReportMode::Tree(self.traversal())
        }
    }
}
