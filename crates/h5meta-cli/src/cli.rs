use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "h5meta",
    about = "Extract container metadata and publish it into a metadata store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the manifest and publish every owned container
    Scan(ScanArgs),
    /// Walk a single container and print its metadata
    Inspect(InspectArgs),
    /// Discover container files and write a manifest
    Manifest(ManifestArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Manifest of container paths (default: path.log)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
    /// Prefix of source paths to replace
    #[arg(long)]
    pub source_root: Option<String>,
    /// Store prefix replacing the source root
    #[arg(long)]
    pub target_root: Option<String>,
    /// Index of this worker in a coordinated run
    #[arg(long, env = "H5META_WORKER_INDEX")]
    pub worker_index: Option<usize>,
    /// Number of workers in a coordinated run
    #[arg(long, env = "H5META_WORKER_COUNT")]
    pub worker_count: Option<usize>,
    /// Number of local worker threads
    #[arg(short = 'j', long, conflicts_with_all = ["worker_index", "worker_count"])]
    pub workers: Option<usize>,
    /// Publish into a directory store rooted here
    #[arg(long, conflicts_with = "memory_store")]
    pub store_dir: Option<PathBuf>,
    /// Publish into a throwaway in-memory store
    #[arg(long)]
    pub memory_store: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Container description to walk
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Directory to search
    pub root: PathBuf,
    /// Manifest file to write
    #[arg(short, long, default_value = "path.log")]
    pub output: PathBuf,
    /// File extensions to include (default: json)
    #[arg(short, long, value_delimiter = ',')]
    pub extensions: Vec<String>,
}
