use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "footprint",
    version,
    about = "Storage and bandwidth footprint of multi-platform video catalogs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load manifests, resolve remote sizes and print totals
    Run(RunArgs),
    /// Delete the persisted size cache
    ClearCache(ClearCacheArgs),
    /// Estimate hourly data use of local video files from their bitrate
    Bitrate(BitrateArgs),
    Version,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RunArgs {
    /// YAML catalog file (base_path, manifests, workers, cache_file)
    #[arg(long, env = "FOOTPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest to load as PATH=PLATFORM; repeatable, replaces the catalog list
    #[arg(long = "manifest", value_name = "PATH=PLATFORM")]
    pub manifests: Vec<String>,

    /// Directory relative manifest paths are resolved against
    #[arg(long)]
    pub base_path: Option<PathBuf>,

    /// Only report this platform (case-insensitive)
    #[arg(long)]
    pub platform: Option<String>,

    /// Only report this resolution, e.g. 4K (case-insensitive)
    #[arg(long)]
    pub resolution: Option<String>,

    /// Only report this video format, e.g. HDR (case-insensitive)
    #[arg(long = "video-format")]
    pub video_format: Option<String>,

    /// Concurrent probe workers
    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, env = "FOOTPRINT_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Give up on outstanding probes after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable the progress line on stderr
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ClearCacheArgs {
    /// YAML catalog file whose cache_file to clear
    #[arg(long, env = "FOOTPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "FOOTPRINT_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct BitrateArgs {
    /// Folder of video files to analyze
    pub folder: PathBuf,

    /// Media prober executable
    #[arg(long, default_value = "ffprobe")]
    pub ffprobe: PathBuf,
}
