use std::path::{Path, PathBuf};

use footprint_core::{CatalogConfig, CoreError, CoreResult};

use super::args::*;
use crate::exit_codes::SUCCESS;

pub mod bitrate;
pub mod clear_cache;
pub mod run;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::ClearCache(args) => clear_cache::run(args),
        Command::Bitrate(args) => bitrate::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Catalog from `--config` (or the built-in default), then environment
/// overrides, then an explicit cache file.
pub(crate) fn catalog_config(
    config: Option<&Path>,
    cache_file: Option<PathBuf>,
) -> CoreResult<CatalogConfig> {
    let mut catalog = match config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    }
    .with_env_overrides();
    if let Some(cache_file) = cache_file {
        catalog = catalog.with_cache_file(cache_file);
    }
    Ok(catalog)
}

/// Print a core error and return its exit code.
pub(crate) fn report_error(err: &CoreError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}
