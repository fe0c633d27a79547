use footprint_core::SizeCache;
use tracing::info;

use super::{catalog_config, report_error};
use crate::cli::args::ClearCacheArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: ClearCacheArgs) -> anyhow::Result<i32> {
    let config = match catalog_config(args.config.as_deref(), args.cache_file) {
        Ok(config) => config,
        Err(e) => return Ok(report_error(&e)),
    };
    let path = config.cache_path();

    match SizeCache::clear_file(&path) {
        Ok(removed) => {
            info!(path = %path.display(), removed, "clear cache");
            if removed {
                println!("Cache cleared!");
            } else {
                println!("No cache file at {}", path.display());
            }
            Ok(SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}
