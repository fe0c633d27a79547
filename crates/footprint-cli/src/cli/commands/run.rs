use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use footprint_core::report::console::{format_fetch_summary, format_footer};
use footprint_core::report::{
    default_progress_sink, format_breakdown, format_summary, json::to_json, SUMMARY_TITLE,
};
use footprint_core::{
    aggregate, load_catalog, CatalogConfig, Coordinator, CoreResult, Filters, ManifestSource,
    SizeCache,
};
use footprint_probe::ProbeClient;
use tracing::info;

use super::{catalog_config, report_error};
use crate::cli::args::{OutputFormat, RunArgs};
use crate::exit_codes::SUCCESS;

fn build_config(args: &RunArgs) -> CoreResult<CatalogConfig> {
    let mut config = catalog_config(args.config.as_deref(), args.cache_file.clone())?;
    if !args.manifests.is_empty() {
        let manifests = args
            .manifests
            .iter()
            .map(|m| ManifestSource::parse(m))
            .collect::<CoreResult<Vec<_>>>()?;
        config = config.with_manifests(manifests);
    }
    if let Some(base_path) = &args.base_path {
        config = config.with_base_path(base_path);
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    config.validate()?;
    Ok(config)
}

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let started = Instant::now();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => return Ok(report_error(&e)),
    };

    let mut cache = SizeCache::load(config.cache_path());
    info!(entries = cache.len(), "size cache loaded");

    let mut catalog = match load_catalog(&config).await.require_variants() {
        Ok(catalog) => catalog,
        Err(e) => return Ok(report_error(&e)),
    };
    info!(
        variants = catalog.variants.len(),
        manifest_errors = catalog.manifest_errors(),
        "catalog loaded"
    );

    let client = ProbeClient::from_env().context("failed to build HTTP client")?;
    let progress = (!args.no_progress).then(default_progress_sink);
    let coordinator = Coordinator::new(Arc::new(client))
        .with_workers(config.workers)
        .with_deadline(args.deadline_secs.map(Duration::from_secs))
        .with_progress(progress);

    let stats = coordinator
        .resolve_sizes(&mut catalog.variants, &mut cache)
        .await;
    cache.flush();

    let filters = Filters {
        platform: args.platform,
        resolution: args.resolution,
        format: args.video_format,
    };

    match args.format {
        OutputFormat::Json => {
            let report = to_json(&aggregate(&catalog.variants, &filters), &stats, &filters);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let all = aggregate(&catalog.variants, &Filters::default());
            print!("{}", format_fetch_summary(&stats));
            print!("{}", format_summary(&all.platforms, SUMMARY_TITLE));
            print!("{}", format_breakdown(&all.breakdown));
            if !filters.is_empty() {
                let filtered = aggregate(&catalog.variants, &filters);
                let title = format!("FILTERED RESULTS: {}", filters.describe());
                print!("{}", format_summary(&filtered.platforms, &title));
            }
            print!("{}", format_footer(started.elapsed().as_secs_f64()));
        }
    }

    Ok(SUCCESS)
}
