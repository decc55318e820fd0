// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing the catalog
//! - Filtering a single image
//! - Rendering preview thumbnails for every filter
//! - Validating a catalog file

use photofx::catalog::CatalogSource;
use photofx::{BackendKind, Config, FilterCatalog, FilterSession, params};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// List all filters in catalog order
pub fn list_filters(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = FilterCatalog::load(&CatalogSource::from_path(config.catalog_path.clone()));

    if catalog.is_fallback() {
        println!("Catalog could not be loaded, showing built-in filters.");
    }
    println!("Catalog version {} ({} filters):", catalog.version(), catalog.len());
    println!();

    for (index, desc) in catalog.sorted_list().iter().enumerate() {
        println!("  [{}] {} - {}", index, desc.id, desc.name);
        println!(
            "      Category: {}, backend: {}, order: {}",
            if desc.category.is_empty() { "-" } else { desc.category.as_str() },
            desc.backend,
            desc.order
        );
        if desc.backend == BackendKind::LegacyPipeline {
            println!("      Effect: {}", desc.legacy_effect().name());
        }
    }

    Ok(())
}

/// Apply one filter, selected by id or index, and save the result
pub async fn apply_filter(
    config: Config,
    filter: Option<String>,
    index: Option<usize>,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(input)?.to_rgba8();
    println!(
        "Loaded {} ({}x{})",
        input.display(),
        image.width(),
        image.height()
    );

    let session = FilterSession::new(config).await?;
    let start = Instant::now();

    let result = match (filter.as_deref(), index) {
        (Some(id), _) => session.apply(&image, id).await,
        (None, Some(index)) => session.apply_index(&image, index).await,
        (None, None) => return Err("specify a filter with --filter or --index".into()),
    };

    let Some(filtered) = result else {
        return Err("filter failed, see log for details".into());
    };

    filtered.save(output)?;
    println!(
        "Saved {} in {:.1}ms",
        output.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}

/// Render every filter over a thumbnail of `input` into `output_dir`
pub async fn render_previews(
    config: Config,
    input: &Path,
    output_dir: &Path,
    size: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(input)?.to_rgba8();
    let max_side = size.unwrap_or(config.preview_size);

    std::fs::create_dir_all(output_dir)?;

    let session = FilterSession::new(config).await?;
    let previews = session.render_previews(&image, max_side).await;

    let mut failed = 0;
    for (id, preview) in previews {
        match preview {
            Some(preview) => {
                let path: PathBuf = output_dir.join(format!("{}.png", id));
                preview.save(&path)?;
                println!("  {} -> {}", id, path.display());
            }
            None => {
                failed += 1;
                println!("  {} -> failed", id);
            }
        }
    }

    if failed > 0 {
        println!("{} filter(s) failed", failed);
    }

    Ok(())
}

/// Load a catalog strictly and report what it contains
pub fn validate_catalog(
    config: &Config,
    path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = CatalogSource::from_path(path.or_else(|| config.catalog_path.clone()));
    let catalog = FilterCatalog::try_load(&source)?;

    println!("Catalog version {} is valid ({} filters)", catalog.version(), catalog.len());
    for desc in catalog.sorted_list() {
        if desc.backend == BackendKind::ComputePipeline && params::resolve(desc).is_identity() {
            println!("  warning: {} resolves to the identity filter", desc.id);
        }
    }

    Ok(())
}
