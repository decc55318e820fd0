// SPDX-License-Identifier: GPL-3.0-only

//! Editing session
//!
//! A [`FilterSession`] owns one catalog and one dispatcher. The catalog is a
//! shared snapshot that readers clone cheaply; [`FilterSession::reload_catalog`]
//! swaps in a new one without disturbing in-flight work. Dispatch is blocking
//! GPU or CPU work, so it runs on tokio's blocking pool with the dispatcher
//! locked for the duration of one submission.

use crate::catalog::{CatalogSource, FilterCatalog, FilterDescriptor};
use crate::config::{Config, RenderDevice};
use crate::dispatcher::FilterDispatcher;
use crate::errors::DeviceResult;
use image::RgbaImage;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct FilterSession {
    config: Config,
    catalog: RwLock<Arc<FilterCatalog>>,
    dispatcher: Arc<Mutex<FilterDispatcher>>,
}

impl FilterSession {
    /// Load the configured catalog and create the configured backends
    pub async fn new(config: Config) -> DeviceResult<Self> {
        let dispatcher = match config.render_device {
            RenderDevice::Gpu => FilterDispatcher::gpu(&config).await?,
            RenderDevice::Cpu => FilterDispatcher::cpu(),
        };
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Session over an existing dispatcher
    pub fn with_dispatcher(config: Config, dispatcher: FilterDispatcher) -> Self {
        let source = CatalogSource::from_path(config.catalog_path.clone());
        let catalog = FilterCatalog::load(&source);

        info!(
            version = catalog.version(),
            filters = catalog.len(),
            fallback = catalog.is_fallback(),
            dispatcher = ?dispatcher,
            "Filter session ready"
        );

        Self {
            config,
            catalog: RwLock::new(Arc::new(catalog)),
            dispatcher: Arc::new(Mutex::new(dispatcher)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Arc<FilterCatalog> {
        let guard = self.catalog.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Load `source` and replace the session catalog with it
    pub fn reload_catalog(&self, source: &CatalogSource) -> Arc<FilterCatalog> {
        let catalog = Arc::new(FilterCatalog::load(source));
        let mut guard = self.catalog.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&catalog);
        info!(version = catalog.version(), filters = catalog.len(), "Catalog reloaded");
        catalog
    }

    /// Apply the filter with `id`
    pub async fn apply(&self, image: &RgbaImage, id: &str) -> Option<RgbaImage> {
        let Some(descriptor) = self.catalog().get_by_id(id).cloned() else {
            warn!(id, "Unknown filter id");
            return None;
        };
        self.dispatch(image.clone(), descriptor).await
    }

    /// Apply the filter at `index` in catalog order
    pub async fn apply_index(&self, image: &RgbaImage, index: usize) -> Option<RgbaImage> {
        let Some(descriptor) = self.catalog().get_by_index(index).cloned() else {
            warn!(index, "Filter index out of range");
            return None;
        };
        self.dispatch(image.clone(), descriptor).await
    }

    /// Thumbnail `image` to fit `max_side` and run every filter over it
    ///
    /// Results follow catalog order; a failed filter yields `None` in its slot.
    pub async fn render_previews(
        &self,
        image: &RgbaImage,
        max_side: u32,
    ) -> Vec<(String, Option<RgbaImage>)> {
        let catalog = self.catalog();
        let thumb = thumbnail(image, max_side);
        debug!(
            width = thumb.width(),
            height = thumb.height(),
            filters = catalog.len(),
            "Rendering filter previews"
        );

        let mut dispatcher = Arc::clone(&self.dispatcher).lock_owned().await;
        let task = tokio::task::spawn_blocking(move || {
            catalog
                .sorted_list()
                .iter()
                .map(|desc| (desc.id.clone(), dispatcher.apply_filter(&thumb, desc)))
                .collect::<Vec<_>>()
        });

        match task.await {
            Ok(previews) => previews,
            Err(e) => {
                warn!(error = %e, "Preview task failed");
                Vec::new()
            }
        }
    }

    async fn dispatch(&self, image: RgbaImage, descriptor: FilterDescriptor) -> Option<RgbaImage> {
        let mut dispatcher = Arc::clone(&self.dispatcher).lock_owned().await;
        let task =
            tokio::task::spawn_blocking(move || dispatcher.apply_filter(&image, &descriptor));

        task.await.unwrap_or_else(|e| {
            warn!(error = %e, "Filter task failed");
            None
        })
    }
}

/// Scale `image` down so its longest side is at most `max_side`
fn thumbnail(image: &RgbaImage, max_side: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return image.clone();
    }

    let scale = max_side as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    image::imageops::thumbnail(image, new_width, new_height)
}
