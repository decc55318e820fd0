// SPDX-License-Identifier: GPL-3.0-only

//! Filter catalog
//!
//! The catalog is an ordered, read-only list of [`FilterDescriptor`]s loaded
//! once per editing session. Loading never fails from the caller's point of
//! view: a missing or unparseable source is logged and replaced by the
//! built-in table from [`builtin`].
//!
//! Descriptors are kept sorted by `order`. The sort is stable, so descriptors
//! sharing an `order` keep the sequence they had in the source document.

mod builtin;
mod descriptor;
pub mod value;

pub use builtin::{BUILTIN_VERSION, builtin_descriptors};
pub use descriptor::{BackendKind, FilterDescriptor, LegacyEffect};
pub use value::{DynamicValue, ValueMap};

use crate::errors::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Catalog document bundled into the binary
pub const EMBEDDED_CATALOG: &str = include_str!("filters.json");

/// Where a catalog is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The catalog bundled with the crate
    Embedded,
    /// A JSON file on disk
    File(PathBuf),
    /// An in-memory JSON document
    Json(String),
}

impl CatalogSource {
    /// File source if a path is given, embedded catalog otherwise
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(CatalogSource::File).unwrap_or(CatalogSource::Embedded)
    }

    fn read(&self) -> CatalogResult<String> {
        match self {
            CatalogSource::Embedded => Ok(EMBEDDED_CATALOG.to_string()),
            CatalogSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })
            }
            CatalogSource::Json(text) => Ok(text.clone()),
        }
    }
}

/// Top-level shape of a catalog document
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: String,
    filters: Vec<FilterDescriptor>,
}

/// Ordered registry of filter descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCatalog {
    version: String,
    /// Sorted by `order`, ties in source order
    descriptors: Vec<FilterDescriptor>,
    fallback: bool,
}

impl FilterCatalog {
    /// Load a catalog, falling back to the built-in table on any error
    pub fn load(source: &CatalogSource) -> Self {
        match Self::try_load(source) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, ?source, "Failed to load filter catalog, using built-in filters");
                Self::builtin()
            }
        }
    }

    /// Load a catalog, reporting why the source was rejected
    pub fn try_load(source: &CatalogSource) -> CatalogResult<Self> {
        let text = source.read()?;
        let document: CatalogDocument = serde_json::from_str(&text)?;
        if document.filters.is_empty() {
            return Err(CatalogError::Empty);
        }

        let catalog = Self::from_descriptors(document.version, document.filters);
        info!(
            version = %catalog.version,
            count = catalog.len(),
            "Filter catalog loaded"
        );
        Ok(catalog)
    }

    /// The built-in nine-filter table
    pub fn builtin() -> Self {
        let mut catalog = Self::from_descriptors(BUILTIN_VERSION, builtin_descriptors());
        catalog.fallback = true;
        debug!(count = catalog.len(), "Built-in filter catalog created");
        catalog
    }

    /// Build a catalog from descriptors in source order
    pub fn from_descriptors(version: impl Into<String>, descriptors: Vec<FilterDescriptor>) -> Self {
        let mut descriptors = descriptors;
        // sort_by_key is stable: equal orders keep their source sequence
        descriptors.sort_by_key(|d| d.order);

        let mut seen = HashSet::new();
        for desc in &descriptors {
            if !seen.insert(desc.id.as_str()) {
                warn!(id = %desc.id, "Duplicate filter id in catalog, first entry wins");
            }
        }

        Self {
            version: version.into(),
            descriptors,
            fallback: false,
        }
    }

    /// Catalog version tag
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this catalog came from the built-in table
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors ordered by `order` ascending, stable on ties
    pub fn sorted_list(&self) -> &[FilterDescriptor] {
        &self.descriptors
    }

    /// Descriptor at a position of the sorted list
    pub fn get_by_index(&self, index: usize) -> Option<&FilterDescriptor> {
        self.descriptors.get(index)
    }

    /// First descriptor with the given id
    pub fn get_by_id(&self, id: &str) -> Option<&FilterDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Display names in sorted order
    pub fn name_list(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::load(&CatalogSource::Embedded)
    }
}
