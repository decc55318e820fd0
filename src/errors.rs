// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the filter engine
//!
//! Errors are split by when they can happen:
//!
//! - [`CatalogError`]: the catalog source is missing or unparseable. Recovered
//!   by [`FilterCatalog::load`](crate::catalog::FilterCatalog::load), which
//!   substitutes the built-in table.
//! - [`DeviceError`]: no usable compute device when a backend is constructed.
//!   Fatal for the session.
//! - [`DispatchError`]: a single filter application failed. The dispatcher
//!   turns these into "no result" and the caller keeps the unfiltered image.
//! - [`ConfigError`]: the engine config file could not be read.
//!
//! Malformed descriptor constants never surface as errors; the resolver falls
//! back to identity defaults.

use std::path::PathBuf;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type DeviceResult<T> = Result<T, DeviceError>;
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Catalog source could not be turned into descriptors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Catalog document is not valid catalog JSON
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// Catalog parsed but lists no filters
    #[error("catalog contains no filters")]
    Empty,
}

/// No usable compute device for a GPU backend
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// No adapter matched the request
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),
    /// Adapter found but the device could not be opened
    #[error("failed to create GPU device: {0}")]
    RequestDevice(String),
    /// Pipeline creation or the channel-order probe failed
    #[error("GPU pipeline self-test failed: {0}")]
    ProbeFailed(String),
}

/// A single filter application failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Pixel buffer does not match its dimensions, or dimensions exceed limits
    #[error("invalid input image: {0}")]
    InvalidInput(String),
    /// Buffer or texture allocation failed
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// The device rejected a command
    #[error("GPU validation error: {0}")]
    Validation(String),
    /// Result could not be copied back to CPU memory
    #[error("readback failed: {0}")]
    Readback(String),
    /// Backend cannot express the requested descriptor
    #[error("unsupported by {backend}: {reason}")]
    Unsupported {
        backend: &'static str,
        reason: String,
    },
}

/// Engine configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
