// SPDX-License-Identifier: GPL-3.0-only

//! photofx - a data-driven color filter engine
//!
//! Filters are described by a JSON catalog of descriptors. Each descriptor
//! names a rendering backend and carries loosely typed shader constants that
//! the resolver turns into a fixed parameter block for a single generalized
//! color kernel.
//!
//! # Architecture
//!
//! - [`catalog`]: descriptor model, catalog loading and the built-in table
//! - [`params`]: constant resolution into [`ParameterBlock`]
//! - [`backends`]: the [`FilterBackend`] trait and the CPU reference kernels
//! - [`shaders`]: wgpu compute pipelines for the same kernels
//! - [`dispatcher`]: routes a descriptor to its backend
//! - [`session`]: catalog plus dispatcher for one editing session
//!
//! # Example
//!
//! ```no_run
//! use photofx::{FilterDispatcher, FilterCatalog, CatalogSource};
//!
//! let catalog = FilterCatalog::load(&CatalogSource::Embedded);
//! let mut dispatcher = FilterDispatcher::cpu();
//! let image = image::RgbaImage::new(4, 4);
//! if let Some(sepia) = catalog.get_by_id("sepia") {
//!     let _filtered = dispatcher.apply_filter(&image, sepia);
//! }
//! ```

pub mod backends;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod gpu;
pub mod params;
pub mod session;
pub mod shaders;

// Re-export commonly used types
pub use backends::{FilterBackend, FilterRequest};
pub use catalog::{BackendKind, CatalogSource, DynamicValue, FilterCatalog, FilterDescriptor, LegacyEffect};
pub use config::{Config, PowerPreference, RenderDevice};
pub use dispatcher::FilterDispatcher;
pub use errors::{CatalogError, ConfigError, DeviceError, DispatchError};
pub use params::{ParameterBlock, resolve};
pub use session::FilterSession;
