// SPDX-License-Identifier: GPL-3.0-only

//! GPU filter pipelines
//!
//! - [`gpu_processor`]: shared upload, dispatch and readback machinery
//! - [`gpu_filter`]: the generalized color kernel
//! - [`legacy_filter`]: the fixed legacy effects

pub mod gpu_filter;
pub mod gpu_processor;
pub mod legacy_filter;

pub use gpu_filter::ComputeFilterPipeline;
pub use gpu_processor::{CachedDimensions, ChannelOrder, GpuKernel, compute_dispatch_size};
pub use legacy_filter::LegacyFilterPipeline;

/// WGSL source of the generalized color kernel
pub const COLOR_FILTER_SHADER: &str = include_str!("color_filter.wgsl");

/// WGSL source of the legacy effect kernel
pub const LEGACY_FILTER_SHADER: &str = include_str!("legacy_filter.wgsl");
