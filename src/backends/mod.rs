// SPDX-License-Identifier: GPL-3.0-only

//! Rendering backends
//!
//! Every backend implements [`FilterBackend`]. The dispatcher owns one backend
//! for the compute path and one for the legacy path and hands each a
//! [`FilterRequest`] built from the descriptor.
//!
//! Two families exist:
//!
//! - GPU pipelines in [`crate::shaders`], backed by wgpu compute shaders
//! - CPU reference kernels in [`cpu`], deterministic and hardware independent

pub mod cpu;
pub mod kernel;

pub use cpu::{CpuComputeBackend, CpuLegacyBackend};

use crate::catalog::LegacyEffect;
use crate::errors::{DispatchError, DispatchResult};
use crate::params::ParameterBlock;
use image::RgbaImage;

/// What a backend is asked to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterRequest {
    /// Generalized kernel parameters
    Compute(ParameterBlock),
    /// Fixed legacy effect at the given strength
    Legacy {
        effect: LegacyEffect,
        intensity: f32,
    },
}

impl FilterRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterRequest::Compute(_) => "compute",
            FilterRequest::Legacy { .. } => "legacy",
        }
    }
}

/// A filter implementation over RGBA8 images
///
/// Calls take `&mut self`: one backend instance runs one submission at a time.
/// Implementations must return an error rather than panic on per-call
/// failures, and must preserve image dimensions.
pub trait FilterBackend: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Filter `image`, producing a new image of the same size
    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage>;
}

impl<B: FilterBackend + ?Sized> FilterBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage> {
        (**self).apply(image, request)
    }
}

/// The tightly packed RGBA bytes of an image
pub fn pixel_bytes(image: &RgbaImage) -> DispatchResult<&[u8]> {
    let (width, height) = image.dimensions();
    let len = checked_byte_len(width, height)?;
    image.as_raw().get(..len).ok_or_else(|| {
        DispatchError::InvalidInput(format!(
            "{}x{} image holds {} bytes, expected {}",
            width,
            height,
            image.as_raw().len(),
            len
        ))
    })
}

/// Byte length of a tightly packed RGBA8 image
pub fn checked_byte_len(width: u32, height: u32) -> DispatchResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DispatchError::InvalidInput(format!("{}x{} image too large", width, height)))
}

/// Allocate a zeroed output buffer, reporting failure instead of aborting
pub fn try_alloc_pixels(len: usize) -> DispatchResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| DispatchError::Allocation(format!("{} byte output buffer: {}", len, e)))?;
    buf.resize(len, 0);
    Ok(buf)
}
