// SPDX-License-Identifier: GPL-3.0-only

//! CPU reference implementations of the compute and legacy backends
//!
//! Used when no GPU is wanted, and by tests as the golden implementation of
//! the kernels. Pixels are independent, so the image is split into bands of
//! [`TILE_SIZE`] rows that rayon processes in parallel.

use super::kernel::{self, Rgb};
use super::{FilterBackend, FilterRequest, pixel_bytes, try_alloc_pixels};
use crate::catalog::LegacyEffect;
use crate::constants::TILE_SIZE;
use crate::errors::{DispatchError, DispatchResult};
use crate::params::ParameterBlock;
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

/// Run `shade` over every pixel of `image` in parallel row bands
///
/// Alpha is copied through untouched.
fn map_pixels<F>(image: &RgbaImage, shade: F) -> DispatchResult<RgbaImage>
where
    F: Fn(Rgb) -> Rgb + Sync,
{
    let (width, height) = image.dimensions();
    let input = pixel_bytes(image)?;
    let mut output = try_alloc_pixels(input.len())?;

    if !input.is_empty() {
        let band_len = width as usize * 4 * TILE_SIZE as usize;
        output
            .par_chunks_mut(band_len)
            .zip(input.par_chunks(band_len))
            .for_each(|(out_band, in_band)| {
                for (dst, src) in out_band.chunks_exact_mut(4).zip(in_band.chunks_exact(4)) {
                    let original = [
                        kernel::unorm_to_f32(src[0]),
                        kernel::unorm_to_f32(src[1]),
                        kernel::unorm_to_f32(src[2]),
                    ];
                    let [r, g, b] = shade(original);
                    dst[0] = kernel::f32_to_unorm(r);
                    dst[1] = kernel::f32_to_unorm(g);
                    dst[2] = kernel::f32_to_unorm(b);
                    dst[3] = src[3];
                }
            });
    }

    RgbaImage::from_raw(width, height, output).ok_or_else(|| {
        DispatchError::Allocation(format!("output buffer too small for {}x{}", width, height))
    })
}

/// CPU version of the generalized color kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuComputeBackend;

impl CpuComputeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Apply a parameter block to every pixel
    pub fn apply_params(&self, image: &RgbaImage, params: &ParameterBlock) -> DispatchResult<RgbaImage> {
        debug!(
            width = image.width(),
            height = image.height(),
            "Applying color kernel on CPU"
        );
        map_pixels(image, |rgb| kernel::shade(params, rgb))
    }
}

impl FilterBackend for CpuComputeBackend {
    fn name(&self) -> &'static str {
        "cpu-compute"
    }

    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage> {
        match request {
            FilterRequest::Compute(params) => self.apply_params(image, params),
            other => Err(DispatchError::Unsupported {
                backend: self.name(),
                reason: format!("{} request", other.kind()),
            }),
        }
    }
}

/// CPU version of the fixed-effect legacy kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuLegacyBackend;

impl CpuLegacyBackend {
    pub fn new() -> Self {
        Self
    }

    /// Apply one legacy effect to every pixel
    pub fn apply_effect(
        &self,
        image: &RgbaImage,
        effect: LegacyEffect,
        intensity: f32,
    ) -> DispatchResult<RgbaImage> {
        debug!(
            width = image.width(),
            height = image.height(),
            effect = effect.name(),
            intensity,
            "Applying legacy effect on CPU"
        );
        map_pixels(image, |rgb| kernel::shade_legacy(effect, intensity, rgb))
    }
}

impl FilterBackend for CpuLegacyBackend {
    fn name(&self) -> &'static str {
        "cpu-legacy"
    }

    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage> {
        match request {
            FilterRequest::Legacy { effect, intensity } => {
                self.apply_effect(image, *effect, *intensity)
            }
            other => Err(DispatchError::Unsupported {
                backend: self.name(),
                reason: format!("{} request", other.kind()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 13 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8, 200])
        })
    }

    #[test]
    fn test_dimensions_preserved() {
        // Not a multiple of the tile size in either direction
        let image = gradient(37, 21);
        let out = CpuComputeBackend::new()
            .apply_params(&image, &ParameterBlock::IDENTITY)
            .unwrap();
        assert_eq!(out.dimensions(), (37, 21));
        assert_eq!(out, image);
    }

    #[test]
    fn test_alpha_preserved() {
        let image = gradient(8, 8);
        let params = ParameterBlock {
            invert_mix: 1.0,
            ..ParameterBlock::IDENTITY
        };
        let out = CpuComputeBackend::new().apply_params(&image, &params).unwrap();
        assert!(out.pixels().all(|p| p[3] == 200));
    }

    #[test]
    fn test_empty_image() {
        let image = RgbaImage::new(0, 0);
        let out = CpuComputeBackend::new()
            .apply_params(&image, &ParameterBlock::IDENTITY)
            .unwrap();
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn test_wrong_request_rejected() {
        let image = gradient(2, 2);
        let mut compute = CpuComputeBackend::new();
        let legacy_request = FilterRequest::Legacy {
            effect: LegacyEffect::Invert,
            intensity: 1.0,
        };
        assert!(matches!(
            compute.apply(&image, &legacy_request),
            Err(DispatchError::Unsupported { .. })
        ));

        let mut legacy = CpuLegacyBackend::new();
        assert!(matches!(
            legacy.apply(&image, &FilterRequest::Compute(ParameterBlock::IDENTITY)),
            Err(DispatchError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_legacy_invert() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 64, 255]));
        let out = CpuLegacyBackend::new()
            .apply_effect(&image, LegacyEffect::Invert, 1.0)
            .unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([0, 255, 191, 255])));
    }

    #[test]
    fn test_legacy_identity_effect() {
        let image = gradient(5, 5);
        let out = CpuLegacyBackend::new()
            .apply_effect(&image, LegacyEffect::Identity, 1.0)
            .unwrap();
        assert_eq!(out, image);
    }
}
