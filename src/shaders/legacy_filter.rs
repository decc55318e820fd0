// SPDX-License-Identifier: GPL-3.0-only
//! GPU pipeline for the fixed legacy effects

use super::LEGACY_FILTER_SHADER;
use super::gpu_processor::{ChannelOrder, GpuKernel};
use crate::backends::{FilterBackend, FilterRequest};
use crate::catalog::LegacyEffect;
use crate::errors::{DeviceResult, DispatchError, DispatchResult};
use crate::gpu::GpuContext;
use crate::params::LegacyUniforms;
use image::RgbaImage;
use tracing::debug;

pub struct LegacyFilterPipeline {
    kernel: GpuKernel,
}

impl LegacyFilterPipeline {
    pub async fn new(ctx: &GpuContext) -> DeviceResult<Self> {
        let mut kernel = GpuKernel::new(
            ctx,
            "legacy_filter",
            LEGACY_FILTER_SHADER,
            std::mem::size_of::<LegacyUniforms>() as u64,
        )
        .await?;

        let probe = LegacyUniforms {
            width: 1,
            height: 1,
            effect: LegacyEffect::Identity.shader_code(),
            intensity: 1.0,
        };
        kernel.calibrate(bytemuck::bytes_of(&probe)).await?;

        Ok(Self { kernel })
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.kernel.channel_order()
    }

    /// Apply `effect` at `intensity`
    pub async fn apply(
        &mut self,
        image: &RgbaImage,
        effect: LegacyEffect,
        intensity: f32,
    ) -> DispatchResult<RgbaImage> {
        let (width, height) = image.dimensions();
        debug!(width, height, effect = effect.name(), "Dispatching legacy effect on GPU");

        let uniforms = LegacyUniforms {
            width,
            height,
            effect: effect.shader_code(),
            intensity,
        };
        self.kernel.run(image, bytemuck::bytes_of(&uniforms)).await
    }
}

impl FilterBackend for LegacyFilterPipeline {
    fn name(&self) -> &'static str {
        "gpu-legacy"
    }

    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage> {
        match request {
            FilterRequest::Legacy { effect, intensity } => pollster::block_on(
                LegacyFilterPipeline::apply(self, image, *effect, *intensity),
            ),
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
    use crate::backends::CpuLegacyBackend;
    use crate::config::PowerPreference;
    use crate::shaders::gpu_filter::tests::{assert_close, gradient};

    #[tokio::test]
    async fn test_gpu_legacy_effects_match_cpu() {
        // This test requires a GPU, so it may be skipped in CI
        let ctx = match GpuContext::new("test_legacy_filter", PowerPreference::default()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                println!("Skipping test (no GPU): {}", e);
                return;
            }
        };
        let mut pipeline = LegacyFilterPipeline::new(&ctx).await.unwrap();
        let image = gradient(37, 21);

        for effect in LegacyEffect::ALL {
            let gpu = pipeline.apply(&image, effect, 0.5).await.unwrap();
            let cpu = CpuLegacyBackend::new().apply_effect(&image, effect, 0.5).unwrap();
            assert_close(&gpu, &cpu, effect.name());
        }
    }

    #[test]
    fn test_legacy_shader_validates() {
        let module = naga::front::wgsl::parse_str(LEGACY_FILTER_SHADER)
            .unwrap_or_else(|e| panic!("legacy_filter parse failed: {:?}", e));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("legacy_filter validation failed: {:?}", e));
    }

    #[test]
    fn test_shader_codes_fit_switch() {
        // The shader switches on codes 1..=4 and treats everything else as identity
        for effect in LegacyEffect::ALL {
            assert!(effect.shader_code() <= 4);
        }
        assert_eq!(LegacyEffect::Identity.shader_code(), 0);
    }
}
