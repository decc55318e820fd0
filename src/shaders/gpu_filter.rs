// SPDX-License-Identifier: GPL-3.0-only
//! GPU-accelerated generalized color filter
//!
//! Runs `color_filter.wgsl` over an RGBA image with the uniforms packed from a
//! resolved [`ParameterBlock`]. Identity, desaturation, color matrices,
//! tinting and inversion all go through this one kernel.

use super::COLOR_FILTER_SHADER;
use super::gpu_processor::{ChannelOrder, GpuKernel};
use crate::backends::{FilterBackend, FilterRequest};
use crate::errors::{DeviceResult, DispatchError, DispatchResult};
use crate::gpu::GpuContext;
use crate::params::{FilterUniforms, ParameterBlock};
use image::RgbaImage;
use tracing::debug;

/// GPU pipeline for the generalized color kernel
pub struct ComputeFilterPipeline {
    kernel: GpuKernel,
}

impl ComputeFilterPipeline {
    /// Compile the kernel on `ctx` and probe the readback channel order
    pub async fn new(ctx: &GpuContext) -> DeviceResult<Self> {
        let mut kernel = GpuKernel::new(
            ctx,
            "color_filter",
            COLOR_FILTER_SHADER,
            std::mem::size_of::<FilterUniforms>() as u64,
        )
        .await?;

        let probe = ParameterBlock::IDENTITY.to_uniforms(1, 1);
        kernel.calibrate(bytemuck::bytes_of(&probe)).await?;

        Ok(Self { kernel })
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.kernel.channel_order()
    }

    /// Filter `image` with `params`
    pub async fn apply(
        &mut self,
        image: &RgbaImage,
        params: &ParameterBlock,
    ) -> DispatchResult<RgbaImage> {
        let (width, height) = image.dimensions();
        debug!(width, height, "Dispatching color filter on GPU");

        let uniforms = params.to_uniforms(width, height);
        self.kernel.run(image, bytemuck::bytes_of(&uniforms)).await
    }
}

impl FilterBackend for ComputeFilterPipeline {
    fn name(&self) -> &'static str {
        "gpu-compute"
    }

    fn apply(&mut self, image: &RgbaImage, request: &FilterRequest) -> DispatchResult<RgbaImage> {
        match request {
            FilterRequest::Compute(params) => {
                pollster::block_on(ComputeFilterPipeline::apply(self, image, params))
            }
            other => Err(DispatchError::Unsupported {
                backend: self.name(),
                reason: format!("{} request", other.kind()),
            }),
        }
    }
}
