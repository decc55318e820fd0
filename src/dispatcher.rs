// SPDX-License-Identifier: GPL-3.0-only

//! Filter dispatch
//!
//! Routes a [`FilterDescriptor`] to the backend named by its `backend` field.
//! The dispatcher holds one compute and one legacy backend; a failed dispatch
//! is logged and reported as `None` by [`FilterDispatcher::apply_filter`] so a
//! bad filter never takes down the caller.

use crate::backends::{CpuComputeBackend, CpuLegacyBackend, FilterBackend, FilterRequest};
use crate::catalog::{BackendKind, FilterDescriptor};
use crate::config::Config;
use crate::errors::{DeviceResult, DispatchResult};
use crate::gpu::GpuContext;
use crate::params;
use crate::shaders::{ComputeFilterPipeline, LegacyFilterPipeline};
use image::RgbaImage;
use tracing::{debug, info, warn};

/// Owns the backends for one editing session
pub struct FilterDispatcher {
    compute: Box<dyn FilterBackend>,
    legacy: Box<dyn FilterBackend>,
}

impl std::fmt::Debug for FilterDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDispatcher")
            .field("compute", &self.compute.name())
            .field("legacy", &self.legacy.name())
            .finish()
    }
}

impl FilterDispatcher {
    /// GPU backends sharing one device
    pub async fn gpu(config: &Config) -> DeviceResult<Self> {
        let ctx = GpuContext::new("photofx", config.power_preference).await?;
        let compute = ComputeFilterPipeline::new(&ctx).await?;
        let legacy = LegacyFilterPipeline::new(&ctx).await?;

        info!(
            adapter = %ctx.info.adapter_name,
            compute_order = ?compute.channel_order(),
            legacy_order = ?legacy.channel_order(),
            "GPU filter backends ready"
        );

        Ok(Self::with_backends(Box::new(compute), Box::new(legacy)))
    }

    /// CPU reference backends
    pub fn cpu() -> Self {
        Self::with_backends(
            Box::new(CpuComputeBackend::new()),
            Box::new(CpuLegacyBackend::new()),
        )
    }

    pub fn with_backends(compute: Box<dyn FilterBackend>, legacy: Box<dyn FilterBackend>) -> Self {
        Self { compute, legacy }
    }

    /// Names of the compute and legacy backends
    pub fn backend_names(&self) -> (&'static str, &'static str) {
        (self.compute.name(), self.legacy.name())
    }

    /// Apply `descriptor` to `image`, reporting why it failed
    pub fn try_apply_filter(
        &mut self,
        image: &RgbaImage,
        descriptor: &FilterDescriptor,
    ) -> DispatchResult<RgbaImage> {
        match descriptor.backend {
            BackendKind::None => Ok(image.clone()),
            BackendKind::ComputePipeline => {
                let block = params::resolve(descriptor);
                debug!(id = %descriptor.id, backend = self.compute.name(), "Dispatching filter");
                self.compute.apply(image, &FilterRequest::Compute(block))
            }
            BackendKind::LegacyPipeline => {
                let request = FilterRequest::Legacy {
                    effect: descriptor.legacy_effect(),
                    intensity: params::resolve(descriptor).master_intensity,
                };
                debug!(id = %descriptor.id, backend = self.legacy.name(), "Dispatching filter");
                self.legacy.apply(image, &request)
            }
        }
    }

    /// Apply `descriptor` to `image`, or `None` if the backend failed
    pub fn apply_filter(
        &mut self,
        image: &RgbaImage,
        descriptor: &FilterDescriptor,
    ) -> Option<RgbaImage> {
        match self.try_apply_filter(image, descriptor) {
            Ok(out) => Some(out),
            Err(e) => {
                warn!(id = %descriptor.id, backend = %descriptor.backend, error = %e, "Filter failed");
                None
            }
        }
    }
}
