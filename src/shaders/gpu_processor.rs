// SPDX-License-Identifier: GPL-3.0-only

//! Shared GPU processor infrastructure
//!
//! Both filter pipelines run the same shape of work: upload an RGBA texture,
//! dispatch a 16x16-tiled compute shader that packs one `u32` per pixel into
//! a storage buffer, copy it to a staging buffer and read it back. That loop
//! lives in [`GpuKernel`]; the pipelines only differ in shader source and
//! uniform contents.
//!
//! Readback goes through [`ChannelOrder`]: the kernel renders a known probe
//! pixel at construction and records whether the device hands back RGBA or
//! BGRA, and every result is normalized before it leaves this module.

use crate::backends::pixel_bytes;
use crate::constants::TILE_SIZE;
use crate::errors::{DeviceError, DeviceResult, DispatchError, DispatchResult};
use crate::gpu::{GpuContext, wgpu};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cached resource dimensions - avoids reallocation when dimensions match
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct CachedDimensions {
    pub width: u32,
    pub height: u32,
}

impl CachedDimensions {
    /// Check if dimensions have changed and need update
    pub fn needs_update(&self, width: u32, height: u32) -> bool {
        self.width != width || self.height != height
    }

    pub fn update(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Check if dimensions are initialized (non-zero)
    pub fn is_initialized(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Byte order of pixels read back from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgba,
    /// Red and blue swapped
    Bgra,
}

/// Probe pixel: pure opaque red
const PROBE_PIXEL: [u8; 4] = [255, 0, 0, 255];

impl ChannelOrder {
    /// Classify the readback of [`PROBE_PIXEL`]
    pub fn detect(readback: &[u8]) -> Option<Self> {
        match readback {
            [255, 0, 0, 255] => Some(ChannelOrder::Rgba),
            [0, 0, 255, 255] => Some(ChannelOrder::Bgra),
            _ => None,
        }
    }

    /// Rewrite `data` in place so it is RGBA
    pub fn normalize(&self, data: &mut [u8]) {
        if *self == ChannelOrder::Bgra {
            for px in data.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }
    }
}

/// Helper for async buffer readback (map, poll, read, unmap)
pub async fn read_buffer_async(
    device: &wgpu::Device,
    buffer: &wgpu::Buffer,
) -> Result<Vec<u8>, String> {
    let slice = buffer.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();

    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| format!("Failed to poll device: {:?}", e))?;

    receiver
        .await
        .map_err(|_| "Failed to receive buffer mapping".to_string())?
        .map_err(|e| format!("Failed to map buffer: {:?}", e))?;

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();

    Ok(data)
}

/// Number of workgroups needed to cover `dimension`
#[inline]
pub fn compute_dispatch_size(dimension: u32, workgroup_size: u32) -> u32 {
    dimension.div_ceil(workgroup_size)
}

/// Size-keyed slot for GPU resources that must be recreated on resize
#[derive(Debug)]
pub struct ResourceCache<R> {
    dims: CachedDimensions,
    value: Option<R>,
}

impl<R> Default for ResourceCache<R> {
    fn default() -> Self {
        Self {
            dims: CachedDimensions::default(),
            value: None,
        }
    }
}

impl<R> ResourceCache<R> {
    /// Resources for `width` x `height`, creating them if the size changed
    pub fn get_or_create(
        &mut self,
        width: u32,
        height: u32,
        create: impl FnOnce(u32, u32) -> R,
    ) -> &R {
        if !self.dims.is_initialized() || self.dims.needs_update(width, height) {
            self.dims.update(width, height);
            self.value = None;
        }
        self.value.get_or_insert_with(|| create(width, height))
    }

    pub fn get(&self) -> Option<&R> {
        self.value.as_ref()
    }

    /// Drop the resources so the next call reallocates them
    pub fn release(&mut self) {
        self.value = None;
        self.dims = CachedDimensions::default();
    }

    /// Pass `result` through, releasing the resources if it is an error
    pub fn release_on_err<T>(&mut self, result: DispatchResult<T>) -> DispatchResult<T> {
        if result.is_err() {
            self.release();
        }
        result
    }
}

/// Map the errors popped from the out-of-memory, validation and internal
/// scopes of one submission
pub fn scope_outcome(
    out_of_memory: Option<wgpu::Error>,
    validation: Option<wgpu::Error>,
    internal: Option<wgpu::Error>,
) -> DispatchResult<()> {
    if let Some(err) = out_of_memory {
        return Err(DispatchError::Allocation(err.to_string()));
    }
    if let Some(err) = validation {
        return Err(DispatchError::Validation(err.to_string()));
    }
    if let Some(err) = internal {
        return Err(DispatchError::Validation(format!("internal: {}", err)));
    }
    Ok(())
}

/// Size-dependent resources, recreated when the image size changes
struct KernelResources {
    input_texture: wgpu::Texture,
    output_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
}

impl KernelResources {
    fn new(device: &wgpu::Device, label: &'static str, width: u32, height: u32) -> Self {
        debug!(label, width, height, "Allocating filter kernel resources");

        let buffer_size = width as u64 * height as u64 * 4;

        let input_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            input_texture,
            output_buffer,
            staging_buffer,
        }
    }
}

/// A compiled filter shader plus its reusable GPU resources
///
/// The shader must declare `input_texture` at binding 0, the packed output
/// storage buffer at binding 1 and its uniform block at binding 2.
pub struct GpuKernel {
    label: &'static str,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    resources: ResourceCache<KernelResources>,
    channel_order: ChannelOrder,
}

impl GpuKernel {
    /// Compile `shader_source` and create the pipeline objects
    pub async fn new(
        ctx: &GpuContext,
        label: &'static str,
        shader_source: &str,
        uniform_size: u64,
    ) -> DeviceResult<Self> {
        let device = ctx.device.clone();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                // Input texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Packed RGBA output
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(DeviceError::ProbeFailed(format!(
                "{} pipeline creation: {}",
                label, err
            )));
        }

        info!(label, adapter = %ctx.info.adapter_name, "GPU filter kernel compiled");

        Ok(Self {
            label,
            device,
            queue: ctx.queue.clone(),
            pipeline,
            bind_group_layout,
            uniform_buffer,
            resources: ResourceCache::default(),
            channel_order: ChannelOrder::default(),
        })
    }

    /// Byte order detected by [`GpuKernel::calibrate`]
    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// Render the probe pixel and record the device's readback byte order
    ///
    /// `identity_uniforms` must describe a 1x1 image and an identity filter.
    pub async fn calibrate(&mut self, identity_uniforms: &[u8]) -> DeviceResult<()> {
        let probe = RgbaImage::from_raw(1, 1, PROBE_PIXEL.to_vec())
            .ok_or_else(|| DeviceError::ProbeFailed("probe image".to_string()))?;

        let raw = self
            .dispatch(&probe, identity_uniforms)
            .await
            .map_err(|e| DeviceError::ProbeFailed(e.to_string()))?;

        self.channel_order = ChannelOrder::detect(&raw).ok_or_else(|| {
            DeviceError::ProbeFailed(format!(
                "{} probe returned {:?}, expected a permutation of {:?}",
                self.label, raw, PROBE_PIXEL
            ))
        })?;

        if self.channel_order == ChannelOrder::Bgra {
            warn!(label = self.label, "GPU readback is BGRA, swapping red and blue");
        }
        debug!(label = self.label, order = ?self.channel_order, "Readback channel order");
        Ok(())
    }

    /// Filter `image` with the given uniform contents
    pub async fn run(&mut self, image: &RgbaImage, uniforms: &[u8]) -> DispatchResult<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(image.clone());
        }

        let mut data = self.dispatch(image, uniforms).await?;
        self.channel_order.normalize(&mut data);

        RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            DispatchError::Readback(format!("short readback for {}x{}", width, height))
        })
    }

    /// Upload, dispatch and read back raw device bytes
    ///
    /// Any failure drops the cached resources so a half-mapped staging
    /// buffer is never reused.
    async fn dispatch(&mut self, image: &RgbaImage, uniforms: &[u8]) -> DispatchResult<Vec<u8>> {
        let (width, height) = image.dimensions();
        let pixels = pixel_bytes(image)?;
        self.check_limits(width, height, pixels.len() as u64)?;

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.device.push_error_scope(wgpu::ErrorFilter::Internal);

        self.submit(width, height, pixels, uniforms);

        // Scopes pop in reverse push order
        let internal = self.device.pop_error_scope().await;
        let validation = self.device.pop_error_scope().await;
        let out_of_memory = self.device.pop_error_scope().await;

        let result = match scope_outcome(out_of_memory, validation, internal) {
            Ok(()) => self.read_back().await,
            Err(e) => Err(e),
        };
        self.resources.release_on_err(result)
    }

    /// Encode the upload, compute pass and staging copy and submit them
    fn submit(&mut self, width: u32, height: u32, pixels: &[u8], uniforms: &[u8]) {
        let device = &self.device;
        let label = self.label;
        let res = self
            .resources
            .get_or_create(width, height, |w, h| KernelResources::new(device, label, w, h));
        let buffer_size = pixels.len() as u64;

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &res.input_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.write_buffer(&self.uniform_buffer, 0, uniforms);

        let input_view = res
            .input_texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&input_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: res.output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, Some(&bind_group), &[]);
            compute_pass.dispatch_workgroups(
                compute_dispatch_size(width, TILE_SIZE),
                compute_dispatch_size(height, TILE_SIZE),
                1,
            );
        }

        encoder.copy_buffer_to_buffer(&res.output_buffer, 0, &res.staging_buffer, 0, buffer_size);

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    async fn read_back(&self) -> DispatchResult<Vec<u8>> {
        let res = self
            .resources
            .get()
            .ok_or_else(|| DispatchError::Allocation("resources not allocated".to_string()))?;

        read_buffer_async(&self.device, &res.staging_buffer)
            .await
            .map_err(DispatchError::Readback)
    }

    fn check_limits(&self, width: u32, height: u32, byte_len: u64) -> DispatchResult<()> {
        let limits = self.device.limits();
        if width > limits.max_texture_dimension_2d || height > limits.max_texture_dimension_2d {
            return Err(DispatchError::InvalidInput(format!(
                "{}x{} exceeds max texture dimension {}",
                width, height, limits.max_texture_dimension_2d
            )));
        }
        if byte_len > limits.max_buffer_size
            || byte_len > limits.max_storage_buffer_binding_size as u64
        {
            return Err(DispatchError::Allocation(format!(
                "{} byte output exceeds device buffer limits",
                byte_len
            )));
        }
        Ok(())
    }
}
