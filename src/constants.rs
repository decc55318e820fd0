// SPDX-License-Identifier: GPL-3.0-only

//! Engine-wide constants

/// Rec. 601 luma weights used when a descriptor does not supply its own
pub const DEFAULT_LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Side length of the square pixel tile processed by one workgroup
///
/// Must match `@workgroup_size` in the WGSL kernels.
pub const TILE_SIZE: u32 = 16;

/// Gray level the legacy fade effect blends toward
pub const LEGACY_FADE_GRAY: f32 = 0.8;

/// Fraction of the requested intensity applied by the legacy fade effect
pub const LEGACY_FADE_STRENGTH: f32 = 0.5;

/// Red and blue scale applied to luma by the legacy tonal effect
pub const LEGACY_TONAL_WARM: f32 = 1.1;
pub const LEGACY_TONAL_COOL: f32 = 0.9;

/// Default longest side of preview thumbnails
pub const DEFAULT_PREVIEW_SIZE: u32 = 160;

/// Log filter used when neither RUST_LOG nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "warn";
