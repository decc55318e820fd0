// SPDX-License-Identifier: GPL-3.0-only

//! Parameter resolution
//!
//! [`resolve`] turns a descriptor's `shaderConstants` into a fixed-shape
//! [`ParameterBlock`]. Every field starts at its identity default and is only
//! overwritten by a well-formed constant, so a block is never partially
//! defined no matter what the catalog contains.
//!
//! Recognized keys:
//!
//! | key | shape | field |
//! |-----|-------|-------|
//! | `luminance` | `[f, f, f]` | luma weights |
//! | `colorMatrix` | `[[f, f, f, f]; ≤3]` | matrix rows (each optional) |
//! | `redMultiplier` / `greenMultiplier` / `blueMultiplier` | `f` | channel multipliers |
//! | `tintColor` | `[f, f, f]` | tint color |
//! | `tintIntensity` | `f` | tint intensity |
//! | `matrixMix` / `grayscaleMix` / `invertMix` | `f` | mix weights |
//! | `intensity` | `f` | master intensity |

use crate::catalog::{DynamicValue, FilterDescriptor};
use crate::constants::DEFAULT_LUMA_WEIGHTS;
use tracing::debug;

/// Identity rows for the affine color matrix
pub const IDENTITY_MATRIX: [[f32; 4]; 3] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

/// Numeric parameters for the generalized color kernel
///
/// Created fresh for each filter application and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBlock {
    /// Rows of a 3x3 matrix plus bias in the last component
    pub matrix_rows: [[f32; 4]; 3],
    /// Weights converting rgb to gray
    pub luma_weights: [f32; 3],
    pub tint_color: [f32; 3],
    pub tint_intensity: f32,
    pub channel_multipliers: [f32; 3],
    /// Final blend between original and filtered color
    pub master_intensity: f32,
    pub matrix_mix: f32,
    pub grayscale_mix: f32,
    pub invert_mix: f32,
}

impl Default for ParameterBlock {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ParameterBlock {
    /// A block that leaves every pixel unchanged
    pub const IDENTITY: ParameterBlock = ParameterBlock {
        matrix_rows: IDENTITY_MATRIX,
        luma_weights: DEFAULT_LUMA_WEIGHTS,
        tint_color: [1.0, 1.0, 1.0],
        tint_intensity: 0.0,
        channel_multipliers: [1.0, 1.0, 1.0],
        master_intensity: 1.0,
        matrix_mix: 0.0,
        grayscale_mix: 0.0,
        invert_mix: 0.0,
    };

    /// Whether applying this block is a guaranteed no-op
    pub fn is_identity(&self) -> bool {
        self.master_intensity == 0.0
            || (self.channel_multipliers == [1.0, 1.0, 1.0]
                && self.matrix_mix <= 0.0
                && self.grayscale_mix <= 0.0
                && self.invert_mix <= 0.0
                && self.tint_intensity <= 0.0)
    }

    /// Pack into the uniform layout shared with the compute shader
    pub fn to_uniforms(&self, width: u32, height: u32) -> FilterUniforms {
        let [m0, m1, m2] = self.matrix_rows;
        let [lr, lg, lb] = self.luma_weights;
        let [tr, tg, tb] = self.tint_color;
        let [cr, cg, cb] = self.channel_multipliers;

        FilterUniforms {
            size: [width, height, 0, 0],
            matrix_r: m0,
            matrix_g: m1,
            matrix_b: m2,
            luma: [lr, lg, lb, 0.0],
            tint: [tr, tg, tb, self.tint_intensity],
            channel: [cr, cg, cb, self.master_intensity],
            mix_weights: [self.matrix_mix, self.grayscale_mix, self.invert_mix, 0.0],
        }
    }
}

/// Uniform buffer for the color filter shader
///
/// Every member is 16 bytes so the layout matches WGSL uniform rules without
/// explicit padding fields.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FilterUniforms {
    /// width, height, unused, unused
    pub size: [u32; 4],
    pub matrix_r: [f32; 4],
    pub matrix_g: [f32; 4],
    pub matrix_b: [f32; 4],
    /// rgb weights, unused
    pub luma: [f32; 4],
    /// rgb color, intensity
    pub tint: [f32; 4],
    /// rgb multipliers, master intensity
    pub channel: [f32; 4],
    /// matrix, grayscale, invert, unused
    pub mix_weights: [f32; 4],
}

/// Uniform buffer for the legacy effect shader
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LegacyUniforms {
    pub width: u32,
    pub height: u32,
    pub effect: u32,
    pub intensity: f32,
}

/// Resolve a descriptor's shader constants into a parameter block
///
/// Pure and thread-safe; unknown keys are ignored and malformed values leave
/// the corresponding default in place.
pub fn resolve(descriptor: &FilterDescriptor) -> ParameterBlock {
    let mut block = ParameterBlock::IDENTITY;
    if descriptor.shader_constants.is_none() {
        return block;
    }

    let scalar = |key: &str| -> Option<f32> {
        let value = descriptor.constant(key)?;
        let number = value.as_f32();
        if number.is_none() {
            debug!(id = %descriptor.id, key, ?value, "Ignoring non-numeric shader constant");
        }
        number
    };
    let triple = |key: &str| -> Option<[f32; 3]> {
        let value = descriptor.constant(key)?;
        let array = value.as_f32_array::<3>();
        if array.is_none() {
            debug!(id = %descriptor.id, key, ?value, "Ignoring malformed shader constant array");
        }
        array
    };

    if let Some(luma) = triple("luminance") {
        block.luma_weights = luma;
    }

    if let Some(rows) = descriptor.constant("colorMatrix").and_then(DynamicValue::as_array) {
        for (slot, row) in block.matrix_rows.iter_mut().zip(rows) {
            match row.as_f32_array::<4>() {
                Some(values) => *slot = values,
                None => debug!(id = %descriptor.id, ?row, "Ignoring malformed color matrix row"),
            }
        }
    }

    let channel_keys = ["redMultiplier", "greenMultiplier", "blueMultiplier"];
    for (slot, key) in block.channel_multipliers.iter_mut().zip(channel_keys) {
        if let Some(v) = scalar(key) {
            *slot = v;
        }
    }

    if let Some(tint) = triple("tintColor") {
        block.tint_color = tint;
    }
    if let Some(v) = scalar("tintIntensity") {
        block.tint_intensity = v;
    }
    if let Some(v) = scalar("matrixMix") {
        block.matrix_mix = v;
    }
    if let Some(v) = scalar("grayscaleMix") {
        block.grayscale_mix = v;
    }
    if let Some(v) = scalar("invertMix") {
        block.invert_mix = v;
    }
    if let Some(v) = scalar("intensity") {
        block.master_intensity = v;
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BackendKind, ValueMap};

    fn descriptor_with(json: &str) -> FilterDescriptor {
        let constants: ValueMap = serde_json::from_str(json).unwrap();
        FilterDescriptor {
            shader_constants: Some(constants),
            ..FilterDescriptor::new("t", "T", "", BackendKind::ComputePipeline, 0)
        }
    }

    #[test]
    fn test_missing_constants_resolve_to_identity() {
        let desc = FilterDescriptor::new("t", "T", "", BackendKind::ComputePipeline, 0);
        let block = resolve(&desc);
        assert_eq!(block, ParameterBlock::IDENTITY);
        assert!(block.is_identity());
        assert_eq!(block.luma_weights, [0.299, 0.587, 0.114]);
    }

    #[test]
    fn test_all_keys() {
        let block = resolve(&descriptor_with(
            r#"{
                "luminance": [0.2, 0.7, 0.1],
                "colorMatrix": [[0, 0, 1, 0], [0, 1, 0, 0], [1, 0, 0, 0.5]],
                "redMultiplier": 1.5,
                "greenMultiplier": 2,
                "blueMultiplier": 0.5,
                "tintColor": [1, 0.5, 0.25],
                "tintIntensity": 0.4,
                "matrixMix": 0.3,
                "grayscaleMix": 0.2,
                "invertMix": 0.1,
                "intensity": 0.75
            }"#,
        ));

        assert_eq!(block.luma_weights, [0.2, 0.7, 0.1]);
        assert_eq!(block.matrix_rows[0], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(block.matrix_rows[2], [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(block.channel_multipliers, [1.5, 2.0, 0.5]);
        assert_eq!(block.tint_color, [1.0, 0.5, 0.25]);
        assert_eq!(block.tint_intensity, 0.4);
        assert_eq!(block.matrix_mix, 0.3);
        assert_eq!(block.grayscale_mix, 0.2);
        assert_eq!(block.invert_mix, 0.1);
        assert_eq!(block.master_intensity, 0.75);
    }

    #[test]
    fn test_partial_arrays_keep_defaults() {
        let block = resolve(&descriptor_with(
            r#"{ "luminance": [0.5, 0.5], "tintColor": [1, "red", 0] }"#,
        ));
        assert_eq!(block.luma_weights, DEFAULT_LUMA_WEIGHTS);
        assert_eq!(block.tint_color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_matrix_rows_independent() {
        let block = resolve(&descriptor_with(
            r#"{ "colorMatrix": [[1, 2, 3], [4, 5, 6, 7]] }"#,
        ));
        // First row too short: stays identity. Second row applied. Third absent.
        assert_eq!(block.matrix_rows[0], IDENTITY_MATRIX[0]);
        assert_eq!(block.matrix_rows[1], [4.0, 5.0, 6.0, 7.0]);
        assert_eq!(block.matrix_rows[2], IDENTITY_MATRIX[2]);
    }

    #[test]
    fn test_mix_not_clamped() {
        let block = resolve(&descriptor_with(r#"{ "invertMix": 1.5, "matrixMix": -0.5 }"#));
        assert_eq!(block.invert_mix, 1.5);
        assert_eq!(block.matrix_mix, -0.5);
    }

    #[test]
    fn test_wrong_types_and_unknown_keys_ignored() {
        let block = resolve(&descriptor_with(
            r#"{ "intensity": "high", "grayscaleMix": null, "sparkle": 3, "colorMatrix": 7 }"#,
        ));
        assert_eq!(block, ParameterBlock::IDENTITY);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let desc = descriptor_with(r#"{ "invertMix": 1 }"#);
        assert_eq!(resolve(&desc), resolve(&desc));
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<FilterUniforms>(), 128);
        assert_eq!(std::mem::size_of::<LegacyUniforms>(), 16);

        let uniforms = ParameterBlock::IDENTITY.to_uniforms(4, 2);
        assert_eq!(uniforms.size, [4, 2, 0, 0]);
        assert_eq!(uniforms.channel, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniforms.mix_weights, [0.0; 4]);
    }

    #[test]
    fn test_zero_master_intensity_is_identity() {
        let block = ParameterBlock {
            invert_mix: 1.0,
            master_intensity: 0.0,
            ..ParameterBlock::IDENTITY
        };
        assert!(block.is_identity());
    }
}
