// SPDX-License-Identifier: GPL-3.0-only

//! Per-pixel color math shared by the CPU backends
//!
//! These functions mirror `color_filter.wgsl` and `legacy_filter.wgsl`
//! line for line. `mix` uses the same `a * (1 - t) + b * t` form as WGSL so
//! that the endpoints `t = 0` and `t = 1` are exact.

use crate::catalog::LegacyEffect;
use crate::constants::{
    DEFAULT_LUMA_WEIGHTS, LEGACY_FADE_GRAY, LEGACY_FADE_STRENGTH, LEGACY_TONAL_COOL,
    LEGACY_TONAL_WARM,
};
use crate::params::ParameterBlock;

pub type Rgb = [f32; 3];

#[inline]
pub fn dot(a: Rgb, b: Rgb) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}

#[inline]
fn mul(a: Rgb, b: Rgb) -> Rgb {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2]]
}

#[inline]
pub fn unorm_to_f32(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
pub fn f32_to_unorm(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Generalized color filter for one pixel
///
/// Matrix, grayscale, invert and tint steps each run only when their weight
/// is positive. The master intensity blends the result against the original.
pub fn shade(params: &ParameterBlock, original: Rgb) -> Rgb {
    let mut adjusted = mul(original, params.channel_multipliers);
    let gray = dot(original, params.luma_weights);

    if params.matrix_mix > 0.0 {
        let matrix_color = params
            .matrix_rows
            .map(|row| dot(original, [row[0], row[1], row[2]]) + row[3]);
        adjusted = mix(adjusted, matrix_color, params.matrix_mix);
    }

    if params.grayscale_mix > 0.0 {
        adjusted = mix(adjusted, [gray; 3], params.grayscale_mix);
    }

    if params.invert_mix > 0.0 {
        let inverted = original.map(|c| 1.0 - c);
        adjusted = mix(adjusted, inverted, params.invert_mix);
    }

    if params.tint_intensity > 0.0 {
        let tinted = mul(adjusted, params.tint_color);
        adjusted = mix(adjusted, tinted, params.tint_intensity);
    }

    mix(original, adjusted, params.master_intensity)
}

/// Fixed legacy effect for one pixel
pub fn shade_legacy(effect: LegacyEffect, intensity: f32, color: Rgb) -> Rgb {
    let luma = dot(color, DEFAULT_LUMA_WEIGHTS);

    match effect {
        LegacyEffect::Identity => color,
        LegacyEffect::Desaturate => mix(color, [luma; 3], intensity),
        LegacyEffect::Fade => mix(
            color,
            [LEGACY_FADE_GRAY; 3],
            intensity * LEGACY_FADE_STRENGTH,
        ),
        LegacyEffect::Tonal => mix(
            color,
            [luma * LEGACY_TONAL_WARM, luma, luma * LEGACY_TONAL_COOL],
            intensity,
        ),
        LegacyEffect::Invert => mix(color, color.map(|c| 1.0 - c), intensity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Rgb = [0.8, 0.4, 0.1];

    #[test]
    fn test_mix_endpoints_exact() {
        let a = [0.1, 0.2, 0.3];
        let b = [0.9, 0.7, 0.5];
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
    }

    #[test]
    fn test_unorm_roundtrip_exact() {
        for v in 0..=255u8 {
            assert_eq!(f32_to_unorm(unorm_to_f32(v)), v);
        }
    }

    #[test]
    fn test_identity_block() {
        assert_eq!(shade(&ParameterBlock::IDENTITY, SAMPLE), SAMPLE);
    }

    #[test]
    fn test_matrix_with_bias() {
        let params = ParameterBlock {
            matrix_rows: [
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.1],
            ],
            matrix_mix: 1.0,
            ..ParameterBlock::IDENTITY
        };
        let out = shade(&params, SAMPLE);
        assert!((out[0] - 0.1).abs() < 1e-6);
        assert!((out[1] - 0.4).abs() < 1e-6);
        assert!((out[2] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_tint_scales_adjusted() {
        let params = ParameterBlock {
            tint_color: [1.0, 0.5, 0.0],
            tint_intensity: 1.0,
            ..ParameterBlock::IDENTITY
        };
        let out = shade(&params, SAMPLE);
        assert_eq!(out, [0.8, 0.2, 0.0]);
    }

    #[test]
    fn test_master_intensity_half() {
        let params = ParameterBlock {
            invert_mix: 1.0,
            master_intensity: 0.5,
            ..ParameterBlock::IDENTITY
        };
        let out = shade(&params, [1.0, 0.0, 0.5]);
        for c in out {
            assert!((c - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_legacy_effects() {
        assert_eq!(shade_legacy(LegacyEffect::Identity, 1.0, SAMPLE), SAMPLE);
        assert_eq!(shade_legacy(LegacyEffect::Invert, 0.0, SAMPLE), SAMPLE);

        let gray = shade_legacy(LegacyEffect::Desaturate, 1.0, SAMPLE);
        assert_eq!(gray[0], gray[1]);
        assert_eq!(gray[1], gray[2]);

        // Fade only travels half way to the fixed gray at full intensity
        let faded = shade_legacy(LegacyEffect::Fade, 1.0, [0.0, 0.0, 0.0]);
        assert!((faded[0] - 0.4).abs() < 1e-6);

        let tonal = shade_legacy(LegacyEffect::Tonal, 1.0, [0.5, 0.5, 0.5]);
        assert!(tonal[0] > tonal[1] && tonal[1] > tonal[2]);

        let inverted = shade_legacy(LegacyEffect::Invert, 1.0, [1.0, 0.0, 0.25]);
        assert_eq!(inverted, [0.0, 1.0, 0.75]);
    }
}
