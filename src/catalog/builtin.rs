// SPDX-License-Identifier: GPL-3.0-only

//! Built-in filter table used when no catalog source can be loaded

use super::descriptor::{BackendKind, FilterDescriptor};

/// Version tag reported by a catalog built from this table
pub const BUILTIN_VERSION: &str = "builtin";

/// Sepia tone matrix (rows: r, g, b; last column is bias)
const SEPIA_MATRIX: [[f64; 4]; 3] = [
    [0.393, 0.769, 0.189, 0.0],
    [0.349, 0.686, 0.168, 0.0],
    [0.272, 0.534, 0.131, 0.0],
];

/// The nine fallback descriptors: identity at order 0 plus eight styles
pub fn builtin_descriptors() -> Vec<FilterDescriptor> {
    vec![
        FilterDescriptor::new("original", "Original", "basic", BackendKind::None, 0),
        FilterDescriptor::new("sepia", "Sepia", "vintage", BackendKind::ComputePipeline, 1)
            .with_parameter("filterType", 1i64)
            .with_constant("colorMatrix", matrix(SEPIA_MATRIX))
            .with_constant("matrixMix", 1.0),
        FilterDescriptor::new("noir", "Noir", "monochrome", BackendKind::LegacyPipeline, 2)
            .with_parameter("filterType", 2i64)
            .with_parameter("effect", "desaturate"),
        FilterDescriptor::new("chrome", "Chrome", "color", BackendKind::ComputePipeline, 3)
            .with_parameter("filterType", 3i64)
            .with_constant("redMultiplier", 1.12)
            .with_constant("greenMultiplier", 1.05)
            .with_constant("blueMultiplier", 0.95)
            .with_constant("intensity", 0.9),
        FilterDescriptor::new("fade", "Fade", "vintage", BackendKind::LegacyPipeline, 4)
            .with_parameter("filterType", 4i64)
            .with_parameter("effect", "fade"),
        FilterDescriptor::new("mono", "Mono", "monochrome", BackendKind::ComputePipeline, 5)
            .with_parameter("filterType", 5i64)
            .with_constant("luminance", vec![0.299, 0.587, 0.114])
            .with_constant("grayscaleMix", 1.0),
        FilterDescriptor::new("tonal", "Tonal", "monochrome", BackendKind::LegacyPipeline, 6)
            .with_parameter("filterType", 6i64)
            .with_parameter("effect", "tonal"),
        FilterDescriptor::new("transfer", "Transfer", "color", BackendKind::ComputePipeline, 7)
            .with_parameter("filterType", 7i64)
            .with_constant("tintColor", vec![1.0, 0.85, 0.7])
            .with_constant("tintIntensity", 0.6)
            .with_constant("grayscaleMix", 0.3),
        FilterDescriptor::new("invert", "Invert", "creative", BackendKind::ComputePipeline, 8)
            .with_parameter("filterType", 8i64)
            .with_constant("invertMix", 1.0)
            .with_constant("intensity", 1.0),
    ]
}

fn matrix(rows: [[f64; 4]; 3]) -> Vec<Vec<f64>> {
    rows.iter().map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_shape() {
        let descriptors = builtin_descriptors();
        assert_eq!(descriptors.len(), 9);

        let identity: Vec<_> = descriptors
            .iter()
            .filter(|d| d.backend == BackendKind::None)
            .collect();
        assert_eq!(identity.len(), 1);
        assert_eq!(identity[0].order, 0);

        // Both rendering paths are represented
        assert!(descriptors.iter().any(|d| d.backend == BackendKind::ComputePipeline));
        assert!(descriptors.iter().any(|d| d.backend == BackendKind::LegacyPipeline));
    }

    #[test]
    fn test_builtin_ids_unique() {
        let descriptors = builtin_descriptors();
        let mut ids: Vec<_> = descriptors.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), descriptors.len());
    }
}
