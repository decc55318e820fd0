// SPDX-License-Identifier: GPL-3.0-only

//! Filter descriptor records

use super::value::{DynamicValue, ValueMap};
use serde::{Deserialize, Serialize};

/// Which rendering path a descriptor is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Generalized color-matrix kernel driven by `shaderConstants`
    ComputePipeline,
    /// Fixed five-effect kernel kept for older catalogs
    LegacyPipeline,
    /// No rendering; the input image is returned as-is
    None,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::ComputePipeline => "compute-pipeline",
            BackendKind::LegacyPipeline => "legacy-pipeline",
            BackendKind::None => "none",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effects understood by the legacy backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyEffect {
    #[default]
    Identity,
    /// Blend toward luma
    Desaturate,
    /// Blend toward a fixed light gray
    Fade,
    /// Blend toward a warm/cool shifted luma triple
    Tonal,
    /// Blend toward the inverted color
    Invert,
}

impl LegacyEffect {
    pub const ALL: [LegacyEffect; 5] = [
        LegacyEffect::Identity,
        LegacyEffect::Desaturate,
        LegacyEffect::Fade,
        LegacyEffect::Tonal,
        LegacyEffect::Invert,
    ];

    /// Parse an effect name; unknown names map to `Identity`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "desaturate" | "noir" => LegacyEffect::Desaturate,
            "fade" => LegacyEffect::Fade,
            "tonal" => LegacyEffect::Tonal,
            "invert" => LegacyEffect::Invert,
            _ => LegacyEffect::Identity,
        }
    }

    /// Map the numeric filter codes used by older catalogs
    ///
    /// Only the even codes had a legacy kernel; everything else is identity.
    pub fn from_legacy_code(code: i64) -> Self {
        match code {
            2 => LegacyEffect::Desaturate,
            4 => LegacyEffect::Fade,
            6 => LegacyEffect::Tonal,
            8 => LegacyEffect::Invert,
            _ => LegacyEffect::Identity,
        }
    }

    /// Value written to the legacy shader uniform
    pub fn shader_code(&self) -> u32 {
        match self {
            LegacyEffect::Identity => 0,
            LegacyEffect::Desaturate => 1,
            LegacyEffect::Fade => 2,
            LegacyEffect::Tonal => 3,
            LegacyEffect::Invert => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LegacyEffect::Identity => "identity",
            LegacyEffect::Desaturate => "desaturate",
            LegacyEffect::Fade => "fade",
            LegacyEffect::Tonal => "tonal",
            LegacyEffect::Invert => "invert",
        }
    }
}

/// One entry of the filter catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Stable key
    pub id: String,
    /// Display label
    pub name: String,
    /// Free-form classification
    #[serde(default)]
    pub category: String,
    pub backend: BackendKind,
    /// Sort key, not necessarily unique
    pub order: i64,
    #[serde(default)]
    pub parameters: ValueMap,
    /// Numeric constants consumed by the parameter resolver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shader_constants: Option<ValueMap>,
}

impl FilterDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        backend: BackendKind,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            backend,
            order,
            parameters: ValueMap::new(),
            shader_constants: None,
        }
    }

    /// Add an entry to `parameters`
    pub fn with_parameter(mut self, key: &str, value: impl Into<DynamicValue>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Add an entry to `shaderConstants`, creating the map if needed
    pub fn with_constant(mut self, key: &str, value: impl Into<DynamicValue>) -> Self {
        self.shader_constants
            .get_or_insert_with(ValueMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Look up a shader constant
    pub fn constant(&self, key: &str) -> Option<&DynamicValue> {
        self.shader_constants.as_ref()?.get(key)
    }

    /// Effect drawn by the legacy backend
    ///
    /// `parameters.effect` (a name) takes precedence over the older numeric
    /// `parameters.filterType`. Descriptors naming neither draw identity.
    pub fn legacy_effect(&self) -> LegacyEffect {
        if let Some(name) = self.parameters.get("effect").and_then(DynamicValue::as_str) {
            return LegacyEffect::from_name(name);
        }

        self.parameters
            .get("filterType")
            .and_then(DynamicValue::as_i64)
            .map(LegacyEffect::from_legacy_code)
            .unwrap_or_default()
    }
}
