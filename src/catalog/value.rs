// SPDX-License-Identifier: GPL-3.0-only

//! Heterogeneous configuration values decoded from the catalog source
//!
//! Descriptor `parameters` and `shaderConstants` are free-form JSON objects.
//! They decode into [`DynamicValue`], and consumers pull typed fields out with
//! the total conversion helpers below instead of probing types at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed map of dynamic values
pub type ValueMap = BTreeMap<String, DynamicValue>;

/// Tagged union over the value shapes a JSON catalog can carry
///
/// Integers and floats are kept apart so that integer-only fields (legacy
/// `filterType`) can be told from numeric ones, but [`DynamicValue::as_f32`]
/// accepts both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    /// JSON `null` or an absent value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<DynamicValue>),
    Map(ValueMap),
}

impl DynamicValue {
    /// Integer value; floats are not truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as f64, from either an integer or a float literal
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Int(i) => Some(*i as f64),
            DynamicValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric value as f32, rejecting non-finite results
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// First `N` elements of a numeric array
    ///
    /// Returns `None` if this is not an array, if it has fewer than `N`
    /// elements, or if any of the first `N` elements is not a number.
    /// Elements past `N` are ignored.
    pub fn as_f32_array<const N: usize>(&self) -> Option<[f32; N]> {
        let items = self.as_array()?;
        if items.len() < N {
            return None;
        }

        let mut out = [0.0f32; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f32()?;
        }
        Some(out)
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Int(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Float(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_string())
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        DynamicValue::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> DynamicValue {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_variants() {
        assert_eq!(parse("null"), DynamicValue::Null);
        assert_eq!(parse("true"), DynamicValue::Bool(true));
        assert_eq!(parse("3"), DynamicValue::Int(3));
        assert_eq!(parse("0.5"), DynamicValue::Float(0.5));
        assert_eq!(parse("\"fade\""), DynamicValue::String("fade".into()));
        assert!(matches!(parse("[1, 2.5]"), DynamicValue::Array(_)));
        assert!(matches!(parse("{\"a\": 1}"), DynamicValue::Map(_)));
    }

    #[test]
    fn test_numeric_coercion() {
        // Integer literals are accepted wherever a number is expected
        assert_eq!(parse("1").as_f32(), Some(1.0));
        assert_eq!(parse("0.25").as_f32(), Some(0.25));
        assert_eq!(parse("\"1\"").as_f32(), None);
        assert_eq!(parse("true").as_f32(), None);
        // Floats are never truncated into integers
        assert_eq!(parse("2.0").as_i64(), None);
    }

    #[test]
    fn test_f32_array() {
        assert_eq!(
            parse("[0.2, 0.7, 0]").as_f32_array::<3>(),
            Some([0.2, 0.7, 0.0])
        );
        // Extra elements are ignored
        assert_eq!(parse("[1, 2, 3, 4]").as_f32_array::<3>(), Some([1.0, 2.0, 3.0]));
        // Too short or non-numeric is rejected as a whole
        assert_eq!(parse("[1, 2]").as_f32_array::<3>(), None);
        assert_eq!(parse("[1, \"x\", 3]").as_f32_array::<3>(), None);
        assert_eq!(parse("4").as_f32_array::<3>(), None);
    }

    #[test]
    fn test_huge_float_is_not_finite() {
        assert_eq!(DynamicValue::Float(1e300).as_f32(), None);
    }
}
