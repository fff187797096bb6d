//! Gap configuration types.
//!
//! Inner gaps separate sibling containers, outer gaps inset every workspace
//! from its monitor edges.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A gap value that can be uniform, per-axis, or per-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum GapValue {
    /// Same value for all sides/axes.
    Uniform(u32),
    /// Different values per axis.
    PerAxis {
        /// Horizontal gap (between side-by-side containers).
        horizontal: u32,
        /// Vertical gap (between stacked containers).
        vertical: u32,
    },
    /// Different values per side.
    PerSide {
        /// Top gap.
        top: u32,
        /// Right gap.
        right: u32,
        /// Bottom gap.
        bottom: u32,
        /// Left gap.
        left: u32,
    },
}

impl Default for GapValue {
    fn default() -> Self { Self::Uniform(0) }
}

impl GapValue {
    /// Returns the gap values as (horizontal, vertical) for inner gaps.
    #[must_use]
    pub const fn as_inner(&self) -> (u32, u32) {
        match *self {
            Self::Uniform(v) => (v, v),
            Self::PerAxis { horizontal, vertical } => (horizontal, vertical),
            Self::PerSide { left, right, top, bottom } => ((left + right) / 2, (top + bottom) / 2),
        }
    }

    /// Returns the gap values as (top, right, bottom, left) for outer gaps.
    #[must_use]
    pub const fn as_outer(&self) -> (u32, u32, u32, u32) {
        match *self {
            Self::Uniform(v) => (v, v, v, v),
            Self::PerAxis { horizontal, vertical } => (vertical, horizontal, vertical, horizontal),
            Self::PerSide { top, right, bottom, left } => (top, right, bottom, left),
        }
    }
}

/// Gaps configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GapsConfig {
    /// Gaps between sibling containers.
    pub inner: GapValue,
    /// Gaps between a workspace and its monitor edges.
    pub outer: GapValue,
}
