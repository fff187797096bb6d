//! Gap values resolved for layout calculations.
//!
//! Inner gaps separate siblings along a split's axis. Outer gaps, plus the
//! space reserved for the bar, inset a workspace from its monitor.

use crate::config::{BarPosition, WmConfig};
use crate::tiling::state::{Layout, Rect};

/// Gap values for layout calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gaps {
    /// Gap between side-by-side siblings.
    pub inner_h: f64,
    /// Gap between stacked siblings.
    pub inner_v: f64,
    pub outer_top: f64,
    pub outer_right: f64,
    pub outer_bottom: f64,
    pub outer_left: f64,
}

impl Gaps {
    /// Create new gaps with all values set to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            inner_h: 0.0,
            inner_v: 0.0,
            outer_top: 0.0,
            outer_right: 0.0,
            outer_bottom: 0.0,
            outer_left: 0.0,
        }
    }

    /// Create gaps with uniform inner and outer values.
    #[must_use]
    pub const fn uniform(inner: f64, outer: f64) -> Self {
        Self {
            inner_h: inner,
            inner_v: inner,
            outer_top: outer,
            outer_right: outer,
            outer_bottom: outer,
            outer_left: outer,
        }
    }

    /// Inner gap along the given axis.
    #[must_use]
    pub const fn inner(&self, axis: Layout) -> f64 {
        match axis {
            Layout::Horizontal => self.inner_h,
            Layout::Vertical => self.inner_v,
        }
    }

    /// Apply outer gaps to a monitor frame, returning the workspace area.
    #[must_use]
    pub fn apply_outer(&self, frame: &Rect) -> Rect {
        frame.inset(self.outer_top, self.outer_right, self.outer_bottom, self.outer_left)
    }

    /// Adds an offset to the top outer gap.
    #[must_use]
    pub const fn with_top_offset(mut self, offset: f64) -> Self {
        self.outer_top += offset;
        self
    }

    /// Adds an offset to the bottom outer gap.
    #[must_use]
    pub const fn with_bottom_offset(mut self, offset: f64) -> Self {
        self.outer_bottom += offset;
        self
    }

    /// Resolves gaps from configuration, reserving the bar's height on the
    /// edge it is docked to.
    #[must_use]
    pub fn from_config(config: &WmConfig) -> Self {
        let (inner_h, inner_v) = config.gaps.inner.as_inner();
        let (top, right, bottom, left) = config.gaps.outer.as_outer();
        let gaps = Self {
            inner_h: f64::from(inner_h),
            inner_v: f64::from(inner_v),
            outer_top: f64::from(top),
            outer_right: f64::from(right),
            outer_bottom: f64::from(bottom),
            outer_left: f64::from(left),
        };

        let bar = f64::from(config.bar.height);
        match config.bar.position {
            BarPosition::Top => gaps.with_top_offset(bar),
            BarPosition::Bottom => gaps.with_bottom_offset(bar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BarConfig, GapValue, GapsConfig};

    #[test]
    fn test_apply_outer() {
        let gaps = Gaps::uniform(5.0, 10.0);
        let area = gaps.apply_outer(&Rect::new(0.0, 0.0, 1920.0, 1080.0));
        assert!(area.approx_eq(&Rect::new(10.0, 10.0, 1900.0, 1060.0), 0.001));
    }

    #[test]
    fn test_from_config_reserves_bar_space() {
        let config = WmConfig {
            gaps: GapsConfig {
                inner: GapValue::PerAxis { horizontal: 8, vertical: 4 },
                outer: GapValue::Uniform(6),
            },
            bar: BarConfig { height: 30, position: BarPosition::Top },
            ..Default::default()
        };
        let gaps = Gaps::from_config(&config);

        assert!((gaps.outer_top - 36.0).abs() < f64::EPSILON);
        assert!((gaps.outer_bottom - 6.0).abs() < f64::EPSILON);
        assert!((gaps.inner(Layout::Horizontal) - 8.0).abs() < f64::EPSILON);
        assert!((gaps.inner(Layout::Vertical) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_config_bottom_bar() {
        let config = WmConfig {
            bar: BarConfig { height: 24, position: BarPosition::Bottom },
            ..Default::default()
        };
        let gaps = Gaps::from_config(&config);
        assert!((gaps.outer_bottom - 24.0).abs() < f64::EPSILON);
        assert!(gaps.outer_top.abs() < f64::EPSILON);
    }
}
