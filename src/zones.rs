//! Snap zone geometry.
//!
//! [`compute_zones`] derives the fixed set of named target rectangles from
//! the viewport size.  [`ZoneCache`] wraps it so high-frequency callers only
//! pay for the computation when the viewport actually changes.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a zone does to a window that lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    Fullscreen,
    Corner,
}

impl ZoneKind {
    /// Left/right halves only touch the horizontal axis.
    pub fn is_horizontal_half(self) -> bool {
        matches!(self, ZoneKind::Left | ZoneKind::Right)
    }

    /// Top/bottom halves only touch the vertical axis.
    pub fn is_vertical_half(self) -> bool {
        matches!(self, ZoneKind::Top | ZoneKind::Bottom)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::Left => write!(f, "left"),
            ZoneKind::Right => write!(f, "right"),
            ZoneKind::Top => write!(f, "top"),
            ZoneKind::Bottom => write!(f, "bottom"),
            ZoneKind::Center => write!(f, "center"),
            ZoneKind::Fullscreen => write!(f, "fullscreen"),
            ZoneKind::Corner => write!(f, "corner"),
        }
    }
}

/// A named target rectangle a dragged window can lock onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapZone {
    /// Stable identifier, e.g. `"left"` or `"top-right"`.
    pub id: String,
    /// Human-readable name used for announcements.
    pub name: String,
    pub rect: Rect,
    pub kind: ZoneKind,
}

impl SnapZone {
    fn new(id: &str, name: &str, rect: Rect, kind: ZoneKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rect,
            kind,
        }
    }
}

/// Compute every snap zone for a viewport of the given size.
///
/// Zones are returned in a fixed order: left, right, top, bottom, center,
/// fullscreen, then the four corners (top-left, top-right, bottom-left,
/// bottom-right).  Halves and corners are inset by `margin` from the
/// viewport edge and from each other.
pub fn compute_zones(viewport: Size, margin: f64) -> Vec<SnapZone> {
    let w = viewport.width;
    let h = viewport.height;
    let m = margin;
    let half_w = (w - 3.0 * m) / 2.0;
    let half_h = (h - 3.0 * m) / 2.0;
    let second_x = 2.0 * m + half_w;
    let second_y = 2.0 * m + half_h;

    vec![
        SnapZone::new(
            "left",
            "Left Half",
            Rect::new(m, m, half_w, h - 2.0 * m),
            ZoneKind::Left,
        ),
        SnapZone::new(
            "right",
            "Right Half",
            Rect::new(second_x, m, half_w, h - 2.0 * m),
            ZoneKind::Right,
        ),
        SnapZone::new(
            "top",
            "Top Half",
            Rect::new(m, m, w - 2.0 * m, half_h),
            ZoneKind::Top,
        ),
        SnapZone::new(
            "bottom",
            "Bottom Half",
            Rect::new(m, second_y, w - 2.0 * m, half_h),
            ZoneKind::Bottom,
        ),
        SnapZone::new(
            "center",
            "Center",
            Rect::new(w / 4.0, h / 4.0, w / 2.0, h / 2.0),
            ZoneKind::Center,
        ),
        SnapZone::new(
            "fullscreen",
            "Fullscreen",
            Rect::new(0.0, 0.0, w, h),
            ZoneKind::Fullscreen,
        ),
        SnapZone::new(
            "top-left",
            "Top Left",
            Rect::new(m, m, half_w, half_h),
            ZoneKind::Corner,
        ),
        SnapZone::new(
            "top-right",
            "Top Right",
            Rect::new(second_x, m, half_w, half_h),
            ZoneKind::Corner,
        ),
        SnapZone::new(
            "bottom-left",
            "Bottom Left",
            Rect::new(m, second_y, half_w, half_h),
            ZoneKind::Corner,
        ),
        SnapZone::new(
            "bottom-right",
            "Bottom Right",
            Rect::new(second_x, second_y, half_w, half_h),
            ZoneKind::Corner,
        ),
    ]
}

/// Lazily recomputed zone list.
///
/// [`zones`](ZoneCache::zones) only calls [`compute_zones`] when the
/// requested viewport differs from the one the cached list was built for.
#[derive(Debug, Clone)]
pub struct ZoneCache {
    margin: f64,
    viewport: Option<Size>,
    zones: Vec<SnapZone>,
}

impl ZoneCache {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            viewport: None,
            zones: Vec::new(),
        }
    }

    /// Zones for `viewport`, recomputing only on a size change.
    pub fn zones(&mut self, viewport: Size) -> &[SnapZone] {
        if self.viewport != Some(viewport) {
            log::debug!(
                "recomputing snap zones for {}x{}",
                viewport.width,
                viewport.height
            );
            self.zones = compute_zones(viewport, self.margin);
            self.viewport = Some(viewport);
        }
        &self.zones
    }

    /// Viewport the cached zones were computed for, if any.
    pub fn computed_for(&self) -> Option<Size> {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone<'a>(zones: &'a [SnapZone], id: &str) -> &'a SnapZone {
        zones.iter().find(|z| z.id == id).expect("zone should exist")
    }

    #[test]
    fn produces_ten_zones_in_fixed_order() {
        let zones = compute_zones(Size::new(1000.0, 800.0), 20.0);
        let ids: Vec<&str> = zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "left",
                "right",
                "top",
                "bottom",
                "center",
                "fullscreen",
                "top-left",
                "top-right",
                "bottom-left",
                "bottom-right"
            ]
        );
    }

    #[test]
    fn halves_are_inset_by_margin() {
        let zones = compute_zones(Size::new(1000.0, 800.0), 20.0);
        assert_eq!(zone(&zones, "left").rect, Rect::new(20.0, 20.0, 470.0, 760.0));
        assert_eq!(zone(&zones, "right").rect, Rect::new(510.0, 20.0, 470.0, 760.0));
        assert_eq!(zone(&zones, "top").rect, Rect::new(20.0, 20.0, 960.0, 370.0));
        assert_eq!(zone(&zones, "bottom").rect, Rect::new(20.0, 410.0, 960.0, 370.0));
    }

    #[test]
    fn center_fullscreen_and_corners() {
        let zones = compute_zones(Size::new(1000.0, 800.0), 20.0);
        assert_eq!(zone(&zones, "center").rect, Rect::new(250.0, 200.0, 500.0, 400.0));
        assert_eq!(zone(&zones, "fullscreen").rect, Rect::new(0.0, 0.0, 1000.0, 800.0));
        assert_eq!(zone(&zones, "top-left").rect, Rect::new(20.0, 20.0, 470.0, 370.0));
        assert_eq!(
            zone(&zones, "bottom-right").rect,
            Rect::new(510.0, 410.0, 470.0, 370.0)
        );
        let corners = zones.iter().filter(|z| z.kind == ZoneKind::Corner).count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn zones_stay_inside_viewport() {
        let vp = Size::new(1366.0, 768.0);
        for z in compute_zones(vp, 20.0) {
            assert!(z.rect.x >= 0.0 && z.rect.y >= 0.0, "{} starts outside", z.id);
            assert!(z.rect.right() <= vp.width, "{} overflows right", z.id);
            assert!(z.rect.bottom() <= vp.height, "{} overflows bottom", z.id);
        }
    }

    #[test]
    fn cache_recomputes_only_on_size_change() {
        let mut cache = ZoneCache::new(20.0);
        assert!(cache.computed_for().is_none());

        let first = cache.zones(Size::new(1000.0, 800.0)).to_vec();
        assert_eq!(cache.computed_for(), Some(Size::new(1000.0, 800.0)));
        let again = cache.zones(Size::new(1000.0, 800.0)).to_vec();
        assert_eq!(first, again);

        let resized = cache.zones(Size::new(2000.0, 800.0)).to_vec();
        assert_ne!(first, resized);
        assert_eq!(cache.computed_for(), Some(Size::new(2000.0, 800.0)));
    }
}
