//! Snap resolution for dragged windows.
//!
//! [`SnapResolver::calculate_snap`] runs grid snapping, edge snapping and
//! zone matching in that order, then clamps the result into the viewport.
//! The resolver only computes data: zone transitions are reported through
//! [`SnapResult::zone_changed`] and acted upon by an observer such as
//! [`ZoneAnnouncer`](crate::announce::ZoneAnnouncer).

use crate::config::{SnapConfig, ZoneMatch, DEFAULT_ZONE_MARGIN};
use crate::geometry::{Point, Rect, Size};
use crate::traits::ViewportProvider;
use crate::zones::{SnapZone, ZoneCache, ZoneKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Opacity of the zone indicator overlay.
pub const INDICATOR_OPACITY: f64 = 0.3;
/// Opacity of the final-bounds preview overlay.
pub const PREVIEW_OPACITY: f64 = 0.2;

/// A translucent rectangle the caller may draw while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub rect: Rect,
    pub opacity: f64,
}

/// Outcome of a single snap resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// Whether grid, edge or zone snapping altered the input bounds.
    pub snapped: bool,
    pub position: Point,
    pub size: Size,
    /// The zone the window landed on, if any.
    pub zone: Option<SnapZone>,
    /// Matched zone highlight.  Only set while dragging with indicators on.
    pub indicator: Option<Overlay>,
    /// Final bounds preview.  Only set while dragging with previews on.
    pub preview: Option<Overlay>,
    /// The matched zone differs from the previous resolution's (entering,
    /// leaving or switching zones).
    pub zone_changed: bool,
}

impl SnapResult {
    /// Position and size combined.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    fn unchanged(bounds: Rect) -> Self {
        Self {
            snapped: false,
            position: bounds.position(),
            size: bounds.size(),
            zone: None,
            indicator: None,
            preview: None,
            zone_changed: false,
        }
    }
}

/// Round `value` to the nearest multiple of `grid`, halves rounding up.
fn round_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid + 0.5).floor() * grid
}

/// Pick a zone whose center lies within `threshold` of `center`.
fn match_zone<'a>(
    zones: impl Iterator<Item = &'a SnapZone>,
    center: Point,
    threshold: f64,
    policy: ZoneMatch,
) -> Option<&'a SnapZone> {
    let mut within = zones
        .map(|z| (z, z.rect.center().distance_to(center)))
        .filter(|(_, d)| *d <= threshold);
    match policy {
        ZoneMatch::First => within.next().map(|(z, _)| z),
        // `min_by` keeps the first of equally distant zones.
        ZoneMatch::Nearest => within
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(z, _)| z),
    }
}

/// Computes snapped window bounds for one viewport.
///
/// Each instance tracks its own last matched zone, so independent drag
/// sessions should use independent resolvers.
#[derive(Debug, Clone)]
pub struct SnapResolver {
    config: SnapConfig,
    viewport: Size,
    zones: ZoneCache,
    last_zone: Option<String>,
}

impl SnapResolver {
    /// Create a resolver with the default zone margin.
    pub fn new(config: SnapConfig, viewport: Size) -> Self {
        Self::with_margin(config, viewport, DEFAULT_ZONE_MARGIN)
    }

    pub fn with_margin(config: SnapConfig, viewport: Size, margin: f64) -> Self {
        Self {
            config: config.sanitized(),
            viewport,
            zones: ZoneCache::new(margin),
            last_zone: None,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Replace the configuration.  Out-of-range values are clamped.
    pub fn set_config(&mut self, config: SnapConfig) {
        self.config = config.sanitized();
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize notification.  Zones are recomputed on the next resolution.
    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport != self.viewport {
            debug!("viewport resized to {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
        }
    }

    /// Pull the current size from a [`ViewportProvider`].
    pub fn sync_viewport<V: ViewportProvider>(&mut self, provider: &V) {
        self.set_viewport(provider.size());
    }

    /// Zones for the current viewport.
    pub fn zones(&mut self) -> &[SnapZone] {
        self.zones.zones(self.viewport)
    }

    /// Id of the zone matched by the most recent resolution.
    pub fn last_zone(&self) -> Option<&str> {
        self.last_zone.as_deref()
    }

    /// Forget the last matched zone, e.g. when a drag ends.
    pub fn reset_tracking(&mut self) {
        self.last_zone = None;
    }

    /// Resolve where a window with `bounds` should land.
    pub fn calculate_snap(&mut self, bounds: Rect, is_dragging: bool) -> SnapResult {
        if !self.config.enabled {
            return SnapResult::unchanged(bounds);
        }

        let cfg = self.config.clone();
        let vp = self.viewport;
        let mut r = bounds;

        if cfg.snap_to_grid {
            let grid = f64::from(cfg.grid_size);
            r.x = round_to_grid(r.x, grid);
            r.y = round_to_grid(r.y, grid);
        }

        let distance = f64::from(cfg.snap_distance);
        if cfg.snap_to_edges {
            if r.x.abs() <= distance {
                r.x = 0.0;
            }
            if (vp.width - r.right()).abs() <= distance {
                r.x = vp.width - r.width;
            }
            if r.y.abs() <= distance {
                r.y = 0.0;
            }
            if (vp.height - r.bottom()).abs() <= distance {
                r.y = vp.height - r.height;
            }
        }

        let candidates = self.zones.zones(vp).iter().filter(|z| match z.kind {
            ZoneKind::Corner => cfg.snap_to_corners,
            ZoneKind::Center => cfg.snap_to_center,
            _ => true,
        });
        let zone = match_zone(candidates, r.center(), 2.0 * distance, cfg.zone_match).cloned();

        if let Some(z) = &zone {
            if z.kind.is_horizontal_half() {
                r.x = z.rect.x;
                r.width = z.rect.width;
            } else if z.kind.is_vertical_half() {
                r.y = z.rect.y;
                r.height = z.rect.height;
            } else {
                r = z.rect;
            }
        }

        let snapped = r != bounds;

        r.x = r.x.min((vp.width - r.width).max(0.0)).max(0.0);
        r.y = r.y.min((vp.height - r.height).max(0.0)).max(0.0);

        let indicator = match (&zone, is_dragging && cfg.show_indicators) {
            (Some(z), true) => Some(Overlay {
                rect: z.rect,
                opacity: INDICATOR_OPACITY,
            }),
            _ => None,
        };
        let preview = (is_dragging && cfg.show_snap_preview).then_some(Overlay {
            rect: r,
            opacity: PREVIEW_OPACITY,
        });

        let zone_id = zone.as_ref().map(|z| z.id.clone());
        let zone_changed = zone_id != self.last_zone;
        if zone_changed {
            debug!(
                "snap zone {} -> {}",
                self.last_zone.as_deref().unwrap_or("none"),
                zone_id.as_deref().unwrap_or("none")
            );
        }
        self.last_zone = zone_id;

        SnapResult {
            snapped,
            position: r.position(),
            size: r.size(),
            zone,
            indicator,
            preview,
            zone_changed,
        }
    }
}
