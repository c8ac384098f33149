//! Snap behaviour settings and the daemon configuration file.
//!
//! [`SnapConfig`] is the user-tunable snapping behaviour.  Its bounded
//! numeric fields are clamped on every write, including deserialization via
//! [`SnapConfig::sanitized`], so an out-of-range value is never observed by
//! the resolver.
//!
//! [`Config`] is the daemon's own startup file, loaded from
//! `$XDG_CONFIG_HOME/snapgrd/config.json`.
//!
//! # Example
//!
//! ```json
//! {
//!   "margin": 16.0,
//!   "viewport": { "width": 2560.0, "height": 1440.0 },
//!   "store_dir": "/home/me/.local/state/snapgrd"
//! }
//! ```

use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Allowed range for [`SnapConfig::snap_distance`] (pixels).
pub const SNAP_DISTANCE_RANGE: RangeInclusive<u32> = 5..=50;
/// Allowed range for [`SnapConfig::grid_size`] (pixels).
pub const GRID_SIZE_RANGE: RangeInclusive<u32> = 5..=100;
/// Allowed range for [`SnapConfig::debounce_ms`].
pub const DEBOUNCE_MS_RANGE: RangeInclusive<u64> = 0..=100;

/// Default inset between snap zones and the viewport edge (pixels).
pub const DEFAULT_ZONE_MARGIN: f64 = 20.0;

fn clamp_range<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

/// How a zone is chosen when several zone centers lie within the match
/// threshold of the window center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMatch {
    /// The zone with the smallest center distance wins; ties go to the
    /// earlier zone.
    #[default]
    Nearest,
    /// The first zone in definition order within the threshold wins.
    First,
}

/// Snapping behaviour.
///
/// Fields are public for reading; use the setters to mutate bounded values so
/// they stay in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Master switch.  When off, the resolver returns bounds unchanged.
    pub enabled: bool,
    /// Distance (px) within which an edge snaps flush.  Zones match within
    /// twice this distance.  Range 5–50.
    pub snap_distance: u32,
    /// Emit an indicator rectangle for the matched zone while dragging.
    pub show_indicators: bool,
    /// Round positions to multiples of [`grid_size`](Self::grid_size).
    pub snap_to_grid: bool,
    /// Grid pitch in pixels.  Range 5–100.
    pub grid_size: u32,
    /// Snap window edges flush to nearby viewport edges.
    pub snap_to_edges: bool,
    /// Allow the four quadrant zones to match.
    pub snap_to_corners: bool,
    /// Allow the center zone to match.
    pub snap_to_center: bool,
    /// Announce zone transitions to assistive technology.
    pub announce_snaps: bool,
    /// Quiet period for debounced resolution.  Range 0–100.
    pub debounce_ms: u64,
    /// Emit a preview rectangle of the final bounds while dragging.
    pub show_snap_preview: bool,
    /// Zone selection policy.
    pub zone_match: ZoneMatch,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snap_distance: 20,
            show_indicators: true,
            snap_to_grid: false,
            grid_size: 20,
            snap_to_edges: true,
            snap_to_corners: true,
            snap_to_center: true,
            announce_snaps: true,
            debounce_ms: 16,
            show_snap_preview: true,
            zone_match: ZoneMatch::Nearest,
        }
    }
}

impl SnapConfig {
    /// Return a copy with every bounded field clamped into its range.
    ///
    /// Applied to anything read from outside the process.
    pub fn sanitized(mut self) -> Self {
        self.snap_distance = clamp_range(self.snap_distance, &SNAP_DISTANCE_RANGE);
        self.grid_size = clamp_range(self.grid_size, &GRID_SIZE_RANGE);
        self.debounce_ms = clamp_range(self.debounce_ms, &DEBOUNCE_MS_RANGE);
        self
    }

    pub fn set_snap_distance(&mut self, px: u32) {
        self.snap_distance = clamp_range(px, &SNAP_DISTANCE_RANGE);
    }

    pub fn set_grid_size(&mut self, px: u32) {
        self.grid_size = clamp_range(px, &GRID_SIZE_RANGE);
    }

    pub fn set_debounce_ms(&mut self, ms: u64) {
        self.debounce_ms = clamp_range(ms, &DEBOUNCE_MS_RANGE);
    }

    /// Apply a single [`ConfigChange`], clamping where the field is bounded.
    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::Enabled(v) => self.enabled = v,
            ConfigChange::SnapDistance(v) => self.set_snap_distance(v),
            ConfigChange::ShowIndicators(v) => self.show_indicators = v,
            ConfigChange::SnapToGrid(v) => self.snap_to_grid = v,
            ConfigChange::GridSize(v) => self.set_grid_size(v),
            ConfigChange::SnapToEdges(v) => self.snap_to_edges = v,
            ConfigChange::SnapToCorners(v) => self.snap_to_corners = v,
            ConfigChange::SnapToCenter(v) => self.snap_to_center = v,
            ConfigChange::AnnounceSnaps(v) => self.announce_snaps = v,
            ConfigChange::DebounceMs(v) => self.set_debounce_ms(v),
            ConfigChange::ShowSnapPreview(v) => self.show_snap_preview = v,
            ConfigChange::ZoneMatch(v) => self.zone_match = v,
        }
    }
}

/// One mutation of a [`SnapConfig`] field.
///
/// On the wire: `{"SnapDistance": 30}`, `{"Enabled": false}`, …
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConfigChange {
    Enabled(bool),
    SnapDistance(u32),
    ShowIndicators(bool),
    SnapToGrid(bool),
    GridSize(u32),
    SnapToEdges(bool),
    SnapToCorners(bool),
    SnapToCenter(bool),
    AnnounceSnaps(bool),
    DebounceMs(u64),
    ShowSnapPreview(bool),
    ZoneMatch(ZoneMatch),
}

/// Daemon startup configuration.
///
/// Every field is optional; a minimal `{}` file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inset between snap zones and the viewport edge (px).
    pub margin: f64,
    /// Viewport size assumed until the first `Resize` command arrives.
    pub viewport: Size,
    /// Directory for persisted settings.  `None` keeps settings in memory.
    pub store_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            margin: DEFAULT_ZONE_MARGIN,
            viewport: Size::new(1920.0, 1080.0),
            store_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
