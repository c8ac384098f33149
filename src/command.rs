//! Commands accepted by the placement service.
//!
//! [`Command`] is the vocabulary that every [`CommandSource`](crate::traits::CommandSource)
//! produces: drag updates from the shell, viewport changes, settings
//! changes and workspace layout operations.
//!
//! The wire format is externally tagged JSON, one command per line:
//!
//! ```json
//! {"Resize":"1920x1080"}
//! {"Resize":{"width":1920,"height":1080}}
//! {"SnapDebounced":{"bounds":{"x":10,"y":12,"width":640,"height":480},"dragging":true}}
//! {"EndDrag":{"x":10,"y":12,"width":640,"height":480}}
//! {"Configure":{"SnapDistance":30}}
//! {"SetActiveLayout":"grid-2x2"}
//! {"AutoArrange":["term","editor","browser"]}
//! "CancelSnap"
//! ```

use crate::config::ConfigChange;
use crate::geometry::{Rect, Size};
use crate::layout::GridCell;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Wire format for a viewport size: accepts `{"width":…, "height":…}` or a
/// `"<width>x<height>"` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportSize(pub Size);

impl<'de> Deserialize<'de> for ViewportSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = ViewportSize;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{width, height}} or string \"<width>x<height>\"")
            }
            fn visit_map<A>(self, mut map: A) -> Result<ViewportSize, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut width = None;
                let mut height = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "width" => width = Some(map.next_value()?),
                        "height" => height = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(ViewportSize(Size::new(
                    width.ok_or_else(|| DeError::missing_field("width"))?,
                    height.ok_or_else(|| DeError::missing_field("height"))?,
                )))
            }
            fn visit_str<E>(self, s: &str) -> Result<ViewportSize, E>
            where
                E: DeError,
            {
                let (w, h) = s
                    .trim()
                    .split_once(['x', 'X'])
                    .ok_or_else(|| {
                        DeError::custom(format!("Resize: expected \"WxH\", got {:?}", s))
                    })?;
                let w: f64 = w
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("Resize: width must be a number"))?;
                let h: f64 = h
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("Resize: height must be a number"))?;
                if w <= 0.0 || h <= 0.0 {
                    return Err(DeError::custom("Resize: dimensions must be positive"));
                }
                Ok(ViewportSize(Size::new(w, h)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every action the placement service can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`PlacementService`](crate::service::PlacementService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// The viewport changed size.  Snap zones are recomputed lazily.
    Resize(ViewportSize),

    /// Resolve a snap immediately for the given window bounds.
    Snap { bounds: Rect, dragging: bool },

    /// Resolve a snap once the pointer has been quiet for the configured
    /// debounce period.  A newer submission supersedes an older one.
    SnapDebounced { bounds: Rect, dragging: bool },

    /// Drop any pending debounced snap.
    CancelSnap,

    /// The drag ended at `bounds`.  Cancels any pending debounced snap,
    /// resolves the final placement without overlays and resets zone
    /// tracking.
    EndDrag(Rect),

    /// Change one snap setting.  The change is clamped and persisted.
    Configure(ConfigChange),

    /// Activate a registered layout, discarding current occupancy.
    SetActiveLayout(String),

    /// Bind a window to a free cell of the active layout.
    AssignWindow { window: String, cell: String },

    /// Release the cell holding a window.
    RemoveWindow(String),

    /// Place windows into free cells in order.
    AutoArrange(Vec<String>),

    /// Register a custom layout.
    CreateLayout {
        name: String,
        columns: u32,
        rows: u32,
        cells: Vec<GridCell>,
    },

    /// Register a workspace template for an existing layout.
    CreateTemplate {
        name: String,
        layout_id: String,
        #[serde(default)]
        default_apps: Vec<String>,
        #[serde(default)]
        auto_arrange: bool,
    },

    /// Activate a template's layout and arrange its default apps.
    ApplyTemplate(String),

    /// Report the pixel bounds of every cell of the active layout for a
    /// container of the given size.
    CellBounds(ViewportSize),
}
