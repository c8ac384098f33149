//! Named grid layouts and window-to-cell binding.
//!
//! A [`GridLayout`] partitions the workspace into `columns × rows` grid
//! units and groups them into addressable [`GridCell`]s.  The
//! [`GridLayoutEngine`] owns the registry of layouts, the currently active
//! layout, and the occupancy of its cells.
//!
//! The active layout is a private copy of the registered one: switching
//! layouts throws away all occupancy, and registered layouts stay pristine.

pub mod arrange;
pub mod builtin;

use crate::geometry::Rect;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use arrange::auto_arrange_windows;

/// One addressable unit of a layout, measured in grid units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub window_id: Option<String>,
    #[serde(default)]
    pub is_occupied: bool,
    #[serde(default = "default_resizable")]
    pub is_resizable: bool,
}

fn default_resizable() -> bool {
    true
}

impl GridCell {
    /// An empty, resizable cell.
    pub fn new(id: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            window_id: None,
            is_occupied: false,
            is_resizable: true,
        }
    }

    /// Mark the cell as fixed-size.
    pub fn fixed(mut self) -> Self {
        self.is_resizable = false;
        self
    }
}

/// What a layout is meant for.  Used for grouping in pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCategory {
    Productivity,
    Development,
    Design,
    Entertainment,
    Custom,
}

impl fmt::Display for LayoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutCategory::Productivity => write!(f, "productivity"),
            LayoutCategory::Development => write!(f, "development"),
            LayoutCategory::Design => write!(f, "design"),
            LayoutCategory::Entertainment => write!(f, "entertainment"),
            LayoutCategory::Custom => write!(f, "custom"),
        }
    }
}

/// A named `columns × rows` grid and its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub id: String,
    pub name: String,
    pub description: String,
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<GridCell>,
    pub category: LayoutCategory,
}

impl GridLayout {
    pub fn cell(&self, cell_id: &str) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.id == cell_id)
    }

    /// The cell currently holding `window_id`, if any.
    pub fn cell_holding(&self, window_id: &str) -> Option<&GridCell> {
        self.cells
            .iter()
            .find(|c| c.window_id.as_deref() == Some(window_id))
    }

    /// Whether every cell lies inside the `columns × rows` grid.
    pub fn cells_in_bounds(&self) -> bool {
        self.cells
            .iter()
            .all(|c| c.x + c.width <= self.columns && c.y + c.height <= self.rows)
    }
}

/// A layout plus the applications to place into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceTemplate {
    pub id: String,
    pub name: String,
    pub layout_id: String,
    pub default_apps: Vec<String>,
    pub auto_arrange: bool,
}

/// A named bundle of layouts, for presentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPreset {
    pub id: String,
    pub name: String,
    pub layout_ids: Vec<String>,
}

/// Errors from layout operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// An operation that needs an active layout was called without one.
    #[error("no active layout")]
    NoActiveLayout,
    #[error("unknown layout: {0}")]
    UnknownLayout(String),
    #[error("unknown workspace template: {0}")]
    UnknownTemplate(String),
}

/// Registry of layouts, presets and templates, plus the active layout.
#[derive(Debug, Clone)]
pub struct GridLayoutEngine {
    layouts: HashMap<String, GridLayout>,
    /// Registration order of `layouts` keys.
    order: Vec<String>,
    presets: Vec<LayoutPreset>,
    templates: Vec<WorkspaceTemplate>,
    active: Option<GridLayout>,
    next_layout_id: u64,
    next_template_id: u64,
}

impl Default for GridLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayoutEngine {
    /// Create an engine with the built-in layouts, presets and templates.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        for layout in builtin::layouts() {
            engine.register(layout);
        }
        engine.presets = builtin::presets();
        engine.templates = builtin::templates();
        engine
    }

    /// Create an engine with nothing registered.
    pub fn empty() -> Self {
        Self {
            layouts: HashMap::new(),
            order: Vec::new(),
            presets: Vec::new(),
            templates: Vec::new(),
            active: None,
            next_layout_id: 1,
            next_template_id: 1,
        }
    }

    fn register(&mut self, layout: GridLayout) {
        if !self.layouts.contains_key(&layout.id) {
            self.order.push(layout.id.clone());
        }
        self.layouts.insert(layout.id.clone(), layout);
    }

    //  Registry 

    pub fn get_layout(&self, id: &str) -> Option<&GridLayout> {
        self.layouts.get(id)
    }

    /// All registered layouts in registration order.
    pub fn layouts(&self) -> impl Iterator<Item = &GridLayout> {
        self.order.iter().filter_map(|id| self.layouts.get(id))
    }

    pub fn layouts_by_category(&self, category: LayoutCategory) -> Vec<&GridLayout> {
        self.layouts().filter(|l| l.category == category).collect()
    }

    pub fn presets(&self) -> &[LayoutPreset] {
        &self.presets
    }

    pub fn templates(&self) -> &[WorkspaceTemplate] {
        &self.templates
    }

    pub fn get_template(&self, id: &str) -> Option<&WorkspaceTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Register a new custom layout.
    ///
    /// Cells are taken as given: coverage and overlap are not checked.
    pub fn create_custom_layout(
        &mut self,
        name: &str,
        columns: u32,
        rows: u32,
        cells: Vec<GridCell>,
    ) -> GridLayout {
        let id = format!("custom-{}", self.next_layout_id);
        self.next_layout_id += 1;
        let layout = GridLayout {
            id,
            name: name.to_string(),
            description: format!("Custom {}x{} layout", columns, rows),
            columns,
            rows,
            cells,
            category: LayoutCategory::Custom,
        };
        if !layout.cells_in_bounds() {
            debug!("custom layout {} has cells outside its grid", layout.id);
        }
        info!("created layout {} ({})", layout.id, layout.name);
        self.register(layout.clone());
        layout
    }

    /// Register a workspace template for an existing layout.
    pub fn create_workspace_template(
        &mut self,
        name: &str,
        layout_id: &str,
        default_apps: Vec<String>,
        auto_arrange: bool,
    ) -> Result<WorkspaceTemplate, LayoutError> {
        if !self.layouts.contains_key(layout_id) {
            return Err(LayoutError::UnknownLayout(layout_id.to_string()));
        }
        let template = WorkspaceTemplate {
            id: format!("template-{}", self.next_template_id),
            name: name.to_string(),
            layout_id: layout_id.to_string(),
            default_apps,
            auto_arrange,
        };
        self.next_template_id += 1;
        info!("created template {} ({})", template.id, template.name);
        self.templates.push(template.clone());
        Ok(template)
    }

    //  Active layout 

    pub fn active_layout(&self) -> Option<&GridLayout> {
        self.active.as_ref()
    }

    /// Activate the layout registered as `id`.
    ///
    /// Returns `false` if no such layout exists; the current active layout
    /// is then left untouched.
    pub fn set_active_layout(&mut self, id: &str) -> bool {
        match self.layouts.get(id) {
            Some(layout) => {
                info!("active layout: {}", id);
                self.active = Some(layout.clone());
                true
            }
            None => {
                debug!("set_active_layout: unknown layout {}", id);
                false
            }
        }
    }

    /// Bind `window_id` to the free cell `cell_id` of the active layout.
    ///
    /// Other cells the window may already occupy are not released; call
    /// [`remove_window_from_cell`](Self::remove_window_from_cell) first to
    /// move a window.
    pub fn assign_window_to_cell(&mut self, window_id: &str, cell_id: &str) -> bool {
        let Some(layout) = self.active.as_mut() else {
            return false;
        };
        match layout.cells.iter_mut().find(|c| c.id == cell_id) {
            Some(cell) if !cell.is_occupied => {
                debug!("window {} -> cell {}", window_id, cell_id);
                cell.window_id = Some(window_id.to_string());
                cell.is_occupied = true;
                true
            }
            _ => false,
        }
    }

    /// Release the cell holding `window_id`.  Returns `false` if none does.
    pub fn remove_window_from_cell(&mut self, window_id: &str) -> bool {
        let Some(layout) = self.active.as_mut() else {
            return false;
        };
        match layout
            .cells
            .iter_mut()
            .find(|c| c.window_id.as_deref() == Some(window_id))
        {
            Some(cell) => {
                debug!("window {} released cell {}", window_id, cell.id);
                cell.window_id = None;
                cell.is_occupied = false;
                true
            }
            None => false,
        }
    }

    /// Unoccupied cells of the active layout, in definition order.
    pub fn get_available_cells(&self) -> Vec<GridCell> {
        self.active
            .as_ref()
            .map(|l| l.cells.iter().filter(|c| !c.is_occupied).cloned().collect())
            .unwrap_or_default()
    }

    /// Pixel rectangle of `cell` inside a container of the given size,
    /// using the active layout's grid.
    pub fn calculate_cell_bounds(
        &self,
        cell: &GridCell,
        container_width: f64,
        container_height: f64,
    ) -> Result<Rect, LayoutError> {
        let layout = self.active.as_ref().ok_or(LayoutError::NoActiveLayout)?;
        let unit_w = container_width / f64::from(layout.columns);
        let unit_h = container_height / f64::from(layout.rows);
        Ok(Rect::new(
            unit_w * f64::from(cell.x),
            unit_h * f64::from(cell.y),
            unit_w * f64::from(cell.width),
            unit_h * f64::from(cell.height),
        ))
    }

    /// Auto-arrange `window_ids` into the active layout.  See
    /// [`auto_arrange_windows`].
    pub fn auto_arrange<S: AsRef<str>>(&mut self, window_ids: &[S]) -> HashMap<String, GridCell> {
        auto_arrange_windows(self, window_ids)
    }

    /// Activate a template's layout and, if it asks for it, arrange its
    /// default apps.
    pub fn apply_template(&mut self, id: &str) -> Result<HashMap<String, GridCell>, LayoutError> {
        let template = self
            .get_template(id)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownTemplate(id.to_string()))?;
        if !self.set_active_layout(&template.layout_id) {
            return Err(LayoutError::UnknownLayout(template.layout_id));
        }
        if template.auto_arrange {
            Ok(self.auto_arrange(&template.default_apps))
        } else {
            Ok(HashMap::new())
        }
    }
}
