//! Built-in layouts, presets and workspace templates.
//!
//! These are registered by [`GridLayoutEngine::new`](super::GridLayoutEngine::new)
//! and never mutated afterwards; activating one hands out a copy.

use super::{GridCell, GridLayout, LayoutCategory, LayoutPreset, WorkspaceTemplate};

fn layout(
    id: &str,
    name: &str,
    description: &str,
    (columns, rows): (u32, u32),
    category: LayoutCategory,
    cells: Vec<GridCell>,
) -> GridLayout {
    GridLayout {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        columns,
        rows,
        cells,
        category,
    }
}

/// Every built-in layout, in presentation order.
pub fn layouts() -> Vec<GridLayout> {
    use LayoutCategory::*;
    vec![
        layout(
            "single",
            "Focus",
            "One window filling the workspace",
            (1, 1),
            Productivity,
            vec![GridCell::new("main", 0, 0, 1, 1)],
        ),
        layout(
            "split-vertical",
            "Side by Side",
            "Two equal columns",
            (2, 1),
            Productivity,
            vec![
                GridCell::new("left", 0, 0, 1, 1),
                GridCell::new("right", 1, 0, 1, 1),
            ],
        ),
        layout(
            "split-horizontal",
            "Stacked",
            "Two equal rows",
            (1, 2),
            Productivity,
            vec![
                GridCell::new("top", 0, 0, 1, 1),
                GridCell::new("bottom", 0, 1, 1, 1),
            ],
        ),
        layout(
            "grid-2x2",
            "Quad",
            "Four equal quarters",
            (2, 2),
            Productivity,
            vec![
                GridCell::new("top-left", 0, 0, 1, 1),
                GridCell::new("top-right", 1, 0, 1, 1),
                GridCell::new("bottom-left", 0, 1, 1, 1),
                GridCell::new("bottom-right", 1, 1, 1, 1),
            ],
        ),
        layout(
            "grid-3x3",
            "Nine Grid",
            "Nine equal cells",
            (3, 3),
            Productivity,
            (0..9)
                .map(|i| GridCell::new(format!("cell-{}", i + 1), i % 3, i / 3, 1, 1))
                .collect(),
        ),
        layout(
            "main-stack",
            "Main and Stack",
            "A large main area with two stacked side panes",
            (3, 2),
            Development,
            vec![
                GridCell::new("main", 0, 0, 2, 2),
                GridCell::new("stack-top", 2, 0, 1, 1),
                GridCell::new("stack-bottom", 2, 1, 1, 1),
            ],
        ),
        layout(
            "three-column",
            "Three Columns",
            "Three equal columns",
            (3, 1),
            Development,
            vec![
                GridCell::new("left", 0, 0, 1, 1),
                GridCell::new("center", 1, 0, 1, 1),
                GridCell::new("right", 2, 0, 1, 1),
            ],
        ),
        layout(
            "ide",
            "IDE",
            "Editor with a terminal below and a sidebar",
            (4, 3),
            Development,
            vec![
                GridCell::new("editor", 0, 0, 3, 2),
                GridCell::new("sidebar", 3, 0, 1, 3).fixed(),
                GridCell::new("terminal", 0, 2, 3, 1),
            ],
        ),
        layout(
            "design-canvas",
            "Canvas",
            "A wide canvas with tool and layer panels",
            (4, 2),
            Design,
            vec![
                GridCell::new("canvas", 0, 0, 3, 2),
                GridCell::new("tools", 3, 0, 1, 1).fixed(),
                GridCell::new("layers", 3, 1, 1, 1).fixed(),
            ],
        ),
        layout(
            "theater",
            "Theater",
            "A large player with chat and details below",
            (3, 3),
            Entertainment,
            vec![
                GridCell::new("player", 0, 0, 3, 2),
                GridCell::new("chat", 0, 2, 2, 1),
                GridCell::new("details", 2, 2, 1, 1),
            ],
        ),
    ]
}

/// Built-in layout presets.
pub fn presets() -> Vec<LayoutPreset> {
    let preset = |id: &str, name: &str, ids: &[&str]| LayoutPreset {
        id: id.into(),
        name: name.into(),
        layout_ids: ids.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        preset("essentials", "Essentials", &["single", "split-vertical", "grid-2x2"]),
        preset("coding", "Coding", &["main-stack", "three-column", "ide"]),
        preset("creative", "Creative", &["design-canvas", "theater"]),
    ]
}

/// Built-in workspace templates.
pub fn templates() -> Vec<WorkspaceTemplate> {
    let template = |id: &str, name: &str, layout_id: &str, apps: &[&str], auto_arrange| {
        WorkspaceTemplate {
            id: id.into(),
            name: name.into(),
            layout_id: layout_id.into(),
            default_apps: apps.iter().map(|s| s.to_string()).collect(),
            auto_arrange,
        }
    };
    vec![
        template("coding", "Coding", "ide", &["editor", "files", "terminal"], true),
        template("research", "Research", "split-vertical", &["browser", "notes"], true),
        template("watch", "Watch", "theater", &["player"], false),
    ]
}
