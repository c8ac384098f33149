//! Automatic placement of windows into free cells.

use super::{GridCell, GridLayoutEngine};
use log::debug;
use std::collections::HashMap;

/// Assign `window_ids` to the active layout's free cells, pairwise in order.
///
/// The i-th id goes to the i-th available cell.  Ids beyond the number of
/// free cells get no entry in the returned map.  The returned cells reflect
/// the occupancy after assignment.
pub fn auto_arrange_windows<S: AsRef<str>>(
    engine: &mut GridLayoutEngine,
    window_ids: &[S],
) -> HashMap<String, GridCell> {
    let available = engine.get_available_cells();
    if window_ids.len() > available.len() {
        debug!(
            "auto-arrange: {} windows for {} free cells, {} left unplaced",
            window_ids.len(),
            available.len(),
            window_ids.len() - available.len()
        );
    }

    let mut placed = HashMap::new();
    for (window_id, cell) in window_ids.iter().map(|s| s.as_ref()).zip(available) {
        if engine.assign_window_to_cell(window_id, &cell.id) {
            placed.insert(
                window_id.to_string(),
                GridCell {
                    window_id: Some(window_id.to_string()),
                    is_occupied: true,
                    ..cell
                },
            );
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GridLayoutEngine {
        let mut e = GridLayoutEngine::new();
        assert!(e.set_active_layout("grid-2x2"));
        e
    }

    #[test]
    fn assigns_in_definition_order() {
        let mut e = quad();
        let placed = auto_arrange_windows(&mut e, &["a", "b", "c"]);
        assert_eq!(placed.len(), 3);
        assert_eq!(placed["a"].id, "top-left");
        assert_eq!(placed["b"].id, "top-right");
        assert_eq!(placed["c"].id, "bottom-left");
        assert!(placed["a"].is_occupied);
        assert_eq!(placed["c"].window_id.as_deref(), Some("c"));
        assert_eq!(e.get_available_cells().len(), 1);
    }

    #[test]
    fn surplus_windows_are_dropped() {
        let mut e = quad();
        let placed = auto_arrange_windows(&mut e, &["a", "b", "c", "d", "e"]);
        assert_eq!(placed.len(), 4);
        assert!(!placed.contains_key("e"));
        assert!(e.get_available_cells().is_empty());
    }

    #[test]
    fn fills_only_the_remaining_cells() {
        let mut e = quad();
        e.assign_window_to_cell("x", "top-left");
        let placed = auto_arrange_windows(&mut e, &["a".to_string(), "b".to_string()]);
        assert_eq!(placed["a"].id, "top-right");
        assert_eq!(placed["b"].id, "bottom-left");
    }

    #[test]
    fn no_active_layout_places_nothing() {
        let mut e = GridLayoutEngine::new();
        assert!(auto_arrange_windows(&mut e, &["a"]).is_empty());
    }

    #[test]
    fn engine_method_delegates() {
        let mut e = quad();
        let placed = e.auto_arrange(&["solo"]);
        assert_eq!(placed["solo"].id, "top-left");
    }
}
