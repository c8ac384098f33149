//! The per-session orchestrator that ties the snap resolver, the debouncer,
//! the layout engine and the persisted settings together.
//!
//! [`PlacementService`] reacts to [`Command`]s and reports outcomes as
//! [`PlacementEvent`]s over an optional [`mpsc`] channel.  Each service is an
//! independent context: two services never share layouts, zones or settings.

use crate::announce::ZoneAnnouncer;
use crate::command::{Command, ViewportSize};
use crate::config::SnapConfig;
use crate::debounce::SnapDebouncer;
use crate::geometry::{Rect, Size};
use crate::layout::{GridCell, GridLayout, GridLayoutEngine, LayoutError, WorkspaceTemplate};
use crate::persistence::{SettingsError, SnapSettings};
use crate::snap::{SnapResolver, SnapResult};
use crate::traits::{Announcer, KeyValueStore, ViewportProvider};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Instant;

/// Possible errors from the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The cell does not exist in the active layout or is already taken.
    #[error("cannot place {window} in cell {cell}: unknown or occupied")]
    CellUnavailable { window: String, cell: String },
    #[error("window {0} is not in any cell")]
    WindowNotPlaced(String),
}

/// Pixel bounds of one cell of the active layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellBounds {
    pub cell_id: String,
    pub window_id: Option<String>,
    pub rect: Rect,
}

/// Outcomes reported by the [`PlacementService`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlacementEvent {
    /// A snap was resolved; the caller applies `position`/`size`.
    Snapped(SnapResult),
    ConfigChanged(SnapConfig),
    LayoutActivated(String),
    WindowAssigned { window: String, cell: String },
    /// `window` left `cell`, which is free again.
    WindowRemoved { window: String, cell: String },
    /// Result of an auto-arrange or template application.
    Arranged(HashMap<String, GridCell>),
    LayoutCreated(GridLayout),
    TemplateCreated(WorkspaceTemplate),
    CellBounds(Vec<CellBounds>),
}

/// Orchestrates snapping and layout for one session.
///
/// # Typical usage
///
/// ```ignore
/// let mut service = PlacementService::new(MemoryStore::new(), LogAnnouncer, &size, 20.0);
/// service.handle(Command::Snap { bounds, dragging: true })?;
/// ```
pub struct PlacementService<S: KeyValueStore, A: Announcer> {
    resolver: SnapResolver,
    debouncer: SnapDebouncer,
    layouts: GridLayoutEngine,
    settings: SnapSettings<S>,
    announcer: ZoneAnnouncer<A>,
    event_tx: Option<mpsc::Sender<PlacementEvent>>,
}

impl<S: KeyValueStore, A: Announcer> PlacementService<S, A> {
    /// Create a service, loading snap settings from `store`.
    pub fn new<V: ViewportProvider>(
        store: S,
        announcer: A,
        viewport: &V,
        margin: f64,
    ) -> Self {
        let settings = SnapSettings::load(store);
        let resolver =
            SnapResolver::with_margin(settings.config().clone(), viewport.size(), margin);
        Self {
            resolver,
            debouncer: SnapDebouncer::new(),
            layouts: GridLayoutEngine::new(),
            settings,
            announcer: ZoneAnnouncer::new(announcer),
            event_tx: None,
        }
    }

    /// Attach an event channel.
    ///
    /// Any listener can own the receiving end; a closed receiver is ignored.
    pub fn set_event_sink(&mut self, tx: mpsc::Sender<PlacementEvent>) {
        self.event_tx = Some(tx);
    }

    pub fn resolver(&self) -> &SnapResolver {
        &self.resolver
    }

    pub fn layouts(&self) -> &GridLayoutEngine {
        &self.layouts
    }

    pub fn config(&self) -> &SnapConfig {
        self.settings.config()
    }

    pub fn announcer(&self) -> &A {
        self.announcer.announcer()
    }

    /// When the pending debounced snap is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Process a single [`Command`] at the current time.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ServiceError> {
        self.handle_at(cmd, Instant::now())
    }

    /// Process a single [`Command`] as if it arrived at `now`.
    pub fn handle_at(&mut self, cmd: Command, now: Instant) -> Result<(), ServiceError> {
        match cmd {
            Command::Resize(ViewportSize(size)) => {
                info!("resize {}x{}", size.width, size.height);
                self.resolver.set_viewport(size);
            }

            Command::Snap { bounds, dragging } => {
                let result = self.resolver.calculate_snap(bounds, dragging);
                self.deliver_snap(result);
            }

            Command::SnapDebounced { bounds, dragging } => {
                self.debouncer.submit(&self.resolver, bounds, dragging, now);
            }

            Command::CancelSnap => {
                if self.debouncer.cancel() {
                    debug!("pending snap cancelled");
                }
            }

            Command::EndDrag(bounds) => {
                self.debouncer.cancel();
                let result = self.resolver.calculate_snap(bounds, false);
                self.deliver_snap(result);
                self.resolver.reset_tracking();
            }

            Command::Configure(change) => {
                info!("configure {:?}", change);
                let outcome = self.settings.update(change).map(|_| ());
                // The in-memory change stands even if persisting failed.
                self.resolver.set_config(self.settings.config().clone());
                self.emit(PlacementEvent::ConfigChanged(self.settings.config().clone()));
                outcome?;
            }

            Command::SetActiveLayout(id) => {
                if !self.layouts.set_active_layout(&id) {
                    return Err(LayoutError::UnknownLayout(id).into());
                }
                self.emit(PlacementEvent::LayoutActivated(id));
            }

            Command::AssignWindow { window, cell } => {
                if self.layouts.active_layout().is_none() {
                    return Err(LayoutError::NoActiveLayout.into());
                }
                if !self.layouts.assign_window_to_cell(&window, &cell) {
                    return Err(ServiceError::CellUnavailable { window, cell });
                }
                self.emit(PlacementEvent::WindowAssigned { window, cell });
            }

            Command::RemoveWindow(window) => {
                let held = self
                    .layouts
                    .active_layout()
                    .and_then(|l| l.cell_holding(&window))
                    .map(|c| c.id.clone());
                let Some(cell) = held else {
                    return Err(ServiceError::WindowNotPlaced(window));
                };
                self.layouts.remove_window_from_cell(&window);
                self.emit(PlacementEvent::WindowRemoved { window, cell });
            }

            Command::AutoArrange(windows) => {
                if self.layouts.active_layout().is_none() {
                    return Err(LayoutError::NoActiveLayout.into());
                }
                let placed = self.layouts.auto_arrange(&windows);
                info!("arranged {} of {} windows", placed.len(), windows.len());
                self.emit(PlacementEvent::Arranged(placed));
            }

            Command::CreateLayout {
                name,
                columns,
                rows,
                cells,
            } => {
                let layout = self.layouts.create_custom_layout(&name, columns, rows, cells);
                self.emit(PlacementEvent::LayoutCreated(layout));
            }

            Command::CreateTemplate {
                name,
                layout_id,
                default_apps,
                auto_arrange,
            } => {
                let template = self.layouts.create_workspace_template(
                    &name,
                    &layout_id,
                    default_apps,
                    auto_arrange,
                )?;
                self.emit(PlacementEvent::TemplateCreated(template));
            }

            Command::ApplyTemplate(id) => {
                let placed = self.layouts.apply_template(&id)?;
                if let Some(layout) = self.layouts.active_layout() {
                    let layout_id = layout.id.clone();
                    self.emit(PlacementEvent::LayoutActivated(layout_id));
                }
                self.emit(PlacementEvent::Arranged(placed));
            }

            Command::CellBounds(ViewportSize(container)) => {
                let bounds = self.cell_bounds(container)?;
                self.emit(PlacementEvent::CellBounds(bounds));
            }
        }
        Ok(())
    }

    /// Resolve the pending debounced snap if it is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<SnapResult> {
        let result = self.debouncer.poll(&mut self.resolver, now)?;
        self.deliver_snap(result.clone());
        Some(result)
    }

    /// Pixel bounds of every cell of the active layout.
    pub fn cell_bounds(&self, container: Size) -> Result<Vec<CellBounds>, LayoutError> {
        let layout = self
            .layouts
            .active_layout()
            .ok_or(LayoutError::NoActiveLayout)?;
        layout
            .cells
            .iter()
            .map(|cell| {
                self.layouts
                    .calculate_cell_bounds(cell, container.width, container.height)
                    .map(|rect| CellBounds {
                        cell_id: cell.id.clone(),
                        window_id: cell.window_id.clone(),
                        rect,
                    })
            })
            .collect()
    }

    //  Internal 

    fn deliver_snap(&mut self, result: SnapResult) {
        self.announcer.observe(&result, self.resolver.config());
        self.emit(PlacementEvent::Snapped(result));
    }

    fn emit(&self, event: PlacementEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

//  Tests 

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigChange;
    use crate::persistence::{MemoryStore, SETTINGS_KEY};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Record-keeping announcer.
    #[derive(Debug, Default)]
    struct Recorder {
        said: RefCell<Vec<String>>,
    }

    impl Announcer for Recorder {
        fn announce(&self, text: &str) {
            self.said.borrow_mut().push(text.to_string());
        }
    }

    type TestService = PlacementService<MemoryStore, Recorder>;

    fn service() -> (TestService, mpsc::Receiver<PlacementEvent>) {
        let mut s = PlacementService::new(
            MemoryStore::new(),
            Recorder::default(),
            &Size::new(1000.0, 800.0),
            20.0,
        );
        let (tx, rx) = mpsc::channel();
        s.set_event_sink(tx);
        (s, rx)
    }

    fn snaps(rx: &mpsc::Receiver<PlacementEvent>) -> Vec<SnapResult> {
        rx.try_iter()
            .filter_map(|e| match e {
                PlacementEvent::Snapped(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    const ON_LEFT: Rect = Rect {
        x: 155.0,
        y: 300.0,
        width: 200.0,
        height: 200.0,
    };

    #[test]
    fn immediate_snap_emits_result_and_announces() {
        let (mut s, rx) = service();
        s.handle(Command::Snap {
            bounds: ON_LEFT,
            dragging: true,
        })
        .unwrap();
        let results = snaps(&rx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].zone.as_ref().map(|z| z.id.as_str()), Some("left"));
        assert_eq!(s.announcer().said.borrow().as_slice(), ["Left Half"]);
    }

    #[test]
    fn debounced_snaps_collapse_to_last() {
        let (mut s, rx) = service();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        for (i, x) in [100.0, 120.0, 155.0].into_iter().enumerate() {
            let bounds = Rect::new(x, 300.0, 200.0, 200.0);
            s.handle_at(
                Command::SnapDebounced {
                    bounds,
                    dragging: true,
                },
                t0 + ms(i as u64 * 5),
            )
            .unwrap();
        }
        assert!(s.tick(t0 + ms(12)).is_none());
        let deadline = s.next_deadline().expect("pending snap");
        let result = s.tick(deadline).expect("due");
        assert!(s.tick(deadline + ms(100)).is_none());
        assert_eq!(result.zone.as_ref().map(|z| z.id.as_str()), Some("left"));
        assert_eq!(snaps(&rx).len(), 1);
    }

    #[test]
    fn cancel_snap_drops_pending() {
        let (mut s, rx) = service();
        let t0 = Instant::now();
        s.handle_at(
            Command::SnapDebounced {
                bounds: ON_LEFT,
                dragging: true,
            },
            t0,
        )
        .unwrap();
        s.handle_at(Command::CancelSnap, t0).unwrap();
        assert!(s.next_deadline().is_none());
        assert!(s.tick(t0 + Duration::from_secs(1)).is_none());
        assert!(snaps(&rx).is_empty());
    }

    #[test]
    fn end_drag_resolves_without_overlays_and_resets_tracking() {
        let (mut s, rx) = service();
        s.handle(Command::Snap {
            bounds: ON_LEFT,
            dragging: true,
        })
        .unwrap();
        s.handle(Command::EndDrag(ON_LEFT)).unwrap();
        let results = snaps(&rx);
        assert_eq!(results.len(), 2);
        assert!(results[1].indicator.is_none());
        assert!(results[1].preview.is_none());
        assert!(s.resolver().last_zone().is_none());

        // A new drag entering the same zone is announced again.
        s.handle(Command::Snap {
            bounds: ON_LEFT,
            dragging: true,
        })
        .unwrap();
        assert_eq!(s.announcer().said.borrow().len(), 2);
    }

    #[test]
    fn resize_moves_zones() {
        let (mut s, rx) = service();
        s.handle(Command::Resize(ViewportSize(Size::new(2000.0, 800.0))))
            .unwrap();
        // The old left-zone center is no longer near any zone center.
        s.handle(Command::Snap {
            bounds: ON_LEFT,
            dragging: false,
        })
        .unwrap();
        assert!(snaps(&rx)[0].zone.is_none());
    }

    #[test]
    fn configure_clamps_persists_and_applies() {
        let (mut s, rx) = service();
        s.handle(Command::Configure(ConfigChange::SnapDistance(1000)))
            .unwrap();
        assert_eq!(s.config().snap_distance, 50);
        assert_eq!(s.resolver().config().snap_distance, 50);
        let persisted = s.settings.store().get(SETTINGS_KEY).expect("persisted");
        assert!(persisted.contains("\"snap_distance\":50"));
        assert!(matches!(
            rx.try_recv(),
            Ok(PlacementEvent::ConfigChanged(c)) if c.snap_distance == 50
        ));
    }

    #[test]
    fn disabling_snapping_passes_bounds_through() {
        let (mut s, rx) = service();
        s.handle(Command::Configure(ConfigChange::Enabled(false)))
            .unwrap();
        s.handle(Command::Snap {
            bounds: ON_LEFT,
            dragging: true,
        })
        .unwrap();
        let results = snaps(&rx);
        assert!(!results[0].snapped);
        assert_eq!(results[0].bounds(), ON_LEFT);
        assert!(s.announcer().said.borrow().is_empty());
    }

    /// A store that refuses every write.
    struct ReadOnlyStore;

    #[derive(Debug, thiserror::Error)]
    #[error("store is read-only")]
    struct ReadOnly;

    impl KeyValueStore for ReadOnlyStore {
        type Error = ReadOnly;

        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), ReadOnly> {
            Err(ReadOnly)
        }
    }

    #[test]
    fn failed_settings_write_keeps_change_and_reports_error() {
        let mut s = PlacementService::new(
            ReadOnlyStore,
            Recorder::default(),
            &Size::new(1000.0, 800.0),
            20.0,
        );
        let (tx, rx) = mpsc::channel();
        s.set_event_sink(tx);

        let err = s
            .handle(Command::Configure(ConfigChange::SnapDistance(30)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Settings(SettingsError::Store(_))));
        assert_eq!(s.config().snap_distance, 30);
        assert_eq!(s.resolver().config().snap_distance, 30);

        let events: Vec<PlacementEvent> = rx.try_iter().collect();
        assert!(matches!(
            events.as_slice(),
            [PlacementEvent::ConfigChanged(cfg)] if cfg.snap_distance == 30
        ));
    }

    #[test]
    fn settings_survive_into_a_new_service() {
        let (mut s, _rx) = service();
        s.handle(Command::Configure(ConfigChange::GridSize(40)))
            .unwrap();
        let store = s.settings.store().clone();
        let s2 = PlacementService::new(store, Recorder::default(), &Size::new(800.0, 600.0), 20.0);
        assert_eq!(s2.config().grid_size, 40);
    }

    #[test]
    fn layout_commands_round_trip() {
        let (mut s, rx) = service();
        s.handle(Command::SetActiveLayout("grid-2x2".into())).unwrap();
        s.handle(Command::AssignWindow {
            window: "w1".into(),
            cell: "top-left".into(),
        })
        .unwrap();
        let err = s
            .handle(Command::AssignWindow {
                window: "w2".into(),
                cell: "top-left".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::CellUnavailable { .. }));

        s.handle(Command::AutoArrange(vec!["a".into(), "b".into(), "c".into(), "d".into()]))
            .unwrap();
        let events: Vec<PlacementEvent> = rx.try_iter().collect();
        let arranged = events
            .iter()
            .find_map(|e| match e {
                PlacementEvent::Arranged(m) => Some(m.clone()),
                _ => None,
            })
            .expect("arranged event");
        assert_eq!(arranged.len(), 3);
        assert_eq!(arranged["a"].id, "top-right");
        assert!(!arranged.contains_key("d"));

        s.handle(Command::RemoveWindow("w1".into())).unwrap();
        assert_eq!(
            rx.try_iter().last(),
            Some(PlacementEvent::WindowRemoved {
                window: "w1".into(),
                cell: "top-left".into(),
            })
        );
        assert!(matches!(
            s.handle(Command::RemoveWindow("w1".into())),
            Err(ServiceError::WindowNotPlaced(_))
        ));
    }

    #[test]
    fn unknown_layout_is_an_error() {
        let (mut s, _rx) = service();
        assert!(matches!(
            s.handle(Command::SetActiveLayout("nope".into())),
            Err(ServiceError::Layout(LayoutError::UnknownLayout(_)))
        ));
    }

    #[test]
    fn layout_operations_need_an_active_layout() {
        let (mut s, _rx) = service();
        assert!(matches!(
            s.handle(Command::AutoArrange(vec!["a".into()])),
            Err(ServiceError::Layout(LayoutError::NoActiveLayout))
        ));
        assert!(matches!(
            s.handle(Command::CellBounds(ViewportSize(Size::new(100.0, 100.0)))),
            Err(ServiceError::Layout(LayoutError::NoActiveLayout))
        ));
    }

    #[test]
    fn cell_bounds_cover_active_layout() {
        let (mut s, _rx) = service();
        s.handle(Command::SetActiveLayout("split-vertical".into()))
            .unwrap();
        s.handle(Command::AssignWindow {
            window: "w".into(),
            cell: "right".into(),
        })
        .unwrap();
        let bounds = s.cell_bounds(Size::new(1000.0, 800.0)).unwrap();
        assert_eq!(
            bounds,
            vec![
                CellBounds {
                    cell_id: "left".into(),
                    window_id: None,
                    rect: Rect::new(0.0, 0.0, 500.0, 800.0),
                },
                CellBounds {
                    cell_id: "right".into(),
                    window_id: Some("w".into()),
                    rect: Rect::new(500.0, 0.0, 500.0, 800.0),
                },
            ]
        );
    }

    #[test]
    fn templates_create_and_apply() {
        let (mut s, rx) = service();
        s.handle(Command::CreateTemplate {
            name: "Pair".into(),
            layout_id: "split-vertical".into(),
            default_apps: vec!["browser".into(), "notes".into()],
            auto_arrange: true,
        })
        .unwrap();
        s.handle(Command::ApplyTemplate("template-1".into())).unwrap();
        let events: Vec<PlacementEvent> = rx.try_iter().collect();
        assert!(matches!(events[0], PlacementEvent::TemplateCreated(_)));
        assert_eq!(
            events[1],
            PlacementEvent::LayoutActivated("split-vertical".into())
        );
        match &events[2] {
            PlacementEvent::Arranged(m) => assert_eq!(m["notes"].id, "right"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn custom_layout_command_registers_layout() {
        let (mut s, _rx) = service();
        s.handle(Command::CreateLayout {
            name: "Wide".into(),
            columns: 3,
            rows: 1,
            cells: vec![GridCell::new("a", 0, 0, 2, 1), GridCell::new("b", 2, 0, 1, 1)],
        })
        .unwrap();
        assert!(s.layouts().get_layout("custom-1").is_some());
        s.handle(Command::SetActiveLayout("custom-1".into())).unwrap();
        let bounds = s.cell_bounds(Size::new(900.0, 300.0)).unwrap();
        assert_eq!(bounds[0].rect, Rect::new(0.0, 0.0, 600.0, 300.0));
    }

    #[test]
    fn independent_services_do_not_share_state() {
        let (mut a, _ra) = service();
        let (b, _rb) = service();
        a.handle(Command::SetActiveLayout("grid-2x2".into())).unwrap();
        assert!(b.layouts().active_layout().is_none());
    }
}
