//! Accessibility announcements for snap zone transitions.

use crate::config::SnapConfig;
use crate::snap::SnapResult;
use crate::traits::Announcer;
use log::info;

/// Watches snap results and announces each newly entered zone once.
///
/// Leaving a zone is not announced; re-entering it later is.
pub struct ZoneAnnouncer<A: Announcer> {
    announcer: A,
}

impl<A: Announcer> ZoneAnnouncer<A> {
    pub fn new(announcer: A) -> Self {
        Self { announcer }
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    /// Inspect `result` and announce if it entered a new zone.
    ///
    /// Returns `true` if an announcement was made.
    pub fn observe(&self, result: &SnapResult, config: &SnapConfig) -> bool {
        if !result.zone_changed || !config.announce_snaps {
            return false;
        }
        match &result.zone {
            Some(zone) => {
                self.announcer.announce(&zone.name);
                true
            }
            None => false,
        }
    }
}

/// An [`Announcer`] that writes announcements to the log.
///
/// Used by the daemon, which has no live region of its own; a frontend
/// tailing the log or the event stream can forward them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, text: &str) {
        info!("announce: {}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::snap::SnapResolver;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Recorder {
        said: RefCell<Vec<String>>,
    }

    impl Announcer for Recorder {
        fn announce(&self, text: &str) {
            self.said.borrow_mut().push(text.to_string());
        }
    }

    const ON_LEFT: Rect = Rect {
        x: 155.0,
        y: 300.0,
        width: 200.0,
        height: 200.0,
    };
    const NOWHERE: Rect = Rect {
        x: 100.0,
        y: 100.0,
        width: 400.0,
        height: 300.0,
    };

    #[test]
    fn announces_once_per_zone_entry() {
        let cfg = SnapConfig::default();
        let mut resolver = SnapResolver::new(cfg.clone(), Size::new(1000.0, 800.0));
        let za = ZoneAnnouncer::new(Recorder::default());

        for bounds in [NOWHERE, ON_LEFT, ON_LEFT, ON_LEFT, NOWHERE, ON_LEFT] {
            let res = resolver.calculate_snap(bounds, true);
            za.observe(&res, &cfg);
        }

        assert_eq!(za.announcer().said.borrow().as_slice(), ["Left Half", "Left Half"]);
    }

    #[test]
    fn silent_when_announcements_disabled() {
        let cfg = SnapConfig {
            announce_snaps: false,
            ..SnapConfig::default()
        };
        let mut resolver = SnapResolver::new(cfg.clone(), Size::new(1000.0, 800.0));
        let za = ZoneAnnouncer::new(Recorder::default());
        let res = resolver.calculate_snap(ON_LEFT, true);
        assert!(res.zone_changed);
        assert!(!za.observe(&res, &cfg));
        assert!(za.announcer().said.borrow().is_empty());
    }
}
