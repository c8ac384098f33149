//! Trailing-edge debouncing.
//!
//! [`CancellableDelay`] is a clock-agnostic arm/cancel/rearm primitive: the
//! caller passes the current [`Instant`] in and polls for expiry, so it works
//! inside any event loop and in tests without sleeping.
//!
//! [`SnapDebouncer`] builds the debounced snap contract on top of it: only
//! the most recent submission within a quiet period is ever resolved.

use crate::geometry::Rect;
use crate::snap::{SnapResolver, SnapResult};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    armed_at: Instant,
}

/// A single pending value that fires once `delay` has passed since it was
/// last armed.
#[derive(Debug, Clone)]
pub struct CancellableDelay<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> CancellableDelay<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period.  Applies to the currently pending value too.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arm with `value`, replacing and restarting any pending one.
    ///
    /// Returns `true` if a pending value was superseded.
    pub fn arm(&mut self, value: T, now: Instant) -> bool {
        self.pending
            .replace(Pending {
                value,
                armed_at: now,
            })
            .is_some()
    }

    /// Drop the pending value, returning it if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.armed_at + self.delay)
    }

    /// Take the pending value if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(due) if now >= due => self.cancel(),
            _ => None,
        }
    }
}

/// Debounced wrapper around [`SnapResolver::calculate_snap`].
#[derive(Debug, Clone)]
pub struct SnapDebouncer {
    delay: CancellableDelay<(Rect, bool)>,
}

impl Default for SnapDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapDebouncer {
    pub fn new() -> Self {
        Self {
            delay: CancellableDelay::new(Duration::ZERO),
        }
    }

    /// Queue a resolution of `bounds`, superseding any pending one.
    ///
    /// The quiet period is taken from the resolver's current
    /// `debounce_ms`.
    pub fn submit(
        &mut self,
        resolver: &SnapResolver,
        bounds: Rect,
        is_dragging: bool,
        now: Instant,
    ) {
        self.delay
            .set_delay(Duration::from_millis(resolver.config().debounce_ms));
        if self.delay.arm((bounds, is_dragging), now) {
            log::trace!("debounced snap superseded");
        }
    }

    /// Resolve the latest submission once its quiet period has passed.
    pub fn poll(&mut self, resolver: &mut SnapResolver, now: Instant) -> Option<SnapResult> {
        self.delay
            .poll(now)
            .map(|(bounds, dragging)| resolver.calculate_snap(bounds, dragging))
    }

    /// Drop the pending submission without resolving it.
    pub fn cancel(&mut self) -> bool {
        self.delay.cancel().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.delay.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.delay.deadline()
    }
}
