//! Traits that decouple the placement engines from the host shell.
//!
//! The engines never talk to a display server, a storage backend or a
//! screen reader directly.  Each of those collaborators sits behind one of
//! the traits below, and the [`PlacementService`](crate::service::PlacementService)
//! only depends on these abstractions.

use crate::command::Command;
use crate::geometry::Size;
use std::sync::mpsc;

/// Reports the size of the area windows are placed in.
///
/// Size changes are pushed into the engines as
/// [`Command::Resize`]; this trait covers the pull side, e.g. at startup.
pub trait ViewportProvider {
    /// Current viewport size in logical pixels.
    fn size(&self) -> Size;
}

/// A fixed size is its own provider.
impl ViewportProvider for Size {
    fn size(&self) -> Size {
        *self
    }
}

/// Receives zone-change text for assistive technology.
///
/// Implementations are expected to surface the text in a polite live
/// region.  Announcements are rare (once per zone transition) so no
/// batching is required.
pub trait Announcer {
    fn announce(&self, text: &str);
}

/// A string key-value store used for persisted settings.
///
/// Writes replace the whole value for a key; there are no partial updates.
pub trait KeyValueStore {
    /// The error type produced by writes.
    type Error: std::error::Error + Send + 'static;

    /// Read the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
