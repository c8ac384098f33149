//! **snapgrd**: window placement for a desktop shell.
//!
//! Two engines decide where windows go:
//!
//! * the snap resolver ([`snap`]) turns the bounds of a window being dragged
//!   into corrected bounds using grid, edge and zone snapping, with zones
//!   derived from the viewport by [`zones`];
//! * the grid-layout engine ([`layout`]) partitions the workspace into named
//!   cells and binds windows to them.
//!
//! # Architecture
//!
//! Everything outside the engines sits behind a trait in [`traits`]: the
//! viewport, the key-value store used for [`persistence`], the
//! accessibility announcer and the transport that delivers [`command`]s.
//! [`service::PlacementService`] is the per-session context that owns one of
//! each engine and dispatches commands to them; the daemon in `main.rs`
//! feeds it from the Unix-socket listener in [`ipc`].

pub mod announce;
pub mod command;
pub mod config;
pub mod debounce;
pub mod geometry;
pub mod ipc;
pub mod layout;
pub mod persistence;
pub mod service;
pub mod snap;
pub mod traits;
pub mod zones;
