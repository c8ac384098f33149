//! Command transport over a Unix socket.
//!
//! The shell's drag source and workspace tooling connect to the socket and
//! send newline-delimited JSON [`Command`](crate::command::Command)s.

pub mod listener;
