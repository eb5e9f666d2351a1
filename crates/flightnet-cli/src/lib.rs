//! Flight network CLI library.
//!
//! Subcommand handlers and output formatting for the `flightnet` binary.

pub mod commands;
pub mod output;
