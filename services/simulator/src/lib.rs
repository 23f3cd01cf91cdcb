//! Simulator Driver Library Crate
//!
//! Configuration loading and prompt-command parsing for the `simulator`
//! binary. The binary is a thin wrapper around this library and
//! `charmsim-core`.

pub mod config;
pub mod repl;
