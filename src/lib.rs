//! Interview chat client
//!
//! Drives a conversational interview against a remote interview service:
//! a pure session state machine, an HTTP backend, and an async runtime that
//! ties them together.

pub mod backend;
pub mod config;
pub mod runtime;
pub mod state_machine;
