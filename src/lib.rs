//! phēnix: layered configuration and startup for the phenix orchestrator
//!
//! A library for resolving who phenix runs as, merging configuration from
//! defaults, files, environment and flags, and reloading the web UI's user
//! list when its overlay file changes.

pub mod bootstrap;
pub mod collab;
pub mod config;
pub mod identity;
pub mod watch;
