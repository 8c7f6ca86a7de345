//! `chronografy` library crate.
//!
//! The binary (`chronografy`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without network access or spawning processes
//! - a different front-end only needs to implement `app::notify::Notifier`

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod render;
pub mod report;

#[cfg(test)]
mod testing;
