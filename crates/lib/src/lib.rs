//! ovpack-lib: build-and-package pipeline for the FreeOverlay desktop overlay
//!
//! Turns the overlay's interpreted entry script into a single standalone
//! executable and a platform-appropriate distributable archive:
//! - `provision`: virtual environment and requirements installation
//! - `platform`: host detection
//! - `compile`: bundler invocation
//! - `archive`: zip / tar.gz packaging
//! - `pipeline`: the orchestrator sequencing the steps above
//!
//! All steps read one immutable [`config::BuildConfig`].

pub mod archive;
pub mod clean;
pub mod compile;
pub mod config;
pub mod consts;
pub mod init;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod provision;
pub mod release;
pub mod util;
