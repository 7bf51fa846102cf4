//! shadercross installer library.
//!
//! This crate provides the core functionality for fetching, building and
//! installing SDL_shadercross together with the shared libraries it loads at
//! runtime. It is used by the `shadercross-installer` CLI binary and can be
//! driven programmatically for testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Per-platform artefact sets, copying and runtime path fix-ups
//! - [`build`] - CMake configure and compile orchestration
//! - [`cleanup`] - Removal of transient build output
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Immutable installer configuration and TOML overrides
//! - [`dirs`] - Home directory lookup and `~` expansion
//! - [`environment`] - Working and install directory resolution
//! - [`error`] - Error taxonomy for every workflow stage
//! - [`executor`] - Uniform external command execution
//! - [`output`] - Progress banners and summaries
//! - [`pipeline`] - Ordered workflow orchestration
//! - [`platform`] - Host platform detection
//! - [`source`] - Repository cloning and synchronisation

pub mod artefact;
pub mod build;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod environment;
pub mod error;
pub mod executor;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
