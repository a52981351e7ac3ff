//! Peridot: a module-based dotfiles manager.
//!
//! Configuration files live in per-module directories under a dotfiles root
//! and are deployed through a two-stage symlink pipeline: source file →
//! rendered intermediate under `.peridot/` → symlink in the target root.
//! A persisted state record tracks ownership and content hashes so drift is
//! detectable and removal restores real files.
//!
//! The public API is organised into focused layers:
//!
//! - **[`paths`]**, **[`hash`]**, **[`fsops`]** — path derivation, content
//!   fingerprints, filesystem primitives
//! - **[`template`]** — rendering sources into intermediates
//! - **[`module`]** — metadata loading and deployment preconditions
//! - **[`state`]** — the persisted record and its refresh cycle
//! - **[`deploy`]**, **[`remove`]** — the engines
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod fsops;
pub mod hash;
pub mod logging;
pub mod module;
pub mod paths;
pub mod remove;
pub mod state;
pub mod template;
