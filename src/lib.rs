//! Module projection engine.
//!
//! Checks version-controlled modules out under a private state directory and
//! projects them onto a shared root, as symlinks (`checkout`, `update`) or as
//! hardlinked copies (`export`), following each module's descriptor file.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: parse descriptors, resolve `@import` chains, load root settings
//! - **[`resources`]**: idempotent `check + apply` primitives for links and copies
//! - **[`projection`]**: drive resources from a resolved rule set; sweep and diff
//! - **[`vcs`]** / **[`exec`]**: delegate working-copy operations to `svn` or `git`
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod logging;
pub mod projection;
pub mod resources;
pub mod vcs;
