//! Domain-specific error types for the deployment engine.
//!
//! Internal modules return typed errors (e.g., [`StateError`],
//! [`CollisionError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! PathError      — tilde expansion, relativization failures
//! ConfigError    — module.toml decoding and validation
//! StateError     — state record loading and persistence
//! TemplateError  — template parsing and rendering
//! CollisionError — pre-existing paths at a symlink target
//! HookError      — hook subprocess failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from path resolution and rewriting.
#[derive(Error, Debug)]
pub enum PathError {
    /// A leading `~` could not be expanded because no home directory is known.
    #[error("cannot expand '~' in '{path}': no home directory for the current user")]
    HomeDirUnknown {
        /// The path that contained the tilde.
        path: String,
    },

    /// A path expected to live under a base directory does not.
    #[error("path '{path}' is not located under '{base}'")]
    NotUnderBase {
        /// The offending path.
        path: PathBuf,
        /// The base it was expected to live under.
        base: PathBuf,
    },
}

/// Errors that arise from loading and validating a module configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The module metadata file could not be read.
    #[error("could not read module config {path}: {source}")]
    Io {
        /// Path to the metadata file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The module metadata file is not valid TOML (or has a wrong shape).
    #[error("could not decode module config {path}: {source}")]
    Decode {
        /// Path to the metadata file.
        path: PathBuf,
        /// Underlying TOML error.
        source: Box<toml::de::Error>,
    },

    /// A required field is empty or absent.
    #[error("'{0}' is a required field")]
    MissingField(&'static str),

    /// A path field references a location that does not exist.
    #[error("the config field '{field}' references a non-existing path: {path}")]
    MissingPath {
        /// Name of the path field.
        field: &'static str,
        /// The resolved path that was not found.
        path: PathBuf,
    },

    /// A path field failed to resolve.
    #[error("could not resolve the config field '{field}': {source}")]
    Resolve {
        /// Name of the path field.
        field: &'static str,
        /// Underlying path error.
        source: PathError,
    },
}

/// Errors that arise from the state record.
#[derive(Error, Debug)]
pub enum StateError {
    /// The state file does not exist; the dotfiles dir was never initialized.
    #[error("no state file at {path}; run 'peridot init' first")]
    NotInitialized {
        /// Expected location of the state file.
        path: PathBuf,
    },

    /// The state file could not be read or written.
    #[error("could not access state file {path}: {source}")]
    Io {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The state file is not valid JSON (or has a wrong shape).
    #[error("could not decode state file {path}: {source}")]
    Decode {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The state could not be encoded for persistence.
    #[error("could not encode state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors that arise from template rendering.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The source file could not be read.
    #[error("could not read template source {path}: {source}")]
    Io {
        /// Path to the source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source file is not a syntactically valid template.
    #[error("invalid template {path}: {source}")]
    Parse {
        /// Path to the source file.
        path: PathBuf,
        /// Underlying template error.
        source: minijinja::Error,
    },

    /// Rendering failed after the template parsed successfully.
    #[error("could not render template {path}: {source}")]
    Render {
        /// Path to the source file.
        path: PathBuf,
        /// Underlying template error.
        source: minijinja::Error,
    },
}

/// Errors that arise when a symlink target is already occupied.
#[derive(Error, Debug)]
pub enum CollisionError {
    /// A regular file or directory occupies the target and neither `--adopt`
    /// nor `--overwrite` was given.
    #[error("found non-symlink without adopt or overwrite option at: {path}")]
    NonSymlinkPresent {
        /// The occupied symlink target.
        path: PathBuf,
    },

    /// A symlink occupies the target but is not recorded as managed by the
    /// module being deployed.
    #[error("found existing symlink not managed by module at: {path}")]
    ForeignSymlink {
        /// The occupied symlink target.
        path: PathBuf,
    },

    /// Inspecting or adopting the target failed at the I/O level.
    #[error("could not resolve collision at {path}: {source}")]
    Io {
        /// The symlink target being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from hook subprocess execution.
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook command could not be spawned at all.
    #[error("could not spawn hook '{hook}': {source}")]
    Spawn {
        /// The hook command string.
        hook: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The hook ran but exited with a non-zero status.
    #[error("hook '{hook}' failed with exit code {code}")]
    Failed {
        /// The hook command string.
        hook: String,
        /// Exit code (-1 if terminated by a signal).
        code: i32,
    },
}
