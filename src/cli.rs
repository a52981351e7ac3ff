use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the peridot dotfiles manager.
#[derive(Parser, Debug)]
#[command(
    name = "peridot",
    about = "Module-based dotfiles manager with templated symlink deployment",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the dotfiles dir and an empty state record
    #[command(visible_alias = "i")]
    Init(InitArgs),
    /// Add a module to the dotfiles directory
    #[command(visible_alias = "a")]
    Add(AddArgs),
    /// Deploy a module's files as symlinks into the target root
    #[command(visible_alias = "d")]
    Deploy(DeployArgs),
    /// Remove a module, restoring real files in place of its symlinks
    #[command(visible_alias = "r")]
    Remove(RemoveArgs),
    /// Display the current state of the dotfiles dir
    #[command(visible_alias = "s")]
    Status,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {
    /// Path of the dir to be initialized
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Initialize the current dir
    #[arg(short = 'H', long, conflicts_with = "dir")]
    pub here: bool,
}

/// Arguments for the `add` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Name of the module to add
    pub module: String,
}

/// Arguments for the `deploy` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    /// Name of the module to deploy
    pub module: String,

    /// Root path to which the module dir's structure is deployed
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Rename intermediate files and symlinks from dot-* to .*
    #[arg(short = 'D', long)]
    pub dotreplace: bool,

    /// Don't make any changes, merely show what would be done
    #[arg(short, long)]
    pub simulate: bool,

    /// Import existing files at target paths into the module before linking
    #[arg(short, long)]
    pub adopt: bool,

    /// Forcefully replace existing files at target paths
    #[arg(short = 'O', long, conflicts_with = "adopt")]
    pub overwrite: bool,
}

/// Arguments for the `remove` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Name of the module to remove
    pub module: String,
}
