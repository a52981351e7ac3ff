// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed dotfiles root and a fluent builder
// so each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use peridot::cli::DeployArgs;
use peridot::commands::AppContext;
use peridot::logging::Logger;
use peridot::state::State;

/// An isolated dotfiles root backed by a [`tempfile::TempDir`].
///
/// Contains an initialized `.peridot/state.json`, a `home/` directory usable
/// as the deployment target root, and whatever modules the builder created.
/// Deleted automatically on drop.
pub struct TestRoot {
    tmp: tempfile::TempDir,
    /// The dotfiles root (a subdirectory of the temp dir).
    pub dr: PathBuf,
    /// A target root standing in for the user's home directory.
    pub home: PathBuf,
}

impl TestRoot {
    /// Create an initialized, empty dotfiles root.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let dr = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(peridot::paths::peridot_dir(&dr)).expect("create .peridot");
        std::fs::create_dir_all(&home).expect("create home");
        State::default().save(&dr).expect("write empty state");
        Self { tmp, dr, home }
    }

    /// Command context rooted at this dotfiles dir.
    pub fn ctx(&self) -> AppContext {
        AppContext::at(&self.dr)
    }

    /// Load the persisted state record.
    pub fn state(&self) -> State {
        State::load(&self.dr).expect("load state")
    }

    /// Register `module` in the persisted state record (status NotDeployed).
    pub fn manage(&self, module: &str) {
        let mut state = self.state();
        state.modules.entry(module.to_string()).or_default();
        state.save(&self.dr).expect("save state");
    }

    /// Write a source file inside a module directory.
    pub fn write_module_file(&self, module: &str, rel: &str, content: &str) {
        let path = self.dr.join(module).join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create module subdirs");
        }
        std::fs::write(&path, content).expect("write module file");
    }

    /// Write a `module.toml` with the given extra lines appended after the
    /// standard `root`/`ignore` preamble.
    pub fn write_module_config(&self, module: &str, extra: &str) {
        let dir = self.dr.join(module);
        std::fs::create_dir_all(&dir).expect("create module dir");
        let config = format!(
            "root = \"{}\"\nignore = [\"module.toml\"]\n{extra}",
            self.home.display()
        );
        std::fs::write(dir.join("module.toml"), config).expect("write module.toml");
    }
}

/// Fluent builder over [`TestRoot`]: declare modules, their files, and their
/// configuration before the test body runs.
pub struct TestRootBuilder {
    root: TestRoot,
}

impl TestRootBuilder {
    pub fn new() -> Self {
        Self {
            root: TestRoot::new(),
        }
    }

    /// Add a managed module with a standard config pointing at `home/`.
    pub fn with_module(self, name: &str) -> Self {
        self.root.write_module_config(name, "");
        self.root.manage(name);
        self
    }

    /// Add a managed module whose config has extra TOML lines appended.
    pub fn with_module_config(self, name: &str, extra: &str) -> Self {
        self.root.write_module_config(name, extra);
        self.root.manage(name);
        self
    }

    /// Add a source file to a previously declared module.
    pub fn with_file(self, module: &str, rel: &str, content: &str) -> Self {
        self.root.write_module_file(module, rel, content);
        self
    }

    pub fn build(self) -> TestRoot {
        self.root
    }
}

/// Deploy arguments with all flags off.
pub fn deploy_args(module: &str) -> DeployArgs {
    DeployArgs {
        module: module.to_string(),
        root: None,
        dotreplace: false,
        simulate: false,
        adopt: false,
        overwrite: false,
    }
}

/// A logger handle for tests; console/file output is irrelevant here.
pub fn logger() -> Logger {
    Logger::new()
}

/// Assert that `path` is a symlink pointing at `expected_target`.
pub fn assert_symlink_to(path: &Path, expected_target: &Path) {
    let meta = std::fs::symlink_metadata(path)
        .unwrap_or_else(|_| panic!("expected symlink at {}", path.display()));
    assert!(meta.is_symlink(), "{} should be a symlink", path.display());
    assert_eq!(
        std::fs::read_link(path).expect("read link"),
        expected_target,
        "symlink target mismatch for {}",
        path.display()
    );
}
