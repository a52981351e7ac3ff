#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the `deploy` command.
//!
//! These exercise the full pipeline end to end: module enumeration,
//! collision handling, template rendering, symlink creation, and state
//! persistence, all against a temp-dir dotfiles root.

mod common;

use std::fs;

use common::{TestRootBuilder, assert_symlink_to, deploy_args, logger};
use peridot::cli::DeployArgs;
use peridot::commands;
use peridot::state::{DeployStatus, path_key};

// ---------------------------------------------------------------------------
// Fresh deployment
// ---------------------------------------------------------------------------

/// A fresh deploy with `--dotreplace` produces the full two-stage pipeline:
/// rendered intermediate under `.peridot/`, symlink under the target root,
/// and a `Synced` state entry.
#[cfg(unix)]
#[test]
fn fresh_deploy_builds_two_stage_pipeline() {
    let root = TestRootBuilder::new()
        .with_module("kitty")
        .with_file("kitty", "dot-config/kitty/kitty.conf", "font=Fira")
        .build();

    let args = DeployArgs {
        dotreplace: true,
        ..deploy_args("kitty")
    };
    commands::deploy::run(&root.ctx(), &args, &logger()).unwrap();

    let intermediate = root.dr.join(".peridot/kitty/.config/kitty/kitty.conf");
    assert_eq!(fs::read_to_string(&intermediate).unwrap(), "font=Fira");

    let symlink = root.home.join(".config/kitty/kitty.conf");
    assert_symlink_to(&symlink, &intermediate);
    assert_eq!(fs::read_to_string(&symlink).unwrap(), "font=Fira");

    let state = root.state();
    let module = &state.modules["kitty"];
    assert_eq!(module.status, DeployStatus::Synced);
    assert!(module.deployed_at.is_some());

    let source = root.dr.join("kitty/dot-config/kitty/kitty.conf");
    let entry = &module.files[&path_key(&source)];
    assert_eq!(entry.status, DeployStatus::Synced);
    assert_eq!(entry.intermediate_path, intermediate);
    assert_eq!(entry.symlink_path, symlink);
    assert_eq!(entry.source_hash, peridot::hash::hash_file(&source).unwrap());
}

/// Without `--dotreplace` the `dot-` prefix is kept verbatim everywhere.
#[cfg(unix)]
#[test]
fn deploy_without_dotreplace_preserves_prefix() {
    let root = TestRootBuilder::new()
        .with_module("kitty")
        .with_file("kitty", "dot-config/kitty.conf", "x")
        .build();

    commands::deploy::run(&root.ctx(), &deploy_args("kitty"), &logger()).unwrap();

    assert!(root.home.join("dot-config/kitty.conf").exists());
    assert!(root.dr.join(".peridot/kitty/dot-config/kitty.conf").exists());
}

/// Deploying twice with no intervening changes leaves the persisted record
/// identical except for the `deployedAt` timestamp.
#[cfg(unix)]
#[test]
fn deploy_is_idempotent_modulo_timestamp() {
    let root = TestRootBuilder::new()
        .with_module("bash")
        .with_file("bash", "bashrc", "export EDITOR=vi")
        .build();

    commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap();
    let mut first = root.state();

    commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap();
    let mut second = root.state();

    for state in [&mut first, &mut second] {
        for module in state.modules.values_mut() {
            module.deployed_at = None;
        }
    }
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Collisions
// ---------------------------------------------------------------------------

/// A pre-existing regular file at a target path blocks deployment; neither
/// the filesystem nor the record may change.
#[cfg(unix)]
#[test]
fn collision_without_flags_fails_and_changes_nothing() {
    let root = TestRootBuilder::new()
        .with_module("bash")
        .with_file("bash", ".bashrc", "module content")
        .build();
    fs::write(root.home.join(".bashrc"), "user content").unwrap();

    let err = commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap_err();
    assert!(err.to_string().contains("non-symlink"));

    assert_eq!(
        fs::read_to_string(root.home.join(".bashrc")).unwrap(),
        "user content"
    );
    assert!(!root.dr.join(".peridot/bash").exists());

    let state = root.state();
    assert_eq!(state.modules["bash"].status, DeployStatus::NotDeployed);
    assert!(state.modules["bash"].files.is_empty());
}

/// `--adopt` imports the pre-existing file's content into the module source
/// before replacing it with a symlink.
#[cfg(unix)]
#[test]
fn adopt_imports_existing_content() {
    let root = TestRootBuilder::new()
        .with_module("bash")
        .with_file("bash", ".bashrc", "module content")
        .build();
    fs::write(root.home.join(".bashrc"), "user content").unwrap();

    let args = DeployArgs {
        adopt: true,
        ..deploy_args("bash")
    };
    commands::deploy::run(&root.ctx(), &args, &logger()).unwrap();

    let source = root.dr.join("bash/.bashrc");
    assert_eq!(fs::read_to_string(&source).unwrap(), "user content");

    let deployed = root.home.join(".bashrc");
    assert_symlink_to(&deployed, &root.dr.join(".peridot/bash/.bashrc"));
    assert_eq!(fs::read_to_string(&deployed).unwrap(), "user content");

    let state = root.state();
    assert_eq!(
        state.modules["bash"].files[&path_key(&source)].status,
        DeployStatus::Synced
    );
}

/// `--overwrite` discards the pre-existing file and deploys the module's
/// own content.
#[cfg(unix)]
#[test]
fn overwrite_discards_existing_content() {
    let root = TestRootBuilder::new()
        .with_module("bash")
        .with_file("bash", ".bashrc", "module content")
        .build();
    fs::write(root.home.join(".bashrc"), "user content").unwrap();

    let args = DeployArgs {
        overwrite: true,
        ..deploy_args("bash")
    };
    commands::deploy::run(&root.ctx(), &args, &logger()).unwrap();

    assert_eq!(
        fs::read_to_string(root.home.join(".bashrc")).unwrap(),
        "module content"
    );
}

/// A symlink planted by something else at the target path is never touched.
#[cfg(unix)]
#[test]
fn foreign_symlink_blocks_deployment() {
    let root = TestRootBuilder::new()
        .with_module("bash")
        .with_file("bash", ".bashrc", "module content")
        .build();
    let foreign_target = root.home.join("other-file");
    fs::write(&foreign_target, "someone else's").unwrap();
    std::os::unix::fs::symlink(&foreign_target, root.home.join(".bashrc")).unwrap();

    let err = commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap_err();
    assert!(err.to_string().contains("not managed by module"));
    assert_eq!(
        fs::read_link(root.home.join(".bashrc")).unwrap(),
        foreign_target
    );
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Template variables from `module.toml` are substituted into the rendered
/// intermediate, and the symlink resolves to the rendered content.
#[cfg(unix)]
#[test]
fn template_variables_are_rendered() {
    let root = TestRootBuilder::new()
        .with_module_config("kitty", "[variables]\ncolor = \"solarized\"\n")
        .with_file("kitty", "kitty.conf", "theme={{ color }}")
        .build();

    commands::deploy::run(&root.ctx(), &deploy_args("kitty"), &logger()).unwrap();

    let intermediate = root.dr.join(".peridot/kitty/kitty.conf");
    assert_eq!(fs::read_to_string(&intermediate).unwrap(), "theme=solarized");
    assert_eq!(
        fs::read_to_string(root.home.join("kitty.conf")).unwrap(),
        "theme=solarized"
    );
}

/// Binary sources bypass the template engine and are copied byte-for-byte.
#[cfg(unix)]
#[test]
fn binary_sources_are_copied_verbatim() {
    let root = TestRootBuilder::new().with_module("fonts").build();
    let payload: &[u8] = b"\x00\x01fontdata{{ color }}\x02";
    fs::write(root.dr.join("fonts/glyphs.bin"), payload).unwrap();

    commands::deploy::run(&root.ctx(), &deploy_args("fonts"), &logger()).unwrap();

    assert_eq!(
        fs::read(root.dr.join(".peridot/fonts/glyphs.bin")).unwrap(),
        payload
    );
}

// ---------------------------------------------------------------------------
// Preconditions and simulate
// ---------------------------------------------------------------------------

/// A missing binary dependency refuses the deployment without touching
/// anything.
#[cfg(unix)]
#[test]
fn missing_binary_dependency_refuses_deploy() {
    let root = TestRootBuilder::new()
        .with_module_config("bash", "dependencies = [\"peridot-no-such-program-xyz\"]\n")
        .with_file("bash", ".bashrc", "x")
        .build();

    let err = commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap_err();
    assert!(err.to_string().contains("preconditions"));
    assert!(!root.home.join(".bashrc").exists());
}

/// A module dependency is satisfied by mere presence in the record,
/// whatever its deploy status.
#[cfg(unix)]
#[test]
fn module_dependency_satisfied_by_managed_module() {
    let root = TestRootBuilder::new()
        .with_module("fonts")
        .with_module_config("kitty", "module_dependencies = [\"fonts\"]\n")
        .with_file("kitty", "kitty.conf", "x")
        .build();

    commands::deploy::run(&root.ctx(), &deploy_args("kitty"), &logger()).unwrap();
    assert_eq!(root.state().modules["kitty"].status, DeployStatus::Synced);
}

/// `--simulate` runs the full decision pass but leaves the filesystem and
/// the persisted record untouched.
#[cfg(unix)]
#[test]
fn simulate_is_read_only() {
    let root = TestRootBuilder::new()
        .with_module("kitty")
        .with_file("kitty", "dot-config/kitty.conf", "font=Fira")
        .build();
    let record_before = fs::read_to_string(peridot::paths::state_file(&root.dr)).unwrap();

    let args = DeployArgs {
        simulate: true,
        dotreplace: true,
        ..deploy_args("kitty")
    };
    commands::deploy::run(&root.ctx(), &args, &logger()).unwrap();

    assert!(!root.dr.join(".peridot/kitty").exists());
    assert!(!root.home.join(".config").exists());
    assert_eq!(
        fs::read_to_string(peridot::paths::state_file(&root.dr)).unwrap(),
        record_before
    );
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// A failing pre-deploy hook aborts before any file operation.
#[cfg(unix)]
#[test]
fn failing_pre_deploy_hook_aborts() {
    let root = TestRootBuilder::new()
        .with_module_config("bash", "[hooks]\npre_deploy = \"false\"\n")
        .with_file("bash", ".bashrc", "x")
        .build();

    let err = commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap_err();
    assert!(err.to_string().contains("pre-deploy"));
    assert!(!root.home.join(".bashrc").exists());
    assert_eq!(root.state().modules["bash"].status, DeployStatus::NotDeployed);
}

/// Hooks run with the module directory as working directory.
#[cfg(unix)]
#[test]
fn post_deploy_hook_runs_after_linking() {
    let root = TestRootBuilder::new()
        .with_module_config("bash", "[hooks]\npost_deploy = \"touch deployed-marker\"\n")
        .with_file("bash", ".bashrc", "x")
        .build();

    commands::deploy::run(&root.ctx(), &deploy_args("bash"), &logger()).unwrap();
    assert!(root.dr.join("bash/deployed-marker").exists());
}
