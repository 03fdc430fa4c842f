//! Bootstrap scenarios: probe -> install -> load -> dispatch.
//!
//! Each test lays out a temporary project, drives a [`Launcher`] through one
//! invocation with a [`ScriptedRunner`], and checks which processes would
//! have been spawned.

use std::ffi::OsString;
use std::path::Path;

use launcher_core::{
    Error, HelpOutput, InvocationRequest, Launcher, LauncherConfig, Outcome, dispatcher,
};
use launcher_test_utils::project::DEFAULT_MANIFEST;
use launcher_test_utils::{ScriptedRunner, TestProject};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn launcher(project: &TestProject, runner: ScriptedRunner) -> Launcher<ScriptedRunner> {
    Launcher::new(project.root(), project.config(), runner)
}

fn request(argv: &[&str]) -> InvocationRequest {
    InvocationRequest::from_args(argv.iter().copied())
}

/// Arguments of a dispatched command. `DEFAULT_MANIFEST` operations declare
/// no fixed arguments, so these are exactly the forwarded ones.
fn forwarded(cmd: &launcher_core::CommandSpec) -> Vec<OsString> {
    cmd.args.clone()
}

// ============================================================================
// Package absent
// ============================================================================

#[rstest]
#[case(&["publish", "v2"])]
#[case(&["frobnicate"])]
#[case(&[])]
#[case(&["INSTALL"])]
#[tokio::test]
async fn test_absent_without_install_spawns_nothing(#[case] argv: &[&str]) {
    let project = TestProject::new();
    let l = launcher(&project, ScriptedRunner::installing(&project.package_dir(), DEFAULT_MANIFEST));

    let outcome = l.run(&request(argv)).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::NotInstalled {
            package: "bubblebot".to_string()
        }
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(l.runner().captured().is_empty());
    assert!(l.runner().ran().is_empty());
    project.assert_not_exists("node_modules");
}

#[tokio::test]
async fn test_install_when_absent_installs_once_then_dispatches() {
    let project = TestProject::new();
    let l = launcher(&project, ScriptedRunner::installing(&project.package_dir(), DEFAULT_MANIFEST));

    let outcome = l.run(&request(&["install"])).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Dispatched {
            operation: "install".to_string(),
            exit_code: 0
        }
    );

    let captured = l.runner().captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].to_string(), "npm install --save bubblebot");
    assert_eq!(captured[0].cwd, project.root());

    let ran = l.runner().ran();
    assert_eq!(ran.len(), 1);
    assert_eq!(ran[0].program, project.package_dir().join("bin/install"));
    assert!(forwarded(&ran[0]).is_empty());
}

#[tokio::test]
async fn test_install_forwards_same_args_as_when_present() {
    let args = ["--region", "eu", "fast"];
    let argv: Vec<&str> = std::iter::once("install").chain(args).collect();

    let fresh = TestProject::new();
    let l = launcher(&fresh, ScriptedRunner::installing(&fresh.package_dir(), DEFAULT_MANIFEST));
    l.run(&request(&argv)).await.unwrap();
    let after_install = forwarded(&l.runner().ran()[0]);

    let existing = TestProject::new();
    existing.install_package(DEFAULT_MANIFEST);
    let l = launcher(&existing, ScriptedRunner::succeeding());
    l.run(&request(&argv)).await.unwrap();
    let already_present = forwarded(&l.runner().ran()[0]);

    assert_eq!(after_install, args);
    assert_eq!(after_install, already_present);
}

#[tokio::test]
async fn test_install_failure_echoes_and_stops() {
    let project = TestProject::new();
    let l = launcher(&project, ScriptedRunner::failing(1, "", "network error"));

    let outcome = l.run(&request(&["install"])).await.unwrap();

    let Outcome::InstallFailed(ref failure) = outcome else {
        panic!("expected install failure, got {outcome:?}");
    };
    assert_eq!(failure.exit_code, Some(1));
    assert_eq!(failure.stderr, b"network error");
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(l.runner().captured().len(), 1, "no retry");
    assert!(l.runner().ran().is_empty(), "nothing dispatched");
}

#[tokio::test]
async fn test_missing_package_manager_is_install_failure() {
    let project = TestProject::new();
    let l = launcher(&project, ScriptedRunner::missing());

    let outcome = l.run(&request(&["install"])).await.unwrap();
    let Outcome::InstallFailed(ref failure) = outcome else {
        panic!("expected install failure, got {outcome:?}");
    };
    assert!(failure.spawn_error.is_some());
    assert_eq!(failure.exit_code, None);
}

#[tokio::test]
async fn test_install_succeeds_but_package_missing_is_fatal() {
    let project = TestProject::new();
    let l = launcher(&project, ScriptedRunner::succeeding());

    let err = l.run(&request(&["install"])).await.unwrap_err();
    assert!(matches!(err, Error::ManifestNotFound(_)), "got {err:?}");
    assert!(l.runner().ran().is_empty());
}

#[tokio::test]
async fn test_configured_package_manager_and_layout() {
    let project = TestProject::new();
    project.write_config(
        "package = \"@acme/kit\"\npackage_manager = \"pnpm\"\ndependency_dir = \"deps\"\nlock_installs = false\n",
    );
    let l = launcher(&project, ScriptedRunner::installing(&project.package_dir(), DEFAULT_MANIFEST));

    l.run(&request(&["install"])).await.unwrap();

    assert_eq!(l.runner().captured()[0].to_string(), "pnpm add @acme/kit");
    project.assert_exists("deps/@acme/kit/launcher_extension.toml");
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_package_dir_counts_as_absent() {
    use std::os::unix::fs::PermissionsExt;

    let project = TestProject::new();
    project.install_package(DEFAULT_MANIFEST);
    let package_dir = project.package_dir();
    std::fs::set_permissions(&package_dir, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read_dir(&package_dir).is_ok() {
        // Running with privileges that ignore permission bits.
        std::fs::set_permissions(&package_dir, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let l = launcher(&project, ScriptedRunner::succeeding());
    let outcome = l.run(&request(&["publish", "v2"])).await;
    std::fs::set_permissions(&package_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(
        outcome.unwrap(),
        Outcome::NotInstalled {
            package: "bubblebot".to_string()
        }
    );
    assert!(l.runner().captured().is_empty());
    assert!(l.runner().ran().is_empty());
}

// ============================================================================
// Package present
// ============================================================================

#[rstest]
#[case(&["install"])]
#[case(&["publish", "v2"])]
#[case(&["frobnicate"])]
#[case(&[])]
#[tokio::test]
async fn test_present_never_spawns_installer(#[case] argv: &[&str]) {
    let project = TestProject::new();
    project.install_package(DEFAULT_MANIFEST);
    let l = launcher(&project, ScriptedRunner::failing(1, "", "should not run"));

    l.run(&request(argv)).await.unwrap();

    assert!(l.runner().captured().is_empty());
}

#[tokio::test]
async fn test_publish_forwards_args() {
    let project = TestProject::new();
    project.install_package(DEFAULT_MANIFEST);
    let l = launcher(&project, ScriptedRunner::succeeding().with_run_exit_code(4));

    let outcome = l.run(&request(&["publish", "v2"])).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Dispatched {
            operation: "publish".to_string(),
            exit_code: 4
        }
    );
    assert_eq!(outcome.exit_code(), 4);
    let ran = l.runner().ran();
    assert_eq!(ran.len(), 1);
    assert_eq!(ran[0].program, project.package_dir().join("bin/publish"));
    assert_eq!(forwarded(&ran[0]), ["v2"]);
}

#[rstest]
#[case(&["frobnicate"])]
#[case(&["frobnicate", "a", "b"])]
#[case(&[""])]
#[case(&[])]
#[tokio::test]
async fn test_unknown_operation_shows_help(#[case] argv: &[&str]) {
    let project = TestProject::new();
    project.install_package(DEFAULT_MANIFEST);
    let l = launcher(&project, ScriptedRunner::succeeding());

    let outcome = l.run(&request(argv)).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Help(HelpOutput::Text(
            "bubblebot help: install | publish".to_string()
        ))
    );
    assert_eq!(outcome.exit_code(), 0);
    assert!(l.runner().ran().is_empty());
}

#[tokio::test]
async fn test_builtin_usage_when_extension_has_no_help() {
    let project = TestProject::new();
    project.install_package(
        r#"[extension]
name = "bubblebot"
version = "1.4.0"

[operations.publish]
command = "bin/publish"
description = "Publish a new version"
"#,
    );
    let l = launcher(&project, ScriptedRunner::succeeding());

    let outcome = l.run(&request(&["frobnicate"])).await.unwrap();
    let Outcome::Help(HelpOutput::Text(ref text)) = outcome else {
        panic!("expected usage text, got {outcome:?}");
    };
    assert!(text.contains("publish  Publish a new version"), "got {text}");
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_present_install_without_install_operation_shows_help() {
    let project = TestProject::new();
    project.install_package(
        "[extension]\nname = \"bubblebot\"\nversion = \"1.4.0\"\n\n[help]\ntext = \"only help\"\n",
    );
    let l = launcher(&project, ScriptedRunner::succeeding());

    let outcome = l.run(&request(&["install"])).await.unwrap();

    assert_eq!(outcome, Outcome::Help(HelpOutput::Text("only help".to_string())));
    assert!(l.runner().captured().is_empty());
}

#[tokio::test]
async fn test_corrupted_install_is_fatal() {
    let project = TestProject::new();
    std::fs::create_dir_all(project.package_dir()).unwrap();
    let l = launcher(&project, ScriptedRunner::succeeding());

    let err = l.run(&request(&["publish"])).await.unwrap_err();
    assert!(matches!(err, Error::ManifestNotFound(_)), "got {err:?}");
    assert!(l.runner().ran().is_empty());
}

#[tokio::test]
async fn test_override_is_exposed_but_not_dispatchable() {
    let project = TestProject::new();
    project.install_package(DEFAULT_MANIFEST);
    project.write_override("[operations.secret]\ncommand = \"bin/secret\"\n");
    let l = launcher(&project, ScriptedRunner::succeeding());

    let outcome = l.run(&request(&["secret"])).await.unwrap();
    assert!(matches!(outcome, Outcome::Help(_)), "got {outcome:?}");

    l.run(&request(&["publish"])).await.unwrap();
    let ran = l.runner().ran();
    let overlay = ran[0]
        .env
        .iter()
        .find(|(k, _)| k == dispatcher::ENV_OVERRIDE)
        .map(|(_, v)| Path::new(v).to_path_buf());
    assert_eq!(overlay, Some(project.root().join("lib/override.toml")));
}

#[tokio::test]
async fn test_refresh_failure_does_not_block_dispatch() {
    let project = TestProject::new();
    project.write_config("refresh_on_launch = true\n");
    project.install_package(DEFAULT_MANIFEST);
    let l = launcher(&project, ScriptedRunner::failing(1, "", "registry down"));

    let outcome = l.run(&request(&["publish", "v3"])).await.unwrap();

    assert!(matches!(outcome, Outcome::Dispatched { .. }), "got {outcome:?}");
    assert_eq!(l.runner().captured()[0].to_string(), "npm update bubblebot");
    assert_eq!(forwarded(&l.runner().ran()[0]), ["v3"]);
}

#[test]
fn test_default_config_when_no_file() {
    let project = TestProject::new();
    assert_eq!(project.config(), LauncherConfig::default());
}
