//! End-to-End CLI Tests for rbc
//!
//! These tests run the binary in a temporary working directory and check
//! its output and exit codes. On unix, `echo` and `false` stand in for
//! rsync so the composed command line can be inspected.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn rbc_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rbc").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RBC_MONITOR")
        .env_remove("RBC_CONFIG_FILE")
        .env_remove("RBC_DRYRUN")
        .env_remove("RBC_VERBOSE")
        .env_remove("RBC_LISTHOSTS")
        .env_remove("RBC_RSYNC_BINARY");
    cmd
}

fn setup_project(config: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".sync.toml"), config).unwrap();
    temp_dir
}

const TWO_REMOTES: &str = r#"
rsync_options = ["--timeout=30"]

[server]
hostname = "server.example"
target_folder = "/srv/project"
rsync_options = ["--delete"]

[laptop]
hostname = "laptop.local"
target_folder = "/home/me/project"
default = true
"#;

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[test]
fn test_cli_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();

    rbc_cmd(&temp_dir)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Please make sure"))
        .stderr(predicate::str::contains(".sync.toml"));
}

#[test]
fn test_cli_config_file_option() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("other.toml"),
        "[a]\nhostname = \"h\"\ntarget_folder = \"/a\"\n",
    )
    .unwrap();

    rbc_cmd(&temp_dir)
        .arg("--config_file")
        .arg("other.toml")
        .arg("--listhosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("Specified entries in other.toml are:"));
}

#[test]
fn test_cli_config_file_from_env() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("env.toml"),
        "[a]\nhostname = \"h\"\ntarget_folder = \"/a\"\n",
    )
    .unwrap();

    rbc_cmd(&temp_dir)
        .env("RBC_CONFIG_FILE", "env.toml")
        .arg("--listhosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("env.toml"));
}

#[test]
fn test_cli_unknown_entry() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("server,nas")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No entry nas is known"))
        .stderr(predicate::str::contains("server, laptop"));
}

#[test]
fn test_cli_missing_target_folder() {
    let temp_dir = setup_project("[broken]\nhostname = \"h\"\n");

    rbc_cmd(&temp_dir)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does not have a target folder"));
}

#[test]
fn test_cli_missing_local_target() {
    let temp_dir = setup_project("[local]\ntarget_folder = \"no-such-dir\"\n");

    rbc_cmd(&temp_dir)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("no-such-dir"));
}

#[test]
fn test_cli_missing_source_folder() {
    let temp_dir = setup_project(
        "[e]\nsource_folder = \"nowhere\"\nhostname = \"h\"\ntarget_folder = \"/a\"\n",
    );

    rbc_cmd(&temp_dir)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_cli_monitor_rejects_gather() {
    let temp_dir =
        setup_project("[pull]\nhostname = \"h\"\ntarget_folder = \"/a\"\ngather = true\n");

    rbc_cmd(&temp_dir)
        .arg("--monitor")
        .assert()
        .code(8)
        .stderr(predicate::str::contains("monitor mode"));
}

// =============================================================================
// LISTING
// =============================================================================

#[test]
fn test_cli_listhosts() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("--listhosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("\t server\n\t laptop\n"))
        .stdout(predicate::str::contains("hostname").not());
}

#[test]
fn test_cli_listhosts_verbose_shows_keys() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("--listhosts")
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostname: server.example"));
}

// =============================================================================
// SYNCING (unix: a stand-in program replaces rsync)
// =============================================================================

#[cfg(unix)]
#[test]
fn test_cli_default_entry_command_line() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("--rsync_binary")
        .arg("echo")
        .arg("--dryrun")
        .arg("-o")
        .arg("--chmod=755")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using entry: "))
        .stdout(predicate::str::contains(
            "--exclude=.sync.toml --dry-run --timeout=30 --chmod=755",
        ))
        .stdout(predicate::str::contains("laptop.local:/home/me/project"));
}

#[cfg(unix)]
#[test]
fn test_cli_multi_entry_sync() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("server,laptop")
        .arg("--rsync_binary")
        .arg("echo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Syncing entry"))
        .stdout(predicate::str::contains("--delete --timeout=30"))
        .stdout(predicate::str::contains("server.example:/srv/project"))
        .stdout(predicate::str::contains("laptop.local:/home/me/project"));
}

#[cfg(unix)]
#[test]
fn test_cli_transfer_failure() {
    let temp_dir = setup_project(TWO_REMOTES);

    rbc_cmd(&temp_dir)
        .arg("server")
        .arg("--rsync_binary")
        .arg("false")
        .assert()
        .code(9)
        .stderr(predicate::str::contains("rsync failed for entry server"));
}

#[cfg(unix)]
#[test]
fn test_cli_deprecated_keys_warn() {
    let temp_dir = setup_project(
        "[old]\nlocal_folder = \".\"\nremote_folder = \"/r\"\nhostname = \"h\"\n",
    );

    rbc_cmd(&temp_dir)
        .arg("--rsync_binary")
        .arg("echo")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "sed -i -- 's/local_folder/source_folder/g' .sync.toml",
        ))
        .stderr(predicate::str::contains(
            "sed -i -- 's/remote_folder/target_folder/g' .sync.toml",
        ))
        .stdout(predicate::str::contains("./ h:/r"));
}

#[cfg(unix)]
#[test]
fn test_cli_local_sync_between_folders() {
    let temp_dir = setup_project("[local]\nsource_folder = \"src\"\ntarget_folder = \"dst\"\n");
    fs::create_dir(temp_dir.path().join("src")).unwrap();
    fs::create_dir(temp_dir.path().join("dst")).unwrap();

    rbc_cmd(&temp_dir)
        .arg("local")
        .arg("--rsync_binary")
        .arg("echo")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/ dst"));
}
