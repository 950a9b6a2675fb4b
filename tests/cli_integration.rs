//! Integration tests for the credvault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  Every
//! run gets its own data directory, a low iteration count through
//! `config.toml`, and the account password through `CREDVAULT_PASSWORD`
//! so nothing prompts.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use predicates::prelude::*;

const PASSWORD: &str = "Correct-Horse1!";

/// Helper: get a Command pointing at the credvault binary.
fn credvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("credvault").expect("binary should exist");
    cmd.env_remove("CREDVAULT_HOME")
        .env_remove("CREDVAULT_ACCOUNT")
        .env_remove("CREDVAULT_PASSWORD")
        .env_remove("CREDVAULT_LOG");
    cmd
}

/// Helper: a data dir with a fast config.
fn data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("config.toml")
        .write_str("kdf_iterations = 10000\n")
        .unwrap();
    tmp
}

/// Helper: a command bound to `dir`, signed in as alice.
fn as_alice(dir: &TempDir, password: &str) -> Command {
    let mut cmd = credvault();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .args(["--account", "alice"])
        .env("CREDVAULT_PASSWORD", password);
    cmd
}

fn signup(dir: &TempDir) {
    credvault()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["signup", "alice"])
        .env("CREDVAULT_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::contains("Account 'alice' created"));
}

#[test]
fn help_flag_shows_usage() {
    credvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted credential vault"))
        .stdout(predicate::str::contains("signup"))
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("new-vault"));
}

#[test]
fn version_flag_shows_version() {
    credvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}

#[test]
fn no_args_shows_help() {
    credvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn signup_creates_files() {
    let dir = data_dir();
    signup(&dir);

    dir.child(".auth/auth.json").assert(predicate::path::is_file());
    dir.child("alice/safe-vault.json")
        .assert(predicate::path::is_file());
}

#[test]
fn duplicate_signup_fails() {
    let dir = data_dir();
    signup(&dir);

    credvault()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["signup", "alice"])
        .env("CREDVAULT_PASSWORD", "something-else")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_get_list_roundtrip() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["add", "github", "alice99", "--password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added to safe-vault (1 total)"));

    as_alice(&dir, PASSWORD)
        .args(["get", "GitHub"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice99"))
        .stdout(predicate::str::contains("hunter2"));

    as_alice(&dir, PASSWORD)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn add_reads_piped_password() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["add", "gitlab", "alice"])
        .write_stdin("piped-secret\n")
        .assert()
        .success();

    as_alice(&dir, PASSWORD)
        .args(["get", "gitlab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("piped-secret"));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect username or password"));
}

#[test]
fn unknown_account_gets_the_same_message() {
    let dir = data_dir();
    signup(&dir);

    credvault()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--account", "mallory", "list"])
        .env("CREDVAULT_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect username or password"));
}

#[test]
fn delete_and_update() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["add", "github", "alice99", "--password", "hunter2"])
        .assert()
        .success();

    as_alice(&dir, PASSWORD)
        .args(["update", "github", "username", "alice100"])
        .assert()
        .success();

    as_alice(&dir, PASSWORD)
        .args(["get", "github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice100"));

    as_alice(&dir, PASSWORD)
        .args(["delete", "GitHub", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted credential 'github'"));

    as_alice(&dir, PASSWORD)
        .args(["get", "github"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No credential found"));
}

#[test]
fn update_rejects_unknown_field() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["update", "github", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn tampered_vault_is_refused() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["add", "github", "alice99", "--password", "hunter2"])
        .assert()
        .success();

    // Flip one ciphertext byte on disk.
    let path = dir.path().join("alice/safe-vault.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let mut ciphertext = BASE64
        .decode(doc["ciphertext"].as_str().unwrap())
        .unwrap();
    ciphertext[0] ^= 0x01;
    doc["ciphertext"] = serde_json::Value::String(BASE64.encode(&ciphertext));
    std::fs::write(&path, doc.to_string()).unwrap();

    as_alice(&dir, PASSWORD)
        .args(["get", "github"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tampered"));
}

#[test]
fn new_vault_and_vaults_listing() {
    let dir = data_dir();
    signup(&dir);

    as_alice(&dir, PASSWORD)
        .args(["new-vault", "work"])
        .assert()
        .success();

    as_alice(&dir, PASSWORD)
        .arg("vaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("safe-vault"))
        .stdout(predicate::str::contains("work"));

    as_alice(&dir, PASSWORD)
        .args(["--vault", "work", "add", "jira", "alice", "--password", "pw"])
        .assert()
        .success();

    as_alice(&dir, PASSWORD)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("jira").not());
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    dir.child("config.toml")
        .write_str("kdf_iterations = 5\n")
        .unwrap();

    credvault()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["signup", "alice"])
        .env("CREDVAULT_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("kdf_iterations"));
}

#[test]
fn completions_generate_script() {
    credvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}
