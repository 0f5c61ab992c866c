use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Helper to create a test command
fn nodepoolctl() -> Command {
    let mut cmd = Command::cargo_bin("nodepoolctl").unwrap();
    cmd.env_remove("NODEPOOLCTL_PROFILE")
        .env_remove("NODEPOOLCTL_CONFIG_FILE")
        .env_remove("NODEPOOLCTL_AUTH_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Command bound to an isolated config file
fn with_config(config: &Path) -> Command {
    let mut cmd = nodepoolctl();
    cmd.arg("--config-file").arg(config);
    cmd
}

fn set_profile(config: &Path, name: &str, compartment: &str) {
    with_config(config)
        .args(["profile", "set", name, "--region", "us-ashburn-1"])
        .args(["--compartment-id", compartment])
        .args(["--auth-token", "secret-token"])
        .assert()
        .success();
}

#[test]
fn test_help_flag() {
    nodepoolctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Node pool management CLI"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    nodepoolctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nodepoolctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json() {
    nodepoolctl()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn test_no_args_shows_help() {
    nodepoolctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    nodepoolctl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_node_pool_help() {
    nodepoolctl()
        .args(["node-pool", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("ready"));
}

#[test]
fn test_work_request_wait_help() {
    nodepoolctl()
        .args(["work-request", "wait", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("Ctrl-C"));
}

#[test]
fn test_list_requires_cluster_id() {
    nodepoolctl()
        .args(["node-pool", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--cluster-id"));
}

#[test]
fn test_completions_bash() {
    nodepoolctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodepoolctl"));
}

#[test]
fn test_profile_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    set_profile(&config, "prod", "ocid1.compartment.oc1..prod");
    set_profile(&config, "dev", "ocid1.compartment.oc1..dev");

    with_config(&config)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod (default)"))
        .stdout(predicate::str::contains("dev"));

    with_config(&config)
        .args(["profile", "show", "prod", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ocid1.compartment.oc1..prod"))
        .stdout(predicate::str::contains("secr..."))
        .stdout(predicate::str::contains("secret-token").not());

    with_config(&config)
        .args(["profile", "default", "dev"])
        .assert()
        .success();

    with_config(&config)
        .args(["profile", "remove", "prod", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("default_profile = \"dev\""));
    assert!(!saved.contains("[profiles.prod]"));
}

#[test]
fn test_profile_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir.path().join("config.toml"))
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_profile_show_unknown_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    set_profile(&config, "prod", "ocid1.compartment.oc1..prod");

    with_config(&config)
        .args(["profile", "show", "staging"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'staging' not found"));
}

#[test]
fn test_node_pool_without_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir.path().join("config.toml"))
        .args(["node-pool", "ready", "pool-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile configured"));
}

#[test]
fn test_kubeconfig_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let kubeconfig = dir.path().join("kubeconfig");
    std::fs::write(
        &kubeconfig,
        r#"
apiVersion: v1
kind: Config
current-context: ctx
clusters:
  - name: c1
    cluster:
      server: https://10.0.0.1:6443
contexts:
  - name: ctx
    context:
      cluster: c1
      user: u1
users:
  - name: u1
    user:
      token: very-secret-token
"#,
    )
    .unwrap();

    with_config(&dir.path().join("config.toml"))
        .args(["kubeconfig", "inspect"])
        .arg(&kubeconfig)
        .args(["-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://10.0.0.1:6443"))
        .stdout(predicate::str::contains("\"token\""))
        .stdout(predicate::str::contains("very-secret-token").not());
}

#[test]
fn test_kubeconfig_inspect_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir.path().join("config.toml"))
        .args(["kubeconfig", "inspect", "/nonexistent/kubeconfig"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("File error"));
}
