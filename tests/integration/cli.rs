//! Integration tests for the deephash binary

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const BASE_DIGEST: &str = "sha256:7596d1698657544a253c37e0112c34ad36f471912fd7598cda4ac1ec6cb86f27";

/// Command isolated from the user's global config and log settings.
fn deephash(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_deephash"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("DEEPHASH_ENV")
        .env_remove("DEEPHASH_LOG")
        .env_remove("DEEPHASH_LOG_FORMAT")
        .env_remove("DEEPHASH_LOG_OUTPUT")
        .env_remove("DEEPHASH_LOG_MODULES")
        .env_remove("DEEPHASH__LOGGING__ENABLED")
        .env_remove("DEEPHASH__LOGGING__LEVEL")
        .env_remove("DEEPHASH__TREE__ALGORITHM")
        .env_remove("DEEPHASH__TREE__IGNORE_PATTERNS");
    cmd
}

fn chart_fixture(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("chart");
    fs::create_dir(&root).unwrap();
    fs::write(
        root.join("Chart.yaml"),
        "apiVersion: v2\nname: demo\nversion: 0.1.0\n",
    )
    .unwrap();
    fs::write(root.join("values.yaml"), "replicaCount: 1\n").unwrap();
    root
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn run_with_stdin(mut cmd: Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The binary may exit before reading stdin.
    let _ = child.stdin.take().unwrap().write_all(input);
    child.wait_with_output().unwrap()
}

#[test]
fn test_tree_prints_digest_and_root() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        stdout(&output),
        format!("{}  {}", BASE_DIGEST, root.display())
    );
}

#[test]
fn test_tree_with_ignore_flag_and_multiple_roots() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);
    let noisy = temp.path().join("noisy");
    fs::create_dir(&noisy).unwrap();
    for name in ["Chart.yaml", "values.yaml"] {
        fs::copy(root.join(name), noisy.join(name)).unwrap();
    }
    fs::write(noisy.join("rand.x1.yaml"), "seed: 7\n").unwrap();

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .args(["tree", "--ignore", "rand*"])
        .arg(&root)
        .arg(&noisy)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with(BASE_DIGEST)));
    assert!(lines[1].ends_with("noisy"));
}

#[test]
fn test_tree_uses_workspace_config_and_env_override() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);
    fs::write(root.join("values.yaml.bak"), "old").unwrap();
    fs::create_dir(temp.path().join("config")).unwrap();
    fs::write(
        temp.path().join("config").join("config.toml"),
        "[tree]\nignore_patterns = [\"*.bak\"]\n",
    )
    .unwrap();

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();
    assert!(stdout(&output).starts_with(BASE_DIGEST), "{:?}", output);

    let output = deephash(temp.path())
        .env("DEEPHASH__TREE__ALGORITHM", "sha512")
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();
    assert!(stdout(&output).starts_with("sha512:"), "{:?}", output);
}

#[test]
fn test_tree_list_shows_leaves() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .args(["tree", "--list"])
        .arg(&root)
        .output()
        .unwrap();

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("  Chart.yaml"));
    assert!(lines[1].ends_with("  values.yaml"));
    assert!(lines[2].starts_with(BASE_DIGEST));
}

#[test]
fn test_tree_missing_root_fails() {
    let temp = TempDir::new().unwrap();

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(temp.path().join("absent"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_fingerprint_reads_stdin() {
    let temp = TempDir::new().unwrap();
    let mut cmd = deephash(temp.path());
    cmd.arg("--workspace").arg(temp.path()).arg("fingerprint");

    let output = run_with_stdin(cmd, b"null");
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "7ff4bcbd88");
}

#[test]
fn test_fingerprint_yaml_matches_json() {
    let temp = TempDir::new().unwrap();
    let yaml = temp.path().join("values.yaml");
    let json = temp.path().join("values.json");
    fs::write(&yaml, "image:\n  tag: \"1.0\"\nreplicas: 2\n").unwrap();
    fs::write(&json, r#"{"replicas": 2, "image": {"tag": "1.0"}}"#).unwrap();

    let from_yaml = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .args(["fingerprint", "--format", "yaml"])
        .arg(&yaml)
        .output()
        .unwrap();
    let from_json = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("fingerprint")
        .arg(&json)
        .output()
        .unwrap();

    assert!(from_yaml.status.success(), "{:?}", from_yaml);
    assert_eq!(stdout(&from_yaml), stdout(&from_json));
    assert_eq!(stdout(&from_yaml).len(), 10);
}

#[test]
fn test_sign_with_key_env() {
    let temp = TempDir::new().unwrap();
    let mut cmd = deephash(temp.path());
    cmd.env("RELEASE_KEY", "abcd")
        .arg("--workspace")
        .arg(temp.path())
        .args(["sign", "--key-env", "RELEASE_KEY"]);

    let output = run_with_stdin(cmd, b"abcd");
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        stdout(&output),
        "e1a20dce13e4953e3d50e7f6651a0ce862a655fc84c35352447eff99a5a02852"
    );
}

#[test]
fn test_sign_with_unset_key_env_fails() {
    let temp = TempDir::new().unwrap();
    let mut cmd = deephash(temp.path());
    cmd.env_remove("DEEPHASH_TEST_UNSET_KEY")
        .arg("--workspace")
        .arg(temp.path())
        .args(["sign", "--key-env", "DEEPHASH_TEST_UNSET_KEY"]);

    let output = run_with_stdin(cmd, b"payload");
    assert!(!output.status.success());
}

#[test]
fn test_verbose_logs_stay_off_stdout() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);

    let output = deephash(temp.path())
        .args(["--verbose", "--log-level", "debug", "--workspace"])
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output).lines().count(), 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Computed tree digest"));
}

#[test]
fn test_logging_stays_off_by_default() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert!(output.stderr.is_empty(), "{:?}", output);
}

#[test]
fn test_workspace_config_can_enable_logging() {
    let temp = TempDir::new().unwrap();
    let root = chart_fixture(&temp);
    fs::create_dir(temp.path().join("config")).unwrap();
    fs::write(
        temp.path().join("config").join("config.toml"),
        "[logging]\nenabled = true\nlevel = \"debug\"\n",
    )
    .unwrap();

    let output = deephash(temp.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("tree")
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output).lines().count(), 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Computed tree digest"));
}
