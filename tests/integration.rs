use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn preflight_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_preflight"))
}

/// Write a config whose only external dependency is a package that cannot
/// exist, with everything else pointing into `root`.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/notes.md"), "# Notes\n").unwrap();

    let config_content = format!(
        r#"install_command = "pkg add"

[[packages]]
name = "definitely-not-installed-preflight-tool"
install_name = "preflight-test-pkg"

[data]
path = "{root}/data"

[store]
path = "{root}/data/ctx.sqlite"
timeout_secs = 2

[server]
entry_point = "{root}/server.py"
url = "http://127.0.0.1:9"
timeout_secs = 1

[client_config]
path = "{root}/client.json"

[[optional_files]]
description = "editor settings"
path = "{root}/settings.json"
"#,
        root = root.display()
    );

    let config_path = root.join("config/preflight.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_preflight(config_path: &Path, args: &[&str]) -> (String, String, i32) {
    let binary = preflight_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("--no-color")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run preflight binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

#[test]
fn test_check_reports_issues_and_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, code) = run_preflight(&config_path, &["check"]);
    assert_eq!(code, 1, "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("✗ package:definitely-not-installed-preflight-tool"));
    assert!(stdout.contains("✓ path:data folder"));
    assert!(stdout.contains("(1 item)"));
    assert!(stdout.contains("⚠ client-config"));
    assert!(stdout.contains("⚠ path:editor settings"));
    assert!(stdout.contains("Some issues found"));
    assert!(stdout.contains("Install with: pkg add preflight-test-pkg"));
}

#[test]
fn test_check_json_output() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, code) = run_preflight(&config_path, &["check", "--format", "json"]);
    assert_eq!(code, 1, "stderr={}", stderr);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["suite"], "check");
    assert_eq!(report["overall"], "FAILED");

    let results = report["results"].as_array().unwrap();
    assert_eq!(results[0]["status"], "FAILED");
    assert_eq!(
        results[0]["detail"]["missing_package"],
        "definitely-not-installed-preflight-tool"
    );
    let store = results.iter().find(|r| r["name"] == "store").unwrap();
    assert_eq!(store["status"], "FAILED");
}

#[test]
fn test_connect_missing_store_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _stderr, code) = run_preflight(&config_path, &["connect"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("✗ store"));
    assert!(stdout.contains("Run ingestion first"));
}

#[test]
fn test_verify_strict_turns_warnings_into_failure() {
    let (tmp, config_path) = setup_test_env();
    let root = tmp.path();
    fs::write(root.join("server.py"), "").unwrap();

    // Store with one document so every required check passes.
    let store = root.join("data/ctx.sqlite");
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
            let options = SqliteConnectOptions::new()
                .filename(&store)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
            sqlx::query("CREATE TABLE documents (id TEXT PRIMARY KEY, source TEXT NOT NULL)")
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query("INSERT INTO documents (id, source) VALUES ('d1', 'filesystem:docs')")
                .execute(&pool)
                .await
                .unwrap();
            pool.close().await;
        });

    let (stdout, stderr, code) = run_preflight(&config_path, &["verify"]);
    assert_eq!(code, 0, "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("⚠ tools"));
    assert!(stdout.contains("✓ store"));
    assert!(stdout.contains("- filesystem:docs: 1 documents"));

    let (_, _, strict_code) = run_preflight(&config_path, &["verify", "--strict"]);
    assert_eq!(strict_code, 1);
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("preflight.toml");
    fs::write(&config_path, "[store\npath = 1").unwrap();

    let (_stdout, stderr, code) = run_preflight(&config_path, &["check"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to parse config file"), "{}", stderr);
}
