//! End-to-end tests of the `fastback` binary against a SQLite file.

use assert_cmd::Command;
use predicates::prelude::*;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &[&str] = &[
    "CREATE TABLE pedido (id INTEGER PRIMARY KEY AUTOINCREMENT, cliente TEXT NOT NULL)",
    "CREATE TABLE item_pedido (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pedido_id INTEGER NOT NULL REFERENCES pedido(id),
        produto TEXT
    )",
    "CREATE TABLE log_acesso (linha TEXT, quando DATETIME)",
];

/// A temp dir holding `shop.db` with the schema above
async fn database() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    let url = format!("sqlite://{}", path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("{}?mode=rwc", url))
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    (dir, url)
}

fn fastback(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fastback").unwrap();
    cmd.current_dir(dir).env_remove("DATABASE_URL").env_remove("RUST_LOG");
    cmd
}

fn out(dir: &Path) -> PathBuf {
    dir.join("out")
}

#[tokio::test]
async fn test_all_writes_every_layer() {
    let (dir, url) = database().await;

    fastback(dir.path())
        .args(["all", "--database-url", &url, "--output"])
        .arg(out(dir.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"))
        .stdout(predicate::str::contains("log_acesso"));

    let src = out(dir.path()).join("src");
    for file in [
        "models/mod.rs",
        "models/pedido.rs",
        "models/log_acesso.rs",
        "repositories/mod.rs",
        "repositories/pedido_repository.rs",
        "controllers/mod.rs",
        "controllers/item_pedido_controller.rs",
    ] {
        assert!(src.join(file).is_file(), "missing {}", file);
    }
    assert!(!src.join("repositories/log_acesso_repository.rs").exists());

    let repository = std::fs::read_to_string(src.join("repositories/pedido_repository.rs")).unwrap();
    assert!(repository.contains("pub async fn save_master_detail"));
    assert!(repository.contains("pub async fn find_with_details"));

    let controller = std::fs::read_to_string(src.join("controllers/pedido_controller.rs")).unwrap();
    assert!(controller.contains("\"/pedido/savemasterdetail\""));
    assert!(controller.contains("\"/pedido/{id}/details\""));
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let (dir, url) = database().await;
    let repository = out(dir.path()).join("src/repositories/pedido_repository.rs");
    let run = || {
        fastback(dir.path())
            .args(["repositories", "--database-url", &url, "--output"])
            .arg(out(dir.path()))
            .assert()
            .success();
        std::fs::read_to_string(&repository).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stale_files_reported_then_pruned() {
    let (dir, url) = database().await;
    let models = out(dir.path()).join("src/models");
    std::fs::create_dir_all(&models).unwrap();
    let stale = models.join("cliente_antigo.rs");
    std::fs::write(&stale, "// left over").unwrap();

    fastback(dir.path())
        .args(["models", "--database-url", &url, "--output"])
        .arg(out(dir.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("stale"));
    assert!(stale.exists());

    fastback(dir.path())
        .args(["models", "--prune", "--database-url", &url, "--output"])
        .arg(out(dir.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("pruned"));
    assert!(!stale.exists());
}

#[tokio::test]
async fn test_config_file_supplies_url_and_dirs() {
    let (dir, url) = database().await;
    std::fs::write(
        dir.path().join("fastback.toml"),
        format!(
            "database_url = \"{}\"\noutput_dir = \"api\"\n\n[directories]\ncontrollers = \"src/http\"\n",
            url
        ),
    )
    .unwrap();

    fastback(dir.path()).arg("controllers").assert().success();

    assert!(dir.path().join("api/src/http/pedido_controller.rs").is_file());
}

#[tokio::test]
async fn test_inspect_json_is_parseable() {
    let (dir, url) = database().await;

    let assert = fastback(dir.path())
        .args(["inspect", "--json", "--database-url", &url])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(snapshot["database"], "sqlite");
    assert_eq!(snapshot["tables"].as_array().unwrap().len(), 3);
}

#[test]
fn test_missing_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    fastback(dir.path())
        .arg("models")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("database_url"));
}

#[test]
fn test_unreachable_schema_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.db");
    fastback(dir.path())
        .args(["all", "--database-url"])
        .arg(format!("sqlite://{}", missing.display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not connect"));
}
