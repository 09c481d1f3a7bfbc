use assert_cmd::prelude::*;

use predicates::prelude::*;
use predicates::str::contains;
use serial_test::serial;
use std::process::Command;

/// Helper to create a Command for the `sqlrecall` binary with a temporary root.
fn sqlrecall_cmd(root: &assert_fs::TempDir) -> Command {
  let mut cmd = Command::cargo_bin("sqlrecall").expect("binary exists");
  cmd.env("SQLRECALL_ROOT", root.path());
  cmd.env("CLICOLOR", "0");
  cmd.env("NO_COLOR", "1");
  cmd.env_remove("RUST_LOG");
  cmd
}

/// Run an add command and return the id it printed
fn add(root: &assert_fs::TempDir, args: &[&str]) -> String {
  let output = sqlrecall_cmd(root).args(args).output().unwrap();
  assert!(output.status.success(), "{:?} failed: {:?}", args, output);

  let stdout = String::from_utf8(output.stdout).unwrap();
  stdout.split_whitespace().last().expect("printed id").to_string()
}

#[test]
#[serial]
fn test_add_and_list_all_categories() {
  let temp = assert_fs::TempDir::new().unwrap();

  sqlrecall_cmd(&temp)
    .args(["add-sql", "How many users exist?", "SELECT COUNT(*) FROM users"])
    .assert()
    .success()
    .stdout(contains("Added").and(contains("-sql")));

  let ddl_id = add(&temp, &["add-ddl", "CREATE TABLE users(id INT)"]);
  let doc_id = add(&temp, &["add-doc", "Users table stores account records"]);
  assert!(ddl_id.ends_with("-ddl"));
  assert!(doc_id.ends_with("-doc"));

  sqlrecall_cmd(&temp)
    .args(["list"])
    .assert()
    .success()
    .stdout(
      contains(ddl_id.as_str())
        .and(contains(doc_id.as_str()))
        .and(contains("How many users exist?"))
        .and(contains("3 items")),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_retrieval_commands() {
  let temp = assert_fs::TempDir::new().unwrap();
  add(&temp, &["add-sql", "How many users exist?", "SELECT COUNT(*) FROM users"]);
  add(&temp, &["add-ddl", "CREATE TABLE users(id INT)"]);
  add(&temp, &["add-doc", "Users table stores account records"]);

  sqlrecall_cmd(&temp)
    .args(["similar", "user count"])
    .assert()
    .success()
    .stdout(contains("How many users exist?").and(contains("SELECT COUNT(*) FROM users")));

  sqlrecall_cmd(&temp)
    .args(["ddl", "users schema"])
    .assert()
    .success()
    .stdout(contains("CREATE TABLE users(id INT)"));

  sqlrecall_cmd(&temp)
    .args(["docs", "about users"])
    .assert()
    .success()
    .stdout(contains("Users table stores account records"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_remove_then_list() {
  let temp = assert_fs::TempDir::new().unwrap();
  let keep = add(&temp, &["add-ddl", "CREATE TABLE orders(id INT)"]);
  let removed = add(&temp, &["add-doc", "Orders are shipped weekly"]);

  sqlrecall_cmd(&temp)
    .args(["remove", &removed])
    .assert()
    .success()
    .stdout(contains("Removed"));

  sqlrecall_cmd(&temp)
    .args(["list"])
    .assert()
    .success()
    .stdout(contains(keep.as_str()).and(contains(removed.as_str()).not()).and(contains("1 items")));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_empty_store_messages() {
  let temp = assert_fs::TempDir::new().unwrap();

  sqlrecall_cmd(&temp)
    .args(["list"])
    .assert()
    .success()
    .stdout(contains("No training data stored."));

  sqlrecall_cmd(&temp)
    .args(["similar", "anything"])
    .assert()
    .success()
    .stdout(contains("No similar questions found."));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_empty_input_is_rejected() {
  let temp = assert_fs::TempDir::new().unwrap();

  sqlrecall_cmd(&temp)
    .args(["add-ddl", ""])
    .assert()
    .failure()
    .stderr(contains("ddl must not be empty"));

  sqlrecall_cmd(&temp)
    .args(["add-sql", "", "SELECT 1"])
    .assert()
    .failure()
    .stderr(contains("question must not be empty"));

  sqlrecall_cmd(&temp).args(["list"]).assert().success().stdout(contains("No training data"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_unknown_backend_config_fails() {
  let temp = assert_fs::TempDir::new().unwrap();
  std::fs::write(temp.path().join("config.yaml"), "backend:\n  kind: cassandra\n").unwrap();

  sqlrecall_cmd(&temp).args(["list"]).assert().failure().stderr(contains("Invalid config file"));

  temp.close().unwrap();
}
