use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Workspace with a fast-hashing config and its own data directory
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("config.toml"), "[auth]\nbcrypt_cost = 4\n").expect("config");
    dir
}

fn tb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("threadboard").expect("bin");
    cmd.current_dir(dir.path())
        .env_remove("THREADBOARD_PASSWORD")
        .env_remove("THREADBOARD_CONFIG")
        .env_remove("THREADBOARD_DATA_DIR")
        .env("NO_COLOR", "1")
        .arg("--no-color")
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn signup(dir: &TempDir, email: &str) {
    tb(dir)
        .args(["signup", email, "--password", "hunter22"])
        .assert()
        .success();
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("threadboard")
        .expect("bin")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("threaded discussions"))
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("comment"));
}

#[test]
fn whoami_without_session() {
    let dir = workspace();
    tb(&dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn signup_keeps_session_between_runs() {
    let dir = workspace();
    tb(&dir)
        .args(["signup", "alice@example.com", "--password", "hunter22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as alice"));

    tb(&dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice (alice@example.com)"));

    tb(&dir).arg("logout").assert().success();
    tb(&dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn signup_rejects_bad_input() {
    let dir = workspace();
    tb(&dir)
        .args(["signup", "not-an-email", "--password", "hunter22"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a valid email address"));

    tb(&dir)
        .args([
            "signup",
            "alice@example.com",
            "--password",
            "hunter22",
            "--confirm",
            "hunter23",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Passwords do not match"));

    signup(&dir, "alice@example.com");
    tb(&dir)
        .args(["signup", "alice@example.com", "--password", "hunter22"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User already registered"));
}

#[test]
fn login_with_wrong_password_fails() {
    let dir = workspace();
    signup(&dir, "alice@example.com");
    tb(&dir).arg("logout").assert().success();

    tb(&dir)
        .args(["login", "alice@example.com", "--password", "wrong-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid login credentials"));

    tb(&dir)
        .args(["login", "alice@example.com", "--password", "hunter22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as alice"));
}

#[test]
fn post_comment_and_vote_workflow() {
    let dir = workspace();
    signup(&dir, "alice@example.com");

    tb(&dir)
        .args(["post", "create", "--title", "Hello", "--description", "World"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created post #1"));

    tb(&dir)
        .args(["post", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Hello"))
        .stdout(predicate::str::contains("0 comments"));

    tb(&dir)
        .args(["comment", "add", "1", "First!"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added comment [1]"));

    tb(&dir)
        .args(["comment", "reply", "1", "1", "Second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with [2]"));

    tb(&dir)
        .args(["comment", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("• [1] alice"))
        .stdout(predicate::str::contains("    ↳ [2] alice"))
        .stdout(predicate::str::contains("      Second"));

    tb(&dir)
        .args(["post", "vote", "1", "up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upvoted post #1"))
        .stdout(predicate::str::contains("▲1 ▼0"));

    tb(&dir)
        .args(["post", "vote", "1", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Downvoted post #1"))
        .stdout(predicate::str::contains("▲0 ▼1"));

    tb(&dir)
        .args(["post", "vote", "1", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Withdrew your vote"))
        .stdout(predicate::str::contains("▲0 ▼0"));

    tb(&dir)
        .args(["post", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("World"))
        .stdout(predicate::str::contains("Comments (2, newest)"));
}

#[test]
fn post_list_json_includes_comment_counts() {
    let dir = workspace();
    signup(&dir, "alice@example.com");
    tb(&dir)
        .args(["post", "create", "-t", "Apple pie", "-d", "Recipe"])
        .assert()
        .success();
    tb(&dir)
        .args(["post", "create", "-t", "Banana bread", "-d", "Recipe"])
        .assert()
        .success();
    tb(&dir).args(["comment", "add", "2", "Yum"]).assert().success();

    let output = tb(&dir)
        .args(["post", "list", "--json", "--sort", "comments_desc"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "Banana bread");
    assert_eq!(rows[0]["comments"], 1);
    assert_eq!(rows[1]["comments"], 0);

    let output = tb(&dir)
        .args(["post", "list", "--json", "--search", "APPLE"])
        .output()
        .expect("run");
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[test]
fn anonymous_user_cannot_vote() {
    let dir = workspace();
    signup(&dir, "alice@example.com");
    tb(&dir)
        .args(["post", "create", "-t", "Hello", "-d", "World"])
        .assert()
        .success();
    tb(&dir).arg("logout").assert().success();

    tb(&dir)
        .args(["post", "vote", "1", "up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You must be logged in to vote"));

    tb(&dir)
        .args(["comment", "add", "1", "Hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You must be logged in to comment"));
}

#[test]
fn only_author_can_delete() {
    let dir = workspace();
    signup(&dir, "alice@example.com");
    tb(&dir)
        .args(["post", "create", "-t", "Hello", "-d", "World"])
        .assert()
        .success();
    tb(&dir).args(["comment", "add", "1", "Mine"]).assert().success();
    tb(&dir).arg("logout").assert().success();
    signup(&dir, "bob@example.com");

    tb(&dir)
        .args(["post", "delete", "1", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only the author can change this post"));

    tb(&dir)
        .args(["comment", "delete", "1", "1", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only the author can change this comment"));

    tb(&dir).arg("logout").assert().success();
    tb(&dir)
        .args(["login", "alice@example.com", "--password", "hunter22"])
        .assert()
        .success();
    tb(&dir)
        .args(["post", "delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted post #1"));

    tb(&dir)
        .args(["post", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Post 1 not found"));
}

#[test]
fn edit_keeps_unchanged_fields() {
    let dir = workspace();
    signup(&dir, "alice@example.com");
    tb(&dir)
        .args(["post", "create", "-t", "Helo", "-d", "World"])
        .assert()
        .success();

    tb(&dir)
        .args(["post", "edit", "1", "--title", "Hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated post #1"));

    tb(&dir)
        .args(["post", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Hello"))
        .stdout(predicate::str::contains("World"));
}

#[test]
fn config_path_and_init() {
    let dir = workspace();
    tb(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config:"))
        .stdout(predicate::str::contains("data:"));

    let project = dir.path().join("project");
    fs::create_dir_all(&project).expect("project dir");
    tb(&dir)
        .arg("init")
        .arg("--path")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated .threadboard/config.toml"));
    assert!(project.join(".threadboard").join("config.toml").exists());
}
