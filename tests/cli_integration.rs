use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#! /usr/local/Nuke13.2v4/libnuke-13.2.4.so -nx
version 13.2 v4
Root {
 inputs 0
 name /jobs/show/comp/shot010_v001.nk
}
Read {
 inputs 0
 file_type exr
 file /old/shots/010/plate.####.exr
 name Read1
 selected true
}
Group {
 name Group1
}
 Read {
  inputs 0
  file "/old/shots/010/elements/smoke v2.exr"
  name Read2
 }
end_group
Write {
 file /old/renders/010/comp.####.exr
 name Write1
}
"#;

struct Env {
    home: TempDir,
    script: PathBuf,
}

impl Env {
    fn new() -> Self {
        let home = tempfile::tempdir().unwrap();
        let script = home.path().join("shot010.nk");
        fs::write(&script, SCRIPT).unwrap();
        Self { home, script }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("relink").unwrap();
        cmd.env("RELINK_HOME", self.home.path())
            .env_remove("RUST_LOG")
            .current_dir(self.home.path());
        cmd
    }

    fn script_arg(&self) -> &str {
        self.script.to_str().unwrap()
    }

    fn script_text(&self) -> String {
        read(&self.script)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn lists_path_nodes() {
    let env = Env::new();
    env.cmd()
        .args(["nodes", env.script_arg()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read1"))
        .stdout(predicate::str::contains("Group1.Read2"))
        .stdout(predicate::str::contains("/old/renders/010/comp.####.exr"));
}

#[test]
fn lists_selected_nodes_only() {
    let env = Env::new();
    env.cmd()
        .args(["nodes", env.script_arg(), "--selected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read1"))
        .stdout(predicate::str::contains("Write1").not());
}

#[test]
fn relink_rewrites_script_and_records_history() {
    let env = Env::new();
    env.cmd()
        .args(["relink", env.script_arg(), "--old", "/old/shots", "--new", "/new/shots"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Relinked 2 of 2 nodes."));

    let text = env.script_text();
    assert!(text.contains(" file /new/shots/010/plate.####.exr"));
    assert!(text.contains("  file \"/new/shots/010/elements/smoke v2.exr\""));
    assert!(text.contains(" file /old/renders/010/comp.####.exr"));

    env.cmd()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("/old/shots -> /new/shots"))
        .stdout(predicate::str::contains("(2 nodes)"));
}

#[test]
fn regex_relink_expands_captures() {
    let env = Env::new();
    env.cmd()
        .args([
            "relink",
            env.script_arg(),
            "--old",
            r"^/old/(shots|renders)/010",
            "--new",
            "/proj/$1/0010",
            "--regex",
        ])
        .assert()
        .success();

    let text = env.script_text();
    assert!(text.contains(" file /proj/shots/0010/plate.####.exr"));
    assert!(text.contains(" file /proj/renders/0010/comp.####.exr"));
}

#[test]
fn dry_run_changes_nothing() {
    let env = Env::new();
    env.cmd()
        .args([
            "relink",
            env.script_arg(),
            "--old",
            "/old",
            "--new",
            "/new",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("/new/renders/010/comp.####.exr"))
        .stdout(predicate::str::contains("3 nodes would be relinked."));

    assert_eq!(env.script_text(), SCRIPT);
    env.cmd()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No relink history."));
}

#[test]
fn relink_to_output_file_keeps_original() {
    let env = Env::new();
    let out = env.home.path().join("shot010_v002.nk");
    env.cmd()
        .args(["relink", env.script_arg(), "--old", "/old", "--new", "/new", "-o"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(env.script_text(), SCRIPT);
    assert!(read(&out).contains(" file /new/renders/010/comp.####.exr"));
}

#[test]
fn invalid_regex_fails_without_touching_script() {
    let env = Env::new();
    env.cmd()
        .args(["relink", env.script_arg(), "--old", "/old/(", "--new", "/new", "--regex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));

    assert_eq!(env.script_text(), SCRIPT);
}

#[test]
fn save_and_restore_state() {
    let env = Env::new();
    env.cmd()
        .args(["save", env.script_arg(), "before-move"])
        .assert()
        .success()
        .stdout(predicate::str::contains("State before-move saved (3 nodes)."));

    env.cmd()
        .args(["relink", env.script_arg(), "--old", "/old", "--new", "/moved"])
        .assert()
        .success();
    assert!(!env.script_text().contains("/old/"));

    env.cmd()
        .args(["restore", env.script_arg(), "before-move"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 3 of 3 nodes."));
    assert_eq!(env.script_text(), SCRIPT);

    env.cmd()
        .args(["show", "before-move"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Group1.Read2"))
        .stdout(predicate::str::contains("/old/shots/010/elements/smoke v2.exr"));
}

#[test]
fn duplicate_label_is_rejected() {
    let env = Env::new();
    env.cmd()
        .args(["save", env.script_arg(), "v1"])
        .assert()
        .success();
    env.cmd()
        .args(["save", env.script_arg(), "v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Version already exists: v1"));
    env.cmd()
        .args(["save", env.script_arg(), "v1", "--force"])
        .assert()
        .success();
}

#[test]
fn auto_increment_labels_and_listing() {
    let env = Env::new();
    for expected in ["State 1 saved", "State 2 saved"] {
        env.cmd()
            .args([
                "save",
                env.script_arg(),
                "--version-type",
                "auto-increment",
                "--node",
                "Read1",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }

    env.cmd()
        .arg("states")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)\b1\b.*\b2\b").unwrap());
}

#[test]
fn user_input_without_label_fails() {
    let env = Env::new();
    env.cmd()
        .args(["save", env.script_arg(), "--version-type", "user-input"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A label is required"));
}

#[test]
fn label_with_generated_version_type_fails() {
    let env = Env::new();
    env.cmd()
        .args([
            "save",
            env.script_arg(),
            "LABEL",
            "--version-type",
            "auto-increment",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot be used with --version-type auto-increment",
        ));

    env.cmd()
        .arg("states")
        .assert()
        .success()
        .stdout(predicate::str::contains("LABEL").not());
}

#[test]
fn undefined_capture_group_fails_without_touching_script() {
    let env = Env::new();
    env.cmd()
        .args([
            "relink",
            env.script_arg(),
            "--old",
            "^/old",
            "--new",
            "/mnt/$env(SHOW)",
            "--regex",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined group $env"));

    assert_eq!(env.script_text(), SCRIPT);
}

#[test]
fn history_write_failure_leaves_script_untouched() {
    let env = Env::new();
    let conn = rusqlite::Connection::open(env.home.path().join("relink.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE relink_history (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
             old_path_regex TEXT,
             new_path TEXT,
             use_regex INTEGER,
             affected_nodes INTEGER
         );
         CREATE TRIGGER history_locked BEFORE INSERT ON relink_history
         BEGIN
             SELECT RAISE(ABORT, 'history locked');
         END;",
    )
    .unwrap();
    drop(conn);

    env.cmd()
        .args(["relink", env.script_arg(), "--old", "/old", "--new", "/new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database error"))
        .stderr(predicate::str::contains("history locked"));

    assert_eq!(env.script_text(), SCRIPT);
}

#[test]
fn restore_unknown_version_warns() {
    let env = Env::new();
    env.cmd()
        .args(["restore", env.script_arg(), "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No state found for version nope"));
    assert_eq!(env.script_text(), SCRIPT);
}

#[test]
fn redirect_uses_new_directory() {
    let env = Env::new();
    env.cmd()
        .args(["redirect", env.script_arg(), "--new-dir", "/mnt/plates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Redirected 3 of 3 nodes."));

    let text = env.script_text();
    assert!(text.contains(" file /mnt/plates/plate.####.exr"));
    assert!(text.contains(" file /mnt/plates/comp.####.exr"));
}

#[test]
fn redirect_without_config_fails() {
    let env = Env::new();
    env.cmd()
        .args(["redirect", env.script_arg()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No redirect configured"));
}

#[test]
fn config_save_persists_directories() {
    let env = Env::new();
    env.cmd()
        .args(["config", "--save", "--old-dir", "/old", "--new-dir", "/new"])
        .assert()
        .success();
    assert!(env.home.path().join("config.json").exists());

    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("old_directory = /old"))
        .stdout(predicate::str::contains("new_directory = /new"));

    env.cmd()
        .args(["preview", env.script_arg()])
        .assert()
        .success()
        .stdout(predicate::str::contains("/new/shots/010/plate.####.exr"));
}
