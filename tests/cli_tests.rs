use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

mod common;

use common::fixture_path;

fn tabsmith(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tabsmith");
    cmd.env("XDG_CONFIG_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home).arg("--help").assert().success();
}

#[test]
fn test_complete_from_words() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("tool.yaml"))
        .args(["--", "tool", "-h", "bu"])
        .assert()
        .success()
        .stdout("build \n");
}

#[test]
fn test_complete_from_line_with_trailing_space() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("tool.yaml"))
        .args(["--line", "tool --color "])
        .assert()
        .success()
        .stdout("auto \nalways \nnever \n");
}

#[test]
fn test_complete_json_output() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("tool.yaml"))
        .args(["--format", "json", "--cursor", "1", "--", "tool", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""value":"-h""#))
        .stdout(predicate::str::contains(r#""help":"show help""#))
        .stdout(predicate::str::contains("build").not());
}

#[test]
fn test_complete_finds_grammar_in_configured_dir() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.toml");
    let fixtures = fixture_path("");
    std::fs::write(
        &config,
        format!("grammar_dirs = ['{}']\n", fixtures.display()),
    )
    .unwrap();

    tabsmith(&home)
        .arg("--config")
        .arg(&config)
        .args(["complete", "--", "adb", "SH"])
        .assert()
        .success()
        .stdout("shell \n");
}

#[test]
fn test_complete_without_grammar_fails() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .args(["complete", "--", "no-such-command", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no grammar found for `no-such-command`"));
}

#[test]
fn test_runtime_grammar_error_exits_with_two() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("broken_break.yaml"))
        .args(["--", "broken", ""])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains(
            "`break` used outside of a for_arg loop",
        ));
}

#[test]
fn test_check_reports_sub_grammars() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("check")
        .arg(fixture_path("tool.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (tool; sub-grammars: build, run, test)"));
}

#[test]
fn test_check_rejects_top_level_break() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("bad.yaml");
    std::fs::write(&file, "main:\n  - break\n").unwrap();

    tabsmith(&home)
        .arg("check")
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "`break` used outside of a for_arg loop",
        ));
}

#[test]
fn test_check_rejects_source_leading_a_maybe() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("check")
        .arg(fixture_path("lazy_match.yaml"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "`maybe` cannot match a word against a files source",
        ));
}

#[test]
fn test_complete_rejects_cursor_past_the_line() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("tool.yaml"))
        .args(["--cursor", "1000000000", "--", "tool", "-h"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("past the end of the command line"));

    // One past the last word is a fresh, empty word.
    tabsmith(&home)
        .arg("complete")
        .arg("--grammar")
        .arg(fixture_path("tool.yaml"))
        .args(["--cursor", "2", "--", "tool", "--color"])
        .assert()
        .success()
        .stdout("auto \nalways \nnever \n");
}

#[test]
fn test_install_bash_and_zsh() {
    let home = tempfile::tempdir().unwrap();
    tabsmith(&home)
        .args(["install", "adb", "tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "complete -o nospace -F _tabsmith_complete adb tool",
        ))
        .stdout(predicate::str::contains("bashcompinit").not());

    tabsmith(&home)
        .args(["install", "--shell", "zsh", "adb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autoload -U +X bashcompinit"));
}
