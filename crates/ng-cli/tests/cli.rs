//! CLI command integration tests.
//! Each test uses a temp directory via NG_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ng_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("ng").unwrap();
    cmd.env("NG_DATA_DIR", data_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn parse_complete_message() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["parse", "🚀: ship_v1\n💡: deliver_value\n🎯: launch\n📦: release_notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens:     4"))
        .stdout(predicate::str::contains("/act = \"ship_v1\""))
        .stdout(predicate::str::contains("/context = \"launch\""))
        .stdout(predicate::str::contains("valid:      true"))
        .stdout(predicate::str::contains("error:").not());
}

#[test]
fn parse_bare_action_reports_diagnostics() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["parse", "🚀: ship_v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid:      false"))
        .stdout(predicate::str::contains(
            "error: Action requires /intent declaration\n\
             error: Action requires /context declaration\n\
             warning: Interactive tokens should specify expected /deliverable",
        ));
}

#[test]
fn parse_strict_fails_on_invalid() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["parse", "--strict", "🚀: ship_v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message is not valid"));

    ng_cmd(&dir)
        .args(["parse", "--strict", "❓: only a warning"])
        .assert()
        .success();
}

#[test]
fn parse_reads_stdin_as_json() {
    let dir = TempDir::new().unwrap();
    let output = ng_cmd(&dir)
        .args(["parse", "--json"])
        .write_stdin("preamble\n📚: rust\n📝: multi\nline")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tokens"]["/focus"], "rust");
    assert_eq!(value["tokens"]["/note"], "multi\nline");
    assert_eq!(value["agent_kind"], "human");
    assert_eq!(value["is_valid"], true);
}

#[test]
fn format_switches_notation() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["format", "--style", "slash", "🚀: go\n💡: why"])
        .assert()
        .success()
        .stdout("/act: go\n/intent: why\n");

    ng_cmd(&dir)
        .args(["format", "--style", "symbol", "/act: go\n/goal: shadowed"])
        .assert()
        .success()
        .stdout("🚀: go\n/goal: shadowed\n");
}

#[test]
fn format_uses_configured_preference() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "prefer_symbols = false\n").unwrap();
    ng_cmd(&dir)
        .args(["format", "💡: why"])
        .assert()
        .success()
        .stdout("/intent: why\n");
}

#[test]
fn init_prints_opening_message_and_saves() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args([
            "init",
            "--topic",
            "ethics",
            "--participants",
            "Ada,Grace",
            "--save",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("🧠: Ada, Grace"))
        .stdout(predicate::str::contains("📚: ethics"))
        .stdout(predicate::str::contains("🎯: Multi-agent dialogue on ethics"))
        .stdout(predicate::str::contains("saved to"));

    ng_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("messages=1  invalid=0  focus=ethics"));
}

#[test]
fn init_saves_twice_in_quick_succession() {
    let dir = TempDir::new().unwrap();
    for topic in ["first", "second"] {
        ng_cmd(&dir)
            .args(["init", "--topic", topic, "--save"])
            .assert()
            .success();
    }

    ng_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("focus=first"))
        .stdout(predicate::str::contains("focus=second"));
}

#[test]
fn chat_session_saves_transcript() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["chat", "--topic", "awareness"])
        .write_stdin("📚: consciousness\n❓: can models understand?\n📦: opinions\n\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[system]: 🧠: Human, GPT-4, Claude"))
        .stdout(predicate::str::contains("[You]: 📚: consciousness"))
        .stdout(predicate::str::contains("[GPT-4]: 🧠: GPT-4"))
        .stdout(predicate::str::contains("[Claude]: 🧠: Claude"))
        .stdout(predicate::str::contains("conversation saved to"));

    let saved: Vec<_> = std::fs::read_dir(dir.path().join("conversations"))
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .collect();
    assert_eq!(saved.len(), 1);

    ng_cmd(&dir)
        .arg("show")
        .arg(&saved[0])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("NeuroGlyph Conversation Export"))
        .stdout(predicate::str::contains("Focus: consciousness"))
        .stdout(predicate::str::contains("[Claude - "));

    let output = ng_cmd(&dir)
        .arg("show")
        .arg(&saved[0])
        .arg("--json")
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["messages"].as_array().unwrap().len(), 4);
    assert_eq!(value["messages"][2]["agent_kind"], "model_a");

    ng_cmd(&dir)
        .arg("stats")
        .arg(&saved[0])
        .assert()
        .success()
        .stdout(predicate::str::contains("messages:   4"))
        .stdout(predicate::str::contains("human:      2"))
        .stdout(predicate::str::contains("model_a:    1 (GPT-4)"))
        .stdout(predicate::str::contains("model_b:    1 (Claude)"))
        .stdout(predicate::str::contains("invalid:    0"))
        .stdout(predicate::str::contains("focus:      consciousness"));

    ng_cmd(&dir)
        .arg("show")
        .arg(&saved[0])
        .arg("--spoken")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[Human]: consciousness can models understand?",
        ))
        .stdout(predicate::str::contains(
            "[GPT-4]: offline, no reply command configured",
        ))
        .stdout(predicate::str::contains("🧠").not());

    let transcript = dir.path().join("transcript.txt");
    ng_cmd(&dir)
        .arg("show")
        .arg(&saved[0])
        .arg("--out")
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("written to"));
    let text = std::fs::read_to_string(&transcript).unwrap();
    assert!(text.starts_with("NeuroGlyph Conversation Export"));
    assert!(text.contains("[GPT-4 - "));
}

#[test]
fn chat_no_save() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["chat", "--no-save"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("conversation saved").not());

    ng_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no saved conversations)"));
}

#[cfg(unix)]
#[test]
fn chat_uses_reply_command() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[agents.model_a]\nname = \"Echo\"\ncommand = \"printf 📚:%s\"\n",
    )
    .unwrap();
    ng_cmd(&dir)
        .args(["chat", "--no-save"])
        .write_stdin("model-a\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Echo]: 📚:"));
}

#[test]
fn show_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    ng_cmd(&dir)
        .args(["show", "/nonexistent/conversation.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}
