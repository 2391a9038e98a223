use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "grammar_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const DISPLAY_GRAMMAR: &str = r#"
name: display
arguments: "display <message>"
description: Display the given message
options:
  - name: echo
    description: Echo the message
  - name: times
    type: integer
    default: 1
"#;

const YOU_GRAMMAR: &str = r#"
name: you
arguments: "you <args>..."
skip_options: true
dispatch:
  args: [args]
  prefix: you
subcommands:
  - name: display
    arguments: "you display <message>"
    options:
      - name: upcase
        kind: flag
  - name: print
    arguments: "you print <message>"
"#;

fn grammar_parse(grammar: &PathBuf, extra: &[&str], tokens: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grammar-parse"))
        .env("COMMAND_GRAMMAR_EXE_NAME", "tool")
        .env_remove("COMMAND_GRAMMAR_FALLBACK_HELP")
        .env_remove("COMMAND_GRAMMAR_MAX_DISPATCH_DEPTH")
        .env_remove("RUST_LOG")
        .arg("--grammar")
        .arg(grammar)
        .args(extra)
        .arg("--")
        .args(tokens)
        .output()
        .expect("failed to run grammar-parse")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("Invalid JSON output: {e}\n{stdout}"))
}

#[test]
fn test_parse_prints_json() {
    let dir = TempDir::new("json");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);

    let output = grammar_parse(&grammar, &[], &["display", "Some", "-e", "Even More", "-t", "3"]);
    assert!(
        output.status.success(),
        "parse failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed = stdout_json(&output);
    assert_eq!(parsed["command"], "display");
    assert_eq!(parsed["params"]["message"], "Some");
    assert_eq!(parsed["params"]["echo"], "Even More");
    assert_eq!(parsed["params"]["times"], 3);
}

#[test]
fn test_parse_prints_yaml() {
    let dir = TempDir::new("yaml");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);

    let output = grammar_parse(&grammar, &["--format", "yaml"], &["display", "hi"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("command: display"), "{stdout}");
    assert!(stdout.contains("message: hi"), "{stdout}");
    assert!(stdout.contains("times: 1"), "{stdout}");
}

#[test]
fn test_help_flag_prints_help_and_exits_2() {
    let dir = TempDir::new("help");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);

    let output = grammar_parse(&grammar, &[], &["-h"]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Usage: tool display <message> [Options]"), "{stdout}");
    assert!(stdout.contains("-e, --echo ECHO"), "{stdout}");
    assert!(stdout.contains("Description:\nDisplay the given message"), "{stdout}");
}

#[test]
fn test_failure_falls_back_to_help() {
    let dir = TempDir::new("fallback");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);

    let output = grammar_parse(&grammar, &[], &["display"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage: tool display"));
}

#[test]
fn test_no_fallback_help_reports_error() {
    let dir = TempDir::new("no_fallback");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);

    let output = grammar_parse(&grammar, &["--no-fallback-help"], &["display"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Missing argument message"), "{stderr}");

    let output = grammar_parse(&grammar, &["--no-fallback-help"], &["display", "x", "-t", "many"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid value 'many' for option --times"), "{stderr}");
}

#[test]
fn test_config_file_disables_fallback() {
    let dir = TempDir::new("config");
    let grammar = dir.write("display.yaml", DISPLAY_GRAMMAR);
    let config = dir.write("parser.yaml", "fallback_help: false\n");

    let output = grammar_parse(
        &grammar,
        &["--config", config.to_str().unwrap()],
        &["display", "a", "b"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Too many arguments: b"));
}

#[test]
fn test_grammar_list_is_dispatched() {
    let dir = TempDir::new("list");
    let grammar = dir.write(
        "commands.json",
        r#"[
            {"name": "display", "arguments": "display <message>"},
            {"name": "print", "arguments": "print <message>", "priority": 5}
        ]"#,
    );

    let output = grammar_parse(&grammar, &[], &["display", "hello"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["command"], "display");

    let output = grammar_parse(&grammar, &[], &["remove", "hello"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Usage:\n\ttool print <message> [Options]\n\ttool display <message> [Options]\n"
    );

    let output = grammar_parse(&grammar, &[], &["display"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage:\n\ttool print"));

    let output = grammar_parse(&grammar, &["--no-fallback-help"], &["display"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: Missing argument message"));
}

#[test]
fn test_nested_dispatch_from_definition() {
    let dir = TempDir::new("nested");
    let grammar = dir.write("you.yaml", YOU_GRAMMAR);

    let output = grammar_parse(&grammar, &[], &["you", "display", "My Message", "--upcase"]);
    assert!(
        output.status.success(),
        "dispatch failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed = stdout_json(&output);
    assert_eq!(parsed["command"], "display");
    assert_eq!(parsed["params"]["message"], "My Message");
    assert_eq!(parsed["params"]["upcase"], true);

    let output = grammar_parse(&grammar, &[], &["you", "-h"]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\ttool you display <message> [Options]\n"), "{stdout}");
    assert!(stdout.contains("\ttool you print <message> [Options]\n"), "{stdout}");
}

#[test]
fn test_invalid_definition_is_reported() {
    let dir = TempDir::new("invalid");
    let grammar = dir.write("bad.yaml", "name: bad\narguments: \"<files>... <dest>\"\n");

    let output = grammar_parse(&grammar, &[], &["a"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load"), "{stderr}");
    assert!(stderr.contains("must be the last argument"), "{stderr}");
}

#[test]
fn test_missing_definition_file() {
    let dir = TempDir::new("missing");
    let output = grammar_parse(&dir.join("nope.yaml"), &[], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: Failed to load"));
}
