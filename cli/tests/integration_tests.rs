//! Integration tests for the compile, plan and catalog flows.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const HELLO: &str = "hello\n    {name=help : The command name}\n    {--o|out=txt : The output format}\n";

const MAKE: &str = "make:\n    {model : Create a model | {--m|migration : Create a migration}}\n    {controller : Create a controller}\n    {^--force : Overwrite the [name]}\n";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_signature-compile"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .output()
        .expect("failed to run signature-compile")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn signature-compile");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("Invalid JSON output: {e}\n{stdout}"))
}

// ---- compile ----

#[test]
fn test_compile_file_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "hello.sig", HELLO);

    let output = run(&[
        "compile",
        "--description",
        "Display HELLO",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert_success(&output);

    let parsed = stdout_json(&output);
    assert_eq!(parsed["base_command"], "hello");
    assert_eq!(parsed["description"], "Display HELLO");
    assert_eq!(parsed["options"][0]["name"], "name");
    assert_eq!(parsed["options"][0]["default_value"], "help");
    assert_eq!(parsed["options"][0]["required"], false);
    assert_eq!(parsed["options"][1]["name"], "out");
    assert_eq!(parsed["options"][1]["flags"][0], "-o");
    assert_eq!(parsed["options"][1]["flags"][1], "--out");
    assert!(parsed.get("handler").is_none());
}

#[test]
fn test_compile_stdin_yaml_output() {
    let output = run_with_stdin(&["compile", "--input", "-", "--format", "yaml"], MAKE);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_yaml::Value = serde_yaml::from_str(&stdout).unwrap();
    assert_eq!(parsed["base_command"], "make");
    assert_eq!(parsed["is_namespace_command"], true);
    assert_eq!(parsed["sub_commands"][0]["name"], "model");
}

#[test]
fn test_compile_markdown_and_table_output() {
    let md = run_with_stdin(&["compile", "--input", "-", "--format", "markdown"], MAKE);
    assert_success(&md);
    let stdout = String::from_utf8_lossy(&md.stdout);
    assert!(stdout.contains("# make:"));
    assert!(stdout.contains("## Subcommands"));

    let table = run_with_stdin(&["compile", "--input", "-", "--format", "table"], HELLO);
    assert_success(&table);
    let stdout = String::from_utf8_lossy(&table.stdout);
    assert!(stdout.contains("Command: hello"));
    assert!(stdout.contains("-o, --out"));
}

#[test]
fn test_compile_missing_file_fails() {
    let output = run(&["compile", "--input", "/definitely/not/here.sig"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to read"));
}

#[test]
fn test_compile_empty_signature_yields_minimal_command() {
    let output = run_with_stdin(&["compile", "--input", "-"], "   \n");
    assert_success(&output);

    let parsed = stdout_json(&output);
    assert_eq!(parsed["base_command"], "");
    assert_eq!(parsed["options"].as_array().unwrap().len(), 0);
}

// ---- plan ----

#[test]
fn test_plan_expands_namespace_routes() {
    let output = run_with_stdin(&["plan", "--input", "-"], MAKE);
    assert_success(&output);

    let parsed = stdout_json(&output);
    let names: Vec<&str> = parsed["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|route| route["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["make", "make:model", "make:controller"]);

    let model = &parsed["routes"][1];
    assert_eq!(model["options"][0]["token"], "--force");
    assert_eq!(model["options"][0]["description"], "Overwrite the model");
    assert_eq!(model["options"][1]["token"], "-m, --migration");
}

#[test]
fn test_plan_table_output() {
    let output = run_with_stdin(&["plan", "--input", "-", "--format", "table"], HELLO);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hello [name] [options]"));
}

// ---- catalog ----

#[test]
fn test_catalog_directory_json_output() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "hello.sig", HELLO);
    write(dir.path(), "make.sig", MAKE);
    write(
        dir.path(),
        "extra.yml",
        "- signature: \"#debug\"\n- signature: serve\n  description: Serve the app\n",
    );

    let output = run(&[
        "catalog",
        dir.path().to_str().unwrap(),
        "--cli-name",
        "artisan",
        "--exclude",
        "serve",
        "--jobs",
        "2",
    ]);
    assert_success(&output);

    let parsed = stdout_json(&output);
    assert_eq!(parsed["cli_name"], "artisan");
    let names: Vec<&str> = parsed["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|cmd| cmd["base_command"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["debug", "hello", "make"]);
    assert_eq!(parsed["skipped"][0], "serve");
}

#[test]
fn test_catalog_uses_config_discovery_paths_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let commands = dir.path().join("commands");
    fs::create_dir(&commands).unwrap();
    write(&commands, "hello.sig", HELLO);
    write(&commands, "hidden.sig", "#internal\n{--quiet : Quiet}\n");

    let config = write(
        dir.path(),
        "signatures.yml",
        "version: \"1.0\"\ncli_name: musket\ndiscovery_paths:\n  - commands\ninclude_hidden: false\n",
    );
    let out_file = dir.path().join("catalog.md");

    let output = run(&[
        "catalog",
        "--config",
        config.to_str().unwrap(),
        "--format",
        "markdown",
        "--output",
        out_file.to_str().unwrap(),
    ]);
    assert_success(&output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Wrote 1 commands"));

    let md = fs::read_to_string(&out_file).unwrap();
    assert!(md.contains("# musket"));
    assert!(md.contains("## hello"));
    assert!(md.contains("**Skipped:** internal"));
}

#[test]
fn test_catalog_plan_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "make.sig", MAKE);

    let output = run(&["catalog", input.to_str().unwrap(), "--plan"]);
    assert_success(&output);

    let parsed = stdout_json(&output);
    assert_eq!(parsed["routes"][0]["name"], "make");
}

#[test]
fn test_catalog_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "notes.txt", "hello");

    let output = run(&["catalog", input.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must end in"));
}

#[test]
fn test_catalog_rejects_zero_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "hello.sig", HELLO);

    let output = run(&["catalog", input.to_str().unwrap(), "--jobs", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--jobs must be greater than 0"));
}
