// ABOUTME: Integration tests for the CLI application
// ABOUTME: Runs the built binary against temporary template sites

use std::process::Command;

mod common;
use common::TestSite;

fn markup_lite() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_markup-lite"));
    command.env("RUST_LOG", "warn");
    command
}

#[test]
fn test_cli_help_command() {
    let output = markup_lite()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("render"));
    assert!(stdout.contains("cache"));
}

#[test]
fn test_cli_version_command() {
    let output = markup_lite()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_render_to_stdout() {
    let site = TestSite::standard();

    let output = markup_lite()
        .arg("render")
        .arg(site.page("markup-index"))
        .arg("--root")
        .arg(site.partials_root())
        .args(["-V", "title=From CLI", "-V", "letterArray=['x','y']"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<!DOCTYPE html>"));
    assert!(stdout.contains("<title>From CLI</title>"));
    assert!(stdout.contains("<h3>x</h3><h3>y</h3>"));
    assert!(stdout.ends_with("</html>"));
}

#[test]
fn test_cli_render_to_file() {
    let site = TestSite::new().with_page("plain", "<b><% who %></b>");
    let target = site.temp_dir.path().join("out.html");

    let output = markup_lite()
        .arg("render")
        .arg(site.page("plain"))
        .args(["--var", "who=file"])
        .arg("--output")
        .arg(&target)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(std::fs::read_to_string(target).unwrap(), "<b>file</b>");
}

#[test]
fn test_cli_render_invalid_variable() {
    let site = TestSite::new().with_page("plain", "<b><% who %></b>");

    let output = markup_lite()
        .arg("render")
        .arg(site.page("plain"))
        .args(["-V", "who"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid variable format"));
}

#[test]
fn test_cli_render_bad_expression_fails() {
    let site = TestSite::new().with_page("bad", "<%= 1 / 0 %>");

    let output = markup_lite()
        .arg("render")
        .arg(site.page("bad"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_cache_json() {
    let site = TestSite::standard();

    let output = markup_lite()
        .arg("cache")
        .arg(site.partials_root())
        .args(["--format", "json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["bytes"].as_u64().unwrap() > 0));
    assert!(entries
        .iter()
        .any(|e| e["path"].as_str().unwrap().ends_with("head.html")));
}

#[test]
fn test_cli_cache_text() {
    let site = TestSite::standard();

    let output = markup_lite()
        .arg("cache")
        .arg(site.partials_root())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("3 partials under"));
    assert!(stdout.contains("head.html"));
}
