use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const GLOBS: &str = "\
# test rules
50:text/plain:*.txt
50:application/x-bzip-compressed-tar:*.tar.bz2
50:application/x-bzip:*.bz2
60:text/x-readme:README*
";

#[test]
fn test_version_compare_command() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [("2.1", "2.1.0", "equal"), ("2.10", "2.9", "greater"), ("1.0", "1.0.1", "less"), ("x", "1", "invalid")];
    for (first, second, expected) in cases {
        Command::cargo_bin("plexus")?
            .args(["version-compare", first, second])
            .assert()
            .success()
            .stdout(predicate::str::diff(format!("{}\n", expected)));
    }
    Ok(())
}

#[test]
fn test_mime_command() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let globs = dir.path().join("globs2");
    fs::write(&globs, GLOBS)?;

    Command::cargo_bin("plexus")?
        .arg("mime")
        .arg("--globs")
        .arg(&globs)
        .args(["notes.txt", "archive.tar.bz2", "README.txt", "photo.jpeg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt: text/plain (suffix: txt)"))
        .stdout(predicate::str::contains(
            "archive.tar.bz2: application/x-bzip-compressed-tar (suffix: tar.bz2)",
        ))
        .stdout(predicate::str::contains("README.txt: text/x-readme\n"))
        .stdout(predicate::str::contains("photo.jpeg: (no match)"));
    Ok(())
}

#[test]
fn test_mime_uses_configured_glob_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("globs2"), GLOBS)?;
    let config = dir.path().join("engine.json");
    fs::write(&config, r#"{ "glob_files": ["globs2"] }"#)?;

    Command::cargo_bin("plexus")?
        .arg("--config")
        .arg(&config)
        .args(["mime", "data.bz2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data.bz2: application/x-bzip (suffix: bz2)"));
    Ok(())
}

#[test]
fn test_mime_without_rules_fails() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("plexus")?
        .args(["mime", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No glob rule file"));
    Ok(())
}

#[test]
fn test_plugins_command() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("editor.json"),
        r#"{"name":"Editor","version":"1.0","dependencies":[{"name":"Core","version":"1.0"}]}"#,
    )?;
    fs::write(dir.path().join("core.json"), r#"{"name":"Core","version":"1.0"}"#)?;
    fs::write(
        dir.path().join("ghostly.json"),
        r#"{"name":"Ghostly","version":"1.0","dependencies":[{"name":"Ghost","version":"2.0"}]}"#,
    )?;

    Command::cargo_bin("plexus")?
        .arg("plugins")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Load order:\n  1. Core\n  2. Editor\n  3. Ghostly"))
        .stdout(predicate::str::contains("Core 1.0 [resolved, enabled]"))
        .stdout(predicate::str::contains("Ghostly 1.0 [read, enabled]"))
        .stdout(predicate::str::contains("error: Could not resolve dependency 'Ghost(2.0)'"));
    Ok(())
}

#[test]
fn test_plugins_cycle_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("a.json"),
        r#"{"name":"A","version":"1","dependencies":[{"name":"B","version":"1"}]}"#,
    )?;
    fs::write(
        dir.path().join("b.json"),
        r#"{"name":"B","version":"1","dependencies":[{"name":"A","version":"1"}]}"#,
    )?;

    Command::cargo_bin("plexus")?
        .arg("plugins")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("error: Circular dependency detected:"))
        .stdout(predicate::str::contains("A(1) depends on"));
    Ok(())
}

#[test]
fn test_bad_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("engine.ini");
    fs::write(&config, "x = 1")?;

    Command::cargo_bin("plexus")?
        .arg("--config")
        .arg(&config)
        .args(["version-compare", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
    Ok(())
}
