use tempfile::tempdir;

use crate::mime::database::GlobPatternDatabase;
use crate::mime::error::MimeError;
use crate::mime::glob::CaseSensitivity;
use crate::mime::globs2::{parse_globs2, parse_globs2_strict, parse_line, read_globs2_file};

const RULES: &str = "\
# This file was automatically generated
50:text/plain:*.txt
50:application/x-bzip-compressed-tar:*.tar.bz2
50:application/x-bzip:*.bz2
60:text/x-readme:README*
50:text/x-c++src:*.C:cs
text/x-makefile:makefile
";

#[test]
fn test_parse_rule_lines() {
    let glob = parse_line("60:text/x-readme:README*", 1).unwrap().unwrap();
    assert_eq!(glob.weight(), 60);
    assert_eq!(glob.mime_type(), "text/x-readme");
    assert_eq!(glob.pattern(), "readme*");

    let cs = parse_line("50:text/x-c++src:*.C:cs", 2).unwrap().unwrap();
    assert_eq!(cs.case_sensitivity(), CaseSensitivity::Sensitive);
    assert_eq!(cs.pattern(), "*.C");

    let old_style = parse_line("text/x-makefile:makefile", 3).unwrap().unwrap();
    assert_eq!(old_style.weight(), 50);

    assert!(parse_line("# comment", 4).unwrap().is_none());
    assert!(parse_line("   ", 5).unwrap().is_none());
}

#[test]
fn test_malformed_lines_report_line_numbers() {
    assert!(matches!(parse_line("50:text/plain", 7), Err(MimeError::RuleSyntax { line: 7, .. })));
    assert!(matches!(parse_line("150:text/plain:*.txt", 8), Err(MimeError::RuleSyntax { line: 8, .. })));
    assert!(matches!(parse_line("999:text/plain:*.txt", 9), Err(MimeError::RuleSyntax { line: 9, .. })));
    assert!(matches!(parse_line("50:plain:*.txt", 10), Err(MimeError::RuleSyntax { line: 10, .. })));
    assert!(matches!(parse_line("50:text/plain:", 11), Err(MimeError::RuleSyntax { line: 11, .. })));
}

#[test]
fn test_lenient_parse_skips_bad_lines() {
    let content = format!("{}garbage line\n50:text/x-log:*.log\n", RULES);
    let patterns = parse_globs2(&content);
    assert_eq!(patterns.len(), 7);
    assert!(matches!(
        parse_globs2_strict(&content),
        Err(MimeError::RuleSyntax { line: 8, .. })
    ));
}

#[test]
fn test_rules_drive_the_database() {
    let db = GlobPatternDatabase::from_patterns(parse_globs2_strict(RULES).unwrap());
    assert_eq!(db.matching_globs("backup.tar.bz2").best(), Some("application/x-bzip-compressed-tar"));
    assert_eq!(db.matching_globs("README.txt").best(), Some("text/x-readme"));
    assert_eq!(db.matching_globs("Makefile").best(), Some("text/x-makefile"));
}

#[tokio::test]
async fn test_read_rule_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("globs2");
    tokio::fs::write(&path, RULES).await.unwrap();

    let patterns = read_globs2_file(&path).await.unwrap();
    assert_eq!(patterns.len(), 6);

    let missing = read_globs2_file(&dir.path().join("nope")).await;
    assert!(matches!(missing, Err(MimeError::Io { .. })));
}
