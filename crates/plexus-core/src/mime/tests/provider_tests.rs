use std::sync::Arc;

use tempfile::tempdir;

use crate::mime::database::GlobPatternDatabase;
use crate::mime::glob::GlobPattern;
use crate::mime::provider::MimeGlobProvider;

fn glob(pattern: &str, mime_type: &str) -> GlobPattern {
    GlobPattern::with_default_weight(pattern, mime_type).unwrap()
}

#[test]
fn test_snapshot_survives_reload() {
    let provider = MimeGlobProvider::new(GlobPatternDatabase::from_patterns(vec![glob("*.txt", "text/plain")]));
    let before = provider.snapshot();

    provider.reload(vec![glob("*.md", "text/markdown")]);

    assert_eq!(before.matching_globs("a.txt").best(), Some("text/plain"));
    assert_eq!(provider.best_match("a.txt"), None);
    assert_eq!(provider.best_match("a.md").as_deref(), Some("text/markdown"));
    assert!(!Arc::ptr_eq(&before, &provider.snapshot()));
}

#[test]
fn test_default_provider_is_empty() {
    let provider = MimeGlobProvider::default();
    assert!(provider.snapshot().is_empty());
    assert!(provider.matching_globs("a.txt").is_empty());
}

#[test]
fn test_readers_on_other_threads() {
    let provider = Arc::new(MimeGlobProvider::new(GlobPatternDatabase::from_patterns(vec![glob(
        "*.txt",
        "text/plain",
    )])));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let provider = Arc::clone(&provider);
            std::thread::spawn(move || provider.best_match("notes.txt"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("text/plain"));
    }
}

#[tokio::test]
async fn test_reload_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("globs2");
    tokio::fs::write(&path, "50:application/json:*.json\n").await.unwrap();

    let provider = MimeGlobProvider::from_file(&path).await.unwrap();
    assert_eq!(provider.best_match("data.json").as_deref(), Some("application/json"));

    tokio::fs::write(&path, "50:application/yaml:*.yaml\n").await.unwrap();
    provider.reload_from_file(&path).await.unwrap();
    assert_eq!(provider.best_match("data.json"), None);
    assert_eq!(provider.best_match("data.yaml").as_deref(), Some("application/yaml"));
}
