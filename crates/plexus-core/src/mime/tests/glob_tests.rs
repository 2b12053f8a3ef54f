use crate::mime::error::MimeError;
use crate::mime::glob::{CaseSensitivity, GlobPattern, PatternShape, classify, wildcard_to_regex};

fn glob(pattern: &str) -> GlobPattern {
    GlobPattern::with_default_weight(pattern, "text/plain").unwrap()
}

#[test]
fn test_classification() {
    assert_eq!(classify("README"), PatternShape::Literal);
    assert_eq!(classify("*.txt"), PatternShape::Suffix);
    assert_eq!(classify("*.tar.bz2"), PatternShape::Suffix);
    assert_eq!(classify("README*"), PatternShape::Prefix);
    assert_eq!(classify("[0-9][0-9][0-9].vdr"), PatternShape::Vdr);
    assert_eq!(classify("*.anim[1-9j]"), PatternShape::Anim);
    assert_eq!(classify("*.b?z"), PatternShape::Other);
    assert_eq!(classify("*.*"), PatternShape::Other);
    assert_eq!(classify("lib*.so.*"), PatternShape::Other);
    assert_eq!(classify("Make*file"), PatternShape::Other);
}

#[test]
fn test_fast_pattern_detection() {
    assert!(glob("*.txt").is_fast_pattern());
    assert!(!glob("*.tar.bz2").is_fast_pattern());
    assert!(!glob("README").is_fast_pattern());
    assert!(!glob("*txt").is_fast_pattern());
    assert!(!glob("*.t?t").is_fast_pattern());
    assert!(!glob("*.[ch]").is_fast_pattern());
}

#[test]
fn test_case_insensitive_patterns_are_lowercased() {
    let upper = GlobPattern::new("*.TXT", "text/plain", 50, CaseSensitivity::Insensitive).unwrap();
    assert_eq!(upper.pattern(), "*.txt");
    assert!(upper.matches("NOTES.TxT"));

    let exact = GlobPattern::new("*.C", "text/x-c++src", 50, CaseSensitivity::Sensitive).unwrap();
    assert_eq!(exact.pattern(), "*.C");
    assert!(exact.matches("main.C"));
    assert!(!exact.matches("main.c"));
}

#[test]
fn test_literal_and_prefix_matching() {
    let literal = glob("makefile");
    assert!(literal.matches("Makefile"));
    assert!(!literal.matches("Makefile.am"));

    let prefix = glob("README*");
    assert!(prefix.matches("README"));
    assert!(prefix.matches("readme.md"));
    assert!(!prefix.matches("READ"));
}

#[test]
fn test_suffix_matching() {
    let suffix = glob("*.tar.gz");
    assert!(suffix.matches("backup.tar.gz"));
    assert!(suffix.matches(".tar.gz"));
    assert!(!suffix.matches("backup.gz"));
}

#[test]
fn test_vdr_and_anim_shapes() {
    let vdr = glob("[0-9][0-9][0-9].vdr");
    assert!(vdr.matches("001.vdr"));
    assert!(!vdr.matches("01.vdr"));
    assert!(!vdr.matches("a01.vdr"));
    assert!(!vdr.matches("001.vdrx"));

    let anim = glob("*.anim[1-9j]");
    assert!(anim.matches("movie.anim5"));
    assert!(anim.matches("movie.animj"));
    assert!(!anim.matches("movie.anim0"));
    assert!(!anim.matches("anim5"));
}

#[test]
fn test_other_patterns_use_wildcards() {
    let question = glob("*.b?z");
    assert!(question.matches("x.baz"));
    assert!(!question.matches("x.bz"));

    let class = glob("*.[ch]");
    assert!(class.matches("main.c"));
    assert!(class.matches("main.h"));
    assert!(!class.matches("main.o"));

    let negated = glob("x.[!a]");
    assert!(negated.matches("x.b"));
    assert!(!negated.matches("x.a"));

    let dotted = glob("lib*.so.*");
    assert!(dotted.matches("libfoo.so.1"));
    assert!(!dotted.matches("libfooXso.1"));
}

#[test]
fn test_wildcard_translation() {
    assert_eq!(wildcard_to_regex("*.c"), r"\A.*\.c\z");
    assert_eq!(wildcard_to_regex("a?[!x-z]"), r"\Aa.[^x-z]\z");
    assert_eq!(wildcard_to_regex("a["), r"\Aa\[\z");
}

#[test]
fn test_unclosed_bracket_is_literal() {
    let odd = glob("foo[*");
    assert_eq!(odd.shape(), PatternShape::Other);
    assert!(odd.matches("foo[bar"));
    assert!(!odd.matches("foobar"));
}

#[test]
fn test_uncompilable_pattern_never_matches() {
    // Reversed class range: a valid glob shape, but not a valid regex.
    let broken = glob("*.[z-a]");
    assert_eq!(broken.shape(), PatternShape::Other);
    assert!(!broken.matches("x.b"));
    assert!(!broken.matches("x.[z-a]"));
    assert!(!broken.matches(""));
}

#[test]
fn test_construction_errors() {
    assert!(matches!(
        GlobPattern::new("*.txt", "text/plain", 101, CaseSensitivity::Insensitive),
        Err(MimeError::InvalidWeight { weight: 101, .. })
    ));
    assert!(matches!(
        GlobPattern::new("", "text/plain", 50, CaseSensitivity::Insensitive),
        Err(MimeError::EmptyPattern { .. })
    ));
    assert!(GlobPattern::new("*.txt", "text/plain", 100, CaseSensitivity::Insensitive).is_ok());
    assert!(GlobPattern::new("*.txt", "text/plain", 0, CaseSensitivity::Insensitive).is_ok());
}

#[test]
fn test_display_round_trips_to_rule_syntax() {
    let glob = GlobPattern::new("*.C", "text/x-c++src", 60, CaseSensitivity::Sensitive).unwrap();
    assert_eq!(glob.to_string(), "60:text/x-c++src:*.C:cs");
}
