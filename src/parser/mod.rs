//! Dependency entry parsing
//!
//! This module provides:
//! - PEP 508 specifier parsing (name, extras, constraint, marker, URL)
//! - The `# bumpdeps:` directive micro-grammar for trailing comments

mod directive;
mod requirement;

pub use directive::parse_directive;
pub use requirement::parse_requirement;

use crate::domain::DependencySpecifier;
use crate::error::ParseError;

/// Parse a manifest entry whose trailing comment (if any) is supplied separately
pub fn parse_entry(value: &str, comment: Option<&str>) -> Result<DependencySpecifier, ParseError> {
    let directive = match comment {
        Some(text) => parse_directive(text)?,
        None => None,
    };
    let mut spec = parse_requirement(value)?;
    spec.directive = directive;
    Ok(spec)
}

/// Parse a single dependency line that may end with a `#` comment
///
/// The comment stays part of [`DependencySpecifier::raw`], so rendering a new
/// constraint keeps it in place.
pub fn parse_specifier(line: &str) -> Result<DependencySpecifier, ParseError> {
    let (body, comment) = split_comment(line);
    let mut spec = parse_entry(body, comment)?;
    spec.raw = line.to_string();
    Ok(spec)
}

/// Split at the first `#` that starts the line or follows whitespace.
/// A `#` inside a URL fragment is not a comment.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut prev_ws = true;
    for (i, ch) in line.char_indices() {
        if ch == '#' && prev_ws {
            return (&line[..i], Some(&line[i..]));
        }
        prev_ws = ch.is_whitespace();
    }
    (line, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Directive;
    use chrono::NaiveDate;

    #[test]
    fn test_split_comment() {
        assert_eq!(split_comment("foo==1.0"), ("foo==1.0", None));
        assert_eq!(
            split_comment("foo==1.0  # note"),
            ("foo==1.0  ", Some("# note"))
        );
        assert_eq!(
            split_comment("foo @ https://x.org/f.whl#sha256=abc"),
            ("foo @ https://x.org/f.whl#sha256=abc", None)
        );
    }

    #[test]
    fn test_parse_specifier_with_ignore() {
        let spec = parse_specifier("foo==1.0.0  # bumpdeps: ignore").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.directive, Some(Directive::Ignore));
    }

    #[test]
    fn test_parse_specifier_reattaches_comment() {
        let spec = parse_specifier("foo==1.0.0  # bumpdeps: ignore-until=2999-01-01").unwrap();
        assert_eq!(
            spec.directive,
            Some(Directive::IgnoreUntil(
                NaiveDate::from_ymd_opt(2999, 1, 1).unwrap()
            ))
        );
        let rendered = spec.render_with(&"==2.0.0".parse().unwrap());
        assert_eq!(rendered, "foo==2.0.0  # bumpdeps: ignore-until=2999-01-01");
    }

    #[test]
    fn test_parse_specifier_plain_comment() {
        let spec = parse_specifier("foo>=1.0 # keep in sync with docs").unwrap();
        assert_eq!(spec.directive, None);
        assert_eq!(spec.constraint.to_string(), ">=1.0");
    }

    #[test]
    fn test_parse_specifier_malformed_directive() {
        let err = parse_specifier("foo==1.0  # bumpdeps: ignore-until=2999-13-01").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn test_parse_entry_separate_comment() {
        let spec = parse_entry("foo==1.0", Some("# bumpdeps: ignore")).unwrap();
        assert_eq!(spec.directive, Some(Directive::Ignore));
        assert_eq!(spec.raw, "foo==1.0");
    }
}
