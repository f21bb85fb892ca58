//! `# bumpdeps:` comment directives
//!
//! - `# bumpdeps: ignore`
//! - `# bumpdeps: ignore-until=YYYY-MM-DD`
//!
//! The marker may appear anywhere in the comment, and text after the
//! directive (`# bumpdeps: ignore  # flaky upstream`) is allowed.

use crate::domain::Directive;
use crate::error::ParseError;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bumpdeps:\s*(?P<body>.*?)\s*$").unwrap());
static IGNORE_UNTIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ignore-until\s*=\s*(?P<date>[^\s#,;]*)").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Parse the text of a trailing comment
///
/// Returns `Ok(None)` for ordinary comments that carry no directive.
pub fn parse_directive(comment: &str) -> Result<Option<Directive>, ParseError> {
    let Some(caps) = DIRECTIVE_RE.captures(comment) else {
        return Ok(None);
    };
    let body = caps.name("body").map_or("", |m| m.as_str());

    if body.starts_with("ignore-until") {
        let date = IGNORE_UNTIL_RE
            .captures(body)
            .and_then(|c| c.name("date"))
            .map(|m| m.as_str())
            .filter(|d| DATE_RE.is_match(d))
            .ok_or_else(|| ParseError::InvalidIgnoreUntil {
                directive: body.to_string(),
            })?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ParseError::InvalidDate {
                date: date.to_string(),
            }
        })?;
        return Ok(Some(Directive::IgnoreUntil(date)));
    }

    if leading_word(body) == "ignore" {
        return Ok(Some(Directive::Ignore));
    }

    Err(ParseError::UnknownDirective {
        directive: body.to_string(),
    })
}

/// First word of a directive body, up to whitespace or punctuation
fn leading_word(body: &str) -> &str {
    let end = body
        .find(|c: char| c.is_whitespace() || matches!(c, '#' | ',' | ';'))
        .unwrap_or(body.len());
    &body[..end]
}
