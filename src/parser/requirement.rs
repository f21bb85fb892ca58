//! PEP 508 dependency specifier parser
//!
//! Handles entries of the form:
//! - `name`
//! - `name[extra1,extra2]`
//! - `name>=1.0,<2.0` and `name (>=1.0,<2.0)`
//! - `name==1.0; python_version < "3.11"`
//! - `name @ https://example.com/name.whl ; sys_platform == "linux"`

use crate::domain::{ConstraintStyle, DependencySpecifier, VersionConstraint};
use crate::error::ParseError;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?").unwrap());
static EXTRA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap());
static URL_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+;").unwrap());

fn skip_ws(input: &str, pos: usize) -> usize {
    pos + (input[pos..].len() - input[pos..].trim_start().len())
}

/// Parse a specifier with no trailing comment
pub fn parse_requirement(input: &str) -> Result<DependencySpecifier, ParseError> {
    let mut pos = skip_ws(input, 0);
    let name = NAME_RE
        .find(&input[pos..])
        .ok_or_else(|| ParseError::MissingName {
            input: input.to_string(),
        })?
        .as_str()
        .to_string();
    pos += name.len();
    // a missing constraint is inserted right after the name and extras
    let mut insert_at = pos;
    pos = skip_ws(input, pos);

    let mut extras = BTreeSet::new();
    if input[pos..].starts_with('[') {
        let close = input[pos..]
            .find(']')
            .ok_or_else(|| ParseError::UnbalancedBrackets {
                input: input.to_string(),
            })?;
        let inner = &input[pos + 1..pos + close];
        if inner.contains('[') {
            return Err(ParseError::UnbalancedBrackets {
                input: input.to_string(),
            });
        }
        for extra in inner.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if !EXTRA_RE.is_match(extra) {
                return Err(ParseError::InvalidExtra {
                    name: extra.to_string(),
                });
            }
            extras.insert(extra.to_string());
        }
        pos += close + 1;
        insert_at = pos;
        pos = skip_ws(input, pos);
    }

    if let Some(after) = input[pos..].strip_prefix('@') {
        return parse_url_requirement(input, name, extras, after, insert_at);
    }

    let (region_end, marker) = match input[pos..].find(';') {
        Some(i) => (pos + i, Some(parse_marker(&input[pos + i + 1..])?)),
        None => (input.len(), None),
    };

    let region = &input[pos..region_end];
    if region.contains('[') || region.contains(']') {
        return Err(ParseError::UnbalancedBrackets {
            input: input.to_string(),
        });
    }

    let mut start = skip_ws(input, pos);
    let mut end = pos + region.trim_end().len();
    if start >= end {
        start = insert_at;
        end = insert_at;
    } else if input[start..end].starts_with('(') {
        if !input[start..end].ends_with(')') {
            return Err(ParseError::UnbalancedParentheses {
                input: input.to_string(),
            });
        }
        start = skip_ws(input, start + 1);
        end = start + input[start..end - 1].trim_end().len();
    }

    let text = &input[start..end];
    if text.contains('(') || text.contains(')') {
        return Err(ParseError::UnbalancedParentheses {
            input: input.to_string(),
        });
    }
    let (constraint, style) = VersionConstraint::parse_styled(text)?;

    Ok(DependencySpecifier {
        name,
        extras,
        constraint,
        marker,
        url: None,
        directive: None,
        raw: input.to_string(),
        constraint_span: start..end,
        style,
    })
}

fn parse_url_requirement(
    input: &str,
    name: String,
    extras: BTreeSet<String>,
    after: &str,
    insert_at: usize,
) -> Result<DependencySpecifier, ParseError> {
    let (url, marker) = match URL_MARKER_RE.find(after) {
        Some(m) => (&after[..m.start()], Some(parse_marker(&after[m.end()..])?)),
        None => (after, None),
    };
    let url = url.trim();
    if url.is_empty() {
        return Err(ParseError::MissingUrl {
            input: input.to_string(),
        });
    }

    Ok(DependencySpecifier {
        name,
        extras,
        constraint: VersionConstraint::default(),
        marker,
        url: Some(url.to_string()),
        directive: None,
        raw: input.to_string(),
        constraint_span: insert_at..insert_at,
        style: ConstraintStyle::default(),
    })
}

/// Checks that a marker is non-empty with balanced quotes and parentheses
fn parse_marker(text: &str) -> Result<String, ParseError> {
    let marker = text.trim();
    let invalid = || ParseError::InvalidMarker {
        marker: marker.to_string(),
    };
    if marker.is_empty() {
        return Err(invalid());
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in marker.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.checked_sub(1).ok_or_else(invalid)?,
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(invalid());
    }
    Ok(marker.to_string())
}
