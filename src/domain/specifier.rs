//! Version constraint clauses (`>=1.0,<2.0`) and their matching rules

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::Version;
use crate::error::ParseError;

static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<op>===|~=|==|!=|<=|>=|<|>)(?P<space>\s*)(?P<version>[^\s,;()]+)$").unwrap()
});

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    ArbitraryEqual,
    NotEqual,
    Compatible,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::ArbitraryEqual => "===",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" => Operator::Equal,
            "===" => Operator::ArbitraryEqual,
            "!=" => Operator::NotEqual,
            "~=" => Operator::Compatible,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            _ => return None,
        })
    }

    /// `<` and `<=`
    pub fn is_ceiling(&self) -> bool {
        matches!(self, Operator::Less | Operator::LessEqual)
    }

    /// `>` and `>=`
    pub fn is_floor(&self) -> bool {
        matches!(self, Operator::Greater | Operator::GreaterEqual)
    }

    /// Operators that name the version a project is built against
    pub fn is_pin(&self) -> bool {
        matches!(
            self,
            Operator::Equal | Operator::ArbitraryEqual | Operator::Compatible
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<operator><version>` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub operator: Operator,
    pub version: Version,
    /// `==1.4.*` / `!=1.4.*`
    pub wildcard: bool,
    /// Raw version text for `===`, compared as a string
    arbitrary: Option<String>,
}

impl Specifier {
    pub fn new(operator: Operator, version: Version) -> Self {
        let arbitrary = (operator == Operator::ArbitraryEqual).then(|| version.to_string());
        Self {
            operator,
            version,
            wildcard: false,
            arbitrary,
        }
    }

    /// Wildcard clause matching every version starting with `prefix`
    pub fn wildcard(operator: Operator, prefix: Version) -> Self {
        Self {
            operator,
            version: prefix,
            wildcard: true,
            arbitrary: None,
        }
    }

    /// Parse a clause, returning it with a flag telling whether the
    /// operator was followed by whitespace
    pub fn parse_spaced(clause: &str) -> Result<(Self, bool), ParseError> {
        let trimmed = clause.trim();
        let caps = CLAUSE_RE
            .captures(trimmed)
            .ok_or_else(|| ParseError::invalid_operator(trimmed))?;
        let operator = Operator::from_symbol(&caps["op"])
            .ok_or_else(|| ParseError::invalid_operator(trimmed))?;
        let spaced = !caps["space"].is_empty();
        let text = &caps["version"];

        if operator == Operator::ArbitraryEqual {
            let version = text.parse().unwrap_or_default();
            return Ok((
                Self {
                    operator,
                    version,
                    wildcard: false,
                    arbitrary: Some(text.to_string()),
                },
                spaced,
            ));
        }

        if let Some(prefix) = text.strip_suffix(".*") {
            if !matches!(operator, Operator::Equal | Operator::NotEqual) {
                return Err(ParseError::unsupported_clause(operator.as_str(), text));
            }
            let version: Version = prefix.parse()?;
            if version.is_prerelease() || version.is_postrelease() || !version.local.is_empty() {
                return Err(ParseError::unsupported_clause(operator.as_str(), text));
            }
            return Ok((Self::wildcard(operator, version), spaced));
        }

        let version: Version = text.parse()?;
        match operator {
            Operator::Compatible if version.release.len() < 2 => {
                return Err(ParseError::unsupported_clause(operator.as_str(), text));
            }
            Operator::Equal | Operator::NotEqual => {}
            _ if !version.local.is_empty() => {
                return Err(ParseError::unsupported_clause(operator.as_str(), text));
            }
            _ => {}
        }
        Ok((Self::new(operator, version), spaced))
    }

    /// True if `candidate` satisfies this clause
    pub fn contains(&self, candidate: &Version) -> bool {
        let public = candidate.public();
        match self.operator {
            Operator::Equal => self.matches_exact(candidate),
            Operator::NotEqual => !self.matches_exact(candidate),
            Operator::ArbitraryEqual => {
                self.arbitrary.as_deref() == Some(candidate.to_string().as_str())
            }
            Operator::Compatible => {
                let prefix = self
                    .version
                    .truncated(self.version.release.len().saturating_sub(1));
                public >= self.version && public.has_prefix(&prefix)
            }
            Operator::LessEqual => public <= self.version,
            Operator::GreaterEqual => public >= self.version,
            Operator::Less => {
                public < self.version
                    && !(!self.version.is_prerelease()
                        && public.is_prerelease()
                        && public.same_release(&self.version))
            }
            Operator::Greater => {
                public > self.version
                    && !(!self.version.is_postrelease()
                        && public.is_postrelease()
                        && public.same_release(&self.version))
            }
        }
    }

    fn matches_exact(&self, candidate: &Version) -> bool {
        if self.wildcard {
            candidate.has_prefix(&self.version)
        } else if self.version.local.is_empty() {
            candidate.public() == self.version
        } else {
            *candidate == self.version
        }
    }
}

impl FromStr for Specifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specifier::parse_spaced(s).map(|(spec, _)| spec)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arbitrary {
            Some(raw) => write!(f, "{}{}", self.operator, raw),
            None if self.wildcard => write!(f, "{}{}.*", self.operator, self.version),
            None => write!(f, "{}{}", self.operator, self.version),
        }
    }
}

/// How a constraint was written, so a rewrite can mirror it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintStyle {
    /// `>= 1.0` rather than `>=1.0`
    pub spaced_operator: bool,
    /// Text between clauses
    pub separator: String,
}

impl Default for ConstraintStyle {
    fn default() -> Self {
        Self {
            spaced_operator: false,
            separator: ",".to_string(),
        }
    }
}

/// Ordered list of clauses that must all hold
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionConstraint {
    clauses: Vec<Specifier>,
}

impl VersionConstraint {
    pub fn new(clauses: Vec<Specifier>) -> Self {
        Self { clauses }
    }

    /// Parse comma separated clauses, detecting how they were written
    pub fn parse_styled(text: &str) -> Result<(Self, ConstraintStyle), ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok((Self::default(), ConstraintStyle::default()));
        }

        let mut clauses = Vec::new();
        let mut spaced_operator = false;
        for part in trimmed.split(',') {
            let (clause, spaced) = Specifier::parse_spaced(part)?;
            spaced_operator |= spaced;
            clauses.push(clause);
        }

        let separator = if trimmed.contains(", ") { ", " } else { "," };
        Ok((
            Self { clauses },
            ConstraintStyle {
                spaced_operator,
                separator: separator.to_string(),
            },
        ))
    }

    pub fn clauses(&self) -> &[Specifier] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True if every clause admits `candidate`
    pub fn contains(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.contains(candidate))
    }

    /// Version the dependency is currently anchored to: the first pin,
    /// else the first ceiling, else the first floor
    pub fn anchor(&self) -> Option<&Version> {
        let first = |pred: fn(&Operator) -> bool| {
            self.clauses
                .iter()
                .find(|c| pred(&c.operator))
                .map(|c| &c.version)
        };
        first(Operator::is_pin)
            .or_else(|| first(Operator::is_ceiling))
            .or_else(|| first(Operator::is_floor))
    }

    /// Highest version named by a lower-bounding clause
    pub fn floor(&self) -> Option<&Version> {
        self.clauses
            .iter()
            .filter(|c| c.operator.is_floor() || c.operator.is_pin())
            .map(|c| &c.version)
            .max()
    }

    /// True if `candidate` passes every `<`/`<=` clause
    pub fn below_ceilings(&self, candidate: &Version) -> bool {
        self.clauses
            .iter()
            .filter(|c| c.operator.is_ceiling())
            .all(|c| c.contains(candidate))
    }

    /// True if `candidate` passes every `!=` clause
    pub fn passes_exclusions(&self, candidate: &Version) -> bool {
        self.clauses
            .iter()
            .filter(|c| c.operator == Operator::NotEqual)
            .all(|c| c.contains(candidate))
    }

    /// Render in the given style
    pub fn render(&self, style: &ConstraintStyle) -> String {
        self.clauses
            .iter()
            .map(|c| {
                if style.spaced_operator {
                    let text = c.to_string();
                    let op = c.operator.as_str();
                    format!("{} {}", op, &text[op.len()..])
                } else {
                    c.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(&style.separator)
    }
}

impl FromStr for VersionConstraint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionConstraint::parse_styled(s).map(|(c, _)| c)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&ConstraintStyle::default()))
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
