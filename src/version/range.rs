//! npm-style range specifiers.
//!
//! Supported grammars, tried in this order (first match wins):
//!
//! | Form | Example | Variant |
//! |------|---------|---------|
//! | bare version | `1.2.3` | [`RangeSpecifier::Exact`] |
//! | caret | `^1.2.3` | [`RangeSpecifier::Caret`] |
//! | tilde | `~1.2.3` | [`RangeSpecifier::Tilde`] |
//! | comparator | `>=1.2.3`, `<2.0.0`, `=1.0.0` | [`RangeSpecifier::Comparator`] |
//! | wildcard | `*`, `x` | [`RangeSpecifier::Wildcard`] |
//! | partial wildcard | `1.x`, `1.x.x`, `1.2.*` | [`RangeSpecifier::PartialWildcard`] |
//!
//! Compound text is split into `||` alternatives, each an AND-set of
//! whitespace-separated elements (`>=1.0.0 <2.0.0 || ^3.0.0`). A hyphen range
//! `1.0.0 - 2.0.0` is an inclusive `>=`/`<=` pair. Every element uses the single
//! grammars above; one bad element makes the whole specifier
//! [`RangeSpecifier::Unparseable`], which satisfies nothing.

use super::{compare, Version};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Characters whose presence rules out an exact pin.
const OPERATOR_CHARS: &[char] = &['^', '~', '>', '<', '=', '*', 'x'];

/// A whole specifier operand: one version and nothing else.
static OPERAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$")
        .expect("valid operand pattern")
});

static PARTIAL_WILDCARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(?:[x*](?:\.[x*])?|(\d+)\.[x*])$").expect("valid partial wildcard pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparator {
    /// Prefixes in match order; two-character operators come first.
    const PREFIXES: [(&'static str, Comparator); 5] = [
        (">=", Comparator::Ge),
        ("<=", Comparator::Le),
        (">", Comparator::Gt),
        ("<", Comparator::Lt),
        ("=", Comparator::Eq),
    ];

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Ge => ordering != Ordering::Less,
            Comparator::Eq => ordering == Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSpecifier {
    Exact(Version),
    Caret(Version),
    Tilde(Version),
    Comparator(Comparator, Version),
    Wildcard,
    PartialWildcard { major: u64, minor: Option<u64> },
    /// `||` alternatives; each inner set must be satisfied in full.
    AnyOf(Vec<Vec<RangeSpecifier>>),
    Unparseable,
}

impl RangeSpecifier {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.contains("||") || text.contains(char::is_whitespace) {
            return parse_compound(text);
        }
        parse_single(text)
    }

    pub fn is_parseable(&self) -> bool {
        !matches!(self, RangeSpecifier::Unparseable)
    }

    /// Returns true if `version` falls inside this range.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            RangeSpecifier::Exact(r) => compare(version, r) == Ordering::Equal,
            RangeSpecifier::Caret(r) => {
                if r.major != version.major {
                    false
                } else if r.major == 0 {
                    // ^0.y.z never leaves minor y; ^0.0.z only moves patch upward.
                    if r.minor != version.minor {
                        false
                    } else if r.minor == 0 {
                        version.patch >= r.patch
                    } else {
                        compare(version, r) != Ordering::Less
                    }
                } else {
                    compare(version, r) != Ordering::Less
                }
            }
            RangeSpecifier::Tilde(r) => {
                version.major == r.major && version.minor == r.minor && version.patch >= r.patch
            }
            RangeSpecifier::Comparator(op, r) => op.accepts(compare(version, r)),
            RangeSpecifier::Wildcard => true,
            RangeSpecifier::PartialWildcard { major, minor } => {
                version.major == *major && minor.map_or(true, |m| version.minor == m)
            }
            RangeSpecifier::AnyOf(alternatives) => alternatives
                .iter()
                .any(|set| set.iter().all(|element| element.matches(version))),
            RangeSpecifier::Unparseable => false,
        }
    }
}

fn parse_single(text: &str) -> RangeSpecifier {
    if let Some(version) = parse_exact(text) {
        return RangeSpecifier::Exact(version);
    }

    if let Some(rest) = text.strip_prefix('^') {
        return parse_operand(rest).map_or(RangeSpecifier::Unparseable, RangeSpecifier::Caret);
    }

    if let Some(rest) = text.strip_prefix('~') {
        return parse_operand(rest).map_or(RangeSpecifier::Unparseable, RangeSpecifier::Tilde);
    }

    for (prefix, op) in Comparator::PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            return parse_operand(rest).map_or(RangeSpecifier::Unparseable, |v| {
                RangeSpecifier::Comparator(op, v)
            });
        }
    }

    if text == "*" || text == "x" {
        return RangeSpecifier::Wildcard;
    }

    if let Some(caps) = PARTIAL_WILDCARD_RE.captures(text) {
        let major = caps[1].parse::<u64>().ok();
        let minor = caps.get(2).map(|m| m.as_str().parse::<u64>());
        return match (major, minor) {
            (Some(major), None) => RangeSpecifier::PartialWildcard { major, minor: None },
            (Some(major), Some(Ok(minor))) => RangeSpecifier::PartialWildcard {
                major,
                minor: Some(minor),
            },
            _ => RangeSpecifier::Unparseable,
        };
    }

    RangeSpecifier::Unparseable
}

/// Operators npm allows to stand apart from their operand (`>= 1.2.3`).
fn is_bare_operator(token: &str) -> bool {
    matches!(token, "^" | "~" | ">=" | "<=" | ">" | "<" | "=")
}

fn parse_compound(text: &str) -> RangeSpecifier {
    let mut alternatives = Vec::new();
    for alternative in text.split("||") {
        match parse_and_set(alternative) {
            Some(set) => alternatives.push(set),
            None => return RangeSpecifier::Unparseable,
        }
    }

    if let [set] = alternatives.as_mut_slice() {
        if set.len() == 1 {
            return set.remove(0);
        }
    }
    RangeSpecifier::AnyOf(alternatives)
}

fn parse_and_set(text: &str) -> Option<Vec<RangeSpecifier>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let [low, "-", high] = tokens.as_slice() {
        return Some(vec![
            RangeSpecifier::Comparator(Comparator::Ge, parse_exact(low)?),
            RangeSpecifier::Comparator(Comparator::Le, parse_exact(high)?),
        ]);
    }

    let mut set = Vec::new();
    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        let element = if is_bare_operator(token) {
            parse_single(&format!("{}{}", token, tokens.next()?))
        } else {
            parse_single(token)
        };
        if !element.is_parseable() {
            return None;
        }
        set.push(element);
    }

    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

fn parse_operand(text: &str) -> Option<Version> {
    let text = text.trim();
    if !OPERAND_RE.is_match(text) {
        return None;
    }
    Version::parse(text)
}

fn parse_exact(text: &str) -> Option<Version> {
    if text.contains(OPERATOR_CHARS) {
        return None;
    }
    parse_operand(text)
}

/// Returns true if the specifier is a plain version pin.
///
/// The text must contain no range operator characters and must consist of a
/// single version. `file:../x`, git URLs and dist-tags like `latest` are not
/// exact and are not ranges either.
pub fn is_exact(specifier: &str) -> bool {
    parse_exact(specifier.trim()).is_some()
}

/// Returns true if `version` satisfies the range written in `specifier`.
pub fn satisfies(version: &Version, specifier: &str) -> bool {
    RangeSpecifier::parse(specifier).matches(version)
}
