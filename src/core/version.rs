//! Plugin version strings and their ordering.
//!
//! Versions are compared segment by segment the same way the host CMS
//! compares them: a version string is canonicalized by turning `-`, `_` and
//! `+` into `.` and by splitting wherever digits meet letters, so `1.0rc1`
//! becomes `1.0.rc.1`. Numeric segments compare numerically (`1.10.0` is
//! newer than `1.4.0`); textual segments compare by release stage.

use super::{Result, SettingsError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Release stage ranks used for textual segments.
///
/// A segment matches a stage when it starts with the stage name. Anything
/// unknown sorts below `dev`.
const SPECIAL_FORMS: &[(&str, i8)] = &[
    ("dev", 0),
    ("alpha", 1),
    ("a", 1),
    ("beta", 2),
    ("b", 2),
    ("RC", 3),
    ("rc", 3),
    ("#", 4),
    ("pl", 5),
    ("p", 5),
];

const UNKNOWN_FORM_RANK: i8 = -6;
/// Rank a numeric segment takes when compared against a textual one.
const NUMBER_RANK: i8 = 4;

#[derive(Debug, Clone)]
enum Segment {
    /// Digits with leading zeros stripped, so arbitrarily long numbers compare correctly.
    Number(String),
    Special(i8),
}

impl Segment {
    fn parse(part: &str) -> Self {
        if part.bytes().all(|b| b.is_ascii_digit()) {
            let trimmed = part.trim_start_matches('0');
            Segment::Number(trimmed.to_string())
        } else {
            let rank = SPECIAL_FORMS
                .iter()
                .find(|(name, _)| part.starts_with(name))
                .map(|(_, rank)| *rank)
                .unwrap_or(UNKNOWN_FORM_RANK);
            Segment::Special(rank)
        }
    }

    fn rank(&self) -> i8 {
        match self {
            Segment::Number(_) => NUMBER_RANK,
            Segment::Special(rank) => *rank,
        }
    }

    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A parsed plugin version such as `3.6.3` or `2.0.0-beta2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl PluginVersion {
    /// Parses a version string. Empty strings and strings without any segment are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let segments = canonicalize(raw)
            .iter()
            .map(|part| Segment::parse(part))
            .collect::<Vec<_>>();

        if segments.is_empty() {
            return Err(SettingsError::InvalidVersion(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns the version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Splits a version into segments after separator normalization.
fn canonicalize(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut last_was_digit: Option<bool> = None;

    for ch in raw.chars() {
        if matches!(ch, '.' | '-' | '_' | '+') {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            last_was_digit = None;
            continue;
        }

        let is_digit = ch.is_ascii_digit();
        if let Some(prev) = last_was_digit {
            if prev != is_digit && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
        last_was_digit = Some(is_digit);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            let ord = a.compare(b);
            if ord != Ordering::Equal {
                return ord;
            }
        }

        // The longer version wins when its next segment is a number;
        // a trailing release stage is compared against a plain number instead.
        let common = self.segments.len().min(other.segments.len());
        match (self.segments.get(common), other.segments.get(common)) {
            (Some(Segment::Number(_)), None) => Ordering::Greater,
            (None, Some(Segment::Number(_))) => Ordering::Less,
            (Some(extra), None) => extra.rank().cmp(&NUMBER_RANK),
            (None, Some(extra)) => NUMBER_RANK.cmp(&extra.rank()),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PluginVersion {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginVersion {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PluginVersion> for String {
    fn from(version: PluginVersion) -> Self {
        version.raw
    }
}

/// Returns true when `stored` is older than `running`.
///
/// A missing stored version is older than every version.
pub fn is_older(stored: Option<&PluginVersion>, running: &PluginVersion) -> bool {
    match stored {
        Some(stored) => stored < running,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> PluginVersion {
        PluginVersion::parse(raw).unwrap()
    }

    #[test]
    fn test_numeric_segments_are_not_lexical() {
        assert!(v("1.4.0") < v("1.5.0"));
        assert!(v("1.5.0") < v("1.10.0"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("3.6.3") > v("3.5.1"));
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(v("2.0.0"), v("2.0.0"));
        assert_eq!(v("1.01"), v("1.1"));
        assert!(!(v("2.0.0") < v("2.0.0")));
    }

    #[test]
    fn test_shorter_version_is_older() {
        assert!(v("1.0") < v("1.0.0"));
        assert!(v("1") < v("1.0"));
    }

    #[test]
    fn test_release_stages() {
        assert!(v("1.0dev") < v("1.0alpha"));
        assert!(v("1.0alpha") < v("1.0beta"));
        assert!(v("1.0beta") < v("1.0RC1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0pl1"));
        assert_eq!(v("1.0a1"), v("1.0alpha1"));
        assert!(v("2.0.0-beta2") < v("2.0.0"));
    }

    #[test]
    fn test_separators_are_equivalent() {
        assert_eq!(v("1-2_3"), v("1.2.3"));
        assert_eq!(v("1.2+3"), v("1.2.3"));
    }

    #[test]
    fn test_large_numbers() {
        assert!(v("1.99999999999999999999") < v("1.100000000000000000000"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(PluginVersion::parse("").is_err());
        assert!(PluginVersion::parse(" ... ").is_err());
    }

    #[test]
    fn test_is_older_with_missing_version() {
        let running = v("1.0.0");
        assert!(is_older(None, &running));
        assert!(is_older(Some(&v("0.9")), &running));
        assert!(!is_older(Some(&v("1.0.0")), &running));
        assert!(!is_older(Some(&v("1.0.1")), &running));
    }

    #[test]
    fn test_serde_as_string() {
        let version = v("3.6.3");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"3.6.3\"");
        let back: PluginVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }
}
