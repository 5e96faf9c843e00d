//! Fundamental types shared across the matching engine
//!
//! This module contains the three-valued match algebra, the security grade
//! scale and the primitive list/set aliases that fingerprints and signatures
//! are built from.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ordered sequence of 16-bit TLS identifiers (ciphers, extensions, curves,
/// EC point formats, header-order ids)
pub type IntList = Vec<u16>;

/// Set of 16-bit TLS identifiers with O(1) membership
pub type IntSet = HashSet<u16>;

/// Ordered sequence of short string tokens (quirks, interceptor names)
pub type StringList = Vec<String>;

/// Set of short string tokens with O(1) membership
pub type StringSet = HashSet<String>;

/// Outcome of matching an observed fingerprint against a signature.
///
/// The variants are strictly ordered (`Impossible < Unlikely < Possible`) and
/// independent outcomes aggregate by taking the minimum, so `Impossible`
/// absorbs everything else. The default is `Impossible`, matching the zero
/// value carried by an otherwise-empty report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Match {
    #[default]
    Impossible,
    Unlikely,
    Possible,
}

impl Match {
    /// Combine two independent match outcomes (minimum of the pair)
    pub fn combine(self, other: Match) -> Match {
        self.min(other)
    }

    /// Fold a sequence of outcomes down to their aggregate.
    ///
    /// An empty sequence aggregates to `Possible` (vacuous truth).
    pub fn aggregate<I: IntoIterator<Item = Match>>(outcomes: I) -> Match {
        outcomes.into_iter().fold(Match::Possible, Match::combine)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Match::Impossible => "impossible",
            Match::Unlikely => "unlikely",
            Match::Possible => "possible",
        };
        write!(f, "{}", token)
    }
}

/// Security grade of a cipher configuration.
///
/// Totally ordered with `A` best and `Unknown` worst; merging two grades
/// keeps the worse one, so a downgrade anywhere in the pipeline sticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    #[default]
    Unknown,
    C,
    B,
    A,
}

impl Grade {
    /// Return the worse of the two grades
    pub fn merge(self, other: Grade) -> Grade {
        self.min(other)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Grade::A => "a",
            Grade::B => "b",
            Grade::C => "c",
            Grade::Unknown => "unknown",
        };
        write!(f, "{}", token)
    }
}

impl std::str::FromStr for Grade {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "a" => Ok(Grade::A),
            "b" => Ok(Grade::B),
            "c" => Ok(Grade::C),
            "unknown" => Ok(Grade::Unknown),
            other => Err(AppError::InvalidData(format!("unknown grade: {}", other))),
        }
    }
}

/// 16-bit TLS protocol version as carried on the wire (e.g. 0x0303 = TLS 1.2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TlsVersion(pub u16);

impl TlsVersion {
    pub const SSL3_0: TlsVersion = TlsVersion(0x0300);
    pub const TLS1_0: TlsVersion = TlsVersion(0x0301);
    pub const TLS1_1: TlsVersion = TlsVersion(0x0302);
    pub const TLS1_2: TlsVersion = TlsVersion(0x0303);
    pub const TLS1_3: TlsVersion = TlsVersion(0x0304);

    /// Security grade implied by the protocol version alone
    pub fn grade(self) -> Grade {
        match self {
            TlsVersion::TLS1_2 | TlsVersion::TLS1_3 => Grade::A,
            TlsVersion::TLS1_0 | TlsVersion::TLS1_1 => Grade::B,
            TlsVersion::SSL3_0 => Grade::C,
            _ => Grade::Unknown,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl std::str::FromStr for TlsVersion {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        parse_hex_id(s).map(TlsVersion)
    }
}

/// Parse a TLS identifier rendered as lowercase hex without `0x` prefix
pub fn parse_hex_id(s: &str) -> AppResult<u16> {
    u16::from_str_radix(s, 16)
        .map_err(|_| AppError::InvalidData(format!("invalid hex identifier: {:?}", s)))
}

/// Render an identifier list the way fingerprints are written: comma-joined
/// lowercase hex
pub fn fmt_int_list(list: &[u16]) -> String {
    list.iter()
        .map(|id| format!("{:x}", id))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma-joined lowercase hex identifier list; empty input is an
/// empty list
pub fn parse_int_list(s: &str) -> AppResult<IntList> {
    if s.is_empty() {
        return Ok(IntList::new());
    }
    s.split(',').map(parse_hex_id).collect()
}

/// Render a token list as comma-joined tokens
pub fn fmt_string_list(list: &[String]) -> String {
    list.join(",")
}

/// Parse a comma-joined token list; empty input is an empty list
pub fn parse_string_list(s: &str) -> AppResult<StringList> {
    if s.is_empty() {
        return Ok(StringList::new());
    }
    Ok(s.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ordering_and_absorption() {
        assert!(Match::Impossible < Match::Unlikely);
        assert!(Match::Unlikely < Match::Possible);

        assert_eq!(Match::Possible.combine(Match::Unlikely), Match::Unlikely);
        assert_eq!(Match::Unlikely.combine(Match::Impossible), Match::Impossible);

        // Impossible absorbs regardless of position
        let outcomes = [Match::Possible, Match::Impossible, Match::Possible];
        assert_eq!(Match::aggregate(outcomes), Match::Impossible);
    }

    #[test]
    fn test_match_aggregate_empty_is_possible() {
        assert_eq!(Match::aggregate([]), Match::Possible);
    }

    #[test]
    fn test_grade_merge_keeps_worse() {
        assert_eq!(Grade::A.merge(Grade::C), Grade::C);
        assert_eq!(Grade::B.merge(Grade::A), Grade::B);
        assert_eq!(Grade::A.merge(Grade::Unknown), Grade::Unknown);
        assert_eq!(Grade::A.merge(Grade::A), Grade::A);
    }

    #[test]
    fn test_version_grades() {
        assert_eq!(TlsVersion::TLS1_3.grade(), Grade::A);
        assert_eq!(TlsVersion::TLS1_2.grade(), Grade::A);
        assert_eq!(TlsVersion::TLS1_1.grade(), Grade::B);
        assert_eq!(TlsVersion::TLS1_0.grade(), Grade::B);
        assert_eq!(TlsVersion::SSL3_0.grade(), Grade::C);
        assert_eq!(TlsVersion(0x0200).grade(), Grade::Unknown);
    }

    #[test]
    fn test_int_list_round_trip() {
        let list = vec![0xc02b, 0xc02f, 0x0a];
        let rendered = fmt_int_list(&list);
        assert_eq!(rendered, "c02b,c02f,a");
        assert_eq!(parse_int_list(&rendered).unwrap(), list);
        assert!(parse_int_list("").unwrap().is_empty());
        assert!(parse_int_list("xyz").is_err());
    }
}
