//! Identifier-list signatures
//!
//! An [`IntListSignature`] describes which TLS identifiers a browser is
//! expected to offer in one ClientHello field. Each member carries a polarity
//! (required, optional, unlikely or excluded), and an optional ordered
//! reference sequence constrains the relative order of a subset of members.
//! Keeping a single member-to-polarity map makes the polarity classes
//! disjoint by construction.

use crate::errors::{AppError, AppResult};
use crate::types::common::{parse_hex_id, IntList, IntSet, Match};
use std::collections::BTreeMap;
use std::fmt;

/// Polarity of a signature member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polarity {
    /// Must appear in the observed list; absence is `Impossible`
    Required,
    /// Allowed freely
    Optional,
    /// Presence caps the outcome at `Unlikely`
    Unlikely,
    /// Presence is `Impossible`
    Excluded,
}

impl Polarity {
    /// Prefix marker used in the textual record format (none for optional)
    pub fn marker(self) -> Option<char> {
        match self {
            Polarity::Required => Some('^'),
            Polarity::Optional => None,
            Polarity::Unlikely => Some('?'),
            Polarity::Excluded => Some('!'),
        }
    }

    /// Decode a leading marker character, if it denotes a polarity
    pub fn from_marker(c: char) -> Option<Polarity> {
        match c {
            '^' => Some(Polarity::Required),
            '?' => Some(Polarity::Unlikely),
            '!' => Some(Polarity::Excluded),
            _ => None,
        }
    }
}

/// Signature over an ordered list of 16-bit TLS identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntListSignature {
    /// Member polarity map; keys are disjoint from `ordered`
    members: BTreeMap<u16, Polarity>,
    /// Reference ordering over a subset of acceptable members
    ordered: Vec<u16>,
    /// Precomputed member set of `ordered` for O(1) membership
    ordered_set: IntSet,
}

impl IntListSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from polarity-tagged members and an ordered
    /// reference sequence. Fails if any identifier appears twice.
    pub fn from_parts(
        members: impl IntoIterator<Item = (u16, Polarity)>,
        ordered: IntList,
    ) -> AppResult<Self> {
        let mut sig = IntListSignature::new();
        for id in &ordered {
            sig.push_ordered(*id)?;
        }
        for (id, polarity) in members {
            sig.insert(id, polarity)?;
        }
        Ok(sig)
    }

    /// Add a member with the given polarity
    pub fn insert(&mut self, id: u16, polarity: Polarity) -> AppResult<()> {
        if self.ordered_set.contains(&id) || self.members.insert(id, polarity).is_some() {
            return Err(AppError::InvalidData(format!(
                "duplicate signature member: {:x}",
                id
            )));
        }
        Ok(())
    }

    /// Append an identifier to the ordered reference sequence
    pub fn push_ordered(&mut self, id: u16) -> AppResult<()> {
        if self.members.contains_key(&id) || !self.ordered_set.insert(id) {
            return Err(AppError::InvalidData(format!(
                "duplicate signature member: {:x}",
                id
            )));
        }
        self.ordered.push(id);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.ordered.is_empty()
    }

    /// Members of the ordered reference sequence, in reference order
    pub fn ordered(&self) -> &[u16] {
        &self.ordered
    }

    /// Members with the given polarity, ascending
    pub fn members_with(&self, polarity: Polarity) -> impl Iterator<Item = u16> + '_ {
        self.members
            .iter()
            .filter(move |(_, p)| **p == polarity)
            .map(|(id, _)| *id)
    }

    /// The identifier list this signature nominally expects: the ordered
    /// reference sequence when present, otherwise the required members
    pub fn expected(&self) -> IntList {
        if !self.ordered.is_empty() {
            self.ordered.clone()
        } else {
            self.members_with(Polarity::Required).collect()
        }
    }

    /// Match an observed identifier list against this signature.
    ///
    /// Excluded members, missing required members and identifiers unknown to
    /// the signature are `Impossible`; unlikely members and ordering
    /// violations cap the outcome at `Unlikely`.
    pub fn matches(&self, observed: &[u16]) -> Match {
        let mut outcome = Match::Possible;
        for id in observed {
            match self.members.get(id) {
                Some(Polarity::Excluded) => return Match::Impossible,
                Some(Polarity::Unlikely) => outcome = outcome.combine(Match::Unlikely),
                Some(_) => {}
                None if self.ordered_set.contains(id) => {}
                None => return Match::Impossible,
            }
        }
        let observed_set: IntSet = observed.iter().copied().collect();
        for (id, polarity) in &self.members {
            if *polarity == Polarity::Required && !observed_set.contains(id) {
                return Match::Impossible;
            }
        }
        if !self.ordering_holds(observed) {
            outcome = outcome.combine(Match::Unlikely);
        }
        outcome
    }

    /// The observed list restricted to reference members must equal the
    /// reference sequence. Runs in O(|observed|).
    fn ordering_holds(&self, observed: &[u16]) -> bool {
        if self.ordered.is_empty() {
            return true;
        }
        observed
            .iter()
            .filter(|id| self.ordered_set.contains(id))
            .eq(self.ordered.iter())
    }

    /// A witness identifier list this signature admits as `Possible`
    pub fn projected(&self) -> IntList {
        let mut witness = self.ordered.clone();
        witness.extend(self.members_with(Polarity::Required));
        witness
    }
}

/// Canonical rendering: ordered members first (as given, `$`-marked), then
/// required, optional, unlikely and excluded members each ascending.
impl fmt::Display for IntListSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = self.ordered.iter().map(|id| format!("${:x}", id)).collect();
        for polarity in [
            Polarity::Required,
            Polarity::Optional,
            Polarity::Unlikely,
            Polarity::Excluded,
        ] {
            for id in self.members_with(polarity) {
                match polarity.marker() {
                    Some(marker) => tokens.push(format!("{}{:x}", marker, id)),
                    None => tokens.push(format!("{:x}", id)),
                }
            }
        }
        write!(f, "{}", tokens.join(","))
    }
}

impl std::str::FromStr for IntListSignature {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let mut sig = IntListSignature::new();
        if s.is_empty() {
            return Ok(sig);
        }
        for token in s.split(',') {
            let mut chars = token.chars();
            match chars.next() {
                None => {
                    return Err(AppError::InvalidData("empty signature member".to_string()));
                }
                Some('$') => sig.push_ordered(parse_hex_id(chars.as_str())?)?,
                Some(c) => match Polarity::from_marker(c) {
                    Some(polarity) => sig.insert(parse_hex_id(chars.as_str())?, polarity)?,
                    None => sig.insert(parse_hex_id(token)?, Polarity::Optional)?,
                },
            }
        }
        Ok(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(s: &str) -> IntListSignature {
        s.parse().unwrap()
    }

    #[test]
    fn test_excluded_member_is_impossible() {
        let s = sig("^a,b,!c02b");
        assert_eq!(s.matches(&[0x0a, 0xc02b]), Match::Impossible);
    }

    #[test]
    fn test_missing_required_is_impossible() {
        let s = sig("^a,b");
        assert_eq!(s.matches(&[0x0b]), Match::Impossible);
        assert_eq!(s.matches(&[0x0a, 0x0b]), Match::Possible);
    }

    #[test]
    fn test_unknown_member_is_impossible() {
        let s = sig("a,b");
        assert_eq!(s.matches(&[0x0a, 0xffff]), Match::Impossible);
    }

    #[test]
    fn test_unlikely_member_caps_outcome() {
        let s = sig("a,?b");
        assert_eq!(s.matches(&[0x0a]), Match::Possible);
        assert_eq!(s.matches(&[0x0a, 0x0b]), Match::Unlikely);
    }

    #[test]
    fn test_ordering_violation_is_unlikely() {
        let s = sig("$a,$b,c");
        assert_eq!(s.matches(&[0x0a, 0x0c, 0x0b]), Match::Possible);
        assert_eq!(s.matches(&[0x0b, 0x0a]), Match::Unlikely);
        // A missing reference member also breaks subsequence equality
        assert_eq!(s.matches(&[0x0a, 0x0c]), Match::Unlikely);
    }

    #[test]
    fn test_exclusion_wins_over_ordering() {
        let s = sig("$a,$b,!c");
        assert_eq!(s.matches(&[0x0b, 0x0a, 0x0c]), Match::Impossible);
    }

    #[test]
    fn test_empty_signature_admits_only_empty_list() {
        let s = IntListSignature::new();
        assert_eq!(s.matches(&[]), Match::Possible);
        assert_eq!(s.matches(&[0x0a]), Match::Impossible);
    }

    #[test]
    fn test_projected_witness_is_possible() {
        for pattern in ["", "^a,b,?c,!d", "$1,$2,^3,4", "$c02b,$c02f"] {
            let s = sig(pattern);
            assert_eq!(s.matches(&s.projected()), Match::Possible, "pattern {:?}", pattern);
        }
    }

    #[test]
    fn test_duplicate_member_rejected() {
        assert!("a,a".parse::<IntListSignature>().is_err());
        assert!("$a,^a".parse::<IntListSignature>().is_err());
    }

    #[test]
    fn test_display_round_trip_is_canonical() {
        let s = sig("!ff,$c02b,$c02f,?10,^5,3");
        let rendered = s.to_string();
        assert_eq!(rendered, "$c02b,$c02f,^5,3,?10,!ff");
        assert_eq!(sig(&rendered), s);
    }
}
