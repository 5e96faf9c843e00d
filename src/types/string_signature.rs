//! Quirk-list signatures
//!
//! A [`StringListSignature`] applies the same polarity semantics as
//! [`IntListSignature`](crate::types::int_signature::IntListSignature) to
//! short string tokens, without any ordering constraint. Used for the quirk
//! lists attached to both user-agent and request fingerprints.

use crate::errors::{AppError, AppResult};
use crate::types::common::{Match, StringSet};
use crate::types::int_signature::Polarity;
use std::collections::BTreeMap;
use std::fmt;

/// Signature over an unordered list of quirk tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringListSignature {
    members: BTreeMap<String, Polarity>,
}

impl StringListSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from polarity-tagged tokens. Fails on duplicates.
    pub fn from_parts<T: Into<String>>(
        members: impl IntoIterator<Item = (T, Polarity)>,
    ) -> AppResult<Self> {
        let mut sig = StringListSignature::new();
        for (token, polarity) in members {
            sig.insert(token.into(), polarity)?;
        }
        Ok(sig)
    }

    /// Add a token with the given polarity
    pub fn insert(&mut self, token: String, polarity: Polarity) -> AppResult<()> {
        if self.members.insert(token.clone(), polarity).is_some() {
            return Err(AppError::InvalidData(format!(
                "duplicate signature member: {}",
                token
            )));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Tokens with the given polarity, ascending
    pub fn members_with(&self, polarity: Polarity) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(move |(_, p)| **p == polarity)
            .map(|(token, _)| token.as_str())
    }

    /// Match an observed quirk list against this signature
    pub fn matches(&self, observed: &[String]) -> Match {
        let mut outcome = Match::Possible;
        for token in observed {
            match self.members.get(token) {
                Some(Polarity::Excluded) => return Match::Impossible,
                Some(Polarity::Unlikely) => outcome = outcome.combine(Match::Unlikely),
                Some(_) => {}
                None => return Match::Impossible,
            }
        }
        let observed_set: StringSet = observed.iter().cloned().collect();
        for (token, polarity) in &self.members {
            if *polarity == Polarity::Required && !observed_set.contains(token) {
                return Match::Impossible;
            }
        }
        outcome
    }

    /// A witness quirk list this signature admits as `Possible`
    pub fn projected(&self) -> Vec<String> {
        self.members_with(Polarity::Required)
            .map(str::to_string)
            .collect()
    }
}

/// Canonical rendering: required, optional, unlikely, excluded tokens, each
/// group sorted ascending
impl fmt::Display for StringListSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        for polarity in [
            Polarity::Required,
            Polarity::Optional,
            Polarity::Unlikely,
            Polarity::Excluded,
        ] {
            for token in self.members_with(polarity) {
                match polarity.marker() {
                    Some(marker) => tokens.push(format!("{}{}", marker, token)),
                    None => tokens.push(token.to_string()),
                }
            }
        }
        write!(f, "{}", tokens.join(","))
    }
}

impl std::str::FromStr for StringListSignature {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let mut sig = StringListSignature::new();
        if s.is_empty() {
            return Ok(sig);
        }
        for token in s.split(',') {
            let mut chars = token.chars();
            match chars.next() {
                None => {
                    return Err(AppError::InvalidData("empty signature member".to_string()));
                }
                Some(c) => match Polarity::from_marker(c) {
                    Some(polarity) => sig.insert(chars.as_str().to_string(), polarity)?,
                    None => sig.insert(token.to_string(), Polarity::Optional)?,
                },
            }
        }
        Ok(sig)
    }
}
