//! Request (ClientHello) fingerprints and signatures
//!
//! A [`RequestFingerprint`] holds the already-decoded integer views of one
//! observed ClientHello plus its quirk list; a [`RequestSignature`] is the
//! corresponding pattern from the corpus. The aggregate match is the minimum
//! over the seven field outcomes, and the similarity score counts how many
//! fields matched `Possible` so the check engine can pick the closest record
//! when nothing matches outright.

use crate::detection::cipher_suites::GLOBAL_CIPHER_CHECK;
use crate::errors::{AppError, AppResult};
use crate::types::common::{
    fmt_int_list, fmt_string_list, parse_int_list, parse_string_list, IntList, Match, StringList,
    TlsVersion,
};
use crate::types::int_signature::IntListSignature;
use crate::types::string_signature::StringListSignature;
use std::fmt;

/// Number of independently matched fields in a request signature
pub const FIELD_COUNT: u32 = 7;

/// Observed ClientHello fingerprint, as decoded by an upstream collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFingerprint {
    pub version: TlsVersion,
    pub cipher: IntList,
    pub extension: IntList,
    pub curve: IntList,
    pub ec_point_fmt: IntList,
    pub header: IntList,
    pub quirk: StringList,
}

/// Rendered as `version:cipher:extension:curve:ecpointfmt:header:quirk`
impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}",
            self.version,
            fmt_int_list(&self.cipher),
            fmt_int_list(&self.extension),
            fmt_int_list(&self.curve),
            fmt_int_list(&self.ec_point_fmt),
            fmt_int_list(&self.header),
            fmt_string_list(&self.quirk)
        )
    }
}

impl std::str::FromStr for RequestFingerprint {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 7 {
            return Err(AppError::InvalidData(format!(
                "request fingerprint needs 7 fields, got {}",
                fields.len()
            )));
        }
        Ok(RequestFingerprint {
            version: fields[0].parse()?,
            cipher: parse_int_list(fields[1])?,
            extension: parse_int_list(fields[2])?,
            curve: parse_int_list(fields[3])?,
            ec_point_fmt: parse_int_list(fields[4])?,
            header: parse_int_list(fields[5])?,
            quirk: parse_string_list(fields[6])?,
        })
    }
}

/// TLS version window with an expected value inside it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionSignature {
    pub min: TlsVersion,
    pub exp: TlsVersion,
    pub max: TlsVersion,
}

impl VersionSignature {
    /// A signature expecting exactly one version
    pub fn exact(version: TlsVersion) -> Self {
        VersionSignature {
            min: version,
            exp: version,
            max: version,
        }
    }

    /// In range and expected is `Possible`; in range but unexpected is
    /// `Unlikely`; out of range is `Impossible`
    pub fn matches(&self, version: TlsVersion) -> Match {
        if version < self.min || version > self.max {
            Match::Impossible
        } else if version == self.exp {
            Match::Possible
        } else {
            Match::Unlikely
        }
    }

    /// Grade implied by the version the browser is expected to offer
    pub fn grade(&self) -> crate::types::common::Grade {
        self.exp.grade()
    }
}

/// Rendered as `min,exp,max` in lowercase hex
impl fmt::Display for VersionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.min, self.exp, self.max)
    }
}

impl std::str::FromStr for VersionSignature {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 3 {
            return Err(AppError::InvalidData(format!(
                "version signature needs min,exp,max, got {:?}",
                s
            )));
        }
        let sig = VersionSignature {
            min: fields[0].parse()?,
            exp: fields[1].parse()?,
            max: fields[2].parse()?,
        };
        if !(sig.min <= sig.exp && sig.exp <= sig.max) {
            return Err(AppError::InvalidData(format!(
                "version signature violates min <= exp <= max: {}",
                sig
            )));
        }
        Ok(sig)
    }
}

/// The matched fields of a request signature, in diagnosis priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureField {
    Version,
    Cipher,
    Extension,
    Curve,
    EcPointFmt,
    Header,
    Quirk,
}

impl SignatureField {
    /// Fixed first-cause scan order
    pub const ORDER: [SignatureField; 7] = [
        SignatureField::Version,
        SignatureField::Cipher,
        SignatureField::Extension,
        SignatureField::Curve,
        SignatureField::EcPointFmt,
        SignatureField::Header,
        SignatureField::Quirk,
    ];
}

impl fmt::Display for SignatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            SignatureField::Version => "version",
            SignatureField::Cipher => "cipher",
            SignatureField::Extension => "extension",
            SignatureField::Curve => "curve",
            SignatureField::EcPointFmt => "ecpointfmt",
            SignatureField::Header => "header",
            SignatureField::Quirk => "quirk",
        };
        write!(f, "{}", token)
    }
}

/// Per-field outcomes of one signature evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOutcomes {
    pub version: Match,
    pub cipher: Match,
    pub extension: Match,
    pub curve: Match,
    pub ec_point_fmt: Match,
    pub header: Match,
    pub quirk: Match,
}

impl FieldOutcomes {
    pub fn get(&self, field: SignatureField) -> Match {
        match field {
            SignatureField::Version => self.version,
            SignatureField::Cipher => self.cipher,
            SignatureField::Extension => self.extension,
            SignatureField::Curve => self.curve,
            SignatureField::EcPointFmt => self.ec_point_fmt,
            SignatureField::Header => self.header,
            SignatureField::Quirk => self.quirk,
        }
    }

    /// Outcomes in the fixed scan order
    pub fn iter(&self) -> impl Iterator<Item = (SignatureField, Match)> + '_ {
        SignatureField::ORDER.iter().map(move |f| (*f, self.get(*f)))
    }

    /// Aggregate outcome (minimum over all fields)
    pub fn aggregate(&self) -> Match {
        Match::aggregate(self.iter().map(|(_, outcome)| outcome))
    }

    /// Number of fields that matched `Possible`
    pub fn similarity(&self) -> u32 {
        self.iter()
            .filter(|(_, outcome)| *outcome == Match::Possible)
            .count() as u32
    }
}

/// Pattern over request fingerprints carried by a corpus record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignature {
    pub version: VersionSignature,
    pub cipher: IntListSignature,
    pub extension: IntListSignature,
    pub curve: IntListSignature,
    pub ec_point_fmt: IntListSignature,
    pub header: IntListSignature,
    pub quirk: StringListSignature,
}

impl RequestSignature {
    /// Evaluate every field against the observed fingerprint
    pub fn match_map(&self, observed: &RequestFingerprint) -> FieldOutcomes {
        FieldOutcomes {
            version: self.version.matches(observed.version),
            cipher: self.cipher.matches(&observed.cipher),
            extension: self.extension.matches(&observed.extension),
            curve: self.curve.matches(&observed.curve),
            ec_point_fmt: self.ec_point_fmt.matches(&observed.ec_point_fmt),
            header: self.header.matches(&observed.header),
            quirk: self.quirk.matches(&observed.quirk),
        }
    }

    /// Aggregate outcome plus similarity score in `[0, FIELD_COUNT]`
    pub fn matches(&self, observed: &RequestFingerprint) -> (Match, u32) {
        let outcomes = self.match_map(observed);
        (outcomes.aggregate(), outcomes.similarity())
    }

    /// Grade of the configuration this signature describes: expected-version
    /// grade merged with the cipher-table grade of the expected cipher list
    pub fn grade(&self) -> crate::types::common::Grade {
        self.version
            .grade()
            .merge(GLOBAL_CIPHER_CHECK.grade(&self.cipher.expected()))
    }

    /// Whether the browser described by this signature prefers a
    /// forward-secret cipher
    pub fn is_pfs(&self) -> bool {
        GLOBAL_CIPHER_CHECK.is_first_pfs(&self.cipher.expected())
    }

    /// A witness fingerprint this signature admits as `Possible`
    pub fn projected(&self) -> RequestFingerprint {
        RequestFingerprint {
            version: self.version.exp,
            cipher: self.cipher.projected(),
            extension: self.extension.projected(),
            curve: self.curve.projected(),
            ec_point_fmt: self.ec_point_fmt.projected(),
            header: self.header.projected(),
            quirk: self.quirk.projected(),
        }
    }
}

/// Rendered as `version:cipher:extension:curve:ecpointfmt:header:quirk`
impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}",
            self.version,
            self.cipher,
            self.extension,
            self.curve,
            self.ec_point_fmt,
            self.header,
            self.quirk
        )
    }
}

impl std::str::FromStr for RequestSignature {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 7 {
            return Err(AppError::InvalidData(format!(
                "request signature needs 7 fields, got {}",
                fields.len()
            )));
        }
        Ok(RequestSignature {
            version: fields[0].parse()?,
            cipher: fields[1].parse()?,
            extension: fields[2].parse()?,
            curve: fields[3].parse()?,
            ec_point_fmt: fields[4].parse()?,
            header: fields[5].parse()?,
            quirk: fields[6].parse()?,
        })
    }
}
