//! Corpus records and their textual form
//!
//! One record per line: a user-agent signature, a request signature and, for
//! interceptor records, the MITM metadata, `|`-separated. A leading label
//! column (up to the first tab), end-of-line `#` comments and surrounding
//! double quotes are stripped before parsing. Serialisation is canonical, so
//! a dumped store parses back bit-exactly.

use crate::errors::{AppError, AppResult};
use crate::types::common::{Grade, Match, StringList};
use crate::types::request::{RequestFingerprint, RequestSignature};
use crate::types::ua::{UaFingerprint, UaSignature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of interception product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MitmType {
    #[default]
    Unknown,
    Antivirus,
    FakeBrowser,
    Malware,
    Parental,
    Proxy,
}

impl fmt::Display for MitmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            MitmType::Unknown => "unknown",
            MitmType::Antivirus => "antivirus",
            MitmType::FakeBrowser => "fakebrowser",
            MitmType::Malware => "malware",
            MitmType::Parental => "parental",
            MitmType::Proxy => "proxy",
        };
        write!(f, "{}", token)
    }
}

impl std::str::FromStr for MitmType {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "unknown" => Ok(MitmType::Unknown),
            "antivirus" => Ok(MitmType::Antivirus),
            "fakebrowser" => Ok(MitmType::FakeBrowser),
            "malware" => Ok(MitmType::Malware),
            "parental" => Ok(MitmType::Parental),
            "proxy" => Ok(MitmType::Proxy),
            other => Err(AppError::InvalidData(format!("unknown mitm type: {}", other))),
        }
    }
}

/// Metadata attached to records attributing a fingerprint to an interceptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MitmInfo {
    /// Known product names for this interceptor
    pub name_list: StringList,
    pub mitm_type: MitmType,
    /// Grade the interceptor caps the connection at
    pub grade: Grade,
}

impl MitmInfo {
    /// Product names joined for report output
    pub fn names(&self) -> String {
        self.name_list.join(",")
    }
}

/// Rendered as `names:type:grade`
impl fmt::Display for MitmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name_list.join(","), self.mitm_type, self.grade)
    }
}

impl std::str::FromStr for MitmInfo {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 3 {
            return Err(AppError::InvalidData(format!(
                "mitm info needs names:type:grade, got {:?}",
                s
            )));
        }
        let name_list = if fields[0].is_empty() {
            StringList::new()
        } else {
            fields[0].split(',').map(str::to_string).collect()
        };
        Ok(MitmInfo {
            name_list,
            mitm_type: fields[1].parse()?,
            grade: fields[2].parse()?,
        })
    }
}

/// One corpus record: who the client claims to be, what its ClientHello is
/// expected to look like, and optionally which interceptor it identifies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub ua_signature: UaSignature,
    pub request_signature: RequestSignature,
    pub mitm_info: Option<MitmInfo>,
}

impl Record {
    /// Whether this record's request signature admits the observed
    /// fingerprint (anything better than `Impossible`)
    pub fn admits_request(&self, fingerprint: &RequestFingerprint) -> bool {
        self.request_signature.matches(fingerprint).0 != Match::Impossible
    }

    /// Whether this record's user-agent signature admits the observed
    /// fingerprint
    pub fn admits_ua(&self, fingerprint: &UaFingerprint) -> bool {
        self.ua_signature.matches(fingerprint) != Match::Impossible
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.ua_signature, self.request_signature)?;
        if let Some(mitm_info) = &self.mitm_info {
            write!(f, "|{}", mitm_info)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Record {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split('|').collect();
        if fields.len() != 2 && fields.len() != 3 {
            return Err(AppError::InvalidData(format!(
                "record needs 2 or 3 |-separated sections, got {}",
                fields.len()
            )));
        }
        Ok(Record {
            ua_signature: fields[0].parse()?,
            request_signature: fields[1].parse()?,
            mitm_info: fields.get(2).map(|f| f.parse()).transpose()?,
        })
    }
}

/// Apply the per-line discipline: drop the label column (through the first
/// tab), truncate at the first `#`, trim whitespace and surrounding quotes.
/// Returns `None` for lines with no record body.
pub fn record_body(line: &str) -> Option<&str> {
    let body = match line.split_once('\t') {
        Some((_, rest)) => rest,
        None => line,
    };
    let body = match body.split_once('#') {
        Some((rest, _)) => rest,
        None => body,
    };
    let body = body.trim().trim_matches('"');
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSER_LINE: &str =
        "chrome:52-58:windows:computer:|301,303,304:$c02b,$c02f:^0,5:17,1d:0::grease";
    const MITM_LINE: &str =
        "*:*-*:*:*:|301,303,304:2f,9c,9d:0,5:1d:0::badhdr|foo-proxy,bar-proxy:proxy:c";

    #[test]
    fn test_record_round_trip() {
        for line in [BROWSER_LINE, MITM_LINE] {
            let record: Record = line.parse().unwrap();
            assert_eq!(record.to_string(), line);
            assert_eq!(record.to_string().parse::<Record>().unwrap(), record);
        }
    }

    #[test]
    fn test_mitm_metadata_parsed() {
        let record: Record = MITM_LINE.parse().unwrap();
        let mitm_info = record.mitm_info.unwrap();
        assert_eq!(mitm_info.name_list, vec!["foo-proxy", "bar-proxy"]);
        assert_eq!(mitm_info.mitm_type, MitmType::Proxy);
        assert_eq!(mitm_info.grade, Grade::C);
        assert_eq!(mitm_info.names(), "foo-proxy,bar-proxy");
    }

    #[test]
    fn test_browser_record_has_no_mitm_info() {
        let record: Record = BROWSER_LINE.parse().unwrap();
        assert!(record.mitm_info.is_none());
    }

    #[test]
    fn test_record_body_line_discipline() {
        assert_eq!(record_body("label\tbody"), Some("body"));
        assert_eq!(record_body("body # trailing comment"), Some("body"));
        assert_eq!(record_body("  \"quoted\"  "), Some("quoted"));
        assert_eq!(record_body("label\t \"body\" # note"), Some("body"));
        assert_eq!(record_body(""), None);
        assert_eq!(record_body("   "), None);
        assert_eq!(record_body("# only a comment"), None);
        assert_eq!(record_body("label\t# nothing left"), None);
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        assert!("only-one-section".parse::<Record>().is_err());
        assert!("a:b|c".parse::<Record>().is_err());
        assert!(format!("{}|extra|extra|extra", BROWSER_LINE).parse::<Record>().is_err());
    }
}
