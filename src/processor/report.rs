//! Check reports

use crate::database::record::MitmType;
use crate::types::common::{Grade, Match};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reportable conditions that are not engineering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportError {
    /// No browser record admits the observed user-agent fingerprint
    UnknownUserAgent,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::UnknownUserAgent => write!(f, "unknown_user_agent"),
        }
    }
}

/// Outcome of one MITM detection check.
///
/// `error` is the only user-visible failure channel: an unknown user agent
/// yields a report with `error` set and every other field at its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
    /// Canonical form of the matched record's user-agent signature
    pub matched_ua_signature: String,
    /// Canonical form of the matched record's request signature
    pub browser_signature: String,
    /// Canonical form of the attributed MITM record's request signature
    pub matched_mitm_signature: String,
    /// Product names of the attributed interceptor
    pub matched_mitm_name: String,
    pub matched_mitm_type: MitmType,
    /// Grade of the expected browser configuration
    pub browser_grade: Grade,
    /// Grade of the observed ClientHello, downgraded by MITM attribution
    pub actual_grade: Grade,
    /// How well the observed ClientHello fits the browser's signature
    pub browser_signature_match: Match,
    /// Whether interception trades away the browser's forward secrecy
    pub loses_pfs: bool,
    /// First-cause tag, e.g. `invalid_cipher` or `unlikely_header`
    pub reason: String,
    /// Expected-vs-actual rendering of the offending field
    pub reason_details: String,
}

impl Report {
    /// Report for a user agent no browser record admits
    pub fn unknown_user_agent() -> Self {
        Report {
            error: Some(ReportError::UnknownUserAgent),
            ..Report::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_agent_report_is_otherwise_zero() {
        let report = Report::unknown_user_agent();
        assert_eq!(report.error, Some(ReportError::UnknownUserAgent));
        assert_eq!(
            Report {
                error: Some(ReportError::UnknownUserAgent),
                ..Report::default()
            },
            report
        );
        assert!(report.matched_ua_signature.is_empty());
        assert_eq!(report.browser_signature_match, Match::Impossible);
        assert!(!report.loses_pfs);
    }

    #[test]
    fn test_report_serialises_to_json() {
        let report = Report::unknown_user_agent();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "unknown_user_agent");
        assert_eq!(json["browser_grade"], "unknown");
        assert_eq!(json["browser_signature_match"], "impossible");
    }
}
