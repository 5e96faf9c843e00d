//! Observed-fingerprint normalisation
//!
//! Prepares an observed `(UaFingerprint, raw UA, RequestFingerprint)` triple
//! for matching: raises quirks for known User-Agent substrings, strips GREASE
//! identifiers from the cipher/extension/curve lists, and flags headers that
//! browsers never send. Normalisation is idempotent - every quirk is appended
//! at most once and a second pass finds nothing left to strip.

use crate::types::common::{IntSet, StringList};
use crate::types::request::RequestFingerprint;
use crate::types::ua::UaFingerprint;

/// Quirk raised when any GREASE identifier was present
pub const QUIRK_GREASE: &str = "grease";
/// Quirk raised when a bad header is present
pub const QUIRK_BAD_HEADER: &str = "badhdr";

// Case-sensitive raw User-Agent substrings and the quirks they raise
const UA_SUBSTRING_QUIRKS: &[(&str, &str)] = &[
    ("Dragon/", "dragon"),
    ("GSA/", "gsa"),
    ("Silk-Accelerated=true", "silk_accelerated"),
    ("PlayStation Vita", "playstation"),
];

/// GREASE identifiers are reserved values of the form 0x?a?a
pub fn is_grease(id: u16) -> bool {
    id & 0x0f0f == 0x0a0a
}

/// Normalise an observed fingerprint pair in place
pub fn normalise(
    ua_fingerprint: &mut UaFingerprint,
    raw_ua: &str,
    request_fingerprint: &mut RequestFingerprint,
    bad_header_set: &IntSet,
) {
    for (needle, quirk) in UA_SUBSTRING_QUIRKS {
        if raw_ua.contains(needle) {
            push_quirk(&mut ua_fingerprint.quirk, quirk);
        }
    }

    let mut had_grease = false;
    for list in [
        &mut request_fingerprint.cipher,
        &mut request_fingerprint.extension,
        &mut request_fingerprint.curve,
    ] {
        let before = list.len();
        list.retain(|id| !is_grease(*id));
        had_grease |= list.len() != before;
    }
    if had_grease {
        push_quirk(&mut request_fingerprint.quirk, QUIRK_GREASE);
    }

    if request_fingerprint
        .header
        .iter()
        .any(|id| bad_header_set.contains(id))
    {
        push_quirk(&mut request_fingerprint.quirk, QUIRK_BAD_HEADER);
    }
}

fn push_quirk(quirks: &mut StringList, quirk: &str) {
    if !quirks.iter().any(|q| q == quirk) {
        quirks.push(quirk.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::common::TlsVersion;

    fn observed() -> (UaFingerprint, RequestFingerprint) {
        let request = RequestFingerprint {
            version: TlsVersion::TLS1_2,
            cipher: vec![0x0a0a, 0xc02b, 0xc02f],
            extension: vec![0x00, 0x3a3a, 0x05],
            curve: vec![0xfafa, 0x1d],
            ec_point_fmt: vec![0x00],
            header: vec![0x01, 0x02],
            quirk: vec![],
        };
        (UaFingerprint::default(), request)
    }

    #[test]
    fn test_grease_stripped_and_flagged_once() {
        let (mut ua, mut req) = observed();
        normalise(&mut ua, "", &mut req, &IntSet::new());
        assert_eq!(req.cipher, vec![0xc02b, 0xc02f]);
        assert_eq!(req.extension, vec![0x00, 0x05]);
        assert_eq!(req.curve, vec![0x1d]);
        assert_eq!(req.quirk, vec![QUIRK_GREASE.to_string()]);
        assert!(!req.cipher.iter().chain(&req.extension).chain(&req.curve).any(|id| is_grease(*id)));
    }

    #[test]
    fn test_no_grease_no_quirk() {
        let (mut ua, mut req) = observed();
        req.cipher = vec![0xc02b];
        req.extension = vec![0x00];
        req.curve = vec![0x1d];
        normalise(&mut ua, "", &mut req, &IntSet::new());
        assert!(req.quirk.is_empty());
    }

    #[test]
    fn test_ua_substring_quirks_are_case_sensitive() {
        let (mut ua, mut req) = observed();
        normalise(&mut ua, "Mozilla/5.0 GSA/7.0 Dragon/52.15", &mut req, &IntSet::new());
        assert_eq!(ua.quirk, vec!["dragon".to_string(), "gsa".to_string()]);

        let (mut ua, mut req) = observed();
        normalise(&mut ua, "gsa/7.0 dragon/52.15", &mut req, &IntSet::new());
        assert!(ua.quirk.is_empty());
    }

    #[test]
    fn test_bad_header_quirk() {
        let (mut ua, mut req) = observed();
        let bad: IntSet = [0x02].into_iter().collect();
        normalise(&mut ua, "", &mut req, &bad);
        assert!(req.quirk.contains(&QUIRK_BAD_HEADER.to_string()));
    }

    #[test]
    fn test_normalise_is_idempotent() {
        let (mut ua, mut req) = observed();
        let bad: IntSet = [0x01].into_iter().collect();
        let raw_ua = "PlayStation Vita Silk-Accelerated=true";
        normalise(&mut ua, raw_ua, &mut req, &bad);
        let (ua_once, req_once) = (ua.clone(), req.clone());
        normalise(&mut ua, raw_ua, &mut req, &bad);
        assert_eq!(ua, ua_once);
        assert_eq!(req, req_once);
    }
}
