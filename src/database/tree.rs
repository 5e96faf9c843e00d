//! Browser/OS-indexed record store

use crate::database::record::Record;
use crate::database::RecordStore;
use crate::errors::AppResult;
use crate::types::request::RequestFingerprint;
use crate::types::ua::{BrowserName, OsName, UaFingerprint};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Two-level map keyed by browser name then OS name. Records whose signature
/// carries the `Unknown` sentinel for either key are filed under that
/// sentinel, so user-agent queries union the concrete bucket with the
/// `Unknown` bucket at each level. Iteration is deterministic: key order
/// across buckets, insertion order within one.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    buckets: BTreeMap<BrowserName, BTreeMap<OsName, Vec<Record>>>,
    record_count: usize,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a textual record stream
    pub fn from_reader(input: &mut dyn BufRead) -> AppResult<Self> {
        let mut store = TreeStore::new();
        store.load(input)?;
        Ok(store)
    }

    /// Record counts per (browser, OS) bucket, in key order
    pub fn bucket_counts(&self) -> Vec<((BrowserName, OsName), usize)> {
        self.buckets
            .iter()
            .flat_map(|(browser, os_map)| {
                os_map
                    .iter()
                    .map(move |(os, records)| ((*browser, *os), records.len()))
            })
            .collect()
    }

    fn bucket(&self, browser: BrowserName, os: OsName) -> Option<&Vec<Record>> {
        self.buckets.get(&browser).and_then(|os_map| os_map.get(&os))
    }
}

impl RecordStore for TreeStore {
    fn add(&mut self, record: Record) {
        self.buckets
            .entry(record.ua_signature.browser_name)
            .or_default()
            .entry(record.ua_signature.os_name)
            .or_default()
            .push(record);
        self.record_count += 1;
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.record_count = 0;
    }

    fn len(&self) -> usize {
        self.record_count
    }

    fn dump(&self, output: &mut dyn Write) -> AppResult<()> {
        for os_map in self.buckets.values() {
            for records in os_map.values() {
                for record in records {
                    writeln!(output, "{}", record)?;
                }
            }
        }
        Ok(())
    }

    fn get_by_ua_fingerprint(&self, fingerprint: &UaFingerprint) -> Vec<&Record> {
        let mut keys: Vec<(BrowserName, OsName)> = Vec::with_capacity(4);
        for key in [
            (fingerprint.browser_name, fingerprint.os_name),
            (fingerprint.browser_name, OsName::Unknown),
            (BrowserName::Unknown, fingerprint.os_name),
            (BrowserName::Unknown, OsName::Unknown),
        ] {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys.into_iter()
            .filter_map(|(browser, os)| self.bucket(browser, os))
            .flatten()
            .filter(|record| record.admits_ua(fingerprint))
            .collect()
    }

    fn get_by_request_fingerprint(&self, fingerprint: &RequestFingerprint) -> Vec<&Record> {
        self.buckets
            .values()
            .flat_map(|os_map| os_map.values())
            .flatten()
            .filter(|record| record.admits_request(fingerprint))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ua::{BrowserVersion, DeviceType};

    fn record(line: &str) -> Record {
        line.parse().unwrap()
    }

    fn chrome_on_windows() -> UaFingerprint {
        UaFingerprint {
            browser_name: BrowserName::Chrome,
            browser_version: BrowserVersion::Major(55),
            os_name: OsName::Windows,
            device_type: DeviceType::Computer,
            quirk: vec![],
        }
    }

    #[test]
    fn test_store_sanity() {
        let mut store = TreeStore::new();
        assert!(store.is_empty());
        store.add(record("chrome:*-*:windows:*:|300,303,305::::::"));
        assert_eq!(store.len(), 1);
        store.clear();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_lookup_unions_concrete_and_unknown_buckets() {
        let mut store = TreeStore::new();
        store.add(record("chrome:*-*:windows:*:|300,303,305::::::"));
        store.add(record("chrome:*-*:*:*:|300,303,305::::::"));
        store.add(record("*:*-*:windows:*:|300,303,305::::::"));
        store.add(record("*:*-*:*:*:|300,303,305::::::"));
        store.add(record("firefox:*-*:windows:*:|300,303,305::::::"));

        let matched = store.get_by_ua_fingerprint(&chrome_on_windows());
        assert_eq!(matched.len(), 4);
        assert!(matched
            .iter()
            .all(|record| record.ua_signature.browser_name != BrowserName::Firefox));
    }

    #[test]
    fn test_unknown_fingerprint_only_reaches_wildcard_records() {
        let mut store = TreeStore::new();
        store.add(record("chrome:*-*:windows:*:|300,303,305::::::"));
        store.add(record("*:*-*:*:*:|300,303,305::::::"));

        let unknown = UaFingerprint::default();
        let matched = store.get_by_ua_fingerprint(&unknown);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].ua_signature.browser_name, BrowserName::Unknown);
    }

    #[test]
    fn test_version_range_filter_applies_within_bucket() {
        let mut store = TreeStore::new();
        store.add(record("chrome:52-58:windows:*:|300,303,305::::::"));
        store.add(record("chrome:60-70:windows:*:|300,303,305::::::"));

        let matched = store.get_by_ua_fingerprint(&chrome_on_windows());
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_request_fingerprint_query_scans_every_bucket() {
        let mut store = TreeStore::new();
        store.add(record("chrome:*-*:windows:*:|300,303,305:c02b:::::"));
        store.add(record("firefox:*-*:linux:*:|300,303,305:c02b,c030:::::"));
        store.add(record("safari:*-*:macos:*:|300,300,300:c02b:::::"));

        let observed: RequestFingerprint = "303:c02b:::::".parse().unwrap();
        assert_eq!(store.get_by_request_fingerprint(&observed).len(), 2);
    }

    #[test]
    fn test_dump_covers_all_buckets() {
        let mut store = TreeStore::new();
        store.add(record("chrome:*-*:windows:*:|300,303,305::::::"));
        store.add(record("*:*-*:*:*:|300,303,305::::::"));
        let mut dumped = Vec::new();
        store.dump(&mut dumped).unwrap();
        let text = String::from_utf8(dumped).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
