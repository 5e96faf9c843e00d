//! Linear-scan record store

use crate::database::record::Record;
use crate::database::RecordStore;
use crate::errors::AppResult;
use crate::types::request::RequestFingerprint;
use crate::types::ua::UaFingerprint;
use std::io::{BufRead, Write};

/// Store that keeps records in insertion order and scans all of them on
/// every query. The MITM corpus is small enough that this stays cheap, and
/// request-fingerprint queries have to visit every record anyway.
#[derive(Debug, Clone, Default)]
pub struct LinearStore {
    records: Vec<Record>,
}

impl LinearStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a textual record stream
    pub fn from_reader(input: &mut dyn BufRead) -> AppResult<Self> {
        let mut store = LinearStore::new();
        store.load(input)?;
        Ok(store)
    }

    /// Records satisfying the predicate, in insertion order
    fn get_by(&self, keep: impl Fn(&Record) -> bool) -> Vec<&Record> {
        self.records.iter().filter(|record| keep(record)).collect()
    }
}

impl RecordStore for LinearStore {
    fn add(&mut self, record: Record) {
        self.records.push(record);
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn dump(&self, output: &mut dyn Write) -> AppResult<()> {
        for record in &self.records {
            writeln!(output, "{}", record)?;
        }
        Ok(())
    }

    fn get_by_ua_fingerprint(&self, fingerprint: &UaFingerprint) -> Vec<&Record> {
        self.get_by(|record| record.admits_ua(fingerprint))
    }

    fn get_by_request_fingerprint(&self, fingerprint: &RequestFingerprint) -> Vec<&Record> {
        self.get_by(|record| record.admits_request(fingerprint))
    }
}
