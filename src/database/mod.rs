//! Record stores
//!
//! Two store implementations share one contract: [`LinearStore`] scans every
//! record and is used for the small MITM corpus, where request-fingerprint
//! queries cannot be pre-indexed; [`TreeStore`] indexes records by browser
//! then OS and serves the user-agent lookups of the much larger browser
//! corpus. Stores are populated at load time and read-only during checks;
//! `add`/`clear`/`load` must be sequenced by the caller (build, then
//! publish).

pub mod linear;
pub mod record;
pub mod tree;

pub use linear::LinearStore;
pub use record::{record_body, MitmInfo, MitmType, Record};
pub use tree::TreeStore;

use crate::errors::{AppError, AppResult};
use crate::types::request::RequestFingerprint;
use crate::types::ua::UaFingerprint;
use std::io::{BufRead, Write};

/// Contract shared by the record stores
pub trait RecordStore {
    /// Insert a record; queries return records in insertion order
    fn add(&mut self, record: Record);

    /// Remove all records
    fn clear(&mut self);

    /// Number of records held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write each record in canonical text form, one per line
    fn dump(&self, output: &mut dyn Write) -> AppResult<()>;

    /// Every record whose user-agent signature admits the fingerprint
    fn get_by_ua_fingerprint(&self, fingerprint: &UaFingerprint) -> Vec<&Record>;

    /// Every record whose request signature admits the fingerprint
    fn get_by_request_fingerprint(&self, fingerprint: &RequestFingerprint) -> Vec<&Record>;

    /// Consume a textual record stream, adding each parsed record.
    ///
    /// The first malformed record aborts the whole load with an error naming
    /// the offending line.
    fn load(&mut self, input: &mut dyn BufRead) -> AppResult<()> {
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let Some(body) = record_body(&line) else {
                continue;
            };
            let record = body.parse().map_err(|err: AppError| AppError::InvalidRecord {
                line: index + 1,
                reason: err.to_string(),
            })?;
            self.add(record);
        }
        Ok(())
    }
}
