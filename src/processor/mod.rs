//! The check engine
//!
//! A [`Processor`] holds three read-only structures - the browser store, the
//! MITM store and the bad-header set - and answers [`Processor::check`]
//! calls against them. Checks are strictly synchronous and pure given a
//! store snapshot; reloading builds fresh structures before publishing them,
//! so concurrent checks keep reading a consistent snapshot.

pub mod report;

pub use report::{Report, ReportError};

use crate::config::AppConfig;
use crate::database::{LinearStore, RecordStore, TreeStore};
use crate::detection::cipher_suites::GLOBAL_CIPHER_CHECK;
use crate::detection::normalise::normalise;
use crate::errors::AppResult;
use crate::loader::{FileLoader, Loader};
use crate::types::common::{fmt_int_list, fmt_string_list, parse_hex_id, IntSet, Match};
use crate::types::request::{RequestFingerprint, RequestSignature, SignatureField};
use crate::types::ua::UaFingerprint;
use std::io::{BufRead, BufReader};
use tracing::{info, warn};

/// Names of the signature files to read, plus the loader to read them with.
/// With no loader the host filesystem is used.
pub struct ProcessorConfig {
    pub browser_file_name: String,
    pub mitm_file_name: String,
    pub bad_header_file_name: String,
    pub loader: Option<Box<dyn Loader>>,
}

impl ProcessorConfig {
    pub fn from_app_config(app_config: &AppConfig) -> AppResult<Self> {
        Ok(ProcessorConfig {
            browser_file_name: app_config.fingerprints.browser_file.clone(),
            mitm_file_name: app_config.fingerprints.mitm_file.clone(),
            bad_header_file_name: app_config.fingerprints.bad_header_file.clone(),
            loader: app_config.build_loader()?,
        })
    }
}

/// Heuristic MITM detector over a loaded signature corpus
#[derive(Debug, Clone, Default)]
pub struct Processor {
    browser_store: TreeStore,
    mitm_store: LinearStore,
    bad_header_set: IntSet,
}

impl Processor {
    /// Build a processor from the configuration
    pub fn new(config: &ProcessorConfig) -> AppResult<Self> {
        let mut processor = Processor::default();
        processor.load(config)?;
        Ok(processor)
    }

    /// Load (or reload) the processor state.
    ///
    /// A file that cannot be fetched is logged at warning level and its
    /// store starts empty - partial operation beats startup failure. A file
    /// that fetches but fails to parse aborts the load. All three structures
    /// are built before any of them is published.
    pub fn load(&mut self, config: &ProcessorConfig) -> AppResult<()> {
        let browser_store = match Self::open(config, &config.browser_file_name) {
            Ok(mut reader) => TreeStore::from_reader(&mut reader)?,
            Err(err) => {
                warn!("loading file {:?} produced error {}", config.browser_file_name, err);
                TreeStore::new()
            }
        };
        let mitm_store = match Self::open(config, &config.mitm_file_name) {
            Ok(mut reader) => LinearStore::from_reader(&mut reader)?,
            Err(err) => {
                warn!("loading file {:?} produced error {}", config.mitm_file_name, err);
                LinearStore::new()
            }
        };
        let bad_header_set = match Self::open(config, &config.bad_header_file_name) {
            Ok(reader) => Self::parse_bad_headers(reader)?,
            Err(err) => {
                warn!("loading file {:?} produced error {}", config.bad_header_file_name, err);
                IntSet::new()
            }
        };
        info!(
            "loaded {} browser records, {} mitm records, {} bad headers",
            browser_store.len(),
            mitm_store.len(),
            bad_header_set.len()
        );
        self.browser_store = browser_store;
        self.mitm_store = mitm_store;
        self.bad_header_set = bad_header_set;
        Ok(())
    }

    fn open(
        config: &ProcessorConfig,
        name: &str,
    ) -> AppResult<BufReader<Box<dyn std::io::Read + Send>>> {
        let stream = match &config.loader {
            Some(loader) => loader.load_file(name)?,
            None => FileLoader::new().load_file(name)?,
        };
        Ok(BufReader::new(stream))
    }

    /// Bad-header files carry one hex header id per line; `#` comments and
    /// blank lines are ignored
    fn parse_bad_headers(reader: impl BufRead) -> AppResult<IntSet> {
        let mut set = IntSet::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let body = match line.split_once('#') {
                Some((rest, _)) => rest,
                None => line.as_str(),
            };
            let body = body.trim();
            if body.is_empty() {
                continue;
            }
            let id = parse_hex_id(body).map_err(|err| crate::errors::AppError::InvalidRecord {
                line: index + 1,
                reason: err.to_string(),
            })?;
            set.insert(id);
        }
        Ok(set)
    }

    pub fn browser_store(&self) -> &TreeStore {
        &self.browser_store
    }

    pub fn mitm_store(&self) -> &LinearStore {
        &self.mitm_store
    }

    pub fn bad_header_set(&self) -> &IntSet {
        &self.bad_header_set
    }

    /// Check whether the observed ClientHello fields match the expected
    /// ClientHello fields for the browser named by the user agent, and
    /// return a report with the detection result, security details and
    /// matched signatures.
    ///
    /// When several MITM records admit the observed fingerprint the first in
    /// store insertion order (signature-file line order) wins.
    pub fn check(
        &self,
        ua_fingerprint: &UaFingerprint,
        raw_ua: &str,
        request_fingerprint: &RequestFingerprint,
    ) -> Report {
        let mut ua = ua_fingerprint.clone();
        let mut actual = request_fingerprint.clone();
        normalise(&mut ua, raw_ua, &mut actual, &self.bad_header_set);

        let candidates = self.browser_store.get_by_ua_fingerprint(&ua);
        let Some(&first_candidate) = candidates.first() else {
            return Report::unknown_user_agent();
        };

        // Take the first record whose request signature is outright possible;
        // otherwise keep the most similar candidate (ties keep the earlier).
        let mut browser_record = first_candidate;
        let mut max_similarity = None;
        let mut matched = false;
        for record in candidates {
            let (outcome, similarity) = record.request_signature.matches(&actual);
            if outcome == Match::Possible {
                browser_record = record;
                matched = true;
                break;
            }
            if max_similarity.map_or(true, |best| similarity > best) {
                browser_record = record;
                max_similarity = Some(similarity);
            }
        }

        let browser_signature = &browser_record.request_signature;
        let mut report = Report {
            matched_ua_signature: browser_record.ua_signature.to_string(),
            browser_signature: browser_signature.to_string(),
            browser_grade: browser_signature.grade(),
            actual_grade: actual
                .version
                .grade()
                .merge(GLOBAL_CIPHER_CHECK.grade(&actual.cipher)),
            ..Report::default()
        };
        if matched {
            report.browser_signature_match = Match::Possible;
            return report;
        }

        // First-cause diagnosis: any impossible field outranks every
        // unlikely one; within a severity the fixed field order decides.
        let outcomes = browser_signature.match_map(&actual);
        let first_cause = outcomes
            .iter()
            .find(|(_, outcome)| *outcome == Match::Impossible)
            .or_else(|| outcomes.iter().find(|(_, outcome)| *outcome == Match::Unlikely));
        match first_cause {
            Some((field, outcome)) => {
                let tag = match outcome {
                    Match::Impossible => "invalid",
                    _ => "unlikely",
                };
                report.browser_signature_match = outcome;
                report.reason = format!("{}_{}", tag, field);
                report.reason_details = field_details(browser_signature, &actual, field);
            }
            None => {
                report.browser_signature_match = Match::Possible;
            }
        }

        if report.browser_signature_match != Match::Possible {
            if browser_signature.is_pfs() && !GLOBAL_CIPHER_CHECK.is_first_pfs(&actual.cipher) {
                report.loses_pfs = true;
            }
            let mitm_records = self.mitm_store.get_by_request_fingerprint(&actual);
            if let Some(mitm_record) = mitm_records.first() {
                report.matched_mitm_signature = mitm_record.request_signature.to_string();
                if let Some(mitm_info) = &mitm_record.mitm_info {
                    report.actual_grade = report.actual_grade.merge(mitm_info.grade);
                    report.matched_mitm_name = mitm_info.names();
                    report.matched_mitm_type = mitm_info.mitm_type;
                }
            }
        }

        report
    }
}

/// Expected-vs-actual rendering of one signature field
fn field_details(
    signature: &RequestSignature,
    actual: &RequestFingerprint,
    field: SignatureField,
) -> String {
    match field {
        SignatureField::Version => format!("{} vs {}", signature.version, actual.version),
        SignatureField::Cipher => {
            format!("{} vs {}", signature.cipher, fmt_int_list(&actual.cipher))
        }
        SignatureField::Extension => {
            format!("{} vs {}", signature.extension, fmt_int_list(&actual.extension))
        }
        SignatureField::Curve => format!("{} vs {}", signature.curve, fmt_int_list(&actual.curve)),
        SignatureField::EcPointFmt => format!(
            "{} vs {}",
            signature.ec_point_fmt,
            fmt_int_list(&actual.ec_point_fmt)
        ),
        SignatureField::Header => {
            format!("{} vs {}", signature.header, fmt_int_list(&actual.header))
        }
        SignatureField::Quirk => {
            format!("{} vs {}", signature.quirk, fmt_string_list(&actual.quirk))
        }
    }
}
