//! Corpus round-trip properties
//!
//! Every record in a valid corpus must survive `parse -> dump -> parse`
//! bit-exactly, including lines wearing the full production dressing
//! (label column, comments, quotes).

mod common;

use common::{CHROME_RECORD, PROXY_MITM_RECORD};
use mitm_analyser::database::{record_body, LinearStore, Record, RecordStore};

const CORPUS_RECORDS: &[&str] = &[
    CHROME_RECORD,
    PROXY_MITM_RECORD,
    // wildcard UA, empty request fields
    "*:*-*:*:*:|300,303,305::::::",
    // every polarity marker in one cipher field
    "firefox:52-*:linux:computer:|301,303,304:$c02b,$c02c,^1301,9c,?a,!4:0:17,1d:0:1:^grease,?gsa",
    // malware record with several product names
    "*:*-*:*:*:|300,301,303:4,5,a:0:1d:0:1,2:?badhdr|evil-proxy,evil-av:malware:c",
];

#[test]
fn test_every_corpus_record_round_trips() {
    for line in CORPUS_RECORDS {
        let record: Record = line.parse().unwrap();
        let dumped = record.to_string();
        assert_eq!(&dumped, line, "canonical form changed");
        let reparsed: Record = dumped.parse().unwrap();
        assert_eq!(reparsed, record);
    }
}

#[test]
fn test_store_dump_round_trips_with_line_dressing() {
    let dressed = format!(
        "browser-chrome-1\t\"{}\" # desktop chrome\n\n# full-line comment\nmitm-proxy-1\t{}\n",
        CHROME_RECORD, PROXY_MITM_RECORD
    );
    let store = LinearStore::from_reader(&mut dressed.as_bytes()).unwrap();
    assert_eq!(store.len(), 2);

    let mut dumped = Vec::new();
    store.dump(&mut dumped).unwrap();
    let expected = format!("{}\n{}\n", CHROME_RECORD, PROXY_MITM_RECORD);
    assert_eq!(String::from_utf8(dumped).unwrap(), expected);
}

#[test]
fn test_record_body_strips_dressing() {
    assert_eq!(record_body("label\t\"body\" # note"), Some("body"));
    assert_eq!(record_body("# comment only"), None);
}

#[test]
fn test_parse_error_names_offending_line() {
    let corpus = format!("{}\nbroken|record\n", CHROME_RECORD);
    let err = LinearStore::from_reader(&mut corpus.as_bytes()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 2"), "got: {}", message);
}

#[test]
fn test_parse_error_aborts_whole_load() {
    let corpus = format!("not-a-record\n{}\n", CHROME_RECORD);
    assert!(LinearStore::from_reader(&mut corpus.as_bytes()).is_err());
}
