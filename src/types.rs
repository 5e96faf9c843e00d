//! TLS MITM Interception Analyser - Type System
//!
//! - `common`: match algebra, grades and primitive list/set types
//! - `int_signature`: polarity-tagged identifier-list signatures
//! - `string_signature`: polarity-tagged quirk-list signatures
//! - `ua`: user-agent fingerprints and signatures
//! - `request`: ClientHello fingerprints and signatures

pub mod common;
pub mod int_signature;
pub mod request;
pub mod string_signature;
pub mod ua;

// Re-export everything through the aggregator
pub use common::*;
pub use int_signature::{IntListSignature, Polarity};
pub use request::{
    FieldOutcomes, RequestFingerprint, RequestSignature, SignatureField, VersionSignature,
    FIELD_COUNT,
};
pub use string_signature::StringListSignature;
pub use ua::{
    BrowserName, BrowserVersion, DeviceType, OsName, UaFingerprint, UaSignature, VersionRange,
};
