//! Store-agnostic detection logic
//!
//! Shared pieces the check engine builds on: the process-wide cipher-suite
//! property table and the observed-fingerprint normaliser. Everything here
//! operates purely on decoded fingerprint values.

pub mod cipher_suites;
pub mod normalise;

pub use cipher_suites::{CipherCheck, GLOBAL_CIPHER_CHECK};
pub use normalise::{is_grease, normalise};
