//! Cipher-suite property table
//!
//! Maps TLS cipher-suite identifiers to their security properties: whether
//! the key exchange provides forward secrecy and the coarse grade of the
//! suite. Built once from static tables and read-only afterwards.

use crate::types::common::Grade;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Security properties of a single cipher suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherProperties {
    pub forward_secret: bool,
    pub grade: Grade,
}

/// Process-wide cipher property lookup
#[derive(Debug, Clone)]
pub struct CipherCheck {
    table: HashMap<u16, CipherProperties>,
}

// (id, forward_secret, grade)
//
// Grades follow the suite's weakest primitive: AEAD suites are A, CBC-mode
// suites B, and RC4/3DES/NULL constructions C regardless of key exchange.
#[rustfmt::skip]
const CIPHER_TABLE: &[(u16, bool, Grade)] = &[
    // TLS 1.3 suites (ephemeral key exchange by construction)
    (0x1301, true,  Grade::A), // TLS_AES_128_GCM_SHA256
    (0x1302, true,  Grade::A), // TLS_AES_256_GCM_SHA384
    (0x1303, true,  Grade::A), // TLS_CHACHA20_POLY1305_SHA256
    // ECDHE / DHE AEAD
    (0xc02b, true,  Grade::A), // ECDHE_ECDSA_AES_128_GCM
    (0xc02c, true,  Grade::A), // ECDHE_ECDSA_AES_256_GCM
    (0xc02f, true,  Grade::A), // ECDHE_RSA_AES_128_GCM
    (0xc030, true,  Grade::A), // ECDHE_RSA_AES_256_GCM
    (0xcca8, true,  Grade::A), // ECDHE_RSA_CHACHA20_POLY1305
    (0xcca9, true,  Grade::A), // ECDHE_ECDSA_CHACHA20_POLY1305
    (0xccaa, true,  Grade::A), // DHE_RSA_CHACHA20_POLY1305
    (0x009e, true,  Grade::A), // DHE_RSA_AES_128_GCM
    (0x009f, true,  Grade::A), // DHE_RSA_AES_256_GCM
    // ECDHE / DHE CBC
    (0xc009, true,  Grade::B), // ECDHE_ECDSA_AES_128_CBC_SHA
    (0xc00a, true,  Grade::B), // ECDHE_ECDSA_AES_256_CBC_SHA
    (0xc013, true,  Grade::B), // ECDHE_RSA_AES_128_CBC_SHA
    (0xc014, true,  Grade::B), // ECDHE_RSA_AES_256_CBC_SHA
    (0xc023, true,  Grade::B), // ECDHE_ECDSA_AES_128_CBC_SHA256
    (0xc024, true,  Grade::B), // ECDHE_ECDSA_AES_256_CBC_SHA384
    (0xc027, true,  Grade::B), // ECDHE_RSA_AES_128_CBC_SHA256
    (0xc028, true,  Grade::B), // ECDHE_RSA_AES_256_CBC_SHA384
    (0x0033, true,  Grade::B), // DHE_RSA_AES_128_CBC_SHA
    (0x0039, true,  Grade::B), // DHE_RSA_AES_256_CBC_SHA
    (0x0067, true,  Grade::B), // DHE_RSA_AES_128_CBC_SHA256
    (0x006b, true,  Grade::B), // DHE_RSA_AES_256_CBC_SHA256
    // Static RSA key exchange
    (0x009c, false, Grade::B), // RSA_AES_128_GCM
    (0x009d, false, Grade::B), // RSA_AES_256_GCM
    (0x002f, false, Grade::B), // RSA_AES_128_CBC_SHA
    (0x0035, false, Grade::B), // RSA_AES_256_CBC_SHA
    (0x003c, false, Grade::B), // RSA_AES_128_CBC_SHA256
    (0x003d, false, Grade::B), // RSA_AES_256_CBC_SHA256
    // Legacy constructions
    (0x0004, false, Grade::C), // RSA_RC4_128_MD5
    (0x0005, false, Grade::C), // RSA_RC4_128_SHA
    (0x000a, false, Grade::C), // RSA_3DES_EDE_CBC_SHA
    (0x0016, true,  Grade::C), // DHE_RSA_3DES_EDE_CBC_SHA
    (0xc007, true,  Grade::C), // ECDHE_ECDSA_RC4_128_SHA
    (0xc011, true,  Grade::C), // ECDHE_RSA_RC4_128_SHA
    (0xc012, true,  Grade::C), // ECDHE_RSA_3DES_EDE_CBC_SHA
    (0x0001, false, Grade::C), // RSA_NULL_MD5
    (0x0002, false, Grade::C), // RSA_NULL_SHA
];

lazy_static! {
    /// Read-only after init; safe to share across concurrent checks
    pub static ref GLOBAL_CIPHER_CHECK: CipherCheck = CipherCheck::from_table(CIPHER_TABLE);
}

impl CipherCheck {
    fn from_table(table: &[(u16, bool, Grade)]) -> Self {
        CipherCheck {
            table: table
                .iter()
                .map(|(id, forward_secret, grade)| {
                    (
                        *id,
                        CipherProperties {
                            forward_secret: *forward_secret,
                            grade: *grade,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Properties of a single suite, if known
    pub fn properties(&self, id: u16) -> Option<CipherProperties> {
        self.table.get(&id).copied()
    }

    /// Grade of a cipher list: the worst grade among suites known to the
    /// table. Suites the table does not know are skipped; a list with no
    /// known suite grades `Unknown`.
    pub fn grade(&self, ciphers: &[u16]) -> Grade {
        let mut graded = ciphers.iter().filter_map(|id| self.properties(*id));
        match graded.next() {
            None => Grade::Unknown,
            Some(first) => graded.fold(first.grade, |acc, p| acc.merge(p.grade)),
        }
    }

    /// Whether the first-preferred suite of the list is forward-secret
    pub fn is_first_pfs(&self, ciphers: &[u16]) -> bool {
        ciphers
            .first()
            .and_then(|id| self.properties(*id))
            .map(|p| p.forward_secret)
            .unwrap_or(false)
    }
}
