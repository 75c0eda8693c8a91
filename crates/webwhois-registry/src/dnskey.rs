//! DNSKEY flag and algorithm catalogues.
//!
//! Labels follow the IANA DNSSEC algorithm-numbers registry. Unassigned
//! and reserved code points get generated names so every value in 0-255
//! renders without a lookup failure.

use std::borrow::Cow;

/// ZONE flag bit.
pub const FLAG_ZONE: u16 = 0x0100;
/// REVOKE flag bit.
pub const FLAG_REVOKE: u16 = 0x0080;
/// Secure Entry Point flag bit.
pub const FLAG_SEP: u16 = 0x0001;

const FLAG_LABELS: [(u16, &str); 3] = [
    (FLAG_ZONE, "ZONE"),
    (FLAG_REVOKE, "REVOKE"),
    (FLAG_SEP, "Secure Entry Point (SEP)"),
];

/// Labels of the well-known flag bits set in `flags`, in catalogue order.
/// Unknown bits render nothing.
pub fn flag_labels(flags: u16) -> Vec<&'static str> {
    FLAG_LABELS
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, label)| *label)
        .collect()
}

/// The flag labels joined for display.
pub fn flag_labels_text(flags: u16) -> String {
    flag_labels(flags).join(", ")
}

/// Human-readable label of a DNSKEY algorithm number.
pub fn algorithm_label(alg: u8) -> &'static str {
    match alg {
        0 => "Delete DS",
        1 => "RSA/MD5 (deprecated, see 5)",
        2 => "Diffie-Helman",
        3 => "DSA/SHA1",
        5 => "RSA/SHA-1",
        6 => "DSA-NSEC3-SHA1",
        7 => "RSASHA1-NSEC3-SHA1",
        8 => "RSA/SHA-256",
        10 => "RSA/SHA-512",
        12 => "GOST R 34.10-2001",
        13 => "ECDSA Curve P-256 with SHA-256",
        14 => "ECDSA Curve P-384 with SHA-384",
        15 => "Ed25519",
        16 => "Ed448",
        252 => "Reserved for Indirect Keys",
        253 => "Private algorithm",
        254 => "Private algorithm OID",
        17..=122 => "Unassigned",
        _ => "Reserved",
    }
}

/// Mnemonic name of a DNSKEY algorithm number. Unassigned and reserved
/// code points get `UNASSIGNED_n`/`RESERVED_n` names.
pub fn algorithm_mnemonic(alg: u8) -> Cow<'static, str> {
    let known = match alg {
        0 => "DELETE_DS",
        1 => "RSAMD5",
        2 => "DH",
        3 => "DSA",
        5 => "RSASHA1",
        6 => "DSA_NSEC3_SHA1",
        7 => "RSASHA1_NSEC3_SHA1",
        8 => "RSASHA256",
        10 => "RSASHA512",
        12 => "GOST",
        13 => "ECDSAP256SHA256",
        14 => "ECDSAP384SHA384",
        15 => "ED25519",
        16 => "ED448",
        252 => "INDIRECT",
        253 => "PRIVATEDNS",
        254 => "PRIVATEOID",
        17..=122 => return Cow::Owned(format!("UNASSIGNED_{alg}")),
        _ => return Cow::Owned(format!("RESERVED_{alg}")),
    };
    Cow::Borrowed(known)
}
