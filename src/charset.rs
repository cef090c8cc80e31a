//! Charset/collation registry (C1).
//!
//! A static table keyed by collation id, mirroring the subset of
//! `information_schema.collations` that matters to the wire protocol: which
//! character set a column or connection is speaking, and whether it's the
//! binary pseudo-charset (id 63) under which BLOB and TEXT are
//! indistinguishable on the wire.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collation {
    pub id: u16,
    pub charset: &'static str,
    pub name: &'static str,
    pub is_default: bool,
}

/// The charset id MySQL uses for BINARY/VARBINARY/BLOB columns; text decode
/// must not be attempted against it (C2 decodes those columns as bytes).
pub const BINARY_CHARSET_ID: u16 = 63;

pub const UTF8MB4_GENERAL_CI: u16 = 45;
pub const UTF8MB4_UNICODE_CI: u16 = 224;
pub const UTF8MB4_BIN: u16 = 46;

// Small, representative slice of the real collation table; enough to cover
// every charset these drivers are commonly configured with. Unknown ids
// still decode (as bytes) rather than fail — only the *name* lookup is partial.
const TABLE: &[Collation] = &[
    Collation { id: 8, charset: "latin1", name: "latin1_swedish_ci", is_default: true },
    Collation { id: 33, charset: "utf8", name: "utf8_general_ci", is_default: true },
    Collation { id: 45, charset: "utf8mb4", name: "utf8mb4_general_ci", is_default: false },
    Collation { id: 46, charset: "utf8mb4", name: "utf8mb4_bin", is_default: false },
    Collation { id: BINARY_CHARSET_ID, charset: "binary", name: "binary", is_default: true },
    Collation { id: 224, charset: "utf8mb4", name: "utf8mb4_unicode_ci", is_default: false },
    Collation { id: 255, charset: "utf8mb4", name: "utf8mb4_0900_ai_ci", is_default: true },
];

pub fn by_id(id: u16) -> Option<Collation> {
    TABLE.iter().copied().find(|c| c.id == id)
}

pub fn by_name(charset: &str) -> Option<Collation> {
    TABLE
        .iter()
        .copied()
        .find(|c| c.charset.eq_ignore_ascii_case(charset) && c.is_default)
}

/// Pick the collation id to offer in the handshake response for a charset
/// name such as `utf8mb4` (the default per spec.md §6).
pub fn collation_for(charset: &str) -> crate::error::Result<u16> {
    by_name(charset)
        .map(|c| c.id)
        .ok_or_else(|| crate::error::Error::interface(format!("unknown charset: {charset}")))
}

pub fn is_binary(charset_id: u16) -> bool {
    charset_id == BINARY_CHARSET_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_utf8mb4_by_name() {
        assert_eq!(collation_for("utf8mb4").unwrap(), UTF8MB4_0900_FALLBACK);
    }

    const UTF8MB4_0900_FALLBACK: u16 = 255;

    #[test]
    fn binary_charset_is_recognized() {
        assert!(is_binary(BINARY_CHARSET_ID));
        assert!(!is_binary(UTF8MB4_GENERAL_CI));
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(by_id(9999).is_none());
    }
}
