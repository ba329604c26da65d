//! Cell text normalization.

/// Canonical comparable form of a raw cell value.
///
/// Trims surrounding whitespace and lowercases with full Unicode case mapping,
/// so accented text ("AÇÃO", "ação") compares equal.
#[inline]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize("  Ana Maria \t"), "ana maria");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_unicode_lowercase() {
        assert_eq!(normalize("CONDOMÍNIO SÃO JOÃO"), "condomínio são joão");
        assert_eq!(normalize("ÁGUA"), "água");
    }

    #[test]
    fn test_idempotent() {
        for s in ["  ABC ", "Çedilha", "x", "", " Mixed Case 123 "] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }
}
