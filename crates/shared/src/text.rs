//! Text normalization for fuzzy name matching.
//!
//! Catalog names, spreadsheet headers and staff names are compared through
//! [`normalize_key`], which folds case, strips diacritics and collapses any
//! run of punctuation or whitespace into a single space.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Produces the comparison key for a free-text name.
///
/// `"  Número de Serie "` and `"numero-de-serie"` both normalize to
/// `"numero de serie"`.
pub fn normalize_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    let mut pending_space = false;

    for c in input.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    key
}

/// Trims a cell value, mapping blank input to `None`.
pub fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_folds_case_and_accents() {
        assert_eq!(normalize_key("Área"), "area");
        assert_eq!(normalize_key("SISTEMA OPERATIVO"), "sistema operativo");
        assert_eq!(normalize_key("Impresión"), normalize_key("impresion"));
    }

    #[test]
    fn test_normalize_key_collapses_punctuation() {
        assert_eq!(normalize_key("N° Serie"), "n serie");
        assert_eq!(normalize_key("  no.   serie "), "no serie");
        assert_eq!(normalize_key("numero-de-serie"), "numero de serie");
    }

    #[test]
    fn test_normalize_key_empty_and_symbols() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key(" -- "), "");
    }

    #[test]
    fn test_normalize_key_keeps_digits() {
        assert_eq!(normalize_key("Windows 10 Pro"), "windows 10 pro");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  SN-001 "), Some("SN-001".to_string()));
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
    }
}
