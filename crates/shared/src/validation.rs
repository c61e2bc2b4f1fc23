//! Common validation utilities for use with `#[validate(custom(...))]`.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use validator::ValidationError;

lazy_static! {
    static ref MAC_ADDRESS: Regex =
        Regex::new(r"^(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}$")
            .unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates an IPv4 or IPv6 literal.
pub fn validate_ip_address(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| error("ip_address", "Invalid IP address"))
}

/// Validates a MAC address written as six hex pairs separated by `:` or `-`.
pub fn validate_mac_address(value: &str) -> Result<(), ValidationError> {
    if MAC_ADDRESS.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error("mac_address", "Invalid MAC address"))
    }
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value cannot be blank"))
    } else {
        Ok(())
    }
}

/// Validates that an optional window is ordered.
pub fn validate_date_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(error(
            "date_window",
            "End date cannot be before start date",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ip_address() {
        assert!(validate_ip_address("192.168.1.10").is_ok());
        assert!(validate_ip_address("::1").is_ok());
        assert!(validate_ip_address("192.168.1.300").is_err());
        assert!(validate_ip_address("printer-01").is_err());
    }

    #[test]
    fn test_validate_mac_address() {
        assert!(validate_mac_address("00:1A:2b:3C:4d:5E").is_ok());
        assert!(validate_mac_address("00-1A-2B-3C-4D-5E").is_ok());
        assert!(validate_mac_address("00:1A:2B:3C:4D").is_err());
        assert!(validate_mac_address("zz:1A:2B:3C:4D:5E").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Recepción").is_ok());
        let err = validate_not_blank("   ").unwrap_err();
        assert_eq!(err.code, "blank");
    }

    #[test]
    fn test_validate_date_window() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        assert!(validate_date_window(d("2024-01-01"), d("2026-01-01")).is_ok());
        assert!(validate_date_window(d("2026-01-01"), d("2024-01-01")).is_err());
        assert!(validate_date_window(None, d("2024-01-01")).is_ok());
    }
}
