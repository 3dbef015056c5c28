//! Common validation utilities.

use std::net::Ipv4Addr;
use std::str::FromStr;

use validator::ValidationError;

/// Validates that a string is not empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a string is an IPv4 address in dotted-quad notation.
pub fn validate_ipv4(value: &str) -> Result<(), ValidationError> {
    match Ipv4Addr::from_str(value.trim()) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("ipv4");
            err.message = Some("IP must be a valid IPv4 address (e.g. 192.168.0.10)".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("router").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_ipv4_accepts_dotted_quad() {
        assert!(validate_ipv4("192.168.0.1").is_ok());
        assert!(validate_ipv4("10.0.0.254").is_ok());
        assert!(validate_ipv4(" 8.8.8.8 ").is_ok());
    }

    #[test]
    fn test_validate_ipv4_rejects_garbage() {
        assert!(validate_ipv4("").is_err());
        assert!(validate_ipv4("999.1.1.1").is_err());
        assert!(validate_ipv4("host.local").is_err());
        assert!(validate_ipv4("::1").is_err());
    }

    #[test]
    fn test_validate_ipv4_error_message() {
        let err = validate_ipv4("nope").unwrap_err();
        assert_eq!(err.code, "ipv4");
        assert!(err.message.unwrap().contains("IPv4"));
    }
}
