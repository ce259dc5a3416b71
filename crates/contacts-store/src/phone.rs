//! Phone number normalization.

/// Country code applied when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Number of digits in a national number accepted by bulk import.
pub const LOCAL_NUMBER_DIGITS: usize = 10;

/// Prefix `phone` with `country_code` unless it already carries a `+`.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("{}{}", country_code, phone)
    }
}

/// Check that `phone` is exactly ten ASCII decimal digits.
pub fn is_local_number(phone: &str) -> bool {
    phone.len() == LOCAL_NUMBER_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_country_code() {
        assert_eq!(normalize_phone("9876543210", "+91"), "+919876543210");
        assert_eq!(normalize_phone("5551234567", "+1"), "+15551234567");
    }

    #[test]
    fn test_normalize_keeps_prefixed_numbers() {
        assert_eq!(normalize_phone("+14155551234", "+91"), "+14155551234");
        assert_eq!(normalize_phone("  +447700900123 ", "+91"), "+447700900123");
    }

    #[test]
    fn test_is_local_number() {
        assert!(is_local_number("9876543210"));
        assert!(!is_local_number("987654321"));
        assert!(!is_local_number("98765432100"));
        assert!(!is_local_number("+919876543"));
        assert!(!is_local_number("98765-4321"));
        assert!(!is_local_number(""));
        // Non-ASCII digits are rejected even though they are numeric.
        assert!(!is_local_number("٩٨٧٦٥٤٣٢١٠"));
    }
}
