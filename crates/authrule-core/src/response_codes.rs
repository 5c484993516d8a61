//! ISO 8583 response codes used by the simulator

/// Approved
pub const APPROVED: &str = "00";
/// System malfunction, used for the fail-closed fallback
pub const SYSTEM_MALFUNCTION: &str = "96";

const RESPONSE_CODES: &[(&str, &str)] = &[
    ("00", "Approved"),
    ("01", "Refer to card issuer"),
    ("03", "Invalid merchant"),
    ("04", "Pick up card"),
    ("05", "Do not honor"),
    ("12", "Invalid transaction"),
    ("13", "Invalid amount"),
    ("14", "Invalid card number"),
    ("30", "Format error"),
    ("41", "Lost card - pick up"),
    ("43", "Stolen card - pick up"),
    ("51", "Insufficient funds"),
    ("54", "Expired card"),
    ("55", "Invalid PIN"),
    ("57", "Transaction not permitted"),
    ("58", "Transaction not permitted to terminal"),
    ("59", "Suspected fraud"),
    ("61", "Exceeds withdrawal limit"),
    ("62", "Restricted card"),
    ("63", "Security violation"),
    ("65", "Soft decline - 3DS required"),
    ("68", "Response received too late"),
    ("75", "PIN tries exceeded"),
    ("85", "No reason to decline"),
    ("91", "Issuer unavailable"),
    ("94", "Duplicate transaction"),
    ("96", "System malfunction"),
];

/// Description of a response code, if it is a known one
pub fn describe(code: &str) -> Option<&'static str> {
    RESPONSE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}

/// Whether the code is part of the table
pub fn is_known(code: &str) -> bool {
    describe(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_codes() {
        assert_eq!(describe(APPROVED), Some("Approved"));
        assert_eq!(describe("51"), Some("Insufficient funds"));
        assert_eq!(describe(SYSTEM_MALFUNCTION), Some("System malfunction"));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe("XX"), None);
        assert!(!is_known("99"));
        assert!(is_known("43"));
    }
}
