//! Response classification.

use provisioner_core::OutcomeStatus;

/// Business result code the remote system returns on success.
pub const SUCCESS_CODE: &str = "0000";

/// Result of classifying a decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: OutcomeStatus,
    pub code: String,
    pub description: String,
}

/// Decide the status of a decoded `(code, description)` pair.
///
/// - `"0000"` is a success.
/// - Any other non-empty code is a business failure; code and description
///   are preserved verbatim.
/// - An empty code means the response carried no result header and is a
///   decode error.
///
/// Pure: no I/O and no shared state.
pub fn classify(code: &str, description: &str) -> Classification {
    let status = if code == SUCCESS_CODE {
        OutcomeStatus::Success
    } else if code.is_empty() {
        OutcomeStatus::DecodeError
    } else {
        OutcomeStatus::BusinessFailure
    };

    Classification {
        status,
        code: code.to_string(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_sentinel() {
        let c = classify("0000", "Operation successfully.");
        assert_eq!(c.status, OutcomeStatus::Success);
        assert_eq!(c.code, "0000");
    }

    #[test]
    fn test_non_success_code_is_business_failure() {
        let c = classify("102010004", "The subscriber already exists.");
        assert_eq!(c.status, OutcomeStatus::BusinessFailure);
        assert_eq!(c.code, "102010004");
        assert_eq!(c.description, "The subscriber already exists.");
    }

    #[test]
    fn test_code_is_not_trimmed_or_normalised() {
        assert_eq!(classify(" 0000", "").status, OutcomeStatus::BusinessFailure);
        assert_eq!(classify("000", "").status, OutcomeStatus::BusinessFailure);
        assert_eq!(classify(" 0000", "").code, " 0000");
    }

    #[test]
    fn test_empty_code_is_decode_error() {
        assert_eq!(classify("", "").status, OutcomeStatus::DecodeError);
    }

    #[test]
    fn test_deterministic() {
        for (code, desc) in [("0000", "ok"), ("9999", "boom"), ("", "")] {
            assert_eq!(classify(code, desc), classify(code, desc));
        }
    }
}
