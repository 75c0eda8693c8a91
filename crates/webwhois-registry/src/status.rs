//! Registry status codes the gateway branches on.

/// The object is referenced by another object.
pub const STATUS_LINKED: &str = "linked";
/// The object is scheduled for deletion.
pub const STATUS_DELETE_CANDIDATE: &str = "deleteCandidate";

pub const STATUS_VERIFICATION_IN_PROCESS: &str = "contactInManualVerification";
pub const STATUS_VERIFICATION_PASSED: &str = "contactPassedManualVerification";
pub const STATUS_VERIFICATION_FAILED: &str = "contactFailedManualVerification";
pub const STATUS_CONDITIONALLY_IDENTIFIED: &str = "conditionallyIdentifiedContact";
pub const STATUS_IDENTIFIED: &str = "identifiedContact";
pub const STATUS_VALIDATED: &str = "validatedContact";

/// Contact statuses presented as a verification state instead of a plain
/// status line.
pub const CONTACT_VERIFICATION_STATUSES: [&str; 6] = [
    STATUS_VERIFICATION_IN_PROCESS,
    STATUS_VERIFICATION_PASSED,
    STATUS_VERIFICATION_FAILED,
    STATUS_CONDITIONALLY_IDENTIFIED,
    STATUS_IDENTIFIED,
    STATUS_VALIDATED,
];

pub fn is_verification_status(status: &str) -> bool {
    CONTACT_VERIFICATION_STATUSES.contains(&status)
}

pub const STATUS_MOJEID_CONTACT: &str = "mojeidContact";
pub const STATUS_SERVER_TRANSFER_PROHIBITED: &str = "serverTransferProhibited";
pub const STATUS_SERVER_UPDATE_PROHIBITED: &str = "serverUpdateProhibited";
pub const STATUS_SERVER_DELETE_PROHIBITED: &str = "serverDeleteProhibited";
pub const STATUS_SERVER_BLOCKED: &str = "serverBlocked";

/// Contact statuses that rule out offering MojeID actions.
pub const MOJEID_EXCLUDED_STATUSES: [&str; 6] = [
    STATUS_MOJEID_CONTACT,
    STATUS_SERVER_TRANSFER_PROHIBITED,
    STATUS_SERVER_UPDATE_PROHIBITED,
    STATUS_SERVER_DELETE_PROHIBITED,
    STATUS_DELETE_CANDIDATE,
    STATUS_SERVER_BLOCKED,
];

/// Icon shown next to a verification state.
pub fn verification_status_icon(status: &str) -> &'static str {
    match status {
        STATUS_VERIFICATION_IN_PROCESS => "webwhois/img/icon-orange-cross.gif",
        STATUS_VERIFICATION_FAILED => "webwhois/img/icon-red-cross.gif",
        _ => "webwhois/img/icon-yes.gif",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_statuses_are_recognized() {
        assert!(is_verification_status(STATUS_VALIDATED));
        assert!(is_verification_status(STATUS_VERIFICATION_IN_PROCESS));
        assert!(!is_verification_status(STATUS_LINKED));
        assert!(!is_verification_status(STATUS_DELETE_CANDIDATE));
    }

    #[test]
    fn icons_match_the_verification_outcome() {
        assert_eq!(
            verification_status_icon(STATUS_VERIFICATION_IN_PROCESS),
            "webwhois/img/icon-orange-cross.gif"
        );
        assert_eq!(
            verification_status_icon(STATUS_VERIFICATION_FAILED),
            "webwhois/img/icon-red-cross.gif"
        );
        assert_eq!(
            verification_status_icon(STATUS_VALIDATED),
            "webwhois/img/icon-yes.gif"
        );
    }
}
