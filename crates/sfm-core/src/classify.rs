//! Classification of store failures into semantic outcomes

use crate::store::StoreError;

/// Status code the backend uses for a missing resource
pub const STATUS_NOT_FOUND: u16 = 404;
/// Status code the backend uses for a rejected request
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Message code the backend returns when the parent project does not exist
pub const PROJECT_NOT_FOUND_CODE: &str = "VS800075";

/// What a store failure means to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed resource, or its parent project, does not exist
    NotFound,
    /// The store refused to issue the call
    Validation,
    /// Anything else; passed through unchanged
    Remote,
}

/// Classify a normalized `(status, message)` pair.
///
/// A 400 carrying [`PROJECT_NOT_FOUND_CODE`] means the project is gone, so
/// every child resource is treated as absent. Other 400s are not.
pub fn classify_status(status: u16, message: &str) -> ErrorKind {
    match status {
        STATUS_NOT_FOUND => ErrorKind::NotFound,
        STATUS_BAD_REQUEST if message.contains(PROJECT_NOT_FOUND_CODE) => ErrorKind::NotFound,
        _ => ErrorKind::Remote,
    }
}

/// Classify a store error
pub fn classify(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::MissingArgument { .. } => ErrorKind::Validation,
        StoreError::Api(api) => classify_status(api.status, &api.message),
        StoreError::Transport { .. } => ErrorKind::Remote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(404, "", ErrorKind::NotFound)]
    #[case(404, "Secure file not found", ErrorKind::NotFound)]
    #[case(
        400,
        "VS800075: The project with id 'abc' does not exist, or you do not have permission to access it.",
        ErrorKind::NotFound
    )]
    #[case(400, "VS402371: invalid name", ErrorKind::Remote)]
    #[case(401, "VS800075", ErrorKind::Remote)]
    #[case(500, "Internal Server Error", ErrorKind::Remote)]
    #[case(409, "conflict", ErrorKind::Remote)]
    fn test_classify_status(#[case] status: u16, #[case] message: &str, #[case] expected: ErrorKind) {
        assert_eq!(classify_status(status, message), expected);
    }

    #[test]
    fn missing_argument_is_validation() {
        assert_eq!(
            classify(&StoreError::missing("args.SecureFileId")),
            ErrorKind::Validation
        );
    }

    #[test]
    fn transport_failure_is_remote() {
        assert_eq!(
            classify(&StoreError::transport("connection refused")),
            ErrorKind::Remote
        );
    }

    #[test]
    fn api_error_goes_through_status_rules() {
        assert_eq!(
            classify(&StoreError::api(400, "VS800075: gone")),
            ErrorKind::NotFound
        );
        assert_eq!(classify(&StoreError::api(400, "bad")), ErrorKind::Remote);
    }
}
