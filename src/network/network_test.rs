use tonic::Code;
use tonic::Status;

use super::*;

#[test]
fn transient_codes_should_be_retried() {
    for code in [
        Code::Cancelled,
        Code::Unknown,
        Code::DeadlineExceeded,
        Code::ResourceExhausted,
        Code::Internal,
        Code::Unavailable,
        Code::Unauthenticated,
    ] {
        assert!(
            !is_permanent_watch_error(&Status::new(code, "")),
            "{code:?} should be retryable"
        );
    }
}

#[test]
fn other_codes_should_be_permanent() {
    for code in [
        Code::Ok,
        Code::InvalidArgument,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::DataLoss,
    ] {
        assert!(
            is_permanent_watch_error(&Status::new(code, "")),
            "{code:?} should be permanent"
        );
    }
}
