use tonic::Code;
use tonic::Status;

use super::*;

#[test]
fn test_protocol_error_unexpected_target_id() {
    let err = ProtocolError::UnexpectedTargetId {
        expected: 0x5741,
        got: Some(7),
    };
    let msg = err.to_string();
    assert!(msg.contains("22337"));
    assert!(msg.contains("Some(7)"));
}

#[test]
fn test_protocol_error_target_removed() {
    let err = ProtocolError::TargetRemoved {
        code: Code::PermissionDenied,
        message: "rules changed".to_string(),
    };
    assert!(err.to_string().contains("rules changed"));
}

#[test]
fn test_watch_error_code_mapping() {
    let cases = vec![
        (WatchError::from(ProtocolError::UnknownResponse), Code::Internal),
        (
            WatchError::from(ProtocolError::TargetRemoved {
                code: Code::NotFound,
                message: String::new(),
            }),
            Code::NotFound,
        ),
        (WatchError::from(Status::aborted("x")), Code::Aborted),
        (WatchError::Decode("bad".to_string()), Code::Internal),
        (WatchError::InvalidPath("users".to_string()), Code::InvalidArgument),
        (WatchError::Cancelled, Code::Cancelled),
        (WatchError::Stopped, Code::Cancelled),
    ];

    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
    }
}

#[test]
fn test_watch_error_clone_keeps_status() {
    let err = WatchError::Status(Status::permission_denied("denied"));
    let cloned = err.clone();

    assert_eq!(cloned.code(), Code::PermissionDenied);
    assert_eq!(cloned.to_string(), err.to_string());
}

#[test]
fn test_only_cancelled_is_cancellation() {
    assert!(WatchError::Cancelled.is_cancelled());
    assert!(!WatchError::Stopped.is_cancelled());
    assert!(!WatchError::Status(Status::cancelled("transport")).is_cancelled());
}

#[test]
fn test_error_wraps_watch_error() {
    let err: Error = WatchError::InvalidPath("users".to_string()).into();

    assert!(matches!(err, Error::Watch(WatchError::InvalidPath(_))));
    assert_eq!(err.to_string(), "Invalid document path: users");
}
