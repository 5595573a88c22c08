use std::collections::HashMap;
use std::time::Duration;
use std::time::SystemTime;

use prost_types::Timestamp;

use crate::constants::WATCH_TARGET_ID;
use crate::proto::listen_response::ResponseType;
use crate::proto::target_change::TargetChangeType;
use crate::proto::value::ValueType;
use crate::proto::Document;
use crate::proto::DocumentChange;
use crate::proto::DocumentDelete;
use crate::proto::DocumentRemove;
use crate::proto::ExistenceFilter;
use crate::proto::ListenResponse;
use crate::proto::RpcStatus;
use crate::proto::TargetChange;
use crate::proto::Value;
use crate::DatabasePath;

pub(crate) const TARGET: i32 = WATCH_TARGET_ID;

pub(crate) fn test_database() -> DatabasePath {
    DatabasePath::new("test-project", "(default)")
}

/// Full resource name of `path` in [`test_database`]
pub(crate) fn doc_name(path: &str) -> String {
    format!("projects/test-project/databases/(default)/documents/{path}")
}

pub(crate) fn ts(seconds: i64) -> Timestamp {
    Timestamp { seconds, nanos: 0 }
}

pub(crate) fn system_time(seconds: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)
}

pub(crate) fn int_value(v: i64) -> Value {
    Value {
        value_type: Some(ValueType::IntegerValue(v)),
    }
}

/// Document at `path` with a single integer field `n`
pub(crate) fn document(
    path: &str,
    n: i64,
) -> Document {
    Document {
        name: doc_name(path),
        fields: HashMap::from([("n".to_string(), int_value(n))]),
        create_time: Some(ts(1)),
        update_time: Some(ts(1 + n)),
    }
}

fn response(response_type: ResponseType) -> ListenResponse {
    ListenResponse {
        response_type: Some(response_type),
    }
}

pub(crate) fn target_change(
    kind: TargetChangeType,
    target_ids: Vec<i32>,
    resume_token: &[u8],
    read_time: Option<i64>,
) -> ListenResponse {
    response(ResponseType::TargetChange(TargetChange {
        target_change_type: kind as i32,
        target_ids,
        cause: None,
        resume_token: resume_token.to_vec(),
        read_time: read_time.map(ts),
    }))
}

pub(crate) fn add() -> ListenResponse {
    target_change(TargetChangeType::Add, vec![TARGET], b"", None)
}

pub(crate) fn current() -> ListenResponse {
    target_change(TargetChangeType::Current, vec![TARGET], b"", None)
}

pub(crate) fn reset() -> ListenResponse {
    target_change(TargetChangeType::Reset, vec![TARGET], b"", None)
}

/// Global consistent point at `read_time` seconds
pub(crate) fn no_change(
    read_time: i64,
    resume_token: &[u8],
) -> ListenResponse {
    target_change(TargetChangeType::NoChange, vec![], resume_token, Some(read_time))
}

pub(crate) fn remove(cause: Option<(tonic::Code, &str)>) -> ListenResponse {
    response(ResponseType::TargetChange(TargetChange {
        target_change_type: TargetChangeType::Remove as i32,
        target_ids: vec![TARGET],
        cause: cause.map(|(code, message)| RpcStatus {
            code: code as i32,
            message: message.to_string(),
        }),
        resume_token: vec![],
        read_time: None,
    }))
}

pub(crate) fn change(doc: Document) -> ListenResponse {
    response(ResponseType::DocumentChange(DocumentChange {
        document: Some(doc),
        target_ids: vec![TARGET],
        removed_target_ids: vec![],
    }))
}

/// The document no longer matches the target
pub(crate) fn change_removed(doc: Document) -> ListenResponse {
    response(ResponseType::DocumentChange(DocumentChange {
        document: Some(doc),
        target_ids: vec![],
        removed_target_ids: vec![TARGET],
    }))
}

pub(crate) fn delete(path: &str) -> ListenResponse {
    response(ResponseType::DocumentDelete(DocumentDelete {
        document: doc_name(path),
        removed_target_ids: vec![TARGET],
        read_time: None,
    }))
}

pub(crate) fn remove_document(path: &str) -> ListenResponse {
    response(ResponseType::DocumentRemove(DocumentRemove {
        document: doc_name(path),
        removed_target_ids: vec![TARGET],
        read_time: None,
    }))
}

pub(crate) fn filter() -> ListenResponse {
    response(ResponseType::Filter(ExistenceFilter {
        target_id: TARGET,
        count: 1,
    }))
}
