use std::collections::HashMap;

use prost_types::Timestamp;

use crate::proto::Document;
use crate::test_utils::*;
use crate::DatabasePath;
use crate::DocumentSnapshot;
use crate::WatchError;

#[test]
fn database_path_should_format_resource_names() {
    let db = DatabasePath::new("p1", "(default)");

    assert_eq!(db.to_string(), "projects/p1/databases/(default)");
    assert_eq!(db.documents_root(), "projects/p1/databases/(default)/documents");
    assert_eq!(
        db.document_name("rooms/a/messages/m1").unwrap(),
        "projects/p1/databases/(default)/documents/rooms/a/messages/m1"
    );
}

#[test]
fn document_name_should_reject_non_document_paths() {
    let db = test_database();

    for path in ["", "/", "rooms", "rooms/a/messages", "rooms//a"] {
        assert!(
            matches!(db.document_name(path), Err(WatchError::InvalidPath(_))),
            "{path:?}"
        );
    }
}

#[test]
fn relative_path_should_invert_document_name() {
    let db = test_database();
    let name = db.document_name("users/alice").unwrap();

    assert_eq!(db.relative_path(&name).unwrap(), "users/alice");
}

#[test]
fn relative_path_should_reject_foreign_and_collection_names() {
    let db = test_database();

    assert!(matches!(
        db.relative_path("projects/other/databases/(default)/documents/users/alice"),
        Err(WatchError::Decode(_))
    ));
    assert!(matches!(db.relative_path(&doc_name("users")), Err(WatchError::Decode(_))));
    assert!(matches!(
        db.relative_path(&test_database().documents_root()),
        Err(WatchError::Decode(_))
    ));
}

#[test]
fn from_proto_should_decode_times_and_fields() {
    let snapshot = DocumentSnapshot::from_proto(document("users/alice", 4), &test_database()).unwrap();

    assert_eq!(snapshot.name, doc_name("users/alice"));
    assert_eq!(snapshot.path, "users/alice");
    assert_eq!(snapshot.id(), "alice");
    assert_eq!(snapshot.create_time, system_time(1));
    assert_eq!(snapshot.update_time, system_time(5));
    assert_eq!(snapshot.field("n"), Some(&int_value(4)));
    assert_eq!(snapshot.field("missing"), None);
}

#[test]
fn from_proto_should_reject_missing_create_time() {
    let doc = Document {
        name: doc_name("users/alice"),
        fields: HashMap::new(),
        create_time: None,
        update_time: Some(Timestamp { seconds: 1, nanos: 0 }),
    };

    let err = DocumentSnapshot::from_proto(doc, &test_database()).unwrap_err();

    assert!(err.to_string().contains("create_time"));
}
