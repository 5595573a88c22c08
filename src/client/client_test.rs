use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::WatchClient;
use crate::constants::WATCH_TARGET_ID;
use crate::proto::structured_query::CollectionSelector;
use crate::proto::target::TargetType;
use crate::proto::StructuredQuery;
use crate::test_utils::*;
use crate::BackoffPolicy;
use crate::Error;
use crate::WatchError;

fn client(transport: &ScriptedTransport) -> WatchClient {
    WatchClient::new(Arc::new(transport.clone()), test_database(), BackoffPolicy::default())
}

#[tokio::test]
async fn document_snapshots_should_watch_full_document_name() {
    let transport = ScriptedTransport::new().hanging_stream(vec![Ok(add()), Ok(current()), Ok(no_change(10, b"t1"))]);
    let client = client(&transport);

    let mut iter = client
        .document_snapshots("/users/alice/", CancellationToken::new())
        .unwrap();
    assert_eq!(iter.name(), doc_name("users/alice"));
    iter.next().await.unwrap().unwrap();

    let opened = transport.opened_targets();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].target_id, WATCH_TARGET_ID);
    match &opened[0].target_type {
        Some(TargetType::Documents(documents)) => {
            assert_eq!(documents.documents, vec![doc_name("users/alice")]);
        }
        other => panic!("unexpected target {other:?}"),
    }
}

#[tokio::test]
async fn document_snapshots_should_reject_collection_paths() {
    let transport = ScriptedTransport::new();
    let client = client(&transport);

    for path in ["users", "", "users/alice/posts", "users//alice"] {
        let result = client.document_snapshots(path, CancellationToken::new());
        assert!(
            matches!(result, Err(WatchError::InvalidPath(_))),
            "path {path:?} should be rejected"
        );
    }
    assert_eq!(transport.open_count(), 0);
}

#[tokio::test]
async fn query_snapshots_should_target_documents_root_by_default() {
    let transport = ScriptedTransport::new().hanging_stream(vec![
        Ok(add()),
        Ok(change(document("users/alice", 1))),
        Ok(current()),
        Ok(no_change(10, b"t1")),
    ]);
    let client = client(&transport);
    let query = StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: "users".to_string(),
            all_descendants: false,
        }],
        limit: None,
    };

    let mut iter = client
        .query_snapshots(None, query.clone(), CancellationToken::new())
        .unwrap();
    let snapshot = iter.next().await.unwrap().unwrap();

    assert_eq!(snapshot.len(), 1);
    match &transport.opened_targets()[0].target_type {
        Some(TargetType::Query(target)) => {
            assert_eq!(target.parent, test_database().documents_root());
            assert_eq!(target.structured_query, Some(query));
        }
        other => panic!("unexpected target {other:?}"),
    }
}

#[tokio::test]
async fn query_snapshots_should_accept_document_parent() {
    let transport = ScriptedTransport::new();
    let client = client(&transport);

    assert!(client
        .query_snapshots(Some("users/alice"), StructuredQuery::default(), CancellationToken::new())
        .is_ok());
    assert!(matches!(
        client.query_snapshots(Some("users"), StructuredQuery::default(), CancellationToken::new()),
        Err(WatchError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn builder_should_reject_missing_project() {
    let result = WatchClient::builder("").build();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn builder_should_connect_lazily_to_plaintext_endpoint() {
    let client = WatchClient::builder("demo-project")
        .database_id("audit")
        .endpoint("http://127.0.0.1:8080")
        .enable_tls(false)
        .build()
        .unwrap();

    assert_eq!(client.database().to_string(), "projects/demo-project/databases/audit");
}
