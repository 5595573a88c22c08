//! Database addressing and document decoding.
//!
//! Wire documents are kept as-is while a watch stream accumulates changes and
//! are only turned into [`DocumentSnapshot`]s when a snapshot is assembled.

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use prost_types::Timestamp;

use crate::proto;
use crate::WatchError;

/// Root of one database: `projects/{project_id}/databases/{database_id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabasePath {
    project_id: String,
    database_id: String,
}

impl DatabasePath {
    pub fn new(
        project_id: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: database_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// `projects/{p}/databases/{d}/documents`
    pub fn documents_root(&self) -> String {
        format!("{}/documents", self)
    }

    /// Full resource name of the document at `path` (e.g. `users/alice`).
    ///
    /// `path` must name a document: an even, non-zero number of non-empty
    /// segments.
    pub fn document_name(
        &self,
        path: &str,
    ) -> std::result::Result<String, WatchError> {
        let path = path.trim_matches('/');
        let segments: Vec<&str> = path.split('/').collect();
        if path.is_empty() || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return Err(WatchError::InvalidPath(path.to_string()));
        }
        Ok(format!("{}/{}", self.documents_root(), path))
    }

    /// Inverse of [`document_name`](Self::document_name): the path of `name`
    /// relative to the documents root of this database.
    pub fn relative_path<'a>(
        &self,
        name: &'a str,
    ) -> std::result::Result<&'a str, WatchError> {
        let root = self.documents_root();
        let rest = name
            .strip_prefix(root.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| WatchError::Decode(format!("document {name:?} is outside database {self}")))?;

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return Err(WatchError::Decode(format!("{name:?} is not a document name")));
        }
        Ok(rest)
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "projects/{}/databases/{}", self.project_id, self.database_id)
    }
}

/// A decoded document as of some snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Full resource name
    pub name: String,
    /// Path relative to the documents root, e.g. `users/alice`
    pub path: String,
    pub fields: HashMap<String, proto::Value>,
    pub create_time: SystemTime,
    pub update_time: SystemTime,
}

impl DocumentSnapshot {
    /// Decodes a wire document belonging to `database`
    pub fn from_proto(
        doc: proto::Document,
        database: &DatabasePath,
    ) -> std::result::Result<Self, WatchError> {
        let path = database.relative_path(&doc.name)?.to_string();
        let create_time = decode_time(doc.create_time, "create_time", &doc.name)?;
        let update_time = decode_time(doc.update_time, "update_time", &doc.name)?;

        Ok(Self {
            name: doc.name,
            path,
            fields: doc.fields,
            create_time,
            update_time,
        })
    }

    /// Last path segment
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn field(
        &self,
        key: &str,
    ) -> Option<&proto::Value> {
        self.fields.get(key)
    }
}

fn decode_time(
    ts: Option<Timestamp>,
    field: &str,
    name: &str,
) -> std::result::Result<SystemTime, WatchError> {
    let ts = ts.ok_or_else(|| WatchError::Decode(format!("{name}: missing {field}")))?;
    SystemTime::try_from(ts).map_err(|e| WatchError::Decode(format!("{name}: invalid {field}: {e}")))
}
