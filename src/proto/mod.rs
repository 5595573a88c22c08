//! Listen protocol messages.
//!
//! Message layouts mirror `google.firestore.v1` so they encode to the same
//! wire bytes as the server expects. Only the messages the listen stream
//! touches are defined here; query construction and value encoding live
//! outside this crate and simply fill in these types.

mod ext;
pub use ext::*;

use std::collections::HashMap;

use prost_types::Timestamp;

// ---------------------------------------------------------------------------
// Requests

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListenRequest {
    /// `projects/{project_id}/databases/{database_id}`
    #[prost(string, tag = "1")]
    pub database: String,
    #[prost(map = "string, string", tag = "4")]
    pub labels: HashMap<String, String>,
    #[prost(oneof = "listen_request::TargetChange", tags = "2, 3")]
    pub target_change: Option<listen_request::TargetChange>,
}

pub mod listen_request {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum TargetChange {
        #[prost(message, tag = "2")]
        AddTarget(super::Target),
        #[prost(int32, tag = "3")]
        RemoveTarget(i32),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Target {
    #[prost(int32, tag = "5")]
    pub target_id: i32,
    #[prost(bool, tag = "6")]
    pub once: bool,
    #[prost(oneof = "target::TargetType", tags = "2, 3")]
    pub target_type: Option<target::TargetType>,
    #[prost(oneof = "target::ResumeType", tags = "4, 11")]
    pub resume_type: Option<target::ResumeType>,
}

pub mod target {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct DocumentsTarget {
        /// Full resource names of the watched documents
        #[prost(string, repeated, tag = "2")]
        pub documents: Vec<String>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct QueryTarget {
        /// `projects/{p}/databases/{d}/documents` or a document beneath it
        #[prost(string, tag = "1")]
        pub parent: String,
        #[prost(message, optional, tag = "2")]
        pub structured_query: Option<super::StructuredQuery>,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum TargetType {
        #[prost(message, tag = "2")]
        Query(QueryTarget),
        #[prost(message, tag = "3")]
        Documents(DocumentsTarget),
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum ResumeType {
        #[prost(bytes, tag = "4")]
        ResumeToken(Vec<u8>),
        #[prost(message, tag = "11")]
        ReadTime(prost_types::Timestamp),
    }
}

/// Collection selection of a structured query.
///
/// Filters, ordering and cursors are produced by the query layer; only the
/// selector is needed to address a listen target.
#[derive(Clone, PartialEq, prost::Message)]
pub struct StructuredQuery {
    #[prost(message, repeated, tag = "2")]
    pub from: Vec<structured_query::CollectionSelector>,
    #[prost(message, optional, tag = "5")]
    pub limit: Option<i32>,
}

pub mod structured_query {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct CollectionSelector {
        #[prost(string, tag = "2")]
        pub collection_id: String,
        #[prost(bool, tag = "3")]
        pub all_descendants: bool,
    }
}

// ---------------------------------------------------------------------------
// Responses

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListenResponse {
    #[prost(oneof = "listen_response::ResponseType", tags = "2, 3, 4, 6, 5")]
    pub response_type: Option<listen_response::ResponseType>,
}

pub mod listen_response {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum ResponseType {
        #[prost(message, tag = "2")]
        TargetChange(super::TargetChange),
        #[prost(message, tag = "3")]
        DocumentChange(super::DocumentChange),
        #[prost(message, tag = "4")]
        DocumentDelete(super::DocumentDelete),
        #[prost(message, tag = "6")]
        DocumentRemove(super::DocumentRemove),
        #[prost(message, tag = "5")]
        Filter(super::ExistenceFilter),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TargetChange {
    #[prost(enumeration = "target_change::TargetChangeType", tag = "1")]
    pub target_change_type: i32,
    #[prost(int32, repeated, tag = "2")]
    pub target_ids: Vec<i32>,
    #[prost(message, optional, tag = "3")]
    pub cause: Option<RpcStatus>,
    #[prost(bytes = "vec", tag = "4")]
    pub resume_token: Vec<u8>,
    #[prost(message, optional, tag = "6")]
    pub read_time: Option<Timestamp>,
}

pub mod target_change {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum TargetChangeType {
        NoChange = 0,
        Add = 1,
        Remove = 2,
        Current = 3,
        Reset = 4,
    }

    impl TargetChangeType {
        pub fn as_str_name(&self) -> &'static str {
            match self {
                TargetChangeType::NoChange => "NO_CHANGE",
                TargetChangeType::Add => "ADD",
                TargetChangeType::Remove => "REMOVE",
                TargetChangeType::Current => "CURRENT",
                TargetChangeType::Reset => "RESET",
            }
        }
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DocumentChange {
    #[prost(message, optional, tag = "1")]
    pub document: Option<Document>,
    #[prost(int32, repeated, tag = "5")]
    pub target_ids: Vec<i32>,
    #[prost(int32, repeated, tag = "6")]
    pub removed_target_ids: Vec<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DocumentDelete {
    #[prost(string, tag = "1")]
    pub document: String,
    #[prost(int32, repeated, tag = "6")]
    pub removed_target_ids: Vec<i32>,
    #[prost(message, optional, tag = "4")]
    pub read_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DocumentRemove {
    #[prost(string, tag = "1")]
    pub document: String,
    #[prost(int32, repeated, tag = "2")]
    pub removed_target_ids: Vec<i32>,
    #[prost(message, optional, tag = "4")]
    pub read_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ExistenceFilter {
    #[prost(int32, tag = "1")]
    pub target_id: i32,
    #[prost(int32, tag = "2")]
    pub count: i32,
}

/// `google.rpc.Status`
#[derive(Clone, PartialEq, prost::Message)]
pub struct RpcStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Documents

#[derive(Clone, PartialEq, prost::Message)]
pub struct Document {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(map = "string, message", tag = "2")]
    pub fields: HashMap<String, Value>,
    #[prost(message, optional, tag = "3")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    pub update_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Value {
    #[prost(oneof = "value::ValueType", tags = "11, 1, 2, 3, 10, 17, 18, 5, 8, 9, 6")]
    pub value_type: Option<value::ValueType>,
}

pub mod value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum ValueType {
        #[prost(int32, tag = "11")]
        NullValue(i32),
        #[prost(bool, tag = "1")]
        BooleanValue(bool),
        #[prost(int64, tag = "2")]
        IntegerValue(i64),
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        #[prost(message, tag = "10")]
        TimestampValue(prost_types::Timestamp),
        #[prost(string, tag = "17")]
        StringValue(String),
        #[prost(bytes, tag = "18")]
        BytesValue(Vec<u8>),
        #[prost(string, tag = "5")]
        ReferenceValue(String),
        #[prost(message, tag = "8")]
        GeoPointValue(super::LatLng),
        #[prost(message, tag = "9")]
        ArrayValue(super::ArrayValue),
        #[prost(message, tag = "6")]
        MapValue(super::MapValue),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ArrayValue {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<Value>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MapValue {
    #[prost(map = "string, message", tag = "1")]
    pub fields: HashMap<String, Value>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct LatLng {
    #[prost(double, tag = "1")]
    pub latitude: f64,
    #[prost(double, tag = "2")]
    pub longitude: f64,
}
