//! gRPC listen transport on top of tonic.

mod grpc_transport;
pub use grpc_transport::*;
