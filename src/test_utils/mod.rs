//! Shared test components: a scripted listen transport and builders for
//! server messages.
mod responses;
mod scripted_transport;

pub(crate) use responses::*;
pub(crate) use scripted_transport::*;
