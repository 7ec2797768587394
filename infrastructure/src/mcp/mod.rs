//! Tool provider subprocess protocol
//!
//! Newline-delimited JSON-RPC 2.0 over a child's standard streams, and a
//! registry that exposes the tools of many providers under one namespace.

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;
