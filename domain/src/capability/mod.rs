//! Capability domain module
//!
//! A **provider** is an external process speaking the line-delimited JSON-RPC
//! tool protocol. Each provider advertises **capabilities** (tools). The
//! registry namespaces them as `provider__local` so that two providers may
//! expose the same local name without colliding:
//!
//! ```text
//! provider "git"   ── status ──▶ git__status
//! provider "files" ── status ──▶ files__status
//! ```
//!
//! Only the qualified name is used by callers; the local name is what goes
//! over the wire to the provider.

pub mod entities;

pub use entities::{
    Capability, CapabilityOutput, ProviderSpec, ProviderStatus, QUALIFIED_SEPARATOR,
    ToolDescriptor, empty_object_schema, qualified_name,
};
