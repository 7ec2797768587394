//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod capability_registry;
pub mod completion;
pub mod conversation_logger;
pub mod document_index;
pub mod record_store;
pub mod vendor_factory;
pub mod web_search;
