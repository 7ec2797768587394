//! Application-level configuration.
//!
//! - [`ExecutionParams`]: chat loop control and document/search defaults

pub mod execution_params;

pub use execution_params::{
    DEFAULT_SEARCH_RESULTS, DEFAULT_TOP_K, ExecutionParams, MAX_SEARCH_RESULTS, MAX_TOOL_ROUNDS,
    MAX_TOP_K,
};
