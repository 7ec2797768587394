//! Application layer for toolbridge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, MAX_TOOL_ROUNDS};
pub use ports::{
    capability_registry::{CapabilityRegistryPort, RegistryError},
    completion::{CompletionGateway, CompletionRequest, GatewayError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    document_index::{DocumentIndexPort, DocumentMatch, IndexedDocument},
    record_store::{FieldDescription, ObjectDescription, QueryResult, RecordStorePort},
    vendor_factory::{ConfigError, VendorFactory},
    web_search::{SearchHit, WebSearchPort},
};
pub use use_cases::documents::{
    AskDocumentsOutput, AskDocumentsUseCase, DocumentError, IndexDocumentUseCase, UploadOutput,
};
pub use use_cases::run_natural_query::{
    NaturalQueryOutput, RunNaturalQueryError, RunNaturalQueryUseCase,
};
pub use use_cases::run_tool_chat::{
    RunToolChatError, RunToolChatInput, RunToolChatOutput, RunToolChatUseCase, ToolInvocation,
};
pub use use_cases::search_answer::{
    SearchAnswerError, SearchAnswerInput, SearchAnswerOutput, SearchAnswerUseCase,
};
