//! Shared router state

use std::sync::Arc;
use toolbridge_application::{
    CapabilityRegistryPort, ConversationLogger, ExecutionParams, NoConversationLogger,
    VendorFactory,
};
use toolbridge_domain::QueryTranslator;

/// Everything a handler needs, cloned per request.
///
/// Vendor adapters are not held here: handlers ask [`VendorFactory`] for
/// them so credentials are read at call time.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn CapabilityRegistryPort>,
    pub vendors: Arc<dyn VendorFactory>,
    pub translator: Arc<QueryTranslator>,
    pub execution: Arc<ExecutionParams>,
    pub conversation_logger: Arc<dyn ConversationLogger>,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn CapabilityRegistryPort>,
        vendors: Arc<dyn VendorFactory>,
        translator: Arc<QueryTranslator>,
    ) -> Self {
        Self {
            registry,
            vendors,
            translator,
            execution: Arc::new(ExecutionParams::default()),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_execution(mut self, execution: ExecutionParams) -> Self {
        self.execution = Arc::new(execution);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }
}
