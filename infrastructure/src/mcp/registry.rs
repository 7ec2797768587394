//! Multi-provider registry.
//!
//! Owns one [`ProtocolClient`] per registered provider and routes
//! invocations by qualified capability name (`provider__local`).

use super::client::{DEFAULT_REQUEST_TIMEOUT, NotificationObserver, ProtocolClient, TracingObserver};
use super::error::McpError;
use super::protocol::ToolInfo;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use toolbridge_application::{CapabilityRegistryPort, RegistryError};
use toolbridge_domain::{Capability, CapabilityOutput, ProviderSpec, ProviderStatus};
use tracing::{debug, info, warn};

struct Registration {
    client: Arc<ProtocolClient>,
    capabilities: Vec<Capability>,
}

struct Route {
    client: Arc<ProtocolClient>,
    local_name: String,
}

#[derive(Default)]
struct RegistryState {
    /// Registration order
    providers: Vec<Registration>,
    routes: HashMap<String, Route>,
}

impl RegistryState {
    fn remove(&mut self, provider: &str) -> Option<Registration> {
        let index = self
            .providers
            .iter()
            .position(|r| r.client.name() == provider)?;
        let registration = self.providers.remove(index);
        for capability in &registration.capabilities {
            self.routes.remove(&capability.qualified_name);
        }
        Some(registration)
    }

    fn insert(&mut self, registration: Registration) {
        for capability in &registration.capabilities {
            self.routes.insert(
                capability.qualified_name.clone(),
                Route {
                    client: Arc::clone(&registration.client),
                    local_name: capability.local_name.clone(),
                },
            );
        }
        self.providers.push(registration);
    }
}

/// Registry of connected tool providers
pub struct ProviderRegistry {
    state: Mutex<RegistryState>,
    request_timeout: Duration,
    observer: Arc<dyn NotificationObserver>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Request timeout applied to every client created from now on.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn NotificationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Discover capabilities on an already-connected client and install it.
    pub(crate) async fn register_client(
        &self,
        client: Arc<ProtocolClient>,
    ) -> Result<Vec<Capability>, RegistryError> {
        let provider = client.name().to_string();

        let tools = match client.list_capabilities().await {
            Ok(tools) => tools,
            Err(e) => {
                client.disconnect().await;
                return Err(RegistryError::RegistrationFailed {
                    provider,
                    reason: e.to_string(),
                });
            }
        };
        let mut capabilities = build_capabilities(&provider, tools);

        let mut state = self.state.lock().await;
        if let Some(previous) = state.remove(&provider) {
            info!(provider = %provider, "Replacing existing provider registration");
            previous.client.disconnect().await;
        }
        // Routes left at this point belong to other providers.
        capabilities.retain(|capability| {
            let taken = state.routes.contains_key(&capability.qualified_name);
            if taken {
                warn!(
                    provider = %provider,
                    capability = %capability.qualified_name,
                    "Skipping capability whose qualified name is already registered"
                );
            }
            !taken
        });
        state.insert(Registration {
            client,
            capabilities: capabilities.clone(),
        });

        info!(
            provider = %provider,
            capabilities = capabilities.len(),
            "Provider registered"
        );
        Ok(capabilities)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Namespace a provider's tools, skipping unnamed and repeated entries.
fn build_capabilities(provider: &str, tools: Vec<ToolInfo>) -> Vec<Capability> {
    let mut seen = HashSet::new();
    let mut capabilities = Vec::with_capacity(tools.len());

    for tool in tools {
        if tool.name.trim().is_empty() {
            warn!(provider, "Skipping tool without a name");
            continue;
        }
        if !seen.insert(tool.name.clone()) {
            warn!(provider, tool = %tool.name, "Skipping duplicate tool name");
            continue;
        }
        capabilities.push(Capability::new(
            provider,
            tool.name,
            tool.description,
            tool.input_schema,
        ));
    }
    capabilities
}

/// Convert a `tools/call` result into a [`CapabilityOutput`].
///
/// Text blocks are joined with newlines; without any, structured content
/// is serialized instead.
fn to_output(raw: Value) -> CapabilityOutput {
    let text = {
        let blocks: Vec<&str> = raw
            .get("content")
            .and_then(|c| c.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if !blocks.is_empty() {
            blocks.join("\n")
        } else {
            raw.get("structuredContent")
                .filter(|s| !s.is_null())
                .map(|s| s.to_string())
                .unwrap_or_default()
        }
    };
    let is_error = raw
        .get("isError")
        .and_then(|e| e.as_bool())
        .unwrap_or(false);

    CapabilityOutput {
        text,
        is_error,
        raw,
    }
}

#[async_trait]
impl CapabilityRegistryPort for ProviderRegistry {
    async fn register_provider(&self, spec: ProviderSpec) -> Result<Vec<Capability>, RegistryError> {
        spec.validate()
            .map_err(|e| RegistryError::InvalidProvider(e.to_string()))?;

        let provider = spec.name.clone();
        let client = Arc::new(
            ProtocolClient::new(spec)
                .with_request_timeout(self.request_timeout)
                .with_observer(Arc::clone(&self.observer)),
        );

        if let Err(e) = client.connect().await {
            warn!(provider = %provider, "Provider failed to start: {}", e);
            client.disconnect().await;
            return Err(RegistryError::RegistrationFailed {
                provider,
                reason: e.to_string(),
            });
        }

        self.register_client(client).await
    }

    async fn list_capabilities(&self) -> Vec<Capability> {
        let state = self.state.lock().await;
        state
            .providers
            .iter()
            .flat_map(|r| r.capabilities.iter().cloned())
            .collect()
    }

    async fn invoke(
        &self,
        qualified_name: &str,
        arguments: Value,
    ) -> Result<CapabilityOutput, RegistryError> {
        let (client, local_name) = {
            let state = self.state.lock().await;
            let route = state
                .routes
                .get(qualified_name)
                .ok_or_else(|| RegistryError::UnknownCapability(qualified_name.to_string()))?;
            (Arc::clone(&route.client), route.local_name.clone())
        };

        let provider = client.name().to_string();
        if !client.is_connected() {
            return Err(RegistryError::ProviderNotConnected(provider));
        }

        debug!(provider = %provider, tool = %local_name, "Invoking capability");
        let raw = client
            .call_capability(&local_name, arguments)
            .await
            .map_err(|e| match e {
                McpError::Timeout { method } => RegistryError::Timeout { provider: provider.clone(), method },
                e if e.is_connection_lost() => RegistryError::ProviderNotConnected(provider.clone()),
                e => RegistryError::InvocationFailed {
                    capability: qualified_name.to_string(),
                    reason: e.to_string(),
                },
            })?;

        Ok(to_output(raw))
    }

    async fn status(&self) -> BTreeMap<String, ProviderStatus> {
        let state = self.state.lock().await;
        state
            .providers
            .iter()
            .map(|r| {
                (
                    r.client.name().to_string(),
                    ProviderStatus {
                        connected: r.client.is_connected(),
                        capability_count: r.capabilities.len(),
                    },
                )
            })
            .collect()
    }

    async fn teardown_all(&self) {
        let registrations = {
            let mut state = self.state.lock().await;
            state.routes.clear();
            std::mem::take(&mut state.providers)
        };
        if registrations.is_empty() {
            return;
        }

        info!(count = registrations.len(), "Tearing down providers");
        futures::future::join_all(registrations.iter().map(|r| r.client.disconnect())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::test_support::{Reply, answering_provider, connected_client, tool_provider};
    use serde_json::json;

    #[tokio::test]
    async fn registered_capabilities_are_namespaced() {
        let registry = ProviderRegistry::new();
        registry
            .register_client(connected_client("files", tool_provider(&["read", "write"])).await)
            .await
            .unwrap();
        registry
            .register_client(connected_client("web", tool_provider(&["read"])).await)
            .await
            .unwrap();

        let names: Vec<String> = registry
            .list_capabilities()
            .await
            .into_iter()
            .map(|c| c.qualified_name)
            .collect();
        assert_eq!(names, vec!["files__read", "files__write", "web__read"]);

        let descriptors = registry.tool_descriptors().await;
        assert_eq!(descriptors[0].name, "files__read");
        assert_eq!(descriptors[0].description, "read tool");

        let status = registry.status().await;
        assert_eq!(
            status["files"],
            ProviderStatus {
                connected: true,
                capability_count: 2
            }
        );
    }

    #[tokio::test]
    async fn invoke_routes_to_local_name() {
        let registry = ProviderRegistry::new();
        registry
            .register_client(connected_client("web", tool_provider(&["read"])).await)
            .await
            .unwrap();

        let output = registry.invoke("web__read", json!({})).await.unwrap();
        assert_eq!(output.text, "called read");
        assert!(!output.is_error);
    }

    #[tokio::test]
    async fn same_local_name_reaches_each_provider() {
        let registry = ProviderRegistry::new();
        registry
            .register_client(connected_client("files", answering_provider(&["read"], "from files")).await)
            .await
            .unwrap();
        registry
            .register_client(connected_client("web", answering_provider(&["read"], "from web")).await)
            .await
            .unwrap();

        let files = registry.invoke("files__read", json!({})).await.unwrap();
        let web = registry.invoke("web__read", json!({})).await.unwrap();
        assert_eq!(files.text, "from files read");
        assert_eq!(web.text, "from web read");
    }

    #[tokio::test]
    async fn colliding_qualified_name_keeps_first_owner() {
        let registry = ProviderRegistry::new();
        registry
            .register_client(connected_client("a", answering_provider(&["_x"], "from a")).await)
            .await
            .unwrap();
        let second = registry
            .register_client(connected_client("a_", answering_provider(&["x", "y"], "from a_")).await)
            .await
            .unwrap();

        let second_names: Vec<&str> = second.iter().map(|c| c.qualified_name.as_str()).collect();
        assert_eq!(second_names, vec!["a___y"]);

        let names: Vec<String> = registry
            .list_capabilities()
            .await
            .into_iter()
            .map(|c| c.qualified_name)
            .collect();
        assert_eq!(names, vec!["a___x", "a___y"]);
        assert_eq!(
            registry.invoke("a___x", json!({})).await.unwrap().text,
            "from a _x"
        );

        // Dropping the second provider must not take the first one's route with it.
        registry
            .register_client(connected_client("a_", answering_provider(&[], "from a_")).await)
            .await
            .unwrap();
        assert_eq!(
            registry.invoke("a___x", json!({})).await.unwrap().text,
            "from a _x"
        );
    }

    #[tokio::test]
    async fn unknown_capability_is_rejected() {
        let registry = ProviderRegistry::new();
        let err = registry.invoke("nobody__nothing", json!({})).await.unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCapability(name) if name == "nobody__nothing"));
    }

    #[tokio::test]
    async fn duplicate_local_names_are_skipped() {
        let registry = ProviderRegistry::new();
        let capabilities = registry
            .register_client(connected_client("dup", tool_provider(&["a", "a", "b"])).await)
            .await
            .unwrap();
        assert_eq!(capabilities.len(), 2);
    }

    #[tokio::test]
    async fn reregistration_replaces_previous_client() {
        let registry = ProviderRegistry::new();
        let first = connected_client("files", tool_provider(&["old"])).await;
        registry.register_client(Arc::clone(&first)).await.unwrap();

        registry
            .register_client(connected_client("files", tool_provider(&["new"])).await)
            .await
            .unwrap();

        assert!(!first.is_connected());
        let status = registry.status().await;
        assert_eq!(status.len(), 1);
        assert!(status["files"].connected);
        assert!(matches!(
            registry.invoke("files__old", json!({})).await,
            Err(RegistryError::UnknownCapability(_))
        ));
        assert!(registry.invoke("files__new", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn failed_spawn_leaves_no_registration() {
        let registry = ProviderRegistry::new();
        let err = registry
            .register_provider(ProviderSpec::new("ghost", "/nonexistent/toolbridge-test-provider"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::RegistrationFailed { ref provider, .. } if provider == "ghost"));
        assert!(registry.status().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_provider_name_is_rejected() {
        let registry = ProviderRegistry::new();
        let err = registry
            .register_provider(ProviderSpec::new("bad__name", "node"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidProvider(_)));
    }

    #[tokio::test]
    async fn failed_discovery_disconnects_client() {
        let registry = ProviderRegistry::new();
        let mut tools = tool_provider(&[]);
        let client = connected_client("broken", move |message| {
            match message.get("method").and_then(|m| m.as_str()) {
                Some("tools/list") => Reply::Error {
                    code: -32603,
                    message: "no tools today".to_string(),
                },
                _ => tools(message),
            }
        })
        .await;

        let err = registry.register_client(Arc::clone(&client)).await.unwrap_err();
        assert!(matches!(err, RegistryError::RegistrationFailed { .. }));
        assert!(!client.is_connected());
        assert!(registry.status().await.is_empty());
    }

    #[tokio::test]
    async fn dead_provider_reports_not_connected() {
        let registry = ProviderRegistry::new();
        let mut tools = tool_provider(&["boom"]);
        let client = connected_client("fragile", move |message| {
            match message.get("method").and_then(|m| m.as_str()) {
                Some("tools/call") => Reply::Hangup,
                _ => tools(message),
            }
        })
        .await;
        registry.register_client(client).await.unwrap();

        let first = registry.invoke("fragile__boom", json!({})).await.unwrap_err();
        assert!(matches!(first, RegistryError::ProviderNotConnected(ref p) if p == "fragile"));
        let second = registry.invoke("fragile__boom", json!({})).await.unwrap_err();
        assert!(matches!(second, RegistryError::ProviderNotConnected(_)));
        assert!(!registry.status().await["fragile"].connected);
    }

    #[tokio::test]
    async fn timeout_names_provider_and_method() {
        let registry = ProviderRegistry::new();
        let mut tools = tool_provider(&["sleep"]);
        let client = connected_client("slow", move |message| {
            match message.get("method").and_then(|m| m.as_str()) {
                Some("tools/call") => Reply::Ignore,
                _ => tools(message),
            }
        })
        .await;
        registry.register_client(client).await.unwrap();

        let err = registry.invoke("slow__sleep", json!({})).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            RegistryError::Timeout { ref provider, ref method } if provider == "slow" && method == "tools/call"
        ));
    }

    #[tokio::test]
    async fn teardown_all_disconnects_and_clears() {
        let registry = ProviderRegistry::new();
        let client = connected_client("files", tool_provider(&["read"])).await;
        registry.register_client(Arc::clone(&client)).await.unwrap();

        registry.teardown_all().await;
        assert!(!client.is_connected());
        assert!(registry.status().await.is_empty());
        assert!(registry.list_capabilities().await.is_empty());

        registry.teardown_all().await;
    }

    #[test]
    fn output_joins_text_blocks() {
        let output = to_output(json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "image", "data": "..."},
                {"type": "text", "text": "second"}
            ],
            "isError": true
        }));
        assert_eq!(output.text, "first\nsecond");
        assert!(output.is_error);
    }

    #[test]
    fn output_falls_back_to_structured_content() {
        let output = to_output(json!({"content": [], "structuredContent": {"temp": 21}}));
        assert_eq!(output.text, r#"{"temp":21}"#);
        assert!(!output.is_error);
        assert_eq!(output.raw["structuredContent"]["temp"], 21);
    }
}
