//! Chat configuration from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};
use toolbridge_application::ExecutionParams;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Default system prompt when a request carries none
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    /// Sampling temperature, 0.0 to 2.0
    pub temperature: Option<f32>,
    /// Tool rounds per request, capped at 5
    pub max_tool_rounds: Option<usize>,
}

impl FileChatConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        let params = ExecutionParams::default()
            .with_system_prompt(self.system_prompt.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        match self.max_tool_rounds {
            Some(rounds) => params.with_max_tool_rounds(rounds),
            None => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_execution_params() {
        let config: FileChatConfig = toml::from_str(
            r#"
system_prompt = "Be brief."
max_tokens = 512
max_tool_rounds = 12
"#,
        )
        .unwrap();

        let params = config.to_execution_params();
        assert_eq!(params.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(params.max_tokens, Some(512));
        assert_eq!(params.temperature, None);
        assert_eq!(params.max_tool_rounds, 5);
    }
}
