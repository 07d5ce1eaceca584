use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use atom_core::{Error, Result};

/// Provider catalogue read from `providers.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub providers: Vec<ProviderDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub name: String,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub id: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ProviderConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("Failed to read provider config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse provider config: {}", e)))
    }

    /// First model declared for a provider.
    pub fn first_model(&self, provider: &str) -> Option<&ModelDefinition> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(provider))
            .and_then(|p| p.models.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_lookup() {
        let path = std::env::temp_dir().join(format!("atom-providers-{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"providers":[{"name":"OpenAI","models":[{"id":"gpt-4o-mini","max_tokens":512}]}]}"#,
        )
        .await
        .unwrap();

        let config = ProviderConfig::load(&path).await.unwrap();
        let model = config.first_model("openai").unwrap();
        assert_eq!(model.id, "gpt-4o-mini");
        assert_eq!(model.max_tokens, Some(512));
        assert!(config.first_model("anthropic").is_none());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = ProviderConfig::load("/nonexistent/providers.json").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
