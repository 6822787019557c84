use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Pipeline configuration
///
/// Loaded with the following priority (highest to lowest):
/// 1. Environment variables with FOODLOG__ prefix
/// 2. config.toml file in current directory
/// 3. Default values
///
/// Environment variable format: FOODLOG__USDA__API_KEY
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Open Food Facts (community-maintained, no credential)
    #[serde(default)]
    pub open_food_facts: OpenFoodFactsSettings,
    /// USDA FoodData Central (curated, credential-gated)
    #[serde(default)]
    pub usda: UsdaSettings,
    /// Per-provider request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            open_food_facts: OpenFoodFactsSettings::default(),
            usda: UsdaSettings::default(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenFoodFactsSettings {
    #[serde(default = "default_off_base_url")]
    pub base_url: String,
}

impl Default for OpenFoodFactsSettings {
    fn default() -> Self {
        OpenFoodFactsSettings {
            base_url: default_off_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsdaSettings {
    /// API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>).
    /// When absent the USDA adapter is disabled and contributes no results.
    pub api_key: Option<String>,
    #[serde(default = "default_usda_base_url")]
    pub base_url: String,
}

impl Default for UsdaSettings {
    fn default() -> Self {
        UsdaSettings {
            api_key: None,
            base_url: default_usda_base_url(),
        }
    }
}

fn default_off_base_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}

fn default_usda_base_url() -> String {
    "https://api.nal.usda.gov/fdc/v1".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}

impl IngestConfig {
    /// Load configuration from file and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: FOODLOG__USDA__API_KEY
            .add_source(
                Environment::with_prefix("FOODLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: IngestConfig = settings.try_deserialize()?;

        // Conventional fallback used by deployments that only export the
        // bare USDA key
        if config.usda.api_key.is_none() {
            config.usda.api_key = std::env::var("USDA_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = IngestConfig::default();
        assert_eq!(
            config.open_food_facts.base_url,
            "https://world.openfoodfacts.org"
        );
        assert_eq!(config.usda.base_url, "https://api.nal.usda.gov/fdc/v1");
        assert!(config.usda.api_key.is_none());
        assert_eq!(config.provider_timeout_secs, 10);
    }
}
