use serde::{Deserialize, Serialize};

pub const DEFAULT_PROCESSOR_NAME: &str = "vaultkeeper autonomous loop";
pub const DEFAULT_REASONER_TIMEOUT_SECS: u64 = 120;

/// Optional vault-level settings loaded from `config.yaml`. Every field has a
/// default so an absent file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_processor_name")]
    pub processor_name: String,
    /// External CLI invoked for task reasoning. When unset, the deterministic
    /// fallback summary is used directly.
    #[serde(default)]
    pub reasoner_command: Option<String>,
    #[serde(default = "default_reasoner_timeout_secs")]
    pub reasoner_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            processor_name: default_processor_name(),
            reasoner_command: None,
            reasoner_timeout_secs: default_reasoner_timeout_secs(),
        }
    }
}

fn default_processor_name() -> String {
    DEFAULT_PROCESSOR_NAME.to_string()
}

fn default_reasoner_timeout_secs() -> u64 {
    DEFAULT_REASONER_TIMEOUT_SECS
}
