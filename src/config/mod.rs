pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::load_settings;
pub use paths::{resolve_vault_root, VaultPaths, VAULT_ENV_VAR};
pub use settings::Settings;
