use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const VAULT_ENV_VAR: &str = "VAULTKEEPER_VAULT";

pub const SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DASHBOARD_FILE_NAME: &str = "Dashboard.md";
pub const HANDBOOK_FILE_NAME: &str = "Company_Handbook.md";

/// Every on-disk location the pipeline touches, derived once from the vault
/// root and passed explicitly to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    pub root: PathBuf,
    pub inbox: PathBuf,
    pub needs_action: PathBuf,
    pub done: PathBuf,
    pub plans: PathBuf,
    pub pending_approval: PathBuf,
    pub logs: PathBuf,
    pub dashboard: PathBuf,
    pub handbook: PathBuf,
    pub settings: PathBuf,
}

impl VaultPaths {
    pub fn from_vault_root(vault_root: &Path) -> Self {
        Self {
            root: vault_root.to_path_buf(),
            inbox: vault_root.join("Inbox"),
            needs_action: vault_root.join("Needs_Action"),
            done: vault_root.join("Done"),
            plans: vault_root.join("Plans"),
            pending_approval: vault_root.join("Pending_Approval"),
            logs: vault_root.join("Logs"),
            dashboard: vault_root.join(DASHBOARD_FILE_NAME),
            handbook: vault_root.join(HANDBOOK_FILE_NAME),
            settings: vault_root.join(SETTINGS_FILE_NAME),
        }
    }

    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        for dir in [
            &self.inbox,
            &self.needs_action,
            &self.done,
            &self.plans,
            &self.pending_approval,
            &self.logs,
        ] {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Vault root resolution order: explicit flag value, then the environment
/// variable, then the current directory.
pub fn resolve_vault_root(flag: Option<&str>) -> PathBuf {
    if let Some(dir) = flag {
        return PathBuf::from(dir);
    }
    if let Some(dir) = std::env::var_os(VAULT_ENV_VAR) {
        return PathBuf::from(dir);
    }
    PathBuf::from(".")
}
