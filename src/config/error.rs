#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to create vault path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read settings {path}: {source}")]
    ReadSettings {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    ParseSettings {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
