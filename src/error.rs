use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemologError {
    #[error("missing API key: set {0}")]
    MissingApiKey(String),
    #[error("config invalid: {0}")]
    InvalidConfig(String),
}
