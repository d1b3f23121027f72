use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("invalid API url {0:?}: expected http:// or https://")]
    InvalidUrl(String),
    #[error("config file {path}: {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },
    #[error("submission task failed: {0}")]
    Task(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Core(#[from] facelens_core::CoreError),
}

impl ClientError {
    /// The HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status(code) => Some(*code),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
