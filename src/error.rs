use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiError {
    #[error("Upstream board API error: {0}")]
    Upstream(String),

    #[error("No board data returned")]
    NoData,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "monday")]
    #[error("Board API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, BiError>;
