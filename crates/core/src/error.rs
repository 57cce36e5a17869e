use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("People API returned {status}: {body}")]
    RemoteApi { status: u16, body: Value },
    #[error("unexpected response shape: {0}")]
    OutputShape(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid tool schema: {0}")]
    Schema(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl Error {
    /// Stable tag used in structured error results.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::RemoteApi { .. } => "remote_api",
            Error::OutputShape(_) => "output_shape",
            Error::Decode(_) => "decode",
            Error::Http(_) => "http",
            Error::Schema(_) => "schema",
            Error::UnknownTool(_) => "unknown_tool",
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
