use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectError>;

#[derive(Error, Debug)]
pub enum SelectError {
    /// The request never produced an HTTP response (DNS, connect, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Http { status: u16, body: String },

    /// The body could not be turned into options.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The fetch was superseded or explicitly cancelled. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl SelectError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SelectError::Cancelled)
    }
}
