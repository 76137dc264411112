use std::io;

/// Animated thumbnail errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] image::error::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A resource that can't back a frame cursor, ie. no frames or
    /// frames of differing sizes
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("generic error: {0}")]
    Generic(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
