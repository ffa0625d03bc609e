use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid color {input:?}: expected six hex digits, optionally prefixed with '#'")]
    InvalidColor { input: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn invalid_config(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}
