use thiserror::Error;

/// Errors raised by the simulation core and its loaders.
///
/// Crashes and off-screen drift are normal game outcomes and are reported
/// through rewards and step events, never through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The input action vector was not a one-hot `[noop, flap]` pair.
    #[error("invalid input actions {0:?}: expected exactly one of [noop, flap] set")]
    InvalidInput(Vec<u8>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid sprite: {0}")]
    Sprite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
