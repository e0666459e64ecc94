/// Crate-wide result alias.
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors surfaced by gallery components.
///
/// Most failures inside the discovery and render loop are resolved locally (a missing format, a
/// page that fails to mount) and never reach callers as a `GalleryError`. The variants here cover
/// the boundaries where an error does escape: config loading, capability implementations, and
/// explicit API misuse.
#[derive(thiserror::Error, Debug)]
pub enum GalleryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GalleryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
