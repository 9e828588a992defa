use thiserror::Error;

mod youtube;
pub use youtube::*;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Link does not match a supported video url")]
    UnsupportedUrl,

    #[error("Link type is supported but the video was not found")]
    NotFound,

    #[error("Failed to fetch video metadata: {0}")]
    FetchError(String),

    #[error("Failed to parse video metadata: {0}")]
    ParseError(String),
}

/// Display metadata resolved for a submitted link
#[derive(Debug, Clone)]
pub struct Metadata {
    pub title: String,
    /// Second largest thumbnail candidate, used in lists
    pub small_thumbnail: Option<String>,
    /// Largest thumbnail candidate, used for the player
    pub big_thumbnail: Option<String>,
}
