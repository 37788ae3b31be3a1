use thiserror::Error;

/// Why a video id could not be turned into a recipe.
#[derive(Error, Debug)]
pub enum VideoLookupError {
    #[error("no video exists with that id")]
    NotFound,

    #[error("video belongs to channel {channel:?}, not the expected one")]
    WrongChannel { channel: String },

    #[error("video description has no ingredients section")]
    MissingIngredients,

    #[error("YouTube rejected the API key (status {status})")]
    InvalidApiKey { status: reqwest::StatusCode },

    #[error("YouTube API request failed with status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("send request to YouTube API")]
    Http(#[source] reqwest::Error),

    #[error("parse YouTube videos API response as JSON")]
    Decode(#[source] reqwest::Error),
}

impl VideoLookupError {
    /// Whether asking the user for another id could help.
    ///
    /// A rejected API key fails every lookup the same way, so it is the only
    /// kind that is not worth another prompt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidApiKey { .. })
    }

    /// Whether the id resolved fine but the video is not a usable recipe.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::WrongChannel { .. } | Self::MissingIngredients
        )
    }
}
