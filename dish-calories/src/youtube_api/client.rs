//! Core YouTube API client functionality.

use crate::config::Config;
use crate::recipe::{VideoMetadata, extract_ingredients};
use crate::youtube_api::errors::VideoLookupError;
use crate::youtube_api::videos::{Video, VideoListResponse};
use http::Method;
use tracing::instrument;

/// Client for the public parts of the YouTube Data API v3.
///
/// Requests are authenticated with a plain API key rather than OAuth, which is
/// all that is needed to read public video metadata.
#[derive(Clone)]
pub struct YouTubeClient {
    /// The developer key sent as the `key` query parameter.
    api_key: String,
    /// API root, e.g. `https://www.googleapis.com/youtube/v3`.
    base_url: String,
    /// Channel title a video must have to be accepted.
    expected_channel: String,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("expected_channel", &self.expected_channel)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a new YouTube API client from the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the API key, base URL and the accepted channel title
    /// * `client` - Shared HTTP client for making API requests
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            api_key: config.youtube_api_key.clone(),
            base_url: config.youtube_base_url.trim_end_matches('/').to_string(),
            expected_channel: config.expected_channel.clone(),
            client,
        }
    }

    /// Makes a key-authenticated HTTP request to the YouTube API with common error handling.
    ///
    /// Status codes that indicate a bad key (400, 401, 403) are reported as
    /// [`VideoLookupError::InvalidApiKey`]; any other failure status is reported
    /// with the response body attached.
    #[instrument(skip(self, query_params), level = tracing::Level::TRACE)]
    async fn make_request(
        &self,
        method: Method,
        path: &str,
        query_params: &[(&str, &str)],
    ) -> Result<reqwest::Response, VideoLookupError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .request(method, &url)
            .query(query_params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            // the URL carries the API key
            .map_err(|e| VideoLookupError::Http(e.without_url()))?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(response),
            reqwest::StatusCode::BAD_REQUEST
            | reqwest::StatusCode::UNAUTHORIZED
            | reqwest::StatusCode::FORBIDDEN => {
                tracing::warn!(%status, "YouTube API key invalid or insufficient permissions");
                Err(VideoLookupError::InvalidApiKey { status })
            }
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(VideoLookupError::Api { status, body })
            }
        }
    }

    /// Gets the snippet of a single YouTube video by its ID.
    ///
    /// Uses the `videos.list` API with `part=snippet`. The first returned item is
    /// taken as authoritative.
    ///
    /// # Returns
    ///
    /// The [`Video`] resource, or [`VideoLookupError::NotFound`] if YouTube
    /// returned no items for the id.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn get_video_snippet(&self, video_id: &str) -> Result<Video, VideoLookupError> {
        let query_params = [("part", "snippet"), ("id", video_id)];

        let response = self.make_request(Method::GET, "videos", &query_params).await?;

        let videos: VideoListResponse = response
            .json()
            .await
            .map_err(|e| VideoLookupError::Decode(e.without_url()))?;

        tracing::debug!(
            video_id,
            returned_items = videos.items.len(),
            "fetched video snippet"
        );

        videos
            .items
            .into_iter()
            .next()
            .ok_or(VideoLookupError::NotFound)
    }

    /// Resolves a video id to the recipe it shows.
    ///
    /// Only videos from the expected channel are accepted; anything else is
    /// [`VideoLookupError::WrongChannel`]. The ingredients are the raw text of the
    /// description's ingredients section.
    #[instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> Result<VideoMetadata, VideoLookupError> {
        let video = self.get_video_snippet(video_id).await?;
        let snippet = video.snippet;

        if snippet.channel_title != self.expected_channel {
            tracing::debug!(channel = snippet.channel_title, "rejecting video from other channel");
            return Err(VideoLookupError::WrongChannel {
                channel: snippet.channel_title,
            });
        }

        let ingredients = extract_ingredients(&snippet.description)
            .ok_or(VideoLookupError::MissingIngredients)?
            .to_string();

        Ok(VideoMetadata {
            title: snippet.title,
            ingredients,
        })
    }
}
