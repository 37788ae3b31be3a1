//! Credentials and endpoints for the three upstream APIs.

/// Production YouTube Data API v3 base URL.
pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Production Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Production Nutritionix API base URL.
pub const NUTRITIONIX_API_BASE_URL: &str = "https://trackapi.nutritionix.com";

/// The generation model used to clean up ingredient lists.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Only videos published by this channel are accepted.
pub const EXPECTED_CHANNEL_TITLE: &str = "Food Fusion";

/// Everything the API clients need to talk to their services.
///
/// Credentials are not validated. A missing key shows up later as an
/// authentication failure from whichever API needed it.
#[derive(Clone)]
pub struct Config {
    pub youtube_api_key: String,
    pub gemini_api_key: String,
    pub nutritionix_app_id: String,
    pub nutritionix_app_key: String,
    pub youtube_base_url: String,
    pub gemini_base_url: String,
    pub nutritionix_base_url: String,
    pub gemini_model: String,
    pub expected_channel: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |name: &str| {
            lookup(name).unwrap_or_else(|| {
                tracing::warn!(variable = name, "credential is not set");
                String::new()
            })
        };
        let or_default = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            youtube_api_key: credential("YOUTUBE_API_KEY"),
            gemini_api_key: credential("GEMINI_API_KEY"),
            nutritionix_app_id: credential("NUTRITIONIX_ID"),
            nutritionix_app_key: credential("NUTRITIONIX_API_KEY"),
            youtube_base_url: or_default("YOUTUBE_API_BASE_URL", YOUTUBE_API_BASE_URL),
            gemini_base_url: or_default("GEMINI_API_BASE_URL", GEMINI_API_BASE_URL),
            nutritionix_base_url: or_default("NUTRITIONIX_API_BASE_URL", NUTRITIONIX_API_BASE_URL),
            gemini_model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            expected_channel: EXPECTED_CHANNEL_TITLE.to_string(),
        }
    }

    /// A configuration that sends every request to `base_url`.
    ///
    /// Meant for pointing all clients at a single mock server.
    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: &str) -> Self {
        Self {
            youtube_api_key: "yt-key".to_string(),
            gemini_api_key: "gemini-key".to_string(),
            nutritionix_app_id: "nx-id".to_string(),
            nutritionix_app_key: "nx-key".to_string(),
            youtube_base_url: base_url.to_string(),
            gemini_base_url: base_url.to_string(),
            nutritionix_base_url: base_url.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            expected_channel: EXPECTED_CHANNEL_TITLE.to_string(),
        }
    }
}

// Keep credentials out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("youtube_base_url", &self.youtube_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("nutritionix_base_url", &self.nutritionix_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("expected_channel", &self.expected_channel)
            .finish_non_exhaustive()
    }
}
