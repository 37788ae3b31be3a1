//! YouTube Data API v3 client library.
//!
//! Only the small read-only slice of the API needed to look up a public video
//! by id is covered: `videos.list` with `part=snippet`, authenticated with a
//! developer API key.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use dish_calories::config::Config;
//! use dish_calories::youtube_api::YouTubeClient;
//!
//! # async fn example() -> eyre::Result<()> {
//! let config = Config::from_env();
//! let client = YouTubeClient::new(&config, reqwest::Client::new());
//!
//! let recipe = client.resolve("d4oqFQqFUfs").await?;
//! println!("{}: {}", recipe.title, recipe.ingredients);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod errors;
pub mod videos;

pub use client::YouTubeClient;
pub use errors::VideoLookupError;
pub use videos::{Video, VideoListResponse, VideoSnippet};
