//! Estimates the calories in a dish from a Food Fusion recipe video.
//!
//! The ingredients section of the video's description is cleaned up by Gemini
//! and then priced in calories by Nutritionix.

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::nutrition::NutritionixClient;
use crate::recipe::VideoMetadata;
use crate::youtube_api::{VideoLookupError, YouTubeClient};
use eyre::Context;
use std::io::{BufRead, Write};

pub mod config;
pub mod gemini;
pub mod nutrition;
pub mod recipe;
pub mod youtube_api;

const INTRODUCTION: &str = "This application finds out the total calories in a dish from the \
    youtube channel Food Fusion (@FoodfusionPk).\n\
    You need to enter the id of the chosen video, which can be found in the address bar \
    after v= (example id: d4oqFQqFUfs)";

const PROMPT: &str = "Please enter id of the food fusion video: ";

/// The final answer for one dish.
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieReport {
    pub title: String,
    pub total_calories: f64,
}

impl std::fmt::Display for CalorieReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug formatting keeps the trailing `.0` on whole numbers.
        write!(
            f,
            "Total calories in the {} is {:?}",
            self.title, self.total_calories
        )
    }
}

/// Asks for video ids on `input` until one resolves to a Food Fusion recipe.
///
/// Ids that do not exist, belong to another channel or have no ingredients
/// section lead to another prompt, as do lines that are not UTF-8 and transient
/// API failures. A rejected API key or the end of `input` ends the loop with an
/// error.
pub async fn prompt_for_video<R, W>(
    youtube: &YouTubeClient,
    input: &mut R,
    output: &mut W,
) -> eyre::Result<VideoMetadata>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{INTRODUCTION}").context("write introduction")?;

    loop {
        write!(output, "{PROMPT}").context("write prompt")?;
        output.flush().context("flush prompt")?;

        let mut line = Vec::new();
        let read = input.read_until(b'\n', &mut line).context("read video id")?;
        if read == 0 {
            eyre::bail!("input ended before a valid video id was entered");
        }
        let Ok(line) = String::from_utf8(line) else {
            writeln!(output, "That is not a valid video id").context("write invalid id")?;
            continue;
        };
        let video_id = line.trim();
        if video_id.is_empty() {
            continue;
        }

        let err = match youtube.resolve(video_id).await {
            Ok(video) => return Ok(video),
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(eyre::Report::new(err)).wrap_err("look up video on YouTube");
        }

        let message = if err.is_rejection() {
            match &err {
                VideoLookupError::WrongChannel { .. } => {
                    "Id does not belong to food fusion".to_string()
                }
                VideoLookupError::NotFound => format!("No video found with id {video_id}"),
                _ => "That video has no ingredients list in its description".to_string(),
            }
        } else {
            tracing::warn!(
                video_id,
                error = &err as &(dyn std::error::Error + 'static),
                "video lookup failed"
            );
            format!("Could not look up the video: {err}")
        };
        writeln!(output, "{message}").context("write lookup failure")?;
    }
}

/// The three API clients, wired up from one [`Config`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub youtube: YouTubeClient,
    pub gemini: GeminiClient,
    pub nutritionix: NutritionixClient,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();
        Self {
            youtube: YouTubeClient::new(config, client.clone()),
            gemini: GeminiClient::new(config, client.clone()),
            nutritionix: NutritionixClient::new(config, client),
        }
    }

    /// Prompts for a video, then sanitizes its ingredients and totals their calories.
    pub async fn run<R, W>(&self, input: &mut R, output: &mut W) -> eyre::Result<CalorieReport>
    where
        R: BufRead,
        W: Write,
    {
        let video = prompt_for_video(&self.youtube, input, output).await?;
        tracing::info!(title = video.title, "found recipe video");
        tracing::debug!(raw = video.ingredients, "raw ingredients");

        let sanitized = self.gemini.sanitize_structured(&video.ingredients).await?;
        let query = sanitized.to_query();
        tracing::debug!(query, "sanitized ingredients");

        let total_calories = self
            .nutritionix
            .fetch_calories(&query)
            .await
            .context("total calories")?;

        Ok(CalorieReport {
            title: video.title,
            total_calories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn video_list(id: &str, channel: &str, description: &str) -> String {
        json!({
            "kind": "youtube#videoListResponse",
            "items": [{
                "id": id,
                "snippet": {
                    "publishedAt": "2023-11-20T09:00:00Z",
                    "channelId": "UCM0d",
                    "title": "Chicken Karahi",
                    "description": description,
                    "channelTitle": channel
                }
            }],
            "pageInfo": { "totalResults": 1, "resultsPerPage": 1 }
        })
        .to_string()
    }

    async fn mock_video(server: &mut mockito::ServerGuard, id: &str, body: String) -> mockito::Mock {
        server
            .mock("GET", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), id.into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    #[test]
    fn report_line() {
        let report = CalorieReport {
            title: "Chicken Karahi".to_string(),
            total_calories: 200.0,
        };
        assert_eq!(report.to_string(), "Total calories in the Chicken Karahi is 200.0");

        let report = CalorieReport {
            title: "Daal".to_string(),
            total_calories: 598.34,
        };
        assert_eq!(report.to_string(), "Total calories in the Daal is 598.34");
    }

    #[tokio::test]
    async fn reprompts_until_a_food_fusion_video() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_video(
            &mut server,
            "other",
            video_list("other", "Other Kitchen", "Ingredients x Directions y"),
        )
        .await;
        let _mock = mock_video(
            &mut server,
            "missing",
            r#"{"kind":"youtube#videoListResponse","items":[]}"#.to_string(),
        )
        .await;
        let _mock = mock_video(
            &mut server,
            "good",
            video_list("good", "Food Fusion", "Ingredients 1 egg Directions fry"),
        )
        .await;

        let youtube =
            YouTubeClient::new(&Config::with_base_url(&server.url()), reqwest::Client::new());
        let mut input = "other\n\nmissing\ngood\n".as_bytes();
        let mut output = Vec::new();

        let video = prompt_for_video(&youtube, &mut input, &mut output).await.unwrap();

        assert_eq!(video.ingredients, " 1 egg ");
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Id does not belong to food fusion"), "{output}");
        assert!(output.contains("No video found with id missing"), "{output}");
        assert_eq!(output.matches(PROMPT).count(), 4);
    }

    #[tokio::test]
    async fn undecodable_line_is_reprompted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_video(
            &mut server,
            "good",
            video_list("good", "Food Fusion", "Ingredients 1 egg Directions fry"),
        )
        .await;

        let youtube =
            YouTubeClient::new(&Config::with_base_url(&server.url()), reqwest::Client::new());
        let mut input: &[u8] = b"\xff\xfe\ngood\n";
        let mut output = Vec::new();

        let video = prompt_for_video(&youtube, &mut input, &mut output).await.unwrap();

        assert_eq!(video.ingredients, " 1 egg ");
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("That is not a valid video id"), "{output}");
        assert_eq!(output.matches(PROMPT).count(), 2);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "flaky".into()))
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;
        let _mock = mock_video(
            &mut server,
            "good",
            video_list("good", "Food Fusion", "Ingredients salt Directions"),
        )
        .await;

        let youtube =
            YouTubeClient::new(&Config::with_base_url(&server.url()), reqwest::Client::new());
        let mut input = "flaky\ngood\n".as_bytes();
        let mut output = Vec::new();

        let video = prompt_for_video(&youtube, &mut input, &mut output).await.unwrap();
        assert_eq!(video.title, "Chicken Karahi");
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Could not look up the video"), "{output}");
    }

    #[tokio::test]
    async fn invalid_key_stops_prompting() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403}}"#)
            .expect(1)
            .create_async()
            .await;

        let youtube =
            YouTubeClient::new(&Config::with_base_url(&server.url()), reqwest::Client::new());
        let mut input = "a\nb\n".as_bytes();
        let mut output = Vec::new();

        let err = prompt_for_video(&youtube, &mut input, &mut output)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<VideoLookupError>(),
                Some(VideoLookupError::InvalidApiKey { .. })
            ),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn end_of_input_is_an_error() {
        let server = mockito::Server::new_async().await;
        let youtube =
            YouTubeClient::new(&Config::with_base_url(&server.url()), reqwest::Client::new());
        let mut input = "\n".as_bytes();
        let mut output = Vec::new();

        let err = prompt_for_video(&youtube, &mut input, &mut output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("input ended"), "{err}");
    }

    #[tokio::test]
    async fn full_pipeline() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_video(
            &mut server,
            "d4oqFQqFUfs",
            video_list(
                "d4oqFQqFUfs",
                "Food Fusion",
                "Ingredients\n-Chawal (Rice) 1 cup\n-Oil 2 tbs\n-Namak (Salt) to taste\nDirections\n-Boil",
            ),
        )
        .await;
        let gemini = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "gemini-key")
            .match_body(Matcher::Regex("Chawal".to_string()))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": r#"[{"quantity":"1","unit":"cup","ingredient":"rice"},{"quantity":"2","unit":"tbs","ingredient":"oil"}]"# }]
                        },
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let nutritionix = server
            .mock("POST", "/v2/natural/nutrients")
            .match_body(Matcher::Json(json!({ "query": "1 cup rice and 2 tbsp oil" })))
            .with_status(200)
            .with_body(
                json!({
                    "foods": [
                        { "food_name": "rice", "serving_qty": 1, "serving_unit": "cup", "nf_calories": 205.4 },
                        { "food_name": "oil", "serving_qty": 2, "serving_unit": "tbsp", "nf_calories": 238.68 }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let pipeline = Pipeline::new(&Config::with_base_url(&server.url()));
        let mut input = "d4oqFQqFUfs\n".as_bytes();
        let mut output = Vec::new();

        let report = pipeline.run(&mut input, &mut output).await.unwrap();

        gemini.assert_async().await;
        nutritionix.assert_async().await;
        assert_eq!(
            report,
            CalorieReport {
                title: "Chicken Karahi".to_string(),
                total_calories: 444.08,
            }
        );
    }

    #[tokio::test]
    async fn sanitizer_failure_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_video(
            &mut server,
            "good",
            video_list("good", "Food Fusion", "Ingredients 1 egg Directions fry"),
        )
        .await;
        let _mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;
        let nutritionix = server
            .mock("POST", "/v2/natural/nutrients")
            .expect(0)
            .create_async()
            .await;

        let pipeline = Pipeline::new(&Config::with_base_url(&server.url()));
        let mut input = "good\n".as_bytes();
        let mut output = Vec::new();

        assert!(pipeline.run(&mut input, &mut output).await.is_err());
        nutritionix.assert_async().await;
    }
}
