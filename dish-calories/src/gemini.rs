//! Cleaning up a recipe's ingredient list with the Gemini API.
//!
//! Video descriptions list ingredients in whatever shape the author liked:
//! bilingual lines, units after names, `tbs` for tablespoons. Nutritionix wants
//! something closer to `2 tbsp cooking oil and 1 tsp salt`, so the raw section is
//! handed to a generation model together with fixed instructions.

use crate::config::Config;
use eyre::Context;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Separator Nutritionix understands between foods in a natural-language query.
pub const QUERY_SEPARATOR: &str = " and ";

/// The instructions wrapped around the raw ingredients text.
pub fn sanitize_prompt(raw_ingredients: &str) -> String {
    format!(
        "Extract the english part of the ingredients and their amount. \
         Bring the quantity before the ingredient. Correct the tbs to tbsp. \
         I want the ingredients to be seperated by ' and '. \
         Ignore any food that doesn't have quantity. \
         An example of this is; '2 tbsp cooking oil and 1 tbsp Ginger garlic paste'  \
         \n ------ {raw_ingredients} \n ------"
    )
}

/// Request body for `models.generateContent`.
///
/// See: <https://ai.google.dev/api/generate-content#method:-models.generatecontent>
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A single turn of conversation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One piece of a [`Content`]. Only text parts are used here.
#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

/// Response body of `models.generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// One cleaned-up ingredient as returned by the structured prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedIngredient {
    pub quantity: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub ingredient: String,
}

impl SanitizedIngredient {
    /// Renders the entry the way Nutritionix expects it, e.g. `2 tbsp cooking oil`.
    pub fn to_phrase(&self) -> String {
        let unit = self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let unit = match unit {
            Some(u) if u.eq_ignore_ascii_case("tbs") => Some("tbsp"),
            u => u,
        };
        [Some(self.quantity.trim()), unit, Some(self.ingredient.trim())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The cleaned ingredient list, either as structured entries or as the
/// model's free text when it did not follow the requested schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizedIngredients {
    Structured(Vec<SanitizedIngredient>),
    Verbatim(String),
}

impl SanitizedIngredients {
    /// The Nutritionix query for this ingredient list.
    pub fn to_query(&self) -> String {
        match self {
            Self::Structured(ingredients) => to_query(ingredients),
            Self::Verbatim(text) => text.trim().to_string(),
        }
    }
}

/// Joins ingredients into a single natural-language query.
pub fn to_query(ingredients: &[SanitizedIngredient]) -> String {
    ingredients
        .iter()
        .map(SanitizedIngredient::to_phrase)
        .collect::<Vec<_>>()
        .join(QUERY_SEPARATOR)
}

/// JSON schema for the structured ingredient list, in Gemini's OpenAPI subset.
fn ingredient_list_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "quantity": { "type": "STRING" },
                "unit": { "type": "STRING", "nullable": true },
                "ingredient": { "type": "STRING" }
            },
            "required": ["quantity", "ingredient"],
            "propertyOrdering": ["quantity", "unit", "ingredient"]
        }
    })
}

/// Decodes a structured reply, dropping entries without a quantity.
///
/// Models occasionally wrap JSON in a markdown code fence even when asked for
/// `application/json`, so a surrounding fence is tolerated.
pub fn parse_structured(text: &str) -> serde_json::Result<Vec<SanitizedIngredient>> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let mut ingredients: Vec<SanitizedIngredient> = serde_json::from_str(unfenced)?;
    ingredients.retain(|i| !i.quantity.trim().is_empty() && !i.ingredient.trim().is_empty());
    Ok(ingredients)
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            client,
        }
    }

    /// Sends a single-turn prompt and returns the reply text.
    #[instrument(skip(self, request), fields(model = %self.model))]
    pub async fn generate_content(&self, request: &GenerateContentRequest) -> eyre::Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .with_context(|| format!("send request to Gemini API: {url}"))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            eyre::bail!(
                "Gemini API request failed with status {}: {}",
                status_code,
                error_text
            );
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .context("parse Gemini API response as JSON")?;

        let finish_reason = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref());
        tracing::debug!(
            candidates = response.candidates.len(),
            ?finish_reason,
            "received Gemini reply"
        );

        response
            .text()
            .ok_or_else(|| eyre::eyre!("Gemini reply contained no text (finish reason {finish_reason:?})"))
    }

    /// Asks the model to clean up `raw_ingredients` and returns its reply verbatim.
    #[instrument(skip_all)]
    pub async fn sanitize(&self, raw_ingredients: &str) -> eyre::Result<String> {
        let request = GenerateContentRequest {
            contents: vec![user_text(sanitize_prompt(raw_ingredients))],
            generation_config: None,
        };
        self.generate_content(&request)
            .await
            .context("sanitize ingredients with Gemini")
    }

    /// Like [`Self::sanitize`], but asks for a JSON list of ingredients.
    ///
    /// If the reply does not decode as that list, the reply text is kept as is.
    #[instrument(skip_all)]
    pub async fn sanitize_structured(
        &self,
        raw_ingredients: &str,
    ) -> eyre::Result<SanitizedIngredients> {
        let request = GenerateContentRequest {
            contents: vec![user_text(sanitize_prompt(raw_ingredients))],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: ingredient_list_schema(),
            }),
        };
        let text = self
            .generate_content(&request)
            .await
            .context("sanitize ingredients with Gemini")?;

        match parse_structured(&text) {
            Ok(ingredients) => {
                tracing::debug!(count = ingredients.len(), "decoded structured ingredients");
                Ok(SanitizedIngredients::Structured(ingredients))
            }
            Err(e) => {
                tracing::warn!("Gemini reply is not an ingredient list ({e}), using it verbatim");
                Ok(SanitizedIngredients::Verbatim(text))
            }
        }
    }
}

fn user_text(text: String) -> Content {
    Content {
        role: Some("user".to_string()),
        parts: vec![Part { text: Some(text) }],
    }
}
