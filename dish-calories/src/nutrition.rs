//! Calorie lookup through the Nutritionix natural-language nutrients API.

use crate::config::Config;
use eyre::Context;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

/// Request body for `POST /v2/natural/nutrients`.
#[derive(Debug, Serialize)]
pub struct NutrientsQuery<'a> {
    pub query: &'a str,
}

/// Response body of `POST /v2/natural/nutrients`.
///
/// See: <https://docx.syndigo.com/developers/docs/natural-language-for-nutrients>
#[derive(Debug, Deserialize)]
pub struct NutrientsResponse {
    pub foods: Vec<FoodRecord>,
}

/// One recognized food and its nutrient facts.
///
/// Nutritionix returns several dozen fields per food; only the ones we project
/// into [`FoodItem`] are decoded.
#[derive(Debug, Deserialize)]
pub struct FoodRecord {
    pub food_name: String,
    /// `None` when the field is absent. A present `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub nf_calories: Option<serde_json::Value>,
    pub serving_qty: f64,
    pub serving_unit: String,
}

/// Keeps "field present but null" apart from "field absent".
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// A food reduced to the four fields the calorie total needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_name: String,
    /// Expected to be a number, but upstream data is not always well-formed.
    pub calories: Option<serde_json::Value>,
    pub serving_qty: f64,
    pub serving_unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCalories,
    NotANumber,
}

/// A food that contributed nothing to the total, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFood {
    pub food_name: String,
    pub reason: SkipReason,
}

/// Result of summing the calories of a food list.
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieTally {
    /// Sum of all numeric calorie values, rounded to two decimal places.
    pub total: f64,
    pub skipped: Vec<SkippedFood>,
}

/// Projects every food in the response down to a [`FoodItem`], keeping order.
pub fn filter_food_list(nutrition: &NutrientsResponse) -> Vec<FoodItem> {
    nutrition
        .foods
        .iter()
        .map(|food| FoodItem {
            food_name: food.food_name.clone(),
            calories: food.nf_calories.clone(),
            serving_qty: food.serving_qty,
            serving_unit: food.serving_unit.clone(),
        })
        .collect()
}

/// Sums calories across `foods`, skipping entries without a usable value.
///
/// Each skipped entry is logged and recorded; none of them aborts the sum.
pub fn tally_calories(foods: &[FoodItem]) -> CalorieTally {
    let mut total = 0.0;
    let mut skipped = Vec::new();

    for food in foods {
        let reason = match &food.calories {
            Some(value) => match value.as_f64() {
                Some(calories) => {
                    total += calories;
                    continue;
                }
                None => {
                    tracing::warn!(
                        food = food.food_name,
                        value = %value,
                        "calorie value is not a number, skipping"
                    );
                    SkipReason::NotANumber
                }
            },
            None => {
                tracing::warn!(food = food.food_name, "food is missing the calories value, skipping");
                SkipReason::MissingCalories
            }
        };
        skipped.push(SkippedFood {
            food_name: food.food_name.clone(),
            reason,
        });
    }

    CalorieTally {
        total: round_to_hundredths(total),
        skipped,
    }
}

/// Total calories of `foods`, rounded to two decimal places.
///
/// Foods without a numeric calorie value count as zero.
pub fn sum_calories(foods: &[FoodItem]) -> f64 {
    tally_calories(foods).total
}

// Halves go to the even neighbour.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Client for the Nutritionix API.
#[derive(Clone)]
pub struct NutritionixClient {
    app_id: String,
    app_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for NutritionixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutritionixClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NutritionixClient {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            app_id: config.nutritionix_app_id.clone(),
            app_key: config.nutritionix_app_key.clone(),
            base_url: config.nutritionix_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Looks up nutrient facts for a natural-language ingredient list such as
    /// `2 tbsp cooking oil and 1 kg chicken`.
    #[instrument(skip(self))]
    pub async fn natural_nutrients(&self, query: &str) -> eyre::Result<NutrientsResponse> {
        let url = format!("{}/v2/natural/nutrients", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.app_key)
            .json(&NutrientsQuery { query })
            .send()
            .await
            .with_context(|| format!("send request to Nutritionix API: {url}"))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            eyre::bail!(
                "Nutritionix API request failed with status {}: {}",
                status_code,
                error_text
            );
        }

        let nutrients: NutrientsResponse = response
            .json()
            .await
            .context("parse Nutritionix nutrients response as JSON")?;

        tracing::debug!(foods = nutrients.foods.len(), "fetched nutrients");

        Ok(nutrients)
    }

    /// Total calories of everything Nutritionix recognizes in `ingredients`.
    pub async fn fetch_calories(&self, ingredients: &str) -> eyre::Result<f64> {
        let nutrients = self
            .natural_nutrients(ingredients)
            .await
            .context("look up nutrients")?;
        let foods = filter_food_list(&nutrients);
        let tally = tally_calories(&foods);
        if !tally.skipped.is_empty() {
            tracing::info!(
                skipped = tally.skipped.len(),
                counted = foods.len() - tally.skipped.len(),
                "some foods did not count towards the total"
            );
        }
        Ok(tally.total)
    }
}
