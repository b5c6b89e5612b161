use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recipe::{GapResult, InventoryItem};

pub const INVENTORY_PATH: &str = "inventory";
pub const SUGGESTIONS_PATH: &str = "recipes/suggestions";
pub const MISSING_INGREDIENTS_PATH: &str = "recipes/missing-ingredients";

/// Every backend response is wrapped as `{ success, data }`.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

pub type InventoryResponse = ApiEnvelope<Vec<InventoryItem>>;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SuggestionsPayload {
    /// Left as raw JSON: usually a list, but the generator may send a single payload.
    #[serde(default)]
    pub recipes: Option<Value>,
}

pub type SuggestionsResponse = ApiEnvelope<SuggestionsPayload>;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MissingIngredientsRequest {
    pub recipe_ingredients: Vec<String>,
}

pub type MissingIngredientsResponse = ApiEnvelope<GapResult>;
