use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::endpoints::{
    ApiEnvelope, InventoryResponse, MissingIngredientsRequest, MissingIngredientsResponse,
    SuggestionsResponse, INVENTORY_PATH, MISSING_INGREDIENTS_PATH, SUGGESTIONS_PATH,
};
use crate::config::ApiConfig;
use crate::recipe::{GapResult, InventoryItem};
use crate::recipe_parser::RawSuggestion;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Backend reported failure: {0}")]
    Unsuccessful(String),
    #[error("No recipes found. Try adding more items to your inventory.")]
    NoSuggestions,
}

/// HTTP client for the kitchen backend (inventory, suggestions, shopping lookup).
#[derive(Debug, Clone)]
pub struct KitchenApiClient {
    client: Client,
    config: ApiConfig,
}

impl KitchenApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get_all_items(&self) -> Result<Vec<InventoryItem>, ApiConnectionError> {
        let url = self.config.endpoint(INVENTORY_PATH);
        let envelope: InventoryResponse = send(self.client.get(&url)).await?;
        if !envelope.success {
            return Err(unsuccessful(envelope.message, "inventory request failed"));
        }
        let items = envelope.data.unwrap_or_default();
        debug!(count = items.len(), "fetched inventory");
        Ok(items)
    }

    /// Fetches the raw suggestion payloads, one per candidate recipe.
    pub async fn get_suggestions(&self) -> Result<Vec<RawSuggestion>, ApiConnectionError> {
        let url = self.config.endpoint(SUGGESTIONS_PATH);
        info!(%url, "requesting recipe suggestions");
        let envelope: SuggestionsResponse = send(self.client.get(&url)).await?;

        if !envelope.success {
            return Err(ApiConnectionError::NoSuggestions);
        }
        let suggestions: Vec<RawSuggestion> = match envelope.data.and_then(|data| data.recipes) {
            Some(Value::Array(recipes)) => recipes.into_iter().map(RawSuggestion::from).collect(),
            Some(Value::Null) | None => return Err(ApiConnectionError::NoSuggestions),
            Some(single) => {
                debug!("recipes is not a list, treating it as one suggestion");
                vec![RawSuggestion::from(single)]
            }
        };
        debug!(count = suggestions.len(), "received recipe suggestions");
        Ok(suggestions)
    }

    pub async fn check_missing_ingredients(
        &self,
        ingredient_names: &[String],
    ) -> Result<GapResult, ApiConnectionError> {
        let url = self.config.endpoint(MISSING_INGREDIENTS_PATH);
        let body = MissingIngredientsRequest {
            recipe_ingredients: ingredient_names.to_vec(),
        };
        info!(%url, count = ingredient_names.len(), "checking missing ingredients");
        let envelope: MissingIngredientsResponse =
            send(self.client.post(&url).json(&body)).await?;

        match envelope.data {
            Some(result) if envelope.success => Ok(result),
            _ => Err(unsuccessful(envelope.message, "missing-ingredient check failed")),
        }
    }
}

fn unsuccessful(message: Option<String>, fallback: &str) -> ApiConnectionError {
    ApiConnectionError::Unsuccessful(message.unwrap_or_else(|| fallback.to_string()))
}

async fn send<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<ApiEnvelope<T>, ApiConnectionError> {
    let response = request
        .header("Content-Type", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(ApiConnectionError::ApiError { status, error_body });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
