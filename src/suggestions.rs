use tracing::warn;

use crate::api_connection::connection::{ApiConnectionError, KitchenApiClient};
use crate::recipe::{inventory_names, InventoryItem};
use crate::recipe_card::RecipeCard;
use crate::recipe_parser::{RawSuggestion, RecipeNormalizer};

/// Everything one suggestion pass produced.
#[derive(Debug)]
pub struct SuggestionBatch {
    pub inventory: Vec<InventoryItem>,
    pub cards: Vec<RecipeCard>,
}

/// Normalizes each payload into a fresh card.
pub fn build_cards(
    normalizer: &RecipeNormalizer,
    raw_suggestions: &[RawSuggestion],
    inventory: &[InventoryItem],
) -> Vec<RecipeCard> {
    let sample = inventory_names(inventory);
    raw_suggestions
        .iter()
        .map(|raw| {
            let recipe = normalizer.normalize(raw, &sample);
            RecipeCard::new(recipe, normalizer.config().clone())
        })
        .collect()
}

/// Fetches inventory and suggestions and normalizes them.
///
/// An inventory failure only costs the fallback sample; a suggestion failure is returned.
pub async fn load_suggestions(
    client: &KitchenApiClient,
    normalizer: &RecipeNormalizer,
) -> Result<SuggestionBatch, ApiConnectionError> {
    let inventory = match client.get_all_items().await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "could not fetch inventory, continuing without it");
            Vec::new()
        }
    };

    let raw_suggestions = client.get_suggestions().await?;
    let cards = build_cards(normalizer, &raw_suggestions, &inventory);
    Ok(SuggestionBatch { inventory, cards })
}
