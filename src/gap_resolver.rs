use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::api_connection::connection::{ApiConnectionError, KitchenApiClient};
use crate::config::NormalizerConfig;
use crate::recipe::{GapResult, Recipe};
use crate::recipe_parser::clean_instruction_text;

/// The shopping side: confirms which ingredients are missing and may offer an order link.
#[async_trait]
pub trait ShoppingLookup: Send + Sync {
    async fn check_availability(
        &self,
        ingredient_names: &[String],
    ) -> Result<GapResult, ApiConnectionError>;
}

#[async_trait]
impl ShoppingLookup for KitchenApiClient {
    async fn check_availability(
        &self,
        ingredient_names: &[String],
    ) -> Result<GapResult, ApiConnectionError> {
        self.check_missing_ingredients(ingredient_names).await
    }
}

#[async_trait]
impl<T: ShoppingLookup + ?Sized> ShoppingLookup for Arc<T> {
    async fn check_availability(
        &self,
        ingredient_names: &[String],
    ) -> Result<GapResult, ApiConnectionError> {
        (**self).check_availability(ingredient_names).await
    }
}

/// A failed gap lookup. Recoverable: the recipe is untouched and the user may retry.
#[derive(Debug, Error)]
#[error("Could not check missing ingredients, please try again ({source})")]
pub struct GapLookupFailure {
    #[from]
    pub source: ApiConnectionError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapOutcome {
    /// Nothing is missing, so no lookup was made.
    NoOp,
    Resolved {
        result: GapResult,
        /// Order page to open in a new browsing context, if the lookup returned a usable one.
        open_url: Option<Url>,
    },
}

#[derive(Debug, Clone)]
pub struct GapResolver<L> {
    lookup: L,
}

impl<L: ShoppingLookup> GapResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Runs one lookup for the recipe's missing ingredients. Never retried.
    pub async fn resolve_gap(&self, recipe: &Recipe) -> Result<GapOutcome, GapLookupFailure> {
        if recipe.missing_ingredients.is_empty() {
            return Ok(GapOutcome::NoOp);
        }

        let result = self
            .lookup
            .check_availability(&recipe.missing_ingredients)
            .await
            .map_err(|e| {
                error!(recipe = %recipe.name, error = %e, "missing-ingredient lookup failed");
                GapLookupFailure::from(e)
            })?;

        info!(
            recipe = %recipe.name,
            confirmed = result.missing_ingredients.len(),
            "missing-ingredient lookup completed"
        );
        let open_url = result.order_url.as_deref().and_then(order_page_url);
        Ok(GapOutcome::Resolved { result, open_url })
    }
}

fn order_page_url(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!(scheme = url.scheme(), "ignoring order URL with unsupported scheme");
            None
        }
        Err(e) => {
            warn!(error = %e, "ignoring malformed order URL");
            None
        }
    }
}

/// Instruction text for display, truncated to `limit` characters unless expanded.
pub fn visible_instructions(recipe: &Recipe, expanded: bool, limit: usize) -> String {
    let config = NormalizerConfig::default().with_preview_limit(limit);
    visible_instructions_with(recipe, expanded, &config)
}

pub fn visible_instructions_with(
    recipe: &Recipe,
    expanded: bool,
    config: &NormalizerConfig,
) -> String {
    if recipe.instructions.is_empty() {
        return config.no_instructions_text.clone();
    }
    let cleaned = clean_instruction_text(&recipe.instructions);
    if expanded {
        return cleaned;
    }
    // Character slice, not word-aware.
    match cleaned.char_indices().nth(config.preview_limit) {
        Some((cut, _)) => format!("{}{}", &cleaned[..cut], config.ellipsis),
        None => cleaned,
    }
}

/// Whether the cleaned instructions are long enough to need a show-more toggle.
pub fn exceeds_preview(recipe: &Recipe, limit: usize) -> bool {
    clean_instruction_text(&recipe.instructions).chars().count() > limit
}
