//! Display state for one suggestion: the normalized recipe plus caller-local view state.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use url::Url;

use crate::config::NormalizerConfig;
use crate::gap_resolver::{
    exceeds_preview, visible_instructions_with, GapLookupFailure, GapOutcome, GapResolver,
    ShoppingLookup,
};
use crate::recipe::{GapResult, Recipe};

#[derive(Debug, Default)]
struct LookupSlot {
    in_flight: AtomicBool,
    disposed: AtomicBool,
}

/// Clears the in-flight flag however the lookup ends.
struct InFlight<'a>(&'a LookupSlot);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Shared view of a card's lookup state, usable while the card is busy.
#[derive(Debug, Clone)]
pub struct CardHandle {
    slot: Arc<LookupSlot>,
}

impl CardHandle {
    /// Marks the card as gone; a lookup still running will have its result dropped.
    pub fn dispose(&self) {
        self.slot.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.slot.disposed.load(Ordering::SeqCst)
    }

    pub fn is_checking(&self) -> bool {
        self.slot.in_flight.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// No missing ingredients, nothing to look up.
    Nothing,
    /// A lookup for this card is already running.
    Busy,
    Confirmed,
    OpenOrderPage(Url),
    /// The card was disposed before the lookup finished.
    Discarded,
}

#[derive(Debug)]
pub struct RecipeCard {
    recipe: Recipe,
    config: NormalizerConfig,
    expanded: bool,
    confirmation: Mutex<Option<GapResult>>,
    slot: Arc<LookupSlot>,
}

impl RecipeCard {
    pub fn new(recipe: Recipe, config: NormalizerConfig) -> Self {
        Self {
            recipe,
            config,
            expanded: false,
            confirmation: Mutex::new(None),
            slot: Arc::default(),
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn handle(&self) -> CardHandle {
        CardHandle {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_instructions(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn needs_toggle(&self) -> bool {
        exceeds_preview(&self.recipe, self.config.preview_limit)
    }

    pub fn confirmation(&self) -> Option<GapResult> {
        self.lock_confirmation().clone()
    }

    fn lock_confirmation(&self) -> MutexGuard<'_, Option<GapResult>> {
        self.confirmation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn can_order(&self) -> bool {
        !self.recipe.missing_ingredients.is_empty() && !self.slot.in_flight.load(Ordering::SeqCst)
    }

    /// Looks up the missing ingredients, at most once at a time per card.
    ///
    /// Takes `&self` so the view can keep rendering while the lookup runs; a call made
    /// while another is outstanding returns [`CardAction::Busy`] without contacting the shop.
    /// A failure leaves the recipe and any earlier confirmation as they were.
    pub async fn order_missing<L: ShoppingLookup>(
        &self,
        resolver: &GapResolver<L>,
    ) -> Result<CardAction, GapLookupFailure> {
        if self.recipe.missing_ingredients.is_empty() {
            return Ok(CardAction::Nothing);
        }
        if self.slot.disposed.load(Ordering::SeqCst) {
            return Ok(CardAction::Discarded);
        }
        if self.slot.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(CardAction::Busy);
        }

        let slot = Arc::clone(&self.slot);
        let outcome = {
            let _guard = InFlight(&slot);
            resolver.resolve_gap(&self.recipe).await
        };

        if slot.disposed.load(Ordering::SeqCst) {
            debug!(recipe = %self.recipe.name, "card disposed during lookup, dropping result");
            return Ok(CardAction::Discarded);
        }

        match outcome? {
            GapOutcome::NoOp => Ok(CardAction::Nothing),
            GapOutcome::Resolved { result, open_url } => {
                *self.lock_confirmation() = Some(result);
                Ok(match open_url {
                    Some(url) => CardAction::OpenOrderPage(url),
                    None => CardAction::Confirmed,
                })
            }
        }
    }

    pub fn view(&self) -> CardView {
        let toggle_label = self
            .needs_toggle()
            .then(|| if self.expanded { "Show Less" } else { "Show More" }.to_string());

        CardView {
            title: self.recipe.name.clone(),
            description: self.recipe.description.clone(),
            available_ingredients: self.recipe.available_ingredients.clone(),
            missing_ingredients: self.recipe.missing_ingredients.clone(),
            available_count: self.recipe.available_ingredients.len(),
            missing_count: self.recipe.missing_ingredients.len(),
            instructions: visible_instructions_with(&self.recipe, self.expanded, &self.config),
            toggle_label,
            can_order: self.can_order(),
            confirmed_missing: self
                .lock_confirmation()
                .as_ref()
                .map(|gap| gap.missing_ingredients.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub title: String,
    pub description: String,
    pub available_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub available_count: usize,
    pub missing_count: usize,
    pub instructions: String,
    pub toggle_label: Option<String>,
    pub can_order: bool,
    pub confirmed_missing: Vec<String>,
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  {}", self.description)?;
        if !self.available_ingredients.is_empty() {
            writeln!(f, "  Available: {}", self.available_ingredients.join(", "))?;
        }
        if !self.missing_ingredients.is_empty() {
            writeln!(f, "  Missing:   {}", self.missing_ingredients.join(", "))?;
        }
        writeln!(f, "  Instructions:")?;
        for line in self.instructions.lines() {
            writeln!(f, "    {}", line)?;
        }
        if let Some(label) = &self.toggle_label {
            writeln!(f, "  [{}]", label)?;
        }
        if !self.confirmed_missing.is_empty() {
            writeln!(f, "  Order info: {}", self.confirmed_missing.join(", "))?;
        }
        write!(
            f,
            "  Available {} | Missing {}",
            self.available_count, self.missing_count
        )
    }
}
