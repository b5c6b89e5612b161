use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single recipe suggestion, normalized for display.
///
/// Both ingredient lists are always present after normalization, possibly empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub instructions: String,
    #[serde(default)]
    pub available_ingredients: Vec<String>,
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub name: String,
    /// Kept as sent (number or string); only `name` feeds the normalizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Item names in inventory order, the sample the normalizer falls back on.
pub fn inventory_names(items: &[InventoryItem]) -> Vec<String> {
    items.iter().map(|item| item.name.clone()).collect()
}

/// Confirmation returned by the shopping collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GapResult {
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
    #[serde(default)]
    pub order_url: Option<String>,
}
