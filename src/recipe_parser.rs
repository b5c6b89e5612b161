//! Turns whatever the suggestion service sent back into one canonical [`Recipe`].
//!
//! The upstream is a language model, so a payload may be a proper object, a JSON
//! document encoded as a string (optionally inside a markdown fence), or free prose.
//! Normalization never fails: unusable payloads degrade to a synthetic recipe.

use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::config::NormalizerConfig;
use crate::recipe::Recipe;

/// A payload as received from the suggestion service.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSuggestion {
    Object(Map<String, Value>),
    Text(String),
    Other(Value),
}

impl From<Value> for RawSuggestion {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawSuggestion::Object(map),
            Value::String(text) => RawSuggestion::Text(text),
            other => RawSuggestion::Other(other),
        }
    }
}

impl From<String> for RawSuggestion {
    fn from(text: String) -> Self {
        RawSuggestion::Text(text)
    }
}

impl From<&str> for RawSuggestion {
    fn from(text: &str) -> Self {
        RawSuggestion::Text(text.to_string())
    }
}

/// What a payload turned out to be, in order of precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape<'a> {
    /// An object with a non-empty `name`.
    NamedRecipe(&'a Map<String, Value>),
    /// The first entry of a `recipes` sequence, from an object or a parsed string.
    FirstCandidate(Cow<'a, Value>),
    /// Text that is not JSON, or JSON without a usable `recipes` sequence.
    Unstructured(&'a str),
    /// Anything else. Objects are kept so their fields can still be used.
    Unrecognized(Option<&'a Map<String, Value>>),
}

pub fn classify(raw: &RawSuggestion) -> PayloadShape<'_> {
    match raw {
        RawSuggestion::Object(map) if has_name(map) => PayloadShape::NamedRecipe(map),
        RawSuggestion::Object(map) => match first_candidate(map) {
            Some(candidate) => PayloadShape::FirstCandidate(Cow::Borrowed(candidate)),
            None => PayloadShape::Unrecognized(Some(map)),
        },
        RawSuggestion::Text(text) => {
            let body = strip_code_fences(text);
            match serde_json::from_str::<Value>(body) {
                Ok(Value::Object(map)) => match first_candidate(&map) {
                    Some(candidate) => PayloadShape::FirstCandidate(Cow::Owned(candidate.clone())),
                    None => {
                        debug!("suggestion text parsed as JSON but has no recipes sequence");
                        PayloadShape::Unstructured(text)
                    }
                },
                Ok(_) => {
                    debug!("suggestion text parsed as a non-object JSON value");
                    PayloadShape::Unstructured(text)
                }
                Err(e) => {
                    debug!(error = %e, "suggestion text is not JSON");
                    PayloadShape::Unstructured(text)
                }
            }
        }
        RawSuggestion::Other(_) => PayloadShape::Unrecognized(None),
    }
}

fn has_name(map: &Map<String, Value>) -> bool {
    map.get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty())
}

fn first_candidate(map: &Map<String, Value>) -> Option<&Value> {
    map.get("recipes")?.as_array()?.first()
}

/// Removes a surrounding markdown code fence (with or without a `json` tag).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => body[4..].trim(),
        _ => body.trim(),
    }
}

/// Cleans instruction text for display.
///
/// Strips fence markers and doubled escapes, then tries a second JSON parse: models
/// sometimes put a whole `{"recipes": [...]}` document inside a string field. In that
/// case each candidate's instructions (or its description) are joined with a space.
pub fn clean_instruction_text(text: &str) -> String {
    let cleaned = text
        .replace("```json", "")
        .replace("```", "")
        .replace("\\\"", "\"")
        .replace("\\n", "\n");

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => match map.get("recipes") {
            Some(Value::Array(candidates)) => candidates
                .iter()
                .map(candidate_display_text)
                .collect::<Vec<_>>()
                .join(" "),
            _ => cleaned,
        },
        _ => cleaned,
    }
}

fn candidate_display_text(candidate: &Value) -> String {
    let Some(map) = candidate.as_object() else {
        return String::new();
    };
    text_field(map, "instructions")
        .filter(|text| !text.is_empty())
        .or_else(|| text_field(map, "description").filter(|text| !text.is_empty()))
        .unwrap_or_default()
}

/// Reads a string field; an array of strings is joined line by line.
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Array(lines) => Some(
            lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

/// Reads an ingredient list. Entries may be names or objects carrying a `name`.
fn name_list(map: &Map<String, Value>, key: &str, alias: &str) -> Vec<String> {
    let Some(Value::Array(entries)) = map.get(key).or_else(|| map.get(alias)) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name.clone()),
            Value::Object(item) => item.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct RecipeNormalizer {
    config: NormalizerConfig,
}

impl RecipeNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Produces exactly one recipe for any payload.
    ///
    /// `inventory_sample` is only consulted when the payload has to be replaced by
    /// the synthetic fallback recipe.
    pub fn normalize(&self, raw: &RawSuggestion, inventory_sample: &[String]) -> Recipe {
        match classify(raw) {
            PayloadShape::NamedRecipe(map) => self.fill_defaults(map),
            PayloadShape::FirstCandidate(candidate) => self.recipe_from_candidate(&candidate),
            PayloadShape::Unstructured(text) => self.fallback_recipe(text, inventory_sample),
            PayloadShape::Unrecognized(Some(map)) => self.fill_defaults(map),
            PayloadShape::Unrecognized(None) => {
                debug!("unrecognized suggestion payload, using an empty recipe");
                self.fill_defaults(&Map::new())
            }
        }
    }

    fn recipe_from_candidate(&self, candidate: &Value) -> Recipe {
        match candidate {
            Value::Object(map) => self.fill_defaults(map),
            Value::String(text) => Recipe {
                instructions: text.clone(),
                ..self.fill_defaults(&Map::new())
            },
            _ => self.fill_defaults(&Map::new()),
        }
    }

    fn fill_defaults(&self, map: &Map<String, Value>) -> Recipe {
        let non_empty = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        Recipe {
            name: non_empty("name").unwrap_or_else(|| self.config.placeholder_name.clone()),
            description: non_empty("description")
                .unwrap_or_else(|| self.config.placeholder_description.clone()),
            instructions: text_field(map, "instructions").unwrap_or_default(),
            available_ingredients: name_list(map, "availableIngredients", "available_ingredients"),
            missing_ingredients: name_list(map, "missingIngredients", "missing_ingredients"),
        }
    }

    fn fallback_recipe(&self, text: &str, inventory_sample: &[String]) -> Recipe {
        warn!(
            chars = text.chars().count(),
            "suggestion could not be parsed into a recipe, using placeholder ingredients"
        );
        Recipe {
            name: self.config.placeholder_name.clone(),
            description: self.config.placeholder_description.clone(),
            instructions: text.to_string(),
            available_ingredients: inventory_sample
                .iter()
                .take(self.config.fallback_sample_size)
                .cloned()
                .collect(),
            missing_ingredients: self.config.fallback_missing_ingredients.clone(),
        }
    }
}
