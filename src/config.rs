use anyhow::{Context, Result};
use std::env;
use url::Url;

pub const API_BASE_URL_ENV_VAR: &str = "KITCHEN_API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Literals used by the normalizer and the instruction formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub placeholder_name: String,
    pub placeholder_description: String,
    pub no_instructions_text: String,
    /// Shown as "missing" when the upstream text could not be parsed into a recipe.
    pub fallback_missing_ingredients: Vec<String>,
    pub fallback_sample_size: usize,
    pub preview_limit: usize,
    pub ellipsis: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            placeholder_name: "Recipe Suggestion".to_string(),
            placeholder_description: "AI-generated recipe based on your ingredients".to_string(),
            no_instructions_text: "No instructions available".to_string(),
            fallback_missing_ingredients: vec![
                "Salt".to_string(),
                "Pepper".to_string(),
                "Oil".to_string(),
            ],
            fallback_sample_size: 3,
            preview_limit: 150,
            ellipsis: "...".to_string(),
        }
    }
}

impl NormalizerConfig {
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    /// Reads the backend location from the environment, falling back to the local dev server.
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let raw = env::var(API_BASE_URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::from_base_url(&raw)
    }

    /// An explicit URL (from the command line) wins over the environment.
    pub fn resolve(api_url: Option<&str>) -> Result<Self> {
        match api_url {
            Some(url) => Self::from_base_url(url),
            None => Self::from_env(),
        }
    }

    pub fn from_base_url(raw: &str) -> Result<Self> {
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .with_context(|| format!("Invalid kitchen API base URL '{}'", raw))?;
        Ok(Self { base_url })
    }

    /// Joins an endpoint path onto the base URL, keeping any path prefix such as `/api`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
