use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::recipe::InventoryItem;
use crate::recipe_parser::RawSuggestion;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Kitchen backend base URL (overrides KITCHEN_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Characters of instructions shown before "Show More"
    #[arg(long, global = true, default_value_t = 150)]
    pub limit: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch suggestions for the current inventory and print them
    Suggest {
        /// Show full instructions
        #[arg(short, long)]
        expanded: bool,
    },
    /// Normalize a saved suggestion payload without contacting the backend
    Normalize {
        /// File holding the raw payload
        #[arg(short, long)]
        payload: PathBuf,
        /// JSON array of inventory items used for the fallback sample
        #[arg(short, long)]
        inventory: Option<PathBuf>,
        /// Treat the payload as text even if it is valid JSON
        #[arg(long)]
        as_text: bool,
        #[arg(short, long)]
        expanded: bool,
    },
    /// Check the missing ingredients of one suggestion with the shopping service
    OrderMissing {
        /// Zero-based index of the suggestion
        #[arg(short, long, default_value_t = 0)]
        recipe: usize,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Reads a saved payload. Valid JSON becomes a structured payload unless `as_text` is set.
pub async fn load_payload_file(path: &Path, as_text: bool) -> Result<RawSuggestion> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read payload file '{}'", path.display()))?;
    if as_text {
        return Ok(RawSuggestion::Text(content));
    }
    Ok(match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => RawSuggestion::from(value),
        Err(_) => RawSuggestion::Text(content),
    })
}

pub async fn load_inventory_file(path: &Path) -> Result<Vec<InventoryItem>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read inventory file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Inventory file '{}' is not a JSON array of items", path.display()))
}
