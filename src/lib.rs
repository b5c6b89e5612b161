pub mod api_connection;
pub mod cli;
pub mod config;
pub mod gap_resolver;
pub mod logging;
pub mod recipe;
pub mod recipe_card;
pub mod recipe_parser;
pub mod suggestions;
