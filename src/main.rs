use anyhow::{anyhow, Context, Result};
use pantry_suggest::api_connection::connection::KitchenApiClient;
use pantry_suggest::cli::{load_inventory_file, load_payload_file, parse_args, Command};
use pantry_suggest::config::{ApiConfig, NormalizerConfig};
use pantry_suggest::gap_resolver::GapResolver;
use pantry_suggest::logging;
use pantry_suggest::recipe_card::{CardAction, RecipeCard};
use pantry_suggest::recipe_parser::RecipeNormalizer;
use pantry_suggest::suggestions::{build_cards, load_suggestions};

fn print_cards(cards: &mut [RecipeCard], expanded: bool) {
    for (index, card) in cards.iter_mut().enumerate() {
        if expanded && card.needs_toggle() {
            card.toggle_instructions();
        }
        println!("\n#{} {}", index, card.view());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = parse_args();
    logging::init(&cli.log_level);

    let normalizer = RecipeNormalizer::new(NormalizerConfig::default().with_preview_limit(cli.limit));
    match cli.command {
        Command::Normalize {
            payload,
            inventory,
            as_text,
            expanded,
        } => {
            let raw = load_payload_file(&payload, as_text).await?;
            let inventory = match inventory {
                Some(path) => load_inventory_file(&path).await?,
                None => Vec::new(),
            };
            let mut cards = build_cards(&normalizer, &[raw], &inventory);
            print_cards(&mut cards, expanded);
        }
        Command::Suggest { expanded } => {
            let client = KitchenApiClient::new(ApiConfig::resolve(cli.api_url.as_deref())?);
            let mut batch = load_suggestions(&client, &normalizer)
                .await
                .context("Failed to get recipe suggestions. Please try again later.")?;
            if batch.inventory.is_empty() {
                println!("No items in inventory. Add some ingredients to get better suggestions.");
            }
            print_cards(&mut batch.cards, expanded);
        }
        Command::OrderMissing { recipe } => {
            let client = KitchenApiClient::new(ApiConfig::resolve(cli.api_url.as_deref())?);
            let batch = load_suggestions(&client, &normalizer)
                .await
                .context("Failed to get recipe suggestions. Please try again later.")?;
            let count = batch.cards.len();
            let card = batch
                .cards
                .get(recipe)
                .ok_or_else(|| anyhow!("Suggestion #{} does not exist ({} available)", recipe, count))?;

            let resolver = GapResolver::new(client);
            match card.order_missing(&resolver).await? {
                CardAction::Nothing => println!("Nothing is missing for '{}'.", card.recipe().name),
                CardAction::OpenOrderPage(url) => {
                    println!("{}", card.view());
                    println!("\nOpen the order page: {}", url);
                }
                CardAction::Confirmed => println!("{}", card.view()),
                CardAction::Busy => println!("A lookup for this suggestion is already running."),
                CardAction::Discarded => {}
            }
        }
    }

    Ok(())
}
