use async_trait::async_trait;
use pantry_suggest::api_connection::connection::ApiConnectionError;
use pantry_suggest::config::NormalizerConfig;
use pantry_suggest::gap_resolver::{GapOutcome, GapResolver, ShoppingLookup};
use pantry_suggest::recipe::{GapResult, Recipe};
use pantry_suggest::recipe_card::{CardAction, CardHandle, RecipeCard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process shopping service that records every call.
#[derive(Default)]
struct FakeShop {
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<String>>>,
    order_url: Option<String>,
    fail: bool,
    dispose_on_call: Option<CardHandle>,
    yield_before_reply: bool,
}

#[async_trait]
impl ShoppingLookup for FakeShop {
    async fn check_availability(
        &self,
        ingredient_names: &[String],
    ) -> Result<GapResult, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(ingredient_names.to_vec());
        if let Some(handle) = &self.dispose_on_call {
            assert!(handle.is_checking());
            handle.dispose();
        }
        if self.yield_before_reply {
            tokio::task::yield_now().await;
        }
        if self.fail {
            return Err(ApiConnectionError::ApiError {
                status: reqwest::StatusCode::BAD_GATEWAY,
                error_body: "upstream down".to_string(),
            });
        }
        Ok(GapResult {
            missing_ingredients: ingredient_names.to_vec(),
            order_url: self.order_url.clone(),
        })
    }
}

fn recipe_missing(missing: &[&str]) -> Recipe {
    Recipe {
        name: "Carbonara".to_string(),
        description: "Roman pasta".to_string(),
        instructions: "Cook pasta, toss with eggs and cheese.".to_string(),
        available_ingredients: vec!["Pasta".to_string(), "Eggs".to_string()],
        missing_ingredients: missing.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_empty_gap_makes_no_call() {
    let shop = Arc::new(FakeShop::default());
    let resolver = GapResolver::new(Arc::clone(&shop));

    let outcome = resolver.resolve_gap(&recipe_missing(&[])).await.unwrap();

    assert_eq!(outcome, GapOutcome::NoOp);
    assert_eq!(shop.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resolved_gap_with_order_url() {
    let shop = Arc::new(FakeShop {
        order_url: Some("https://shop.example/cart?items=guanciale".to_string()),
        ..FakeShop::default()
    });
    let resolver = GapResolver::new(Arc::clone(&shop));

    let outcome = resolver
        .resolve_gap(&recipe_missing(&["Guanciale", "Pecorino"]))
        .await
        .unwrap();

    match outcome {
        GapOutcome::Resolved { result, open_url } => {
            assert_eq!(result.missing_ingredients, vec!["Guanciale", "Pecorino"]);
            assert_eq!(
                open_url.map(|u| u.to_string()),
                Some("https://shop.example/cart?items=guanciale".to_string())
            );
        }
        other => panic!("expected a resolved gap, got {:?}", other),
    }
    assert_eq!(
        *shop.received.lock().unwrap(),
        vec![vec!["Guanciale".to_string(), "Pecorino".to_string()]]
    );
}

#[tokio::test]
async fn test_unusable_order_url_is_not_opened() {
    for bad in ["javascript:alert(1)", "not a url"] {
        let shop = FakeShop {
            order_url: Some(bad.to_string()),
            ..FakeShop::default()
        };
        let outcome = GapResolver::new(shop)
            .resolve_gap(&recipe_missing(&["Salt"]))
            .await
            .unwrap();
        assert!(matches!(outcome, GapOutcome::Resolved { open_url: None, .. }));
    }
}

#[tokio::test]
async fn test_failure_leaves_recipe_untouched() {
    let resolver = GapResolver::new(FakeShop {
        fail: true,
        ..FakeShop::default()
    });
    let recipe = recipe_missing(&["Guanciale"]);
    let before = recipe.clone();

    let err = resolver.resolve_gap(&recipe).await.unwrap_err();

    assert!(matches!(err.source, ApiConnectionError::ApiError { .. }));
    assert!(err.to_string().contains("try again"));
    assert_eq!(recipe, before);
}

#[tokio::test]
async fn test_card_stores_confirmation_and_opens_order_page() {
    let shop = Arc::new(FakeShop {
        order_url: Some("https://shop.example/order/1".to_string()),
        ..FakeShop::default()
    });
    let resolver = GapResolver::new(Arc::clone(&shop));
    let card = RecipeCard::new(recipe_missing(&["Pecorino"]), NormalizerConfig::default());

    let action = card.order_missing(&resolver).await.unwrap();

    assert!(matches!(action, CardAction::OpenOrderPage(ref url) if url.as_str() == "https://shop.example/order/1"));
    assert_eq!(card.view().confirmed_missing, vec!["Pecorino"]);
    assert!(card.can_order());
    assert!(!card.handle().is_checking());
}

#[tokio::test]
async fn test_card_without_missing_ingredients_does_nothing() {
    let shop = Arc::new(FakeShop::default());
    let resolver = GapResolver::new(Arc::clone(&shop));
    let card = RecipeCard::new(recipe_missing(&[]), NormalizerConfig::default());

    assert_eq!(card.order_missing(&resolver).await.unwrap(), CardAction::Nothing);
    assert!(!card.can_order());
    assert_eq!(shop.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_card_failure_keeps_previous_state() {
    let card = RecipeCard::new(recipe_missing(&["Guanciale"]), NormalizerConfig::default());

    let ok = GapResolver::new(FakeShop::default());
    assert_eq!(card.order_missing(&ok).await.unwrap(), CardAction::Confirmed);
    let confirmed = card.confirmation();

    let failing = GapResolver::new(FakeShop {
        fail: true,
        ..FakeShop::default()
    });
    assert!(card.order_missing(&failing).await.is_err());
    assert_eq!(card.confirmation(), confirmed);
    assert_eq!(card.recipe().missing_ingredients, vec!["Guanciale"]);
    assert!(card.can_order());
}

#[tokio::test]
async fn test_card_disposed_mid_lookup_discards_result() {
    let card = RecipeCard::new(recipe_missing(&["Pecorino"]), NormalizerConfig::default());
    let shop = Arc::new(FakeShop {
        order_url: Some("https://shop.example/order/2".to_string()),
        dispose_on_call: Some(card.handle()),
        ..FakeShop::default()
    });
    let resolver = GapResolver::new(Arc::clone(&shop));

    assert_eq!(card.order_missing(&resolver).await.unwrap(), CardAction::Discarded);
    assert!(card.confirmation().is_none());
    assert_eq!(shop.calls.load(Ordering::SeqCst), 1);

    // Once disposed, no further lookups are issued.
    assert_eq!(card.order_missing(&resolver).await.unwrap(), CardAction::Discarded);
    assert_eq!(shop.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_lookup_while_first_runs_is_busy() {
    let card = RecipeCard::new(recipe_missing(&["Pecorino"]), NormalizerConfig::default());
    let shop = Arc::new(FakeShop {
        yield_before_reply: true,
        ..FakeShop::default()
    });
    let resolver = GapResolver::new(Arc::clone(&shop));

    let (first, second) = tokio::join!(card.order_missing(&resolver), card.order_missing(&resolver));

    let mut actions = vec![first.unwrap(), second.unwrap()];
    actions.sort_by_key(|action| matches!(action, CardAction::Busy));
    assert_eq!(actions, vec![CardAction::Confirmed, CardAction::Busy]);
    assert_eq!(shop.calls.load(Ordering::SeqCst), 1);
    assert!(!card.handle().is_checking());
    assert!(card.can_order());
}

#[test]
fn test_card_view_toggle() {
    let mut card = RecipeCard::new(
        Recipe {
            instructions: "Stir slowly. ".repeat(20),
            ..recipe_missing(&["Salt"])
        },
        NormalizerConfig::default(),
    );

    let collapsed = card.view();
    assert_eq!(collapsed.toggle_label.as_deref(), Some("Show More"));
    assert_eq!(collapsed.instructions.chars().count(), 153);
    assert_eq!(collapsed.available_count, 2);
    assert_eq!(collapsed.missing_count, 1);

    card.toggle_instructions();
    let expanded = card.view();
    assert_eq!(expanded.toggle_label.as_deref(), Some("Show Less"));
    assert_eq!(expanded.instructions, "Stir slowly. ".repeat(20));

    let short = RecipeCard::new(recipe_missing(&[]), NormalizerConfig::default());
    assert!(short.view().toggle_label.is_none());
}
