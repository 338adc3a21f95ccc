use super::*;

fn row(slug: Option<&str>, name: &str) -> CategoryRow {
    CategoryRow {
        id: Uuid::new_v4(),
        slug: slug.map(str::to_owned),
        name: name.to_owned(),
        icon: String::new(),
        color: String::new(),
        text_color: String::new(),
        custom_icon: None,
    }
}

#[test]
fn defaults_have_unique_slugs_and_include_fallback() {
    let mut slugs: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|c| c.0).collect();
    slugs.sort_unstable();
    slugs.dedup();
    assert_eq!(slugs.len(), DEFAULT_CATEGORIES.len());
    assert!(slugs.contains(&FALLBACK_SLUG));
    assert!(slugs.contains(&BANK_FEES_SLUG));
}

#[test]
fn fallback_detection_prefers_slug() {
    assert!(row(Some("others"), "Diversos").is_fallback());
    assert!(row(None, "Outro").is_fallback());
    assert!(!row(Some("food"), "Outro").is_fallback());
    assert!(!row(None, "Lazer").is_fallback());
}

#[test]
fn system_categories_are_protected_by_slug_or_name() {
    for slug in ["salary", "card_bill", "investments", "others"] {
        assert!(row(Some(slug), "Renomeada").is_protected(), "{slug}");
    }
    assert!(row(None, "Salário").is_protected());
    assert!(row(None, "fatura de cartão").is_protected());
    assert!(row(None, " Investimentos ").is_protected());
    assert!(row(None, "Outros").is_protected());
    assert!(!row(Some("food"), "Alimentação").is_protected());
    assert!(!row(Some(BANK_FEES_SLUG), "Taxas bancárias").is_protected());
    assert!(!row(None, "Pets").is_protected());
}

#[test]
fn every_protected_slug_is_seeded() {
    for slug in PROTECTED_SLUGS {
        assert!(DEFAULT_CATEGORIES.iter().any(|c| c.0 == slug), "{slug}");
    }
}

#[test]
fn blank_names_are_rejected() {
    let input = CategoryInput { name: "   ".into(), ..CategoryInput::default() };
    assert!(matches!(input.validated_name(), Err(CategoryError::EmptyName)));
    let input = CategoryInput { name: " Pets ".into(), ..CategoryInput::default() };
    assert_eq!(input.validated_name().unwrap(), "Pets");
}

#[test]
fn text_color_defaults_to_white() {
    assert_eq!(CategoryInput::default().text_color(), "#ffffff");
    let input = CategoryInput { text_color: "#000000".into(), ..CategoryInput::default() };
    assert_eq!(input.text_color(), "#000000");
}

#[test]
fn error_codes() {
    assert_eq!(CategoryError::Protected.error_code(), "E_CATEGORY_PROTECTED");
    assert_eq!(CategoryError::NotFound(Uuid::nil()).error_code(), "E_CATEGORY_NOT_FOUND");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn first_listing_seeds_defaults_once() {
    let pool = crate::db::integration_pool().await;
    let user_id = crate::db::seed_user(&pool, "cat-seed@example.com").await;

    let first = list_categories(&pool, user_id).await.expect("list should succeed");
    assert_eq!(first.len(), DEFAULT_CATEGORIES.len());
    let second = list_categories(&pool, user_id).await.expect("list should succeed");
    assert_eq!(second.len(), first.len());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn delete_moves_transactions_to_fallback() {
    let pool = crate::db::integration_pool().await;
    let user_id = crate::db::seed_user(&pool, "cat-delete@example.com").await;
    let categories = list_categories(&pool, user_id).await.expect("list should succeed");
    let fallback = categories.iter().find(|c| c.is_fallback()).expect("fallback seeded").id;
    let pets = create_category(&pool, user_id, &CategoryInput { name: "Pets".into(), ..CategoryInput::default() })
        .await
        .expect("create should succeed");

    sqlx::query(
        "INSERT INTO transactions (user_id, kind, description, amount_cents, category_id, date)
         VALUES ($1, 'expense', 'ração', 5000, $2, CURRENT_DATE)",
    )
    .bind(user_id)
    .bind(pets.id)
    .execute(&pool)
    .await
    .expect("seed transaction");

    delete_category(&pool, user_id, pets.id).await.expect("delete should succeed");
    let moved: Uuid = sqlx::query_scalar("SELECT category_id FROM transactions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .expect("transaction still present");
    assert_eq!(moved, fallback);

    let protected = delete_category(&pool, user_id, fallback).await;
    assert!(matches!(protected, Err(CategoryError::Protected)));
    let salary = categories.iter().find(|c| c.slug.as_deref() == Some("salary")).expect("salary seeded").id;
    let protected = delete_category(&pool, user_id, salary).await;
    assert!(matches!(protected, Err(CategoryError::Protected)));
}
