use super::common::*;

use crate::workflows::catalog::ProductCode;
use crate::workflows::listing::{BoardQuery, BoardSettings, Condition, ListingStatus};

fn board(harness: &Harness) -> BoardQuery {
    BoardQuery::new(
        harness.catalog.clone(),
        harness.listings.clone(),
        BoardSettings::default(),
    )
}

#[tokio::test]
async fn only_approved_listings_are_visible() {
    let harness = Harness::verified();
    let approved = harness
        .seed_listing(12345, at(1, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;
    harness
        .seed_listing(34567, at(2, 9), date(2026, 5, 1), ListingStatus::Pending)
        .await;
    harness
        .seed_listing(23456, at(3, 9), date(2026, 5, 1), ListingStatus::Rejected)
        .await;

    let entries = board(&harness)
        .list_as_of("", date(2025, 3, 10))
        .await
        .expect("board loads");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].listing.id, approved);
}

#[tokio::test]
async fn moderation_changes_visibility_both_ways() {
    let harness = Harness::verified();
    let board = board(&harness);
    let id = harness
        .seed_listing(12345, at(1, 9), date(2026, 5, 1), ListingStatus::Pending)
        .await;
    let today = date(2025, 3, 10);

    assert!(board.list_as_of("", today).await.expect("board").is_empty());

    harness.listings.set_status(&id, ListingStatus::Approved);
    assert_eq!(board.list_as_of("", today).await.expect("board").len(), 1);

    harness.listings.set_status(&id, ListingStatus::Rejected);
    assert!(board.list_as_of("", today).await.expect("board").is_empty());
}

#[tokio::test]
async fn entries_are_newest_first() {
    let harness = Harness::verified();
    for (code, day) in [(12345, 1), (34567, 5), (23456, 3)] {
        harness
            .seed_listing(code, at(day, 9), date(2026, 5, 1), ListingStatus::Approved)
            .await;
    }

    let entries = board(&harness)
        .list_as_of("", date(2025, 3, 10))
        .await
        .expect("board loads");

    let codes: Vec<ProductCode> = entries
        .iter()
        .map(|entry| entry.listing.product_code)
        .collect();
    assert_eq!(
        codes,
        [ProductCode(34567), ProductCode(23456), ProductCode(12345)]
    );
}

#[tokio::test]
async fn name_filter_restricts_to_matching_products() {
    let harness = Harness::verified();
    harness
        .seed_listing(12345, at(1, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;
    harness
        .seed_listing(12346, at(2, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;
    harness
        .seed_listing(34567, at(3, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;

    let entries = board(&harness)
        .list_as_of("타이레놀", date(2025, 3, 10))
        .await
        .expect("board loads");

    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|entry| entry.product_name().starts_with("타이레놀")));
}

#[tokio::test]
async fn numeric_filter_matches_exact_codes_only() {
    let harness = Harness::verified();
    harness
        .seed_listing(12345, at(1, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;
    let board = board(&harness);
    let today = date(2025, 3, 10);

    assert_eq!(board.list_as_of("12345", today).await.expect("board").len(), 1);
    assert!(board.list_as_of("1234", today).await.expect("board").is_empty());
    assert!(board.list_as_of("99999", today).await.expect("board").is_empty());
}

#[tokio::test]
async fn unmatched_terms_short_circuit_and_short_terms_show_everything() {
    let harness = Harness::verified();
    harness
        .seed_listing(12345, at(1, 9), date(2026, 5, 1), ListingStatus::Approved)
        .await;
    let board = board(&harness);
    let today = date(2025, 3, 10);

    assert!(board.list_as_of("없는약", today).await.expect("board").is_empty());
    assert_eq!(board.list_as_of("타", today).await.expect("board").len(), 1);
}

#[tokio::test]
async fn expired_listings_are_flagged_not_hidden() {
    let harness = Harness::verified();
    harness
        .seed_listing(12345, at(1, 9), date(2025, 3, 9), ListingStatus::Approved)
        .await;
    harness
        .seed_listing(34567, at(2, 9), date(2025, 3, 10), ListingStatus::Approved)
        .await;

    let entries = board(&harness)
        .list_as_of("", date(2025, 3, 10))
        .await
        .expect("board loads");

    let flags: Vec<(u64, bool)> = entries
        .iter()
        .map(|entry| (entry.listing.product_code.0, entry.is_expired))
        .collect();
    assert_eq!(flags, [(34567, false), (12345, true)]);
}

#[tokio::test]
async fn pages_follow_the_configured_size() {
    let harness = Harness::verified();
    for day in 1..=25 {
        harness
            .seed_listing(12345, at(day, 9), date(2026, 5, 1), ListingStatus::Approved)
            .await;
    }
    let board = board(&harness);

    assert_eq!(board.list("").await.expect("board").len(), 20);
    assert_eq!(board.list_page("", 1).await.expect("board").len(), 5);
    assert!(board.list_page("", 2).await.expect("board").is_empty());
}

#[tokio::test]
async fn cards_render_catalog_details() {
    let harness = Harness::verified();
    harness
        .seed_listing(23456, at(1, 9), date(2026, 1, 5), ListingStatus::Approved)
        .await;
    harness
        .seed_listing(77777, at(2, 9), date(2026, 1, 5), ListingStatus::Approved)
        .await;

    let entries = board(&harness)
        .list_as_of("", date(2025, 3, 10))
        .await
        .expect("board loads");

    let unknown = &entries[0];
    assert_eq!(unknown.product_name(), "Unknown product");
    assert_eq!(unknown.price_display(), None);

    let syrup = &entries[1];
    assert_eq!(syrup.product_name(), "어린이부루펜시럽");
    assert_eq!(syrup.price_display().as_deref(), Some("1,830₩ / 100mL"));
    assert_eq!(syrup.expiry_display(), "2026.01.05");
    assert_eq!(syrup.thumbnail(), "https://cdn.example/23456/full.jpg");
    assert_eq!(syrup.condition_label(), Condition::B.label());
}
