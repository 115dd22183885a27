use super::common::*;

use crate::workflows::listing::wizard::SUBMITTED_MESSAGE;
use crate::workflows::listing::{
    CommitError, Field, ListingStatus, PhotoFile, PhotoRole, StorageError, SubmissionWizard,
    UploadError, WizardOpenError, WizardSettings, WizardStep,
};
use crate::workflows::seller::{AuthorizationError, VerificationStatus};

#[tokio::test(start_paused = true)]
async fn unverified_sellers_get_a_blocking_notice() {
    for status in [
        VerificationStatus::Unverified,
        VerificationStatus::Pending,
        VerificationStatus::Rejected,
    ] {
        let harness = Harness::new(status);
        let session = harness.session().await;

        let result =
            SubmissionWizard::open(&harness.ports(), WizardSettings::default(), &session).await;

        match result {
            Err(WizardOpenError::Blocked(notice)) => {
                assert_eq!(notice.status, Some(status));
                assert_eq!(notice.explanation, status.description());
            }
            other => panic!("expected a blocking notice for {status}, got {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn advance_without_a_product_stays_put() {
    let harness = Harness::verified();
    let mut wizard = harness.open_wizard().await;

    let first = wizard.advance().expect_err("product required");
    let second = wizard.advance().expect_err("still required");

    assert_eq!(first, second);
    assert_eq!(
        first.get(Field::Product),
        Some("Search for and select a product.")
    );
    assert_eq!(wizard.step(), WizardStep::ProductSelection);
    assert_eq!(wizard.errors(), &first);
}

#[tokio::test(start_paused = true)]
async fn selecting_a_product_clears_its_error() {
    let harness = Harness::verified();
    let mut wizard = harness.open_wizard().await;
    wizard.advance().expect_err("product required");

    choose_product(&mut wizard, "타이레놀정").await;

    assert!(wizard.errors().is_empty());
    assert_eq!(wizard.draft().selected_product(), Some(&tylenol()));
    assert!(wizard.search_snapshot().locked);
    assert_eq!(wizard.advance(), Ok(WizardStep::DetailEntry));
    assert_eq!(wizard.progress_percent(), 66);
}

#[tokio::test(start_paused = true)]
async fn zero_quantity_is_rejected_and_five_passes() {
    let harness = Harness::verified();
    let mut wizard = harness.open_wizard().await;
    choose_product(&mut wizard, "12345").await;
    wizard.advance().expect("product step valid");

    wizard.set_quantity(0);
    wizard.set_expiry_date(date(2026, 6, 30));
    let errors = wizard.advance().expect_err("zero quantity rejected");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get(Field::Quantity),
        Some("Enter a quantity of at least 1.")
    );
    assert_eq!(wizard.step(), WizardStep::DetailEntry);

    wizard.set_quantity(5);
    assert!(!wizard.errors().contains(Field::Quantity));
    assert_eq!(wizard.advance(), Ok(WizardStep::PhotoUpload));
}

#[tokio::test(start_paused = true)]
async fn past_expiry_dates_are_allowed() {
    let harness = Harness::verified();
    let mut wizard = harness.open_wizard().await;
    choose_product(&mut wizard, "12345").await;
    wizard.advance().expect("product step valid");

    wizard.set_quantity(2);
    wizard.set_expiry_date(date(2001, 1, 1));

    assert_eq!(wizard.advance(), Ok(WizardStep::PhotoUpload));
}

#[tokio::test(start_paused = true)]
async fn missing_expiry_and_quantity_are_both_reported() {
    let harness = Harness::verified();
    let mut wizard = harness.open_wizard().await;
    choose_product(&mut wizard, "12345").await;
    wizard.advance().expect("product step valid");

    let errors = wizard.advance().expect_err("details missing");
    let fields: Vec<Field> = errors.fields().collect();
    assert_eq!(fields, [Field::Quantity, Field::ExpiryDate]);
}

#[tokio::test(start_paused = true)]
async fn retreat_never_validates_and_stops_at_the_first_step() {
    let harness = Harness::verified();
    let mut wizard = completed_wizard(&harness).await;
    assert_eq!(wizard.step(), WizardStep::PhotoUpload);

    wizard.remove_photo(PhotoRole::Detail);
    assert_eq!(wizard.retreat(), WizardStep::DetailEntry);
    assert_eq!(wizard.retreat(), WizardStep::ProductSelection);
    assert_eq!(wizard.retreat(), WizardStep::ProductSelection);
    assert_eq!(wizard.draft().quantity(), Some(5));
}

#[tokio::test(start_paused = true)]
async fn photo_step_requires_all_three_roles() {
    let harness = Harness::verified();
    let mut wizard = completed_wizard(&harness).await;
    wizard.remove_photo(PhotoRole::Detail);

    let errors = wizard.advance().expect_err("detail photo missing");

    assert_eq!(
        errors.get(Field::Photo(PhotoRole::Detail)),
        Some("Upload the product detail photo.")
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(wizard.step(), WizardStep::PhotoUpload);
}

#[tokio::test(start_paused = true)]
async fn rejected_photo_is_reported_per_slot() {
    let harness = Harness::verified();
    let mut wizard = completed_wizard(&harness).await;

    let gif = PhotoFile::new("anim.gif", mime::IMAGE_GIF, vec![0_u8; 64]);
    let errors = wizard
        .attach_photo(PhotoRole::FullView, gif)
        .expect_err("gif rejected");

    assert!(errors.contains(Field::Photo(PhotoRole::FullView)));
    assert!(wizard.errors().contains(Field::Photo(PhotoRole::FullView)));
    assert_eq!(
        wizard
            .draft()
            .photo(PhotoRole::FullView)
            .file()
            .map(PhotoFile::name),
        Some("box.jpg")
    );
}

#[tokio::test(start_paused = true)]
async fn commit_creates_a_pending_listing_and_resets() {
    let harness = Harness::verified();
    let session = harness.session().await;
    let mut wizard = completed_wizard(&harness).await;
    assert_eq!(wizard.draft().live_previews(), 3);

    let receipt = wizard.commit(&session).await.expect("commit succeeds");

    assert_eq!(receipt.status, ListingStatus::Pending);
    assert_eq!(receipt.message, SUBMITTED_MESSAGE);
    assert!(receipt.image_urls[0].ends_with("_full.jpg"));
    assert!(receipt.image_urls[1].ends_with("_expiry_lot.png"));
    assert!(receipt.image_urls[2].ends_with("_detail.jpeg"));

    let stored = harness
        .listings
        .get(&receipt.listing_id)
        .expect("listing stored");
    assert_eq!(stored.status, ListingStatus::Pending);
    assert_eq!(stored.product_code, tylenol().code);
    assert_eq!(stored.seller_id, seller());
    assert_eq!(stored.quantity, 5);
    assert_eq!(stored.image_urls, receipt.image_urls);

    assert_eq!(wizard.step(), WizardStep::ProductSelection);
    assert!(wizard.draft().selected_product().is_none());
    assert_eq!(wizard.draft().live_previews(), 0);
    assert!(!wizard.search_snapshot().locked);
}

#[tokio::test(start_paused = true)]
async fn upload_failure_on_second_photo_creates_nothing_and_keeps_the_draft() {
    let harness = Harness::verified();
    let session = harness.session().await;
    let mut wizard = completed_wizard(&harness).await;
    harness.storage.fail_paths_containing(
        "_expiry_lot",
        StorageError::Unavailable("bucket offline".to_string()),
    );

    let error = wizard.commit(&session).await.expect_err("upload fails");

    assert!(matches!(
        error,
        CommitError::Upload(UploadError::Storage {
            role: PhotoRole::ExpiryLot,
            ..
        })
    ));
    assert!(error.is_retryable());
    assert!(harness.listings.is_empty());
    assert_eq!(wizard.step(), WizardStep::PhotoUpload);
    assert_eq!(wizard.draft().quantity(), Some(5));
    assert!(wizard.draft().photos().iter().all(|slot| slot.is_filled()));

    harness.storage.clear_failures();
    let receipt = wizard.commit(&session).await.expect("retry succeeds");
    assert_eq!(harness.listings.len(), 1);
    assert_eq!(receipt.status, ListingStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_leaves_uploaded_media_behind() {
    let harness = Harness::verified();
    let session = harness.session().await;
    let mut wizard = completed_wizard(&harness).await;
    harness.listings.fail_next_insert();

    let error = wizard.commit(&session).await.expect_err("insert fails");

    assert!(matches!(error, CommitError::Persistence(_)));
    assert!(harness.listings.is_empty());
    assert_eq!(harness.storage.paths().len(), 3);
    assert!(wizard.draft().selected_product().is_some());
}

#[tokio::test(start_paused = true)]
async fn commit_rechecks_verification_before_uploading() {
    let harness = Harness::verified();
    let session = harness.session().await;
    let mut wizard = completed_wizard(&harness).await;
    harness
        .identity
        .set_status(&seller(), VerificationStatus::Rejected);

    let error = wizard.commit(&session).await.expect_err("seller revoked");

    assert!(matches!(
        error,
        CommitError::Unauthorized(AuthorizationError::NotVerified { .. })
    ));
    assert!(!error.is_retryable());
    assert!(harness.storage.paths().is_empty());
    assert!(harness.listings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn commit_validates_every_step() {
    let harness = Harness::verified();
    let session = harness.session().await;
    let mut wizard = completed_wizard(&harness).await;
    wizard.set_quantity(0);

    let error = wizard.commit(&session).await.expect_err("invalid draft");

    match error {
        CommitError::Validation(errors) => assert!(errors.contains(Field::Quantity)),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(harness.storage.paths().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reset_discards_the_draft() {
    let harness = Harness::verified();
    let mut wizard = completed_wizard(&harness).await;

    wizard.reset();

    assert_eq!(wizard.step(), WizardStep::ProductSelection);
    assert_eq!(wizard.progress_percent(), 33);
    assert_eq!(wizard.draft().live_previews(), 0);
    assert!(wizard.draft().quantity().is_none());
    wizard
        .search_input("베아제")
        .expect("search unlocked after reset");
}
