use crate::infra::{parse_date, parse_verification_status, InMemoryMarketplace};
use chrono::{Local, NaiveDate};
use clap::Args;
use rx_exchange::config::MarketplaceConfig;
use rx_exchange::error::AppError;
use rx_exchange::workflows::listing::{
    BoardQuery, CommitError, Condition, ListingStatus, OpenedState, PhotoFile, PhotoRole,
    SubmissionWizard, WizardOpenError,
};
use rx_exchange::workflows::memory::StaticIdentity;
use rx_exchange::workflows::seller::{SessionContext, VerificationStatus};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Catalog search term typed into the product step
    #[arg(long, default_value = "타이레놀")]
    pub(crate) query: String,
    /// Quantity to list
    #[arg(long, default_value_t = 10)]
    pub(crate) quantity: u32,
    /// Expiry date printed on the package (YYYY-MM-DD). Defaults to a year from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) expiry: Option<NaiveDate>,
    /// Verification status of the demo seller
    #[arg(long, default_value = "verified", value_parser = parse_verification_status)]
    pub(crate) status: VerificationStatus,
    /// Optional drug catalog CSV export
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
    /// Evaluation date for the board's expiry flags (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

const DEMO_SELLER: &str = "demo-pharmacist";

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        query,
        quantity,
        expiry,
        status,
        catalog_csv,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let expiry = expiry.unwrap_or_else(|| today + chrono::Duration::days(365));
    let config = MarketplaceConfig {
        catalog_csv,
        ..MarketplaceConfig::default()
    };

    let identity = StaticIdentity::signed_in(DEMO_SELLER, "demo@rx-exchange.local", status);
    let market = InMemoryMarketplace::build(&config, identity)?;
    let ports = market.ports();
    let session = SessionContext::establish(market.identity.as_ref()).await?;

    println!("Surplus medicine listing demo");
    println!(
        "- Seller {} ({}) | catalog of {} products",
        DEMO_SELLER,
        status.label(),
        market.catalog.len()
    );

    let mut wizard = match SubmissionWizard::open(&ports, config.wizard_settings(), &session).await
    {
        Ok(wizard) => wizard,
        Err(WizardOpenError::Blocked(notice)) => {
            println!("\n{}", notice.title);
            println!("  {}", notice.explanation);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "\nStep 1/3: {} ({}%)",
        wizard.step().title(),
        wizard.progress_percent()
    );
    let mut receiver = wizard.subscribe_search();
    wizard.search_input(&query)?;
    let results = match receiver.wait_for(|snapshot| !snapshot.searching).await {
        Ok(snapshot) => snapshot.results.clone(),
        Err(_) => Vec::new(),
    };
    println!("- '{}' matched {} products", query, results.len());
    for product in results.iter().take(5) {
        println!(
            "  - [{}] {} | {} | {}",
            product.code,
            product.name,
            product.manufacturer,
            product.classification.label()
        );
    }
    if results.is_empty() {
        println!("  Nothing to list; try a different --query.");
        return Ok(());
    }
    let product = wizard.select_product(0)?;
    println!("- Selected {} ({})", product.name, product.code);
    advance(&mut wizard)?;

    println!(
        "\nStep 2/3: {} ({}%)",
        wizard.step().title(),
        wizard.progress_percent()
    );
    wizard.set_quantity(quantity);
    wizard.set_expiry_date(expiry);
    wizard.set_opened_state(OpenedState::Unopened);
    wizard.set_condition(Condition::A);
    println!(
        "- {} units | expires {} | {} | condition {}",
        quantity,
        expiry.format("%Y.%m.%d"),
        OpenedState::Unopened.label(),
        Condition::A.label()
    );
    advance(&mut wizard)?;

    println!(
        "\nStep 3/3: {} ({}%)",
        wizard.step().title(),
        wizard.progress_percent()
    );
    for (role, name) in PhotoRole::ALL
        .into_iter()
        .zip(["package.jpg", "expiry-lot.jpg", "blister.png"])
    {
        let file = PhotoFile::from_name(name, synthetic_photo(role));
        if let Err(errors) = wizard.attach_photo(role, file) {
            return Err(CommitError::Validation(errors).into());
        }
        println!("- Attached {} photo as {}", role.label(), name);
    }

    let receipt = wizard.commit(&session).await?;
    println!("\n{}", receipt.message);
    println!(
        "- Listing {} saved as {}",
        receipt.listing_id,
        receipt.status.label()
    );
    for url in &receipt.image_urls {
        println!("  - {}", url);
    }

    let board = BoardQuery::new(
        ports.catalog.clone(),
        ports.listings.clone(),
        config.board_settings(),
    );
    let visible = board.list_as_of("", today).await?;
    println!("\nBoard before moderation: {} listings", visible.len());

    market
        .listings
        .set_status(&receipt.listing_id, ListingStatus::Approved);
    println!("Moderator approved {}", receipt.listing_id);

    let entries = board.list_as_of("", today).await?;
    println!("Board after moderation: {} listings", entries.len());
    for entry in &entries {
        println!(
            "  - {} | {} | {} units | expires {}{} | {}",
            entry.product_name(),
            entry.price_display().unwrap_or_else(|| "price unknown".to_string()),
            entry.listing.quantity,
            entry.expiry_display(),
            if entry.is_expired { " (expired)" } else { "" },
            entry.thumbnail()
        );
    }

    Ok(())
}

fn advance(wizard: &mut SubmissionWizard) -> Result<(), AppError> {
    wizard
        .advance()
        .map(|_| ())
        .map_err(|errors| CommitError::Validation(errors).into())
}

fn synthetic_photo(role: PhotoRole) -> Vec<u8> {
    let marker = role as u8;
    (0..4096_u32).map(|offset| (offset as u8) ^ marker).collect()
}
