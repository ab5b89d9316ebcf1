//! Sailing club startup check and migration runner.
//!
//! Connects to the configured database, applies pending migrations when
//! asked to, wires the services and reports what the club has on file.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use sailing_club::adapters::{
    PostgresFacilityRepository, PostgresMemberRepository, PostgresPaymentRepository,
    PostgresSeasonRepository, PostgresWaitingListRepository,
};
use sailing_club::application::{ClubRepositories, ClubServices};
use sailing_club::config::AppConfig;
use sailing_club::telemetry;

fn repositories(pool: &PgPool) -> ClubRepositories {
    ClubRepositories {
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        seasons: Arc::new(PostgresSeasonRepository::new(pool.clone())),
        facilities: Arc::new(PostgresFacilityRepository::new(pool.clone())),
        waiting_list: Arc::new(PostgresWaitingListRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    telemetry::init_tracing(&config.logging).context("Failed to initialise tracing")?;
    info!(
        environment = ?config.logging.environment,
        membership_fee = %config.club.membership_fee(),
        currency = %config.club.currency,
        "Starting sailing club"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    let services = ClubServices::new(repositories(&pool), config.club.membership_fee())
        .await
        .context("Failed to build club services")?;

    let catalog = services
        .rentals
        .get_facilities_catalog()
        .await
        .context("Failed to load facility catalog")?;
    let members = services
        .members
        .get_all_members()
        .await
        .context("Failed to load members")?;

    info!(
        facility_types = catalog.len(),
        members = members.len(),
        active_members = members.iter().filter(|m| m.is_active()).count(),
        pricing_rules = services.rentals.price_calculator().rule_count(),
        "Club data loaded"
    );
    for facility_type in &catalog {
        info!(
            facility_type_id = %facility_type.id,
            name = %facility_type.name,
            suggested_price = %facility_type.suggested_price,
            "Facility type"
        );
    }

    pool.close().await;
    Ok(())
}
