//! Integration tests for the Postgres store.
//!
//! To run these tests, you need:
//! 1. A PostgreSQL database with the taskboard schema applied
//! 2. DATABASE_URL environment variable set
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p taskboard-fixtures pg_store`
//!
//! Note: These tests reset every taskboard table. Point them at a scratch database.

use std::env;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use taskboard::auth::CredentialHasher;
use taskboard::errors::DomainError;
use taskboard_fixtures::prelude::*;

struct PlainHasher;

#[async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        Ok(format!("plain${plaintext}"))
    }
}

/// Get database pool, skipping tests if DATABASE_URL is not set.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            None
        }
    }
}

#[tokio::test]
async fn test_pg_build_and_reset() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let store = PgStore::new(pool);

    ResetPlanner::new(&store).reset().await.expect("initial reset");

    let builder = FixtureBuilder::from_config(FixtureConfig::small())
        .with_companies(1)
        .with_seed(2025);
    let report = builder
        .build(&store, &PlainHasher)
        .await
        .expect("build failed");

    let expected = builder.config().expected_counts();
    for kind in EntityKind::CREATION_ORDER {
        assert_eq!(store.count(kind).await.unwrap(), expected[&kind], "{kind}");
    }

    let company_id = report.companies[0];
    let dev_group = store
        .find_first_group(company_id, MemberTier::Developer.group_prefix())
        .await
        .unwrap()
        .expect("dev group");
    assert_eq!(dev_group.name, "Dev Group 1");
    assert!(store.find_first_client_task(company_id).await.unwrap().is_some());

    ResetPlanner::new(&store).reset().await.expect("final reset");
    for kind in RESET_ORDER {
        assert_eq!(store.count(kind).await.unwrap(), 0, "{kind}");
    }

    store.close().await;
}
