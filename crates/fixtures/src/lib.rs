//! Fixture generation for the taskboard schema.
//!
//! This crate populates a store with a realistic multi-tenant data set: companies
//! with roles, groups and users, a client/task hierarchy with subtasks and their
//! time logs, notes and comments, plus currency rates and a monthly invoice per
//! company. Rows are written one at a time in dependency order, so a partially
//! failed run still leaves every foreign key valid.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use taskboard_fixtures::prelude::*;
//!
//! let store = MemoryStore::new();
//! ResetPlanner::new(&store).reset().await?;
//! let report = FixtureBuilder::from_config(FixtureConfig::small())
//!     .with_seed(7)
//!     .build(&store, &Argon2Hasher)
//!     .await?;
//! ```

pub mod builders;
pub mod config;
pub mod db;
pub mod generators;

pub use taskboard::models::EntityKind;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{FixtureBuilder, FixtureReport, TenantContext};
    pub use crate::config::{FanOut, FixtureConfig, RateBand, SubtaskPlacement};
    pub use crate::db::{MemoryStore, PgStore, RESET_ORDER, ResetPlanner, SeedError, Store};
    pub use crate::generators::{
        BillingGenerator, FakeData, MemberTier, TenantGenerator, WorkGenerator,
    };
    pub use crate::EntityKind;
    pub use taskboard::auth::{Argon2Hasher, CredentialHasher};
}
