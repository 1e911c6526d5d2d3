//! Fluent builder API for fixture runs.
//!
//! The [`FixtureBuilder`] walks the tenant graph in dependency order and writes
//! every row through a [`crate::db::Store`].

mod fixture;

pub use fixture::{FixtureBuilder, FixtureReport, TenantContext};
