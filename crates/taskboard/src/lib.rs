//! Domain types for the taskboard schema.
//!
//! Multi-tenant entities (companies, roles, groups, users, the client/task hierarchy,
//! time tracking and invoicing) plus the credential hashing used for company and
//! user logins.

pub mod auth;
pub mod errors;
pub mod models;
