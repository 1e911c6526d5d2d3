//! Store integration for fixture generation.
//!
//! The [`Store`] trait is the persistence capability the builder and the reset
//! planner run against. [`PgStore`] writes to Postgres; [`MemoryStore`] keeps rows
//! in process and enforces the same foreign-key and tenant constraints.

mod memory;
mod postgres;
mod reset;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use taskboard::errors::DomainError;
use taskboard::models::{
    EntityKind, NewClient, NewClientGroup, NewClientTask, NewCompany, NewCurrencyRate, NewGroup,
    NewMonthlyInvoice, NewMonthlyInvoiceLine, NewRole, NewTaskComment, NewTaskList, NewTaskNote,
    NewTaskStage, NewTimeLog, NewUser, NewUserPaymentPreference, NewUserTask, Record,
};

pub use memory::{MemorySnapshot, MemoryStore};
pub use postgres::PgStore;
pub use reset::{RESET_ORDER, ResetPlanner};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{kind} row {id} does not exist")]
    MissingReference { kind: EntityKind, id: Uuid },
    #[error("{kind} row {id} belongs to a different company")]
    TenantMismatch { kind: EntityKind, id: Uuid },
    #[error("{kind} row {id} belongs to a different {parent}")]
    ParentMismatch {
        kind: EntityKind,
        id: Uuid,
        parent: EntityKind,
    },
    #[error("Duplicate {kind}: {key}")]
    Duplicate { kind: EntityKind, key: String },
    #[error("Cannot delete {kind}: still referenced by {referenced_by}")]
    ForeignKeyViolation {
        kind: EntityKind,
        referenced_by: EntityKind,
    },
    #[error("No {kind} row found for company {company_id}")]
    RowNotFound { kind: EntityKind, company_id: Uuid },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Persistence capability used by the fixture builder and reset planner.
///
/// Every insert returns the created row with its store-assigned id. "First" lookups
/// return the earliest created matching row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_company(&self, company: &NewCompany) -> Result<Record<NewCompany>, SeedError>;
    async fn insert_role(&self, role: &NewRole) -> Result<Record<NewRole>, SeedError>;
    async fn insert_group(&self, group: &NewGroup) -> Result<Record<NewGroup>, SeedError>;
    async fn insert_user(&self, user: &NewUser) -> Result<Record<NewUser>, SeedError>;
    async fn insert_payment_preference(
        &self,
        preference: &NewUserPaymentPreference,
    ) -> Result<Record<NewUserPaymentPreference>, SeedError>;
    async fn insert_client_group(
        &self,
        group: &NewClientGroup,
    ) -> Result<Record<NewClientGroup>, SeedError>;
    async fn insert_client(&self, client: &NewClient) -> Result<Record<NewClient>, SeedError>;
    async fn insert_task_list(&self, list: &NewTaskList) -> Result<Record<NewTaskList>, SeedError>;
    async fn insert_client_task(
        &self,
        task: &NewClientTask,
    ) -> Result<Record<NewClientTask>, SeedError>;
    async fn insert_task_stage(
        &self,
        stage: &NewTaskStage,
    ) -> Result<Record<NewTaskStage>, SeedError>;
    async fn insert_user_task(&self, task: &NewUserTask) -> Result<Record<NewUserTask>, SeedError>;
    async fn insert_time_log(&self, log: &NewTimeLog) -> Result<Record<NewTimeLog>, SeedError>;
    async fn insert_task_note(&self, note: &NewTaskNote) -> Result<Record<NewTaskNote>, SeedError>;
    async fn insert_task_comment(
        &self,
        comment: &NewTaskComment,
    ) -> Result<Record<NewTaskComment>, SeedError>;
    async fn insert_currency_rates(
        &self,
        rates: &[NewCurrencyRate],
    ) -> Result<Vec<Record<NewCurrencyRate>>, SeedError>;
    async fn insert_monthly_invoice(
        &self,
        invoice: &NewMonthlyInvoice,
    ) -> Result<Record<NewMonthlyInvoice>, SeedError>;
    async fn insert_invoice_line(
        &self,
        line: &NewMonthlyInvoiceLine,
    ) -> Result<Record<NewMonthlyInvoiceLine>, SeedError>;

    /// First group of the company whose name contains `name_contains`.
    async fn find_first_group(
        &self,
        company_id: Uuid,
        name_contains: &str,
    ) -> Result<Option<Record<NewGroup>>, SeedError>;
    async fn find_first_client(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClient>>, SeedError>;
    async fn find_first_client_task(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClientTask>>, SeedError>;

    /// Deletes every row of `kind`, returning the number removed.
    async fn delete_all(&self, kind: EntityKind) -> Result<u64, SeedError>;
    async fn count(&self, kind: EntityKind) -> Result<u64, SeedError>;
}
