use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::DomainError;

/// Every table managed by the taskboard schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Role,
    Group,
    User,
    UserPaymentPreference,
    ClientGroup,
    Client,
    TaskList,
    ClientTask,
    TaskStage,
    UserTask,
    TimeLog,
    TaskNote,
    TaskComment,
    FileAttachment,
    CurrencyRate,
    MonthlyInvoice,
    MonthlyInvoiceLine,
}

impl EntityKind {
    /// Order in which rows can be created without referencing a missing parent.
    pub const CREATION_ORDER: [EntityKind; 18] = [
        EntityKind::Company,
        EntityKind::Role,
        EntityKind::Group,
        EntityKind::User,
        EntityKind::UserPaymentPreference,
        EntityKind::ClientGroup,
        EntityKind::Client,
        EntityKind::TaskList,
        EntityKind::ClientTask,
        EntityKind::TaskStage,
        EntityKind::UserTask,
        EntityKind::TimeLog,
        EntityKind::TaskNote,
        EntityKind::TaskComment,
        EntityKind::FileAttachment,
        EntityKind::CurrencyRate,
        EntityKind::MonthlyInvoice,
        EntityKind::MonthlyInvoiceLine,
    ];

    /// Returns the database table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::Role => "roles",
            EntityKind::Group => "groups",
            EntityKind::User => "users",
            EntityKind::UserPaymentPreference => "user_payment_preferences",
            EntityKind::ClientGroup => "client_groups",
            EntityKind::Client => "clients",
            EntityKind::TaskList => "task_lists",
            EntityKind::ClientTask => "client_tasks",
            EntityKind::TaskStage => "task_stages",
            EntityKind::UserTask => "user_tasks",
            EntityKind::TimeLog => "time_logs",
            EntityKind::TaskNote => "task_notes",
            EntityKind::TaskComment => "task_comments",
            EntityKind::FileAttachment => "file_attachments",
            EntityKind::CurrencyRate => "currency_rates",
            EntityKind::MonthlyInvoice => "monthly_invoices",
            EntityKind::MonthlyInvoiceLine => "monthly_invoice_lines",
        }
    }

    /// Kinds this kind holds a foreign key to.
    ///
    /// Comment targets are polymorphic and carry no foreign key, so only the author
    /// is listed for [`EntityKind::TaskComment`].
    pub fn parents(&self) -> &'static [EntityKind] {
        use EntityKind::*;
        match self {
            Company => &[],
            Role => &[Company],
            Group => &[Company, Role],
            User => &[Company, Group],
            UserPaymentPreference => &[User],
            ClientGroup => &[Company],
            Client => &[Company, ClientGroup],
            TaskList => &[Company, Client],
            ClientTask => &[Company, Client, TaskList, User],
            TaskStage => &[Company, ClientTask, Group],
            UserTask => &[ClientTask, Company, User, TaskStage],
            TimeLog => &[UserTask, User],
            TaskNote => &[UserTask, User],
            TaskComment => &[User],
            FileAttachment => &[UserTask, User],
            CurrencyRate => &[Company],
            MonthlyInvoice => &[User],
            MonthlyInvoiceLine => &[MonthlyInvoice, Client, ClientTask],
        }
    }

    /// Kinds holding a foreign key to this kind.
    pub fn children(&self) -> impl Iterator<Item = EntityKind> + '_ {
        Self::CREATION_ORDER
            .into_iter()
            .filter(move |kind| kind.parents().contains(self))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row as created by the store, with its assigned identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(id: Uuid, data: T) -> Self {
        Self { id, data }
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

/// Capability flags keyed by resource, then action.
///
/// Stored as opaque JSON; nothing in the generator interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(BTreeMap<String, BTreeMap<String, bool>>);

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every listed action on `resource`.
    pub fn grant(mut self, resource: &str, actions: &[&str]) -> Self {
        let entry = self.0.entry(resource.to_string()).or_default();
        for action in actions {
            entry.insert((*action).to_string(), true);
        }
        self
    }

    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.0
            .get(resource)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(false)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Overall status of a client task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    Pending,
    InProgress,
    Completed,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 3] = [
        OverallStatus::Pending,
        OverallStatus::InProgress,
        OverallStatus::Completed,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pending => "Pending",
            OverallStatus::InProgress => "In Progress",
            OverallStatus::Completed => "Completed",
        }
    }
}

impl FromStr for OverallStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

/// Status of a subtask assigned to a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtaskStatus {
    ToDo,
}

impl SubtaskStatus {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtaskStatus::ToDo => "To Do",
        }
    }
}

/// Payout method for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Paypal,
}

impl PaymentMethod {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "paypal",
        }
    }
}

/// Kinds of entity a [`TaskComment`](NewTaskComment) may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentTargetKind {
    ClientTask,
    TaskStage,
    UserTask,
}

impl CommentTargetKind {
    /// Returns the type tag stored next to the target id.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentTargetKind::ClientTask => "client_task",
            CommentTargetKind::TaskStage => "task_stage",
            CommentTargetKind::UserTask => "user_task",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            CommentTargetKind::ClientTask => EntityKind::ClientTask,
            CommentTargetKind::TaskStage => EntityKind::TaskStage,
            CommentTargetKind::UserTask => EntityKind::UserTask,
        }
    }
}

impl FromStr for CommentTargetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client_task" => Ok(CommentTargetKind::ClientTask),
            "task_stage" => Ok(CommentTargetKind::TaskStage),
            "user_task" => Ok(CommentTargetKind::UserTask),
            other => Err(DomainError::InvalidCommentTarget(format!(
                "unknown target type '{other}'"
            ))),
        }
    }
}

/// The task-like entity a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "task_type", content = "task_id", rename_all = "snake_case")]
pub enum CommentTarget {
    ClientTask(Uuid),
    TaskStage(Uuid),
    UserTask(Uuid),
}

impl CommentTarget {
    /// Builds a target from the stored `(type tag, id)` pair.
    pub fn from_parts(tag: &str, id: Uuid) -> Result<Self, DomainError> {
        Ok(Self::new(tag.parse()?, id))
    }

    pub fn new(kind: CommentTargetKind, id: Uuid) -> Self {
        match kind {
            CommentTargetKind::ClientTask => CommentTarget::ClientTask(id),
            CommentTargetKind::TaskStage => CommentTarget::TaskStage(id),
            CommentTargetKind::UserTask => CommentTarget::UserTask(id),
        }
    }

    pub fn kind(&self) -> CommentTargetKind {
        match self {
            CommentTarget::ClientTask(_) => CommentTargetKind::ClientTask,
            CommentTarget::TaskStage(_) => CommentTargetKind::TaskStage,
            CommentTarget::UserTask(_) => CommentTargetKind::UserTask,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn id(&self) -> Uuid {
        match self {
            CommentTarget::ClientTask(id)
            | CommentTarget::TaskStage(id)
            | CommentTarget::UserTask(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCompany {
    pub email: String,
    pub password_hash: String,
    pub company_name: String,
    pub representative: String,
    pub address: String,
    pub phone: String,
    pub website: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRole {
    pub company_id: Uuid,
    pub name: String,
    pub permissions: PermissionMatrix,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub company_id: Uuid,
    pub role_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub company_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub hourly_rate: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUserPaymentPreference {
    pub user_id: Uuid,
    pub method: PaymentMethod,
    /// Method-specific payout details.
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClientGroup {
    pub company_id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub company_id: Uuid,
    pub client_group_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTaskList {
    pub company_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInfo {
    pub billing_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClientTask {
    pub company_id: Uuid,
    pub client_id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: OffsetDateTime,
    pub overall_status: OverallStatus,
    pub financial_info: FinancialInfo,
    pub created_by_id: Uuid,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTaskStage {
    pub company_id: Uuid,
    pub client_task_id: Uuid,
    /// Group responsible for the stage.
    pub group_id: Uuid,
    pub name: String,
    pub description: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUserTask {
    pub client_task_id: Uuid,
    pub company_id: Uuid,
    pub assigned_user_id: Uuid,
    pub created_by_id: Uuid,
    pub task_stage_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: SubtaskStatus,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTimeLog {
    pub user_task_id: Uuid,
    pub user_id: Uuid,
    pub hours: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTaskNote {
    pub user_task_id: Uuid,
    pub user_id: Uuid,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTaskComment {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub target: CommentTarget,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCurrencyRate {
    pub company_id: Uuid,
    pub currency: String,
    /// Rate relative to the base currency.
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMonthlyInvoice {
    pub user_id: Uuid,
    pub period_start: OffsetDateTime,
    pub period_end: OffsetDateTime,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMonthlyInvoiceLine {
    pub monthly_invoice_id: Uuid,
    pub client_id: Uuid,
    pub task_id: Uuid,
    pub task_link: String,
    pub note: String,
    pub time_spent: f64,
    pub hourly_rate: f64,
    pub currency: String,
    pub total: f64,
    pub finished_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_order_respects_foreign_keys() {
        for (position, kind) in EntityKind::CREATION_ORDER.iter().enumerate() {
            for parent in kind.parents() {
                let parent_position = EntityKind::CREATION_ORDER
                    .iter()
                    .position(|k| k == parent)
                    .unwrap();
                assert!(
                    parent_position < position,
                    "{parent} must be created before {kind}"
                );
            }
        }
    }

    #[test]
    fn test_children_inverts_parents() {
        let children: Vec<_> = EntityKind::Role.children().collect();
        assert_eq!(children, vec![EntityKind::Group]);

        let children: Vec<_> = EntityKind::MonthlyInvoiceLine.children().collect();
        assert!(children.is_empty());
    }

    #[test]
    fn test_comment_target_round_trips_through_parts() {
        let id = Uuid::new_v4();
        let target = CommentTarget::UserTask(id);
        let parsed = CommentTarget::from_parts(target.type_tag(), target.id()).unwrap();
        assert_eq!(parsed, target);
        assert_eq!(target.kind().entity_kind(), EntityKind::UserTask);
    }

    #[test]
    fn test_comment_target_rejects_unknown_tag() {
        let result = CommentTarget::from_parts("invoice", Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::InvalidCommentTarget(_))));
    }

    #[test]
    fn test_permission_matrix_grants() {
        let matrix = PermissionMatrix::new()
            .grant("task", &["trackTime"])
            .grant("client", &["view"]);

        assert!(matrix.allows("task", "trackTime"));
        assert!(!matrix.allows("task", "assign"));
        assert!(!matrix.allows("board", "create"));

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["task"]["trackTime"], serde_json::json!(true));
    }
}
