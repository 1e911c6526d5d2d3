//! In-process store.
//!
//! Rows live in insertion-ordered tables behind a mutex. Every insert checks that
//! referenced rows exist and belong to the same company, and `delete_all` refuses
//! to clear a kind while rows of a child kind still exist, so a wrong creation or
//! deletion order fails the same way it would against Postgres.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use taskboard::models::{
    CommentTarget, EntityKind, NewClient, NewClientGroup, NewClientTask, NewCompany,
    NewCurrencyRate, NewGroup, NewMonthlyInvoice, NewMonthlyInvoiceLine, NewRole, NewTaskComment,
    NewTaskList, NewTaskNote, NewTaskStage, NewTimeLog, NewUser, NewUserPaymentPreference,
    NewUserTask, Record,
};

use super::{SeedError, Store};

struct Table<T> {
    kind: EntityKind,
    rows: HashMap<Uuid, Record<T>>,
    order: Vec<Uuid>,
}

impl<T: Clone> Table<T> {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, data: T) -> Record<T> {
        let record = Record::new(Uuid::new_v4(), data);
        self.rows.insert(record.id, record.clone());
        self.order.push(record.id);
        record
    }

    /// Looks up a referenced row, failing like a foreign key would.
    fn require(&self, id: Uuid) -> Result<&Record<T>, SeedError> {
        self.rows.get(&id).ok_or(SeedError::MissingReference {
            kind: self.kind,
            id,
        })
    }

    fn iter(&self) -> impl Iterator<Item = &Record<T>> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    fn first_where(&self, predicate: impl Fn(&T) -> bool) -> Option<Record<T>> {
        self.iter().find(|record| predicate(&record.data)).cloned()
    }

    fn snapshot(&self) -> Vec<Record<T>> {
        self.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) -> u64 {
        let removed = self.order.len() as u64;
        self.rows.clear();
        self.order.clear();
        removed
    }
}

/// Fails unless a referenced row belongs to `company_id`.
fn same_tenant(kind: EntityKind, id: Uuid, owner: Uuid, company_id: Uuid) -> Result<(), SeedError> {
    if owner == company_id {
        Ok(())
    } else {
        Err(SeedError::TenantMismatch { kind, id })
    }
}

struct Tables {
    companies: Table<NewCompany>,
    roles: Table<NewRole>,
    groups: Table<NewGroup>,
    users: Table<NewUser>,
    payment_preferences: Table<NewUserPaymentPreference>,
    client_groups: Table<NewClientGroup>,
    clients: Table<NewClient>,
    task_lists: Table<NewTaskList>,
    client_tasks: Table<NewClientTask>,
    task_stages: Table<NewTaskStage>,
    user_tasks: Table<NewUserTask>,
    time_logs: Table<NewTimeLog>,
    task_notes: Table<NewTaskNote>,
    task_comments: Table<NewTaskComment>,
    file_attachments: Table<()>,
    currency_rates: Table<NewCurrencyRate>,
    monthly_invoices: Table<NewMonthlyInvoice>,
    invoice_lines: Table<NewMonthlyInvoiceLine>,
}

impl Tables {
    fn new() -> Self {
        Self {
            companies: Table::new(EntityKind::Company),
            roles: Table::new(EntityKind::Role),
            groups: Table::new(EntityKind::Group),
            users: Table::new(EntityKind::User),
            payment_preferences: Table::new(EntityKind::UserPaymentPreference),
            client_groups: Table::new(EntityKind::ClientGroup),
            clients: Table::new(EntityKind::Client),
            task_lists: Table::new(EntityKind::TaskList),
            client_tasks: Table::new(EntityKind::ClientTask),
            task_stages: Table::new(EntityKind::TaskStage),
            user_tasks: Table::new(EntityKind::UserTask),
            time_logs: Table::new(EntityKind::TimeLog),
            task_notes: Table::new(EntityKind::TaskNote),
            task_comments: Table::new(EntityKind::TaskComment),
            file_attachments: Table::new(EntityKind::FileAttachment),
            currency_rates: Table::new(EntityKind::CurrencyRate),
            monthly_invoices: Table::new(EntityKind::MonthlyInvoice),
            invoice_lines: Table::new(EntityKind::MonthlyInvoiceLine),
        }
    }

    fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Company => self.companies.len(),
            EntityKind::Role => self.roles.len(),
            EntityKind::Group => self.groups.len(),
            EntityKind::User => self.users.len(),
            EntityKind::UserPaymentPreference => self.payment_preferences.len(),
            EntityKind::ClientGroup => self.client_groups.len(),
            EntityKind::Client => self.clients.len(),
            EntityKind::TaskList => self.task_lists.len(),
            EntityKind::ClientTask => self.client_tasks.len(),
            EntityKind::TaskStage => self.task_stages.len(),
            EntityKind::UserTask => self.user_tasks.len(),
            EntityKind::TimeLog => self.time_logs.len(),
            EntityKind::TaskNote => self.task_notes.len(),
            EntityKind::TaskComment => self.task_comments.len(),
            EntityKind::FileAttachment => self.file_attachments.len(),
            EntityKind::CurrencyRate => self.currency_rates.len(),
            EntityKind::MonthlyInvoice => self.monthly_invoices.len(),
            EntityKind::MonthlyInvoiceLine => self.invoice_lines.len(),
        }
    }

    fn clear(&mut self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Company => self.companies.clear(),
            EntityKind::Role => self.roles.clear(),
            EntityKind::Group => self.groups.clear(),
            EntityKind::User => self.users.clear(),
            EntityKind::UserPaymentPreference => self.payment_preferences.clear(),
            EntityKind::ClientGroup => self.client_groups.clear(),
            EntityKind::Client => self.clients.clear(),
            EntityKind::TaskList => self.task_lists.clear(),
            EntityKind::ClientTask => self.client_tasks.clear(),
            EntityKind::TaskStage => self.task_stages.clear(),
            EntityKind::UserTask => self.user_tasks.clear(),
            EntityKind::TimeLog => self.time_logs.clear(),
            EntityKind::TaskNote => self.task_notes.clear(),
            EntityKind::TaskComment => self.task_comments.clear(),
            EntityKind::FileAttachment => self.file_attachments.clear(),
            EntityKind::CurrencyRate => self.currency_rates.clear(),
            EntityKind::MonthlyInvoice => self.monthly_invoices.clear(),
            EntityKind::MonthlyInvoiceLine => self.invoice_lines.clear(),
        }
    }

    /// Company owning a comment target.
    fn target_company(&self, target: &CommentTarget) -> Result<Uuid, SeedError> {
        let company_id = match target {
            CommentTarget::ClientTask(id) => self.client_tasks.require(*id)?.company_id,
            CommentTarget::TaskStage(id) => self.task_stages.require(*id)?.company_id,
            CommentTarget::UserTask(id) => self.user_tasks.require(*id)?.company_id,
        };
        Ok(company_id)
    }
}

/// Point-in-time copy of every table, in creation order.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub companies: Vec<Record<NewCompany>>,
    pub roles: Vec<Record<NewRole>>,
    pub groups: Vec<Record<NewGroup>>,
    pub users: Vec<Record<NewUser>>,
    pub payment_preferences: Vec<Record<NewUserPaymentPreference>>,
    pub client_groups: Vec<Record<NewClientGroup>>,
    pub clients: Vec<Record<NewClient>>,
    pub task_lists: Vec<Record<NewTaskList>>,
    pub client_tasks: Vec<Record<NewClientTask>>,
    pub task_stages: Vec<Record<NewTaskStage>>,
    pub user_tasks: Vec<Record<NewUserTask>>,
    pub time_logs: Vec<Record<NewTimeLog>>,
    pub task_notes: Vec<Record<NewTaskNote>>,
    pub task_comments: Vec<Record<NewTaskComment>>,
    pub currency_rates: Vec<Record<NewCurrencyRate>>,
    pub monthly_invoices: Vec<Record<NewMonthlyInvoice>>,
    pub invoice_lines: Vec<Record<NewMonthlyInvoiceLine>>,
}

/// Store keeping all rows in memory.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::new()),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies out every table for inspection.
    pub fn snapshot(&self) -> MemorySnapshot {
        let t = self.tables();
        MemorySnapshot {
            companies: t.companies.snapshot(),
            roles: t.roles.snapshot(),
            groups: t.groups.snapshot(),
            users: t.users.snapshot(),
            payment_preferences: t.payment_preferences.snapshot(),
            client_groups: t.client_groups.snapshot(),
            clients: t.clients.snapshot(),
            task_lists: t.task_lists.snapshot(),
            client_tasks: t.client_tasks.snapshot(),
            task_stages: t.task_stages.snapshot(),
            user_tasks: t.user_tasks.snapshot(),
            time_logs: t.time_logs.snapshot(),
            task_notes: t.task_notes.snapshot(),
            task_comments: t.task_comments.snapshot(),
            currency_rates: t.currency_rates.snapshot(),
            monthly_invoices: t.monthly_invoices.snapshot(),
            invoice_lines: t.invoice_lines.snapshot(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_company(&self, company: &NewCompany) -> Result<Record<NewCompany>, SeedError> {
        let mut t = self.tables();
        if t.companies.iter().any(|c| c.email == company.email) {
            return Err(SeedError::Duplicate {
                kind: EntityKind::Company,
                key: company.email.clone(),
            });
        }
        Ok(t.companies.insert(company.clone()))
    }

    async fn insert_role(&self, role: &NewRole) -> Result<Record<NewRole>, SeedError> {
        let mut t = self.tables();
        t.companies.require(role.company_id)?;
        Ok(t.roles.insert(role.clone()))
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Record<NewGroup>, SeedError> {
        let mut t = self.tables();
        t.companies.require(group.company_id)?;
        let role = t.roles.require(group.role_id)?;
        same_tenant(EntityKind::Role, role.id, role.company_id, group.company_id)?;
        Ok(t.groups.insert(group.clone()))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Record<NewUser>, SeedError> {
        let mut t = self.tables();
        t.companies.require(user.company_id)?;
        let group = t.groups.require(user.group_id)?;
        same_tenant(EntityKind::Group, group.id, group.company_id, user.company_id)?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(SeedError::Duplicate {
                kind: EntityKind::User,
                key: user.email.clone(),
            });
        }
        Ok(t.users.insert(user.clone()))
    }

    async fn insert_payment_preference(
        &self,
        preference: &NewUserPaymentPreference,
    ) -> Result<Record<NewUserPaymentPreference>, SeedError> {
        let mut t = self.tables();
        t.users.require(preference.user_id)?;
        if t
            .payment_preferences
            .iter()
            .any(|p| p.user_id == preference.user_id)
        {
            return Err(SeedError::Duplicate {
                kind: EntityKind::UserPaymentPreference,
                key: preference.user_id.to_string(),
            });
        }
        Ok(t.payment_preferences.insert(preference.clone()))
    }

    async fn insert_client_group(
        &self,
        group: &NewClientGroup,
    ) -> Result<Record<NewClientGroup>, SeedError> {
        let mut t = self.tables();
        t.companies.require(group.company_id)?;
        Ok(t.client_groups.insert(group.clone()))
    }

    async fn insert_client(&self, client: &NewClient) -> Result<Record<NewClient>, SeedError> {
        let mut t = self.tables();
        t.companies.require(client.company_id)?;
        let group = t.client_groups.require(client.client_group_id)?;
        same_tenant(
            EntityKind::ClientGroup,
            group.id,
            group.company_id,
            client.company_id,
        )?;
        Ok(t.clients.insert(client.clone()))
    }

    async fn insert_task_list(&self, list: &NewTaskList) -> Result<Record<NewTaskList>, SeedError> {
        let mut t = self.tables();
        t.companies.require(list.company_id)?;
        let client = t.clients.require(list.client_id)?;
        same_tenant(EntityKind::Client, client.id, client.company_id, list.company_id)?;
        Ok(t.task_lists.insert(list.clone()))
    }

    async fn insert_client_task(
        &self,
        task: &NewClientTask,
    ) -> Result<Record<NewClientTask>, SeedError> {
        let mut t = self.tables();
        t.companies.require(task.company_id)?;
        let client = t.clients.require(task.client_id)?;
        same_tenant(EntityKind::Client, client.id, client.company_id, task.company_id)?;
        let list = t.task_lists.require(task.list_id)?;
        same_tenant(EntityKind::TaskList, list.id, list.company_id, task.company_id)?;
        if list.client_id != task.client_id {
            return Err(SeedError::ParentMismatch {
                kind: EntityKind::TaskList,
                id: list.id,
                parent: EntityKind::Client,
            });
        }
        let creator = t.users.require(task.created_by_id)?;
        same_tenant(EntityKind::User, creator.id, creator.company_id, task.company_id)?;
        Ok(t.client_tasks.insert(task.clone()))
    }

    async fn insert_task_stage(
        &self,
        stage: &NewTaskStage,
    ) -> Result<Record<NewTaskStage>, SeedError> {
        let mut t = self.tables();
        t.companies.require(stage.company_id)?;
        let task = t.client_tasks.require(stage.client_task_id)?;
        same_tenant(EntityKind::ClientTask, task.id, task.company_id, stage.company_id)?;
        let group = t.groups.require(stage.group_id)?;
        same_tenant(EntityKind::Group, group.id, group.company_id, stage.company_id)?;
        Ok(t.task_stages.insert(stage.clone()))
    }

    async fn insert_user_task(&self, task: &NewUserTask) -> Result<Record<NewUserTask>, SeedError> {
        let mut t = self.tables();
        t.companies.require(task.company_id)?;
        let parent = t.client_tasks.require(task.client_task_id)?;
        same_tenant(EntityKind::ClientTask, parent.id, parent.company_id, task.company_id)?;
        let stage = t.task_stages.require(task.task_stage_id)?;
        same_tenant(EntityKind::TaskStage, stage.id, stage.company_id, task.company_id)?;
        if stage.client_task_id != task.client_task_id {
            return Err(SeedError::ParentMismatch {
                kind: EntityKind::TaskStage,
                id: stage.id,
                parent: EntityKind::ClientTask,
            });
        }
        for user_id in [task.assigned_user_id, task.created_by_id] {
            let user = t.users.require(user_id)?;
            same_tenant(EntityKind::User, user.id, user.company_id, task.company_id)?;
        }
        Ok(t.user_tasks.insert(task.clone()))
    }

    async fn insert_time_log(&self, log: &NewTimeLog) -> Result<Record<NewTimeLog>, SeedError> {
        let mut t = self.tables();
        let task = t.user_tasks.require(log.user_task_id)?;
        let user = t.users.require(log.user_id)?;
        same_tenant(EntityKind::User, user.id, user.company_id, task.company_id)?;
        Ok(t.time_logs.insert(log.clone()))
    }

    async fn insert_task_note(&self, note: &NewTaskNote) -> Result<Record<NewTaskNote>, SeedError> {
        let mut t = self.tables();
        let task = t.user_tasks.require(note.user_task_id)?;
        let user = t.users.require(note.user_id)?;
        same_tenant(EntityKind::User, user.id, user.company_id, task.company_id)?;
        Ok(t.task_notes.insert(note.clone()))
    }

    async fn insert_task_comment(
        &self,
        comment: &NewTaskComment,
    ) -> Result<Record<NewTaskComment>, SeedError> {
        let mut t = self.tables();
        let target_company = t.target_company(&comment.target)?;
        let user = t.users.require(comment.user_id)?;
        same_tenant(EntityKind::User, user.id, user.company_id, target_company)?;
        Ok(t.task_comments.insert(comment.clone()))
    }

    async fn insert_currency_rates(
        &self,
        rates: &[NewCurrencyRate],
    ) -> Result<Vec<Record<NewCurrencyRate>>, SeedError> {
        let mut t = self.tables();
        for rate in rates {
            t.companies.require(rate.company_id)?;
        }
        Ok(rates
            .iter()
            .map(|rate| t.currency_rates.insert(rate.clone()))
            .collect())
    }

    async fn insert_monthly_invoice(
        &self,
        invoice: &NewMonthlyInvoice,
    ) -> Result<Record<NewMonthlyInvoice>, SeedError> {
        let mut t = self.tables();
        t.users.require(invoice.user_id)?;
        Ok(t.monthly_invoices.insert(invoice.clone()))
    }

    async fn insert_invoice_line(
        &self,
        line: &NewMonthlyInvoiceLine,
    ) -> Result<Record<NewMonthlyInvoiceLine>, SeedError> {
        let mut t = self.tables();
        let invoice = t.monthly_invoices.require(line.monthly_invoice_id)?;
        let company_id = t.users.require(invoice.user_id)?.company_id;
        let client = t.clients.require(line.client_id)?;
        same_tenant(EntityKind::Client, client.id, client.company_id, company_id)?;
        let task = t.client_tasks.require(line.task_id)?;
        same_tenant(EntityKind::ClientTask, task.id, task.company_id, company_id)?;
        Ok(t.invoice_lines.insert(line.clone()))
    }

    async fn find_first_group(
        &self,
        company_id: Uuid,
        name_contains: &str,
    ) -> Result<Option<Record<NewGroup>>, SeedError> {
        Ok(self
            .tables()
            .groups
            .first_where(|g| g.company_id == company_id && g.name.contains(name_contains)))
    }

    async fn find_first_client(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClient>>, SeedError> {
        Ok(self
            .tables()
            .clients
            .first_where(|c| c.company_id == company_id))
    }

    async fn find_first_client_task(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClientTask>>, SeedError> {
        Ok(self
            .tables()
            .client_tasks
            .first_where(|task| task.company_id == company_id))
    }

    async fn delete_all(&self, kind: EntityKind) -> Result<u64, SeedError> {
        let mut t = self.tables();
        if let Some(referenced_by) = kind.children().find(|child| t.len(*child) > 0) {
            return Err(SeedError::ForeignKeyViolation {
                kind,
                referenced_by,
            });
        }
        Ok(t.clear(kind))
    }

    async fn count(&self, kind: EntityKind) -> Result<u64, SeedError> {
        Ok(self.tables().len(kind) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard::models::{FinancialInfo, OverallStatus, PermissionMatrix, SubtaskStatus};
    use time::OffsetDateTime;

    fn company(email: &str) -> NewCompany {
        NewCompany {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            company_name: "Acme".to_string(),
            representative: "Jane Doe".to_string(),
            address: "1 Main St".to_string(),
            phone: "555-555-5555".to_string(),
            website: "https://acme.test".to_string(),
        }
    }

    fn role(company_id: Uuid) -> NewRole {
        NewRole {
            company_id,
            name: "Developer".to_string(),
            permissions: PermissionMatrix::new().grant("task", &["trackTime"]),
        }
    }

    /// Company with one user and two clients, the first owning a task list.
    struct Board {
        company_id: Uuid,
        user_id: Uuid,
        clients: [Uuid; 2],
        list_id: Uuid,
    }

    async fn board(store: &MemoryStore) -> Board {
        let company = store.insert_company(&company("a@acme.test")).await.unwrap();
        let role = store.insert_role(&role(company.id)).await.unwrap();
        let group = store
            .insert_group(&NewGroup {
                company_id: company.id,
                role_id: role.id,
                name: "PM Group 1".to_string(),
            })
            .await
            .unwrap();
        let user = store
            .insert_user(&NewUser {
                company_id: company.id,
                group_id: group.id,
                name: "Pat".to_string(),
                email: "pat@acme.test".to_string(),
                password_hash: "hash".to_string(),
                hourly_rate: 50.0,
                currency: "USD".to_string(),
            })
            .await
            .unwrap();
        let client_group = store
            .insert_client_group(&NewClientGroup {
                company_id: company.id,
                name: "Client Group 1".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let mut clients = [Uuid::nil(); 2];
        for slot in clients.iter_mut() {
            let client = store
                .insert_client(&NewClient {
                    company_id: company.id,
                    client_group_id: client_group.id,
                    name: "Client".to_string(),
                    email: "client@acme.test".to_string(),
                    phone: "555-555-5555".to_string(),
                    address: "1 Main St".to_string(),
                    notes: String::new(),
                })
                .await
                .unwrap();
            *slot = client.id;
        }

        let list = store
            .insert_task_list(&NewTaskList {
                company_id: company.id,
                client_id: clients[0],
                name: "List 1".to_string(),
                description: String::new(),
                order_index: 1,
            })
            .await
            .unwrap();

        Board {
            company_id: company.id,
            user_id: user.id,
            clients,
            list_id: list.id,
        }
    }

    fn client_task(board: &Board, client_id: Uuid, order_index: i32) -> NewClientTask {
        NewClientTask {
            company_id: board.company_id,
            client_id,
            list_id: board.list_id,
            title: "Task".to_string(),
            description: String::new(),
            due_date: OffsetDateTime::now_utc(),
            overall_status: OverallStatus::Pending,
            financial_info: FinancialInfo { billing_rate: 75.0 },
            created_by_id: board.user_id,
            order_index,
        }
    }

    #[tokio::test]
    async fn test_group_rejects_role_from_other_company() {
        let store = MemoryStore::new();
        let a = store.insert_company(&company("a@acme.test")).await.unwrap();
        let b = store.insert_company(&company("b@acme.test")).await.unwrap();
        let role_a = store.insert_role(&role(a.id)).await.unwrap();

        let result = store
            .insert_group(&NewGroup {
                company_id: b.id,
                role_id: role_a.id,
                name: "Dev Group 1".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(SeedError::TenantMismatch {
                kind: EntityKind::Role,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_parent_is_rejected() {
        let store = MemoryStore::new();
        let result = store.insert_role(&role(Uuid::new_v4())).await;
        assert!(matches!(
            result,
            Err(SeedError::MissingReference {
                kind: EntityKind::Company,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_company_email() {
        let store = MemoryStore::new();
        store.insert_company(&company("a@acme.test")).await.unwrap();
        let result = store.insert_company(&company("a@acme.test")).await;
        assert!(matches!(result, Err(SeedError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_delete_restricted_while_children_exist() {
        let store = MemoryStore::new();
        let a = store.insert_company(&company("a@acme.test")).await.unwrap();
        store.insert_role(&role(a.id)).await.unwrap();

        let result = store.delete_all(EntityKind::Company).await;
        assert!(matches!(
            result,
            Err(SeedError::ForeignKeyViolation {
                kind: EntityKind::Company,
                referenced_by: EntityKind::Role,
            })
        ));

        assert_eq!(store.delete_all(EntityKind::Role).await.unwrap(), 1);
        assert_eq!(store.delete_all(EntityKind::Company).await.unwrap(), 1);
        assert_eq!(store.count(EntityKind::Company).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_first_group_uses_creation_order() {
        let store = MemoryStore::new();
        let a = store.insert_company(&company("a@acme.test")).await.unwrap();
        let r = store.insert_role(&role(a.id)).await.unwrap();
        for name in ["PM Group 1", "Dev Group 1", "Dev Group 2"] {
            store
                .insert_group(&NewGroup {
                    company_id: a.id,
                    role_id: r.id,
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }

        let found = store.find_first_group(a.id, "Dev Group").await.unwrap();
        assert_eq!(found.unwrap().name, "Dev Group 1");

        let other = store
            .find_first_group(Uuid::new_v4(), "Dev Group")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_client_task_list_must_belong_to_client() {
        let store = MemoryStore::new();
        let board = board(&store).await;

        let result = store
            .insert_client_task(&client_task(&board, board.clients[1], 1))
            .await;
        assert!(matches!(
            result,
            Err(SeedError::ParentMismatch {
                kind: EntityKind::TaskList,
                parent: EntityKind::Client,
                ..
            })
        ));

        store
            .insert_client_task(&client_task(&board, board.clients[0], 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_user_task_stage_must_belong_to_task() {
        let store = MemoryStore::new();
        let board = board(&store).await;
        let first = store
            .insert_client_task(&client_task(&board, board.clients[0], 1))
            .await
            .unwrap();
        let second = store
            .insert_client_task(&client_task(&board, board.clients[0], 2))
            .await
            .unwrap();
        let group = store
            .find_first_group(board.company_id, "PM Group")
            .await
            .unwrap()
            .unwrap();
        let stage = store
            .insert_task_stage(&NewTaskStage {
                company_id: board.company_id,
                client_task_id: first.id,
                group_id: group.id,
                name: "Design".to_string(),
                description: String::new(),
                order_index: 1,
            })
            .await
            .unwrap();

        let subtask = |client_task_id| NewUserTask {
            client_task_id,
            company_id: board.company_id,
            assigned_user_id: board.user_id,
            created_by_id: board.user_id,
            task_stage_id: stage.id,
            title: "Subtask 1 for Design".to_string(),
            description: String::new(),
            status: SubtaskStatus::ToDo,
            order_index: 1,
        };

        let result = store.insert_user_task(&subtask(second.id)).await;
        assert!(matches!(
            result,
            Err(SeedError::ParentMismatch {
                kind: EntityKind::TaskStage,
                parent: EntityKind::ClientTask,
                ..
            })
        ));
        store.insert_user_task(&subtask(first.id)).await.unwrap();
    }
}
