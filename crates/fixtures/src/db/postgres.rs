//! Postgres-backed store.
//!
//! Expects the taskboard schema to exist already: one table per
//! [`EntityKind::table_name`], `uuid` primary keys defaulting to
//! `gen_random_uuid()`, and a `created_at` column defaulting to `NOW()` that orders
//! "first" lookups.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use taskboard::models::{
    EntityKind, FinancialInfo, NewClient, NewClientGroup, NewClientTask, NewCompany,
    NewCurrencyRate, NewGroup, NewMonthlyInvoice, NewMonthlyInvoiceLine, NewRole, NewTaskComment,
    NewTaskList, NewTaskNote, NewTaskStage, NewTimeLog, NewUser, NewUserPaymentPreference,
    NewUserTask, OverallStatus, Record,
};

use super::{SeedError, Store};

/// Store writing each row with its own statement against a connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new store with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_company(&self, company: &NewCompany) -> Result<Record<NewCompany>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO companies (email, password_hash, company_name, representative, address, phone, website, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
        )
        .bind(&company.email)
        .bind(&company.password_hash)
        .bind(&company.company_name)
        .bind(&company.representative)
        .bind(&company.address)
        .bind(&company.phone)
        .bind(&company.website)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, company.clone()))
    }

    async fn insert_role(&self, role: &NewRole) -> Result<Record<NewRole>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO roles (company_id, name, permissions, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(role.company_id)
        .bind(&role.name)
        .bind(Json(&role.permissions))
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, role.clone()))
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Record<NewGroup>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO "groups" (company_id, role_id, name, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(group.company_id)
        .bind(group.role_id)
        .bind(&group.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, group.clone()))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Record<NewUser>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (company_id, group_id, name, email, password_hash, hourly_rate, currency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
        )
        .bind(user.company_id)
        .bind(user.group_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.hourly_rate)
        .bind(&user.currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, user.clone()))
    }

    async fn insert_payment_preference(
        &self,
        preference: &NewUserPaymentPreference,
    ) -> Result<Record<NewUserPaymentPreference>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO user_payment_preferences (user_id, method, details, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(preference.user_id)
        .bind(preference.method.as_str())
        .bind(Json(&preference.details))
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, preference.clone()))
    }

    async fn insert_client_group(
        &self,
        group: &NewClientGroup,
    ) -> Result<Record<NewClientGroup>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO client_groups (company_id, name, description, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(group.company_id)
        .bind(&group.name)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, group.clone()))
    }

    async fn insert_client(&self, client: &NewClient) -> Result<Record<NewClient>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO clients (company_id, client_group_id, name, email, phone, address, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
        )
        .bind(client.company_id)
        .bind(client.client_group_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, client.clone()))
    }

    async fn insert_task_list(&self, list: &NewTaskList) -> Result<Record<NewTaskList>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO task_lists (company_id, client_id, name, description, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id
            "#,
        )
        .bind(list.company_id)
        .bind(list.client_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, list.clone()))
    }

    async fn insert_client_task(
        &self,
        task: &NewClientTask,
    ) -> Result<Record<NewClientTask>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO client_tasks (
                company_id, client_id, list_id, title, description,
                due_date, overall_status, financial_info, created_by_id, order_index,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING id
            "#,
        )
        .bind(task.company_id)
        .bind(task.client_id)
        .bind(task.list_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.overall_status.as_str())
        .bind(Json(&task.financial_info))
        .bind(task.created_by_id)
        .bind(task.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, task.clone()))
    }

    async fn insert_task_stage(
        &self,
        stage: &NewTaskStage,
    ) -> Result<Record<NewTaskStage>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO task_stages (company_id, client_task_id, group_id, name, description, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id
            "#,
        )
        .bind(stage.company_id)
        .bind(stage.client_task_id)
        .bind(stage.group_id)
        .bind(&stage.name)
        .bind(&stage.description)
        .bind(stage.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, stage.clone()))
    }

    async fn insert_user_task(&self, task: &NewUserTask) -> Result<Record<NewUserTask>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO user_tasks (
                client_task_id, company_id, assigned_user_id, created_by_id, task_stage_id,
                title, description, status, order_index, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING id
            "#,
        )
        .bind(task.client_task_id)
        .bind(task.company_id)
        .bind(task.assigned_user_id)
        .bind(task.created_by_id)
        .bind(task.task_stage_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, task.clone()))
    }

    async fn insert_time_log(&self, log: &NewTimeLog) -> Result<Record<NewTimeLog>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO time_logs (user_task_id, user_id, hours, notes, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(log.user_task_id)
        .bind(log.user_id)
        .bind(log.hours)
        .bind(&log.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, log.clone()))
    }

    async fn insert_task_note(&self, note: &NewTaskNote) -> Result<Record<NewTaskNote>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO task_notes (user_task_id, user_id, note, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(note.user_task_id)
        .bind(note.user_id)
        .bind(&note.note)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, note.clone()))
    }

    async fn insert_task_comment(
        &self,
        comment: &NewTaskComment,
    ) -> Result<Record<NewTaskComment>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO task_comments (task_type, task_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(comment.target.type_tag())
        .bind(comment.target.id())
        .bind(comment.user_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, comment.clone()))
    }

    async fn insert_currency_rates(
        &self,
        rates: &[NewCurrencyRate],
    ) -> Result<Vec<Record<NewCurrencyRate>>, SeedError> {
        let mut created = Vec::with_capacity(rates.len());

        for rate in rates {
            let id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO currency_rates (company_id, currency, rate, created_at)
                VALUES ($1, $2, $3, NOW())
                RETURNING id
                "#,
            )
            .bind(rate.company_id)
            .bind(&rate.currency)
            .bind(rate.rate)
            .fetch_one(&self.pool)
            .await?;

            created.push(Record::new(id, rate.clone()));
        }

        Ok(created)
    }

    async fn insert_monthly_invoice(
        &self,
        invoice: &NewMonthlyInvoice,
    ) -> Result<Record<NewMonthlyInvoice>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO monthly_invoices (user_id, period_start, period_end, total_amount, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(invoice.user_id)
        .bind(invoice.period_start)
        .bind(invoice.period_end)
        .bind(invoice.total_amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, invoice.clone()))
    }

    async fn insert_invoice_line(
        &self,
        line: &NewMonthlyInvoiceLine,
    ) -> Result<Record<NewMonthlyInvoiceLine>, SeedError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO monthly_invoice_lines (
                monthly_invoice_id, client_id, task_id, task_link, note,
                time_spent, hourly_rate, currency, total, finished_at,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING id
            "#,
        )
        .bind(line.monthly_invoice_id)
        .bind(line.client_id)
        .bind(line.task_id)
        .bind(&line.task_link)
        .bind(&line.note)
        .bind(line.time_spent)
        .bind(line.hourly_rate)
        .bind(&line.currency)
        .bind(line.total)
        .bind(line.finished_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record::new(id, line.clone()))
    }

    async fn find_first_group(
        &self,
        company_id: Uuid,
        name_contains: &str,
    ) -> Result<Option<Record<NewGroup>>, SeedError> {
        let row: Option<(Uuid, Uuid, Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, company_id, role_id, name
            FROM "groups"
            WHERE company_id = $1 AND strpos(name, $2) > 0
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(name_contains)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, company_id, role_id, name)| {
            Record::new(
                id,
                NewGroup {
                    company_id,
                    role_id,
                    name,
                },
            )
        }))
    }

    async fn find_first_client(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClient>>, SeedError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, client_group_id, name, email, phone, address, notes
            FROM clients
            WHERE company_id = $1
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Record::new(
            row.try_get("id")?,
            NewClient {
                company_id: row.try_get("company_id")?,
                client_group_id: row.try_get("client_group_id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                address: row.try_get("address")?,
                notes: row.try_get("notes")?,
            },
        )))
    }

    async fn find_first_client_task(
        &self,
        company_id: Uuid,
    ) -> Result<Option<Record<NewClientTask>>, SeedError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, client_id, list_id, title, description,
                   due_date, overall_status, financial_info, created_by_id, order_index
            FROM client_tasks
            WHERE company_id = $1
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.try_get("overall_status")?;
        let overall_status: OverallStatus = status
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let Json(financial_info): Json<FinancialInfo> = row.try_get("financial_info")?;

        Ok(Some(Record::new(
            row.try_get("id")?,
            NewClientTask {
                company_id: row.try_get("company_id")?,
                client_id: row.try_get("client_id")?,
                list_id: row.try_get("list_id")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                due_date: row.try_get("due_date")?,
                overall_status,
                financial_info,
                created_by_id: row.try_get("created_by_id")?,
                order_index: row.try_get("order_index")?,
            },
        )))
    }

    async fn delete_all(&self, kind: EntityKind) -> Result<u64, SeedError> {
        // Table names come from a closed enum, never from input.
        let sql = format!("DELETE FROM \"{}\"", kind.table_name());
        let result = sqlx::query(&sql).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, kind: EntityKind) -> Result<u64, SeedError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", kind.table_name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;

        Ok(count.max(0) as u64)
    }
}
