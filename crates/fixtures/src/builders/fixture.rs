//! Dependency-ordered fixture builder.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use taskboard::auth::CredentialHasher;
use taskboard::models::{
    CommentTarget, EntityKind, NewCompany, NewRole, NewTaskStage, NewUser, Record,
};

use crate::config::{FanOut, FixtureConfig, SubtaskPlacement};
use crate::db::{SeedError, Store};
use crate::generators::{
    BillingGenerator, FakeData, MemberTier, STAGES, StageOwner, StageTemplate,
    TenantGenerator, WorkGenerator,
};

/// Summary of a build.
#[derive(Debug, Clone, Default)]
pub struct FixtureReport {
    /// Ids of the companies created, in creation order.
    pub companies: Vec<Uuid>,
    /// Rows created per kind.
    pub created: BTreeMap<EntityKind, u64>,
    /// Wall-clock time of the build (milliseconds).
    pub elapsed_ms: u64,
}

impl FixtureReport {
    fn record(&mut self, kind: EntityKind) {
        self.record_many(kind, 1);
    }

    fn record_many(&mut self, kind: EntityKind, count: usize) {
        *self.created.entry(kind).or_default() += count as u64;
    }

    /// Rows of `kind` created by the build.
    pub fn count(&self, kind: EntityKind) -> u64 {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.created.values().sum()
    }
}

/// Per-company values every downstream row is built against.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub company_id: Uuid,
    /// First project manager; receives every single-assignee association.
    pub owner: Record<NewUser>,
    /// First group whose name marks it as a developer group.
    pub dev_group_id: Uuid,
}

impl TenantContext {
    fn stage_group(&self, owner: StageOwner) -> Uuid {
        match owner {
            StageOwner::ActingOwner => self.owner.group_id,
            StageOwner::DeveloperGroup => self.dev_group_id,
        }
    }
}

/// A pending row in the client/task hierarchy, carrying the ids its row needs.
#[derive(Debug, Clone)]
enum WorkNode {
    ClientGroup {
        ordinal: usize,
    },
    Client {
        client_group_id: Uuid,
    },
    TaskList {
        client_id: Uuid,
        ordinal: usize,
    },
    ClientTask {
        client_id: Uuid,
        list_id: Uuid,
        ordinal: usize,
    },
    TaskStage {
        client_task_id: Uuid,
        template: StageTemplate,
        ordinal: usize,
    },
    UserTask {
        stage: Record<NewTaskStage>,
        ordinal: usize,
    },
}

impl WorkNode {
    /// Top level of the hierarchy for one company.
    fn roots(fan_out: &FanOut) -> Vec<WorkNode> {
        (1..=fan_out.client_groups)
            .map(|ordinal| WorkNode::ClientGroup { ordinal })
            .collect()
    }
}

/// Builder for populating a store with a complete multi-tenant fixture set.
///
/// # Example
///
/// ```rust,ignore
/// let report = FixtureBuilder::new()
///     .with_companies(1)
///     .with_users(2, 5)
///     .with_seed(42)
///     .build(&store, &Argon2Hasher)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureBuilder {
    config: FixtureConfig,
}

impl FixtureBuilder {
    /// Creates a builder with the default volumes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: FixtureConfig) -> Self {
        Self { config }
    }

    /// Sets the number of companies.
    pub fn with_companies(mut self, count: usize) -> Self {
        self.config.companies = count;
        self
    }

    /// Sets project manager and developer users per company.
    pub fn with_users(mut self, pm: usize, dev: usize) -> Self {
        self.config.pm_users = pm;
        self.config.dev_users = dev;
        self
    }

    /// Sets the client hierarchy fan-out: groups, clients per group, lists per
    /// client and tasks per list.
    pub fn with_hierarchy(mut self, groups: usize, clients: usize, lists: usize, tasks: usize) -> Self {
        self.config.client_groups = groups;
        self.config.clients_per_group = clients;
        self.config.lists_per_client = lists;
        self.config.tasks_per_list = tasks;
        self
    }

    pub fn with_subtasks(mut self, per_stage: usize, placement: SubtaskPlacement) -> Self {
        self.config.subtasks_per_stage = per_stage;
        self.config.subtask_placement = placement;
        self
    }

    pub fn with_invoice_lines(mut self, count: usize) -> Self {
        self.config.invoice_lines = count;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Creates every company with its full graph, one row at a time.
    ///
    /// Each row is written only after all rows it references exist. The first
    /// failure aborts the build; rows written before it stay in the store.
    pub async fn build(
        &self,
        store: &dyn Store,
        hasher: &dyn CredentialHasher,
    ) -> Result<FixtureReport, SeedError> {
        self.config.validate()?;

        let start = Instant::now();
        let mut fake = FakeData::new(self.config.seed);
        let mut report = FixtureReport::default();

        for ordinal in 1..=self.config.companies {
            let company_id = self
                .build_company(ordinal, store, hasher, &mut fake, &mut report)
                .await?;
            report.companies.push(company_id);
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Built {} companies ({} rows) in {}ms",
            report.companies.len(),
            report.total(),
            report.elapsed_ms
        );
        Ok(report)
    }

    async fn build_company(
        &self,
        ordinal: usize,
        store: &dyn Store,
        hasher: &dyn CredentialHasher,
        fake: &mut FakeData,
        report: &mut FixtureReport,
    ) -> Result<Uuid, SeedError> {
        let tenant_gen = TenantGenerator::new(&self.config);

        let password_hash = hasher.hash(&self.config.company_password).await?;
        let company = store
            .insert_company(&tenant_gen.company(ordinal, password_hash, fake))
            .await?;
        report.record(EntityKind::Company);
        info!(
            "Seeding company {}/{}: {}",
            ordinal, self.config.companies, company.company_name
        );

        let pm_role = store
            .insert_role(&tenant_gen.role(company.id, &MemberTier::ProjectManager.role()))
            .await?;
        let dev_role = store
            .insert_role(&tenant_gen.role(company.id, &MemberTier::Developer.role()))
            .await?;
        report.record_many(EntityKind::Role, 2);

        let pm_users = self
            .create_members(store, hasher, &company, &pm_role, MemberTier::ProjectManager, fake, report)
            .await?;
        self.create_members(store, hasher, &company, &dev_role, MemberTier::Developer, fake, report)
            .await?;

        let owner = pm_users
            .into_iter()
            .next()
            .ok_or(SeedError::RowNotFound {
                kind: EntityKind::User,
                company_id: company.id,
            })?;
        let dev_group = store
            .find_first_group(company.id, MemberTier::Developer.group_prefix())
            .await?
            .ok_or(SeedError::RowNotFound {
                kind: EntityKind::Group,
                company_id: company.id,
            })?;

        let ctx = TenantContext {
            company_id: company.id,
            owner,
            dev_group_id: dev_group.id,
        };

        store
            .insert_payment_preference(
                &tenant_gen.payment_preference(ctx.owner.id, &ctx.owner.email),
            )
            .await?;
        report.record(EntityKind::UserPaymentPreference);

        self.expand_work_tree(&ctx, store, fake, report).await?;
        self.create_billing(&ctx, store, fake, report).await?;

        Ok(company.id)
    }

    /// Creates `tier`'s users, each with its own group bound to `role`.
    #[allow(clippy::too_many_arguments)]
    async fn create_members(
        &self,
        store: &dyn Store,
        hasher: &dyn CredentialHasher,
        company: &Record<NewCompany>,
        role: &Record<NewRole>,
        tier: MemberTier,
        fake: &mut FakeData,
        report: &mut FixtureReport,
    ) -> Result<Vec<Record<NewUser>>, SeedError> {
        let tenant_gen = TenantGenerator::new(&self.config);
        let count = tier.count(&self.config);
        let mut users = Vec::with_capacity(count);

        for ordinal in 1..=count {
            let group = store
                .insert_group(&tenant_gen.group(company.id, role.id, tier, ordinal))
                .await?;
            let password_hash = hasher.hash(&self.config.user_password).await?;
            let user = store
                .insert_user(&tenant_gen.member(company, group.id, tier, ordinal, password_hash, fake))
                .await?;
            users.push(user);
        }

        report.record_many(EntityKind::Group, count);
        report.record_many(EntityKind::User, count);
        debug!("  Created {} {:?} users", count, tier);
        Ok(users)
    }

    /// Walks the client/task hierarchy depth-first.
    ///
    /// Children are pushed in reverse so siblings pop in ordinal order, which gives
    /// the same creation order as nested loops over the fan-out table.
    async fn expand_work_tree(
        &self,
        ctx: &TenantContext,
        store: &dyn Store,
        fake: &mut FakeData,
        report: &mut FixtureReport,
    ) -> Result<(), SeedError> {
        let fan_out = self.config.fan_out();
        let mut stack = WorkNode::roots(&fan_out);
        stack.reverse();

        while let Some(node) = stack.pop() {
            let children = self
                .expand_node(node, ctx, &fan_out, store, fake, report)
                .await?;
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }

    /// Creates the row for `node` and returns the nodes for its children.
    async fn expand_node(
        &self,
        node: WorkNode,
        ctx: &TenantContext,
        fan_out: &FanOut,
        store: &dyn Store,
        fake: &mut FakeData,
        report: &mut FixtureReport,
    ) -> Result<Vec<WorkNode>, SeedError> {
        let work_gen = WorkGenerator::new();

        let children = match node {
            WorkNode::ClientGroup { ordinal } => {
                let group = store
                    .insert_client_group(&work_gen.client_group(ctx.company_id, ordinal, fake))
                    .await?;
                report.record(EntityKind::ClientGroup);
                info!(
                    "  Client group {}/{} ({} client tasks so far)",
                    ordinal,
                    fan_out.client_groups,
                    report.count(EntityKind::ClientTask)
                );

                (1..=fan_out.clients_per_group)
                    .map(|_| WorkNode::Client {
                        client_group_id: group.id,
                    })
                    .collect()
            }
            WorkNode::Client { client_group_id } => {
                let client = store
                    .insert_client(&work_gen.client(ctx.company_id, client_group_id, fake))
                    .await?;
                report.record(EntityKind::Client);
                debug!("    Client {}", client.name);

                (1..=fan_out.lists_per_client)
                    .map(|ordinal| WorkNode::TaskList {
                        client_id: client.id,
                        ordinal,
                    })
                    .collect()
            }
            WorkNode::TaskList { client_id, ordinal } => {
                let list = store
                    .insert_task_list(&work_gen.task_list(ctx.company_id, client_id, ordinal, fake))
                    .await?;
                report.record(EntityKind::TaskList);

                (1..=fan_out.tasks_per_list)
                    .map(|ordinal| WorkNode::ClientTask {
                        client_id,
                        list_id: list.id,
                        ordinal,
                    })
                    .collect()
            }
            WorkNode::ClientTask {
                client_id,
                list_id,
                ordinal,
            } => {
                let task = store
                    .insert_client_task(&work_gen.client_task(
                        ctx.company_id,
                        client_id,
                        list_id,
                        ctx.owner.id,
                        ordinal,
                        fake,
                    ))
                    .await?;
                report.record(EntityKind::ClientTask);

                STAGES
                    .iter()
                    .take(fan_out.stages_per_task)
                    .enumerate()
                    .map(|(index, template)| WorkNode::TaskStage {
                        client_task_id: task.id,
                        template: *template,
                        ordinal: index + 1,
                    })
                    .collect()
            }
            WorkNode::TaskStage {
                client_task_id,
                template,
                ordinal,
            } => {
                let stage = store
                    .insert_task_stage(&work_gen.task_stage(
                        ctx.company_id,
                        client_task_id,
                        ctx.stage_group(template.owner),
                        &template,
                        ordinal,
                        fake,
                    ))
                    .await?;
                report.record(EntityKind::TaskStage);

                (1..=fan_out.subtasks_for_stage(ordinal))
                    .map(|ordinal| WorkNode::UserTask {
                        stage: stage.clone(),
                        ordinal,
                    })
                    .collect()
            }
            WorkNode::UserTask { stage, ordinal } => {
                let owner_id = ctx.owner.id;
                let subtask = store
                    .insert_user_task(&work_gen.user_task(&stage, stage.id, owner_id, ordinal, fake))
                    .await?;
                store
                    .insert_time_log(&work_gen.time_log(subtask.id, owner_id, fake))
                    .await?;
                store
                    .insert_task_note(&work_gen.task_note(subtask.id, owner_id, fake))
                    .await?;
                store
                    .insert_task_comment(&work_gen.task_comment(
                        CommentTarget::UserTask(subtask.id),
                        owner_id,
                        fake,
                    ))
                    .await?;
                report.record(EntityKind::UserTask);
                report.record(EntityKind::TimeLog);
                report.record(EntityKind::TaskNote);
                report.record(EntityKind::TaskComment);

                Vec::new()
            }
        };

        Ok(children)
    }

    /// Currency rates and the acting owner's invoice.
    async fn create_billing(
        &self,
        ctx: &TenantContext,
        store: &dyn Store,
        fake: &mut FakeData,
        report: &mut FixtureReport,
    ) -> Result<(), SeedError> {
        let billing_gen = BillingGenerator::new(&self.config);

        let rates = store
            .insert_currency_rates(&billing_gen.currency_rates(ctx.company_id))
            .await?;
        report.record_many(EntityKind::CurrencyRate, rates.len());

        let invoice = store
            .insert_monthly_invoice(&billing_gen.monthly_invoice(ctx.owner.id))
            .await?;
        report.record(EntityKind::MonthlyInvoice);

        let client = store
            .find_first_client(ctx.company_id)
            .await?
            .ok_or(SeedError::RowNotFound {
                kind: EntityKind::Client,
                company_id: ctx.company_id,
            })?;
        let task = store
            .find_first_client_task(ctx.company_id)
            .await?
            .ok_or(SeedError::RowNotFound {
                kind: EntityKind::ClientTask,
                company_id: ctx.company_id,
            })?;

        for _ in 0..self.config.invoice_lines {
            store
                .insert_invoice_line(&billing_gen.invoice_line(
                    invoice.id,
                    client.id,
                    task.id,
                    &ctx.owner,
                    fake,
                ))
                .await?;
        }
        report.record_many(EntityKind::MonthlyInvoiceLine, self.config.invoice_lines);

        Ok(())
    }
}
