//! Tenant-level generation: companies, roles, members, payment preferences.

use serde_json::json;
use uuid::Uuid;

use taskboard::models::{
    NewCompany, NewGroup, NewRole, NewUser, NewUserPaymentPreference, PaymentMethod,
    PermissionMatrix, Record,
};

use super::FakeData;
use crate::config::{FixtureConfig, RateBand};

/// Name and permission set of a role created for every company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub permissions: PermissionMatrix,
}

impl RoleTemplate {
    pub fn project_manager() -> Self {
        Self {
            name: "Project Manager",
            permissions: PermissionMatrix::new()
                .grant(
                    "board",
                    &["create", "viewAll", "update", "archive", "reorder"],
                )
                .grant("list", &["create", "update", "archive", "reorder"])
                .grant("task", &["assign", "trackTime"])
                .grant("client", &["manage", "view"]),
        }
    }

    pub fn developer() -> Self {
        Self {
            name: "Developer",
            permissions: PermissionMatrix::new().grant("task", &["trackTime"]),
        }
    }
}

/// Seniority band of a company member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTier {
    ProjectManager,
    Developer,
}

impl MemberTier {
    pub fn role(&self) -> RoleTemplate {
        match self {
            MemberTier::ProjectManager => RoleTemplate::project_manager(),
            MemberTier::Developer => RoleTemplate::developer(),
        }
    }

    /// Prefix of the one-member group created alongside each user.
    pub fn group_prefix(&self) -> &'static str {
        match self {
            MemberTier::ProjectManager => "PM Group",
            MemberTier::Developer => "Dev Group",
        }
    }

    fn email_prefix(&self) -> &'static str {
        match self {
            MemberTier::ProjectManager => "pm",
            MemberTier::Developer => "dev",
        }
    }

    pub fn hourly_rate(&self, config: &FixtureConfig) -> RateBand {
        match self {
            MemberTier::ProjectManager => config.pm_hourly_rate,
            MemberTier::Developer => config.dev_hourly_rate,
        }
    }

    pub fn count(&self, config: &FixtureConfig) -> usize {
        match self {
            MemberTier::ProjectManager => config.pm_users,
            MemberTier::Developer => config.dev_users,
        }
    }
}

/// Generates companies and their members.
pub struct TenantGenerator<'a> {
    config: &'a FixtureConfig,
}

impl<'a> TenantGenerator<'a> {
    pub fn new(config: &'a FixtureConfig) -> Self {
        Self { config }
    }

    /// Generates the `ordinal`-th company (1-based).
    pub fn company(&self, ordinal: usize, password_hash: String, fake: &mut FakeData) -> NewCompany {
        let last_name = fake.last_name();
        NewCompany {
            email: fake.email_for(&format!("company{ordinal}"), &last_name),
            password_hash,
            company_name: fake.company_name(),
            representative: fake.person_name(),
            address: fake.street_address(),
            phone: fake.phone(),
            website: fake.website(),
        }
    }

    pub fn role(&self, company_id: Uuid, template: &RoleTemplate) -> NewRole {
        NewRole {
            company_id,
            name: template.name.to_string(),
            permissions: template.permissions.clone(),
        }
    }

    pub fn group(&self, company_id: Uuid, role_id: Uuid, tier: MemberTier, ordinal: usize) -> NewGroup {
        NewGroup {
            company_id,
            role_id,
            name: format!("{} {ordinal}", tier.group_prefix()),
        }
    }

    /// Generates the `ordinal`-th member of `tier`, bound to `group_id`.
    pub fn member(
        &self,
        company: &Record<NewCompany>,
        group_id: Uuid,
        tier: MemberTier,
        ordinal: usize,
        password_hash: String,
        fake: &mut FakeData,
    ) -> NewUser {
        let band = tier.hourly_rate(self.config);
        NewUser {
            company_id: company.id,
            group_id,
            name: fake.person_name(),
            email: fake.email_for(
                &format!("{}{ordinal}", tier.email_prefix()),
                &company.company_name,
            ),
            password_hash,
            hourly_rate: fake.float_in(band.min, band.max, 2),
            currency: self.config.currency.clone(),
        }
    }

    /// PayPal payout to the user's own address.
    pub fn payment_preference(&self, user_id: Uuid, email: &str) -> NewUserPaymentPreference {
        NewUserPaymentPreference {
            user_id,
            method: PaymentMethod::Paypal,
            details: json!({ "email": email }),
        }
    }
}
