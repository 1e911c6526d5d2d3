//! Configuration types for fixture generation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::datetime;

use taskboard::models::EntityKind;

use crate::db::SeedError;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "SEED_CONFIG";

/// Inclusive bounds for a randomly drawn amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min: f64,
    pub max: f64,
}

impl RateBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Exchange rate of one currency against the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRate {
    pub currency: String,
    pub rate: f64,
}

/// Billing period covered by the demo invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoicePeriod {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl Default for InvoicePeriod {
    fn default() -> Self {
        Self {
            start: datetime!(2025-04-01 0:00 UTC),
            end: datetime!(2025-04-30 23:59:59 UTC),
        }
    }
}

/// Where subtasks hang within a client task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskPlacement {
    /// All subtasks of a task go under its first stage ("Design").
    #[default]
    FirstStage,
    /// Every stage gets its own set of subtasks.
    EveryStage,
}

/// Children created per parent at each level of the client/task hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    pub client_groups: usize,
    pub clients_per_group: usize,
    pub lists_per_client: usize,
    pub tasks_per_list: usize,
    pub stages_per_task: usize,
    pub subtasks_per_stage: usize,
    pub placement: SubtaskPlacement,
}

impl FanOut {
    /// Subtasks created under the stage at 1-based `stage_index`.
    pub fn subtasks_for_stage(&self, stage_index: usize) -> usize {
        match self.placement {
            SubtaskPlacement::EveryStage => self.subtasks_per_stage,
            SubtaskPlacement::FirstStage if stage_index == 1 => self.subtasks_per_stage,
            SubtaskPlacement::FirstStage => 0,
        }
    }

    pub fn client_tasks(&self) -> usize {
        self.client_groups * self.clients_per_group * self.lists_per_client * self.tasks_per_list
    }

    pub fn subtasks_per_task(&self) -> usize {
        (1..=self.stages_per_task)
            .map(|stage| self.subtasks_for_stage(stage))
            .sum()
    }
}

/// Configuration for a fixture run.
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Number of tenant companies.
    pub companies: usize,
    /// Project manager users per company; the first becomes the acting owner.
    pub pm_users: usize,
    /// Developer users per company.
    pub dev_users: usize,
    pub client_groups: usize,
    pub clients_per_group: usize,
    pub lists_per_client: usize,
    pub tasks_per_list: usize,
    pub subtasks_per_stage: usize,
    pub subtask_placement: SubtaskPlacement,
    /// Lines on each company's demo invoice.
    pub invoice_lines: usize,

    pub pm_hourly_rate: RateBand,
    pub dev_hourly_rate: RateBand,
    /// Currency for user rates; also the base of the currency table (rate 1.0).
    pub currency: String,
    pub cross_rates: Vec<CrossRate>,
    pub invoice_period: InvoicePeriod,
    /// Prefix of the task links written on invoice lines.
    pub task_link_base: String,

    pub company_password: String,
    pub user_password: String,

    /// Random seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            companies: 3,
            pm_users: 10,
            dev_users: 50,
            client_groups: 10,
            clients_per_group: 20,
            lists_per_client: 5,
            tasks_per_list: 20,
            subtasks_per_stage: 3,
            subtask_placement: SubtaskPlacement::default(),
            invoice_lines: 10,
            pm_hourly_rate: RateBand::new(45.0, 60.0),
            dev_hourly_rate: RateBand::new(35.0, 50.0),
            currency: "USD".to_string(),
            cross_rates: vec![
                CrossRate {
                    currency: "EUR".to_string(),
                    rate: 0.85,
                },
                CrossRate {
                    currency: "CAD".to_string(),
                    rate: 1.25,
                },
            ],
            invoice_period: InvoicePeriod::default(),
            task_link_base: "http://localhost:3000".to_string(),
            company_password: "CompanyPass123".to_string(),
            user_password: "UserPass123".to_string(),
            seed: None,
        }
    }
}

impl FixtureConfig {
    /// A few hundred rows; handy for local smoke runs and tests.
    pub fn small() -> Self {
        Self {
            companies: 2,
            pm_users: 2,
            dev_users: 3,
            client_groups: 2,
            clients_per_group: 2,
            lists_per_client: 2,
            tasks_per_list: 2,
            invoice_lines: 3,
            ..Self::default()
        }
    }

    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SeedError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            SeedError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `SEED_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, SeedError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Checks the constraints the builder relies on.
    pub fn validate(&self) -> Result<(), SeedError> {
        if self.pm_users == 0 {
            return Err(SeedError::InvalidConfig(
                "pm_users must be at least 1: the first project manager is the acting owner"
                    .to_string(),
            ));
        }
        for (name, band) in [
            ("pm_hourly_rate", self.pm_hourly_rate),
            ("dev_hourly_rate", self.dev_hourly_rate),
        ] {
            if !(band.min.is_finite() && band.max.is_finite()) || band.min > band.max {
                return Err(SeedError::InvalidConfig(format!(
                    "{name}: min {} must not exceed max {}",
                    band.min, band.max
                )));
            }
        }
        if self.invoice_period.start > self.invoice_period.end {
            return Err(SeedError::InvalidConfig(
                "invoice_period starts after it ends".to_string(),
            ));
        }
        if self.currency.is_empty() {
            return Err(SeedError::InvalidConfig("currency is empty".to_string()));
        }
        Ok(())
    }

    /// Fan-out table for the client/task hierarchy.
    pub fn fan_out(&self) -> FanOut {
        FanOut {
            client_groups: self.client_groups,
            clients_per_group: self.clients_per_group,
            lists_per_client: self.lists_per_client,
            tasks_per_list: self.tasks_per_list,
            stages_per_task: crate::generators::STAGES.len(),
            subtasks_per_stage: self.subtasks_per_stage,
            placement: self.subtask_placement,
        }
    }

    /// Rows of each kind a successful build creates on an empty store.
    pub fn expected_counts(&self) -> BTreeMap<EntityKind, u64> {
        let fan_out = self.fan_out();
        let members = self.pm_users + self.dev_users;
        let clients = self.client_groups * self.clients_per_group;
        let lists = clients * self.lists_per_client;
        let tasks = fan_out.client_tasks();
        let subtasks = tasks * fan_out.subtasks_per_task();

        let per_company = [
            (EntityKind::Company, 1),
            (EntityKind::Role, 2),
            (EntityKind::Group, members),
            (EntityKind::User, members),
            (EntityKind::UserPaymentPreference, 1),
            (EntityKind::ClientGroup, self.client_groups),
            (EntityKind::Client, clients),
            (EntityKind::TaskList, lists),
            (EntityKind::ClientTask, tasks),
            (EntityKind::TaskStage, tasks * fan_out.stages_per_task),
            (EntityKind::UserTask, subtasks),
            (EntityKind::TimeLog, subtasks),
            (EntityKind::TaskNote, subtasks),
            (EntityKind::TaskComment, subtasks),
            (EntityKind::FileAttachment, 0),
            (EntityKind::CurrencyRate, 1 + self.cross_rates.len()),
            (EntityKind::MonthlyInvoice, 1),
            (EntityKind::MonthlyInvoiceLine, self.invoice_lines),
        ];

        per_company
            .into_iter()
            .map(|(kind, count)| (kind, (count * self.companies) as u64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_volumes() {
        let counts = FixtureConfig::default().expected_counts();

        assert_eq!(counts[&EntityKind::Company], 3);
        assert_eq!(counts[&EntityKind::User], 180);
        assert_eq!(counts[&EntityKind::ClientTask], 60_000);
        assert_eq!(counts[&EntityKind::TaskStage], 120_000);
        assert_eq!(counts[&EntityKind::UserTask], 180_000);
        assert_eq!(counts[&EntityKind::TimeLog], 180_000);
        assert_eq!(counts[&EntityKind::TaskNote], 180_000);
        assert_eq!(counts[&EntityKind::TaskComment], 180_000);
        assert_eq!(counts[&EntityKind::CurrencyRate], 9);
        assert_eq!(counts[&EntityKind::MonthlyInvoiceLine], 30);
    }

    #[test]
    fn test_every_stage_placement_doubles_subtasks() {
        let config = FixtureConfig {
            subtask_placement: SubtaskPlacement::EveryStage,
            ..FixtureConfig::default()
        };
        assert_eq!(config.expected_counts()[&EntityKind::UserTask], 360_000);
    }

    #[test]
    fn test_fan_out_first_stage_only() {
        let fan_out = FixtureConfig::default().fan_out();
        assert_eq!(fan_out.stages_per_task, 2);
        assert_eq!(fan_out.subtasks_for_stage(1), 3);
        assert_eq!(fan_out.subtasks_for_stage(2), 0);
        assert_eq!(fan_out.subtasks_per_task(), 3);
    }

    #[test]
    fn test_validate_requires_acting_owner() {
        let config = FixtureConfig {
            pm_users: 0,
            ..FixtureConfig::small()
        };
        assert!(matches!(config.validate(), Err(SeedError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let config = FixtureConfig {
            dev_hourly_rate: RateBand::new(50.0, 35.0),
            ..FixtureConfig::small()
        };
        assert!(config.validate().is_err());
        assert!(FixtureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FixtureConfig =
            serde_json::from_str(r#"{ "companies": 1, "seed": 7, "subtask_placement": "every_stage" }"#)
                .unwrap();

        assert_eq!(config.companies, 1);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.subtask_placement, SubtaskPlacement::EveryStage);
        assert_eq!(config.pm_users, 10);
        assert_eq!(config.invoice_period, InvoicePeriod::default());
    }

    #[test]
    fn test_invoice_period_serializes_as_rfc3339() {
        let json = serde_json::to_value(InvoicePeriod::default()).unwrap();
        assert_eq!(json["start"], "2025-04-01T00:00:00Z");
        assert_eq!(json["end"], "2025-04-30T23:59:59Z");
    }
}
