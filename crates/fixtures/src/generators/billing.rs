//! Currency rates and monthly invoicing.

use uuid::Uuid;

use taskboard::models::{
    NewCurrencyRate, NewMonthlyInvoice, NewMonthlyInvoiceLine, NewUser, Record,
};

use super::FakeData;
use crate::config::FixtureConfig;

const TIME_SPENT_HOURS: (f64, f64) = (1.0, 4.0);
const LINE_TOTAL: (f64, f64) = (50.0, 200.0);
/// Placeholder invoice total; lines are not summed into it.
const INVOICE_TOTAL_PLACEHOLDER: f64 = 0.0;

/// Link to a task on the client board.
///
/// Depends only on its inputs, so every line billing the same pair carries the
/// same link.
pub fn task_link(base: &str, client_id: Uuid, task_id: Uuid) -> String {
    format!(
        "{}/clients/{client_id}/task/{task_id}",
        base.trim_end_matches('/')
    )
}

/// Generates currency rates and the demo invoice of a company.
pub struct BillingGenerator<'a> {
    config: &'a FixtureConfig,
}

impl<'a> BillingGenerator<'a> {
    pub fn new(config: &'a FixtureConfig) -> Self {
        Self { config }
    }

    /// Base currency at 1.0 followed by the configured cross rates.
    pub fn currency_rates(&self, company_id: Uuid) -> Vec<NewCurrencyRate> {
        let base = NewCurrencyRate {
            company_id,
            currency: self.config.currency.clone(),
            rate: 1.0,
        };
        std::iter::once(base)
            .chain(self.config.cross_rates.iter().map(|cross| NewCurrencyRate {
                company_id,
                currency: cross.currency.clone(),
                rate: cross.rate,
            }))
            .collect()
    }

    pub fn monthly_invoice(&self, user_id: Uuid) -> NewMonthlyInvoice {
        NewMonthlyInvoice {
            user_id,
            period_start: self.config.invoice_period.start,
            period_end: self.config.invoice_period.end,
            total_amount: INVOICE_TOTAL_PLACEHOLDER,
        }
    }

    /// Line billing `task_id` for `client_id` at the user's rate and currency.
    pub fn invoice_line(
        &self,
        monthly_invoice_id: Uuid,
        client_id: Uuid,
        task_id: Uuid,
        user: &Record<NewUser>,
        fake: &mut FakeData,
    ) -> NewMonthlyInvoiceLine {
        NewMonthlyInvoiceLine {
            monthly_invoice_id,
            client_id,
            task_id,
            task_link: task_link(&self.config.task_link_base, client_id, task_id),
            note: fake.sentence(),
            time_spent: fake.float_in(TIME_SPENT_HOURS.0, TIME_SPENT_HOURS.1, 1),
            hourly_rate: user.hourly_rate,
            currency: user.currency.clone(),
            total: fake.float_in(LINE_TOTAL.0, LINE_TOTAL.1, 2),
            finished_at: fake.recent(1),
        }
    }
}
