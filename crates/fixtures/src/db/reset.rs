//! Full-graph wipe in reverse-dependency order.

use tracing::info;

use taskboard::models::EntityKind;

use super::{SeedError, Store};

/// Deletion order: leaf tables first, companies last.
pub const RESET_ORDER: [EntityKind; 18] = [
    EntityKind::MonthlyInvoiceLine,
    EntityKind::MonthlyInvoice,
    EntityKind::CurrencyRate,
    EntityKind::FileAttachment,
    EntityKind::TaskComment,
    EntityKind::TaskNote,
    EntityKind::TimeLog,
    EntityKind::UserTask,
    EntityKind::TaskStage,
    EntityKind::ClientTask,
    EntityKind::TaskList,
    EntityKind::Client,
    EntityKind::ClientGroup,
    EntityKind::UserPaymentPreference,
    EntityKind::User,
    EntityKind::Group,
    EntityKind::Role,
    EntityKind::Company,
];

/// Clears every managed table so a fresh build never trips over rows left by a
/// previous run.
pub struct ResetPlanner<'a> {
    store: &'a dyn Store,
}

impl<'a> ResetPlanner<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Deletes all rows of every managed kind.
    ///
    /// **WARNING**: This deletes all data from the tables. The first failing delete
    /// aborts the reset and is returned unchanged.
    pub async fn reset(&self) -> Result<u64, SeedError> {
        info!("Clearing all seeded data...");

        let mut total = 0;
        for kind in RESET_ORDER {
            let deleted = self.store.delete_all(kind).await?;
            if deleted > 0 {
                info!("  Deleted {} {}", deleted, kind);
            }
            total += deleted;
        }

        info!("All data cleared ({} rows)", total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_order_reverses_creation_order() {
        let mut reversed = EntityKind::CREATION_ORDER;
        reversed.reverse();
        assert_eq!(RESET_ORDER, reversed);
    }

    #[test]
    fn test_children_deleted_before_parents() {
        for (position, kind) in RESET_ORDER.iter().enumerate() {
            for child in kind.children() {
                let child_position = RESET_ORDER.iter().position(|k| *k == child).unwrap();
                assert!(
                    child_position < position,
                    "{child} must be deleted before {kind}"
                );
            }
        }
    }
}
