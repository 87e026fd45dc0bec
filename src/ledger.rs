use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{DietError, Result};
use crate::models::{DayLedger, DaySummary, MealEntry, MenuItem, Nutrients};
use crate::needs::compute_daily_targets;
use crate::storage::Storage;

/// Per-day meal logs and the aggregation of a day's intake against targets.
///
/// Nothing is cached: totals are recomputed from storage on every call.
pub struct MealLedger<S> {
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for MealLedger<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: Storage> MealLedger<S> {
    pub fn new(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Append a meal to `date`'s ledger. Nutrients are stored per unit.
    pub async fn log_meal(
        &self,
        date: NaiveDate,
        name: &str,
        per_unit: Nutrients,
        quantity: u32,
    ) -> Result<MealEntry> {
        let mut ledger = self.storage.load_day_ledger(date).await?;
        let entry = MealEntry {
            timestamp: self.clock.now(),
            name: name.to_string(),
            per_unit,
            quantity,
        };
        ledger.meals.push(entry.clone());
        self.storage.save_day_ledger(&ledger).await?;
        debug!(%date, name, quantity, "meal logged");
        Ok(entry)
    }

    /// Log `quantity` units of a catalog item, per-unit values unchanged.
    pub async fn log_menu_item(
        &self,
        date: NaiveDate,
        item: &MenuItem,
        quantity: u32,
    ) -> Result<MealEntry> {
        self.log_meal(date, &item.name, item.per_unit, quantity).await
    }

    pub async fn day(&self, date: NaiveDate) -> Result<DayLedger> {
        self.storage.load_day_ledger(date).await
    }

    pub async fn list_meals(&self, date: NaiveDate) -> Result<Vec<MealEntry>> {
        Ok(self.day(date).await?.meals)
    }

    /// Sum of every entry's per-unit values times its quantity.
    pub async fn consumed_for_day(&self, date: NaiveDate) -> Result<Nutrients> {
        let ledger = self.day(date).await?;
        Ok(total_intake(&ledger))
    }

    /// Targets from the current biometric record against `date`'s intake.
    /// Without a current record the targets come from an all-default record.
    pub async fn summary_for_day(&self, date: NaiveDate) -> Result<DaySummary> {
        let consumed = self.consumed_for_day(date).await?;

        let current = match self.storage.load_profile().await?.current {
            Some(record) => record,
            None => {
                warn!("no current biometric record; targets use defaults");
                Default::default()
            }
        };
        let targets = compute_daily_targets(&current);

        Ok(DaySummary {
            date,
            targets,
            consumed,
            remaining: targets.as_nutrients() - consumed,
        })
    }

    /// Calories and macros left for `date`. Negative means over target.
    pub async fn remaining_for_day(&self, date: NaiveDate) -> Result<Nutrients> {
        Ok(self.summary_for_day(date).await?.remaining)
    }

    /// Remove the entry at 1-based `index`.
    pub async fn delete_meal(&self, date: NaiveDate, index: usize) -> Result<MealEntry> {
        let mut ledger = self.storage.load_day_ledger(date).await?;
        if index == 0 || index > ledger.meals.len() {
            return Err(DietError::not_found("meal", index));
        }
        let removed = ledger.meals.remove(index - 1);
        self.storage.save_day_ledger(&ledger).await?;
        info!(%date, index, name = %removed.name, "meal deleted");
        Ok(removed)
    }

    /// Empty `date`'s ledger.
    pub async fn delete_all_meals(&self, date: NaiveDate) -> Result<()> {
        self.storage
            .save_day_ledger(&DayLedger::empty(date))
            .await?;
        info!(%date, "all meals deleted");
        Ok(())
    }
}

fn total_intake(ledger: &DayLedger) -> Nutrients {
    ledger
        .meals
        .iter()
        .fold(Nutrients::default(), |acc, meal| acc + meal.total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{ActivityLevel, BiometricProfile, BiometricRecord, Gender};
    use crate::storage::MemoryStorage;

    const EPS: f64 = 1e-6;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    async fn ledger_with_profile() -> (Arc<MemoryStorage>, MealLedger<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save_profile(&BiometricProfile {
                current: Some(BiometricRecord {
                    height_cm: 180.0,
                    weight_kg: 75.0,
                    age: 30,
                    gender: Gender::Male,
                    activity_level: ActivityLevel::Moderate,
                    ..Default::default()
                }),
                historic: Vec::new(),
            })
            .await
            .unwrap();
        let clock = FixedClock(date().and_hms_opt(12, 15, 0).unwrap());
        let ledger = MealLedger::new(Arc::clone(&storage), Arc::new(clock));
        (storage, ledger)
    }

    #[tokio::test]
    async fn empty_day_leaves_full_targets() {
        let (_, ledger) = ledger_with_profile().await;
        let summary = ledger.summary_for_day(date()).await.unwrap();

        assert_eq!(summary.consumed, Nutrients::default());
        assert!((summary.remaining.calories - 2181.5).abs() < EPS);
        assert_eq!(summary.remaining.carbs_g, 218.0);
        assert_eq!(summary.remaining.protein_g, 163.0);
        assert_eq!(summary.remaining.fat_g, 72.0);
    }

    #[tokio::test]
    async fn quantity_multiplies_at_aggregation() {
        let (storage, ledger) = ledger_with_profile().await;
        let before = ledger.remaining_for_day(date()).await.unwrap();

        ledger
            .log_meal(date(), "pizza slice", Nutrients::new(300.0, 35.0, 12.0, 11.0), 2)
            .await
            .unwrap();

        // stored per unit
        let stored = storage.load_day_ledger(date()).await.unwrap();
        assert_eq!(stored.meals[0].per_unit.calories, 300.0);
        assert_eq!(stored.meals[0].quantity, 2);

        let after = ledger.remaining_for_day(date()).await.unwrap();
        assert!((before.calories - after.calories - 600.0).abs() < EPS);
        assert!((before.carbs_g - after.carbs_g - 70.0).abs() < EPS);
        assert!((before.protein_g - after.protein_g - 24.0).abs() < EPS);
        assert!((before.fat_g - after.fat_g - 22.0).abs() < EPS);
    }

    #[tokio::test]
    async fn remaining_is_idempotent() {
        let (_, ledger) = ledger_with_profile().await;
        ledger
            .log_meal(date(), "bagel", Nutrients::new(270.0, 53.0, 10.0, 1.5), 1)
            .await
            .unwrap();

        let first = ledger.remaining_for_day(date()).await.unwrap();
        let second = ledger.remaining_for_day(date()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn remaining_goes_negative_when_over_target() {
        let (_, ledger) = ledger_with_profile().await;
        ledger
            .log_meal(date(), "feast", Nutrients::new(1500.0, 200.0, 90.0, 60.0), 2)
            .await
            .unwrap();

        let remaining = ledger.remaining_for_day(date()).await.unwrap();
        assert!((remaining.calories - (2181.5 - 3000.0)).abs() < EPS);
        assert_eq!(remaining.carbs_g, 218.0 - 400.0);
        assert_eq!(remaining.fat_g, 72.0 - 120.0);
    }

    #[tokio::test]
    async fn days_are_independent() {
        let (_, ledger) = ledger_with_profile().await;
        let tomorrow = date().succ_opt().unwrap();
        ledger
            .log_meal(tomorrow, "soup", Nutrients::new(200.0, 20.0, 8.0, 9.0), 1)
            .await
            .unwrap();

        assert!(ledger.list_meals(date()).await.unwrap().is_empty());
        assert_eq!(
            ledger.consumed_for_day(tomorrow).await.unwrap(),
            Nutrients::new(200.0, 20.0, 8.0, 9.0)
        );
    }

    #[tokio::test]
    async fn log_menu_item_passes_per_unit_values_through() {
        let (_, ledger) = ledger_with_profile().await;
        let item = MenuItem {
            name: "double cheeseburger".to_string(),
            per_unit: Nutrients::new(450.0, 34.0, 25.0, 24.0),
        };

        let entry = ledger.log_menu_item(date(), &item, 3).await.unwrap();
        assert_eq!(entry.per_unit, item.per_unit);
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.timestamp, date().and_hms_opt(12, 15, 0).unwrap());
        assert_eq!(
            ledger.consumed_for_day(date()).await.unwrap(),
            Nutrients::new(1350.0, 102.0, 75.0, 72.0)
        );
    }

    #[tokio::test]
    async fn delete_meal_by_position() {
        let (_, ledger) = ledger_with_profile().await;
        for name in ["breakfast", "lunch", "dinner"] {
            ledger
                .log_meal(date(), name, Nutrients::new(500.0, 50.0, 30.0, 20.0), 1)
                .await
                .unwrap();
        }

        let removed = ledger.delete_meal(date(), 2).await.unwrap();
        assert_eq!(removed.name, "lunch");

        let names: Vec<String> = ledger
            .list_meals(date())
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["breakfast", "dinner"]);

        assert!(ledger.delete_meal(date(), 3).await.unwrap_err().is_not_found());
        assert!(ledger.delete_meal(date(), 0).await.unwrap_err().is_not_found());
        assert_eq!(ledger.list_meals(date()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_all_meals_resets_the_day() {
        let (_, ledger) = ledger_with_profile().await;
        ledger
            .log_meal(date(), "snack", Nutrients::new(100.0, 10.0, 2.0, 5.0), 4)
            .await
            .unwrap();

        ledger.delete_all_meals(date()).await.unwrap();
        assert!(ledger.list_meals(date()).await.unwrap().is_empty());
        assert_eq!(ledger.consumed_for_day(date()).await.unwrap(), Nutrients::default());

        // already empty
        ledger.delete_all_meals(date()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_profile_uses_default_record() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = FixedClock(date().and_hms_opt(9, 0, 0).unwrap());
        let ledger = MealLedger::new(storage, Arc::new(clock));

        let summary = ledger.summary_for_day(date()).await.unwrap();
        assert!((summary.targets.calories - -494.0).abs() < EPS);
        assert_eq!(summary.targets.carbs_g, -49);
    }
}
