use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{DietError, Result};
use crate::models::{ActivityLevel, BiometricRecord, DailyTargets, Gender};
use crate::needs::compute_daily_targets;
use crate::storage::Storage;

/// Current biometric record plus its append-only history.
///
/// Every mutation loads the stored profile, applies the change and saves
/// the whole profile back before returning.
pub struct BiometricStore<S> {
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for BiometricStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: Storage> BiometricStore<S> {
    pub fn new(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub async fn current(&self) -> Result<Option<BiometricRecord>> {
        Ok(self.storage.load_profile().await?.current)
    }

    /// Like [`current`](Self::current) but an absent record is `NoData`.
    pub async fn require_current(&self) -> Result<BiometricRecord> {
        self.current()
            .await?
            .ok_or_else(|| DietError::NoData("no biometric data available".to_string()))
    }

    /// Build a record stamped with the current time.
    pub fn new_record(
        &self,
        height_cm: f64,
        weight_kg: f64,
        gender: Gender,
        activity_level: ActivityLevel,
        age: u32,
    ) -> BiometricRecord {
        BiometricRecord {
            timestamp: self.clock.now(),
            height_cm,
            weight_kg,
            gender,
            activity_level,
            age,
        }
    }

    /// Make `record` current, archiving the previous current record at the
    /// end of history first. Confirming the overwrite is up to the caller.
    pub async fn record_new(&self, record: BiometricRecord) -> Result<()> {
        let mut profile = self.storage.load_profile().await?;
        if let Some(previous) = profile.current.take() {
            info!(timestamp = %previous.timestamp, "archiving current biometric record");
            profile.historic.push(previous);
        }
        profile.current = Some(record);
        self.storage.save_profile(&profile).await?;
        debug!(historic = profile.historic.len(), "biometric record updated");
        Ok(())
    }

    /// History, oldest first.
    pub async fn list_historic(&self) -> Result<Vec<BiometricRecord>> {
        Ok(self.storage.load_profile().await?.historic)
    }

    /// The historic record at 1-based `index`.
    pub async fn historic(&self, index: usize) -> Result<BiometricRecord> {
        let historic = self.list_historic().await?;
        index
            .checked_sub(1)
            .and_then(|i| historic.get(i).cloned())
            .ok_or_else(|| DietError::not_found("historic record", index))
    }

    /// Remove the historic record at 1-based `index`. Later records shift
    /// down one position. Out-of-range indexes leave history untouched.
    pub async fn delete_historic(&self, index: usize) -> Result<BiometricRecord> {
        let mut profile = self.storage.load_profile().await?;
        if index == 0 || index > profile.historic.len() {
            return Err(DietError::not_found("historic record", index));
        }
        let removed = profile.historic.remove(index - 1);
        self.storage.save_profile(&profile).await?;
        info!(index, timestamp = %removed.timestamp, "deleted historic biometric record");
        Ok(removed)
    }

    /// Clear all history. A no-op on an already empty history.
    pub async fn delete_all_historic(&self) -> Result<()> {
        let mut profile = self.storage.load_profile().await?;
        let count = profile.historic.len();
        profile.historic.clear();
        self.storage.save_profile(&profile).await?;
        info!(count, "deleted all historic biometric records");
        Ok(())
    }

    /// Targets for the current record, `NoData` if there is none.
    pub async fn daily_targets(&self) -> Result<DailyTargets> {
        Ok(compute_daily_targets(&self.require_current().await?))
    }
}
