use std::sync::Arc;

use chrono::NaiveDate;

use crate::biometrics::BiometricStore;
use crate::catalog::RestaurantCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::ledger::MealLedger;
use crate::storage::{JsonFileStorage, Storage};

/// The tracker's components wired to one storage backend and one clock.
pub struct DietClient<S> {
    pub biometrics: BiometricStore<S>,
    pub ledger: MealLedger<S>,
    pub catalog: RestaurantCatalog<S>,
    clock: Arc<dyn Clock>,
}

impl DietClient<JsonFileStorage> {
    /// JSON files under `config.data_dir`, local wall-clock time.
    pub fn open(config: Config) -> Self {
        Self::new(Arc::new(JsonFileStorage::new(config)), Arc::new(SystemClock))
    }
}

impl<S: Storage> DietClient<S> {
    pub fn new(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            biometrics: BiometricStore::new(Arc::clone(&storage), Arc::clone(&clock)),
            ledger: MealLedger::new(Arc::clone(&storage), Arc::clone(&clock)),
            catalog: RestaurantCatalog::new(storage),
            clock,
        }
    }

    /// The date meals are logged against when none is given.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
