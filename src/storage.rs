use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::models::{BiometricProfile, DayLedger, MenuCatalog};

/// Persistence for the three stored entities. Each is an independent
/// document: the profile and catalog are singletons, ledgers are keyed
/// by date. Loads of something never saved return the empty value.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_profile(&self) -> Result<BiometricProfile>;
    async fn save_profile(&self, profile: &BiometricProfile) -> Result<()>;

    async fn load_day_ledger(&self, date: NaiveDate) -> Result<DayLedger>;
    async fn save_day_ledger(&self, ledger: &DayLedger) -> Result<()>;

    async fn load_catalog(&self) -> Result<MenuCatalog>;
    async fn save_catalog(&self, catalog: &MenuCatalog) -> Result<()>;
}

/// Pretty-printed JSON files under the configured data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    config: Config,
}

impl JsonFileStorage {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !fs::try_exists(path).await? {
            return Ok(None);
        }
        let content = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(value)?;
        fs::write(path, content).await?;
        debug!(path = %path.display(), "saved");
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn load_profile(&self) -> Result<BiometricProfile> {
        Ok(Self::read_json(&self.config.profile_path())
            .await?
            .unwrap_or_default())
    }

    async fn save_profile(&self, profile: &BiometricProfile) -> Result<()> {
        Self::write_json(&self.config.profile_path(), profile).await
    }

    async fn load_day_ledger(&self, date: NaiveDate) -> Result<DayLedger> {
        let path = self.config.ledger_path(date);
        let mut ledger: DayLedger = match Self::read_json::<serde_json::Value>(&path).await? {
            Some(mut value) => {
                // Older files only hold the meals list; the file name is the date
                if let Some(obj) = value.as_object_mut() {
                    obj.entry("date")
                        .or_insert_with(|| serde_json::json!(date.format("%Y-%m-%d").to_string()));
                }
                serde_json::from_value(value)?
            }
            None => DayLedger::empty(date),
        };
        ledger.date = date;
        Ok(ledger)
    }

    async fn save_day_ledger(&self, ledger: &DayLedger) -> Result<()> {
        Self::write_json(&self.config.ledger_path(ledger.date), ledger).await
    }

    async fn load_catalog(&self) -> Result<MenuCatalog> {
        Ok(Self::read_json(&self.config.catalog_path())
            .await?
            .unwrap_or_default())
    }

    async fn save_catalog(&self, catalog: &MenuCatalog) -> Result<()> {
        Self::write_json(&self.config.catalog_path(), catalog).await
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    profile: BiometricProfile,
    ledgers: HashMap<NaiveDate, DayLedger>,
    catalog: MenuCatalog,
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_profile(&self) -> Result<BiometricProfile> {
        Ok(self.state.lock().await.profile.clone())
    }

    async fn save_profile(&self, profile: &BiometricProfile) -> Result<()> {
        self.state.lock().await.profile = profile.clone();
        Ok(())
    }

    async fn load_day_ledger(&self, date: NaiveDate) -> Result<DayLedger> {
        let state = self.state.lock().await;
        Ok(state
            .ledgers
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DayLedger::empty(date)))
    }

    async fn save_day_ledger(&self, ledger: &DayLedger) -> Result<()> {
        self.state
            .lock()
            .await
            .ledgers
            .insert(ledger.date, ledger.clone());
        Ok(())
    }

    async fn load_catalog(&self) -> Result<MenuCatalog> {
        Ok(self.state.lock().await.catalog.clone())
    }

    async fn save_catalog(&self, catalog: &MenuCatalog) -> Result<()> {
        self.state.lock().await.catalog = catalog.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BiometricRecord, Gender, MealEntry, MenuItem, Nutrients, Restaurant};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(Config::new(dir.path()));

        let profile = storage.load_profile().await.unwrap();
        assert!(profile.current.is_none());
        assert!(profile.historic.is_empty());

        let ledger = storage.load_day_ledger(date()).await.unwrap();
        assert_eq!(ledger, DayLedger::empty(date()));

        assert!(storage.load_catalog().await.unwrap().restaurants.is_empty());
    }

    #[tokio::test]
    async fn json_storage_persists_each_entity() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let storage = JsonFileStorage::new(config.clone());

        let profile = BiometricProfile {
            current: Some(BiometricRecord {
                height_cm: 170.0,
                weight_kg: 68.0,
                gender: Gender::Female,
                age: 29,
                ..Default::default()
            }),
            historic: Vec::new(),
        };
        storage.save_profile(&profile).await.unwrap();

        let mut ledger = DayLedger::empty(date());
        ledger.meals.push(MealEntry {
            timestamp: date().and_hms_opt(12, 0, 0).unwrap(),
            name: "salad".to_string(),
            per_unit: Nutrients::new(250.0, 20.0, 10.0, 12.0),
            quantity: 2,
        });
        storage.save_day_ledger(&ledger).await.unwrap();
        assert!(config.ledger_path(date()).exists());

        let catalog = MenuCatalog {
            restaurants: vec![Restaurant {
                name: "deli".to_string(),
                items: vec![MenuItem {
                    name: "blt".to_string(),
                    per_unit: Nutrients::new(500.0, 40.0, 20.0, 28.0),
                }],
            }],
        };
        storage.save_catalog(&catalog).await.unwrap();

        let reopened = JsonFileStorage::new(config);
        assert_eq!(reopened.load_profile().await.unwrap(), profile);
        assert_eq!(reopened.load_day_ledger(date()).await.unwrap(), ledger);
        assert_eq!(reopened.load_catalog().await.unwrap(), catalog);
    }

    #[tokio::test]
    async fn ledger_file_without_date_takes_it_from_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        std::fs::create_dir_all(config.ledger_dir()).unwrap();
        std::fs::write(
            config.ledger_path(date()),
            r#"{"meals": [{"timestamp": "2024-06-01 09:15:00", "name": "oatmeal",
                "calories": 150, "carbs": 27, "protein": 5, "fat": 3, "quantity": 2}]}"#,
        )
        .unwrap();

        let storage = JsonFileStorage::new(config);
        let ledger = storage.load_day_ledger(date()).await.unwrap();
        assert_eq!(ledger.date, date());
        assert_eq!(ledger.meals.len(), 1);
        assert_eq!(ledger.meals[0].quantity, 2);
        assert_eq!(ledger.meals[0].per_unit.carbs_g, 27.0);
    }

    #[tokio::test]
    async fn memory_storage_keys_ledgers_by_date() {
        let storage = MemoryStorage::new();
        let other = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

        let mut ledger = DayLedger::empty(date());
        ledger.meals.push(MealEntry {
            timestamp: date().and_hms_opt(8, 0, 0).unwrap(),
            name: "eggs".to_string(),
            per_unit: Nutrients::new(140.0, 1.0, 12.0, 10.0),
            quantity: 1,
        });
        storage.save_day_ledger(&ledger).await.unwrap();

        assert_eq!(storage.load_day_ledger(date()).await.unwrap(), ledger);
        assert!(storage.load_day_ledger(other).await.unwrap().meals.is_empty());
    }
}
