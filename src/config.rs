use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "DIET_TRACKER_DATA_DIR";

const BIOMETRIC_DATA_FILE: &str = "biometric_data.json";
const MEALS_DATA_DIR: &str = "meals_data";
const MEALS_DATABASE_FILE: &str = "meals_database.json";

/// Where the tracker keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory: explicit override, then
    /// `DIET_TRACKER_DATA_DIR`, then the current directory.
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(BIOMETRIC_DATA_FILE)
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.data_dir.join(MEALS_DATA_DIR)
    }

    /// One file per day: `meals_data/YYYY-MM-DD.json`.
    pub fn ledger_path(&self, date: NaiveDate) -> PathBuf {
        self.ledger_dir()
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(MEALS_DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths() {
        let config = Config::new("/tmp/diet");
        assert_eq!(config.profile_path(), PathBuf::from("/tmp/diet/biometric_data.json"));
        assert_eq!(config.catalog_path(), PathBuf::from("/tmp/diet/meals_database.json"));
        assert_eq!(
            config.ledger_path(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            PathBuf::from("/tmp/diet/meals_data/2024-01-05.json")
        );
    }

    #[test]
    fn explicit_override_wins() {
        let config = Config::resolve(Some(PathBuf::from("/srv/diet")));
        assert_eq!(config.data_dir(), Path::new("/srv/diet"));
    }
}
