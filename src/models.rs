use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Biological sex used by the BMR equation.
/// Anything other than exactly `m` is treated as female.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        if value == "m" {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "m"),
            Gender::Female => write!(f, "f"),
        }
    }
}

/// Activity level for scaling BMR. Unknown values fall back to `Low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Low => 1.2,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.9,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&str> for ActivityLevel {
    fn from(value: &str) -> Self {
        match value {
            "moderate" => ActivityLevel::Moderate,
            "high" => ActivityLevel::High,
            _ => ActivityLevel::Low,
        }
    }
}

impl From<ActivityLevel> for String {
    fn from(value: ActivityLevel) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// A biometric snapshot. Never mutated once it lands in history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricRecord {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    /// Height in cm
    #[serde(alias = "height")]
    pub height_cm: f64,
    /// Weight in kg
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub age: u32,
}

/// Current record plus the archive of every record it replaced, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricProfile {
    #[serde(deserialize_with = "empty_record_as_none")]
    pub current: Option<BiometricRecord>,
    #[serde(alias = "historic_data")]
    pub historic: Vec<BiometricRecord>,
}

/// `null` and `{}` both mean there is no current record.
fn empty_record_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BiometricRecord>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Daily calorie and macro targets derived from a biometric record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub calories: f64,
    pub carbs_g: i64,
    pub protein_g: i64,
    pub fat_g: i64,
}

impl DailyTargets {
    pub fn as_nutrients(&self) -> Nutrients {
        Nutrients {
            calories: self.calories,
            carbs_g: self.carbs_g as f64,
            protein_g: self.protein_g as f64,
            fat_g: self.fat_g as f64,
        }
    }
}

/// Calories (kcal) and macros (g). Per-unit on meals and menu items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrients {
    pub calories: f64,
    #[serde(alias = "carbs")]
    pub carbs_g: f64,
    #[serde(alias = "protein")]
    pub protein_g: f64,
    #[serde(alias = "fat")]
    pub fat_g: f64,
}

impl Nutrients {
    pub fn new(calories: f64, carbs_g: f64, protein_g: f64, fat_g: f64) -> Self {
        Self {
            calories,
            carbs_g,
            protein_g,
            fat_g,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            carbs_g: self.carbs_g * factor,
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
        }
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            carbs_g: self.carbs_g + rhs.carbs_g,
            protein_g: self.protein_g + rhs.protein_g,
            fat_g: self.fat_g + rhs.fat_g,
        }
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Nutrients) {
        *self = *self + rhs;
    }
}

impl Sub for Nutrients {
    type Output = Nutrients;

    fn sub(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories - rhs.calories,
            carbs_g: self.carbs_g - rhs.carbs_g,
            protein_g: self.protein_g - rhs.protein_g,
            fat_g: self.fat_g - rhs.fat_g,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// A logged meal. Nutrient values are per unit; `quantity` is applied
/// only when a day is aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub name: String,
    #[serde(flatten)]
    pub per_unit: Nutrients,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl MealEntry {
    /// Contribution of this entry to the day's intake.
    pub fn total(&self) -> Nutrients {
        self.per_unit.scaled(f64::from(self.quantity))
    }
}

/// All meals logged on one calendar date, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLedger {
    pub date: NaiveDate,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
}

impl DayLedger {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Vec::new(),
        }
    }
}

/// A reusable meal template in the restaurant catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(flatten)]
    pub per_unit: Nutrients,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Restaurants in the order they were first added.
///
/// Stored as one JSON object mapping restaurant name to its items, in the
/// same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuCatalog {
    pub restaurants: Vec<Restaurant>,
}

impl Serialize for MenuCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.restaurants.iter().map(|r| (&r.name, &r.items)))
    }
}

impl<'de> Deserialize<'de> for MenuCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = MenuCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of restaurant names to menu items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MenuCatalog, A::Error> {
                let mut catalog = MenuCatalog::default();
                while let Some((name, items)) = access.next_entry::<String, Vec<MenuItem>>()? {
                    // Repeated keys merge into the first occurrence
                    match catalog.restaurants.iter_mut().find(|r| r.name == name) {
                        Some(existing) => existing.items.extend(items),
                        None => catalog.restaurants.push(Restaurant { name, items }),
                    }
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Targets, intake and what is left for one day. Remaining values go
/// negative once the user is over target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub targets: DailyTargets,
    pub consumed: Nutrients,
    pub remaining: Nutrients,
}

/// `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
