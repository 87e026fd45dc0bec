//! Daily calorie and macro targets from a biometric record.
//!
//! BMR uses the Mifflin-St Jeor equation, scaled by an activity multiplier,
//! minus a fixed weight-loss deficit. The remaining calories are split
//! 40/30/30 between carbs, protein and fat.

use crate::models::{BiometricRecord, DailyTargets, Gender};

/// Calories subtracted from maintenance needs. Always applied.
pub const DAILY_DEFICIT_KCAL: f64 = 500.0;

pub const CARBS_SHARE: f64 = 0.4;
pub const PROTEIN_SHARE: f64 = 0.3;
pub const FAT_SHARE: f64 = 0.3;

pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Basal Metabolic Rate (Mifflin-St Jeor, 1990).
///
/// `10 * weight_kg + 6.25 * height_cm - 5 * age`, then `+5` for men and
/// `-161` for women.
pub fn basal_metabolic_rate(record: &BiometricRecord) -> f64 {
    let base = 10.0 * record.weight_kg + 6.25 * record.height_cm - 5.0 * f64::from(record.age);
    match record.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Compute the daily targets. Never fails; a degenerate record can yield
/// negative targets and those are returned unclamped.
pub fn compute_daily_targets(record: &BiometricRecord) -> DailyTargets {
    let calories = basal_metabolic_rate(record) * record.activity_level.multiplier()
        - DAILY_DEFICIT_KCAL;

    // `as i64` truncates toward zero
    DailyTargets {
        calories,
        carbs_g: (CARBS_SHARE * calories / KCAL_PER_G_CARBS) as i64,
        protein_g: (PROTEIN_SHARE * calories / KCAL_PER_G_PROTEIN) as i64,
        fat_g: (FAT_SHARE * calories / KCAL_PER_G_FAT) as i64,
    }
}
