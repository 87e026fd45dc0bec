use std::fmt;

use crate::error::DietError;

/// Walking intensity. Paces are beginner friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    /// Minutes needed to walk one mile.
    pub fn minutes_per_mile(self) -> f64 {
        match self {
            Intensity::Low => 30.0,
            Intensity::Medium => 25.0,
            Intensity::High => 20.0,
        }
    }
}

impl std::str::FromStr for Intensity {
    type Err = DietError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(DietError::InvalidInput(format!(
                "intensity must be low, medium or high, got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// How far a walk of a given length covers at a given intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkingPlan {
    pub intensity: Intensity,
    pub minutes: u32,
    pub miles: f64,
}

impl fmt::Display for WalkingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Walking at {} intensity for {} minutes, aiming to cover {:.2} miles.",
            self.intensity, self.minutes, self.miles
        )
    }
}

pub fn walking_plan(intensity: Intensity, minutes: u32) -> WalkingPlan {
    WalkingPlan {
        intensity,
        minutes,
        miles: f64::from(minutes) / intensity.minutes_per_mile(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_intensity_hour() {
        let plan = walking_plan(Intensity::Low, 60);
        assert_eq!(plan.miles, 2.0);
        assert_eq!(
            plan.to_string(),
            "Walking at low intensity for 60 minutes, aiming to cover 2.00 miles."
        );
    }

    #[test]
    fn faster_pace_covers_more() {
        let medium = walking_plan(Intensity::Medium, 45);
        let high = walking_plan(Intensity::High, 45);
        assert!((medium.miles - 1.8).abs() < 1e-9);
        assert!((high.miles - 2.25).abs() < 1e-9);
    }

    #[test]
    fn parse_intensity() {
        assert_eq!(" High ".parse::<Intensity>().unwrap(), Intensity::High);
        assert!(matches!(
            "brisk".parse::<Intensity>(),
            Err(DietError::InvalidInput(_))
        ));
    }
}
