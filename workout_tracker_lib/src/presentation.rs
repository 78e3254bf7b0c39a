//! What the map and the workout list show for a workout.
//!
//! Everything here is derived from a `&Workout`, the views keep no state of their own.

use crate::workout::{Workout, WorkoutId, WorkoutKind, WorkoutType};

const DURATION_ICON: &str = "⏱";
const METRIC_ICON: &str = "⚡️";

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub content: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub class_name: String,
    pub title: String,
    pub details: [Detail; 4],
}

pub fn icon(workout_type: WorkoutType) -> &'static str {
    match workout_type {
        WorkoutType::Running => "🏃‍♂️",
        WorkoutType::Cycling => "🚴‍♀️",
    }
}

pub fn popup(workout: &Workout) -> Popup {
    Popup {
        content: format!("<p>{} {}</p>", icon(workout.workout_type()), workout.description()),
        class_name: format!("{}-popup", workout.workout_type()),
    }
}

pub fn list_entry(workout: &Workout) -> ListEntry {
    let workout_type = workout.workout_type();

    let (metric, secondary) = match *workout.kind() {
        WorkoutKind::Running {
            cadence_spm,
            pace_min_per_km,
        } => (
            Detail::new(METRIC_ICON, format!("{pace_min_per_km:.2}"), "min/km"),
            Detail::new("🦶🏼", cadence_spm.to_string(), "spm"),
        ),
        WorkoutKind::Cycling {
            elevation_gain_m,
            speed_kmh,
        } => (
            Detail::new(METRIC_ICON, format!("{speed_kmh:.2}"), "km/h"),
            Detail::new("⛰", elevation_gain_m.to_string(), "m"),
        ),
    };

    ListEntry {
        id: workout.id().clone(),
        class_name: format!("workout workout--{workout_type}"),
        title: workout.description().to_owned(),
        details: [
            Detail::new(icon(workout_type), workout.distance_km().to_string(), "km"),
            Detail::new(DURATION_ICON, workout.duration_min().to_string(), "min"),
            metric,
            secondary,
        ],
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::coordinates::Coordinates;

    const LONDON: Coordinates = Coordinates::new(51.5, -0.1);

    #[test]
    fn running_entry() {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap().fixed_offset();
        let run = Workout::running("0000000001".into(), created_at, LONDON, 5., 25., 178.);

        let entry = list_entry(&run);
        assert_eq!(entry.id, WorkoutId::from("0000000001"));
        assert_eq!(entry.class_name, "workout workout--running");
        assert_eq!(entry.title, "Running on October 17");

        let shown: Vec<_> = entry.details.iter().map(|d| (d.value.as_str(), d.unit)).collect();
        assert_eq!(shown, [("5", "km"), ("25", "min"), ("5.00", "min/km"), ("178", "spm")]);

        assert_eq!(popup(&run), Popup {
            content: "<p>🏃‍♂️ Running on October 17</p>".into(),
            class_name: "running-popup".into(),
        });
    }

    #[test]
    fn cycling_entry() {
        let created_at = Utc.with_ymd_and_hms(2026, 1, 2, 9, 30, 0).unwrap().fixed_offset();
        let ride = Workout::cycling("7".into(), created_at, LONDON, 27.5, 95., 0.);

        let entry = list_entry(&ride);
        let shown: Vec<_> = entry.details.iter().map(|d| (d.icon, d.value.as_str(), d.unit)).collect();
        assert_eq!(
            shown,
            [("🚴‍♀️", "27.5", "km"), ("⏱", "95", "min"), ("⚡️", "17.37", "km/h"), ("⛰", "0", "m")]
        );
        assert_eq!(popup(&ride).class_name, "cycling-popup");
    }
}
