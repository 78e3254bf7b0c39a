use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{coordinates::Coordinates, form::WorkoutInput};

const ID_DIGITS: u32 = 10;
const ID_MODULUS: i64 = 10_i64.pow(ID_DIGITS);

/// Correlates a list entry, a map marker and a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// The last ten digits of a millisecond timestamp, zero padded.
    pub fn from_timestamp_millis(millis: i64) -> Self {
        Self(format!("{:0width$}", millis.rem_euclid(ID_MODULUS), width = ID_DIGITS as usize))
    }

    /// The next id in sequence, used to step past a collision.
    /// Ids that are not plain digits get a numeric suffix instead.
    pub fn successor(&self) -> Self {
        match self.0.parse::<i64>() {
            Ok(n) if self.0.len() == ID_DIGITS as usize => Self::from_timestamp_millis(n + 1),
            _ => Self(format!("{}-1", self.0)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            other => Err(other.to_owned()),
        }
    }
}

/// The variant specific part of a workout. Derived metrics live here next to the
/// input they were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        #[serde(rename = "cadence")]
        cadence_spm: f64,
        #[serde(rename = "pace")]
        pace_min_per_km: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain_m: f64,
        #[serde(rename = "speed")]
        speed_kmh: f64,
    },
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// A recorded session. Every field is written once by a constructor and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkoutRecord")]
pub struct Workout {
    id: WorkoutId,
    #[serde(rename = "date")]
    created_at: DateTime<FixedOffset>,
    #[serde(rename = "coords")]
    coordinates: Coordinates,
    #[serde(rename = "distance")]
    distance_km: f64,
    #[serde(rename = "duration")]
    duration_min: f64,
    description: String,
    #[serde(flatten)]
    kind: WorkoutKind,
}

impl Workout {
    pub fn running(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self {
        let kind = WorkoutKind::Running {
            cadence_spm,
            pace_min_per_km: pace_min_per_km(distance_km, duration_min),
        };
        Self::with_kind(id, created_at, coordinates, distance_km, duration_min, kind)
    }

    pub fn cycling(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        let kind = WorkoutKind::Cycling {
            elevation_gain_m,
            speed_kmh: speed_kmh(distance_km, duration_min),
        };
        Self::with_kind(id, created_at, coordinates, distance_km, duration_min, kind)
    }

    /// Builds the variant named by already validated form input.
    pub fn new(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        input: &WorkoutInput,
    ) -> Self {
        let kind = match input.workout_type {
            WorkoutType::Running => WorkoutKind::Running {
                cadence_spm: input.cadence_or_elevation,
                pace_min_per_km: pace_min_per_km(input.distance_km, input.duration_min),
            },
            WorkoutType::Cycling => WorkoutKind::Cycling {
                elevation_gain_m: input.cadence_or_elevation,
                speed_kmh: speed_kmh(input.distance_km, input.duration_min),
            },
        };
        Self::with_kind(id, created_at, coordinates, input.distance_km, input.duration_min, kind)
    }

    fn with_kind(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        kind: WorkoutKind,
    ) -> Self {
        Self {
            description: describe(kind.workout_type(), &created_at),
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            kind,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }
}

/// Minutes per kilometre, rounded to two decimals.
pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    round2(duration_min / distance_km)
}

/// Kilometres per hour, rounded to two decimals.
pub fn speed_kmh(distance_km: f64, duration_min: f64) -> f64 {
    round2(distance_km / (duration_min / 60.))
}

/// "Running on October 17", in the offset the workout was recorded in.
pub fn describe(workout_type: WorkoutType, created_at: &DateTime<FixedOffset>) -> String {
    format!("{} on {}", workout_type.label(), created_at.format("%B %-d"))
}

fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

/// The persisted shape of a workout. Derived fields are not read back: they are
/// recomputed from the base fields when the record becomes a `Workout` again.
#[derive(Deserialize)]
struct WorkoutRecord {
    id: WorkoutId,
    date: DateTime<FixedOffset>,
    coords: Coordinates,
    distance: f64,
    duration: f64,
    #[serde(flatten)]
    activity: ActivityRecord,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ActivityRecord {
    Running {
        cadence: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("invalid workout record {id}: {reason}")]
pub struct InvalidRecord {
    id: String,
    reason: &'static str,
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = InvalidRecord;

    fn try_from(record: WorkoutRecord) -> Result<Self, Self::Error> {
        let invalid = |reason| InvalidRecord {
            id: record.id.to_string(),
            reason,
        };

        if record.id.as_str().is_empty() {
            return Err(invalid("empty id"));
        }
        if !record.coords.is_finite() {
            return Err(invalid("coordinates are not finite"));
        }
        if !is_positive(record.distance) {
            return Err(invalid("distance must be a positive number"));
        }
        if !is_positive(record.duration) {
            return Err(invalid("duration must be a positive number"));
        }

        let workout = match record.activity {
            ActivityRecord::Running { cadence } => {
                if !is_positive(cadence) {
                    return Err(invalid("cadence must be a positive number"));
                }
                Workout::running(
                    record.id,
                    record.date,
                    record.coords,
                    record.distance,
                    record.duration,
                    cadence,
                )
            }
            ActivityRecord::Cycling { elevation_gain } => {
                if !elevation_gain.is_finite() {
                    return Err(invalid("elevation gain must be a number"));
                }
                Workout::cycling(
                    record.id,
                    record.date,
                    record.coords,
                    record.distance,
                    record.duration,
                    elevation_gain,
                )
            }
        };

        Ok(workout)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const LONDON: Coordinates = Coordinates::new(51.5, -0.1);

    fn october_17() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap().fixed_offset()
    }

    fn pacific(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn running_pace_is_rounded() {
        let run = Workout::running("1".into(), october_17(), LONDON, 7.3, 41., 170.);
        assert_eq!(run.kind(), &WorkoutKind::Running { cadence_spm: 170., pace_min_per_km: 5.62 });

        let run = Workout::running("2".into(), october_17(), LONDON, 5., 25., 178.);
        assert_eq!(run.kind(), &WorkoutKind::Running { cadence_spm: 178., pace_min_per_km: 5. });
    }

    #[test]
    fn cycling_speed_is_rounded() {
        let ride = Workout::cycling("1".into(), october_17(), LONDON, 27., 95., -12.);
        assert_eq!(ride.kind(), &WorkoutKind::Cycling { elevation_gain_m: -12., speed_kmh: 17.05 });

        assert_eq!(speed_kmh(20., 60.), 20.);
    }

    #[test]
    fn rounding_goes_half_up() {
        // 0.125 is exact in binary so this really is a tie
        assert_eq!(pace_min_per_km(8., 1.), 0.13);
        assert_eq!(pace_min_per_km(3., 10.), 3.33);
        assert_eq!(pace_min_per_km(3., 20.), 6.67);
    }

    #[test]
    fn description_uses_label_month_and_day() {
        assert_eq!(describe(WorkoutType::Running, &october_17()), "Running on October 17");

        let march_3 = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap().fixed_offset();
        let ride = Workout::cycling("1".into(), march_3, Coordinates::new(0., 0.), 1., 1., 0.);
        assert_eq!(ride.description(), "Cycling on March 3");
    }

    #[test]
    fn description_uses_the_local_day() {
        // 19:00 on the 17th in UTC-7 is already the 18th in UTC
        let evening = pacific(19);
        assert_eq!(evening.naive_utc().date().to_string(), "2026-10-18");
        assert_eq!(describe(WorkoutType::Running, &evening), "Running on October 17");

        let run = Workout::running("0000000003".into(), evening, LONDON, 5., 25., 178.);
        let raw = serde_json::to_string(&run).unwrap();
        assert!(raw.contains("2026-10-17T19:00:00-07:00"), "offset was lost: {raw}");

        let restored: Workout = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored.description(), "Running on October 17");
        assert_eq!(restored.created_at().offset(), evening.offset());
    }

    #[test]
    fn id_keeps_last_ten_digits() {
        assert_eq!(WorkoutId::from_timestamp_millis(1_760_693_400_123).as_str(), "0693400123");
        assert_eq!(WorkoutId::from_timestamp_millis(42).as_str(), "0000000042");
    }

    #[test]
    fn id_successor_wraps_and_handles_foreign_ids() {
        assert_eq!(WorkoutId::from("0000000041").successor().as_str(), "0000000042");
        assert_eq!(WorkoutId::from("9999999999").successor().as_str(), "0000000000");
        assert_eq!(WorkoutId::from("abc").successor().as_str(), "abc-1");
    }

    #[test]
    fn workout_type_parses_form_values() {
        assert_eq!("running".parse::<WorkoutType>(), Ok(WorkoutType::Running));
        assert_eq!(" cycling ".parse::<WorkoutType>(), Ok(WorkoutType::Cycling));
        assert_eq!("swimming".parse::<WorkoutType>(), Err("swimming".to_owned()));
    }

    #[test]
    fn serializes_plain_record() {
        let run = Workout::running("0000000001".into(), october_17(), LONDON, 5., 25., 178.);
        let value = serde_json::to_value(&run).unwrap();

        assert_eq!(value["type"], "running");
        assert_eq!(value["id"], "0000000001");
        assert_eq!(value["coords"], serde_json::json!([51.5, -0.1]));
        assert_eq!(value["distance"], 5.);
        assert_eq!(value["duration"], 25.);
        assert_eq!(value["cadence"], 178.);
        assert_eq!(value["pace"], 5.);
        assert_eq!(value["description"], "Running on October 17");
    }

    #[test]
    fn restoring_recomputes_derived_fields() {
        let raw = r#"{
            "type": "cycling",
            "id": "0000000007",
            "date": "2026-10-17T09:30:00.000Z",
            "coords": [51.5, -0.1],
            "distance": 20,
            "duration": 60,
            "elevationGain": 300,
            "speed": "999.00",
            "description": "Edited by hand",
            "emoji": "🚴‍♀️"
        }"#;

        let ride: Workout = serde_json::from_str(raw).unwrap();
        assert_eq!(ride.kind(), &WorkoutKind::Cycling { elevation_gain_m: 300., speed_kmh: 20. });
        assert_eq!(ride.description(), "Cycling on October 17");
        assert_eq!(ride.created_at(), october_17());
    }

    #[test]
    fn restoring_rejects_impossible_records() {
        let zero_distance = r#"{"type":"running","id":"1","date":"2026-10-17T09:30:00Z",
            "coords":[0,0],"distance":0,"duration":10,"cadence":170}"#;
        assert!(serde_json::from_str::<Workout>(zero_distance).is_err());

        let unknown_type = r#"{"type":"swimming","id":"1","date":"2026-10-17T09:30:00Z",
            "coords":[0,0],"distance":1,"duration":10}"#;
        assert!(serde_json::from_str::<Workout>(unknown_type).is_err());
    }
}
