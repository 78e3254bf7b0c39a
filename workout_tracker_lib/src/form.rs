use std::fmt;

use crate::workout::WorkoutType;

/// Raw values as they come out of the workout form inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutForm {
    pub workout_type: String,
    pub distance: String,
    pub duration: String,
    /// Cadence for running, elevation gain for cycling. Only the visible input is read.
    pub cadence_or_elevation: String,
}

impl WorkoutForm {
    pub fn new(
        workout_type: impl Into<String>,
        distance: impl Into<String>,
        duration: impl Into<String>,
        cadence_or_elevation: impl Into<String>,
    ) -> Self {
        Self {
            workout_type: workout_type.into(),
            distance: distance.into(),
            duration: duration.into(),
            cadence_or_elevation: cadence_or_elevation.into(),
        }
    }

    pub fn validate(&self, policy: &ValidationPolicy) -> Result<WorkoutInput, ValidationError> {
        let workout_type =
            self.workout_type.parse::<WorkoutType>().map_err(ValidationError::UnknownWorkoutType)?;

        let distance_km = positive(Field::Distance, &self.distance)?;
        let duration_min = positive(Field::Duration, &self.duration)?;
        let cadence_or_elevation = match workout_type {
            WorkoutType::Running => positive(Field::Cadence, &self.cadence_or_elevation)?,
            WorkoutType::Cycling => {
                let elevation = number(Field::Elevation, &self.cadence_or_elevation)?;
                if policy.reject_negative_elevation && elevation < 0. {
                    return Err(ValidationError::Negative { field: Field::Elevation });
                }
                elevation
            }
        };

        Ok(WorkoutInput {
            workout_type,
            distance_km,
            duration_min,
            cadence_or_elevation,
        })
    }
}

/// Form input that passed validation and can be turned into a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub workout_type: WorkoutType,
    pub distance_km: f64,
    pub duration_min: f64,
    pub cadence_or_elevation: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValidationPolicy {
    pub reject_negative_elevation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Distance => "distance",
            Field::Duration => "duration",
            Field::Cadence => "cadence",
            Field::Elevation => "elevation",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown workout type {0:?}")]
    UnknownWorkoutType(String),

    #[error("{field} is not a number")]
    NotANumber { field: Field },

    #[error("{field} must be positive")]
    NotPositive { field: Field },

    #[error("{field} must not be negative")]
    Negative { field: Field },
}

fn number(field: Field, raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber { field }),
    }
}

fn positive(field: Field, raw: &str) -> Result<f64, ValidationError> {
    let value = number(field, raw)?;
    if value > 0. {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field })
    }
}
