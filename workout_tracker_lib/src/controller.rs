use chrono::{DateTime, FixedOffset, Local};

use crate::{
    config::TrackerConfig,
    coordinates::Coordinates,
    form::{ValidationError, WorkoutForm},
    presentation::{self, ListEntry, Popup},
    storage::KeyValueStorage,
    store::{Bounds, WorkoutStore},
    workout::{Workout, WorkoutId},
};

pub const GEOLOCATION_NOTICE: &str = "Could not get your position";

/// The map widget.
pub trait MapView {
    /// Centers a new map on `center`. Clicks on the map are expected to come back
    /// through `SessionController::on_map_click`.
    fn create_map(&mut self, center: Coordinates, zoom: f64);

    fn add_marker(&mut self, id: &WorkoutId, coordinates: Coordinates, popup: &Popup);

    fn pan_to(&mut self, coordinates: Coordinates, zoom: f64, duration_secs: f64);

    fn fit_bounds(&mut self, bounds: Bounds);
}

/// The form, the workout list and page level effects.
pub trait WorkoutView {
    fn show_form(&mut self);

    fn hide_form(&mut self);

    fn clear_fields(&mut self);

    /// A short shake that clears itself.
    fn shake_form(&mut self);

    /// Swaps the cadence input for the elevation input or back.
    fn toggle_elevation_field(&mut self);

    fn render_workout(&mut self, entry: ListEntry);

    fn notify(&mut self, message: &str);

    fn reload(&mut self);
}

/// The current time in the user's offset. Descriptions use that offset's day.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("permission to read the position was denied")]
    PermissionDenied,

    #[error("position is unavailable")]
    Unavailable,

    #[error("timed out waiting for a position")]
    Timeout,
}

impl GeolocationError {
    /// Maps a `PositionError.code` from the browser.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("no location picked on the map")]
    NoPendingLocation,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    /// The map was clicked and the form is open.
    AwaitingFormInput { pending: Coordinates },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapStatus {
    #[default]
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub map: MapStatus,
}

impl SessionState {
    pub fn pending(&self) -> Option<Coordinates> {
        match self.phase {
            Phase::AwaitingFormInput { pending } => Some(pending),
            Phase::Idle => None,
        }
    }

    pub fn map_ready(&self) -> bool {
        self.map == MapStatus::Ready
    }
}

/// Owns the workouts and the session state, and drives the map, the view and the
/// storage in response to user events.
pub struct SessionController<M, V, S, C = SystemClock> {
    config: TrackerConfig,
    store: WorkoutStore,
    state: SessionState,
    map: M,
    view: V,
    storage: S,
    clock: C,
}

impl<M, V, S, C> SessionController<M, V, S, C>
where
    M: MapView,
    V: WorkoutView,
    S: KeyValueStorage,
    C: Clock,
{
    pub fn new(config: TrackerConfig, map: M, view: V, storage: S, clock: C) -> Self {
        Self {
            config,
            store: WorkoutStore::new(),
            state: SessionState::default(),
            map,
            view,
            storage,
            clock,
        }
    }

    /// Loads the stored workouts. Nothing is drawn until a position arrives.
    pub fn start(&mut self) {
        self.store.load(&self.storage, &self.config.storage_key);
        tracing::debug!("Started with {} stored workouts", self.store.len());
    }

    pub fn on_position(&mut self, position: Result<Coordinates, GeolocationError>) {
        match position {
            Ok(center) => {
                if self.state.map_ready() {
                    tracing::debug!("Map already created, ignoring position {center:?}");
                    return;
                }

                self.map.create_map(center, self.config.map_zoom);
                self.state.map = MapStatus::Ready;
                tracing::debug!("Map created at {center:?}");

                for workout in self.store.all() {
                    draw(&mut self.map, &mut self.view, workout);
                }
            }
            Err(err) => {
                tracing::warn!("Geolocation failed: {err}");
                self.view.notify(GEOLOCATION_NOTICE);
            }
        }
    }

    pub fn on_map_click(&mut self, coordinates: Coordinates) {
        if !self.state.map_ready() {
            tracing::debug!("Map click before the map exists");
            return;
        }

        self.state.phase = Phase::AwaitingFormInput { pending: coordinates };
        self.view.clear_fields();
        self.view.show_form();
    }

    pub fn on_form_submit(&mut self, form: &WorkoutForm) -> Result<WorkoutId, SubmitError> {
        let Some(pending) = self.state.pending() else {
            tracing::warn!("Form submitted without a map location");
            return Err(SubmitError::NoPendingLocation);
        };

        let input = match form.validate(&self.config.validation_policy()) {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!("Rejected form: {err}");
                self.view.shake_form();
                return Err(err.into());
            }
        };

        let now = self.clock.now();
        let id = self.store.next_id(now);
        let workout = Workout::new(id.clone(), now, pending, &input);
        tracing::info!("New workout {}: {}", workout.id(), workout.description());

        self.store.append(workout);
        self.persist();
        if let Some(workout) = self.store.find_by_id(&id) {
            draw(&mut self.map, &mut self.view, workout);
        }

        self.view.hide_form();
        self.view.clear_fields();
        self.state.phase = Phase::Idle;

        Ok(id)
    }

    /// Pans to the workout. Returns whether it was found.
    pub fn on_workout_list_click(&mut self, id: &WorkoutId) -> bool {
        let Some(workout) = self.store.find_by_id(id) else {
            tracing::warn!("No workout with id {id}");
            return false;
        };

        if self.state.map_ready() {
            let (zoom, duration) = (self.config.map_zoom, self.config.pan_duration_secs);
            self.map.pan_to(workout.coordinates(), zoom, duration);
        }
        true
    }

    pub fn on_workout_type_change(&mut self) {
        self.view.toggle_elevation_field();
    }

    pub fn on_show_all(&mut self) {
        if !self.state.map_ready() {
            return;
        }

        if let Some(bounds) = self.store.bounds() {
            self.map.fit_bounds(bounds);
        }
    }

    /// Forgets every workout and reloads the page.
    pub fn reset(&mut self) {
        tracing::info!("Resetting, dropping {} workouts", self.store.len());
        self.storage.remove(&self.config.storage_key);
        self.store.clear();
        self.state = SessionState::default();
        self.view.reload();
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&mut self.storage, &self.config.storage_key) {
            tracing::error!("Failed to save workouts: {err}");
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn draw(map: &mut impl MapView, view: &mut impl WorkoutView, workout: &Workout) {
    map.add_marker(workout.id(), workout.coordinates(), &presentation::popup(workout));
    view.render_workout(presentation::list_entry(workout));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_error_codes() {
        assert_eq!(GeolocationError::from_code(1), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(2), GeolocationError::Unavailable);
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
        assert_eq!(GeolocationError::from_code(0), GeolocationError::Unavailable);
    }
}
