use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use geo_types::{coord, Rect};

use crate::{
    storage::{KeyValueStorage, StorageError},
    workout::{Workout, WorkoutId},
};

/// A lat/lng box in `geo_types` axes: x is longitude, y is latitude.
pub type Bounds = Rect<f64>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// All workouts in the order they were added.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    // Every id this store has handed out or restored, so ids are never reused.
    seen_ids: HashSet<WorkoutId>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, workout: Workout) {
        self.seen_ids.insert(workout.id().clone());
        self.workouts.push(workout);
    }

    pub fn all(&self) -> impl Iterator<Item = &Workout> + Clone + '_ {
        self.workouts.iter()
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|workout| workout.id() == id)
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// An id derived from `now` that no workout in this store has used.
    pub fn next_id(&mut self, now: DateTime<FixedOffset>) -> WorkoutId {
        let mut id = WorkoutId::from_timestamp_millis(now.timestamp_millis());
        while self.seen_ids.contains(&id) {
            id = id.successor();
        }
        self.seen_ids.insert(id.clone());
        id
    }

    pub fn serialize(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.workouts)?)
    }

    /// Replaces the workouts with the ones in `raw`. Missing, empty or unreadable
    /// input leaves the store as it is.
    pub fn restore(&mut self, raw: Option<&str>) {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            tracing::debug!("No stored workouts");
            return;
        };

        let workouts = match serde_json::from_str::<Option<Vec<Workout>>>(raw) {
            Ok(Some(workouts)) => workouts,
            Ok(None) => {
                tracing::debug!("Stored workouts are null");
                return;
            }
            Err(err) => {
                tracing::warn!("Ignoring unreadable stored workouts: {err}");
                return;
            }
        };

        tracing::info!("Restored {} workouts", workouts.len());
        self.seen_ids.extend(workouts.iter().map(|workout| workout.id().clone()));
        self.workouts = workouts;
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    pub fn load(&mut self, storage: &impl KeyValueStorage, key: &str) {
        let raw = storage.get(key);
        self.restore(raw.as_deref());
    }

    pub fn save(&self, storage: &mut impl KeyValueStorage, key: &str) -> Result<(), StoreError> {
        storage.set(key, self.serialize()?)?;
        Ok(())
    }

    /// The smallest box containing every workout, `None` when there are none.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut coords = self.workouts.iter().map(|workout| workout.coordinates());
        let first = coords.next()?;

        let (min, max) = coords.fold(
            ((first.longitude(), first.latitude()), (first.longitude(), first.latitude())),
            |((min_x, min_y), (max_x, max_y)), c| {
                (
                    (min_x.min(c.longitude()), min_y.min(c.latitude())),
                    (max_x.max(c.longitude()), max_y.max(c.latitude())),
                )
            },
        );

        Some(Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{coordinates::Coordinates, storage::MemoryStorage};

    fn at(minute: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, minute, 0).unwrap().fixed_offset()
    }

    fn sample_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        let id = store.next_id(at(0));
        store.append(Workout::running(id, at(0), Coordinates::new(51.5, -0.1), 5., 25., 178.));
        let id = store.next_id(at(30));
        store.append(Workout::cycling(id, at(30), Coordinates::new(48.85, 2.35), 20., 60., 300.));
        let id = store.next_id(at(45));
        store.append(Workout::running(id, at(45), Coordinates::new(52.52, 13.4), 10.2, 55.5, 165.));
        store
    }

    #[test]
    fn round_trip_keeps_order_and_fields() {
        let store = sample_store();
        let raw = store.serialize().unwrap();

        let mut restored = WorkoutStore::new();
        restored.restore(Some(&raw));

        assert_eq!(restored.all().collect::<Vec<_>>(), store.all().collect::<Vec<_>>());
    }

    #[test]
    fn all_is_restartable() {
        let store = sample_store();
        let iter = store.all();
        assert_eq!(iter.clone().count(), 3);
        assert_eq!(iter.count(), 3);
        assert_eq!(store.all().count(), 3);
    }

    #[test]
    fn restore_without_data_keeps_existing_workouts() {
        let mut store = sample_store();
        let broken = [Some("{not json"), Some(r#"[{"type":"running"}]"#)];
        for raw in [None, Some(""), Some("   "), Some("null")].into_iter().chain(broken) {
            store.restore(raw);
            assert_eq!(store.len(), 3, "restore({raw:?}) changed the store");
        }
    }

    #[test]
    fn restore_replaces_existing_workouts() {
        let mut store = sample_store();
        store.restore(Some("[]"));
        assert!(store.is_empty());
    }

    #[test]
    fn find_by_id_hits_and_misses() {
        let store = sample_store();
        let second = store.all().nth(1).unwrap();

        assert_eq!(store.find_by_id(second.id()), Some(second));
        assert_eq!(store.find_by_id(&WorkoutId::from("missing")), None);
    }

    #[test]
    fn next_id_never_repeats_within_a_millisecond() {
        let mut store = WorkoutStore::new();
        let first = store.next_id(at(0));
        let second = store.next_id(at(0));
        assert_ne!(first, second);
        assert_eq!(second, first.successor());
    }

    #[test]
    fn next_id_skips_restored_ids() {
        let raw = sample_store().serialize().unwrap();
        let mut store = WorkoutStore::new();
        store.restore(Some(&raw));

        let id = store.next_id(at(0));
        assert!(store.find_by_id(&id).is_none());
    }

    #[test]
    fn ids_stay_reserved_after_clear() {
        let mut store = sample_store();
        let first = store.all().next().unwrap().id().clone();
        store.clear();
        assert_ne!(store.next_id(at(0)), first);
    }

    #[test]
    fn save_and_load_through_storage() {
        let store = sample_store();
        let mut storage = MemoryStorage::new();
        store.save(&mut storage, "workouts").unwrap();

        let mut loaded = WorkoutStore::new();
        loaded.load(&storage, "workouts");
        assert_eq!(loaded.len(), 3);

        let mut untouched = WorkoutStore::new();
        untouched.load(&storage, "other");
        assert!(untouched.is_empty());
    }

    struct FullStorage;

    impl KeyValueStorage for FullStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                key: key.to_owned(),
                reason: "QuotaExceededError".into(),
            })
        }

        fn remove(&mut self, _key: &str) {}
    }

    #[test]
    fn save_reports_write_failures() {
        let store = sample_store();
        let err = store.save(&mut FullStorage, "workouts").unwrap_err();

        let StoreError::Storage(StorageError::WriteFailed { key, .. }) = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(key, "workouts");
        assert_eq!(err.to_string(), "storage error: failed to write workouts: QuotaExceededError");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn bounds_cover_every_workout() {
        assert_eq!(WorkoutStore::new().bounds(), None);

        let bounds = sample_store().bounds().unwrap();
        assert_eq!(bounds.min(), coord! { x: -0.1, y: 48.85 });
        assert_eq!(bounds.max(), coord! { x: 13.4, y: 52.52 });
    }
}
