//! Persisted user preferences
//!
//! The pinned selection and the clock mode, loaded once from a
//! [`KeyValueStore`] and written back after every mutation. Both entries are
//! independent: touching one never rewrites the other. Loading never fails;
//! missing or malformed entries fall back to an empty selection and
//! [`ClockMode::Digital`].

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{self, KeyValueStore};
use crate::face::ClockMode;
use crate::pinned::{PinnedError, PinnedTimezoneList, ToggleOutcome};
use crate::timezones::Timezone;

/// Storage key of the pinned selection
pub const PINNED_KEY: &str = "highlighted_timezones";
/// Storage key of the clock mode
pub const CLOCK_MODE_KEY: &str = "clock_mode";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PinnedEntry {
    #[serde(default)]
    zones: Vec<Timezone>,
}

pub struct PreferenceStore<S: KeyValueStore> {
    storage: S,
    pinned: PinnedTimezoneList,
    clock_mode: ClockMode,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn load(storage: S) -> Self {
        let pinned = load_pinned(&storage);
        let clock_mode = load_clock_mode(&storage);
        info!(
            "Loaded preferences: {} pinned, {} mode",
            pinned.len(),
            clock_mode
        );
        Self {
            storage,
            pinned,
            clock_mode,
        }
    }

    pub fn pinned(&self) -> &PinnedTimezoneList {
        &self.pinned
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Pin or unpin a timezone. A full list ignores new zones.
    pub fn toggle_pinned(&mut self, timezone: &Timezone) -> ToggleOutcome {
        let outcome = self.pinned.toggle(timezone);
        match outcome {
            ToggleOutcome::AtCapacity => {
                debug!("Pinned list full, ignoring {}", timezone.id);
            }
            ToggleOutcome::Added | ToggleOutcome::Removed => self.save_pinned(),
        }
        outcome
    }

    pub fn remove_pinned(&mut self, id: &str) -> bool {
        let removed = self.pinned.remove(id);
        if removed {
            self.save_pinned();
        }
        removed
    }

    pub fn reorder_pinned(&mut self, sequence: Vec<Timezone>) -> Result<(), PinnedError> {
        self.pinned.reorder(sequence)?;
        self.save_pinned();
        Ok(())
    }

    pub fn set_clock_mode(&mut self, mode: ClockMode) {
        if mode == self.clock_mode {
            return;
        }
        self.clock_mode = mode;
        if let Err(e) = self.storage.write(CLOCK_MODE_KEY, mode.as_str()) {
            warn!("Failed to save clock mode: {}", e);
        }
    }

    fn save_pinned(&mut self) {
        let entry = PinnedEntry {
            zones: self.pinned.as_slice().to_vec(),
        };
        if let Err(e) = config::save_entry(&mut self.storage, PINNED_KEY, &entry) {
            warn!("Failed to save pinned timezones: {}", e);
        }
    }
}

fn load_pinned(storage: &impl KeyValueStore) -> PinnedTimezoneList {
    match config::load_entry::<PinnedEntry>(storage, PINNED_KEY) {
        Ok(Some(entry)) => PinnedTimezoneList::from_saved(entry.zones),
        Ok(None) => PinnedTimezoneList::new(),
        Err(e) => {
            warn!("Ignoring stored pinned timezones: {}", e);
            PinnedTimezoneList::new()
        }
    }
}

fn load_clock_mode(storage: &impl KeyValueStore) -> ClockMode {
    match storage.read(CLOCK_MODE_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored clock mode: {}", e);
            ClockMode::default()
        }),
        Ok(None) => ClockMode::default(),
        Err(e) => {
            warn!("Failed to read clock mode: {}", e);
            ClockMode::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, FileStore, MemoryStore};
    use crate::timezones::find_timezone;
    use std::io;

    fn zone(id: &str) -> Timezone {
        find_timezone(id).unwrap().clone()
    }

    /// Reads nothing, refuses every write
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> config::Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _value: &str) -> config::Result<()> {
            Err(ConfigError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")))
        }

        fn remove(&mut self, _key: &str) -> config::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let prefs = PreferenceStore::load(MemoryStore::new());
        assert!(prefs.pinned().is_empty());
        assert_eq!(prefs.clock_mode(), ClockMode::Digital);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let mut prefs = PreferenceStore::load(MemoryStore::new());
        for id in ["Asia/Tokyo", "Europe/London", "America/New_York"] {
            prefs.toggle_pinned(&zone(id));
        }
        prefs.set_clock_mode(ClockMode::Analog);

        let reloaded = PreferenceStore::load(prefs.into_storage());
        assert_eq!(
            reloaded.pinned().ids(),
            vec!["Asia/Tokyo", "Europe/London", "America/New_York"]
        );
        assert_eq!(reloaded.clock_mode(), ClockMode::Analog);
    }

    #[test]
    fn test_round_trip_through_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut prefs = PreferenceStore::load(FileStore::new(tmp.path()));
        let tokyo = zone("Asia/Tokyo");
        let paris = zone("Europe/Paris");
        prefs.toggle_pinned(&tokyo);
        prefs.toggle_pinned(&paris);
        prefs.reorder_pinned(vec![paris, tokyo]).unwrap();
        prefs.set_clock_mode(ClockMode::Hybrid);

        let reloaded = PreferenceStore::load(FileStore::new(tmp.path()));
        assert_eq!(reloaded.pinned().ids(), vec!["Europe/Paris", "Asia/Tokyo"]);
        assert_eq!(reloaded.clock_mode(), ClockMode::Hybrid);
    }

    #[test]
    fn test_malformed_entries_fall_back() {
        let mut storage = MemoryStore::new();
        storage.write(PINNED_KEY, "zones = \"not a list\"").unwrap();
        storage.write(CLOCK_MODE_KEY, "sundial").unwrap();

        let prefs = PreferenceStore::load(storage);
        assert!(prefs.pinned().is_empty());
        assert_eq!(prefs.clock_mode(), ClockMode::Digital);
    }

    #[test]
    fn test_entries_are_independent() {
        let mut prefs = PreferenceStore::load(MemoryStore::new());
        prefs.set_clock_mode(ClockMode::Analog);
        assert!(prefs.storage().get(PINNED_KEY).is_none());
        assert_eq!(prefs.storage().get(CLOCK_MODE_KEY), Some("analog"));

        prefs.toggle_pinned(&zone("Asia/Tokyo"));
        assert!(prefs.storage().get(PINNED_KEY).unwrap().contains("Asia/Tokyo"));
    }

    #[test]
    fn test_capacity_toggle_is_not_persisted() {
        let mut prefs = PreferenceStore::load(MemoryStore::new());
        let picks: Vec<Timezone> = crate::timezones::all_timezones().take(6).cloned().collect();
        for tz in &picks[..5] {
            prefs.toggle_pinned(tz);
        }
        let before = prefs.storage().get(PINNED_KEY).map(str::to_string);

        assert_eq!(prefs.toggle_pinned(&picks[5]), ToggleOutcome::AtCapacity);
        assert_eq!(prefs.storage().get(PINNED_KEY).map(str::to_string), before);
    }

    #[test]
    fn test_write_failure_keeps_state() {
        let mut prefs = PreferenceStore::load(BrokenStore);
        prefs.toggle_pinned(&zone("Asia/Tokyo"));
        prefs.set_clock_mode(ClockMode::Hybrid);

        assert_eq!(prefs.pinned().ids(), vec!["Asia/Tokyo"]);
        assert_eq!(prefs.clock_mode(), ClockMode::Hybrid);
        assert!(prefs.remove_pinned("Asia/Tokyo"));
        assert!(prefs.pinned().is_empty());
    }

    #[test]
    fn test_bad_reorder_leaves_storage_alone() {
        let mut prefs = PreferenceStore::load(MemoryStore::new());
        prefs.toggle_pinned(&zone("Asia/Tokyo"));
        let before = prefs.storage().get(PINNED_KEY).map(str::to_string);

        assert!(prefs.reorder_pinned(vec![zone("Europe/Paris")]).is_err());
        assert_eq!(prefs.storage().get(PINNED_KEY).map(str::to_string), before);
    }
}
