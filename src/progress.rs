//! Per-level death counts and completions
//!
//! Persisted to LocalStorage. Death counts feed the taunt context.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Player progress across all levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// Level id -> total deaths
    pub deaths: BTreeMap<u32, u32>,
    /// Levels cleared at least once
    pub completed: BTreeSet<u32>,
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fakeout_progress";

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a death, returning the new total for that level
    pub fn record_death(&mut self, level_id: u32) -> u32 {
        let count = self.deaths.entry(level_id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn deaths_for(&self, level_id: u32) -> u32 {
        self.deaths.get(&level_id).copied().unwrap_or(0)
    }

    pub fn total_deaths(&self) -> u32 {
        self.deaths.values().fold(0u32, |acc, &d| acc.saturating_add(d))
    }

    /// Mark a level cleared. Returns true the first time.
    pub fn record_win(&mut self, level_id: u32) -> bool {
        self.completed.insert(level_id)
    }

    pub fn is_completed(&self, level_id: u32) -> bool {
        self.completed.contains(&level_id)
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(progress) = serde_json::from_str::<Progress>(&json) {
                    log::info!(
                        "Loaded progress: {} cleared, {} deaths",
                        progress.completed.len(),
                        progress.total_deaths()
                    );
                    return progress;
                }
                log::warn!("Stored progress unreadable, starting fresh");
            }
        }

        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Could not save progress");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_death_counts() {
        let mut progress = Progress::new();
        assert_eq!(progress.deaths_for(1), 0);
        assert_eq!(progress.record_death(1), 1);
        assert_eq!(progress.record_death(1), 2);
        assert_eq!(progress.record_death(7), 1);
        assert_eq!(progress.deaths_for(1), 2);
        assert_eq!(progress.total_deaths(), 3);
    }

    #[test]
    fn test_first_win_only_once() {
        let mut progress = Progress::new();
        assert!(progress.record_win(3));
        assert!(!progress.record_win(3));
        assert!(progress.is_completed(3));
        assert!(!progress.is_completed(4));
    }

    #[test]
    fn test_json_shape() {
        let mut progress = Progress::new();
        progress.record_death(2);
        progress.record_win(1);
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"deaths":{"2":1},"completed":[1]}"#);
        assert_eq!(serde_json::from_str::<Progress>(&json).unwrap(), progress);
    }

    #[test]
    fn test_partial_json_defaults() {
        let progress: Progress = serde_json::from_str(r#"{"completed":[1,2]}"#).unwrap();
        assert!(progress.deaths.is_empty());
        assert_eq!(progress.completed.len(), 2);
    }
}
