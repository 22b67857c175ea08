//! Local best-score table
//!
//! Top scores for this browser, persisted as JSON in LocalStorage.

use serde::{Deserialize, Serialize};

/// Entries kept in the table
pub const TABLE_SIZE: usize = 10;

/// One finished session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    /// Level reached when the timer ran out
    pub level: u32,
    /// Unix timestamp in milliseconds
    pub when_ms: f64,
}

/// Best scores, sorted descending; older entries rank above equal newcomers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "reflex_rush_highscores";

    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Record a finished session. Returns the 1-based rank if the score made
    /// the table.
    pub fn record(&mut self, score: u32, level: u32, when_ms: f64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        self.entries.push(ScoreEntry {
            score,
            level,
            when_ms,
        });
        // Stable sort keeps earlier sessions ahead of equal scores
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(TABLE_SIZE);

        self.entries
            .iter()
            .position(|e| e.when_ms == when_ms && e.score == score)
            .map(|i| i + 1)
    }

    /// Load the table from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::default()
    }

    /// Save the table to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
