//! Best-score record and play counter
//!
//! Persisted to LocalStorage, read at bootstrap and written only on the
//! terminal transition. Storage failures and corrupted JSON degrade to
//! safe defaults; the engine never observes them.

use serde::{Deserialize, Serialize};

/// LocalStorage keys (used only in wasm32)
#[allow(dead_code)]
const HIGH_SCORE_KEY: &str = "flux_snake_highscore";
#[allow(dead_code)]
const GAMES_PLAYED_KEY: &str = "flux_snake_games_played";

/// The single persisted best-score record. Last write wins; no schema
/// versioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestScore {
    pub score: u32,
    /// ISO-8601 timestamp of when the score was achieved
    pub date: String,
}

impl BestScore {
    /// Does a finished run beat the stored record?
    pub fn beaten_by(current: Option<&BestScore>, score: u32) -> bool {
        score > 0 && current.map(|record| score > record.score).unwrap_or(true)
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
}

/// Load the stored record, if any
#[cfg(target_arch = "wasm32")]
pub fn get_high_score() -> Option<BestScore> {
    let storage = local_storage()?;
    let json = storage.get_item(HIGH_SCORE_KEY).ok()??;
    match serde_json::from_str::<BestScore>(&json) {
        Ok(record) => Some(record),
        Err(_) => {
            log::warn!("Corrupted high score record, ignoring");
            None
        }
    }
}

/// Overwrite the stored record with a new score, dated now
#[cfg(target_arch = "wasm32")]
pub fn persist_high_score(score: u32) {
    let record = BestScore {
        score,
        date: js_sys::Date::new_0()
            .to_iso_string()
            .as_string()
            .unwrap_or_default(),
    };
    if let Some(storage) = local_storage()
        && let Ok(json) = serde_json::to_string(&record)
    {
        let _ = storage.set_item(HIGH_SCORE_KEY, &json);
        log::info!("High score saved: {}", score);
    }
}

/// Number of completed runs on this device
#[cfg(target_arch = "wasm32")]
pub fn games_played() -> u32 {
    local_storage()
        .and_then(|storage| storage.get_item(GAMES_PLAYED_KEY).ok().flatten())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Increment and return the play counter
#[cfg(target_arch = "wasm32")]
pub fn bump_games_played() -> u32 {
    let next = games_played() + 1;
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(GAMES_PLAYED_KEY, &next.to_string());
    }
    next
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn get_high_score() -> Option<BestScore> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn persist_high_score(_score: u32) {
    // No-op for native
}

#[cfg(not(target_arch = "wasm32"))]
pub fn games_played() -> u32 {
    0
}

#[cfg(not(target_arch = "wasm32"))]
pub fn bump_games_played() -> u32 {
    0
}
