//! Game settings and preferences
//!
//! Persisted separately from the score records in LocalStorage.

use serde::{Deserialize, Serialize};

/// LocalStorage key (used only in wasm32)
#[allow(dead_code)]
const STORAGE_KEY: &str = "flux_snake_settings";

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Particle effects on fruit collection
    pub fx_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { fx_enabled: true }
    }
}

impl Settings {
    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(STORAGE_KEY)
            && let Ok(settings) = serde_json::from_str::<Settings>(&json)
        {
            return settings;
        }
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(STORAGE_KEY, &json);
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
