//! Runtime preferences
//!
//! Persisted to LocalStorage on the web build; native builds run with
//! defaults.

use serde::{Deserialize, Serialize};

use crate::consts::KUWAHARA_RADIUS;

/// User-facing preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Active theme name
    pub theme: String,
    /// true = pointer-driven paddles, false = autonomous
    pub pointer_mode: bool,
    /// Route the overlay through the watercolor post chain
    pub stylized: bool,
    /// Kuwahara filter radius in texels
    pub kuwahara_radius: u32,
    /// Show the speed HUD in pointer mode
    pub show_speed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "Classic".to_string(),
            pointer_mode: false,
            stylized: false,
            kuwahara_radius: KUWAHARA_RADIUS,
            show_speed: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "pixel_rally_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.theme, "Classic");
        assert!(!s.pointer_mode);
        assert!(!s.stylized);
        assert_eq!(s.kuwahara_radius, 4);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut s = Settings::default();
        s.pointer_mode = true;
        s.kuwahara_radius = 6;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pointer_mode, s.pointer_mode);
        assert_eq!(back.kuwahara_radius, 6);
    }
}
