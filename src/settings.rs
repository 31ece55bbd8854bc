//! Player preferences
//!
//! Audio levels and mute behaviour. The shell hands them over as JSON; nothing
//! is stored between sessions.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Ambient loop volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
    /// Window currently unfocused (runtime only)
    #[serde(skip)]
    pub blurred: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            mute_on_blur: true,
            blurred: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.clamp_volumes();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn clamp_volumes(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
    }

    fn silenced(&self) -> bool {
        self.muted || (self.mute_on_blur && self.blurred)
    }

    /// Effective one-shot volume (respects mute and blur)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.silenced() {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective ambient volume
    pub fn effective_music_volume(&self) -> f32 {
        if self.silenced() {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"sfx_volume": 3.0}"#).expect("valid json");
        assert_eq!(settings.sfx_volume, 1.0);
        assert_eq!(settings.master_volume, 0.8);
        assert!(settings.mute_on_blur);
    }

    #[test]
    fn test_blur_mutes_only_when_enabled() {
        let mut settings = Settings {
            blurred: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        settings.mute_on_blur = false;
        assert!((settings.effective_sfx_volume() - 0.8).abs() < 1e-6);
        assert!((settings.effective_music_volume() - 0.56).abs() < 1e-6);
    }

    #[test]
    fn test_json_round_trip_skips_runtime_state() {
        let settings = Settings {
            muted: true,
            blurred: true,
            ..Settings::default()
        };
        let json = settings.to_json().expect("serialize");
        assert!(!json.contains("blurred"));
        let back = Settings::from_json(&json).expect("parse");
        assert!(back.muted);
        assert!(!back.blurred);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Settings::from_json("not json").is_err());
    }
}
