//! Game settings and preferences
//!
//! Everything that used to be chosen on the menu screen (character skins,
//! key bindings) is carried here and handed to the round at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FPS, PLAYER_VEL};
use crate::sim::{ActorProfile, Blocking, ContactPolicy};

/// Playable character skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Skin {
    #[default]
    MaskDude,
    NinjaFrog,
    PinkMan,
    VirtualGuy,
}

impl Skin {
    pub const ALL: [Skin; 4] = [Skin::MaskDude, Skin::NinjaFrog, Skin::PinkMan, Skin::VirtualGuy];

    /// Asset directory name of the skin's sprite sheets
    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::MaskDude => "MaskDude",
            Skin::NinjaFrog => "NinjaFrog",
            Skin::PinkMan => "PinkMan",
            Skin::VirtualGuy => "VirtualGuy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "maskdude" => Some(Skin::MaskDude),
            "ninjafrog" => Some(Skin::NinjaFrog),
            "pinkman" => Some(Skin::PinkMan),
            "virtualguy" => Some(Skin::VirtualGuy),
            _ => None,
        }
    }
}

/// Keys the core understands; the window layer maps device codes onto these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    D,
    W,
    Left,
    Right,
    Up,
    Space,
    Escape,
}

/// Key bindings for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScheme {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
}

impl ControlScheme {
    /// A / D to run, W to jump
    pub const WASD: Self = Self {
        left: Key::A,
        right: Key::D,
        jump: Key::W,
    };

    /// Arrow keys to run, Space to jump
    pub const ARROWS: Self = Self {
        left: Key::Left,
        right: Key::Right,
        jump: Key::Space,
    };
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Game settings, scoped to one session and copied into each round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation rate (ticks per second)
    pub fps: u32,
    /// Horizontal run speed (pixels per tick)
    pub player_speed: f32,
    /// Character profile for player one and player two
    pub profiles: [ActorProfile; 2],
    /// Key bindings for player one and player two
    pub controls: [ControlScheme; 2],
    /// How simultaneous floor/ceiling contacts are resolved
    pub contact_policy: ContactPolicy,
    /// Which entities players collide with while moving
    pub blocking: Blocking,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: FPS,
            player_speed: PLAYER_VEL,
            // The two characters only ever differed in animation speed
            profiles: [
                ActorProfile::new(Skin::MaskDude, 3),
                ActorProfile::new(Skin::MaskDude, 2),
            ],
            controls: [ControlScheme::WASD, ControlScheme::ARROWS],
            contact_policy: ContactPolicy::default(),
            blocking: Blocking::default(),
        }
    }
}

impl Settings {
    /// Settings with the given skins and default everything else
    pub fn with_skins(first: Skin, second: Skin) -> Self {
        let mut settings = Self::default();
        settings.profiles[0].skin = first;
        settings.profiles[1].skin = second;
        settings
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.fps == 0 {
            return Err(SettingsError::Invalid("fps must be positive".into()));
        }
        if !(self.player_speed.is_finite() && self.player_speed > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "player_speed must be positive, got {}",
                self.player_speed
            )));
        }
        if let Some(p) = self.profiles.iter().find(|p| p.animation_delay == 0) {
            return Err(SettingsError::Invalid(format!(
                "{} animation_delay must be positive",
                p.skin.as_str()
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pacing() {
        let s = Settings::default();
        assert_eq!(s.fps, 60);
        assert_eq!(s.player_speed, 5.0);
        assert_eq!(s.profiles[0].animation_delay, 3);
        assert_eq!(s.profiles[1].animation_delay, 2);
        assert_eq!(s.controls[0], ControlScheme::WASD);
        assert_eq!(s.controls[1], ControlScheme::ARROWS);
        assert_eq!(s.blocking, Blocking::Everything);
    }

    #[test]
    fn test_skin_from_str() {
        assert_eq!(Skin::from_str("ninja_frog"), Some(Skin::NinjaFrog));
        assert_eq!(Skin::from_str("VirtualGuy"), Some(Skin::VirtualGuy));
        assert_eq!(Skin::from_str("nobody"), None);
        for skin in Skin::ALL {
            assert_eq!(Skin::from_str(skin.as_str()), Some(skin));
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{ "fps": 30, "blocking": "Terrain" }"#).unwrap();
        assert_eq!(s.fps, 30);
        assert_eq!(s.player_speed, 5.0);
        assert_eq!(s.blocking, Blocking::Terrain);
    }

    #[test]
    fn test_zero_fps_rejected() {
        let err = Settings::from_json(r#"{ "fps": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_with_skins() {
        let s = Settings::with_skins(Skin::PinkMan, Skin::VirtualGuy);
        assert_eq!(s.profiles[0].skin, Skin::PinkMan);
        assert_eq!(s.profiles[1].skin, Skin::VirtualGuy);
        assert_eq!(s.profiles[1].animation_delay, 2);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let s = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(s.fps, 60);
    }
}
