use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{error, info};

use crate::storage::{DataPath, DataPathType};
use crate::Result;

const SETTINGS_FILE: &str = "settings.json";

/// When thumbnails are allowed to animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
pub enum PlaybackMode {
    #[strum(serialize = "never")]
    Never,
    #[strum(serialize = "on-hover")]
    OnHover,
    #[default]
    #[strum(serialize = "on-select")]
    OnSelect,
    #[strum(serialize = "always")]
    Always,
}

impl PlaybackMode {
    /// Parse a stored setting. Anything unrecognised falls back to [`PlaybackMode::OnSelect`].
    pub fn from_setting(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn should_play(self, hovered: bool, selected: bool) -> bool {
        match self {
            PlaybackMode::Never => false,
            PlaybackMode::OnHover => hovered,
            PlaybackMode::OnSelect => selected,
            PlaybackMode::Always => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackMode::Never => "Never",
            PlaybackMode::OnHover => "On hover",
            PlaybackMode::OnSelect => "On select",
            PlaybackMode::Always => "Always",
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Settings {
    /// kept as the raw string so unknown values survive a round trip
    #[serde(default = "default_animated_thumbnails")]
    pub animated_thumbnails: String,
}

fn default_animated_thumbnails() -> String {
    PlaybackMode::default().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animated_thumbnails: default_animated_thumbnails(),
        }
    }
}

/// JSON backed settings store
pub struct SettingsHandler {
    directory: PathBuf,
    current_settings: Option<Settings>,
}

impl SettingsHandler {
    pub fn new(path: &DataPath) -> Self {
        Self::in_directory(path.path(DataPathType::Setting))
    }

    pub fn in_directory(directory: PathBuf) -> Self {
        Self {
            directory,
            current_settings: None,
        }
    }

    pub fn load(mut self) -> Self {
        let file = self.directory.join(SETTINGS_FILE);

        let settings = match fs::read_to_string(&file) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => settings,
                Err(_) => {
                    error!("Invalid settings format. Using defaults");
                    Settings::default()
                }
            },
            Err(_) => {
                info!("No settings at {}. Using defaults", file.display());
                Settings::default()
            }
        };

        self.current_settings = Some(settings);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.current_settings.is_some()
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.current_settings
            .as_ref()
            .map(|s| PlaybackMode::from_setting(&s.animated_thumbnails))
            .unwrap_or_default()
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        self.current_settings
            .get_or_insert_with(Settings::default)
            .animated_thumbnails = mode.to_string();
        self.try_save_settings();
    }

    fn try_save_settings(&self) {
        let Some(settings) = &self.current_settings else {
            return;
        };

        if let Err(e) = write_settings(&self.directory, settings) {
            error!("Could not save settings: {e}");
        }
    }
}

fn write_settings(directory: &Path, settings: &Settings) -> Result<()> {
    if !directory.exists() {
        fs::create_dir_all(directory)?;
    }

    let serialized = serde_json::to_string_pretty(settings)?;
    fs::write(directory.join(SETTINGS_FILE), serialized)?;
    Ok(())
}
