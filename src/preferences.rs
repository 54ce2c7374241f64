//! Appearance preferences. Each one is a single small document in the store.

use std::{env, fmt::Display};

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// A theme with `System` already decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn resolve(&self, system_is_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if system_is_dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }

    /// The explicit opposite of what is currently shown. Toggling always leaves `System`.
    pub fn toggled(&self, system_is_dark: bool) -> Theme {
        match self.resolve(system_is_dark) {
            ResolvedTheme::Dark => Theme::Light,
            ResolvedTheme::Light => Theme::Dark,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl Display for ResolvedTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedTheme::Light => write!(f, "light"),
            ResolvedTheme::Dark => write!(f, "dark"),
        }
    }
}

/// Guesses the terminal background from `COLORFGBG` (`fg;bg`). Without a hint the terminal is
/// assumed dark.
pub fn system_prefers_dark() -> bool {
    env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map_or(true, |bg| matches!(bg, 0..=6 | 8))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorThemeId {
    #[default]
    Ocean,
    Forest,
    Sunset,
    Midnight,
}

impl ColorThemeId {
    pub const ALL: [ColorThemeId; 4] = [
        ColorThemeId::Ocean,
        ColorThemeId::Forest,
        ColorThemeId::Sunset,
        ColorThemeId::Midnight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorThemeId::Ocean => "Ocean",
            ColorThemeId::Forest => "Forest",
            ColorThemeId::Sunset => "Sunset",
            ColorThemeId::Midnight => "Midnight",
        }
    }

    /// Primary accent as a hex colour.
    pub fn primary(&self) -> &'static str {
        match self {
            ColorThemeId::Ocean => "#0ea5e9",
            ColorThemeId::Forest => "#16a34a",
            ColorThemeId::Sunset => "#f97316",
            ColorThemeId::Midnight => "#6366f1",
        }
    }
}

impl Display for ColorThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorThemePreference {
    pub color_theme: ColorThemeId,
    pub unlocked_theme_ids: Vec<ColorThemeId>,
}

impl Default for ColorThemePreference {
    fn default() -> Self {
        Self {
            color_theme: ColorThemeId::default(),
            unlocked_theme_ids: ColorThemeId::ALL.to_vec(),
        }
    }
}

impl ColorThemePreference {
    pub fn is_unlocked(&self, id: ColorThemeId) -> bool {
        self.unlocked_theme_ids.contains(&id)
    }

    pub fn select(&self, id: ColorThemeId) -> Result<ColorThemePreference> {
        if !self.is_unlocked(id) {
            bail!("Color theme {id} is locked");
        }
        Ok(ColorThemePreference {
            color_theme: id,
            ..self.clone()
        })
    }
}
