//! Config module.
//! Site configuration: backend/asset paths, carousel slides, activity photo list and the
//! page timing constants (stagger, debounce, banner lifetime, header offset).
//! Uses serde for JSON serialization; every field has a default so a partial file works.
//! No config file means the built-in defaults are used as-is.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A slide shown in the hero carousel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// A photo bound to an activity position, plus what the placeholder shows if it fails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityPhoto {
    pub file: String,
    pub label: String,
    pub glyph: String,
}

/// Delays and offsets in milliseconds / pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timings {
    /// Wait after a list render before the reveal sweep starts.
    pub settle_ms: u64,
    /// Per-item reveal interval.
    pub stagger_ms: u64,
    pub hero_reveal_ms: u64,
    pub scroll_debounce_ms: u64,
    pub scroll_into_view_ms: u64,
    pub banner_dismiss_ms: u64,
    pub carousel_interval_ms: u64,
    pub photo_check_ms: u64,
    pub photo_sweep_ms: u64,
    /// Distance below the viewport top used as the scroll-spy reference point.
    pub spy_offset_px: f64,
    /// Fixed header height subtracted from anchor scroll targets.
    pub header_offset_px: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            stagger_ms: 100,
            hero_reveal_ms: 300,
            scroll_debounce_ms: 100,
            scroll_into_view_ms: 100,
            banner_dismiss_ms: 5000,
            carousel_interval_ms: 4000,
            photo_check_ms: 3000,
            photo_sweep_ms: 2000,
            spy_offset_px: 100.0,
            header_offset_px: 80.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub backend_path: String,
    pub assets_path: String,
    pub carousel_slides: Vec<CarouselSlide>,
    pub activity_photos: Vec<ActivityPhoto>,
    pub timings: Timings,
}

fn slide(icon: &str, title: &str, description: &str) -> CarouselSlide {
    CarouselSlide {
        icon: icon.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn photo(file: &str, label: &str, glyph: &str) -> ActivityPhoto {
    ActivityPhoto {
        file: file.to_string(),
        label: label.to_string(),
        glyph: glyph.to_string(),
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            backend_path: "backend/".to_string(),
            assets_path: "assets/".to_string(),
            carousel_slides: vec![
                slide(
                    "bi-translate",
                    "Английский 24/7",
                    "Весь день на английском: игры, общение, мероприятия и вечерние шоу",
                ),
                slide(
                    "bi-people-fill",
                    "Опытные педагоги",
                    "Создают тёплую атмосферу, даже если ребёнок только начинает учить язык",
                ),
                slide(
                    "bi-heart-fill",
                    "Безопасная среда",
                    "Забота о каждом ребёнке и комфортная атмосфера для изучения языка",
                ),
            ],
            activity_photos: vec![
                photo("activity-adventures.jpg", "Приключенческие игры", "🏕️"),
                photo("activity-art.jpg", "Творческие мастер-классы", "🎨"),
                photo("activity-sports.jpg", "Спортивные игры", "⚽"),
                photo("activity-show.jpg", "Вечерние шоу", "🎭"),
                photo("activity-language.jpg", "Языковые игры", "💬"),
                photo("activity-team.jpg", "Команда организаторов", "👥"),
            ],
            timings: Timings::default(),
        }
    }
}

impl SiteConfig {
    /// Path of an activity photo relative to the site root, if the index has one.
    pub fn activity_photo_path(&self, index: usize) -> Option<String> {
        self.activity_photos
            .get(index)
            .map(|p| format!("{}photos/{}", self.assets_path, p.file))
    }
}

/// Loads a config file; fields missing from the file keep their defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SiteConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Uses `path` when given, otherwise the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(SiteConfig::default()),
    }
}
