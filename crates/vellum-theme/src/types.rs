//! Output data model of the theme upload pipeline.
//!
//! A [`ParsedTheme`] is the single canonical record handed to the storage
//! and rendering layers. It owns all of its content (strings and blobs are
//! copied out of the source archive), so the archive can be discarded as
//! soon as the pipeline returns.

use serde::{Deserialize, Serialize};

/// What kind of output a theme targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    Preview,
    Slideshow,
}

impl ThemeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeType::Preview => "preview",
            ThemeType::Slideshow => "slideshow",
        }
    }
}

/// Light or dark classification of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

/// A sanitized, self-contained theme record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTheme {
    pub name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub theme_type: ThemeType,
    /// Sanitized stylesheet text. Always present and non-empty.
    pub css: String,
    /// Sanitized HTML fragment, when the package carried one.
    pub template: Option<String>,
    pub presets: Vec<ThemePreset>,
    pub assets: Vec<ThemeAsset>,
    pub thumbnail: Option<ThemeAsset>,
}

/// A named light/dark color scheme belonging to a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreset {
    pub name: String,
    pub appearance: Appearance,
    pub colors: PresetColors,
    pub fonts: Option<PresetFonts>,
}

/// Color slots of a preset. Values are arbitrary CSS color syntax; the
/// pipeline does not validate them beyond presence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetColors {
    pub background: String,
    pub foreground: String,
    pub accent: String,
    /// Up to 5 extra accent colors, in declaration order.
    #[serde(default)]
    pub accents: Vec<String>,
    pub heading: Option<String>,
    pub link: Option<String>,
    pub code_background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetFonts {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A binary asset extracted from the archive (font file or thumbnail).
/// The MIME type is always inferred from the file extension, never trusted
/// from the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeAsset {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ThemeType::Preview).unwrap(), "\"preview\"");
        assert_eq!(
            serde_json::to_string(&ThemeType::Slideshow).unwrap(),
            "\"slideshow\""
        );
        assert_eq!(ThemeType::Preview.as_str(), "preview");
    }

    #[test]
    fn appearance_round_trips() {
        let json = serde_json::to_string(&Appearance::Dark).unwrap();
        assert_eq!(json, "\"dark\"");
        let back: Appearance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Appearance::Dark);
    }

    #[test]
    fn preset_serializes_camel_case() {
        let preset = ThemePreset {
            name: "Night".into(),
            appearance: Appearance::Dark,
            colors: PresetColors {
                background: "#111111".into(),
                foreground: "#eeeeee".into(),
                accent: "#00d4ff".into(),
                code_background: Some("#222222".into()),
                ..Default::default()
            },
            fonts: None,
        };
        let json = serde_json::to_string(&preset).unwrap();
        assert!(json.contains("\"codeBackground\""));
        assert!(json.contains("\"appearance\":\"dark\""));
    }
}
