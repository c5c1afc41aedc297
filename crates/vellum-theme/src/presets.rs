//! Preset resolution: strict validation for canonical packages and
//! lenient heuristic conversion for foreign ones.
//!
//! The two operations deliberately have opposite contracts. The canonical
//! format is first-party and enforced exactly: [`validate_preset`]
//! collects one message per violated field and a single bad entry fails
//! the whole upload. Foreign payloads are loosely specified:
//! [`convert_foreign_preset`] maps known field aliases onto the schema
//! and returns `None` for entries it cannot resolve, which the caller
//! drops silently.

use crate::colors::classify;
use crate::types::{Appearance, PresetColors, PresetFonts, ThemePreset};
use serde_json::Value;

/// Alias lists of the foreign converter. These lists are the contract:
/// field names outside them are unsupported.
const NAME_ALIASES: &[&str] = &["name", "title", "label"];
const BACKGROUND_ALIASES: &[&str] = &["background", "backgroundColor", "bg"];
const FOREGROUND_ALIASES: &[&str] = &["foreground", "color", "text", "textColor", "fg"];
const ACCENT_ALIASES: &[&str] = &["accent", "accentColor", "primary", "highlight"];
const HEADING_ALIASES: &[&str] = &["heading", "headingColor"];
const LINK_ALIASES: &[&str] = &["link", "linkColor"];
const CODE_BACKGROUND_ALIASES: &[&str] = &["codeBackground", "code_background", "codeBg"];
const TITLE_FONT_ALIASES: &[&str] = &["titleFont", "headingFont", "title_font"];
const BODY_FONT_ALIASES: &[&str] = &["bodyFont", "textFont", "body_font"];

/// First string value found under any of `aliases`, in order.
fn string_alias<'a>(value: &'a Value, aliases: &[&str]) -> Option<&'a str> {
    aliases.iter().find_map(|key| value.get(key).and_then(Value::as_str))
}

/// Alias search for a color: directly on the entry, then one level deeper
/// inside a nested `colors` sub-object.
fn color_alias<'a>(value: &'a Value, aliases: &[&str]) -> Option<&'a str> {
    string_alias(value, aliases)
        .or_else(|| value.get("colors").and_then(|c| string_alias(c, aliases)))
}

// ---------------------------------------------------------------------------
// Strict path (canonical packages)
// ---------------------------------------------------------------------------

fn field_error(errors: &mut Vec<String>, index: usize, field: &str, msg: &str) {
    errors.push(format!("Preset {index}: {field} - {msg}"));
}

fn required_string(
    errors: &mut Vec<String>,
    index: usize,
    obj: &Value,
    key: &str,
    field: &str,
) -> Option<String> {
    match obj.get(key) {
        None => {
            field_error(errors, index, field, "is required");
            None
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(_) => {
            field_error(errors, index, field, "must be a non-empty string");
            None
        }
    }
}

fn optional_string(
    errors: &mut Vec<String>,
    index: usize,
    obj: &Value,
    key: &str,
    field: &str,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            field_error(errors, index, field, "must be a string");
            None
        }
    }
}

/// Validate one canonical preset entry against the full schema.
///
/// Pushes one `"Preset <n>: <field> - <message>"` entry per violation.
/// Returns the typed preset only when the entry added no errors.
pub(crate) fn validate_preset(
    index: usize,
    value: &Value,
    errors: &mut Vec<String>,
) -> Option<ThemePreset> {
    let before = errors.len();

    if !value.is_object() {
        errors.push(format!("Preset {index}: must be an object"));
        return None;
    }

    let name = required_string(errors, index, value, "name", "name");

    let appearance = match value.get("appearance") {
        None => {
            field_error(errors, index, "appearance", "is required");
            None
        }
        Some(Value::String(s)) if s == "light" => Some(Appearance::Light),
        Some(Value::String(s)) if s == "dark" => Some(Appearance::Dark),
        Some(_) => {
            field_error(errors, index, "appearance", "must be one of light, dark");
            None
        }
    };

    let mut colors = PresetColors::default();
    match value.get("colors") {
        None => field_error(errors, index, "colors", "is required"),
        Some(c) if !c.is_object() => field_error(errors, index, "colors", "must be an object"),
        Some(c) => {
            if let Some(v) = required_string(errors, index, c, "background", "colors.background") {
                colors.background = v;
            }
            if let Some(v) = required_string(errors, index, c, "foreground", "colors.foreground") {
                colors.foreground = v;
            }
            if let Some(v) = required_string(errors, index, c, "accent", "colors.accent") {
                colors.accent = v;
            }
            match c.get("accents") {
                None | Some(Value::Null) => {}
                Some(Value::Array(items))
                    if items.len() <= 5 && items.iter().all(Value::is_string) =>
                {
                    colors.accents = items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                }
                Some(_) => field_error(
                    errors,
                    index,
                    "colors.accents",
                    "must be an array of at most 5 strings",
                ),
            }
            colors.heading = optional_string(errors, index, c, "heading", "colors.heading");
            colors.link = optional_string(errors, index, c, "link", "colors.link");
            colors.code_background =
                optional_string(errors, index, c, "codeBackground", "colors.codeBackground");
        }
    }

    let fonts = match value.get("fonts") {
        None | Some(Value::Null) => None,
        Some(f) if !f.is_object() => {
            field_error(errors, index, "fonts", "must be an object");
            None
        }
        Some(f) => {
            let title = optional_string(errors, index, f, "title", "fonts.title");
            let body = optional_string(errors, index, f, "body", "fonts.body");
            if title.is_some() || body.is_some() {
                Some(PresetFonts { title, body })
            } else {
                None
            }
        }
    };

    if errors.len() != before {
        return None;
    }

    Some(ThemePreset {
        name: name?,
        appearance: appearance?,
        colors,
        fonts,
    })
}

// ---------------------------------------------------------------------------
// Lenient path (foreign packages)
// ---------------------------------------------------------------------------

/// Best-effort conversion of one loosely-shaped foreign preset entry.
///
/// Resolves colors through the documented alias lists, retrying the
/// required ones inside a nested `colors` sub-object. Entries without a
/// resolvable background and foreground are rejected (`None`); the accent
/// falls back to the foreground. The appearance honors an explicit
/// `appearance`/`mode` field when it is literally `"light"` or `"dark"`,
/// otherwise it is inferred from the background's luminance.
pub(crate) fn convert_foreign_preset(value: &Value) -> Option<ThemePreset> {
    let background = color_alias(value, BACKGROUND_ALIASES)?.to_string();
    let foreground = color_alias(value, FOREGROUND_ALIASES)?.to_string();
    let accent = color_alias(value, ACCENT_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| foreground.clone());

    let name = string_alias(value, NAME_ALIASES).unwrap_or("Unnamed").to_string();

    let appearance = match string_alias(value, &["appearance", "mode"]) {
        Some("dark") => Appearance::Dark,
        Some("light") => Appearance::Light,
        _ => classify(&background),
    };

    let accents: Vec<String> = (2..=6)
        .filter_map(|i| value.get(format!("accent{i}")).and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    let title = string_alias(value, TITLE_FONT_ALIASES).map(str::to_string);
    let body = string_alias(value, BODY_FONT_ALIASES).map(str::to_string);
    let fonts = if title.is_some() || body.is_some() {
        Some(PresetFonts { title, body })
    } else {
        None
    };

    Some(ThemePreset {
        name,
        appearance,
        colors: PresetColors {
            background,
            foreground,
            accent,
            accents,
            heading: string_alias(value, HEADING_ALIASES).map(str::to_string),
            link: string_alias(value, LINK_ALIASES).map(str::to_string),
            code_background: string_alias(value, CODE_BACKGROUND_ALIASES).map(str::to_string),
        },
        fonts,
    })
}
