//! Luminance-based dark/light classification of color strings.

use crate::types::Appearance;
use vellum_common::Color;

/// Classify a color string as light or dark by perceived luminance.
///
/// Accepts `#rrggbb` and `#rgb` (shorthand digits are doubled); the
/// leading `#` is optional. Anything that does not normalize to exactly
/// six hex digits is unparseable and classified as light, the safe
/// default for text-on-background decisions.
pub fn classify(color: &str) -> Appearance {
    let trimmed = color.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };

    if expanded.len() != 6 || !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return Appearance::Light;
    }

    match Color::from_hex(&expanded) {
        Some(c) if c.luminance() < 0.5 => Appearance::Dark,
        Some(_) => Appearance::Light,
        None => Appearance::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_dark_white_is_light() {
        assert_eq!(classify("#000000"), Appearance::Dark);
        assert_eq!(classify("#ffffff"), Appearance::Light);
    }

    #[test]
    fn shorthand_expands_like_full_form() {
        assert_eq!(classify("#abc"), classify("#aabbcc"));
        assert_eq!(classify("#123"), classify("#112233"));
    }

    #[test]
    fn midtones_split_on_half_luminance() {
        // 0x40 greys sit well below 0.5; 0xc0 well above
        assert_eq!(classify("#404040"), Appearance::Dark);
        assert_eq!(classify("#c0c0c0"), Appearance::Light);
    }

    #[test]
    fn green_weighs_more_than_blue() {
        assert_eq!(classify("#00ff00"), Appearance::Light);
        assert_eq!(classify("#0000ff"), Appearance::Dark);
    }

    #[test]
    fn unparseable_defaults_to_light() {
        assert_eq!(classify("tomato"), Appearance::Light);
        assert_eq!(classify("rgb(0,0,0)"), Appearance::Light);
        assert_eq!(classify("#12345"), Appearance::Light);
        assert_eq!(classify("#11223344"), Appearance::Light);
        assert_eq!(classify(""), Appearance::Light);
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(classify("000000"), Appearance::Dark);
        assert_eq!(classify("fff"), Appearance::Light);
    }
}
