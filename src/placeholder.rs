//! Generated inline SVG placeholders used when a photo or logo fails to load.

use crate::config::SiteConfig;

const DEFAULT_GLYPH: &str = "🌟";
const DEFAULT_LABEL: &str = "Активность";

const LOGO: &str = concat!(
    "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"60\" height=\"60\" viewBox=\"0 0 24 24\">",
    "<path fill=\"%23ffb347\" d=\"M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 15l-5-5 1.41-1.41L10 14.17l7.59-7.59L19 8l-9 9z\"/>",
    "<circle cx=\"12\" cy=\"12\" r=\"10\" fill=\"none\" stroke=\"%23ff8c00\" stroke-width=\"2\"/></svg>"
);

/// Placeholder graphic for the activity at `index`: configured glyph and label, or the defaults.
pub fn activity_placeholder(config: &SiteConfig, index: usize) -> String {
    let (glyph, label) = config
        .activity_photos
        .get(index)
        .map_or((DEFAULT_GLYPH, DEFAULT_LABEL), |p| (p.glyph.as_str(), p.label.as_str()));

    format!(
        "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"200\" viewBox=\"0 0 400 200\">\
<rect width=\"400\" height=\"200\" fill=\"%23ffd8b1\"/>\
<text x=\"50%\" y=\"40%\" font-family=\"Arial\" font-size=\"36\" fill=\"%235a3921\" text-anchor=\"middle\">{glyph}</text>\
<text x=\"50%\" y=\"65%\" font-family=\"Arial\" font-size=\"16\" fill=\"%235a3921\" text-anchor=\"middle\">{label}</text></svg>"
    )
}

pub fn logo_placeholder() -> &'static str {
    LOGO
}

pub fn is_placeholder(src: &str) -> bool {
    src.starts_with("data:image/svg+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_index_uses_configured_label() {
        let config = SiteConfig::default();
        let svg = activity_placeholder(&config, 1);
        assert!(is_placeholder(&svg));
        assert!(svg.contains("🎨"));
        assert!(svg.contains("Творческие мастер-классы"));
    }

    #[test]
    fn test_unknown_index_uses_defaults() {
        let svg = activity_placeholder(&SiteConfig::default(), 42);
        assert!(svg.contains(DEFAULT_GLYPH));
        assert!(svg.contains(DEFAULT_LABEL));
    }
}
