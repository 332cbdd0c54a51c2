//! Color themes for the overlay bubble, keyed per scene.
//!
//! Themes are constructed once from static configuration and never mutated.
//! The primary/secondary/accent hex strings are branding reference values for
//! prompt authoring; layout consumes only the RGBA fields.

use crate::foundation::color::Rgba8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    /// Panel border base color (also drives the underline).
    pub panel_bg: Rgba8,
    pub text_color: Rgba8,
    pub outline_color: Rgba8,
}

impl Theme {
    /// Solid border color for the bubble outline: the panel base, fully opaque.
    pub fn border_color(&self) -> Rgba8 {
        self.panel_bg.opaque()
    }

    /// Underline color: the border color at reduced opacity.
    pub fn underline_color(&self) -> Rgba8 {
        self.panel_bg.with_alpha(200)
    }
}

pub const CASTLE_GOLD: Theme = Theme {
    name: "castle_gold",
    primary: "#DAA520",
    secondary: "#8B4513",
    accent: "#FFD700",
    panel_bg: Rgba8::new(139, 69, 19, 220),
    text_color: Rgba8::new(255, 255, 224, 255),
    outline_color: Rgba8::new(60, 30, 10, 255),
};

pub const FOREST_GREEN: Theme = Theme {
    name: "forest_green",
    primary: "#228B22",
    secondary: "#2E8B57",
    accent: "#90EE90",
    panel_bg: Rgba8::new(34, 100, 34, 220),
    text_color: Rgba8::new(255, 255, 224, 255),
    outline_color: Rgba8::new(10, 50, 10, 255),
};

pub const ROYAL_BLUE: Theme = Theme {
    name: "royal_blue",
    primary: "#4169E1",
    secondary: "#1E3A5F",
    accent: "#87CEEB",
    panel_bg: Rgba8::new(30, 58, 95, 220),
    text_color: Rgba8::new(255, 255, 224, 255),
    outline_color: Rgba8::new(20, 20, 80, 255),
};

pub const DRAGON_RED: Theme = Theme {
    name: "dragon_red",
    primary: "#B22222",
    secondary: "#8B0000",
    accent: "#FF4500",
    panel_bg: Rgba8::new(139, 34, 34, 220),
    text_color: Rgba8::new(255, 255, 224, 255),
    outline_color: Rgba8::new(60, 10, 10, 255),
};

pub const MANGA_DARK: Theme = Theme {
    name: "manga_dark",
    primary: "#FF4444",
    secondary: "#1a1a2e",
    accent: "#FF6B6B",
    panel_bg: Rgba8::new(20, 20, 40, 220),
    text_color: Rgba8::new(255, 255, 255, 255),
    outline_color: Rgba8::new(10, 10, 20, 255),
};

pub const BRIGHT_ENERGY: Theme = Theme {
    name: "bright_energy",
    primary: "#FF5722",
    secondary: "#E64A19",
    accent: "#FFC107",
    panel_bg: Rgba8::new(255, 87, 34, 220),
    text_color: Rgba8::new(255, 255, 255, 255),
    outline_color: Rgba8::new(139, 0, 0, 255),
};

/// Every built-in theme, in lookup order.
pub const THEMES: &[&Theme] = &[
    &CASTLE_GOLD,
    &FOREST_GREEN,
    &ROYAL_BLUE,
    &DRAGON_RED,
    &MANGA_DARK,
    &BRIGHT_ENERGY,
];

pub const DEFAULT_THEME: &Theme = &CASTLE_GOLD;

const SCENE_THEME_MAP: &[(&str, &str)] = &[
    ("s01-hook", "manga_dark"),
    ("s02-hongyou", "castle_gold"),
    ("s03-ai-era", "royal_blue"),
    ("cp1", "manga_dark"),
    ("s04a-fukugyou", "forest_green"),
    ("s05a-ai-solution", "castle_gold"),
    ("s04b-keiei", "royal_blue"),
    ("s05b-ai-expansion", "castle_gold"),
    ("s04c-ai-skill", "royal_blue"),
    ("s05c-copipe", "castle_gold"),
    ("s06-system", "castle_gold"),
    ("s07-seminar", "royal_blue"),
    ("s08-tokuten", "castle_gold"),
    ("s09-gaiyo", "forest_green"),
    ("s10-final-cta", "manga_dark"),
];

/// Look up a theme by its key, e.g. `"manga_dark"`.
pub fn theme_by_key(key: &str) -> Option<&'static Theme> {
    THEMES.iter().copied().find(|t| t.name == key)
}

/// Theme assigned to a scene, falling back to the default for unknown ids.
pub fn theme_for_scene(scene_id: &str) -> &'static Theme {
    SCENE_THEME_MAP
        .iter()
        .find(|(id, _)| *id == scene_id)
        .and_then(|(_, key)| theme_by_key(key))
        .unwrap_or(DEFAULT_THEME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mapped_scene_resolves_to_a_real_theme() {
        for (scene, key) in SCENE_THEME_MAP {
            assert!(
                theme_by_key(key).is_some(),
                "scene {scene} maps to unknown theme {key}"
            );
        }
    }

    #[test]
    fn unknown_scene_falls_back_to_default() {
        assert_eq!(theme_for_scene("s99-unknown"), DEFAULT_THEME);
    }

    #[test]
    fn scene_lookup_matches_table() {
        assert_eq!(theme_for_scene("s01-hook"), &MANGA_DARK);
        assert_eq!(theme_for_scene("s07-seminar"), &ROYAL_BLUE);
    }

    #[test]
    fn border_is_opaque_and_underline_is_translucent() {
        let t = &MANGA_DARK;
        assert_eq!(t.border_color().a, 255);
        assert_eq!(t.underline_color().a, 200);
        assert_eq!(t.border_color().r, t.panel_bg.r);
    }

    #[test]
    fn theme_keys_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            for b in &THEMES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
