//! Colour themes for rendered documents.
//!
//! The palette feeds two places: the document stylesheet in
//! [`crate::pipeline::compose`] and the inline styles that
//! [`crate::pipeline::markup`] stamps onto generated tags. Inline styles are
//! what survive rasterisers that ignore `<style>` blocks, so both must agree.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Visual theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
    Contrast,
}

/// Concrete colours for one theme, as CSS colour strings.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub heading: &'static str,
    pub secondary: &'static str,
    pub border: &'static str,
    pub user_bubble: &'static str,
    pub assistant_bubble: &'static str,
    pub user_avatar: &'static str,
    pub assistant_avatar: &'static str,
    pub accent: &'static str,
    pub code_bg: &'static str,
    pub code_fg: &'static str,
    pub code_badge: &'static str,
    pub inline_code_bg: &'static str,
    pub inline_code_fg: &'static str,
    pub quote_bg: &'static str,
}

static LIGHT: Palette = Palette {
    background: "#ffffff",
    surface: "#ffffff",
    text: "rgba(0, 0, 0, 0.85)",
    heading: "rgba(0, 0, 0, 0.88)",
    secondary: "rgba(0, 0, 0, 0.45)",
    border: "#f0f0f0",
    user_bubble: "#fafafa",
    assistant_bubble: "#e6f7ff",
    user_avatar: "#faad14",
    assistant_avatar: "#1890ff",
    accent: "#1890ff",
    code_bg: "#282c34",
    code_fg: "#e5e5e5",
    code_badge: "#096dd9",
    inline_code_bg: "rgba(255, 36, 66, 0.1)",
    inline_code_fg: "#e30b29",
    quote_bg: "#fafafa",
};

static DARK: Palette = Palette {
    background: "#1a1a1a",
    surface: "#1f1f1f",
    text: "#e0e0e0",
    heading: "#f5f5f5",
    secondary: "#9e9e9e",
    border: "#3a3a3a",
    user_bubble: "#2d2d2d",
    assistant_bubble: "#252525",
    user_avatar: "#d48806",
    assistant_avatar: "#177ddc",
    accent: "#64b5f6",
    code_bg: "#2d2d2d",
    code_fg: "#e5e5e5",
    code_badge: "#177ddc",
    inline_code_bg: "#2d2d2d",
    inline_code_fg: "#ff7875",
    quote_bg: "#252525",
};

static SEPIA: Palette = Palette {
    background: "#f8f1e3",
    surface: "#f8f1e3",
    text: "#5b4636",
    heading: "#4a3628",
    secondary: "#8a7560",
    border: "#e0d6c2",
    user_bubble: "#eee4d3",
    assistant_bubble: "#f3ead8",
    user_avatar: "#b07d48",
    assistant_avatar: "#8b5a2b",
    accent: "#8b5a2b",
    code_bg: "#3b3024",
    code_fg: "#f3ead8",
    code_badge: "#8b5a2b",
    inline_code_bg: "#eee4d3",
    inline_code_fg: "#8b3a2b",
    quote_bg: "#eee4d3",
};

static CONTRAST: Palette = Palette {
    background: "#ffffff",
    surface: "#ffffff",
    text: "#000000",
    heading: "#000000",
    secondary: "#333333",
    border: "#000000",
    user_bubble: "#ffffff",
    assistant_bubble: "#ffffff",
    user_avatar: "#000000",
    assistant_avatar: "#000000",
    accent: "#0000ee",
    code_bg: "#000000",
    code_fg: "#ffffff",
    code_badge: "#000000",
    inline_code_bg: "#ffffff",
    inline_code_fg: "#000000",
    quote_bg: "#ffffff",
};

impl Theme {
    pub fn palette(&self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
            Theme::Sepia => &SEPIA,
            Theme::Contrast => &CONTRAST,
        }
    }

    /// Canvas fill colour used when compositing a captured page.
    pub fn background_rgba(&self) -> Rgba<u8> {
        match self {
            Theme::Dark => Rgba([0x1a, 0x1a, 0x1a, 0xff]),
            Theme::Sepia => Rgba([0xf8, 0xf1, 0xe3, 0xff]),
            Theme::Light | Theme::Contrast => Rgba([0xff, 0xff, 0xff, 0xff]),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
            Theme::Contrast => "contrast",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    /// Unknown names (including the stored `"auto"`) resolve to light.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            "sepia" => Theme::Sepia,
            "contrast" => Theme::Contrast,
            _ => Theme::Light,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_matches_palette() {
        assert_eq!(Theme::Dark.palette().background, "#1a1a1a");
        assert_eq!(Theme::Dark.background_rgba(), Rgba([26, 26, 26, 255]));
        assert_eq!(Theme::Sepia.palette().background, "#f8f1e3");
        assert_eq!(Theme::Sepia.background_rgba(), Rgba([248, 241, 227, 255]));
    }

    #[test]
    fn unknown_theme_is_light() {
        assert_eq!("auto".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
