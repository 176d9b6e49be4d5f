use ratatui::style::Color;

/// Colors used by the typing screen, results screen and keyboard widget.
/// Selected by name in the config; unknown names fall back to the default
/// preset so a stale config never breaks startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub untyped: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub cursor: Color,
    pub accent: Color,
    pub dim: Color,
    pub key_idle: Color,
    pub key_active_fg: Color,
    pub key_active_bg: Color,
}

impl Theme {
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "light" => Some(Self {
                untyped: Color::Black,
                correct: Color::Green,
                incorrect: Color::Red,
                cursor: Color::Blue,
                accent: Color::Blue,
                dim: Color::Gray,
                key_idle: Color::Gray,
                key_active_fg: Color::White,
                key_active_bg: Color::Blue,
            }),
            "matrix" => Some(Self {
                untyped: Color::DarkGray,
                correct: Color::LightGreen,
                incorrect: Color::Red,
                cursor: Color::Green,
                accent: Color::Green,
                dim: Color::DarkGray,
                key_idle: Color::DarkGray,
                key_active_fg: Color::Black,
                key_active_bg: Color::Green,
            }),
            _ => None,
        }
    }

    /// The preset for `name`, or the default preset for unknown names.
    pub fn resolve(name: &str) -> Self {
        Self::named(name).unwrap_or_default()
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["default", "light", "matrix"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            untyped: Color::White,
            correct: Color::Green,
            incorrect: Color::Red,
            cursor: Color::Yellow,
            accent: Color::Magenta,
            dim: Color::DarkGray,
            key_idle: Color::DarkGray,
            key_active_fg: Color::Black,
            key_active_bg: Color::Yellow,
        }
    }
}
