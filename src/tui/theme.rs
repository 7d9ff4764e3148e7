// SPDX-License-Identifier: MIT
use ratatui::style::{Color, Modifier, Style};

/// RGB endpoint for gradient interpolation.
pub type Rgb = (u8, u8, u8);

pub struct Theme {
    pub name: &'static str,
    pub border: Color,
    pub title: Color,
    pub dim: Color,
    pub ok: Color,
    pub warn: Color,
    pub crit: Color,
    pub status_fg: Color,
    pub status_bg: Color,
    pub cpu_gradient: (Rgb, Rgb),
    pub mem_gradient: (Rgb, Rgb),
    pub gpu_gradient: (Rgb, Rgb),
    #[allow(dead_code)]
    pub net_gradient: (Rgb, Rgb),
}

impl Theme {
    /// Color for a 0-100 load figure: calm below 50, hot above 80.
    #[must_use]
    pub fn level_color(&self, pct: f64) -> Color {
        if pct < 50.0 {
            self.ok
        } else if pct < 80.0 {
            self.warn
        } else {
            self.crit
        }
    }

    #[must_use]
    pub fn level_style(&self, pct: f64) -> Style {
        Style::default().fg(self.level_color(pct))
    }

    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    #[must_use]
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    #[must_use]
    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.status_fg).bg(self.status_bg)
    }
}

pub static THEMES: [Theme; 4] = [
    Theme {
        name: "default",
        border: Color::Gray,
        title: Color::White,
        dim: Color::DarkGray,
        ok: Color::Green,
        warn: Color::Yellow,
        crit: Color::Red,
        status_fg: Color::Black,
        status_bg: Color::Gray,
        cpu_gradient: ((46, 204, 113), (231, 76, 60)),
        mem_gradient: ((52, 152, 219), (155, 89, 182)),
        gpu_gradient: ((241, 196, 15), (231, 76, 60)),
        net_gradient: ((26, 188, 156), (41, 128, 185)),
    },
    Theme {
        name: "nord",
        border: Color::Rgb(76, 86, 106),
        title: Color::Rgb(236, 239, 244),
        dim: Color::Rgb(97, 110, 136),
        ok: Color::Rgb(163, 190, 140),
        warn: Color::Rgb(235, 203, 139),
        crit: Color::Rgb(191, 97, 106),
        status_fg: Color::Rgb(46, 52, 64),
        status_bg: Color::Rgb(136, 192, 208),
        cpu_gradient: ((136, 192, 208), (94, 129, 172)),
        mem_gradient: ((163, 190, 140), (235, 203, 139)),
        gpu_gradient: ((180, 142, 173), (191, 97, 106)),
        net_gradient: ((143, 188, 187), (129, 161, 193)),
    },
    Theme {
        name: "gruvbox",
        border: Color::Rgb(124, 111, 100),
        title: Color::Rgb(235, 219, 178),
        dim: Color::Rgb(146, 131, 116),
        ok: Color::Rgb(184, 187, 38),
        warn: Color::Rgb(250, 189, 47),
        crit: Color::Rgb(251, 73, 52),
        status_fg: Color::Rgb(40, 40, 40),
        status_bg: Color::Rgb(215, 153, 33),
        cpu_gradient: ((184, 187, 38), (251, 73, 52)),
        mem_gradient: ((131, 165, 152), (211, 134, 155)),
        gpu_gradient: ((250, 189, 47), (254, 128, 25)),
        net_gradient: ((142, 192, 124), (69, 133, 136)),
    },
    Theme {
        name: "matrix",
        border: Color::Rgb(0, 135, 0),
        title: Color::Rgb(0, 255, 65),
        dim: Color::Rgb(0, 95, 0),
        ok: Color::Rgb(0, 255, 65),
        warn: Color::Rgb(180, 255, 65),
        crit: Color::Rgb(255, 255, 255),
        status_fg: Color::Black,
        status_bg: Color::Rgb(0, 175, 0),
        cpu_gradient: ((0, 95, 0), (0, 255, 65)),
        mem_gradient: ((0, 95, 0), (0, 255, 65)),
        gpu_gradient: ((0, 95, 0), (0, 255, 65)),
        net_gradient: ((0, 95, 0), (0, 255, 65)),
    },
];

/// Theme lookup by name; unknown names fall back to the default theme.
#[must_use]
pub fn by_name(name: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|theme| theme.name.eq_ignore_ascii_case(name))
        .unwrap_or(&THEMES[0])
}

/// Index of a theme within [`THEMES`]; defaults to 0 for unknown names.
#[must_use]
pub fn index_of(name: &str) -> usize {
    THEMES
        .iter()
        .position(|theme| theme.name == name)
        .unwrap_or(0)
}

pub const SPARK_CHARS: [char; 9] = [
    ' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}',
    '\u{2588}',
];
pub const BAR_FILLED: char = '\u{2588}';
pub const BAR_EMPTY: char = '\u{2591}';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_default() {
        assert_eq!(by_name("no-such-theme").name, "default");
        assert_eq!(index_of("no-such-theme"), 0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(by_name("NORD").name, "nord");
    }

    #[test]
    fn every_theme_is_addressable() {
        for (index, theme) in THEMES.iter().enumerate() {
            assert_eq!(by_name(theme.name).name, theme.name);
            assert_eq!(index_of(theme.name), index);
        }
    }

    #[test]
    fn level_thresholds() {
        let theme = &THEMES[0];
        assert_eq!(theme.level_color(10.0), theme.ok);
        assert_eq!(theme.level_color(65.0), theme.warn);
        assert_eq!(theme.level_color(95.0), theme.crit);
    }
}
