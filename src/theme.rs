use eframe::egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette::DARK,
            Theme::Light => Palette::LIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientSpec {
    pub start: Color32,
    pub end: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: GradientSpec,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub placeholder_bg: Color32,
    pub placeholder_border: Color32,
    pub placeholder_icon: Color32,
    pub button_bg: Color32,
    pub button_hover: Color32,
    pub button_border: Color32,
    /// Color of the icon on the toggle: a sun in dark mode, a moon in light mode.
    pub toggle_icon: Color32,
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: GradientSpec {
            start: Color32::from_rgb(30, 30, 35),
            end: Color32::from_rgb(15, 15, 20),
        },
        text_primary: Color32::from_rgb(240, 240, 245),
        text_secondary: Color32::from_rgb(160, 160, 170),
        placeholder_bg: Color32::from_rgb(40, 40, 45),
        placeholder_border: Color32::from_rgb(80, 80, 85),
        placeholder_icon: Color32::from_rgb(100, 100, 105),
        button_bg: Color32::from_rgb(50, 50, 55),
        button_hover: Color32::from_rgb(70, 70, 75),
        button_border: Color32::from_rgb(100, 100, 110),
        toggle_icon: Color32::from_rgb(255, 220, 100),
    };

    pub const LIGHT: Palette = Palette {
        background: GradientSpec {
            start: Color32::from_rgb(245, 245, 250),
            end: Color32::from_rgb(230, 230, 240),
        },
        text_primary: Color32::from_rgb(20, 20, 25),
        text_secondary: Color32::from_rgb(80, 80, 90),
        placeholder_bg: Color32::from_rgb(220, 220, 230),
        placeholder_border: Color32::from_rgb(180, 180, 190),
        placeholder_icon: Color32::from_rgb(150, 150, 160),
        button_bg: Color32::from_rgb(210, 210, 220),
        button_hover: Color32::from_rgb(190, 190, 200),
        button_border: Color32::from_rgb(160, 160, 170),
        toggle_icon: Color32::from_rgb(100, 120, 180),
    };

    pub fn button_fill(&self, hovered: bool) -> Color32 {
        if hovered {
            self.button_hover
        } else {
            self.button_bg
        }
    }
}

/// Equalizer bars share one color across both themes.
pub const EQUALIZER_COLOR: Color32 = Color32::from_rgb(100, 200, 100);
