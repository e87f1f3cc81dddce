use eframe::egui::{pos2, vec2, Pos2, Rect};

pub const MARGIN: f32 = 20.0;
pub const ALBUM_SIZE: f32 = 160.0;
pub const TEXT_GAP: f32 = 25.0;
pub const TITLE_OFFSET_Y: f32 = 50.0;
pub const ARTIST_OFFSET_Y: f32 = 85.0;
pub const EQUALIZER_BASELINE_Y: f32 = 155.0;
pub const EQUALIZER_BAR_WIDTH: f32 = 5.0;
pub const EQUALIZER_BAR_STRIDE: f32 = 8.0;
pub const TOGGLE_SIZE: f32 = 40.0;
pub const TOGGLE_INSET: f32 = 15.0;

/// Where each part of the panel goes for a given window rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub window: Rect,
    pub album: Rect,
    pub text_x: f32,
    pub toggle: ToggleButton,
}

impl PanelLayout {
    pub fn for_window(window: Rect) -> Self {
        let album = Rect::from_min_size(
            window.min + vec2(MARGIN, MARGIN),
            vec2(ALBUM_SIZE, ALBUM_SIZE),
        );
        let toggle = ToggleButton::new(
            pos2(
                window.max.x - TOGGLE_SIZE - TOGGLE_INSET,
                window.max.y - TOGGLE_SIZE - TOGGLE_INSET,
            ),
            TOGGLE_SIZE,
        );

        Self {
            window,
            album,
            text_x: album.max.x + TEXT_GAP,
            toggle,
        }
    }

    pub fn title_pos(&self) -> Pos2 {
        pos2(self.text_x, self.window.min.y + TITLE_OFFSET_Y)
    }

    pub fn artist_pos(&self) -> Pos2 {
        pos2(self.text_x, self.window.min.y + ARTIST_OFFSET_Y)
    }

    /// Rect of equalizer bar `index` at the given height, standing on the
    /// shared baseline.
    pub fn equalizer_bar(&self, index: usize, height: f32) -> Rect {
        let x = self.text_x + index as f32 * EQUALIZER_BAR_STRIDE;
        let baseline = self.window.min.y + EQUALIZER_BASELINE_Y;
        Rect::from_min_max(pos2(x, baseline - height), pos2(x + EQUALIZER_BAR_WIDTH, baseline))
    }
}

/// Square theme toggle in the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleButton {
    rect: Rect,
}

impl ToggleButton {
    pub fn new(min: Pos2, size: f32) -> Self {
        Self {
            rect: Rect::from_min_size(min, vec2(size, size)),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Inclusive on all four edges: `min.x <= x <= min.x + size`, same for y.
    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.rect.min.x
            && pos.x <= self.rect.max.x
            && pos.y >= self.rect.min.y
            && pos.y <= self.rect.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_layout() -> PanelLayout {
        PanelLayout::for_window(Rect::from_min_size(Pos2::ZERO, vec2(600.0, 200.0)))
    }

    #[test]
    fn toggle_sits_in_the_bottom_right_corner() {
        let layout = default_layout();
        assert_eq!(layout.toggle.rect().min, pos2(545.0, 145.0));
        assert_eq!(layout.toggle.rect().max, pos2(585.0, 185.0));
        assert_eq!(layout.text_x, 205.0);
    }

    #[test]
    fn toggle_edges_are_inclusive() {
        let toggle = default_layout().toggle;
        assert!(toggle.contains(pos2(545.0, 145.0)));
        assert!(toggle.contains(pos2(585.0, 185.0)));
        assert!(toggle.contains(pos2(565.0, 165.0)));
        assert!(!toggle.contains(pos2(544.0, 165.0)));
        assert!(!toggle.contains(pos2(586.0, 165.0)));
        assert!(!toggle.contains(pos2(565.0, 186.0)));
        assert!(!toggle.contains(pos2(565.0, 144.0)));
    }

    #[test]
    fn equalizer_bars_share_a_baseline() {
        let layout = default_layout();
        let first = layout.equalizer_bar(0, 10.0);
        let last = layout.equalizer_bar(4, 30.0);
        assert_eq!(first.max.y, 155.0);
        assert_eq!(last.max.y, 155.0);
        assert_eq!(first.height(), 10.0);
        assert_eq!(last.min.x, 205.0 + 32.0);
    }
}
