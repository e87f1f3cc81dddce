use std::borrow::Cow;

use eframe::egui::{
    self,
    epaint::{Mesh, Vertex},
    pos2, vec2, Align2, Color32, CornerRadius, FontId, Painter, Pos2, Rect, Stroke, TextureHandle,
};

use crate::{
    layout::PanelLayout,
    media::TrackInfo,
    theme::{GradientSpec, Palette, Theme, EQUALIZER_COLOR},
};

pub const ELLIPSIS: &str = "...";
pub const EQUALIZER_BARS: usize = 5;

const TITLE_FONT_SIZE: f32 = 28.0;
const ARTIST_FONT_SIZE: f32 = 20.0;
const PLACEHOLDER_FONT_SIZE: f32 = 60.0;
const SHADOW_OFFSET: f32 = 3.0;
const SHADOW_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 100);
const ART_BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(30, 30, 30, 30);

/// Hard truncation: text longer than `max_chars` keeps its first
/// `max_chars - 3` characters followed by `"..."`. Counts chars, not bytes.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

/// Height of equalizer bar `index` at `elapsed_secs` since start. Periodic in
/// time and always within `10.0..=30.0`.
pub fn bar_height(elapsed_secs: f32, index: usize) -> f32 {
    10.0 + (elapsed_secs * 3.0 + index as f32 * 0.5).sin().abs() * 20.0
}

pub struct PanelContent<'a> {
    pub track: &'a TrackInfo,
    pub album: Option<&'a TextureHandle>,
    pub theme: Theme,
    pub elapsed_secs: f32,
    pub toggle_hovered: bool,
    pub title_max_chars: usize,
    pub artist_max_chars: usize,
}

pub fn paint_panel(painter: &Painter, layout: &PanelLayout, content: &PanelContent<'_>) {
    let palette = content.theme.palette();

    paint_gradient_rect(painter, layout.window, &palette.background);
    paint_album(painter, layout.album, content.album, &palette);

    painter.text(
        layout.title_pos(),
        Align2::LEFT_TOP,
        truncate(&content.track.title, content.title_max_chars),
        FontId::proportional(TITLE_FONT_SIZE),
        palette.text_primary,
    );
    painter.text(
        layout.artist_pos(),
        Align2::LEFT_TOP,
        truncate(&content.track.artist, content.artist_max_chars),
        FontId::proportional(ARTIST_FONT_SIZE),
        palette.text_secondary,
    );

    for index in 0..EQUALIZER_BARS {
        let rect = layout.equalizer_bar(index, bar_height(content.elapsed_secs, index));
        painter.rect_filled(rect, CornerRadius::ZERO, EQUALIZER_COLOR);
    }

    paint_toggle(
        painter,
        layout.toggle.rect(),
        content.theme,
        &palette,
        content.toggle_hovered,
    );
}

fn paint_album(painter: &Painter, rect: Rect, album: Option<&TextureHandle>, palette: &Palette) {
    match album {
        Some(texture) => {
            let rect = album_art_rect(rect, texture.size());
            painter.rect_filled(
                rect.translate(vec2(SHADOW_OFFSET, SHADOW_OFFSET)),
                CornerRadius::ZERO,
                SHADOW_COLOR,
            );
            painter.rect_filled(rect.expand(1.0), CornerRadius::ZERO, ART_BORDER_COLOR);
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        None => {
            painter.rect_filled(rect.expand(1.0), CornerRadius::ZERO, palette.placeholder_border);
            painter.rect_filled(rect, CornerRadius::ZERO, palette.placeholder_bg);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "♪",
                FontId::proportional(PLACEHOLDER_FONT_SIZE),
                palette.placeholder_icon,
            );
        }
    }
}

/// Fits album art into its slot by width, keeping the aspect ratio. Tall
/// covers extend below the slot.
pub fn album_art_rect(slot: Rect, texture_size: [usize; 2]) -> Rect {
    let [width, height] = texture_size;
    if width == 0 || height == 0 {
        return slot;
    }
    let scale = slot.width() / width as f32;
    Rect::from_min_size(slot.min, vec2(slot.width(), height as f32 * scale))
}

fn paint_toggle(painter: &Painter, rect: Rect, theme: Theme, palette: &Palette, hovered: bool) {
    let fill = palette.button_fill(hovered);
    painter.rect_filled(rect.expand(1.0), CornerRadius::ZERO, palette.button_border);
    painter.rect_filled(rect, CornerRadius::ZERO, fill);

    let center = rect.center();
    if theme.is_dark() {
        paint_sun(painter, center, palette.toggle_icon);
    } else {
        paint_moon(painter, center, palette.toggle_icon, fill);
    }
}

fn paint_sun(painter: &Painter, center: Pos2, color: Color32) {
    painter.circle_filled(center, 8.0, color);
    let stroke = Stroke::new(2.0, color);
    for i in 0..8 {
        let angle = (i as f32 * 45.0).to_radians();
        let dir = vec2(angle.cos(), angle.sin());
        painter.line_segment([center + dir * 10.0, center + dir * 14.0], stroke);
    }
}

fn paint_moon(painter: &Painter, center: Pos2, color: Color32, cutout: Color32) {
    painter.circle_filled(center + vec2(-2.0, -2.0), 10.0, color);
    painter.circle_filled(center + vec2(3.0, -2.0), 10.0, cutout);
}

pub fn paint_gradient_rect(painter: &Painter, rect: Rect, gradient: &GradientSpec) {
    if gradient.start == gradient.end || rect.height() <= f32::EPSILON {
        painter.rect_filled(rect, CornerRadius::ZERO, gradient.start);
        return;
    }

    let mut mesh = Mesh::default();
    let v0 = push_vertex(&mut mesh, rect.left_top(), gradient.start);
    let v1 = push_vertex(&mut mesh, rect.right_top(), gradient.start);
    let v2 = push_vertex(&mut mesh, rect.left_bottom(), gradient.end);
    let v3 = push_vertex(&mut mesh, rect.right_bottom(), gradient.end);
    mesh.add_triangle(v0, v2, v1);
    mesh.add_triangle(v1, v2, v3);

    painter.add(egui::Shape::mesh(mesh));
}

fn push_vertex(mesh: &mut Mesh, pos: Pos2, color: Color32) -> u32 {
    let idx = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex {
        pos,
        uv: Pos2::new(0.0, 0.0),
        color,
    });
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_title_keeps_27_chars_and_an_ellipsis() {
        let title = "A Very Long Song Title That Exceeds Limit";
        assert_eq!(title.chars().count(), 41);

        let shown = truncate(title, 30);
        assert_eq!(shown, "A Very Long Song Title That...");
        assert_eq!(shown.chars().count(), 30);
        assert!(title.starts_with(shown.trim_end_matches(ELLIPSIS)));
    }

    #[test]
    fn text_at_the_limit_is_untouched() {
        let exact = "x".repeat(30);
        assert!(matches!(truncate(&exact, 30), Cow::Borrowed(_)));
        assert_eq!(truncate(&"x".repeat(31), 30).len(), 30);
        assert_eq!(truncate("", 30), "");
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let artist = "Sigur Rós ".repeat(5);
        let shown = truncate(&artist, 35);
        assert_eq!(shown.chars().count(), 35);
        assert!(shown.ends_with(ELLIPSIS));
    }

    #[test]
    fn album_art_scales_by_width() {
        let slot = Rect::from_min_size(pos2(20.0, 20.0), vec2(160.0, 160.0));

        let wide = album_art_rect(slot, [640, 320]);
        assert_eq!(wide.min, slot.min);
        assert_eq!(wide.size(), vec2(160.0, 80.0));

        let square = album_art_rect(slot, [300, 300]);
        assert_eq!(square, slot);

        assert_eq!(album_art_rect(slot, [0, 10]), slot);
    }

    #[test]
    fn bar_heights_are_deterministic_and_bounded() {
        for index in 0..EQUALIZER_BARS {
            for step in 0..200 {
                let t = step as f32 * 0.037;
                let h = bar_height(t, index);
                assert_eq!(h, bar_height(t, index));
                assert!((10.0..=30.0).contains(&h), "height {h} out of range");
            }
        }
        assert!((bar_height(0.0, 0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn bar_heights_repeat_with_the_sine_period() {
        let period = std::f32::consts::PI / 3.0;
        for index in 0..EQUALIZER_BARS {
            let a = bar_height(1.25, index);
            let b = bar_height(1.25 + period, index);
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn neighbouring_bars_are_out_of_phase() {
        assert_ne!(bar_height(1.0, 0), bar_height(1.0, 1));
    }
}
