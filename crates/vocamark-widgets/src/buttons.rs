//! Button components: glyph buttons and the record/stop toggle.

use egui::{
    vec2, Align2, Color32, CornerRadius, CursorIcon, FontId, Response, Sense, Stroke, StrokeKind,
    Ui, Vec2,
};

use crate::{sizing, theme};

/// Style configuration for glyph buttons.
#[derive(Clone)]
pub struct GlyphButtonStyle {
    /// Button size.
    pub size: Vec2,
    /// Glyph font size.
    pub font_size: f32,
    /// Corner radius.
    pub corner_radius: u8,
    /// Background color when idle.
    pub bg_color: Color32,
    /// Background color when hovered.
    pub hover_color: Color32,
    /// Glyph color.
    pub glyph_color: Color32,
}

impl Default for GlyphButtonStyle {
    fn default() -> Self {
        Self {
            size: vec2(sizing::CONTROL, sizing::CONTROL),
            font_size: 13.0,
            corner_radius: sizing::CORNER_RADIUS,
            bg_color: Color32::TRANSPARENT,
            hover_color: theme::HOVER_BG,
            glyph_color: theme::TEXT,
        }
    }
}

impl GlyphButtonStyle {
    /// Toolbar variant (slightly larger, bordered).
    pub fn toolbar() -> Self {
        Self {
            size: vec2(sizing::TOOLBAR, sizing::TOOLBAR),
            font_size: 15.0,
            ..Default::default()
        }
    }

    /// Tinted glyph variant.
    pub fn tinted(color: Color32) -> Self {
        Self {
            glyph_color: color,
            ..Default::default()
        }
    }
}

/// A compact button showing a single glyph, with a hover tooltip.
pub struct GlyphButton<'a> {
    glyph: &'a str,
    tooltip: &'a str,
    enabled: bool,
    style: GlyphButtonStyle,
}

impl<'a> GlyphButton<'a> {
    pub fn new(glyph: &'a str, tooltip: &'a str) -> Self {
        Self {
            glyph,
            tooltip,
            enabled: true,
            style: GlyphButtonStyle::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn style(mut self, style: GlyphButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Show the button. Returns the response; use `clicked()`.
    pub fn show(self, ui: &mut Ui) -> Response {
        let sense = if self.enabled {
            Sense::click()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(self.style.size, sense);

        if ui.is_rect_visible(rect) {
            let bg = if response.hovered() && self.enabled {
                self.style.hover_color
            } else {
                self.style.bg_color
            };
            let radius = CornerRadius::same(self.style.corner_radius);
            ui.painter().rect_filled(rect, radius, bg);
            if response.hovered() && self.enabled {
                ui.painter().rect_stroke(
                    rect,
                    radius,
                    Stroke::new(1.0, theme::BORDER),
                    StrokeKind::Inside,
                );
            }

            let color = if self.enabled {
                self.style.glyph_color
            } else {
                theme::TEXT_MUTED
            };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.glyph,
                FontId::proportional(self.style.font_size),
                color,
            );
        }

        if self.enabled {
            response
                .on_hover_cursor(CursorIcon::PointingHand)
                .on_hover_text(self.tooltip)
        } else {
            response.on_hover_text(self.tooltip)
        }
    }
}

/// The record control: a red dot while idle, a stop square while a
/// recording is in progress.
pub fn record_button(ui: &mut Ui, recording: bool) -> Response {
    let (glyph, tooltip) = if recording {
        ("\u{23f9}", "Stop recording")
    } else {
        ("\u{23fa}", "Record")
    };
    GlyphButton::new(glyph, tooltip)
        .style(GlyphButtonStyle::tinted(theme::RECORD))
        .show(ui)
}
