//! Panel components: card, toast and toolbar frames, section labels.

use egui::{Color32, CornerRadius, Frame, Margin, Shadow, Stroke, Ui};

use crate::{sizing, theme};

/// Frame for a note card floating over the document.
pub fn card_frame(translucent: bool) -> Frame {
    let fill = if translucent {
        // Mid-drag: the card goes semi-transparent.
        theme::CARD_BG.gamma_multiply(0.55)
    } else {
        theme::CARD_BG
    };
    Frame::new()
        .fill(fill)
        .stroke(Stroke::new(1.0, theme::BORDER))
        .corner_radius(CornerRadius::same(sizing::CARD_RADIUS))
        .inner_margin(Margin::same(8))
        .shadow(Shadow {
            offset: [0, 2],
            blur: 8,
            spread: 0,
            color: Color32::from_black_alpha(40),
        })
}

/// Frame for transient toast notices.
pub fn toast_frame() -> Frame {
    Frame::new()
        .fill(theme::TOAST_BG)
        .corner_radius(CornerRadius::same(sizing::CARD_RADIUS))
        .inner_margin(Margin::symmetric(12, 8))
}

/// Frame for the top toolbar.
pub fn toolbar_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .stroke(Stroke::new(1.0, theme::BORDER))
        .inner_margin(Margin::symmetric(8, 6))
}

/// Muted small-caps-style section label.
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(
        egui::RichText::new(text)
            .size(11.0)
            .color(theme::TEXT_MUTED),
    );
}
