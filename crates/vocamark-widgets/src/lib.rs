//! Reusable styled egui components.
//!
//! Small building blocks shared by the Vocamark UI:
//!
//! - **Buttons**: glyph buttons and the two-state record button
//! - **Panels**: card and toast frames, section labels

pub mod buttons;
pub mod panel;

pub use buttons::{record_button, GlyphButton, GlyphButtonStyle};
pub use panel::{card_frame, section_label, toast_frame, toolbar_frame};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Control button size on note cards.
    pub const CONTROL: f32 = 24.0;
    /// Toolbar button size.
    pub const TOOLBAR: f32 = 28.0;
    /// Standard corner radius.
    pub const CORNER_RADIUS: u8 = 4;
    /// Card corner radius.
    pub const CARD_RADIUS: u8 = 8;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (dark gray).
    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    /// Muted text color.
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);
    /// Border color.
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Accent color (blue).
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Recording indicator (red).
    pub const RECORD: Color32 = Color32::from_rgb(220, 38, 38);
    /// Hover background.
    pub const HOVER_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Card background.
    pub const CARD_BG: Color32 = Color32::from_rgba_premultiplied(255, 252, 240, 248);
    /// Toast background.
    pub const TOAST_BG: Color32 = Color32::from_rgba_premultiplied(40, 40, 44, 240);
    /// Panel background.
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
}
