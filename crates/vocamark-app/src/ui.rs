//! UI composition using egui.

use kurbo::{Point, Rect};
use std::time::Instant;
use vocamark_core::{AnnotationLayer, CreationGesture, Note, NoteId};
use vocamark_surface::LinkRegion;
use vocamark_widgets::{
    card_frame, record_button, section_label, toast_frame, toolbar_frame, GlyphButton,
    GlyphButtonStyle, theme,
};

/// How long a toast stays on screen.
const TOAST_TTL_SECS: f64 = 3.0;

/// An action requested by the UI this frame, applied by the shell after
/// the frame closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    /// Toolbar "add note" control activated.
    AddNote,
    /// Secondary click on the document surface.
    CreateAt { window_pos: egui::Pos2 },
    DragStarted { note: NoteId, window_pos: egui::Pos2 },
    DragMoved { window_pos: egui::Pos2 },
    DragEnded,
    Record(NoteId),
    StopRecord(NoteId),
    Play(NoteId),
    Pause(NoteId),
    DeleteRecording(NoteId),
    RemoveNote(NoteId),
    /// Index into the current page's link regions.
    OpenLink(usize),
    GoToPage(usize),
}

/// A transient notice shown near the bottom of the window.
struct Toast {
    text: String,
    born: Instant,
}

/// Per-frame UI state owned by the shell.
pub struct UiState {
    /// Current page of the document surface.
    pub page: usize,
    /// On-screen rectangle of the rendered page, updated every frame.
    /// This is the container for note coordinates.
    pub container_rect: egui::Rect,
    /// Uploaded raster of the current page.
    pub page_texture: Option<egui::TextureHandle>,
    /// Link regions of the current page, in container-local pixels.
    pub links: Vec<LinkRegion>,
    /// Set when the page (or document) changed and needs re-rendering.
    pub texture_dirty: bool,
    toasts: Vec<Toast>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            page: 0,
            container_rect: egui::Rect::ZERO,
            page_texture: None,
            links: Vec::new(),
            texture_dirty: true,
            toasts: Vec::new(),
        }
    }
}

impl UiState {
    pub fn push_toast(&mut self, text: String) {
        self.toasts.push(Toast {
            text,
            born: Instant::now(),
        });
    }
}

pub(crate) fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

pub(crate) fn to_rect(rect: egui::Rect) -> Rect {
    Rect::new(
        rect.min.x as f64,
        rect.min.y as f64,
        rect.max.x as f64,
        rect.max.y as f64,
    )
}

/// Build the whole UI for one frame and collect the requested actions.
pub fn render_ui(
    ctx: &egui::Context,
    layer: &AnnotationLayer,
    dragging: Option<NoteId>,
    ui_state: &mut UiState,
    gesture: CreationGesture,
    page_count: usize,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    toolbar(ctx, ui_state, gesture, page_count, &mut actions);
    document_panel(ctx, ui_state, gesture, &mut actions);
    for note in layer.notes_ordered() {
        note_card(ctx, note, ui_state, dragging, &mut actions);
    }
    toasts(ctx, ui_state);

    actions
}

fn toolbar(
    ctx: &egui::Context,
    ui_state: &UiState,
    gesture: CreationGesture,
    page_count: usize,
    actions: &mut Vec<UiAction>,
) {
    egui::TopBottomPanel::top("toolbar")
        .frame(toolbar_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Vocamark").strong().color(theme::TEXT));
                ui.separator();

                let page = ui_state.page;
                if GlyphButton::new("\u{25c0}", "Previous page")
                    .style(GlyphButtonStyle::toolbar())
                    .enabled(page > 0)
                    .show(ui)
                    .clicked()
                {
                    actions.push(UiAction::GoToPage(page - 1));
                }
                ui.label(format!("Page {} / {}", page + 1, page_count.max(1)));
                if GlyphButton::new("\u{25b6}", "Next page")
                    .style(GlyphButtonStyle::toolbar())
                    .enabled(page + 1 < page_count)
                    .show(ui)
                    .clicked()
                {
                    actions.push(UiAction::GoToPage(page + 1));
                }
                ui.separator();

                match gesture {
                    CreationGesture::AddButton => {
                        if ui.button("\u{2795} Add note").clicked() {
                            actions.push(UiAction::AddNote);
                        }
                    }
                    CreationGesture::SecondaryClick => {
                        section_label(ui, "Right-click the page to add a voice note");
                    }
                }
            });
        });
}

fn document_panel(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    gesture: CreationGesture,
    actions: &mut Vec<UiAction>,
) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::both().show(ui, |ui| {
            let Some(texture) = &ui_state.page_texture else {
                return;
            };
            let response = ui.add(egui::Image::new(texture).sense(egui::Sense::click()));
            // The container bounds for every gesture this frame. Read
            // fresh each frame: scrolling and resizing move it.
            ui_state.container_rect = response.rect;

            if let Some(pos) = response.hover_pos() {
                let local = to_point(pos) - to_point(response.rect.min).to_vec2();
                if ui_state.links.iter().any(|link| link.hit_test(local)) {
                    ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                }
            }

            if gesture == CreationGesture::SecondaryClick && response.secondary_clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    actions.push(UiAction::CreateAt { window_pos: pos });
                }
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let local = to_point(pos) - to_point(response.rect.min).to_vec2();
                    if let Some(index) = ui_state
                        .links
                        .iter()
                        .position(|link| link.hit_test(local))
                    {
                        actions.push(UiAction::OpenLink(index));
                    }
                }
            }
        });
    });
}

fn note_card(
    ctx: &egui::Context,
    note: &Note,
    ui_state: &UiState,
    dragging: Option<NoteId>,
    actions: &mut Vec<UiAction>,
) {
    let id = note.id();
    let screen_pos = ui_state.container_rect.min
        + egui::vec2(note.position.x as f32, note.position.y as f32);
    let card_size = egui::vec2(note.size.width as f32, note.size.height as f32);
    let translucent = dragging == Some(id);

    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Foreground)
        .fixed_pos(screen_pos)
        .show(ctx, |ui| {
            // The body drag region goes in first; the control buttons are
            // added after and sit on top, so a press on a control never
            // starts a drag.
            let body_rect = egui::Rect::from_min_size(screen_pos, card_size);
            let body = ui.interact(body_rect, egui::Id::new(id).with("body"), egui::Sense::drag());
            if body.drag_started() {
                if let Some(pos) = body.interact_pointer_pos() {
                    actions.push(UiAction::DragStarted {
                        note: id,
                        window_pos: pos,
                    });
                }
            } else if body.dragged() {
                if let Some(pos) = body.interact_pointer_pos() {
                    actions.push(UiAction::DragMoved { window_pos: pos });
                }
            }
            if body.drag_stopped() {
                actions.push(UiAction::DragEnded);
            }

            card_frame(translucent).show(ui, |ui| {
                ui.set_min_width(card_size.x - 16.0);

                ui.horizontal(|ui| {
                    section_label(ui, "VOICE NOTE");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let state = note.state();
                        if state.is_recording() {
                            ui.label(
                                egui::RichText::new("\u{23fa} recording")
                                    .size(11.0)
                                    .color(theme::RECORD),
                            );
                        } else if let Some(clip) = state.clip() {
                            ui.label(
                                egui::RichText::new(format_duration(clip.duration_secs()))
                                    .size(11.0)
                                    .color(theme::TEXT_MUTED),
                            );
                        }
                    });
                });

                ui.horizontal(|ui| {
                    let recording = note.state().is_recording();
                    let has_clip = note.state().has_clip();

                    if record_button(ui, recording).clicked() {
                        actions.push(if recording {
                            UiAction::StopRecord(id)
                        } else {
                            UiAction::Record(id)
                        });
                    }
                    // Play stays enabled with no clip: activating it then
                    // surfaces the "no recording yet" notice.
                    if GlyphButton::new("\u{25b6}", "Play").show(ui).clicked() {
                        actions.push(UiAction::Play(id));
                    }
                    if GlyphButton::new("\u{23f8}", "Pause")
                        .enabled(has_clip)
                        .show(ui)
                        .clicked()
                    {
                        actions.push(UiAction::Pause(id));
                    }
                    if GlyphButton::new("\u{1f5d1}", "Delete recording")
                        .enabled(has_clip || recording)
                        .show(ui)
                        .clicked()
                    {
                        actions.push(UiAction::DeleteRecording(id));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if GlyphButton::new("\u{2715}", "Remove note").show(ui).clicked() {
                            actions.push(UiAction::RemoveNote(id));
                        }
                    });
                });
            });
        });
}

fn toasts(ctx: &egui::Context, ui_state: &mut UiState) {
    ui_state
        .toasts
        .retain(|toast| toast.born.elapsed().as_secs_f64() < TOAST_TTL_SECS);

    for (i, toast) in ui_state.toasts.iter().enumerate() {
        egui::Area::new(egui::Id::new(("toast", i)))
            .order(egui::Order::Tooltip)
            .anchor(
                egui::Align2::CENTER_BOTTOM,
                egui::vec2(0.0, -16.0 - 44.0 * i as f32),
            )
            .show(ctx, |ui| {
                toast_frame().show(ui, |ui| {
                    ui.colored_label(egui::Color32::WHITE, &toast.text);
                });
            });
    }
}

fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
