//! Core application state and lifecycle.

use kurbo::Point;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use vocamark_core::{AnnotationLayer, CaptureDriver, CaptureUpdate, CreationGesture, Notice, NoteId};
use vocamark_surface::{activate_link, BlankSurface, DocumentSurface};

use crate::audio::{dump_clip_wav, ClipPlayer, CpalCaptureDriver};
use crate::event_handler::EventHandler;
use crate::ui::{self, render_ui, UiAction, UiState};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Document to open; a file dialog is shown when absent.
    pub document: Option<PathBuf>,
    /// The configured note-creation gesture.
    pub gesture: CreationGesture,
    /// Raster scale for page rendering.
    pub render_scale: f32,
    /// Directory for debug WAV dumps of finalized recordings.
    pub dump_audio: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Vocamark".to_string(),
            width: 1280,
            height: 800,
            document: None,
            gesture: CreationGesture::default(),
            render_scale: 1.5,
            dump_audio: None,
        }
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    // State
    layer: AnnotationLayer,
    handler: EventHandler,
    document: Box<dyn DocumentSurface>,
    driver: CpalCaptureDriver,
    players: HashMap<NoteId, ClipPlayer>,
    config: AppConfig,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Run the application.
    pub async fn run(config: AppConfig) {
        let event_loop = EventLoop::new().expect("Failed to create event loop");
        let mut app = App::new(config);
        event_loop.run_app(&mut app).expect("Event loop error");
    }
}

/// Open the configured document, falling back to a blank surface (plus a
/// notice) when it can't be opened.
fn open_document(config: &AppConfig) -> (Box<dyn DocumentSurface>, Option<Notice>) {
    let path = config.document.clone().or_else(|| {
        rfd::FileDialog::new()
            .set_title("Open Document")
            .add_filter("PDF Document", &["pdf"])
            .pick_file()
    });

    #[cfg(feature = "pdf")]
    if let Some(path) = &path {
        match vocamark_surface::PdfSurface::open(path) {
            Ok(surface) => return (Box::new(surface), None),
            Err(e) => {
                log::error!("failed to open {}: {e}", path.display());
                return (
                    Box::new(BlankSurface::new()),
                    Some(Notice::Surface(e.to_string())),
                );
            }
        }
    }

    #[cfg(not(feature = "pdf"))]
    let _ = &path;

    (Box::new(BlankSurface::new()), None)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .expect("Failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, format, egui_wgpu::RendererOptions::default());

        let (document, notice) = open_document(&self.config);
        let mut layer = AnnotationLayer::new();
        if let Some(notice) = notice {
            layer.push_notice(notice);
        }

        log::info!("Vocamark initialized - {width}x{height}");

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            surface_config,
            device,
            queue,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            layer,
            handler: EventHandler::new(),
            document,
            driver: CpalCaptureDriver::new(),
            players: HashMap::new(),
            config: self.config.clone(),
        });

        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let response = state.egui_state.on_window_event(&state.window, &event);
        if response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Run one frame: drain audio completions, refresh the page raster if
    /// needed, build the UI, apply its actions, then paint.
    fn frame(&mut self) {
        for update in self.driver.poll() {
            if let CaptureUpdate::Finished { session, clip } = &update {
                if let Some(dir) = &self.config.dump_audio {
                    dump_clip_wav(clip, &dir.join(format!("note-{session}.wav")));
                }
            }
            self.layer.apply_update(update);
        }

        if self.ui_state.texture_dirty {
            self.refresh_page();
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.egui_ctx.clone();
        let mut actions = Vec::new();
        let mut full_output = egui_ctx.run(raw_input, |ctx| {
            actions = render_ui(
                ctx,
                &self.layer,
                self.handler.dragging(),
                &mut self.ui_state,
                self.config.gesture,
                self.document.page_count(),
            );
        });
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        for action in actions {
            self.process_action(action);
        }

        for notice in self.layer.take_notices() {
            log::info!("notice: {notice}");
            self.ui_state.push_toast(notice.to_string());
        }

        self.paint(full_output);
    }

    fn process_action(&mut self, action: UiAction) {
        let container = ui::to_rect(self.ui_state.container_rect);
        match action {
            UiAction::AddNote => {
                // Cascade new notes from the top-left corner so they
                // don't stack on top of each other.
                let offset = 24.0 + 16.0 * (self.layer.len() % 8) as f64;
                self.layer
                    .create_note(Point::new(offset, offset), container.size());
            }
            UiAction::CreateAt { window_pos } => {
                self.handler
                    .create_at(&mut self.layer, ui::to_point(window_pos), container);
            }
            UiAction::DragStarted { note, window_pos } => {
                self.handler
                    .begin_drag(&self.layer, note, ui::to_point(window_pos), container);
            }
            UiAction::DragMoved { window_pos } => {
                self.handler
                    .drag_to(&mut self.layer, ui::to_point(window_pos), container);
            }
            UiAction::DragEnded => {
                self.handler.end_drag();
            }
            UiAction::Record(id) => {
                self.layer.begin_recording(id, &mut self.driver);
            }
            UiAction::StopRecord(id) => {
                self.layer.stop_recording(id, &mut self.driver);
            }
            UiAction::Play(id) => {
                if let Some(clip) = self.layer.clip_for_playback(id) {
                    let stale = self
                        .players
                        .get(&id)
                        .map(ClipPlayer::clip_released)
                        .unwrap_or(true);
                    if stale {
                        self.players.insert(id, ClipPlayer::new(clip));
                    }
                    if let Some(player) = self.players.get_mut(&id) {
                        if let Err(e) = player.play() {
                            log::error!("playback failed: {e}");
                        }
                    }
                }
            }
            UiAction::Pause(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.pause();
                }
            }
            UiAction::DeleteRecording(id) => {
                self.layer.delete_recording(id, &mut self.driver);
                self.players.remove(&id);
            }
            UiAction::RemoveNote(id) => {
                self.handler
                    .remove_note(&mut self.layer, &mut self.driver, id);
                self.players.remove(&id);
            }
            UiAction::OpenLink(index) => {
                if let Some(region) = self.ui_state.links.get(index) {
                    if let Some(page) = activate_link(&region.target) {
                        if page < self.document.page_count() {
                            self.ui_state.page = page;
                            self.ui_state.texture_dirty = true;
                        }
                    }
                }
            }
            UiAction::GoToPage(page) => {
                let last = self.document.page_count().saturating_sub(1);
                self.ui_state.page = page.min(last);
                self.ui_state.texture_dirty = true;
            }
        }
    }

    /// Rasterize the current page into an egui texture and refresh its
    /// link regions.
    fn refresh_page(&mut self) {
        let page = self.ui_state.page;
        match self.document.render_page(page, self.config.render_scale) {
            Ok(raster) => {
                let image = egui::ColorImage::from_rgb(
                    [raster.width as usize, raster.height as usize],
                    &raster.rgb,
                );
                let texture =
                    self.egui_ctx
                        .load_texture("page", image, egui::TextureOptions::LINEAR);
                self.ui_state.page_texture = Some(texture);
                self.ui_state.links = self.document.links(page, self.config.render_scale);
            }
            Err(e) => {
                log::error!("page render failed: {e}");
                self.layer.push_notice(Notice::Surface(e.to_string()));
            }
        }
        self.ui_state.texture_dirty = false;
    }

    fn paint(&mut self, full_output: egui::FullOutput) {
        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {e:?}");
                return;
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &primitives,
            &screen_descriptor,
        );

        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.12,
                        g: 0.12,
                        b: 0.13,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Use forget_lifetime to satisfy egui-wgpu's 'static requirement
        let mut render_pass = render_pass.forget_lifetime();
        self.egui_renderer
            .render(&mut render_pass, &primitives, &screen_descriptor);
        drop(render_pass);

        self.queue.submit(std::iter::once(encoder.finish()));

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        surface_texture.present();
        self.window.request_redraw();
    }
}
