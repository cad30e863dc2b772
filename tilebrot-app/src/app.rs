use eframe::egui;
use tracing::{info, warn};

use tilebrot_core::{Navigator, RenderConfig};
use tilebrot_render::{
    Display, Explorer, FrameBuffer, FrameStats, RenderDriver, RenderError, RenderPhase, Renderer,
};

use crate::input::{pressed_actions, InputAction};

/// HUD box margin.
pub(crate) const HUD_MARGIN: f32 = 8.0;
/// HUD box corner radius.
pub(crate) const HUD_CORNER_RADIUS: f32 = 6.0;

// ---------------------------------------------------------------------------
// Display collaborator
// ---------------------------------------------------------------------------

/// Uploads each presented frame into a single reusable egui texture.
pub(crate) struct TextureDisplay {
    ctx: egui::Context,
    texture: Option<egui::TextureHandle>,
}

impl TextureDisplay {
    fn new(ctx: egui::Context) -> Self {
        Self { ctx, texture: None }
    }

    pub(crate) fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }
}

impl Display for TextureDisplay {
    fn present(&mut self, frame: FrameBuffer) {
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.pixels,
        );
        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::NEAREST);
            return;
        }
        self.texture = Some(
            self.ctx
                .load_texture("fractal", image, egui::TextureOptions::NEAREST),
        );
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub(crate) struct TilebrotApp {
    pub(crate) explorer: Explorer<TextureDisplay>,
    pub(crate) config: RenderConfig,
    pub(crate) last_frame: Option<FrameStats>,
    pub(crate) last_error: Option<String>,
    pub(crate) show_hud: bool,
}

impl TilebrotApp {
    pub(crate) fn new(ctx: &egui::Context, config: RenderConfig) -> Result<Self, RenderError> {
        let renderer = Renderer::from_config(&config)?;
        let repaint_ctx = ctx.clone();
        let driver =
            RenderDriver::spawn_with_notify(renderer, move || repaint_ctx.request_repaint())?;
        let navigator = Navigator::new(config.initial_viewport, config.navigation);
        let mut explorer = Explorer::new(navigator, driver, TextureDisplay::new(ctx.clone()));
        explorer.refresh()?;

        Ok(Self {
            explorer,
            config,
            last_frame: None,
            last_error: None,
            show_hud: true,
        })
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        for action in pressed_actions(ctx) {
            let requested = match action {
                InputAction::View(event) => self.explorer.handle(event).map(|_| ()),
                InputAction::Back => self.explorer.back().map(|_| ()),
                InputAction::Forward => self.explorer.forward().map(|_| ()),
                InputAction::CancelRender => {
                    if self.explorer.phase() == RenderPhase::Recomputing {
                        self.explorer.cancel();
                        info!("Render cancelled by user");
                    }
                    Ok(())
                }
                InputAction::ToggleHud => {
                    self.show_hud = !self.show_hud;
                    Ok(())
                }
            };
            if let Err(e) = requested {
                warn!(?action, "Input rejected: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn poll_frames(&mut self) {
        match self.explorer.pump() {
            Some(Ok(stats)) => {
                self.last_frame = Some(stats);
                self.last_error = None;
            }
            Some(Err(e)) => self.last_error = Some(e.to_string()),
            None => {}
        }
    }
}

impl eframe::App for TilebrotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.handle_input(ctx);
        self.poll_frames();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_size();
                let (response, painter) = ui.allocate_painter(available, egui::Sense::hover());
                if let Some(tex) = self.explorer.display().texture() {
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(tex.id(), response.rect, uv, egui::Color32::WHITE);
                }
            });

        self.show_hud(ctx);

        if self.explorer.phase() == RenderPhase::Recomputing {
            // Keep the progress readout moving.
            ctx.request_repaint();
        }
    }
}
