use eframe::egui;

use tilebrot_core::Viewport;
use tilebrot_render::{FrameStats, RenderPhase};

use crate::app::{TilebrotApp, HUD_CORNER_RADIUS, HUD_MARGIN};

/// The viewport of the frame on screen, falling back to the navigator's
/// viewport before the first frame arrives.
fn shown_viewport(last_frame: Option<&FrameStats>, requested: Viewport) -> Viewport {
    last_frame.map_or(requested, |stats| stats.viewport)
}

/// Share of the frame inside the set, in percent.
fn inside_percent(inside_pixels: usize, width: u32, height: u32) -> f64 {
    let pixels = (width as f64 * height as f64).max(1.0);
    100.0 * inside_pixels as f64 / pixels
}

impl TilebrotApp {
    pub(crate) fn show_hud(&mut self, ctx: &egui::Context) {
        if !self.show_hud {
            return;
        }

        egui::Area::new(egui::Id::new("hud_params"))
            .anchor(egui::Align2::LEFT_TOP, [HUD_MARGIN, HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(166))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.style_mut().visuals.override_text_color =
                            Some(egui::Color32::from_rgb(220, 220, 220));

                        let requested = self.explorer.viewport();
                        let vp = shown_viewport(self.last_frame.as_ref(), requested);
                        ui.label(format!(
                            "Offset: {:.10} {:+.10}i",
                            vp.offset_x(),
                            vp.offset_y()
                        ));
                        ui.label(format!("Zoom: {:.3e}", vp.zoom()));
                        ui.label(format!("Iterations: {}", self.config.max_iterations));
                        ui.label(format!(
                            "Tiles: {}×{}",
                            self.config.tiles_x, self.config.tiles_y
                        ));

                        let phase = self.explorer.phase();
                        if phase == RenderPhase::Idle && vp != requested {
                            ui.label("Current view not rendered");
                        }
                        if phase == RenderPhase::Recomputing {
                            let (done, total) = self.explorer.progress();
                            ui.label(format!("{} {done}/{total}", phase.label()));
                        } else if let Some(stats) = self.last_frame {
                            ui.label(format!(
                                "Rendered in {} ms ({} tiles, {:.1}% inside)",
                                stats.elapsed.as_millis(),
                                stats.tiles_rendered,
                                inside_percent(
                                    stats.inside_pixels,
                                    self.config.width,
                                    self.config.height
                                )
                            ));
                        }

                        if let Some(ref err) = self.last_error {
                            ui.colored_label(egui::Color32::from_rgb(255, 180, 50), err.as_str());
                        }
                    });
            });
    }
}
