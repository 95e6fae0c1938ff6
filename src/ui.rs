use std::time::Duration;

use egui::{self, Align2, Color32, FontId, Stroke};

use vectorscope::settings::AppSettings;
use vectorscope::{DrawParams, FrameRenderer, LineSink, Point};

use crate::audio::ScopeAudio;

pub struct ScopeApp {
    renderer: FrameRenderer,
    _audio: ScopeAudio,
    settings: AppSettings,
    frame_interval: Duration,
}

impl ScopeApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        renderer: FrameRenderer,
        audio: ScopeAudio,
        settings: AppSettings,
    ) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = settings.background_color;
        cc.egui_ctx.set_visuals(visuals);

        let frame_interval = settings.frame_interval();
        log::debug!(
            "Drawing {} samples every {frame_interval:?} from '{}'",
            renderer.ring().capacity(),
            audio.device_name
        );
        Self {
            renderer,
            _audio: audio,
            settings,
            frame_interval,
        }
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(self.frame_interval);
        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.settings.background_color))
            .show(ctx, |ui| draw_scope(ui, &self.renderer, &self.settings));
    }
}

struct PainterSink<'a> {
    painter: &'a egui::Painter,
}

impl LineSink for PainterSink<'_> {
    fn line_segment(&mut self, from: Point, to: Point, width: f32, color: Color32) {
        self.painter.line_segment(
            [egui::pos2(from.x, from.y), egui::pos2(to.x, to.y)],
            Stroke::new(width, color),
        );
    }
}

fn draw_scope(ui: &mut egui::Ui, renderer: &FrameRenderer, settings: &AppSettings) {
    let rect = ui.max_rect();
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let params = DrawParams {
        offset: Point::new(center.x, center.y),
        scale: rect.width().min(rect.height()) / 2.0,
        line_width: settings.line_width,
        color: settings.line_color,
    };

    let mut sink = PainterSink { painter: &painter };
    if let Err(err) = renderer.render_frame(&mut sink, &params) {
        log::trace!("Skipping scope frame: {err}");
        painter.text(
            center,
            Align2::CENTER_CENTER,
            "Scope busy...",
            FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
    }
}
