use crate::chart_image::ChartImage;
use cd_core::PixelPoint;
use cd_session::{CurveTrace, HostKey, PointerButton, RawInput, TraceMarker};
use egui::Color32;
use egui_plot::{Line, MarkerShape, Plot, PlotImage, PlotPoint, PlotPoints, Points};

/// Image canvas: the chart image with the finished traces drawn on top.
///
/// The plot's y axis points up, so image row `r` is drawn at `y = -r`.
#[derive(Default)]
pub struct CanvasView;

impl CanvasView {
    /// Draw the canvas and return the clicks made on it, in image pixel coordinates.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        image: &ChartImage,
        traces: &[CurveTrace],
    ) -> Vec<RawInput> {
        let (w, h) = (image.width(), image.height());

        let response = Plot::new("chart_canvas")
            .data_aspect(1.0)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .show_axes([false, false])
            .show_grid([false, false])
            .show(ui, |plot_ui| {
                plot_ui.image(PlotImage::new(
                    &image.texture,
                    PlotPoint::new(w / 2.0, -h / 2.0),
                    egui::vec2(w as f32, h as f32),
                ));

                for trace in traces {
                    let [r, g, b] = trace.color.rgb();
                    let color = Color32::from_rgb(r, g, b);
                    let coords: Vec<[f64; 2]> = trace.points.iter().map(|p| [p.x, -p.y]).collect();
                    let name = format!("IGV {} {}", trace.igv, trace.chart.position());

                    plot_ui.line(
                        Line::new(PlotPoints::from(coords.clone()))
                            .color(color)
                            .width(1.5)
                            .name(&name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from(coords))
                            .shape(marker_shape(trace.marker()))
                            .radius(3.5)
                            .color(color)
                            .name(&name),
                    );
                }

                plot_ui.pointer_coordinate()
            });

        let mut clicks = Vec::new();
        let Some(pointer) = response.inner else {
            return clicks;
        };
        let point = PixelPoint::new(pointer.x, -pointer.y);
        let in_region = image.contains(point.x, point.y);

        let buttons = [
            (response.response.clicked(), PointerButton::Primary),
            (response.response.secondary_clicked(), PointerButton::Secondary),
            (response.response.middle_clicked(), PointerButton::Middle),
        ];
        for (clicked, button) in buttons {
            if clicked {
                clicks.push(RawInput::Click {
                    point,
                    button,
                    in_region,
                });
            }
        }
        clicks
    }
}

fn marker_shape(marker: TraceMarker) -> MarkerShape {
    match marker {
        TraceMarker::Circle => MarkerShape::Circle,
        TraceMarker::Square => MarkerShape::Square,
    }
}

/// Key presses of this frame, as host keys.
pub fn pressed_keys(ctx: &egui::Context) -> Vec<HostKey> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } => Some(host_key(*key)),
                _ => None,
            })
            .collect()
    })
}

pub fn host_key(key: egui::Key) -> HostKey {
    match key {
        egui::Key::Escape => HostKey::Escape,
        egui::Key::Backspace => HostKey::Backspace,
        egui::Key::Enter => HostKey::Enter,
        egui::Key::Q => HostKey::Char('q'),
        egui::Key::B => HostKey::Char('b'),
        _ => HostKey::Other,
    }
}
