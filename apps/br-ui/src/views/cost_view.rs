use br_app::{PieChart, ReportMetrics};
use egui::{Color32, Pos2, Shape, Stroke, Vec2};

/// Arc segments per full turn.
const PIE_RESOLUTION: f64 = 180.0;

pub struct CostView;

impl CostView {
    pub fn show(ui: &mut egui::Ui, metrics: &ReportMetrics) {
        match PieChart::from_breakdown(&metrics.cost_breakdown) {
            Ok(chart) => {
                ui.heading(chart.title.as_str());
                ui.horizontal(|ui| {
                    draw_pie(ui, &chart, 130.0);
                    ui.vertical(|ui| {
                        for slice in &chart.slices {
                            let [r, g, b] = slice.color;
                            let swatch = egui::RichText::new("■").color(Color32::from_rgb(r, g, b));
                            ui.horizontal(|ui| {
                                ui.label(swatch);
                                ui.label(format!(
                                    "{}: {:.2} MM$/yr ({:.1} %)",
                                    slice.label,
                                    slice.value,
                                    slice.fraction * 100.0
                                ));
                            });
                        }
                    });
                });
            }
            Err(err) => {
                ui.colored_label(
                    Color32::from_rgb(255, 165, 0),
                    format!("⚠ Cost chart unavailable: {}", err),
                );
            }
        }

        ui.separator();
        ui.label(format!(
            "ℹ Total heating duty: {:.2} MM kJ/hr",
            metrics.heating_duty_mm_kj_per_hr
        ));
    }
}

fn draw_pie(ui: &mut egui::Ui, chart: &PieChart, radius: f32) {
    let (response, painter) =
        ui.allocate_painter(Vec2::splat(2.0 * radius + 8.0), egui::Sense::hover());
    let center = response.rect.center();
    let point_at = |angle: f64| {
        // Clockwise from 12 o'clock in screen coordinates.
        Pos2::new(
            center.x + radius * angle.sin() as f32,
            center.y - radius * angle.cos() as f32,
        )
    };

    for slice in &chart.slices {
        let [r, g, b] = slice.color;
        let fill = Color32::from_rgb(r, g, b);
        let span = slice.end_angle - slice.start_angle;
        let steps = ((span / std::f64::consts::TAU) * PIE_RESOLUTION).ceil().max(1.0) as usize;
        for i in 0..steps {
            let a0 = slice.start_angle + span * i as f64 / steps as f64;
            let a1 = slice.start_angle + span * (i + 1) as f64 / steps as f64;
            painter.add(Shape::convex_polygon(
                vec![center, point_at(a0), point_at(a1)],
                fill,
                Stroke::NONE,
            ));
        }
        painter.line_segment(
            [center, point_at(slice.start_angle)],
            Stroke::new(1.5, Color32::WHITE),
        );
    }
}
