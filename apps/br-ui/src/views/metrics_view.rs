use br_app::{Report, headline_metrics};

pub struct MetricsView;

impl MetricsView {
    pub fn show(ui: &mut egui::Ui, report: &Report) {
        let metrics = &report.metrics;
        ui.heading(format!("{} - {}", report.system_name, metrics.product));

        ui.horizontal(|ui| {
            for metric in headline_metrics(metrics) {
                ui.group(|ui| {
                    ui.set_min_width(180.0);
                    ui.vertical(|ui| {
                        ui.small(metric.label);
                        ui.label(egui::RichText::new(metric.value).size(20.0).strong());
                    });
                });
            }
        });

        ui.label(format!(
            "Main product {:.1} kg/hr ({:?} selection)",
            metrics.product_mass_kg_per_hr, metrics.selection_basis
        ));
    }
}
