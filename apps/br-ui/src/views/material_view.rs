use br_app::ReportMetrics;
use egui_extras::{Column, TableBuilder};

pub struct MaterialView;

impl MaterialView {
    pub fn show(ui: &mut egui::Ui, metrics: &ReportMetrics) {
        ui.heading(format!("Composition of {}", metrics.product));

        if metrics.composition.is_empty() {
            ui.label("The main product stream is empty");
            return;
        }

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::initial(180.0).at_least(120.0))
            .column(Column::initial(140.0).at_least(100.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Component");
                });
                header.col(|ui| {
                    ui.strong("Mass flow [kg/hr]");
                });
                header.col(|ui| {
                    ui.strong("Mass fraction");
                });
            })
            .body(|mut body| {
                let total = metrics.product_mass_kg_per_hr;
                for row_data in &metrics.composition {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(row_data.chemical.as_str());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.3}", row_data.mass_kg_per_hr));
                        });
                        row.col(|ui| {
                            if total > 0.0 {
                                let fraction = row_data.mass_kg_per_hr / total;
                                ui.label(format!("{:.2} %", 100.0 * fraction));
                            }
                        });
                    });
                }
            });
    }
}
