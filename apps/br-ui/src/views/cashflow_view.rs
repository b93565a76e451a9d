use br_app::Report;
use br_sim::cashflow::CUMULATIVE_NPV;
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, Plot, PlotPoints};

#[derive(Default)]
pub struct CashflowView {
    show_plot: bool,
}

impl CashflowView {
    pub fn show(&mut self, ui: &mut egui::Ui, report: &Report) {
        let table = &report.metrics.cashflow;

        ui.horizontal(|ui| {
            ui.heading("Cash flow");
            ui.separator();
            ui.label(format!(
                "NPV at {:.1} % IRR: {:.3} MM$",
                report.params.irr * 100.0,
                table.npv()
            ));
            ui.separator();
            ui.checkbox(&mut self.show_plot, "Plot cumulative NPV");
        });

        if self.show_plot {
            if let Some(cumulative) = table.column(CUMULATIVE_NPV) {
                let points: Vec<[f64; 2]> = table
                    .years()
                    .iter()
                    .zip(cumulative)
                    .map(|(year, value)| [f64::from(*year), value])
                    .collect();
                let plot_points: PlotPoints = points.into();
                Plot::new("cumulative_npv")
                    .legend(Legend::default())
                    .height(220.0)
                    .x_axis_label("Year")
                    .y_axis_label("MM$")
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(plot_points).name("Cumulative NPV"));
                    });
            }
            ui.separator();
        }

        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .column(Column::exact(60.0))
                .columns(Column::initial(120.0).at_least(80.0), table.columns().len())
                .header(36.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Year");
                    });
                    for name in table.columns() {
                        header.col(|ui| {
                            ui.strong(*name);
                        });
                    }
                })
                .body(|mut body| {
                    for (year, values) in table.years().iter().zip(table.rows()) {
                        body.row(20.0, |mut row| {
                            row.col(|ui| {
                                ui.label(year.to_string());
                            });
                            for value in values {
                                row.col(|ui| {
                                    ui.label(format!("{:.3}", value));
                                });
                            }
                        });
                    }
                });
        });
    }
}
