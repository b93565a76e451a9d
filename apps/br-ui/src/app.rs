use crate::report_worker::{ReportWorker, WorkerMessage};
use crate::views::{CashflowView, CostView, MaterialView, MetricsView};
use br_app::params::{ELECTRICITY_PRICE, FEEDSTOCK_PRICE, INCOME_TAX, IRR, OPERATING_HOURS};
use br_app::{Report, ReportParams, ReportProgressEvent};
use std::path::PathBuf;

pub struct ReportApp {
    root: PathBuf,
    params: ReportParams,
    report_worker: Option<ReportWorker>,
    latest_progress: Option<ReportProgressEvent>,
    report: Option<Report>,
    failure: Option<Failure>,
    active_view: ResultTab,
    cashflow_view: CashflowView,
}

struct Failure {
    message: String,
    trace: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResultTab {
    Cost,
    CashFlow,
    Material,
}

impl ReportApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            params: ReportParams::default(),
            report_worker: None,
            latest_progress: None,
            report: None,
            failure: None,
            active_view: ResultTab::Cost,
            cashflow_view: CashflowView::default(),
        }
    }

    fn poll_worker(&mut self) {
        let mut completed = false;

        if let Some(worker) = &self.report_worker {
            while let Ok(msg) = worker.progress_rx.try_recv() {
                match msg {
                    WorkerMessage::Progress(event) => {
                        self.latest_progress = Some(event);
                    }
                    WorkerMessage::Complete(report) => {
                        self.report = Some(*report);
                        completed = true;
                        break;
                    }
                    WorkerMessage::Error { message, trace } => {
                        self.failure = Some(Failure { message, trace });
                        completed = true;
                        break;
                    }
                }
            }
        }

        if completed {
            self.report_worker = None;
            self.latest_progress = None;
        }
    }

    fn start_report(&mut self) {
        if self.report_worker.is_some() {
            return;
        }
        self.report = None;
        self.failure = None;
        self.report_worker = Some(ReportWorker::start(&self.root, self.params));
    }

    fn show_inputs(&mut self, ui: &mut egui::Ui) {
        ui.heading("Simulation inputs");
        ui.separator();

        let params = &mut self.params;
        ui.label("Operating hours");
        ui.add(
            egui::Slider::new(
                &mut params.operating_hours,
                OPERATING_HOURS.min..=OPERATING_HOURS.max,
            )
            .step_by(OPERATING_HOURS.step)
            .suffix(" h/yr"),
        );

        ui.label("Feedstock price");
        ui.add(
            egui::DragValue::new(&mut params.feedstock_price)
                .speed(FEEDSTOCK_PRICE.step)
                .range(FEEDSTOCK_PRICE.min..=FEEDSTOCK_PRICE.max)
                .prefix("$")
                .suffix("/kg"),
        );

        ui.label("Electricity price");
        ui.add(
            egui::DragValue::new(&mut params.electricity_price)
                .speed(ELECTRICITY_PRICE.step)
                .range(ELECTRICITY_PRICE.min..=ELECTRICITY_PRICE.max)
                .prefix("$")
                .suffix("/kWh"),
        );

        ui.label("Income tax rate");
        percent_slider(ui, &mut params.income_tax, INCOME_TAX.max);

        ui.label("Target IRR");
        percent_slider(ui, &mut params.irr, IRR.max);

        ui.separator();
        let running = self.report_worker.is_some();
        ui.add_enabled_ui(!running, |ui| {
            if ui.button("▶ Generate report").clicked() {
                self.start_report();
            }
        });
        ui.add_space(4.0);
        ui.small(format!("Model search root: {}", self.root.display()));
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.report_worker.is_some() {
                ui.spinner();
                match &self.latest_progress {
                    Some(event) => {
                        let mut text =
                            format!("{} ({:.1}s)", event.stage.label(), event.elapsed_wall_s);
                        if let Some(msg) = &event.message {
                            text.push_str(&format!(" - {}", msg));
                        }
                        ui.label(text);
                    }
                    None => {
                        ui.label("Starting...");
                    }
                }
            } else if let Some(report) = &self.report {
                ui.label(format!(
                    "Report {} | {} | simulated in {:.3}s ({} recycle iterations)",
                    &report.report_id[..12.min(report.report_id.len())],
                    report.generated_at,
                    report.timing.simulate_time_s,
                    report.timing.recycle_iterations
                ));
            } else if self.failure.is_some() {
                ui.colored_label(egui::Color32::RED, "Report failed");
            } else {
                ui.label("Set the inputs and generate a report");
            }
        });
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        if let Some(failure) = &self.failure {
            ui.colored_label(egui::Color32::RED, failure.message.as_str());
            ui.separator();
            ui.label("Diagnostic trace:");
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.monospace(failure.trace.as_str());
            });
            return;
        }

        let Some(report) = &self.report else {
            ui.label("No report yet");
            return;
        };

        MetricsView::show(ui, report);
        ui.separator();

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.active_view, ResultTab::Cost, "💰 Cost");
            ui.selectable_value(&mut self.active_view, ResultTab::CashFlow, "📈 Cash flow");
            ui.selectable_value(&mut self.active_view, ResultTab::Material, "🧪 Material");
        });
        ui.separator();

        match self.active_view {
            ResultTab::Cost => CostView::show(ui, &report.metrics),
            ResultTab::CashFlow => self.cashflow_view.show(ui, report),
            ResultTab::Material => MaterialView::show(ui, &report.metrics),
        }
    }
}

/// Slider over a fraction, displayed in percent.
fn percent_slider(ui: &mut egui::Ui, fraction: &mut f64, max_fraction: f64) {
    let mut percent = *fraction * 100.0;
    let response = ui.add(
        egui::Slider::new(&mut percent, 0.0..=max_fraction * 100.0)
            .step_by(1.0)
            .suffix(" %"),
    );
    if response.changed() {
        *fraction = percent / 100.0;
    }
}

impl eframe::App for ReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        if self.report_worker.is_some() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.show_status(ui);
        });

        egui::SidePanel::left("inputs")
            .default_width(240.0)
            .show(ctx, |ui| {
                self.show_inputs(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_results(ui);
        });
    }
}
