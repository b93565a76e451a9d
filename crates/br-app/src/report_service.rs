//! Report orchestration: locate, load, build, inject, simulate, select and
//! measure.

use std::path::{Path, PathBuf};
use std::time::Instant;

use br_sim::SimulationSummary;
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::hash::compute_report_id;
use crate::metrics::{ReportMetrics, compute_metrics};
use crate::model_service::{MODEL_FILE_NAME, ModelCache};
use crate::params::{InjectionSummary, ReportParams, inject_parameters};
use crate::progress::{ReportProgressEvent, ReportStage};
use crate::selector::select_main_product;

/// Request to generate one report.
pub struct ReportRequest<'a> {
    /// Directory searched recursively for the model file.
    pub root: &'a Path,
    pub params: ReportParams,
    /// Cache to load through; the process-wide cache when `None`.
    pub cache: Option<&'a ModelCache>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTimingSummary {
    pub load_time_s: f64,
    pub build_time_s: f64,
    pub simulate_time_s: f64,
    pub metrics_time_s: f64,
    pub total_time_s: f64,
    pub recycle_iterations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub report_id: String,
    /// RFC 3339.
    pub generated_at: String,
    pub model_path: PathBuf,
    pub system_id: String,
    pub system_name: String,
    pub params: ReportParams,
    pub injection: InjectionSummary,
    pub simulation: SimulationSummary,
    pub metrics: ReportMetrics,
    pub timing: ReportTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(ReportProgressEvent)>,
    stage: ReportStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(ReportProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Generate a report without progress reporting.
pub fn generate_report(request: &ReportRequest) -> AppResult<Report> {
    generate_report_with_progress(request, None)
}

/// Generate a report and stream stage events. Any failure aborts the run;
/// no metrics are produced for a failed simulation.
pub fn generate_report_with_progress(
    request: &ReportRequest,
    mut progress_cb: Option<&mut dyn FnMut(ReportProgressEvent)>,
) -> AppResult<Report> {
    let started = Instant::now();
    let mut timing = ReportTimingSummary::default();

    request.params.validate()?;
    let cache = request.cache.unwrap_or_else(|| ModelCache::global());

    emit_progress(
        &mut progress_cb,
        ReportStage::LocatingModel,
        started,
        Some(format!("Searching {}", request.root.display())),
    );
    let load_started = Instant::now();
    let loaded = cache
        .load_system_core(request.root)?
        .ok_or_else(|| AppError::ModelNotFound {
            root: request.root.to_path_buf(),
            file_name: MODEL_FILE_NAME.to_string(),
        })?;
    timing.load_time_s = load_started.elapsed().as_secs_f64();
    emit_progress(
        &mut progress_cb,
        ReportStage::LoadingModel,
        started,
        Some(format!("Loaded {}", loaded.path().display())),
    );

    emit_progress(&mut progress_cb, ReportStage::BuildingSystem, started, None);
    let build_started = Instant::now();
    let mut system = loaded.build_system()?;
    timing.build_time_s = build_started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        ReportStage::InjectingParameters,
        started,
        None,
    );
    let injection = inject_parameters(&mut system, &request.params);

    emit_progress(&mut progress_cb, ReportStage::Simulating, started, None);
    let simulate_started = Instant::now();
    let simulation = system.simulate()?;
    timing.simulate_time_s = simulate_started.elapsed().as_secs_f64();
    timing.recycle_iterations = simulation.iterations;

    emit_progress(
        &mut progress_cb,
        ReportStage::SelectingProduct,
        started,
        None,
    );
    let selection = select_main_product(system.products())?;

    emit_progress(
        &mut progress_cb,
        ReportStage::ComputingMetrics,
        started,
        Some(format!("Main product: {}", selection.stream.id())),
    );
    let metrics_started = Instant::now();
    let metrics = compute_metrics(&system, &selection)?;
    timing.metrics_time_s = metrics_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    let system_def = loaded.system_def();
    let report = Report {
        report_id: compute_report_id(system_def, &request.params),
        generated_at: chrono::Utc::now().to_rfc3339(),
        model_path: loaded.path().to_path_buf(),
        system_id: system_def.id.clone(),
        system_name: system_def.name.clone(),
        params: request.params,
        injection,
        simulation,
        metrics,
        timing,
    };
    info!(
        report = %report.report_id,
        product = %report.metrics.product,
        mpsp = report.metrics.mpsp_usd_per_kg,
        "report generated"
    );

    emit_progress(
        &mut progress_cb,
        ReportStage::Completed,
        started,
        Some("Report completed".to_string()),
    );
    Ok(report)
}
