//! Shared application service layer for the biorefinery report.
//!
//! Both the CLI and the desktop UI go through this crate: model discovery
//! and caching, parameter injection, product selection, metric computation
//! and report orchestration.

pub mod error;
pub mod hash;
pub mod metrics;
pub mod model_service;
pub mod params;
pub mod presentation;
pub mod progress;
pub mod report_service;
pub mod selector;

pub use error::{AppError, AppResult};
pub use metrics::{CompositionRow, CostBreakdown, NetPower, ReportMetrics, compute_metrics};
pub use model_service::{
    LoadedModel, MODEL_FILE_NAME, ModelCache, PREFERRED_SYSTEM_ID, SystemSummary,
    list_systems, load_model, validate_model,
};
pub use params::{FeedRole, InjectedFeed, InjectionSummary, ReportParams, inject_parameters};
pub use presentation::{
    ChartError, HeadlineMetric, PieChart, PieSlice, error_trace, headline_metrics,
};
pub use progress::{ReportProgressEvent, ReportStage};
pub use report_service::{
    Report, ReportRequest, ReportTimingSummary, generate_report, generate_report_with_progress,
};
pub use selector::{Selection, SelectionBasis, select_main_product};
