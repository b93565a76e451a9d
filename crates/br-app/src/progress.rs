use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportStage {
    LocatingModel,
    LoadingModel,
    BuildingSystem,
    InjectingParameters,
    Simulating,
    SelectingProduct,
    ComputingMetrics,
    Completed,
}

impl ReportStage {
    pub fn label(self) -> &'static str {
        match self {
            ReportStage::LocatingModel => "Locating model",
            ReportStage::LoadingModel => "Loading model",
            ReportStage::BuildingSystem => "Building system",
            ReportStage::InjectingParameters => "Injecting parameters",
            ReportStage::Simulating => "Simulating",
            ReportStage::SelectingProduct => "Selecting product",
            ReportStage::ComputingMetrics => "Computing metrics",
            ReportStage::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportProgressEvent {
    pub stage: ReportStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl ReportProgressEvent {
    pub fn stage(stage: ReportStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
