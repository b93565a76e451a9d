pub mod cashflow_view;
pub mod cost_view;
pub mod material_view;
pub mod metrics_view;

pub use cashflow_view::CashflowView;
pub use cost_view::CostView;
pub use material_view::MaterialView;
pub use metrics_view::MetricsView;
