//! Frontend-neutral presentation helpers: chart geometry, headline
//! formatting and error traces.

use std::error::Error;
use std::f64::consts::TAU;

use crate::metrics::{CostBreakdown, NetPower, ReportMetrics};

/// Slice colors, in drawing order.
pub const SLICE_COLORS: [[u8; 3]; 3] = [[0xff, 0x99, 0x99], [0x66, 0xb3, 0xff], [0x99, 0xff, 0x99]];

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Chart has no slices")]
    Empty,

    #[error("Slice '{label}' has invalid value {value}")]
    InvalidSlice { label: String, value: f64 },

    #[error("Slices sum to zero")]
    ZeroTotal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    pub color: [u8; 3],
    /// Radians, clockwise from 12 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn new(title: impl Into<String>, values: &[(&str, f64)]) -> Result<Self, ChartError> {
        if values.is_empty() {
            return Err(ChartError::Empty);
        }
        for (label, value) in values {
            if !value.is_finite() || *value < 0.0 {
                return Err(ChartError::InvalidSlice {
                    label: label.to_string(),
                    value: *value,
                });
            }
        }
        let total: f64 = values.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            return Err(ChartError::ZeroTotal);
        }

        let mut angle = 0.0;
        let slices = values
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let fraction = value / total;
                let start_angle = angle;
                angle += fraction * TAU;
                PieSlice {
                    label: label.to_string(),
                    value: *value,
                    fraction,
                    color: SLICE_COLORS[i % SLICE_COLORS.len()],
                    start_angle,
                    end_angle: angle,
                }
            })
            .collect();

        Ok(Self {
            title: title.into(),
            slices,
        })
    }

    pub fn from_breakdown(breakdown: &CostBreakdown) -> Result<Self, ChartError> {
        Self::new(
            "Operating cost breakdown (MM$/yr)",
            &[
                ("Materials", breakdown.material),
                ("Utilities", breakdown.utility),
                ("Fixed", breakdown.fixed),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineMetric {
    pub label: String,
    pub value: String,
}

pub fn headline_metrics(metrics: &ReportMetrics) -> [HeadlineMetric; 4] {
    [
        HeadlineMetric {
            label: "MPSP".to_string(),
            value: format!("${:.3}/kg", metrics.mpsp_usd_per_kg),
        },
        HeadlineMetric {
            label: "GWP".to_string(),
            value: format!("{:.3} kg CO2e/kg", metrics.gwp_kg_co2e_per_kg),
        },
        HeadlineMetric {
            label: "TCI".to_string(),
            value: tci_text(metrics.tci_mm_usd),
        },
        HeadlineMetric {
            label: metrics.net_power.label().to_string(),
            value: power_text(metrics.net_power),
        },
    ]
}

fn tci_text(tci_mm_usd: f64) -> String {
    format!("${:.1} MM", tci_mm_usd)
}

fn power_text(power: NetPower) -> String {
    format!("{:.1} kW", power.magnitude_kw())
}

/// The error message followed by its `source()` chain, one cause per line.
pub fn error_trace(err: &(dyn Error + 'static)) -> String {
    let mut trace = err.to_string();
    let mut previous = trace.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !previous.contains(&message) {
            trace.push_str("\n  caused by: ");
            trace.push_str(&message);
        }
        previous = message;
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn slices_cover_the_full_circle() {
        let chart = PieChart::new("c", &[("a", 1.0), ("b", 3.0)]).unwrap();
        assert_eq!(chart.slices[0].fraction, 0.25);
        assert_eq!(chart.slices[0].color, SLICE_COLORS[0]);
        assert!((chart.slices[1].end_angle - TAU).abs() < 1e-12);
    }

    #[test]
    fn invalid_charts_are_errors() {
        assert!(matches!(PieChart::new("c", &[]), Err(ChartError::Empty)));
        assert!(matches!(
            PieChart::new("c", &[("a", f64::NAN)]),
            Err(ChartError::InvalidSlice { .. })
        ));
        assert!(matches!(
            PieChart::new("c", &[("a", 0.0)]),
            Err(ChartError::ZeroTotal)
        ));
    }

    #[test]
    fn floored_breakdown_always_charts() {
        let breakdown = CostBreakdown::from_costs(0.0, 0.0, 0.0);
        let chart = PieChart::from_breakdown(&breakdown).unwrap();
        assert_eq!(chart.slices.len(), 3);
    }

    #[test]
    fn headline_values_use_one_decimal() {
        assert_eq!(tci_text(123.456), "$123.5 MM");
        assert_eq!(tci_text(0.0), "$0.0 MM");
        assert_eq!(power_text(NetPower { rate_kw: -780.0 }), "780.0 kW");
        assert_eq!(power_text(NetPower { rate_kw: 12.34 }), "12.3 kW");
    }

    #[test]
    fn trace_walks_the_source_chain() {
        let err = AppError::from(br_sim::SimError::RecycleNotConverged {
            iterations: 3,
            residual: 0.5,
            tolerance: 1e-6,
        });
        let trace = error_trace(&err);
        assert!(trace.starts_with("Simulation failed"));
        assert!(trace.contains("caused by: Recycle did not converge after 3 iterations"));
    }
}
