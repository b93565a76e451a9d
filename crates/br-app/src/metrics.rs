//! Headline metrics and result tables derived from a simulated system.

use br_sim::{CashflowTable, GWP, Stream, System, Unit};
use serde::Serialize;

use crate::error::AppResult;
use crate::selector::{Selection, SelectionBasis};

/// Added to the product flow so an empty product does not divide by zero.
pub const EMISSIONS_EPSILON: f64 = 1e-6;
/// Smallest cost slice drawn in the breakdown chart (MM$/yr).
pub const MIN_COST_SLICE: f64 = 0.1;
/// Components at or below this flow (kg/hr) are dropped from the table.
pub const COMPOSITION_THRESHOLD: f64 = 0.001;

/// `Σ (gwp or 0) × mass / (product mass + ε)` over `(gwp, kg/hr)` feeds.
pub fn normalized_emissions<I>(feeds: I, product_mass: f64) -> f64
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let total: f64 = feeds
        .into_iter()
        .map(|(gwp, mass)| gwp.unwrap_or(0.0) * mass)
        .sum();
    total / (product_mass + EMISSIONS_EPSILON)
}

/// kg CO2e per kg of `product`, from the system's feeds.
pub fn emissions_intensity(system: &System, product: &Stream) -> f64 {
    normalized_emissions(
        system
            .feeds()
            .map(|s| (s.characterization_factor(GWP), s.f_mass())),
        product.f_mass(),
    )
}

/// Yearly operating cost split (MM$/yr), each slice floored for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub material: f64,
    pub utility: f64,
    /// Whatever VOC holds beyond materials and utilities.
    pub fixed: f64,
}

impl CostBreakdown {
    /// Inputs in USD/yr.
    pub fn from_costs(material_usd: f64, utility_usd: f64, voc_usd: f64) -> Self {
        let residual = voc_usd - material_usd - utility_usd;
        Self {
            material: floor_slice(material_usd / 1e6),
            utility: floor_slice(utility_usd / 1e6),
            fixed: floor_slice(residual / 1e6),
        }
    }
}

fn floor_slice(value_mm: f64) -> f64 {
    if value_mm.is_finite() {
        value_mm.max(MIN_COST_SLICE)
    } else {
        MIN_COST_SLICE
    }
}

/// Net electricity (kW); negative means the plant exports power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetPower {
    pub rate_kw: f64,
}

impl NetPower {
    pub fn is_export(&self) -> bool {
        self.rate_kw < 0.0
    }

    pub fn label(&self) -> &'static str {
        if self.is_export() {
            "Net export (CHP)"
        } else {
            "Net consumption"
        }
    }

    pub fn magnitude_kw(&self) -> f64 {
        self.rate_kw.abs()
    }
}

/// Sum of positive heat-utility duties over all units (kJ/hr).
pub fn heating_duty(units: &[Unit]) -> f64 {
    units
        .iter()
        .flat_map(|u| u.heat_utilities())
        .map(|hu| hu.duty)
        .filter(|duty| *duty > 0.0)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub chemical: String,
    pub mass_kg_per_hr: f64,
}

pub fn composition(stream: &Stream) -> Vec<CompositionRow> {
    stream
        .composition()
        .filter(|(_, mass)| *mass > COMPOSITION_THRESHOLD)
        .map(|(chemical, mass)| CompositionRow {
            chemical: chemical.to_string(),
            mass_kg_per_hr: mass,
        })
        .collect()
}

/// Everything a report shows about one simulated system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub product: String,
    pub selection_basis: SelectionBasis,
    pub product_mass_kg_per_hr: f64,
    /// Break-even selling price (USD/kg).
    pub mpsp_usd_per_kg: f64,
    /// kg CO2e per kg product.
    pub gwp_kg_co2e_per_kg: f64,
    pub tci_mm_usd: f64,
    pub net_power: NetPower,
    pub cost_breakdown: CostBreakdown,
    pub heating_duty_mm_kj_per_hr: f64,
    pub composition: Vec<CompositionRow>,
    pub cashflow: CashflowTable,
}

pub fn compute_metrics(system: &System, selection: &Selection<'_>) -> AppResult<ReportMetrics> {
    let tea = system.tea();
    let product = selection.stream;

    let mpsp = tea.solve_price(product)?;
    let cost_breakdown =
        CostBreakdown::from_costs(tea.material_cost()?, tea.utility_cost()?, tea.voc()?);

    Ok(ReportMetrics {
        product: product.id().to_string(),
        selection_basis: selection.basis,
        product_mass_kg_per_hr: product.f_mass(),
        mpsp_usd_per_kg: mpsp,
        gwp_kg_co2e_per_kg: emissions_intensity(system, product),
        tci_mm_usd: tea.tci()? / 1e6,
        net_power: NetPower {
            rate_kw: system.power_utility().rate,
        },
        cost_breakdown,
        heating_duty_mm_kj_per_hr: heating_duty(system.units()) / 1e6,
        composition: composition(product),
        cashflow: tea.cashflow_table()?,
    })
}
