//! Techno-economic analysis over a simulated system.
//!
//! Capital: fixed capital `FCI = installed × (1 + indirect)`, working
//! capital `WC = FCI × wc_fraction`, `TCI = FCI + WC`. Operating:
//! `VOC = materials + utilities + waste disposal`, `FOC = FCI × fraction`.
//! Cash flows are discounted at the IRR from the first construction year.

use br_core::timing::{sim_timing, Timer};
use br_project::schema::TeaDef;
use serde::Serialize;
use tracing::debug;

use crate::cashflow::{CashflowInputs, CashflowTable};
use crate::error::{TeaError, TeaResult};
use crate::stream::Stream;

const PRICE_BOUND: f64 = 1.0e6;
const MAX_BISECTIONS: usize = 200;

/// Annual revenue line for one product stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub stream: String,
    pub mass_kg_per_yr: f64,
    /// USD/kg; negative for disposal.
    pub price: f64,
}

/// Costs captured from the last simulation (USD, USD/yr).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CostBasis {
    pub installed_equipment_cost: f64,
    pub material_cost: f64,
    pub utility_cost: f64,
    pub products: Vec<ProductRevenue>,
}

impl CostBasis {
    fn waste_disposal_cost(&self, excluding: Option<&str>) -> f64 {
        self.products
            .iter()
            .filter(|p| p.price < 0.0 && Some(p.stream.as_str()) != excluding)
            .map(|p| -p.price * p.mass_kg_per_yr)
            .sum()
    }

    fn sales(&self, excluding: Option<&str>) -> f64 {
        self.products
            .iter()
            .filter(|p| p.price > 0.0 && Some(p.stream.as_str()) != excluding)
            .map(|p| p.price * p.mass_kg_per_yr)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tea {
    income_tax: f64,
    irr: f64,
    start_year: i32,
    duration_years: u32,
    construction_schedule: Vec<f64>,
    depreciation_years: u32,
    working_capital_fraction: f64,
    indirect_cost_fraction: f64,
    fixed_operating_fraction: f64,
    basis: Option<CostBasis>,
}

impl From<&TeaDef> for Tea {
    fn from(def: &TeaDef) -> Self {
        Self {
            income_tax: def.income_tax,
            irr: def.irr,
            start_year: def.start_year,
            duration_years: def.duration_years,
            construction_schedule: def.construction_schedule.clone(),
            depreciation_years: def.depreciation_years,
            working_capital_fraction: def.working_capital_fraction,
            indirect_cost_fraction: def.indirect_cost_fraction,
            fixed_operating_fraction: def.fixed_operating_fraction,
            basis: None,
        }
    }
}

impl Tea {
    pub fn income_tax(&self) -> f64 {
        self.income_tax
    }

    pub fn set_income_tax(&mut self, rate: f64) {
        self.income_tax = rate;
    }

    pub fn irr(&self) -> f64 {
        self.irr
    }

    pub fn set_irr(&mut self, irr: f64) {
        self.irr = irr;
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn cost_basis(&self) -> Option<&CostBasis> {
        self.basis.as_ref()
    }

    pub(crate) fn set_cost_basis(&mut self, basis: CostBasis) {
        self.basis = Some(basis);
    }

    pub(crate) fn invalidate(&mut self) {
        self.basis = None;
    }

    fn basis(&self) -> TeaResult<&CostBasis> {
        self.basis.as_ref().ok_or(TeaError::NotSimulated)
    }

    /// Fixed capital investment (USD).
    pub fn fci(&self) -> TeaResult<f64> {
        Ok(self.basis()?.installed_equipment_cost * (1.0 + self.indirect_cost_fraction))
    }

    /// Total capital investment (USD).
    pub fn tci(&self) -> TeaResult<f64> {
        Ok(self.fci()? * (1.0 + self.working_capital_fraction))
    }

    /// USD/yr.
    pub fn material_cost(&self) -> TeaResult<f64> {
        Ok(self.basis()?.material_cost)
    }

    /// USD/yr; negative when power export outweighs utility purchases.
    pub fn utility_cost(&self) -> TeaResult<f64> {
        Ok(self.basis()?.utility_cost)
    }

    /// Variable operating cost (USD/yr).
    pub fn voc(&self) -> TeaResult<f64> {
        let basis = self.basis()?;
        Ok(basis.material_cost + basis.utility_cost + basis.waste_disposal_cost(None))
    }

    /// Fixed operating cost (USD/yr).
    pub fn foc(&self) -> TeaResult<f64> {
        Ok(self.fci()? * self.fixed_operating_fraction)
    }

    /// Yearly sales at current product prices (USD/yr).
    pub fn sales(&self) -> TeaResult<f64> {
        Ok(self.basis()?.sales(None))
    }

    pub fn cashflow_table(&self) -> TeaResult<CashflowTable> {
        self.check_settings()?;
        let sales = self.sales()?;
        let voc = self.voc()?;
        self.table(voc, sales)
    }

    /// NPV in MM$ at current prices.
    pub fn npv(&self) -> TeaResult<f64> {
        Ok(self.cashflow_table()?.npv())
    }

    /// Price of `stream` (USD/kg) at which NPV is zero.
    pub fn solve_price(&self, stream: &Stream) -> TeaResult<f64> {
        self.check_settings()?;
        let basis = self.basis()?;
        let product = basis
            .products
            .iter()
            .find(|p| p.stream == stream.id())
            .ok_or_else(|| TeaError::NotAProduct(stream.id().to_string()))?;
        if product.mass_kg_per_yr <= 0.0 {
            return Err(TeaError::ZeroFlow(stream.id().to_string()));
        }

        let target = Some(product.stream.as_str());
        let voc = basis.material_cost + basis.utility_cost + basis.waste_disposal_cost(target);
        let other_sales = basis.sales(target);
        let npv_at = |price: f64| -> TeaResult<f64> {
            let timer = Timer::start("npv evaluation");
            let npv = self
                .table(voc, other_sales + price * product.mass_kg_per_yr)?
                .npv();
            sim_timing::NPV_EVALUATIONS.record(timer.elapsed_s());
            Ok(npv)
        };

        let (mut lo, mut hi) = (-1.0, 1.0);
        let (mut npv_lo, mut npv_hi) = (npv_at(lo)?, npv_at(hi)?);
        while npv_lo > 0.0 || npv_hi < 0.0 {
            if lo.abs().max(hi.abs()) >= PRICE_BOUND {
                return Err(TeaError::PriceNotBracketed {
                    stream: product.stream.clone(),
                    bound: PRICE_BOUND,
                });
            }
            if npv_lo > 0.0 {
                lo *= 2.0;
                npv_lo = npv_at(lo)?;
            }
            if npv_hi < 0.0 {
                hi *= 2.0;
                npv_hi = npv_at(hi)?;
            }
        }

        for _ in 0..MAX_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            let npv_mid = npv_at(mid)?;
            if npv_mid < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-10 {
                break;
            }
        }

        let price = 0.5 * (lo + hi);
        debug!(stream = %product.stream, price, "break-even price solved");
        Ok(price)
    }

    fn table(&self, voc: f64, sales: f64) -> TeaResult<CashflowTable> {
        let fci = self.fci()?;
        Ok(CashflowTable::build(&CashflowInputs {
            start_year: self.start_year,
            construction_schedule: &self.construction_schedule,
            operating_years: self.duration_years,
            depreciation_years: self.depreciation_years,
            fixed_capital: fci,
            working_capital: fci * self.working_capital_fraction,
            voc,
            foc: fci * self.fixed_operating_fraction,
            sales,
            income_tax: self.income_tax,
            irr: self.irr,
        }))
    }

    fn check_settings(&self) -> TeaResult<()> {
        let invalid = |what: String| Err(TeaError::InvalidSetting { what });
        if !(0.0..1.0).contains(&self.income_tax) {
            return invalid(format!("income tax {} outside [0, 1)", self.income_tax));
        }
        if !(self.irr > -1.0 && self.irr.is_finite()) {
            return invalid(format!("IRR {} must exceed -1", self.irr));
        }
        if self.duration_years == 0 {
            return invalid("duration must be at least one year".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Chemicals;

    fn simulated_tea() -> Tea {
        let mut tea = Tea::from(&TeaDef::default());
        tea.set_cost_basis(CostBasis {
            installed_equipment_cost: 50.0e6,
            material_cost: 20.0e6,
            utility_cost: 2.0e6,
            products: vec![
                ProductRevenue {
                    stream: "product".to_string(),
                    mass_kg_per_yr: 40.0e6,
                    price: 0.0,
                },
                ProductRevenue {
                    stream: "wastewater".to_string(),
                    mass_kg_per_yr: 100.0e6,
                    price: -0.001,
                },
            ],
        });
        tea
    }

    fn product() -> Stream {
        Stream::new("product", Chemicals::new(["HP"]))
    }

    #[test]
    fn unsimulated_tea_reports_missing_basis() {
        let tea = Tea::from(&TeaDef::default());
        assert!(matches!(tea.tci(), Err(TeaError::NotSimulated)));
        assert!(matches!(tea.solve_price(&product()), Err(TeaError::NotSimulated)));
    }

    #[test]
    fn capital_and_operating_costs() {
        let tea = simulated_tea();
        assert!((tea.fci().unwrap() - 75.0e6).abs() < 1e-3);
        assert!((tea.tci().unwrap() - 78.75e6).abs() < 1e-3);
        assert!((tea.voc().unwrap() - 22.1e6).abs() < 1e-3);
        assert!((tea.foc().unwrap() - 3.0e6).abs() < 1e-3);
    }

    #[test]
    fn break_even_price_zeroes_npv() {
        let tea = simulated_tea();
        let price = tea.solve_price(&product()).unwrap();
        assert!(price > 0.0);

        let mut priced = tea.clone();
        if let Some(basis) = priced.basis.as_mut() {
            basis.products[0].price = price;
        }
        assert!(priced.npv().unwrap().abs() < 1e-6);
    }

    #[test]
    fn higher_irr_raises_break_even_price() {
        let mut tea = simulated_tea();
        let base = tea.solve_price(&product()).unwrap();
        tea.set_irr(0.2);
        assert!(tea.solve_price(&product()).unwrap() > base);
    }

    #[test]
    fn non_product_is_rejected() {
        let tea = simulated_tea();
        let feed = Stream::new("glucose_feed", Chemicals::new(["Glucose"]));
        assert!(matches!(tea.solve_price(&feed), Err(TeaError::NotAProduct(_))));
    }

    #[test]
    fn invalid_tax_is_reported() {
        let mut tea = simulated_tea();
        tea.set_income_tax(1.5);
        assert!(matches!(
            tea.cashflow_table(),
            Err(TeaError::InvalidSetting { .. })
        ));
    }
}
