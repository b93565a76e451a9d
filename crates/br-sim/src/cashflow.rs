//! Discounted cash-flow schedule.

use serde::Serialize;

pub const FIXED_CAPITAL: &str = "Fixed capital investment [MM$]";
pub const WORKING_CAPITAL: &str = "Working capital [MM$]";
pub const CAPITAL_INVESTMENT: &str = "Capital investment [MM$]";
pub const VARIABLE_OPERATING_COST: &str = "Variable operating cost [MM$]";
pub const FIXED_OPERATING_COST: &str = "Fixed operating cost [MM$]";
pub const SALES: &str = "Sales [MM$]";
pub const DEPRECIATION: &str = "Depreciation [MM$]";
pub const TAXABLE_INCOME: &str = "Taxable income [MM$]";
pub const INCOME_TAX: &str = "Income tax [MM$]";
pub const NET_EARNINGS: &str = "Net earnings [MM$]";
pub const CASH_FLOW: &str = "Cash flow [MM$]";
pub const DISCOUNT_FACTOR: &str = "Discount factor";
pub const NET_PRESENT_VALUE: &str = "Net present value (NPV) [MM$]";
pub const CUMULATIVE_NPV: &str = "Cumulative NPV [MM$]";

const COLUMNS: [&str; 14] = [
    FIXED_CAPITAL,
    WORKING_CAPITAL,
    CAPITAL_INVESTMENT,
    VARIABLE_OPERATING_COST,
    FIXED_OPERATING_COST,
    SALES,
    DEPRECIATION,
    TAXABLE_INCOME,
    INCOME_TAX,
    NET_EARNINGS,
    CASH_FLOW,
    DISCOUNT_FACTOR,
    NET_PRESENT_VALUE,
    CUMULATIVE_NPV,
];

/// Yearly inputs in USD (USD/yr for operating terms).
#[derive(Debug, Clone)]
pub(crate) struct CashflowInputs<'a> {
    pub start_year: i32,
    pub construction_schedule: &'a [f64],
    pub operating_years: u32,
    pub depreciation_years: u32,
    pub fixed_capital: f64,
    pub working_capital: f64,
    pub voc: f64,
    pub foc: f64,
    pub sales: f64,
    pub income_tax: f64,
    pub irr: f64,
}

/// Rows are years (construction first), columns are line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowTable {
    years: Vec<i32>,
    columns: Vec<&'static str>,
    rows: Vec<Vec<f64>>,
}

impl CashflowTable {
    pub(crate) fn build(inputs: &CashflowInputs<'_>) -> Self {
        let construction = inputs.construction_schedule.len();
        let total = construction + inputs.operating_years as usize;
        let annual_depreciation = if inputs.depreciation_years > 0 {
            inputs.fixed_capital / inputs.depreciation_years as f64
        } else {
            0.0
        };

        let mut years = Vec::with_capacity(total);
        let mut rows = Vec::with_capacity(total);
        let mut cumulative = 0.0;
        for i in 0..total {
            let operating_year = i.checked_sub(construction);

            let fixed_capital = inputs
                .construction_schedule
                .get(i)
                .map_or(0.0, |f| f * inputs.fixed_capital);
            let working_capital = if construction > 0 && i + 1 == construction {
                inputs.working_capital
            } else if i + 1 == total {
                -inputs.working_capital
            } else {
                0.0
            };
            let capital = fixed_capital + working_capital;

            let (voc, foc, sales) = match operating_year {
                Some(_) => (inputs.voc, inputs.foc, inputs.sales),
                None => (0.0, 0.0, 0.0),
            };
            let depreciation = match operating_year {
                Some(k) if k < inputs.depreciation_years as usize => annual_depreciation,
                _ => 0.0,
            };

            let taxable = sales - voc - foc - depreciation;
            let tax = taxable.max(0.0) * inputs.income_tax;
            let net_earnings = taxable - tax;
            let cash_flow = net_earnings + depreciation - capital;
            let discount = (1.0 + inputs.irr).powi(-(i as i32));
            let npv = cash_flow * discount;
            cumulative += npv;

            years.push(inputs.start_year + i as i32);
            rows.push(vec![
                mm(fixed_capital),
                mm(working_capital),
                mm(capital),
                mm(voc),
                mm(foc),
                mm(sales),
                mm(depreciation),
                mm(taxable),
                mm(tax),
                mm(net_earnings),
                mm(cash_flow),
                discount,
                mm(npv),
                mm(cumulative),
            ]);
        }

        Self {
            years,
            columns: COLUMNS.to_vec(),
            rows,
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Project NPV in MM$ (last cumulative value).
    pub fn npv(&self) -> f64 {
        self.column(CUMULATIVE_NPV)
            .and_then(|c| c.last().copied())
            .unwrap_or(0.0)
    }
}

fn mm(usd: f64) -> f64 {
    usd / 1.0e6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(schedule: &[f64]) -> CashflowInputs<'_> {
        CashflowInputs {
            start_year: 2019,
            construction_schedule: schedule,
            operating_years: 10,
            depreciation_years: 5,
            fixed_capital: 100.0e6,
            working_capital: 5.0e6,
            voc: 20.0e6,
            foc: 4.0e6,
            sales: 50.0e6,
            income_tax: 0.35,
            irr: 0.10,
        }
    }

    #[test]
    fn construction_years_precede_operation() {
        let schedule = [0.4, 0.6];
        let table = CashflowTable::build(&inputs(&schedule));
        assert_eq!(table.len(), 12);
        assert_eq!(table.years()[0], 2019);
        assert_eq!(table.years()[11], 2030);
        let sales = table.column(SALES).unwrap();
        assert_eq!(sales[0], 0.0);
        assert_eq!(sales[2], 50.0);
        let fci = table.column(FIXED_CAPITAL).unwrap();
        assert!((fci.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn working_capital_is_recovered() {
        let schedule = [1.0];
        let table = CashflowTable::build(&inputs(&schedule));
        let wc = table.column(WORKING_CAPITAL).unwrap();
        assert_eq!(wc[0], 5.0);
        assert_eq!(wc[table.len() - 1], -5.0);
        assert!(wc.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn depreciation_totals_fixed_capital() {
        let schedule = [1.0];
        let table = CashflowTable::build(&inputs(&schedule));
        let dep = table.column(DEPRECIATION).unwrap();
        assert!((dep.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn losses_are_not_taxed() {
        let schedule = [1.0];
        let mut i = inputs(&schedule);
        i.sales = 0.0;
        let table = CashflowTable::build(&i);
        assert!(table.column(INCOME_TAX).unwrap().iter().all(|t| *t == 0.0));
        assert!(table.npv() < 0.0);
    }

    #[test]
    fn npv_rises_with_sales() {
        let schedule = [0.08, 0.60, 0.32];
        let low = CashflowTable::build(&inputs(&schedule)).npv();
        let mut high_inputs = inputs(&schedule);
        high_inputs.sales = 80.0e6;
        let high = CashflowTable::build(&high_inputs).npv();
        assert!(high > low);
    }
}
