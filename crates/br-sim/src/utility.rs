//! Heat and power utilities and their prices.

use br_project::schema::{HeatingAgentDef, UtilityPricesDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingAgent {
    Steam,
    CoolingWater,
}

impl From<HeatingAgentDef> for HeatingAgent {
    fn from(def: HeatingAgentDef) -> Self {
        match def {
            HeatingAgentDef::Steam => HeatingAgent::Steam,
            HeatingAgentDef::CoolingWater => HeatingAgent::CoolingWater,
        }
    }
}

/// Utility prices in effect for one system. Replaces a process-global
/// price table: each system carries its own.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityPrices {
    pub electricity_usd_per_kwh: f64,
    pub steam_usd_per_mj: f64,
    pub cooling_water_usd_per_mj: f64,
}

impl UtilityPrices {
    pub fn agent_price_usd_per_mj(&self, agent: HeatingAgent) -> f64 {
        match agent {
            HeatingAgent::Steam => self.steam_usd_per_mj,
            HeatingAgent::CoolingWater => self.cooling_water_usd_per_mj,
        }
    }
}

impl From<&UtilityPricesDef> for UtilityPrices {
    fn from(def: &UtilityPricesDef) -> Self {
        Self {
            electricity_usd_per_kwh: def.electricity_usd_per_kwh,
            steam_usd_per_mj: def.steam_usd_per_mj,
            cooling_water_usd_per_mj: def.cooling_water_usd_per_mj,
        }
    }
}

/// Heat exchanged with one utility agent.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatUtility {
    pub agent: HeatingAgent,
    /// kJ/hr; positive when the unit is heated, negative when cooled.
    pub duty: f64,
    /// USD/hr.
    pub cost: f64,
}

impl HeatUtility {
    pub fn new(agent: HeatingAgent, duty_kj_per_hr: f64, prices: &UtilityPrices) -> Self {
        let cost =
            br_core::kj_to_mj(duty_kj_per_hr.abs()) * prices.agent_price_usd_per_mj(agent);
        Self {
            agent,
            duty: duty_kj_per_hr,
            cost,
        }
    }
}

/// Electricity exchanged with the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerUtility {
    /// kW; positive when consumed, negative when exported.
    pub rate: f64,
}

impl PowerUtility {
    pub fn new(rate_kw: f64) -> Self {
        Self { rate: rate_kw }
    }

    /// USD/hr at the given electricity price; negative for net export.
    pub fn cost(&self, prices: &UtilityPrices) -> f64 {
        br_core::electricity_kwh(self.rate, 1.0) * prices.electricity_usd_per_kwh
    }

    pub fn is_export(&self) -> bool {
        self.rate < 0.0
    }
}

impl std::iter::Sum for PowerUtility {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self {
            rate: iter.map(|p| p.rate).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> UtilityPrices {
        UtilityPrices {
            electricity_usd_per_kwh: 0.07,
            steam_usd_per_mj: 0.0066,
            cooling_water_usd_per_mj: 0.0003,
        }
    }

    #[test]
    fn cooling_duty_still_costs() {
        let hu = HeatUtility::new(HeatingAgent::CoolingWater, -1.0e6, &prices());
        assert!((hu.cost - 0.3).abs() < 1e-9);
        assert!(hu.duty < 0.0);
    }

    #[test]
    fn exported_power_is_a_credit() {
        let power = PowerUtility::new(-100.0);
        assert!(power.is_export());
        assert!((power.cost(&prices()) + 7.0).abs() < 1e-9);
    }

    #[test]
    fn power_utilities_sum_rates() {
        let total: PowerUtility = [PowerUtility::new(5.0), PowerUtility::new(-8.0)]
            .into_iter()
            .sum();
        assert_eq!(total.rate, -3.0);
    }
}
