//! Unit operations: mass balance, utilities and equipment cost.

use br_core::StreamId;
use br_project::schema::{PurchaseCostDef, ReactionDef, UnitDef, UnitKindDef};

use crate::error::{SimError, SimResult};
use crate::stream::{Chemicals, Stream};
use crate::utility::{HeatUtility, HeatingAgent, PowerUtility, UtilityPrices};

/// Mass-basis reaction resolved against a chemical list.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    reactant: usize,
    conversion: f64,
    co_reactants: Vec<(usize, f64)>,
    products: Vec<(usize, f64)>,
}

impl Reaction {
    pub fn from_def(def: &ReactionDef, chemicals: &Chemicals, unit_id: &str) -> SimResult<Self> {
        let context = format!("unit '{unit_id}' reaction");
        let resolve = |entries: &std::collections::BTreeMap<String, f64>| {
            entries
                .iter()
                .map(|(id, ratio)| Ok((chemicals.require(id, &context)?, *ratio)))
                .collect::<SimResult<Vec<_>>>()
        };
        Ok(Self {
            reactant: chemicals.require(&def.reactant, &context)?,
            conversion: def.conversion,
            co_reactants: resolve(&def.co_reactants)?,
            products: resolve(&def.products)?,
        })
    }

    /// Converts in place. The extent is capped by whichever co-reactant
    /// runs out first.
    pub fn apply(&self, mass: &mut [f64]) {
        let mut extent = mass[self.reactant] * self.conversion;
        for &(index, ratio) in &self.co_reactants {
            if ratio > 0.0 {
                extent = extent.min(mass[index] / ratio);
            }
        }
        if extent <= 0.0 {
            return;
        }

        mass[self.reactant] = (mass[self.reactant] - extent).max(0.0);
        for &(index, ratio) in &self.co_reactants {
            mass[index] = (mass[index] - extent * ratio).max(0.0);
        }
        for &(index, yield_) in &self.products {
            mass[index] += extent * yield_;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    Mixer,
    /// Fraction of each chemical sent to the first outlet.
    Splitter { split: Vec<f64> },
    Reactor { reactions: Vec<Reaction> },
    /// Heating values in kJ/kg per chemical.
    Boiler {
        heating_values: Vec<f64>,
        electric_efficiency: f64,
    },
}

impl UnitKind {
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Mixer => "Mixer",
            UnitKind::Splitter { .. } => "Splitter",
            UnitKind::Reactor { .. } => "Reactor",
            UnitKind::Boiler { .. } => "Boiler",
        }
    }

    fn from_def(def: &UnitKindDef, chemicals: &Chemicals, unit_id: &str) -> SimResult<Self> {
        let context = format!("unit '{unit_id}'");
        Ok(match def {
            UnitKindDef::Mixer => UnitKind::Mixer,
            UnitKindDef::Splitter {
                split,
                default_split,
            } => {
                let mut fractions = vec![*default_split; chemicals.len()];
                for (id, fraction) in split {
                    fractions[chemicals.require(id, &context)?] = *fraction;
                }
                UnitKind::Splitter { split: fractions }
            }
            UnitKindDef::Reactor { reactions } => UnitKind::Reactor {
                reactions: reactions
                    .iter()
                    .map(|r| Reaction::from_def(r, chemicals, unit_id))
                    .collect::<SimResult<_>>()?,
            },
            UnitKindDef::Boiler {
                heating_values_kj_per_kg,
                electric_efficiency,
            } => {
                let mut heating_values = vec![0.0; chemicals.len()];
                for (id, hv) in heating_values_kj_per_kg {
                    heating_values[chemicals.require(id, &context)?] = *hv;
                }
                UnitKind::Boiler {
                    heating_values,
                    electric_efficiency: *electric_efficiency,
                }
            }
        })
    }
}

/// Capacity-scaled purchase cost.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseCost {
    pub base_cost_usd: f64,
    pub base_flow_kg_per_hr: f64,
    pub exponent: f64,
    pub installation_factor: f64,
}

impl PurchaseCost {
    pub fn purchase(&self, flow_kg_per_hr: f64) -> f64 {
        if flow_kg_per_hr <= 0.0 || self.base_flow_kg_per_hr <= 0.0 {
            return 0.0;
        }
        self.base_cost_usd * (flow_kg_per_hr / self.base_flow_kg_per_hr).powf(self.exponent)
    }

    pub fn installed(&self, flow_kg_per_hr: f64) -> f64 {
        self.purchase(flow_kg_per_hr) * self.installation_factor
    }
}

impl From<&PurchaseCostDef> for PurchaseCost {
    fn from(def: &PurchaseCostDef) -> Self {
        Self {
            base_cost_usd: def.base_cost_usd,
            base_flow_kg_per_hr: def.base_flow_kg_per_hr,
            exponent: def.exponent,
            installation_factor: def.installation_factor,
        }
    }
}

/// A unit operation wired to streams by index. Utilities and costs reflect
/// the most recent [`Unit::run`].
#[derive(Debug, Clone)]
pub struct Unit {
    id: String,
    name: String,
    ins: Vec<StreamId>,
    outs: Vec<StreamId>,
    kind: UnitKind,
    heat_demand: Vec<(HeatingAgent, f64)>,
    power_kw_per_kg: f64,
    cost: Option<PurchaseCost>,

    inlet_flow: f64,
    heat_utilities: Vec<HeatUtility>,
    power_utility: PowerUtility,
}

impl Unit {
    pub(crate) fn from_def(
        def: &UnitDef,
        chemicals: &Chemicals,
        ins: Vec<StreamId>,
        outs: Vec<StreamId>,
    ) -> SimResult<Self> {
        let kind = UnitKind::from_def(&def.kind, chemicals, &def.id)?;
        let expected_outs = match kind {
            UnitKind::Splitter { .. } => 2,
            _ => 1,
        };
        if outs.len() != expected_outs {
            return Err(SimError::Unit {
                unit: def.id.clone(),
                what: format!(
                    "{} needs {expected_outs} outlet(s), found {}",
                    kind.label(),
                    outs.len()
                ),
            });
        }

        Ok(Self {
            id: def.id.clone(),
            name: def.name.clone(),
            ins,
            outs,
            kind,
            heat_demand: def
                .heat_utilities
                .iter()
                .map(|hu| (hu.agent.into(), hu.duty_kj_per_kg))
                .collect(),
            power_kw_per_kg: def.power_kw_per_kg,
            cost: def.purchase_cost.as_ref().map(PurchaseCost::from),
            inlet_flow: 0.0,
            heat_utilities: Vec::new(),
            power_utility: PowerUtility::default(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    pub fn ins(&self) -> &[StreamId] {
        &self.ins
    }

    pub fn outs(&self) -> &[StreamId] {
        &self.outs
    }

    pub fn heat_utilities(&self) -> &[HeatUtility] {
        &self.heat_utilities
    }

    pub fn power_utility(&self) -> &PowerUtility {
        &self.power_utility
    }

    /// Total inlet mass flow at the last run (kg/hr).
    pub fn inlet_flow(&self) -> f64 {
        self.inlet_flow
    }

    pub fn installed_cost(&self) -> f64 {
        self.cost
            .as_ref()
            .map_or(0.0, |c| c.installed(self.inlet_flow))
    }

    /// Utility cost at the last run (USD/hr).
    pub fn utility_cost(&self, prices: &UtilityPrices) -> f64 {
        self.heat_utilities.iter().map(|hu| hu.cost).sum::<f64>()
            + self.power_utility.cost(prices)
    }

    pub(crate) fn run(&mut self, streams: &mut [Stream], prices: &UtilityPrices) -> SimResult<()> {
        let n = streams
            .first()
            .map(|s| s.chemicals().len())
            .unwrap_or_default();
        let mut mixed = vec![0.0; n];
        for id in &self.ins {
            for (total, m) in mixed.iter_mut().zip(streams[id.index()].mass()) {
                *total += m;
            }
        }
        self.inlet_flow = mixed.iter().sum();

        let mut generated_kw = 0.0;
        match &self.kind {
            UnitKind::Mixer => streams[self.outs[0].index()].set_flow(&mixed),
            UnitKind::Splitter { split } => {
                let top: Vec<f64> = mixed.iter().zip(split).map(|(m, s)| m * s).collect();
                let bottom: Vec<f64> = mixed.iter().zip(&top).map(|(m, t)| m - t).collect();
                streams[self.outs[0].index()].set_flow(&top);
                streams[self.outs[1].index()].set_flow(&bottom);
            }
            UnitKind::Reactor { reactions } => {
                for reaction in reactions {
                    reaction.apply(&mut mixed);
                }
                streams[self.outs[0].index()].set_flow(&mixed);
            }
            UnitKind::Boiler {
                heating_values,
                electric_efficiency,
            } => {
                let heat_kj_per_hr: f64 =
                    mixed.iter().zip(heating_values).map(|(m, hv)| m * hv).sum();
                generated_kw = br_core::kj_per_hr_to_kw(heat_kj_per_hr) * electric_efficiency;
                streams[self.outs[0].index()].set_flow(&mixed);
            }
        }

        for out in &self.outs {
            for value in streams[out.index()].mass() {
                br_core::ensure_finite(*value, "unit outlet flow").map_err(|e| SimError::Unit {
                    unit: self.id.clone(),
                    what: e.to_string(),
                })?;
            }
        }

        self.heat_utilities = self
            .heat_demand
            .iter()
            .map(|&(agent, per_kg)| HeatUtility::new(agent, per_kg * self.inlet_flow, prices))
            .collect();
        self.power_utility =
            PowerUtility::new(self.power_kw_per_kg * self.inlet_flow - generated_kw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn chemicals() -> Chemicals {
        Chemicals::new(["Water", "NaOH", "H2SO4", "Na2SO4"])
    }

    fn neutralization() -> Reaction {
        let def = ReactionDef {
            reactant: "NaOH".to_string(),
            conversion: 1.0,
            co_reactants: BTreeMap::from([("H2SO4".to_string(), 1.225)]),
            products: BTreeMap::from([
                ("Na2SO4".to_string(), 1.775),
                ("Water".to_string(), 0.45),
            ]),
        };
        Reaction::from_def(&def, &chemicals(), "R1").unwrap()
    }

    #[test]
    fn reaction_conserves_mass() {
        let mut mass = vec![100.0, 10.0, 20.0, 0.0];
        let before: f64 = mass.iter().sum();
        neutralization().apply(&mut mass);
        let after: f64 = mass.iter().sum();
        assert!((before - after).abs() < 1e-9);
        assert_eq!(mass[1], 0.0);
        assert!((mass[2] - 7.75).abs() < 1e-9);
    }

    #[test]
    fn limiting_co_reactant_caps_extent() {
        let mut mass = vec![0.0, 10.0, 2.45, 0.0];
        neutralization().apply(&mut mass);
        assert!((mass[1] - 8.0).abs() < 1e-9);
        assert_eq!(mass[2], 0.0);
        assert!((mass[3] - 3.55).abs() < 1e-9);
    }

    #[test]
    fn purchase_cost_scales_with_flow() {
        let cost = PurchaseCost {
            base_cost_usd: 1.0e6,
            base_flow_kg_per_hr: 1000.0,
            exponent: 0.6,
            installation_factor: 2.0,
        };
        assert_eq!(cost.purchase(0.0), 0.0);
        assert!((cost.purchase(1000.0) - 1.0e6).abs() < 1e-6);
        assert!((cost.installed(1000.0) - 2.0e6).abs() < 1e-6);
        assert!(cost.purchase(2000.0) < 2.0e6);
    }

    #[test]
    fn splitter_with_wrong_outlets_is_rejected() {
        let def = UnitDef {
            id: "S1".to_string(),
            name: "Split".to_string(),
            ins: vec!["a".to_string()],
            outs: vec!["b".to_string()],
            kind: UnitKindDef::Splitter {
                split: BTreeMap::new(),
                default_split: 0.5,
            },
            heat_utilities: vec![],
            power_kw_per_kg: 0.0,
            purchase_cost: None,
        };
        let err = Unit::from_def(
            &def,
            &chemicals(),
            vec![StreamId::from_index(0)],
            vec![StreamId::from_index(1)],
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Unit { .. }));
    }
}
