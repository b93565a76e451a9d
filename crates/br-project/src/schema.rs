//! Model schema definitions.
//!
//! Flow rates are kg/hr, prices are USD per kg, duties are kJ per kg of unit
//! inlet flow, power demand is kW per kg/hr of unit inlet flow.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub version: u32,
    pub name: String,
    pub chemicals: Vec<String>,
    #[serde(default)]
    pub systems: Vec<SystemDef>,
}

impl Model {
    /// Index of the system with id `preferred_id`, else 0. `None` when the
    /// model declares no system.
    pub fn preferred_system_index(&self, preferred_id: &str) -> Option<usize> {
        self.systems
            .iter()
            .position(|s| s.id == preferred_id)
            .or_else(|| (!self.systems.is_empty()).then_some(0))
    }

    /// The system with id `preferred_id`, else the first system declared.
    pub fn preferred_system(&self, preferred_id: &str) -> Option<&SystemDef> {
        self.preferred_system_index(preferred_id)
            .map(|index| &self.systems[index])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_operating_hours")]
    pub operating_hours: f64,
    #[serde(default)]
    pub recycle: RecycleDef,
    #[serde(default)]
    pub utilities: UtilityPricesDef,
    #[serde(default)]
    pub feeds: Vec<StreamDef>,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    /// Prices of product streams; negative values are disposal costs.
    #[serde(default)]
    pub product_prices: BTreeMap<String, f64>,
    #[serde(default)]
    pub tea: TeaDef,
}

impl SystemDef {
    /// Streams produced by a unit and consumed by none, in unit order.
    pub fn product_ids(&self) -> Vec<&str> {
        let consumed: HashSet<&str> = self
            .units
            .iter()
            .flat_map(|u| u.ins.iter().map(String::as_str))
            .collect();
        self.units
            .iter()
            .flat_map(|u| u.outs.iter().map(String::as_str))
            .filter(|id| !consumed.contains(id))
            .collect()
    }
}

fn default_operating_hours() -> f64 {
    8_000.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecycleDef {
    #[serde(default)]
    pub method: RecycleMethodDef,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for RecycleDef {
    fn default() -> Self {
        Self {
            method: RecycleMethodDef::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_max_iterations() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1e-6
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RecycleMethodDef {
    DirectSubstitution,
    #[default]
    Wegstein,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UtilityPricesDef {
    #[serde(default = "default_electricity_price")]
    pub electricity_usd_per_kwh: f64,
    #[serde(default = "default_steam_price")]
    pub steam_usd_per_mj: f64,
    #[serde(default = "default_cooling_water_price")]
    pub cooling_water_usd_per_mj: f64,
}

impl Default for UtilityPricesDef {
    fn default() -> Self {
        Self {
            electricity_usd_per_kwh: default_electricity_price(),
            steam_usd_per_mj: default_steam_price(),
            cooling_water_usd_per_mj: default_cooling_water_price(),
        }
    }
}

fn default_electricity_price() -> f64 {
    0.0782
}

fn default_steam_price() -> f64 {
    0.0066
}

fn default_cooling_water_price() -> f64 {
    0.0003
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDef {
    pub id: String,
    #[serde(default)]
    pub price_usd_per_kg: f64,
    #[serde(default)]
    pub mass_kg_per_hr: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub characterization_factors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    pub ins: Vec<String>,
    pub outs: Vec<String>,
    pub kind: UnitKindDef,
    #[serde(default)]
    pub heat_utilities: Vec<HeatUtilityDef>,
    #[serde(default)]
    pub power_kw_per_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_cost: Option<PurchaseCostDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum UnitKindDef {
    /// Combines all inlets into a single outlet.
    Mixer,
    /// Two outlets; `split` is the fraction of each chemical sent to the
    /// first outlet, `default_split` applies to chemicals not listed.
    Splitter {
        #[serde(default)]
        split: BTreeMap<String, f64>,
        #[serde(default)]
        default_split: f64,
    },
    /// Fixed-conversion reactions applied in order to the mixed inlet.
    Reactor { reactions: Vec<ReactionDef> },
    /// Burns the listed chemicals for power; outlet carries the inlet mass.
    Boiler {
        heating_values_kj_per_kg: BTreeMap<String, f64>,
        electric_efficiency: f64,
    },
}

impl UnitKindDef {
    pub fn label(&self) -> &'static str {
        match self {
            UnitKindDef::Mixer => "Mixer",
            UnitKindDef::Splitter { .. } => "Splitter",
            UnitKindDef::Reactor { .. } => "Reactor",
            UnitKindDef::Boiler { .. } => "Boiler",
        }
    }
}

/// Mass-basis reaction: per kg of `reactant` converted, `co_reactants` are
/// consumed and `products` are formed (all in kg).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionDef {
    pub reactant: String,
    pub conversion: f64,
    #[serde(default)]
    pub co_reactants: BTreeMap<String, f64>,
    pub products: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatUtilityDef {
    pub agent: HeatingAgentDef,
    /// Positive for heating, negative for cooling.
    pub duty_kj_per_kg: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeatingAgentDef {
    Steam,
    CoolingWater,
}

/// Six-tenths style scaling: `base_cost * (flow / base_flow)^exponent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseCostDef {
    pub base_cost_usd: f64,
    pub base_flow_kg_per_hr: f64,
    #[serde(default = "default_cost_exponent")]
    pub exponent: f64,
    #[serde(default = "default_installation_factor")]
    pub installation_factor: f64,
}

fn default_cost_exponent() -> f64 {
    0.6
}

fn default_installation_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeaDef {
    pub income_tax: f64,
    #[serde(rename = "IRR")]
    pub irr: f64,
    pub start_year: i32,
    pub duration_years: u32,
    /// Fraction of fixed capital spent in each construction year.
    pub construction_schedule: Vec<f64>,
    pub depreciation_years: u32,
    pub working_capital_fraction: f64,
    /// Indirect costs as a fraction of installed equipment cost.
    pub indirect_cost_fraction: f64,
    /// Labor, maintenance and insurance as a yearly fraction of fixed capital.
    pub fixed_operating_fraction: f64,
}

impl Default for TeaDef {
    fn default() -> Self {
        Self {
            income_tax: 0.35,
            irr: 0.10,
            start_year: 2019,
            duration_years: 30,
            construction_schedule: vec![0.08, 0.60, 0.32],
            depreciation_years: 10,
            working_capital_fraction: 0.05,
            indirect_cost_fraction: 0.5,
            fixed_operating_fraction: 0.04,
        }
    }
}
