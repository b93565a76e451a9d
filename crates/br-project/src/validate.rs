//! Model validation logic.

use crate::schema::{
    Model, PurchaseCostDef, ReactionDef, StreamDef, SystemDef, TeaDef, UnitDef, UnitKindDef,
};
use std::collections::{HashMap, HashSet};

/// Relative slack allowed when checking reaction mass closure.
const MASS_CLOSURE_TOLERANCE: f64 = 1e-3;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid topology: {what}")]
    Topology { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_model(model: &Model) -> Result<(), ValidationError> {
    if model.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: model.version,
        });
    }

    let mut chemicals = HashSet::new();
    for chemical in &model.chemicals {
        if !chemicals.insert(chemical.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: chemical.clone(),
                context: "chemicals".to_string(),
            });
        }
    }

    let mut system_ids = HashSet::new();
    for system in &model.systems {
        if !system_ids.insert(&system.id) {
            return Err(ValidationError::DuplicateId {
                id: system.id.clone(),
                context: "systems".to_string(),
            });
        }
        validate_system(system, &chemicals)?;
    }

    Ok(())
}

fn validate_system(system: &SystemDef, chemicals: &HashSet<&str>) -> Result<(), ValidationError> {
    let context = format!("system '{}'", system.id);

    if !system.operating_hours.is_finite()
        || system.operating_hours <= 0.0
        || system.operating_hours > 8_760.0
    {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} operating_hours"),
            value: system.operating_hours.to_string(),
            reason: "must be within (0, 8760]".to_string(),
        });
    }

    if system.recycle.max_iterations == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} recycle.max_iterations"),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    positive(system.recycle.tolerance, &format!("{context} recycle.tolerance"))?;

    non_negative(
        system.utilities.electricity_usd_per_kwh,
        &format!("{context} utilities.electricity_usd_per_kwh"),
    )?;
    non_negative(
        system.utilities.steam_usd_per_mj,
        &format!("{context} utilities.steam_usd_per_mj"),
    )?;
    non_negative(
        system.utilities.cooling_water_usd_per_mj,
        &format!("{context} utilities.cooling_water_usd_per_mj"),
    )?;

    // Every stream id is declared exactly once: as a feed or as a unit outlet.
    let mut stream_ids: HashSet<&str> = HashSet::new();
    for feed in &system.feeds {
        if !stream_ids.insert(feed.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: feed.id.clone(),
                context: format!("{context} streams"),
            });
        }
        validate_feed(feed, chemicals, &context)?;
    }

    let mut unit_ids = HashSet::new();
    for unit in &system.units {
        if !unit_ids.insert(unit.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: unit.id.clone(),
                context: format!("{context} units"),
            });
        }
        for out in &unit.outs {
            if !stream_ids.insert(out.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: out.clone(),
                    context: format!("{context} streams"),
                });
            }
        }
    }

    let mut consumers: HashMap<&str, &str> = HashMap::new();
    for unit in &system.units {
        for inlet in &unit.ins {
            if !stream_ids.contains(inlet.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: inlet.clone(),
                    context: format!("{context} unit '{}' ins", unit.id),
                });
            }
            if let Some(previous) = consumers.insert(inlet.as_str(), unit.id.as_str()) {
                return Err(ValidationError::Topology {
                    what: format!(
                        "stream '{}' is consumed by both '{}' and '{}'",
                        inlet, previous, unit.id
                    ),
                });
            }
        }
        validate_unit(unit, chemicals, &context)?;
    }

    let products: HashSet<&str> = system.product_ids().into_iter().collect();
    for (stream_id, price) in &system.product_prices {
        if !products.contains(stream_id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: stream_id.clone(),
                context: format!("{context} product_prices"),
            });
        }
        finite(*price, &format!("{context} product_prices.{stream_id}"))?;
    }

    validate_tea(&system.tea, &context)
}

fn validate_feed(
    feed: &StreamDef,
    chemicals: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    finite(
        feed.price_usd_per_kg,
        &format!("{context} feed '{}' price_usd_per_kg", feed.id),
    )?;
    for (chemical, flow) in &feed.mass_kg_per_hr {
        known_chemical(chemical, chemicals, &format!("{context} feed '{}'", feed.id))?;
        non_negative(*flow, &format!("{context} feed '{}' {}", feed.id, chemical))?;
    }
    for (name, value) in &feed.characterization_factors {
        finite(
            *value,
            &format!("{context} feed '{}' characterization factor {}", feed.id, name),
        )?;
    }
    Ok(())
}

fn validate_unit(
    unit: &UnitDef,
    chemicals: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    let unit_context = format!("{context} unit '{}'", unit.id);

    if unit.ins.is_empty() {
        return Err(ValidationError::Topology {
            what: format!("{unit_context} has no inlets"),
        });
    }

    let expected_outs = match &unit.kind {
        UnitKindDef::Splitter { .. } => 2,
        UnitKindDef::Mixer | UnitKindDef::Reactor { .. } | UnitKindDef::Boiler { .. } => 1,
    };
    if unit.outs.len() != expected_outs {
        return Err(ValidationError::Topology {
            what: format!(
                "{unit_context} ({}) needs {} outlet(s), found {}",
                unit.kind.label(),
                expected_outs,
                unit.outs.len()
            ),
        });
    }

    match &unit.kind {
        UnitKindDef::Mixer => {}
        UnitKindDef::Splitter {
            split,
            default_split,
        } => {
            fraction(*default_split, &format!("{unit_context} default_split"))?;
            for (chemical, value) in split {
                known_chemical(chemical, chemicals, &unit_context)?;
                fraction(*value, &format!("{unit_context} split.{chemical}"))?;
            }
        }
        UnitKindDef::Reactor { reactions } => {
            for (index, reaction) in reactions.iter().enumerate() {
                validate_reaction(reaction, chemicals, &format!("{unit_context} reaction {index}"))?;
            }
        }
        UnitKindDef::Boiler {
            heating_values_kj_per_kg,
            electric_efficiency,
        } => {
            if !electric_efficiency.is_finite()
                || *electric_efficiency <= 0.0
                || *electric_efficiency > 1.0
            {
                return Err(ValidationError::InvalidValue {
                    field: format!("{unit_context} electric_efficiency"),
                    value: electric_efficiency.to_string(),
                    reason: "must be within (0, 1]".to_string(),
                });
            }
            for (chemical, value) in heating_values_kj_per_kg {
                known_chemical(chemical, chemicals, &unit_context)?;
                non_negative(*value, &format!("{unit_context} heating value {chemical}"))?;
            }
        }
    }

    for heat in &unit.heat_utilities {
        finite(heat.duty_kj_per_kg, &format!("{unit_context} duty_kj_per_kg"))?;
    }
    non_negative(unit.power_kw_per_kg, &format!("{unit_context} power_kw_per_kg"))?;

    if let Some(cost) = &unit.purchase_cost {
        validate_purchase_cost(cost, &unit_context)?;
    }

    Ok(())
}

fn validate_reaction(
    reaction: &ReactionDef,
    chemicals: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    known_chemical(&reaction.reactant, chemicals, context)?;
    fraction(reaction.conversion, &format!("{context} conversion"))?;

    let mut consumed = 1.0;
    for (chemical, ratio) in &reaction.co_reactants {
        known_chemical(chemical, chemicals, context)?;
        non_negative(*ratio, &format!("{context} co_reactants.{chemical}"))?;
        consumed += ratio;
    }
    let mut formed = 0.0;
    for (chemical, yield_) in &reaction.products {
        known_chemical(chemical, chemicals, context)?;
        non_negative(*yield_, &format!("{context} products.{chemical}"))?;
        formed += yield_;
    }

    if (formed - consumed).abs() > MASS_CLOSURE_TOLERANCE * consumed {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} products"),
            value: format!("{formed:.4} kg formed per {consumed:.4} kg consumed"),
            reason: "reaction must conserve mass".to_string(),
        });
    }
    Ok(())
}

fn validate_purchase_cost(cost: &PurchaseCostDef, context: &str) -> Result<(), ValidationError> {
    non_negative(cost.base_cost_usd, &format!("{context} base_cost_usd"))?;
    positive(cost.base_flow_kg_per_hr, &format!("{context} base_flow_kg_per_hr"))?;
    positive(cost.exponent, &format!("{context} exponent"))?;
    positive(cost.installation_factor, &format!("{context} installation_factor"))?;
    Ok(())
}

fn validate_tea(tea: &TeaDef, context: &str) -> Result<(), ValidationError> {
    let tea_context = format!("{context} tea");
    unit_interval_open(tea.income_tax, &format!("{tea_context} income_tax"))?;
    unit_interval_open(tea.irr, &format!("{tea_context} IRR"))?;

    if tea.duration_years == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{tea_context} duration_years"),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if tea.depreciation_years == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{tea_context} depreciation_years"),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if tea.construction_schedule.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{tea_context} construction_schedule"),
            value: "[]".to_string(),
            reason: "needs at least one construction year".to_string(),
        });
    }
    for value in &tea.construction_schedule {
        fraction(*value, &format!("{tea_context} construction_schedule"))?;
    }
    let total: f64 = tea.construction_schedule.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(ValidationError::InvalidValue {
            field: format!("{tea_context} construction_schedule"),
            value: format!("{total}"),
            reason: "fractions must sum to 1".to_string(),
        });
    }

    non_negative(
        tea.working_capital_fraction,
        &format!("{tea_context} working_capital_fraction"),
    )?;
    non_negative(
        tea.indirect_cost_fraction,
        &format!("{tea_context} indirect_cost_fraction"),
    )?;
    non_negative(
        tea.fixed_operating_fraction,
        &format!("{tea_context} fixed_operating_fraction"),
    )?;
    Ok(())
}

fn known_chemical(
    chemical: &str,
    chemicals: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    if chemicals.contains(chemical) {
        Ok(())
    } else {
        Err(ValidationError::MissingReference {
            id: chemical.to_string(),
            context: format!("{context} chemicals"),
        })
    }
}

fn finite(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}

fn non_negative(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        })
    }
}

fn positive(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn fraction(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be within [0, 1]".to_string(),
        })
    }
}

fn unit_interval_open(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be within [0, 1)".to_string(),
        })
    }
}
