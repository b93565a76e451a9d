//! User parameters and their injection into a flowsheet.

use br_sim::{GWP, System};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Allowed range of one parameter, with the UI step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

pub const OPERATING_HOURS: ParamRange = ParamRange {
    min: 6_000.0,
    max: 8_760.0,
    step: 100.0,
};
/// USD/kg.
pub const FEEDSTOCK_PRICE: ParamRange = ParamRange {
    min: 0.0,
    max: 5.0,
    step: 0.01,
};
/// USD/kWh.
pub const ELECTRICITY_PRICE: ParamRange = ParamRange {
    min: 0.0,
    max: 1.0,
    step: 0.001,
};
/// Fraction (0-50 %).
pub const INCOME_TAX: ParamRange = ParamRange {
    min: 0.0,
    max: 0.5,
    step: 0.01,
};
/// Fraction (0-40 %).
pub const IRR: ParamRange = ParamRange {
    min: 0.0,
    max: 0.4,
    step: 0.01,
};

/// The five overrides captured for one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    pub operating_hours: f64,
    pub feedstock_price: f64,
    pub electricity_price: f64,
    pub income_tax: f64,
    pub irr: f64,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            operating_hours: 8_000.0,
            feedstock_price: 0.40,
            electricity_price: 0.07,
            income_tax: 0.35,
            irr: 0.10,
        }
    }
}

impl ReportParams {
    pub fn validate(&self) -> AppResult<()> {
        for (name, value, range) in [
            ("operating hours", self.operating_hours, OPERATING_HOURS),
            ("feedstock price", self.feedstock_price, FEEDSTOCK_PRICE),
            ("electricity price", self.electricity_price, ELECTRICITY_PRICE),
            ("income tax", self.income_tax, INCOME_TAX),
            ("IRR", self.irr, IRR),
        ] {
            if !range.contains(value) {
                return Err(AppError::InvalidInput(format!(
                    "{name} {value} outside [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// Feed classes recognized by id substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedRole {
    Feedstock,
    SulfuricAcid,
    SodiumHydroxide,
}

impl FeedRole {
    /// Markers are checked in this order; the first hit wins.
    const MARKERS: [(&'static str, FeedRole); 4] = [
        ("glu", FeedRole::Feedstock),
        ("sugar", FeedRole::Feedstock),
        ("h2so4", FeedRole::SulfuricAcid),
        ("naoh", FeedRole::SodiumHydroxide),
    ];

    pub fn classify(stream_id: &str) -> Option<Self> {
        let id = stream_id.to_lowercase();
        Self::MARKERS
            .iter()
            .find(|(marker, _)| id.contains(marker))
            .map(|&(_, role)| role)
    }

    /// kg CO2e per kg of feed.
    pub fn gwp(self) -> f64 {
        match self {
            FeedRole::Feedstock => 0.61,
            FeedRole::SulfuricAcid => 0.12,
            FeedRole::SodiumHydroxide => 1.15,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedRole::Feedstock => "feedstock",
            FeedRole::SulfuricAcid => "sulfuric acid",
            FeedRole::SodiumHydroxide => "sodium hydroxide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjectedFeed {
    pub stream: String,
    pub role: FeedRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InjectionSummary {
    pub feeds: Vec<InjectedFeed>,
}

/// Apply `params` to `system`. Applying the same parameters again leaves
/// the system unchanged.
pub fn inject_parameters(system: &mut System, params: &ReportParams) -> InjectionSummary {
    system.set_operating_hours(params.operating_hours);
    let tea = system.tea_mut();
    tea.set_income_tax(params.income_tax);
    tea.set_irr(params.irr);
    system.utility_prices_mut().electricity_usd_per_kwh = params.electricity_price;

    let mut summary = InjectionSummary::default();
    for feed in system.feeds_mut() {
        let Some(role) = FeedRole::classify(feed.id()) else {
            continue;
        };
        if role == FeedRole::Feedstock {
            feed.set_price(params.feedstock_price);
        }
        feed.set_characterization_factor(GWP, role.gwp());
        debug!(stream = feed.id(), role = role.label(), "feed parameters injected");
        summary.feeds.push(InjectedFeed {
            stream: feed.id().to_string(),
            role,
        });
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(FeedRole::classify("Glucose_feed"), Some(FeedRole::Feedstock));
        assert_eq!(FeedRole::classify("SUGAR"), Some(FeedRole::Feedstock));
        assert_eq!(FeedRole::classify("H2SO4_feed"), Some(FeedRole::SulfuricAcid));
        assert_eq!(FeedRole::classify("NaOH_feed"), Some(FeedRole::SodiumHydroxide));
        assert_eq!(FeedRole::classify("process_water"), None);
    }

    #[test]
    fn first_marker_wins() {
        assert_eq!(FeedRole::classify("glucose_naoh_mix"), Some(FeedRole::Feedstock));
        assert_eq!(FeedRole::classify("h2so4_naoh"), Some(FeedRole::SulfuricAcid));
    }

    #[test]
    fn defaults_are_in_range() {
        ReportParams::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_is_invalid_input() {
        let params = ReportParams {
            operating_hours: 9_000.0,
            ..ReportParams::default()
        };
        assert!(matches!(params.validate(), Err(AppError::InvalidInput(_))));

        let params = ReportParams {
            irr: f64::NAN,
            ..ReportParams::default()
        };
        assert!(params.validate().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use br_project::schema::Model;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn sample_model() -> &'static Model {
        static MODEL: OnceLock<Model> = OnceLock::new();
        MODEL.get_or_init(|| {
            let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../../models/HP/system_light_lle_vacuum_distillation.yaml");
            br_project::load_yaml(&path).unwrap()
        })
    }

    fn fresh_system() -> System {
        let model = sample_model();
        System::from_def(&model.systems[0], &model.chemicals).unwrap()
    }

    fn params() -> impl Strategy<Value = ReportParams> {
        (
            OPERATING_HOURS.min..=OPERATING_HOURS.max,
            FEEDSTOCK_PRICE.min..=FEEDSTOCK_PRICE.max,
            ELECTRICITY_PRICE.min..=ELECTRICITY_PRICE.max,
            INCOME_TAX.min..=INCOME_TAX.max,
            IRR.min..=IRR.max,
        )
            .prop_map(
                |(operating_hours, feedstock_price, electricity_price, income_tax, irr)| {
                    ReportParams {
                        operating_hours,
                        feedstock_price,
                        electricity_price,
                        income_tax,
                        irr,
                    }
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn injection_is_idempotent(params in params()) {
            let mut once = fresh_system();
            let first = inject_parameters(&mut once, &params);
            once.simulate().unwrap();

            let mut twice = fresh_system();
            inject_parameters(&mut twice, &params);
            let second = inject_parameters(&mut twice, &params);
            twice.simulate().unwrap();

            prop_assert_eq!(first, second);
            let flows = |s: &System| s.streams().iter().map(|st| st.mass().to_vec()).collect::<Vec<_>>();
            prop_assert_eq!(flows(&once), flows(&twice));
            prop_assert_eq!(once.tea().tci().unwrap(), twice.tea().tci().unwrap());
            prop_assert_eq!(once.tea().voc().unwrap(), twice.tea().voc().unwrap());
            prop_assert_eq!(once.power_utility(), twice.power_utility());
        }
    }
}
