//! Material streams and the chemical list they are indexed by.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{SimError, SimResult};

/// Characterization factor key for global-warming potential (kg CO2e/kg).
pub const GWP: &str = "GWP";

/// Ordered chemical identifiers shared by every stream of a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Chemicals {
    ids: Arc<[String]>,
}

impl Chemicals {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|c| c == id)
    }

    pub(crate) fn require(&self, id: &str, context: &str) -> SimResult<usize> {
        self.index_of(id).ok_or_else(|| SimError::UnknownChemical {
            chemical: id.to_string(),
            context: context.to_string(),
        })
    }
}

/// A material flow: per-chemical mass rates (kg/hr), a price (USD/kg) and
/// optional impact characterization factors (per kg of total stream mass).
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    id: String,
    chemicals: Chemicals,
    mass: Vec<f64>,
    price: f64,
    characterization_factors: BTreeMap<String, f64>,
}

impl Stream {
    /// An empty stream.
    pub fn new(id: impl Into<String>, chemicals: Chemicals) -> Self {
        let mass = vec![0.0; chemicals.len()];
        Self {
            id: id.into(),
            chemicals,
            mass,
            price: 0.0,
            characterization_factors: BTreeMap::new(),
        }
    }

    /// A stream with the given chemical flows (kg/hr).
    pub fn with_mass(
        id: impl Into<String>,
        chemicals: Chemicals,
        flows: &[(&str, f64)],
    ) -> SimResult<Self> {
        let mut stream = Self::new(id, chemicals);
        for (chemical, value) in flows {
            stream.set_imass(chemical, *value)?;
        }
        Ok(stream)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chemicals(&self) -> &Chemicals {
        &self.chemicals
    }

    /// Mass flow per chemical, in chemical order (kg/hr).
    pub fn mass(&self) -> &[f64] {
        &self.mass
    }

    /// Total mass flow (kg/hr).
    pub fn f_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Mass flow of one chemical, if it is part of the chemical list.
    pub fn imass(&self, chemical: &str) -> Option<f64> {
        self.chemicals.index_of(chemical).map(|i| self.mass[i])
    }

    pub fn set_imass(&mut self, chemical: &str, value: f64) -> SimResult<()> {
        let index = self
            .chemicals
            .require(chemical, &format!("stream '{}'", self.id))?;
        self.mass[index] = br_core::ensure_non_negative(value, "stream mass flow")?;
        Ok(())
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = price;
    }

    pub fn characterization_factors(&self) -> &BTreeMap<String, f64> {
        &self.characterization_factors
    }

    pub fn characterization_factor(&self, name: &str) -> Option<f64> {
        self.characterization_factors.get(name).copied()
    }

    pub fn set_characterization_factor(&mut self, name: impl Into<String>, value: f64) {
        self.characterization_factors.insert(name.into(), value);
    }

    /// `(chemical, kg/hr)` pairs in chemical order, including zeros.
    pub fn composition(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.chemicals
            .ids()
            .iter()
            .map(String::as_str)
            .zip(self.mass.iter().copied())
    }

    pub(crate) fn set_flow(&mut self, mass: &[f64]) {
        self.mass.copy_from_slice(mass);
    }

    pub(crate) fn empty(&mut self) {
        self.mass.iter_mut().for_each(|m| *m = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chemicals() -> Chemicals {
        Chemicals::new(["Water", "Glucose", "HP"])
    }

    #[test]
    fn total_mass_sums_components() {
        let stream =
            Stream::with_mass("s1", chemicals(), &[("Water", 10.0), ("HP", 2.5)]).unwrap();
        assert_eq!(stream.f_mass(), 12.5);
        assert_eq!(stream.imass("HP"), Some(2.5));
        assert_eq!(stream.imass("Glucose"), Some(0.0));
        assert_eq!(stream.imass("Ethanol"), None);
    }

    #[test]
    fn unknown_chemical_is_rejected() {
        let err = Stream::with_mass("s1", chemicals(), &[("Ethanol", 1.0)]).unwrap_err();
        assert!(matches!(err, SimError::UnknownChemical { .. }));
    }

    #[test]
    fn negative_flow_is_rejected() {
        let mut stream = Stream::new("s1", chemicals());
        assert!(stream.set_imass("Water", -1.0).is_err());
    }

    #[test]
    fn characterization_factor_defaults_to_absent() {
        let mut stream = Stream::new("s1", chemicals());
        assert_eq!(stream.characterization_factor(GWP), None);
        stream.set_characterization_factor(GWP, 0.61);
        assert_eq!(stream.characterization_factor(GWP), Some(0.61));
    }
}
