//! Flowsheet system: stream table, unit sequence and recycle convergence.

use std::collections::{HashMap, HashSet};

use br_core::timing::{sim_timing, Timer};
use br_core::{StreamId, UnitId};
use br_project::schema::SystemDef;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::recycle::{RecycleSettings, Updater};
use crate::stream::{Chemicals, Stream};
use crate::tea::{CostBasis, ProductRevenue, Tea};
use crate::unit::Unit;
use crate::utility::{PowerUtility, UtilityPrices};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Full passes over the unit sequence.
    pub iterations: usize,
    /// Max relative tear change at the last pass (0 without recycle).
    pub residual: f64,
    pub tear_streams: Vec<String>,
}

/// A runnable flowsheet.
///
/// Feeds occupy the first slots of the stream table, followed by unit
/// outlets in unit order. Any mutation through an accessor that changes
/// costs (operating hours, utility prices, feeds, stream prices) clears the
/// TEA cost basis until the next [`System::simulate`].
#[derive(Debug, Clone)]
pub struct System {
    id: String,
    name: String,
    chemicals: Chemicals,
    streams: Vec<Stream>,
    stream_index: HashMap<String, StreamId>,
    feed_count: usize,
    products: Vec<StreamId>,
    units: Vec<Unit>,
    tears: Vec<StreamId>,
    recycle: RecycleSettings,
    operating_hours: f64,
    utility_prices: UtilityPrices,
    tea: Tea,
}

impl System {
    pub fn from_def(def: &SystemDef, chemical_ids: &[String]) -> SimResult<Self> {
        let chemicals = Chemicals::new(chemical_ids.iter().cloned());
        let mut streams = Vec::new();
        let mut stream_index = HashMap::new();

        for feed in &def.feeds {
            let mut stream = Stream::new(&feed.id, chemicals.clone());
            for (chemical, flow) in &feed.mass_kg_per_hr {
                stream.set_imass(chemical, *flow)?;
            }
            stream.set_price(feed.price_usd_per_kg);
            for (name, value) in &feed.characterization_factors {
                stream.set_characterization_factor(name, *value);
            }
            register(&mut streams, &mut stream_index, stream, "feeds")?;
        }
        let feed_count = streams.len();

        for unit in &def.units {
            for out in &unit.outs {
                let stream = Stream::new(out, chemicals.clone());
                register(
                    &mut streams,
                    &mut stream_index,
                    stream,
                    &format!("unit '{}' outlets", unit.id),
                )?;
            }
        }

        let lookup = |id: &str, context: &str| {
            stream_index
                .get(id)
                .copied()
                .ok_or_else(|| SimError::UnknownStream {
                    stream: id.to_string(),
                    context: context.to_string(),
                })
        };

        let mut units = Vec::with_capacity(def.units.len());
        let mut produced: HashSet<StreamId> = HashSet::new();
        let mut tears = Vec::new();
        for unit_def in &def.units {
            let context = format!("unit '{}' inlets", unit_def.id);
            let ins = unit_def
                .ins
                .iter()
                .map(|id| lookup(id, &context))
                .collect::<SimResult<Vec<_>>>()?;
            let outs = unit_def
                .outs
                .iter()
                .map(|id| lookup(id, &context))
                .collect::<SimResult<Vec<_>>>()?;

            for id in &ins {
                if id.index() >= feed_count && !produced.contains(id) && !tears.contains(id) {
                    tears.push(*id);
                }
            }
            produced.extend(outs.iter().copied());
            units.push(Unit::from_def(unit_def, &chemicals, ins, outs)?);
        }

        let mut products = Vec::new();
        for id in def.product_ids() {
            let stream_id = lookup(id, "products")?;
            if let Some(price) = def.product_prices.get(id) {
                streams[stream_id.index()].set_price(*price);
            }
            products.push(stream_id);
        }
        for id in def.product_prices.keys() {
            if !def.product_ids().contains(&id.as_str()) {
                warn!(stream = %id, system = %def.id, "price set on a stream that is not a product");
            }
        }

        let system = Self {
            id: def.id.clone(),
            name: def.name.clone(),
            chemicals,
            streams,
            stream_index,
            feed_count,
            products,
            units,
            tears,
            recycle: (&def.recycle).into(),
            operating_hours: def.operating_hours,
            utility_prices: (&def.utilities).into(),
            tea: (&def.tea).into(),
        };
        debug!(
            system = %system.id,
            streams = system.streams.len(),
            units = system.units.len(),
            tears = system.tears.len(),
            "system built"
        );
        Ok(system)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chemicals(&self) -> &Chemicals {
        &self.chemicals
    }

    pub fn operating_hours(&self) -> f64 {
        self.operating_hours
    }

    pub fn set_operating_hours(&mut self, hours: f64) {
        self.tea.invalidate();
        self.operating_hours = hours;
    }

    pub fn tea(&self) -> &Tea {
        &self.tea
    }

    pub fn tea_mut(&mut self) -> &mut Tea {
        &mut self.tea
    }

    pub fn utility_prices(&self) -> &UtilityPrices {
        &self.utility_prices
    }

    pub fn utility_prices_mut(&mut self) -> &mut UtilityPrices {
        self.tea.invalidate();
        &mut self.utility_prices
    }

    pub fn recycle_settings(&self) -> &RecycleSettings {
        &self.recycle
    }

    pub fn feeds(&self) -> impl Iterator<Item = &Stream> + '_ {
        self.streams[..self.feed_count].iter()
    }

    pub fn feeds_mut(&mut self) -> impl Iterator<Item = &mut Stream> + '_ {
        self.tea.invalidate();
        self.streams[..self.feed_count].iter_mut()
    }

    /// Streams leaving the system, in unit order.
    pub fn products(&self) -> impl Iterator<Item = &Stream> + '_ {
        self.products.iter().map(|id| &self.streams[id.index()])
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn stream(&self, id: &str) -> Option<&Stream> {
        self.stream_index.get(id).map(|s| &self.streams[s.index()])
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Net electricity across all units (kW; negative is export).
    pub fn power_utility(&self) -> PowerUtility {
        self.units.iter().map(|u| u.power_utility().clone()).sum()
    }

    pub fn tear_streams(&self) -> Vec<&str> {
        self.tears
            .iter()
            .map(|id| self.streams[id.index()].id())
            .collect()
    }

    /// Unit connectivity: one node per unit, one edge per internal stream.
    pub fn flowsheet(&self) -> DiGraph<UnitId, StreamId> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.units.len())
            .map(|u| graph.add_node(UnitId::from_index(u)))
            .collect();
        let producer: HashMap<StreamId, usize> = self
            .units
            .iter()
            .enumerate()
            .flat_map(|(u, unit)| unit.outs().iter().map(move |id| (*id, u)))
            .collect();
        for (consumer, unit) in self.units.iter().enumerate() {
            for id in unit.ins() {
                if let Some(&source) = producer.get(id) {
                    graph.add_edge(nodes[source], nodes[consumer], *id);
                }
            }
        }
        graph
    }

    /// True when the unit graph contains a cycle.
    pub fn has_recycle(&self) -> bool {
        is_cyclic_directed(&self.flowsheet())
    }

    /// Runs every unit in order, repeating full passes until the tear
    /// streams converge, then refreshes the TEA cost basis.
    pub fn simulate(&mut self) -> SimResult<SimulationSummary> {
        let timer = Timer::start("simulate");
        self.tea.invalidate();
        for stream in &mut self.streams[self.feed_count..] {
            stream.empty();
        }

        let settings = self.recycle.clone();
        let mut updater = Updater::new(settings.method);
        let mut guess = self.tear_values();
        let mut iterations = 0;
        let mut residual = 0.0;
        loop {
            iterations += 1;
            let pass = Timer::start("recycle pass");
            self.run_pass()?;
            sim_timing::RECYCLE_PASSES.record(pass.elapsed_s());

            if self.tears.is_empty() {
                break;
            }
            let computed = self.tear_values();
            for value in &computed {
                br_core::ensure_finite(*value, "tear stream flow")?;
            }
            residual = br_core::max_relative_change(&guess, &computed);
            debug!(iteration = iterations, residual, "recycle pass");
            if residual < settings.tolerance {
                break;
            }
            if iterations >= settings.max_iterations {
                warn!(system = %self.id, iterations, residual, "recycle did not converge");
                return Err(SimError::RecycleNotConverged {
                    iterations,
                    residual,
                    tolerance: settings.tolerance,
                });
            }
            guess = updater.next(&guess, &computed);
            self.set_tear_values(&guess);
        }

        let basis = self.cost_basis();
        self.tea.set_cost_basis(basis);
        info!(system = %self.id, iterations, residual, "simulation converged");
        timer.stop_and_print();

        Ok(SimulationSummary {
            iterations,
            residual,
            tear_streams: self.tear_streams().into_iter().map(String::from).collect(),
        })
    }

    fn run_pass(&mut self) -> SimResult<()> {
        for unit in &mut self.units {
            let timer = Timer::start("unit run");
            unit.run(&mut self.streams, &self.utility_prices)?;
            sim_timing::UNIT_RUNS.record(timer.elapsed_s());
        }
        Ok(())
    }

    fn tear_values(&self) -> Vec<f64> {
        self.tears
            .iter()
            .flat_map(|id| self.streams[id.index()].mass().iter().copied())
            .collect()
    }

    fn set_tear_values(&mut self, values: &[f64]) {
        let n = self.chemicals.len();
        for (id, chunk) in self.tears.iter().zip(values.chunks(n)) {
            self.streams[id.index()].set_flow(chunk);
        }
    }

    fn cost_basis(&self) -> CostBasis {
        let hours = self.operating_hours;
        CostBasis {
            installed_equipment_cost: self.units.iter().map(Unit::installed_cost).sum(),
            material_cost: self
                .feeds()
                .map(|s| s.price() * s.f_mass() * hours)
                .sum(),
            utility_cost: self
                .units
                .iter()
                .map(|u| u.utility_cost(&self.utility_prices) * hours)
                .sum(),
            products: self
                .products()
                .map(|s| ProductRevenue {
                    stream: s.id().to_string(),
                    mass_kg_per_yr: s.f_mass() * hours,
                    price: s.price(),
                })
                .collect(),
        }
    }
}

fn register(
    streams: &mut Vec<Stream>,
    index: &mut HashMap<String, StreamId>,
    stream: Stream,
    context: &str,
) -> SimResult<()> {
    if index.contains_key(stream.id()) {
        return Err(SimError::Unit {
            unit: context.to_string(),
            what: format!("stream '{}' is defined twice", stream.id()),
        });
    }
    index.insert(stream.id().to_string(), StreamId::from_index(streams.len()));
    streams.push(stream);
    Ok(())
}
