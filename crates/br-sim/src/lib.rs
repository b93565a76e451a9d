//! br-sim: sequential-modular flowsheet simulation and techno-economic analysis.
//!
//! A [`System`] is built from a validated [`br_project::SystemDef`], mutated
//! through its accessors, and solved with [`System::simulate`]. After a
//! successful simulation its [`Tea`] exposes capital and operating costs, a
//! cash-flow table and break-even price solving.

pub mod cashflow;
pub mod error;
pub mod recycle;
pub mod stream;
pub mod system;
pub mod tea;
pub mod unit;
pub mod utility;

pub use cashflow::CashflowTable;
pub use error::{SimError, SimResult, TeaError, TeaResult};
pub use recycle::{RecycleMethod, RecycleSettings, WegsteinAccelerator};
pub use stream::{Chemicals, Stream, GWP};
pub use system::{SimulationSummary, System};
pub use tea::{CostBasis, ProductRevenue, Tea};
pub use unit::{PurchaseCost, Reaction, Unit, UnitKind};
pub use utility::{HeatUtility, HeatingAgent, PowerUtility, UtilityPrices};
