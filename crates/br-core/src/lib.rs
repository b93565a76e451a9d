//! br-core: shared foundation for the biorefinery workspace.
//!
//! Contains:
//! - units (uom SI types + constructors for the utility-cost boundary)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact indices for streams and units)
//! - error (shared error types)
//! - timing (opt-in phase timers)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{BrError, BrResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
