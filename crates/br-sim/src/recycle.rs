//! Tear-stream convergence for flowsheets with recycle loops.
//!
//! The system executes its units in definition order; any stream consumed
//! before it is produced is a tear stream. One full pass maps the tear
//! guess `x` to a computed value `g(x)`, and the methods here choose the
//! next guess until the two agree within tolerance.

use br_project::schema::{RecycleDef, RecycleMethodDef};
use nalgebra::DVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecycleMethod {
    /// Next guess is the computed value.
    DirectSubstitution,
    /// Secant-slope acceleration bounded to `q ∈ [q_min, q_max]`.
    #[default]
    Wegstein,
}

impl From<RecycleMethodDef> for RecycleMethod {
    fn from(def: RecycleMethodDef) -> Self {
        match def {
            RecycleMethodDef::DirectSubstitution => RecycleMethod::DirectSubstitution,
            RecycleMethodDef::Wegstein => RecycleMethod::Wegstein,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecycleSettings {
    pub method: RecycleMethod,
    pub max_iterations: usize,
    /// Largest relative change between successive tear values.
    pub tolerance: f64,
}

impl Default for RecycleSettings {
    fn default() -> Self {
        (&RecycleDef::default()).into()
    }
}

impl From<&RecycleDef> for RecycleSettings {
    fn from(def: &RecycleDef) -> Self {
        Self {
            method: def.method.into(),
            max_iterations: def.max_iterations,
            tolerance: def.tolerance,
        }
    }
}

/// Wegstein acceleration for the fixed point `x = g(x)`.
///
/// With slope `s = Δg / Δx` between the last two iterations,
/// `q = s / (s - 1)` and `x_next = q·x + (1 - q)·g(x)`.
/// The first two calls fall back to direct substitution while history
/// builds up.
pub struct WegsteinAccelerator {
    previous: Option<(DVector<f64>, DVector<f64>)>,
    calls: usize,
    q_min: f64,
    q_max: f64,
}

impl WegsteinAccelerator {
    pub fn new(q_min: f64, q_max: f64) -> Self {
        Self {
            previous: None,
            calls: 0,
            q_min,
            q_max,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(-5.0, 0.0)
    }

    pub fn accelerate(&mut self, x: &[f64], gx: &[f64]) -> Vec<f64> {
        let x = DVector::from_column_slice(x);
        let gx = DVector::from_column_slice(gx);
        self.calls += 1;

        let next = match &self.previous {
            Some((x_prev, g_prev)) if self.calls > 2 && x_prev.len() == x.len() => {
                let mut next = gx.clone();
                for i in 0..x.len() {
                    let dx = x[i] - x_prev[i];
                    if dx.abs() <= 1e-14 {
                        continue;
                    }
                    let slope = (gx[i] - g_prev[i]) / dx;
                    let q = if (slope - 1.0).abs() > 1e-14 {
                        slope / (slope - 1.0)
                    } else {
                        0.0
                    };
                    let q = q.clamp(self.q_min, self.q_max);
                    next[i] = q * x[i] + (1.0 - q) * gx[i];
                }
                next
            }
            _ => gx.clone(),
        };

        self.previous = Some((x, gx));
        // Flows are physical; an overshoot below zero restarts from zero.
        next.iter().map(|v| v.max(0.0)).collect()
    }
}

/// Chooses the next tear guess for one of the supported methods.
pub(crate) enum Updater {
    Direct,
    Wegstein(WegsteinAccelerator),
}

impl Updater {
    pub(crate) fn new(method: RecycleMethod) -> Self {
        match method {
            RecycleMethod::DirectSubstitution => Updater::Direct,
            RecycleMethod::Wegstein => Updater::Wegstein(WegsteinAccelerator::with_defaults()),
        }
    }

    pub(crate) fn next(&mut self, x: &[f64], gx: &[f64]) -> Vec<f64> {
        match self {
            Updater::Direct => gx.to_vec(),
            Updater::Wegstein(acc) => acc.accelerate(x, gx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Recycle loop: 100 kg/hr fresh feed mixed with recycle, 80% recycled.
    fn loop_map(x: &[f64]) -> Vec<f64> {
        vec![0.8 * (100.0 + x[0])]
    }

    fn iterations_to_converge(mut updater: Updater) -> usize {
        let mut x = vec![0.0];
        for k in 1..=500 {
            let gx = loop_map(&x);
            if br_core::max_relative_change(&x, &gx) < 1e-10 {
                return k;
            }
            x = updater.next(&x, &gx);
        }
        usize::MAX
    }

    #[test]
    fn wegstein_beats_direct_substitution() {
        let direct = iterations_to_converge(Updater::new(RecycleMethod::DirectSubstitution));
        let wegstein = iterations_to_converge(Updater::new(RecycleMethod::Wegstein));
        assert!(direct < usize::MAX);
        assert!(wegstein < direct, "wegstein {wegstein} vs direct {direct}");
    }

    #[test]
    fn wegstein_finds_linear_fixed_point() {
        let mut acc = WegsteinAccelerator::with_defaults();
        let mut x = vec![0.0];
        for _ in 0..10 {
            let gx = loop_map(&x);
            x = acc.accelerate(&x, &gx);
        }
        assert!((x[0] - 400.0).abs() < 1e-6);
    }

    #[test]
    fn first_two_steps_are_direct() {
        let mut acc = WegsteinAccelerator::with_defaults();
        assert_eq!(acc.accelerate(&[0.0], &[80.0]), vec![80.0]);
        assert_eq!(acc.accelerate(&[80.0], &[144.0]), vec![144.0]);
    }

    #[test]
    fn accelerated_guess_is_never_negative() {
        let mut acc = WegsteinAccelerator::new(-5.0, 0.0);
        acc.accelerate(&[10.0], &[5.0]);
        acc.accelerate(&[5.0], &[1.0]);
        let next = acc.accelerate(&[1.0], &[-3.0]);
        assert!(next[0] >= 0.0);
    }
}
