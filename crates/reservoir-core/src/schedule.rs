//! Step schedule for a fixed horizon

use crate::config::{RemainderPolicy, SimulationConfig};
use crate::error::{SimError, SimResult};
use tracing::warn;

/// Relative slack when deciding whether `horizon / dt` is a whole number
/// under the `reject` and `short_final_step` policies. Absorbs representation
/// error such as `0.3 / 0.1 = 2.9999999999999996`.
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// One planned stepping call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedStep {
    /// 1-based step index
    pub index: usize,
    /// Length of this step
    pub dt: f64,
    /// Simulated time once this step completes
    pub elapsed: f64,
}

/// The stepping calls of one run
#[derive(Debug, Clone, PartialEq)]
pub struct StepPlan {
    dt: f64,
    full_steps: usize,
    final_step: Option<f64>,
    horizon: f64,
}

impl StepPlan {
    /// Build the plan for a simulation config
    pub fn from_config(sim: &SimulationConfig) -> SimResult<Self> {
        Self::new(sim.horizon, sim.dt, sim.remainder)
    }

    /// Build the plan for `horizon` split into steps of `dt`
    pub fn new(horizon: f64, dt: f64, policy: RemainderPolicy) -> SimResult<Self> {
        if !(dt.is_finite() && dt > 0.0) || !(horizon.is_finite() && horizon >= 0.0) {
            return Err(SimError::config(format!(
                "Cannot plan steps for horizon {} and dt {}",
                horizon, dt
            )));
        }

        let ratio = horizon / dt;
        let floor_steps = ratio.floor() as usize;

        let (full_steps, final_step) = match policy {
            RemainderPolicy::Truncate => {
                if ratio.fract() != 0.0 {
                    warn!(
                        horizon,
                        dt,
                        steps = floor_steps,
                        dropped = horizon - floor_steps as f64 * dt,
                        "horizon is not a multiple of dt, dropping the remainder"
                    );
                }
                (floor_steps, None)
            }
            RemainderPolicy::Reject | RemainderPolicy::ShortFinalStep => {
                let nearest = ratio.round();
                if (ratio - nearest).abs() <= STEP_COUNT_TOLERANCE * nearest.max(1.0) {
                    (nearest as usize, None)
                } else if policy == RemainderPolicy::Reject {
                    return Err(SimError::config(format!(
                        "horizon {} is not a multiple of dt {} (remainder {})",
                        horizon,
                        dt,
                        horizon - floor_steps as f64 * dt
                    )));
                } else {
                    (floor_steps, Some(horizon - floor_steps as f64 * dt))
                }
            }
        };

        Ok(Self {
            dt,
            full_steps,
            final_step,
            horizon,
        })
    }

    /// Number of stepping calls
    pub fn len(&self) -> usize {
        self.full_steps + usize::from(self.final_step.is_some())
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nominal step length
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Length of the short final step, if any
    pub fn final_step(&self) -> Option<f64> {
        self.final_step
    }

    /// Planned step at 1-based `index`
    pub fn step(&self, index: usize) -> Option<PlannedStep> {
        if index == 0 || index > self.len() {
            return None;
        }
        if index <= self.full_steps {
            Some(PlannedStep {
                index,
                dt: self.dt,
                elapsed: index as f64 * self.dt,
            })
        } else {
            self.final_step.map(|dt| PlannedStep {
                index,
                dt,
                elapsed: self.horizon,
            })
        }
    }

    /// All planned steps in order
    pub fn steps(&self) -> impl Iterator<Item = PlannedStep> + '_ {
        (1..=self.len()).filter_map(move |i| self.step(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division() {
        let plan = StepPlan::new(1.0, 0.5, RemainderPolicy::Truncate).unwrap();
        assert_eq!(plan.len(), 2);
        let times: Vec<f64> = plan.steps().map(|s| s.elapsed).collect();
        assert_eq!(times, vec![0.5, 1.0]);
    }

    #[test]
    fn test_reference_run_has_hundred_steps() {
        let plan = StepPlan::new(10.0, 0.1, RemainderPolicy::Reject).unwrap();
        assert_eq!(plan.len(), 100);
        assert_eq!(plan.step(100).unwrap().elapsed, 100.0 * 0.1);
    }

    #[test]
    fn test_truncate_is_floor_of_ratio() {
        for (horizon, dt) in [(0.3, 0.1), (0.7, 0.1), (1.0, 0.3), (10.0, 0.1), (1.0, 0.5)] {
            let plan = StepPlan::new(horizon, dt, RemainderPolicy::Truncate).unwrap();
            assert_eq!(
                plan.len(),
                (horizon / dt).floor() as usize,
                "horizon = {}, dt = {}",
                horizon,
                dt
            );
        }
        assert_eq!(StepPlan::new(0.3, 0.1, RemainderPolicy::Truncate).unwrap().len(), 2);
        assert_eq!(StepPlan::new(0.7, 0.1, RemainderPolicy::Truncate).unwrap().len(), 6);
    }

    #[test]
    fn test_exact_policies_absorb_representation_error() {
        let plan = StepPlan::new(0.3, 0.1, RemainderPolicy::Reject).unwrap();
        assert_eq!(plan.len(), 3);
        let plan = StepPlan::new(0.7, 0.1, RemainderPolicy::ShortFinalStep).unwrap();
        assert_eq!(plan.len(), 7);
        assert!(plan.final_step().is_none());
    }

    #[test]
    fn test_truncate_drops_remainder() {
        let plan = StepPlan::new(1.0, 0.3, RemainderPolicy::Truncate).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.final_step().is_none());
    }

    #[test]
    fn test_short_final_step_covers_horizon() {
        let plan = StepPlan::new(1.0, 0.3, RemainderPolicy::ShortFinalStep).unwrap();
        assert_eq!(plan.len(), 4);
        let last = plan.step(4).unwrap();
        assert_eq!(last.elapsed, 1.0);
        assert!((last.dt - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reject_inexact() {
        assert!(StepPlan::new(1.0, 0.3, RemainderPolicy::Reject).is_err());
    }

    #[test]
    fn test_horizon_shorter_than_dt_plans_no_steps() {
        let plan = StepPlan::new(0.05, 0.1, RemainderPolicy::Truncate).unwrap();
        assert_eq!(plan.len(), 0);
        assert!(plan.is_empty());
        assert_eq!(plan.steps().count(), 0);

        assert!(StepPlan::new(0.0, 0.1, RemainderPolicy::Reject).unwrap().is_empty());
        assert_eq!(
            StepPlan::new(0.05, 0.1, RemainderPolicy::ShortFinalStep)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let plan = StepPlan::new(1.0, 0.5, RemainderPolicy::Truncate).unwrap();
        assert!(plan.step(0).is_none());
        assert!(plan.step(3).is_none());
    }

    #[test]
    fn test_elapsed_strictly_increasing() {
        let plan = StepPlan::new(7.3, 0.7, RemainderPolicy::ShortFinalStep).unwrap();
        let times: Vec<f64> = plan.steps().map(|s| s.elapsed).collect();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }
}
