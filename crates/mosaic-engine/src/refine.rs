//! Iterative duration refinement.
//!
//! The apparent size of the target is a function of the (yet unknown)
//! observation duration, and the required coverage margin is a function of
//! that size, so margin and duration are mutually dependent. The refiner
//! chases the fixed point with a bounded loop: re-derive the margin from the
//! growth over the current duration estimate, rebuild layout and timing,
//! repeat until the duration stabilizes or the iteration cap is hit. Cap
//! exhaustion is a degraded-confidence result, never an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Rule combining the configured extra margin with the growth-derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginPolicy {
    /// `margin = max(growth - 1, 0) + extra` — growth compensation plus a
    /// flat reserve.
    Additive,
    /// `margin = (1 + extra) * max(growth, 1) - 1` — the reserve scales with
    /// the grown disk.
    Multiplicative,
}

impl MarginPolicy {
    pub fn combine(self, extra_margin: f64, growth_factor: f64) -> f64 {
        match self {
            MarginPolicy::Additive => (growth_factor - 1.0).max(0.0) + extra_margin,
            MarginPolicy::Multiplicative => (1.0 + extra_margin) * growth_factor.max(1.0) - 1.0,
        }
    }
}

/// Refinement loop configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RefineOptions {
    /// Hard iteration cap; bounds worst-case latency.
    pub max_iterations: u32,
    /// Relative duration tolerance declaring convergence.
    pub rel_tolerance: f64,
    pub margin_policy: MarginPolicy,
    /// Initial duration estimate in seconds; 60 s when not supplied.
    pub duration_guess_s: Option<f64>,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            rel_tolerance: 1.0e-3,
            margin_policy: MarginPolicy::Additive,
            duration_guess_s: None,
        }
    }
}

/// Loop phase; `Converged` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinePhase {
    Estimating,
    Refining,
    Converged,
    Exhausted,
}

/// State of the refinement loop, kept as part of the final result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IterationState {
    /// Margin used for the most recent layout.
    pub margin: f64,
    /// Most recent duration estimate, seconds.
    pub duration_s: f64,
    /// Apparent-size ratio end/start over the most recent interval.
    pub growth_factor: f64,
    pub iterations: u32,
    pub phase: RefinePhase,
}

impl IterationState {
    pub fn converged(&self) -> bool {
        self.phase == RefinePhase::Converged
    }
}

/// Drive the refinement loop.
///
/// `growth_at` queries the apparent-size ratio over an interval of the given
/// duration; `build` produces a pattern and its duration for a margin and
/// the current duration estimate. Both are re-evaluated every iteration —
/// geometry is never cached across iterations. Returns the last built value
/// alongside the final loop state.
pub fn run_refinement<T>(
    options: &RefineOptions,
    extra_margin: f64,
    mut growth_at: impl FnMut(f64) -> Result<f64>,
    mut build: impl FnMut(f64, f64) -> Result<(T, f64)>,
) -> Result<(T, IterationState)> {
    if options.max_iterations == 0 {
        return Err(crate::EngineError::InvalidConfig(
            "refinement iteration cap must be at least 1".to_string(),
        ));
    }
    let mut duration_s = options.duration_guess_s.unwrap_or(60.0).max(1.0);
    let mut result: Option<(T, IterationState)> = None;

    for iteration in 1..=options.max_iterations {
        let growth_factor = growth_at(duration_s)?;
        let margin = options.margin_policy.combine(extra_margin, growth_factor);
        let (value, new_duration_s) = build(margin, duration_s)?;
        debug!(
            iteration,
            growth_factor, margin, duration_s = new_duration_s, "refinement step"
        );

        let delta = (new_duration_s - duration_s).abs();
        let converged = delta <= options.rel_tolerance * duration_s;
        let phase = if converged {
            RefinePhase::Converged
        } else if iteration == options.max_iterations {
            RefinePhase::Exhausted
        } else if iteration == 1 {
            RefinePhase::Estimating
        } else {
            RefinePhase::Refining
        };
        result = Some((
            value,
            IterationState {
                margin,
                duration_s: new_duration_s,
                growth_factor,
                iterations: iteration,
                phase,
            },
        ));
        duration_s = new_duration_s;
        if converged {
            break;
        }
    }

    // The cap is at least 1 (checked above), so at least one iteration ran.
    let (value, state) = result.expect("refinement cap checked to be at least 1");
    if state.phase == RefinePhase::Exhausted {
        tracing::warn!(
            iterations = state.iterations,
            margin = state.margin,
            growth_factor = state.growth_factor,
            "refinement hit iteration cap without converging"
        );
    }
    debug_assert!(
        state.phase == RefinePhase::Converged || state.phase == RefinePhase::Exhausted
    );
    Ok((value, state))
}
