//! Iteration runner.
//!
//! Runs steps of the configured scheme, checks the residual every period
//! and stops on convergence or when the iteration budget runs out. Running
//! out of budget is a terminal state, not an error.

use crate::error::{LbmError, Result};

use super::evolution::Simulation;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Every residual dropped below the criterion.
    Converged,
    /// The iteration budget ran out first.
    BudgetExhausted,
}

/// Residuals of one check.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualRecord {
    /// Completed steps at the check.
    pub iteration: usize,
    /// Residual per macroscopic variable.
    pub residuals: Vec<f64>,
}

/// Result of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationOutcome {
    /// Terminal state.
    pub status: ConvergenceStatus,
    /// Steps taken by this run.
    pub iterations: usize,
    /// Residual checks in order.
    pub history: Vec<ResidualRecord>,
}

impl IterationOutcome {
    /// Whether the run converged.
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }

    /// Residuals of the last check, if any.
    pub fn final_residuals(&self) -> Option<&[f64]> {
        self.history.last().map(|r| r.residuals.as_slice())
    }
}

impl Simulation {
    /// Run with the configured criterion, check period and budget.
    pub fn iterate(&mut self) -> Result<IterationOutcome> {
        let config = self.config();
        let (criterion, period, budget) = (
            config.convergence_criterion,
            config.check_period,
            config.max_iterations,
        );
        self.iterate_until(criterion, period, budget)
    }

    /// Run until every residual is below `criterion`, checking every
    /// `check_period` steps, for at most `max_iterations` steps.
    ///
    /// Residuals are normalised by the `check_period * dt` window.
    pub fn iterate_until(
        &mut self,
        criterion: f64,
        check_period: usize,
        max_iterations: usize,
    ) -> Result<IterationOutcome> {
        if check_period == 0 {
            return Err(LbmError::invalid_config("check period must be positive"));
        }
        let names = self.macro_var_names();
        let mut history = Vec::new();
        let mut steps = 0;

        while steps < max_iterations {
            if let Err(e) = self.step() {
                tracing::error!("case '{}': step {} failed: {}", self.name(), self.iteration(), e);
                return Err(e);
            }
            steps += 1;

            if steps % check_period == 0 {
                self.update_macro_vars();
                let report = self.calc_residual(check_period)?;
                let summary: Vec<String> = names
                    .iter()
                    .zip(&report.residuals)
                    .map(|(n, r)| format!("{n} = {r:.3e}"))
                    .collect();
                tracing::info!(
                    "case '{}': iteration {}: residual {}",
                    self.name(),
                    self.iteration(),
                    summary.join(", ")
                );
                let converged = report.converged(criterion);
                history.push(ResidualRecord {
                    iteration: self.iteration(),
                    residuals: report.residuals,
                });
                if converged {
                    return Ok(IterationOutcome {
                        status: ConvergenceStatus::Converged,
                        iterations: steps,
                        history,
                    });
                }
            }
        }

        self.update_macro_vars();
        tracing::warn!(
            "case '{}': not converged to {:.1e} after {} iterations",
            self.name(),
            criterion,
            steps
        );
        Ok(IterationOutcome {
            status: ConvergenceStatus::BudgetExhausted,
            iterations: steps,
            history,
        })
    }

    /// Run exactly `n` steps without residual checks.
    pub fn iterate_for(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        self.update_macro_vars();
        Ok(())
    }
}
