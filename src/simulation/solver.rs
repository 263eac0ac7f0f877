//! Bounded iterative solvers
//!
//! Both solvers run for at most `max_iterations` steps. With no tolerance
//! set they always run the full count, which is how the queue model is
//! calibrated. A tolerance stops early once successive iterates agree.

use log::warn;

/// Iteration limits for one solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Stop once `|x_{k+1} - x_k| <= tolerance`. `None` disables the check.
    pub tolerance: Option<f64>,
}

impl SolverOptions {
    pub fn fixed(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            tolerance: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Outcome of a bounded solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub value: f64,
    pub iterations: usize,
    /// True if the tolerance was met. Always false with no tolerance.
    pub converged: bool,
}

impl Solution {
    fn finish(value: f64, iterations: usize, converged: bool, options: &SolverOptions, kind: &str) -> Self {
        if options.tolerance.is_some() && !converged {
            warn!(
                "{} solve did not converge after {} iterations (last value {})",
                kind, iterations, value
            );
        }
        Self {
            value,
            iterations,
            converged,
        }
    }
}

fn within_tolerance(previous: f64, next: f64, options: &SolverOptions) -> bool {
    options
        .tolerance
        .is_some_and(|tolerance| (next - previous).abs() <= tolerance)
}

/// Iterate `x := g(x)` from `x0`
///
/// Stops early if an iterate becomes non-finite, returning that iterate.
pub fn fixed_point<G>(g: G, x0: f64, options: SolverOptions) -> Solution
where
    G: Fn(f64) -> f64,
{
    let mut x = x0;
    for iteration in 1..=options.max_iterations {
        let next = g(x);
        let converged = within_tolerance(x, next, &options);
        x = next;
        if !x.is_finite() {
            return Solution::finish(x, iteration, false, &options, "Fixed-point");
        }
        if converged {
            return Solution::finish(x, iteration, true, &options, "Fixed-point");
        }
    }
    Solution::finish(x, options.max_iterations, false, &options, "Fixed-point")
}

/// Newton's method on `f` with derivative `df`, starting from `x0`
///
/// Stops early if an iterate becomes non-finite, returning that iterate.
pub fn newton<F, D>(f: F, df: D, x0: f64, options: SolverOptions) -> Solution
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let mut x = x0;
    for iteration in 1..=options.max_iterations {
        let next = x - f(x) / df(x);
        let converged = within_tolerance(x, next, &options);
        x = next;
        if !x.is_finite() {
            return Solution::finish(x, iteration, false, &options, "Newton");
        }
        if converged {
            return Solution::finish(x, iteration, true, &options, "Newton");
        }
    }
    Solution::finish(x, options.max_iterations, false, &options, "Newton")
}
