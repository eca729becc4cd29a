//! Golden-section line search.

use super::{evaluate, relative_change, Bounds, Deadline, Minimizer, Minimum, OptimizerConfig};

/// 1/φ where φ is the golden ratio.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Bracketing minimizer for unimodal objectives.
///
/// Each coordinate is searched in turn over its bounds while the others are
/// held fixed; in one dimension this is a single golden-section search. A
/// coordinate without finite bounds is bracketed by `x₀ ± max(|x₀|, 1)`.
/// Each bracket reduction costs one iteration of the shared budget.
///
/// Converged once every line search has narrowed its bracket below
/// `tolerance` (relative to the bracket's magnitude) and, for more than one
/// coordinate, a full sweep changes the objective by less than `tolerance`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GoldenSection;

struct LineResult {
    x: f64,
    value: f64,
    bracket_closed: bool,
}

impl GoldenSection {
    fn bracket(x0: f64, bounds: &Bounds, i: usize) -> (f64, f64) {
        let half = x0.abs().max(1.0);
        match bounds.get(i) {
            Some((lo, hi)) => (
                if lo.is_finite() { lo } else { x0 - half },
                if hi.is_finite() { hi } else { x0 + half },
            ),
            None => (x0 - half, x0 + half),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn line_search(
        objective: &dyn Fn(&[f64]) -> f64,
        point: &mut [f64],
        i: usize,
        (mut a, mut b): (f64, f64),
        tolerance: f64,
        budget: usize,
        deadline: &Deadline,
        used: &mut usize,
    ) -> LineResult {
        let mut c = b - INV_PHI * (b - a);
        let mut d = a + INV_PHI * (b - a);
        let mut fc = eval_at(objective, point, i, c);
        let mut fd = eval_at(objective, point, i, d);
        let mut bracket_closed = false;

        while *used < budget && !deadline.expired() {
            if bracket_is_closed(a, b, tolerance) {
                bracket_closed = true;
                break;
            }
            *used += 1;
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - INV_PHI * (b - a);
                fc = eval_at(objective, point, i, c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + INV_PHI * (b - a);
                fd = eval_at(objective, point, i, d);
            }
        }
        if !bracket_closed {
            bracket_closed = bracket_is_closed(a, b, tolerance);
        }

        let (x, value) = if fc < fd { (c, fc) } else { (d, fd) };
        point[i] = x;
        LineResult {
            x,
            value,
            bracket_closed,
        }
    }
}

fn eval_at(objective: &dyn Fn(&[f64]) -> f64, point: &mut [f64], i: usize, x: f64) -> f64 {
    point[i] = x;
    evaluate(objective, point)
}

fn bracket_is_closed(a: f64, b: f64, tolerance: f64) -> bool {
    (b - a).abs() <= tolerance * (a.abs() + b.abs()).max(f64::EPSILON)
}

impl Minimizer for GoldenSection {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
        bounds: &Bounds,
        config: &OptimizerConfig,
    ) -> Minimum {
        let deadline = Deadline::start(config);
        let mut best = initial.to_vec();
        bounds.clamp(&mut best);
        let mut best_value = evaluate(objective, &best);
        let mut iterations = 0;
        let mut converged = best.is_empty();

        while !converged && iterations < config.max_iterations && !deadline.expired() {
            let sweep_start = best_value;
            let mut all_closed = true;

            for i in 0..best.len() {
                let bracket = Self::bracket(best[i], bounds, i);
                let mut trial = best.clone();
                let line = Self::line_search(
                    objective,
                    &mut trial,
                    i,
                    bracket,
                    config.tolerance,
                    config.max_iterations,
                    &deadline,
                    &mut iterations,
                );
                all_closed &= line.bracket_closed;
                if line.value <= best_value {
                    best[i] = line.x;
                    best_value = line.value;
                }
            }

            converged = all_closed
                && (best.len() == 1 || relative_change(sweep_start, best_value) <= config.tolerance);
        }

        Minimum {
            point: best,
            value: best_value,
            converged,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_interior_minimum() {
        let objective = |x: &[f64]| (x[0] - 3.7).powi(2);
        let bounds = Bounds::interval(0.0, 10.0).expect("valid interval");
        let min = GoldenSection.minimize(&objective, &[9.0], &bounds, &OptimizerConfig::default());
        assert!(min.converged);
        assert!((min.point[0] - 3.7).abs() < 1e-4, "x = {}", min.point[0]);
        assert!(min.iterations < 60, "iterations = {}", min.iterations);
    }

    #[test]
    fn test_minimum_at_boundary() {
        let objective = |x: &[f64]| x[0];
        let bounds = Bounds::interval(2.0, 5.0).expect("valid interval");
        let min = GoldenSection.minimize(&objective, &[4.0], &bounds, &OptimizerConfig::default());
        assert!((min.point[0] - 2.0).abs() < 1e-4, "x = {}", min.point[0]);
    }

    #[test]
    fn test_two_dimensional_sweeps() {
        let objective = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2) + 5.0;
        let bounds = Bounds::new(vec![(-5.0, 5.0), (-5.0, 5.0)]).expect("valid bounds");
        let config = OptimizerConfig {
            max_iterations: 500,
            ..OptimizerConfig::default()
        };
        let min = GoldenSection.minimize(&objective, &[0.0, 0.0], &bounds, &config);
        assert!(min.converged);
        assert!((min.point[0] - 1.0).abs() < 1e-3);
        assert!((min.point[1] + 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_budget_exhaustion() {
        let objective = |x: &[f64]| (x[0] - 3.7).powi(2);
        let bounds = Bounds::interval(0.0, 10.0).expect("valid interval");
        let config = OptimizerConfig {
            max_iterations: 5,
            ..OptimizerConfig::default()
        };
        let min = GoldenSection.minimize(&objective, &[9.0], &bounds, &config);
        assert!(!min.converged);
        assert_eq!(min.iterations, 5);
        assert!(min.value < (9.0_f64 - 3.7).powi(2));
    }
}
