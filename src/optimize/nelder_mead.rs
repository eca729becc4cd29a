//! Nelder-Mead downhill simplex.

use super::{evaluate, relative_change, Bounds, Deadline, Minimizer, Minimum, OptimizerConfig};

const REFLECT: f64 = -1.0;
const EXPAND: f64 = -2.0;
const CONTRACT_OUTSIDE: f64 = -0.5;
const CONTRACT_INSIDE: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Derivative-free simplex minimizer.
///
/// Converges when, across consecutive iterations, the relative change of the
/// best value and the relative spread of values over the simplex both fall
/// below `tolerance`, and every vertex lies within `√tolerance` (relative) of
/// the best vertex. Vertices are projected into the bounds after every move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    /// Absolute offset of the initial simplex vertices along each coordinate.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self { initial_step: 0.1 }
    }
}

impl NelderMead {
    pub fn with_step(initial_step: f64) -> Self {
        Self { initial_step }
    }

    fn initial_simplex(&self, start: &[f64], bounds: &Bounds) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(start.len() + 1);
        simplex.push(start.to_vec());
        for i in 0..start.len() {
            let mut vertex = start.to_vec();
            let step = match bounds.get(i) {
                Some((_, hi)) if start[i] + self.initial_step > hi => -self.initial_step,
                _ => self.initial_step,
            };
            vertex[i] += step;
            bounds.clamp(&mut vertex);
            simplex.push(vertex);
        }
        simplex
    }
}

/// `origin + t * (toward - origin)`, projected into the bounds.
fn along(origin: &[f64], toward: &[f64], t: f64, bounds: &Bounds) -> Vec<f64> {
    let mut x: Vec<f64> = origin
        .iter()
        .zip(toward)
        .map(|(&o, &w)| o + t * (w - o))
        .collect();
    bounds.clamp(&mut x);
    x
}

fn centroid(vertices: &[Vec<f64>]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let dim = vertices[0].len();
    (0..dim)
        .map(|j| vertices.iter().map(|v| v[j]).sum::<f64>() / n)
        .collect()
}

fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

impl Minimizer for NelderMead {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
        bounds: &Bounds,
        config: &OptimizerConfig,
    ) -> Minimum {
        let n = initial.len();
        let deadline = Deadline::start(config);

        let mut start = initial.to_vec();
        bounds.clamp(&mut start);
        if n == 0 {
            return Minimum {
                value: evaluate(objective, &start),
                point: start,
                converged: true,
                iterations: 0,
            };
        }

        let mut simplex = self.initial_simplex(&start, bounds);
        let mut values: Vec<f64> = simplex.iter().map(|x| evaluate(objective, x)).collect();
        order(&mut simplex, &mut values);

        let x_tol = config.tolerance.sqrt();
        let mut prev_best = values[0];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iterations && !deadline.expired() {
            iterations += 1;

            let c = centroid(&simplex[..n]);
            let worst = simplex[n].clone();
            let f_worst = values[n];

            let xr = along(&c, &worst, REFLECT, bounds);
            let fr = evaluate(objective, &xr);

            if fr < values[0] {
                let xe = along(&c, &worst, EXPAND, bounds);
                let fe = evaluate(objective, &xe);
                if fe < fr {
                    simplex[n] = xe;
                    values[n] = fe;
                } else {
                    simplex[n] = xr;
                    values[n] = fr;
                }
            } else if fr < values[n - 1] {
                simplex[n] = xr;
                values[n] = fr;
            } else {
                let (xc, fc) = if fr < f_worst {
                    let xc = along(&c, &worst, CONTRACT_OUTSIDE, bounds);
                    let fc = evaluate(objective, &xc);
                    (xc, fc)
                } else {
                    let xc = along(&c, &worst, CONTRACT_INSIDE, bounds);
                    let fc = evaluate(objective, &xc);
                    (xc, fc)
                };

                if fc < fr.min(f_worst) {
                    simplex[n] = xc;
                    values[n] = fc;
                } else {
                    let best = simplex[0].clone();
                    for i in 1..=n {
                        simplex[i] = along(&best, &simplex[i], SHRINK, bounds);
                        values[i] = evaluate(objective, &simplex[i]);
                    }
                }
            }

            order(&mut simplex, &mut values);

            let spread = relative_change(values[n], values[0]);
            let change = relative_change(prev_best, values[0]);
            prev_best = values[0];

            let collapsed = simplex[1..].iter().all(|v| {
                v.iter()
                    .zip(&simplex[0])
                    .all(|(&a, &b)| (a - b).abs() <= x_tol * b.abs().max(1.0))
            });

            if spread <= config.tolerance && change <= config.tolerance && collapsed {
                converged = true;
                break;
            }
        }

        Minimum {
            point: simplex.swap_remove(0),
            value: values[0],
            converged,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respects_bounds() {
        // Unconstrained minimum at (-3, 4) lies outside the box.
        let objective = |x: &[f64]| (x[0] + 3.0).powi(2) + (x[1] - 4.0).powi(2);
        let bounds = Bounds::new(vec![(0.0, 10.0), (0.0, 2.0)]).expect("valid bounds");
        let min = NelderMead::default().minimize(&objective, &[5.0, 1.0], &bounds, &OptimizerConfig::default());
        assert!(min.point[0] >= 0.0 && min.point[0] < 1e-2, "x = {:?}", min.point);
        assert!(min.point[1] <= 2.0 && min.point[1] > 2.0 - 1e-2, "x = {:?}", min.point);
    }

    #[test]
    fn test_start_on_upper_bound_builds_valid_simplex() {
        let objective = |x: &[f64]| (x[0] - 0.5).powi(2);
        let bounds = Bounds::interval(0.0, 1.0).expect("valid interval");
        let simplex = NelderMead::default().initial_simplex(&[1.0], &bounds);
        assert!((simplex[1][0] - 0.9).abs() < 1e-12);

        let min = NelderMead::default().minimize(&objective, &[1.0], &bounds, &OptimizerConfig::default());
        assert!((min.point[0] - 0.5).abs() < 5e-3);
    }

    #[test]
    fn test_deterministic() {
        let objective = |x: &[f64]| (x[0] - 1.5).powi(4) + (x[0] * x[1] - 2.0).powi(2) + 10.0;
        let config = OptimizerConfig::default();
        let a = NelderMead::default().minimize(&objective, &[0.3, 0.7], &Bounds::unbounded(), &config);
        let b = NelderMead::default().minimize(&objective, &[0.3, 0.7], &Bounds::unbounded(), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_problem() {
        let min = NelderMead::default().minimize(&|_: &[f64]| 4.0, &[], &Bounds::unbounded(), &OptimizerConfig::default());
        assert!(min.converged);
        assert_eq!(min.value, 4.0);
    }
}
