//! Root bracketing shared by the eigen and optical mode solvers
//!
//! A sampled function is interpolated by a natural cubic spline and resampled on a grid
//! `oversampling` times finer. Every strict sign change of the resampled values brackets one
//! root, which is then located by inverse quadratic interpolation through the three samples
//! around the change.

mod spline;

pub use spline::NaturalCubicSpline;

use crate::error::RootError;

/// Indices `i` where `values[i]` and `values[i + 1]` are nonzero and of opposite sign
pub fn sign_changes(values: &[f64]) -> Vec<usize> {
    values
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| crosses(pair[0], pair[1]))
        .map(|(i, _)| i)
        .collect()
}

fn crosses(a: f64, b: f64) -> bool {
    (a > 0. && b < 0.) || (a < 0. && b > 0.)
}

/// Estimates the root of the parabola `x(f)` through three samples
///
/// The root is assumed to lie between the second and third samples. Where the interpolant is
/// undefined, because two samples share a value, the secant through the bracketing pair is
/// used instead.
pub fn inverse_quadratic(x: [f64; 3], f: [f64; 3]) -> f64 {
    let estimate = x[0] * f[1] * f[2] / (f[0] - f[1]) / (f[0] - f[2])
        + x[1] * f[0] * f[2] / (f[1] - f[0]) / (f[1] - f[2])
        + x[2] * f[0] * f[1] / (f[2] - f[0]) / (f[2] - f[1]);
    if estimate.is_finite() {
        return estimate;
    }
    if f[2] != f[1] {
        x[1] - f[1] * (x[2] - x[1]) / (f[2] - f[1])
    } else {
        0.5 * (x[1] + x[2])
    }
}

/// Finds the zeros of the function sampled at `(xs, ys)`
///
/// `xs` must be strictly increasing. Fewer than two samples yield no zeros. Returns an error
/// if more than `budget` brackets are found.
pub fn oversampled_zeros(
    xs: &[f64],
    ys: &[f64],
    oversampling: usize,
    budget: usize,
) -> Result<Vec<f64>, RootError> {
    if xs.len() < 2 {
        return Ok(vec![]);
    }
    let spline = NaturalCubicSpline::new(xs, ys)?;
    let count = xs.len() * oversampling.max(1);
    let start = xs[0];
    let step = (xs[xs.len() - 1] - start) / (count - 1) as f64;
    let at = |i: usize| start + i as f64 * step;

    let mut brackets = Vec::new();
    let mut previous: Option<f64> = None;
    for (i, value) in spline.sample_uniform(start, step, count).enumerate() {
        if let Some(previous) = previous {
            if crosses(previous, value) {
                brackets.push(i - 1);
                if brackets.len() > budget {
                    return Err(RootError::BracketBudgetExceeded {
                        found: brackets.len(),
                        budget,
                    });
                }
            }
        }
        previous = Some(value);
    }

    if count < 3 {
        // Too few points for a parabola, fall back to the secant
        return Ok(brackets
            .into_iter()
            .map(|i| {
                let (x0, x1) = (at(i), at(i + 1));
                let (f0, f1) = (spline.evaluate(x0), spline.evaluate(x1));
                x0 - f0 * (x1 - x0) / (f1 - f0)
            })
            .collect());
    }

    Ok(brackets
        .into_iter()
        .map(|i| {
            let centre = i.max(1).min(count - 2);
            let x = [at(centre - 1), at(centre), at(centre + 1)];
            let f = [spline.evaluate(x[0]), spline.evaluate(x[1]), spline.evaluate(x[2])];
            inverse_quadratic(x, f)
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::{inverse_quadratic, oversampled_zeros, sign_changes};
    use approx::assert_relative_eq;

    #[test]
    fn sign_changes_skip_exact_zeros() {
        assert_eq!(sign_changes(&[1., -1., -2., 3.]), vec![0, 2]);
        assert_eq!(sign_changes(&[1., 0., -1.]), Vec::<usize>::new());
        assert!(sign_changes(&[]).is_empty());
    }

    #[test]
    fn inverse_quadratic_is_exact_for_a_parabola_in_x_of_f() {
        // x = f^2 + 2 f + 3, so x(0) = 3
        let f = [-1.5, -0.5, 0.25];
        let x = f.map(|f| f * f + 2. * f + 3.);
        assert_relative_eq!(inverse_quadratic(x, f), 3., epsilon = 1e-12);
    }

    #[test]
    fn degenerate_samples_fall_back_to_the_secant() {
        let estimate = inverse_quadratic([0., 1., 2.], [1., 1., -1.]);
        assert_relative_eq!(estimate, 1.5);
    }

    #[test]
    fn zeros_of_a_sine_are_located() {
        let xs: Vec<f64> = (0..200).map(|i| 0.05 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let zeros = oversampled_zeros(&xs, &ys, 100, 100).unwrap();
        assert_eq!(zeros.len(), 3);
        for (zero, expected) in zeros.iter().zip([1., 2., 3.]) {
            assert_relative_eq!(*zero, expected * std::f64::consts::PI, epsilon = 1e-5);
        }
    }

    #[test]
    fn the_bracket_budget_is_enforced() {
        let xs: Vec<f64> = (0..400).map(|i| 0.1 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| (3. * x).sin()).collect();
        assert!(oversampled_zeros(&xs, &ys, 10, 5).is_err());
    }

    #[test]
    fn short_samples_have_no_zeros() {
        assert!(oversampled_zeros(&[1.], &[-1.], 100, 10).unwrap().is_empty());
    }
}
