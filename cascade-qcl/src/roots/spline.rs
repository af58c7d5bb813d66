use crate::error::RootError;

/// A natural cubic spline through real valued samples
///
/// The second derivative vanishes at both ends, elsewhere the interpolant has continuous
/// first and second derivatives.
#[derive(Clone, Debug)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    y2s: Vec<f64>,
}

impl NaturalCubicSpline {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, RootError> {
        if xs.len() != ys.len() {
            return Err(RootError::Spline(format!(
                "{} abscissae but {} ordinates",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(RootError::Spline(format!(
                "at least two knots are needed, found {}",
                xs.len()
            )));
        }
        if let Some(i) = (1..xs.len()).find(|&i| xs[i] <= xs[i - 1]) {
            return Err(RootError::Spline(format!(
                "knots must be strictly increasing, knot {i} is not"
            )));
        }

        let n = xs.len();
        let mut y2s = vec![0.; n];
        let mut u = vec![0.; n - 1];

        // Forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.;
            y2s[i] = (sig - 1.) / p;
            let slope_change =
                (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6. * slope_change / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }
        for k in (0..n - 2).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            y2s,
        })
    }

    fn interval(&self, x: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.xs.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    fn evaluate_in(&self, lo: usize, x: f64) -> f64 {
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;
        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.
    }

    /// Evaluates the spline at `x`, extrapolating with the boundary cubic outside the knots
    pub fn evaluate(&self, x: f64) -> f64 {
        self.evaluate_in(self.interval(x), x)
    }

    /// Evaluates the spline at `count` evenly spaced points from `start`
    ///
    /// The enclosing interval is tracked as the points advance, so a dense sweep costs a
    /// constant amount per point.
    pub fn sample_uniform(
        &self,
        start: f64,
        step: f64,
        count: usize,
    ) -> impl Iterator<Item = f64> + '_ {
        let last_interval = self.xs.len() - 2;
        let mut lo = self.interval(start).min(last_interval);
        (0..count).map(move |i| {
            let x = start + i as f64 * step;
            while lo < last_interval && self.xs[lo + 1] <= x {
                lo += 1;
            }
            self.evaluate_in(lo, x)
        })
    }
}

#[cfg(test)]
mod test {
    use super::NaturalCubicSpline;
    use approx::assert_relative_eq;

    #[test]
    fn spline_passes_through_its_knots() {
        let xs = [1., 2., 3., 4., 5.];
        let ys = [2., 3., 5., 4., 1.];
        let spline = NaturalCubicSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.evaluate(*x), *y, epsilon = 1e-10);
        }
    }

    #[test]
    fn uniform_sampling_matches_pointwise_evaluation() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let spline = NaturalCubicSpline::new(&xs, &ys).unwrap();
        let step = xs[19] / 199.;
        for (i, value) in spline.sample_uniform(0., step, 200).enumerate() {
            assert_relative_eq!(value, spline.evaluate(i as f64 * step), epsilon = 1e-12);
        }
    }

    #[test]
    fn malformed_knots_are_rejected() {
        assert!(NaturalCubicSpline::new(&[0.], &[1.]).is_err());
        assert!(NaturalCubicSpline::new(&[0., 1.], &[1.]).is_err());
        assert!(NaturalCubicSpline::new(&[0., 0.], &[1., 2.]).is_err());
    }
}
