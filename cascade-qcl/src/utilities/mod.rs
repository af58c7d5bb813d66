// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Utilities
//!
//! Small numerical helpers shared by the solvers

/// Evenly spaced values in the half open interval `[start, stop)`
///
/// Values are generated as `start + i * step` so that long ranges do not accumulate error.
pub(crate) fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.) || !(stop > start) {
        return vec![];
    }
    let count = ((stop - start) / step).ceil() as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// `count` evenly spaced values from `start` to `stop` inclusive
pub(crate) fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// The permutation which sorts `values` in ascending order, NaN last
pub(crate) fn argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    indices
}

#[cfg(test)]
mod test {
    use super::{arange, argsort, linspace};
    use approx::assert_relative_eq;

    #[test]
    fn arange_excludes_the_end_point() {
        let values = arange(0., 1., 0.25);
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[3], 0.75);
        assert!(arange(1., 0., 0.1).is_empty());
        assert!(arange(0., 1., 0.).is_empty());
    }

    #[test]
    fn linspace_includes_both_ends() {
        let values = linspace(-1., 1., 5);
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[0], -1.);
        assert_relative_eq!(values[4], 1.);
        assert_eq!(linspace(2., 3., 1), vec![2.]);
    }

    #[test]
    fn argsort_orders_ascending() {
        assert_eq!(argsort(&[3., 1., 2.]), vec![1, 2, 0]);
    }
}
