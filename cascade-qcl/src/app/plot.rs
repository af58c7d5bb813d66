//! Plot output
//!
//! The library does not draw anything itself. Band profiles and probability density curves are
//! handed to a `PlotSink`, the binary ships one which summarises each curve in the log.

use crate::{eigen::SpectrumPlot, layers::PositionGrid};

/// A consumer of labelled curves
pub trait PlotSink {
    fn plot(&mut self, xs: &[f64], ys: &[f64], label: &str);
}

/// Emits a debug event for every curve
#[derive(Debug, Default)]
pub struct TracingSink;

impl PlotSink for TracingSink {
    fn plot(&mut self, xs: &[f64], ys: &[f64], label: &str) {
        let finite = ys.iter().filter(|y| y.is_finite());
        let (low, high) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
            (lo.min(y), hi.max(y))
        });
        tracing::debug!(
            "{label}: {} points from {:.2} to {:.2} A, values in [{low:.4}, {high:.4}]",
            xs.len(),
            xs.first().copied().unwrap_or_default(),
            xs.last().copied().unwrap_or_default(),
        );
    }
}

/// Sends the band edges of `grid` and every curve of `plot`, offset by its state's energy
pub fn emit_spectrum(
    sink: &mut impl PlotSink,
    grid: &PositionGrid,
    plot: &SpectrumPlot,
    energies: &[f64],
) {
    let xs = grid.points.to_vec();
    for (label, profile) in [
        ("Gamma conduction band", &grid.vc),
        ("X conduction band", &grid.vx),
        ("L conduction band", &grid.vl),
        ("Light hole band", &grid.vlh),
        ("Split off band", &grid.vso),
    ] {
        sink.plot(&xs, &profile.to_vec(), label);
    }
    sink.plot(&xs, &grid.active_profile().to_vec(), "Active region");

    let points = plot.points.to_vec();
    for (index, (curve, energy)) in plot.curves.iter().zip(energies.iter()).enumerate() {
        let shifted: Vec<f64> = curve.iter().map(|y| y + energy).collect();
        sink.plot(&points, &shifted, &format!("State {index}"));
    }
}
