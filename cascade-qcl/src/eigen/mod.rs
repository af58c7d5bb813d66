//! Bound states of a rasterized potential
//!
//! Eigenstates are found by the shooting method. The end value of a trial wavefunction is
//! sampled across the occupied potential range, the samples are spline interpolated and
//! oversampled, and each sign change brackets one eigenenergy which is located by inverse
//! quadratic interpolation, optionally followed by a second, narrower, interpolation pass.
//!
//! An `EigenSolver` is constructed through the `EigenSolverBuilder` as
//!
//! ```ignore
//! EigenSolverBuilder::new()
//!     .with_grid(&grid)
//!     .with_configuration(&configuration)
//!     .build();
//! ```
//!
//! A sweep which brackets no sign change is a valid empty result, not an error.

mod shooting;

pub use shooting::{FiniteDifferenceKernel, ShootingKernel};

use crate::{
    app::Configuration,
    constants::{ANGSTROM, FIELD_TO_EV_PER_ANGSTROM},
    error::SolverError,
    layers::PositionGrid,
    roots::{inverse_quadratic, oversampled_zeros},
    utilities::arange,
};
use ndarray::Array1;
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq)]
/// A normalised bound state
pub struct EigenState {
    /// Energy in eV
    pub energy: f64,
    /// Wavefunction on the position grid, in 1 / sqrt(m)
    pub psi: Array1<f64>,
}

#[derive(Clone, Debug, Default)]
/// Probability density curves of a set of states, scaled for display
pub struct SpectrumPlot {
    /// Positions of the decimated curves
    pub points: Array1<f64>,
    /// Decimated densities, NaN outside each state's support
    pub curves: Vec<Array1<f64>>,
    /// Full resolution densities without trimming
    pub densities: Vec<Array1<f64>>,
}

#[derive(Clone, Debug, Default)]
/// The bound states of a grid, in order of increasing energy
pub struct Spectrum {
    pub states: Vec<EigenState>,
    pub plot: SpectrumPlot,
}

impl Spectrum {
    pub fn energies(&self) -> Vec<f64> {
        self.states.iter().map(|state| state.energy).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Sets a density curve to NaN before its first point above `threshold` and from its last
///
/// Curves which never exceed the threshold are left untouched.
pub(crate) fn trim_to_support(curve: &mut Array1<f64>, threshold: f64) {
    let first = curve.iter().position(|&value| value > threshold);
    let last = curve.iter().rposition(|&value| value > threshold);
    if let (Some(first), Some(last)) = (first, last) {
        curve
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| *i < first || *i >= last)
            .for_each(|(_, value)| *value = f64::NAN);
    }
}

/// The shooting method eigensolver
pub struct EigenSolver<'a, K> {
    grid: &'a PositionGrid,
    configuration: &'a Configuration,
    kernel: K,
}

/// Builder for an `EigenSolver` from a reference to a grid and a configuration
pub struct EigenSolverBuilder<RefGrid, RefConfiguration, Kernel> {
    grid: RefGrid,
    configuration: RefConfiguration,
    kernel: Kernel,
}

impl Default for EigenSolverBuilder<(), (), FiniteDifferenceKernel> {
    fn default() -> Self {
        Self {
            grid: (),
            configuration: (),
            kernel: FiniteDifferenceKernel,
        }
    }
}

impl EigenSolverBuilder<(), (), FiniteDifferenceKernel> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<RefGrid, RefConfiguration, Kernel> EigenSolverBuilder<RefGrid, RefConfiguration, Kernel> {
    pub fn with_grid<Grid>(
        self,
        grid: &Grid,
    ) -> EigenSolverBuilder<&Grid, RefConfiguration, Kernel> {
        EigenSolverBuilder {
            grid,
            configuration: self.configuration,
            kernel: self.kernel,
        }
    }

    pub fn with_configuration<C>(self, configuration: &C) -> EigenSolverBuilder<RefGrid, &C, Kernel> {
        EigenSolverBuilder {
            grid: self.grid,
            configuration,
            kernel: self.kernel,
        }
    }

    /// Replaces the finite difference recursion with another kernel
    pub fn with_kernel<K: ShootingKernel>(self, kernel: K) -> EigenSolverBuilder<RefGrid, RefConfiguration, K> {
        EigenSolverBuilder {
            grid: self.grid,
            configuration: self.configuration,
            kernel,
        }
    }
}

impl<'a, K: ShootingKernel> EigenSolverBuilder<&'a PositionGrid, &'a Configuration, K> {
    pub fn build(self) -> EigenSolver<'a, K> {
        EigenSolver {
            grid: self.grid,
            configuration: self.configuration,
            kernel: self.kernel,
        }
    }
}

impl<'a, K: ShootingKernel> EigenSolver<'a, K> {
    /// The trial energies of a sweep at resolution `vert_res` in meV
    fn sweep_energies(&self, vert_res: f64) -> Result<Vec<f64>, SolverError> {
        let grid = self.grid;
        let headroom =
            self.configuration.solver.field_headroom * grid.field * FIELD_TO_EV_PER_ANGSTROM;
        let bottom = grid.vc.iter().copied().fold(f64::INFINITY, f64::min);
        let top = grid
            .vc
            .iter()
            .map(|v| v - headroom)
            .fold(f64::NEG_INFINITY, f64::max);
        let step = vert_res / 1000.;
        if !(step > 0.) || !(top > bottom) {
            return Ok(vec![]);
        }
        let points = ((top - bottom) / step).ceil() as usize;
        let budget = self.configuration.solver.maximum_sweep_points;
        if points > budget {
            return Err(SolverError::SweepTooLarge { points, budget });
        }
        Ok(arange(bottom, top, step))
    }

    /// Polishes a root with a second inverse quadratic pass of half width `width`
    fn refine(&self, energy: f64, width: f64) -> f64 {
        let x = [energy - width, energy, energy + width];
        let f = x.map(|e| self.kernel.end_value(self.grid, e));
        inverse_quadratic(x, f)
    }

    /// The normalised wavefunction at `energy`, or `None` if it cannot be normalised
    fn normalised_state(&self, energy: f64) -> Option<EigenState> {
        let grid = self.grid;
        let mut psi = vec![0.; grid.len()];
        self.kernel.wavefunction(grid, energy, &mut psi);
        let weighted: f64 = psi
            .iter()
            .zip(grid.vc.iter().zip(grid.eg.iter()))
            .map(|(p, (vc, eg))| p * p * (1. + (energy - vc) / (energy - vc + eg)))
            .sum();
        let amplitude = 1. / (grid.xres * ANGSTROM * weighted).sqrt();
        if !amplitude.is_finite() {
            tracing::debug!("Discarding state at {energy} eV which cannot be normalised");
            return None;
        }
        Some(EigenState {
            energy,
            psi: Array1::from(psi) * amplitude,
        })
    }

    /// Finds the bound states of the grid at energy resolution `vert_res` in meV
    #[tracing::instrument(name = "Eigen solve", level = "debug", skip(self), fields(cells = self.grid.len()))]
    pub fn solve(&self, vert_res: f64) -> Result<Spectrum, SolverError> {
        let grid = self.grid;
        let solver = &self.configuration.solver;
        let plot = &self.configuration.plot;
        if grid.len() < 3 {
            return Ok(Spectrum::default());
        }

        let energies = self.sweep_energies(vert_res)?;
        if energies.len() < 2 {
            return Ok(Spectrum::default());
        }
        let end_values: Vec<f64> = energies
            .par_iter()
            .map(|&energy| self.kernel.end_value(grid, energy))
            .collect();

        let mut roots = oversampled_zeros(
            &energies,
            &end_values,
            solver.oversampling,
            solver.maximum_brackets,
        )?;
        if solver.refine_roots {
            let width = vert_res / solver.refinement_divisor;
            roots = roots
                .par_iter()
                .map(|&energy| self.refine(energy, width))
                .collect();
        }
        tracing::debug!("Bracketed {} candidate states", roots.len());

        let n = grid.len();
        let end_limit = solver.end_amplitude_limit / grid.xres;
        let min_peak = plot.wf_min_height;
        let states: Vec<EigenState> = roots
            .par_iter()
            .filter_map(|&energy| self.normalised_state(energy))
            .filter(|state| state.psi[n - 2].abs() < end_limit)
            .filter(|state| {
                state
                    .psi
                    .iter()
                    .map(|p| p * p * plot.wf_scale)
                    .fold(f64::NEG_INFINITY, f64::max)
                    > min_peak
            })
            .collect();

        let discarded = roots.len() - states.len();
        if discarded > 0 {
            tracing::debug!("Discarded {discarded} boundary or vanishing states");
        }

        let spectrum_plot = self.plot(&states);
        Ok(Spectrum {
            states,
            plot: spectrum_plot,
        })
    }

    fn plot(&self, states: &[EigenState]) -> SpectrumPlot {
        let grid = self.grid;
        let plot = &self.configuration.plot;
        let stride = ((plot.plot_decimate_factor / grid.xres) as usize).max(1);
        let indices: Vec<usize> = (0..grid.len()).step_by(stride).collect();

        let densities: Vec<Array1<f64>> = states
            .iter()
            .map(|state| state.psi.mapv(|p| p * p * plot.wf_scale))
            .collect();
        let curves = densities
            .iter()
            .map(|density| {
                let mut trimmed = density.clone();
                trim_to_support(&mut trimmed, plot.pretty_plot_factor);
                indices.iter().map(|&i| trimmed[i]).collect()
            })
            .collect();

        SpectrumPlot {
            points: indices.iter().map(|&i| grid.points[i]).collect(),
            curves,
            densities,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{trim_to_support, EigenSolverBuilder};
    use crate::{
        app::Configuration,
        layers::{BandProfile, PositionGrid},
    };
    use ndarray::Array1;

    /// A parabolic band square well of depth `depth` eV and width `width` angstrom, with
    /// `barrier` angstrom of barrier either side
    fn square_well(depth: f64, width: f64, barrier: f64, xres: f64, mass: f64) -> PositionGrid {
        let barrier_cells = (barrier / xres).round() as usize;
        let well_cells = (width / xres).round() as usize;
        let vc: Array1<f64> = (0..2 * barrier_cells + well_cells)
            .map(|i| {
                if i < barrier_cells || i >= barrier_cells + well_cells {
                    depth
                } else {
                    0.
                }
            })
            .collect();
        let band = BandProfile {
            eg: 1e4,
            mc: mass,
            eso: 0.,
            ep: 0.,
            f: 0.5 / mass - 0.5,
        };
        PositionGrid::from_potential(xres, vc, band, depth / 2.)
    }

    /// Roots of the even and odd finite well conditions below `depth`
    fn analytic_levels(depth: f64, width: f64, mass: f64) -> Vec<f64> {
        use crate::constants::{ANGSTROM, ELECTRON_CHARGE, ELECTRON_MASS, HBAR};
        let a = width * ANGSTROM;
        let m = mass * ELECTRON_MASS;
        let condition = |energy: f64, even: bool| {
            let k = (2. * m * energy * ELECTRON_CHARGE).sqrt() / HBAR;
            let kappa = (2. * m * (depth - energy) * ELECTRON_CHARGE).sqrt() / HBAR;
            if even {
                k * (k * a / 2.).sin() - kappa * (k * a / 2.).cos()
            } else {
                k * (k * a / 2.).cos() + kappa * (k * a / 2.).sin()
            }
        };
        let mut levels = vec![];
        for even in [true, false] {
            let steps = 200_000;
            let de = depth / steps as f64;
            let mut previous = condition(de, even);
            for i in 2..steps {
                let energy = i as f64 * de;
                let current = condition(energy, even);
                if previous.signum() != current.signum() {
                    let mut lo = energy - de;
                    let mut hi = energy;
                    for _ in 0..60 {
                        let mid = 0.5 * (lo + hi);
                        if condition(mid, even).signum() == condition(lo, even).signum() {
                            lo = mid;
                        } else {
                            hi = mid;
                        }
                    }
                    levels.push(0.5 * (lo + hi));
                }
                previous = current;
            }
        }
        levels.sort_by(|a, b| a.partial_cmp(b).unwrap());
        levels
    }

    #[test]
    fn finite_square_well_matches_the_analytic_levels() {
        let (depth, width, mass) = (0.3, 60., 0.067);
        let grid = square_well(depth, width, 30., 0.25, mass);
        let configuration = Configuration::default();
        let solver = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build();
        let spectrum = solver.solve(0.5).unwrap();
        let solved: Vec<f64> = spectrum.energies().into_iter().filter(|&e| e < 0.2).collect();
        let expected: Vec<f64> = analytic_levels(depth, width, mass)
            .into_iter()
            .filter(|&e| e < 0.2)
            .collect();

        assert!(!expected.is_empty());
        assert_eq!(solved.len(), expected.len(), "{solved:?} != {expected:?}");
        for (solved, expected) in solved.iter().zip(expected.iter()) {
            // Within the sweep resolution plus the finite difference error
            assert!(
                (solved - expected).abs() < 2e-3,
                "solved {solved} analytic {expected}"
            );
        }
    }

    #[test]
    fn repeated_solves_are_bitwise_identical() {
        let grid = square_well(0.3, 60., 30., 0.25, 0.067);
        let configuration = Configuration::default();
        let solver = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build();
        let first = solver.solve(0.5).unwrap();
        let second = solver.solve(0.5).unwrap();
        assert_eq!(first.states, second.states);
        assert_eq!(first.energies().len(), first.plot.curves.len());
    }

    #[test]
    fn flat_potentials_have_no_bound_states() {
        let grid = square_well(0., 60., 30., 0.25, 0.067);
        let configuration = Configuration::default();
        let spectrum = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build()
            .solve(0.5)
            .unwrap();
        assert!(spectrum.is_empty());
    }

    #[test]
    fn oversized_sweeps_are_rejected() {
        let grid = square_well(0.3, 60., 30., 0.25, 0.067);
        let mut configuration = Configuration::default();
        configuration.solver.maximum_sweep_points = 10;
        let result = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build()
            .solve(0.5);
        assert!(result.is_err());
    }

    #[test]
    fn trimming_keeps_the_support() {
        let mut curve = Array1::from(vec![0., 0.1, 2., 3., 2., 0.1, 0.]);
        trim_to_support(&mut curve, 1.);
        assert!(curve[1].is_nan());
        assert_eq!(curve[2], 2.);
        assert_eq!(curve[3], 3.);
        assert!(curve[4].is_nan());
        let mut flat = Array1::from(vec![0.; 4]);
        trim_to_support(&mut flat, 1.);
        assert!(flat.iter().all(|v| *v == 0.));
    }
}
