//! The shooting kernel
//!
//! The effective mass Schrodinger equation with a position and energy dependent mass is
//! discretised as
//!
//! psi[q + 1] = m[q] ((2 (dx / hbar)^2 (V[q] - E) e + 1 / m[q] + 1 / m[q - 1]) psi[q] - psi[q - 1] / m[q - 1])
//!
//! where `m` is the nonparabolic mass averaged between neighbouring cells. Starting from
//! `psi = (0, 1)` at the left boundary an eigenenergy is an energy at which the recursion
//! lands on zero at the right boundary.

use crate::{
    constants::{ANGSTROM, ELECTRON_CHARGE, ELECTRON_MASS, HBAR},
    layers::{nonparabolic_mass, PositionGrid},
};

/// Propagation of a trial wavefunction across a position grid
///
/// Kernels are evaluated concurrently for many trial energies, and so must be shareable
/// between threads.
pub trait ShootingKernel: Sync {
    /// The amplitude at the right boundary of the wavefunction launched at `energy`
    fn end_value(&self, grid: &PositionGrid, energy: f64) -> f64;

    /// Writes the unnormalised wavefunction launched at `energy` into `psi`
    fn wavefunction(&self, grid: &PositionGrid, energy: f64, psi: &mut [f64]);
}

#[derive(Clone, Copy, Debug, Default)]
/// The three term finite difference recursion
pub struct FiniteDifferenceKernel;

impl FiniteDifferenceKernel {
    /// Runs the recursion, handing each amplitude to `visit` and returning the last
    fn propagate(grid: &PositionGrid, energy: f64, mut visit: impl FnMut(usize, f64)) -> f64 {
        let n = grid.len();
        if n < 2 {
            (0..n).for_each(|q| visit(q, 0.));
            return 0.;
        }
        let raw_mass = |q: usize| {
            ELECTRON_MASS
                * nonparabolic_mass(
                    energy - grid.vc[q],
                    grid.eg[q],
                    grid.eso[q],
                    grid.ep[q],
                    grid.f[q],
                )
        };
        // The mass of the last cell is not averaged
        let averaged_mass = |q: usize| {
            if q + 1 < n {
                0.5 * (raw_mass(q) + raw_mass(q + 1))
            } else {
                raw_mass(q)
            }
        };
        let kinetic = 2. * (grid.xres * ANGSTROM / HBAR).powi(2) * ELECTRON_CHARGE;

        let (mut previous, mut current) = (0., 1.);
        visit(0, previous);
        visit(1, current);
        let mut mass_previous = averaged_mass(0);
        for q in 1..n - 1 {
            let mass = averaged_mass(q);
            let next = mass
                * ((kinetic * (grid.vc[q] - energy) + 1. / mass + 1. / mass_previous) * current
                    - previous / mass_previous);
            visit(q + 1, next);
            previous = current;
            current = next;
            mass_previous = mass;
        }
        current
    }
}

impl ShootingKernel for FiniteDifferenceKernel {
    fn end_value(&self, grid: &PositionGrid, energy: f64) -> f64 {
        Self::propagate(grid, energy, |_, _| {})
    }

    fn wavefunction(&self, grid: &PositionGrid, energy: f64, psi: &mut [f64]) {
        Self::propagate(grid, energy, |q, value| psi[q] = value);
    }
}

#[cfg(test)]
mod test {
    use super::{FiniteDifferenceKernel, ShootingKernel};
    use crate::layers::{BandProfile, PositionGrid};
    use approx::assert_relative_eq;
    use ndarray::Array1;

    fn flat_grid(n: usize) -> PositionGrid {
        let band = BandProfile {
            eg: 10.,
            mc: 0.067,
            eso: 0.,
            ep: 0.,
            f: -0.5 + 0.5 / 0.067,
        };
        PositionGrid::from_potential(0.5, Array1::zeros(n), band, 1.)
    }

    #[test]
    fn end_value_matches_the_last_amplitude() {
        let grid = flat_grid(64);
        let kernel = FiniteDifferenceKernel;
        let mut psi = vec![0.; grid.len()];
        kernel.wavefunction(&grid, 0.05, &mut psi);
        assert_relative_eq!(kernel.end_value(&grid, 0.05), psi[grid.len() - 1]);
        assert_relative_eq!(psi[0], 0.);
        assert_relative_eq!(psi[1], 1.);
    }

    #[test]
    fn below_a_flat_band_the_wavefunction_grows() {
        let grid = flat_grid(64);
        let mut psi = vec![0.; grid.len()];
        FiniteDifferenceKernel.wavefunction(&grid, -0.1, &mut psi);
        assert!(psi.windows(2).skip(1).all(|pair| pair[1] > pair[0]));
    }
}
