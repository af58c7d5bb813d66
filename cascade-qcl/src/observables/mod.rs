//! Observables of a set of bound states
//!
//! Every calculation here is a pure function of the grid, the band structure and the states
//! it is handed. Non-physical requests, such as scattering to a state too close in energy to
//! emit a phonon, return `FORBIDDEN_RATE` rather than an error so that whole transition
//! matrices can be tabulated without special casing.

use crate::{
    alloy::BandStructure,
    app::PlotConfiguration,
    basis::BasisSolution,
    constants::{
        ANGSTROM, ELECTRON_CHARGE, ELECTRON_MASS, EPSILON_0, FORBIDDEN_RATE, HBAR, MEV, PLANCK,
        SPEED_OF_LIGHT,
    },
    eigen::EigenState,
    layers::PositionGrid,
};
use itertools::Itertools;
use ndarray::{s, Array1, ArrayView1, Zip};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Interface roughness height-correlation product used by the broadening estimate, in m^2
const ROUGHNESS_PRODUCT: f64 = 0.76e-18;

/// Effective refractive index assumed by the absorption estimate
const ABSORPTION_INDEX: f64 = 3.;

/// Dipoles smaller than this, in angstrom, do not contribute to absorption
const DIPOLE_CUTOFF: f64 = 1e-6;

/// Calculator for the observables of `states` on `grid`
pub struct Observables<'a> {
    grid: &'a PositionGrid,
    bands: &'a BandStructure,
    states: &'a [EigenState],
    plot: &'a PlotConfiguration,
    /// Layer dopings in 1e17 cm^-3, indexed as `grid.layer_widths`
    dopings: Vec<f64>,
}

impl<'a> Observables<'a> {
    pub fn new(
        grid: &'a PositionGrid,
        bands: &'a BandStructure,
        states: &'a [EigenState],
        plot: &'a PlotConfiguration,
        dopings: Vec<f64>,
    ) -> Self {
        Self {
            grid,
            bands,
            states,
            plot,
            dopings,
        }
    }

    /// The local effective mass at `energy` in units of the free electron mass
    pub fn eff_mass(&self, energy: f64) -> Array1<f64> {
        self.grid.effective_mass(energy)
    }

    /// Orders a pair of state indices so the higher index comes first
    fn ordered(&self, upper: usize, lower: usize) -> (&EigenState, &EigenState) {
        if upper < lower {
            (&self.states[lower], &self.states[upper])
        } else {
            (&self.states[upper], &self.states[lower])
        }
    }

    /// The transition dipole between two states in angstrom
    ///
    /// Symmetric in its arguments and zero for degenerate pairs.
    pub fn dipole(&self, upper: usize, lower: usize) -> f64 {
        let (i, j) = self.ordered(upper, lower);
        let gap = i.energy - j.energy;
        if gap == 0. {
            return 0.;
        }
        let mass_i = self.eff_mass(i.energy);
        let mass_j = self.eff_mass(j.energy);

        let n = self.grid.len();
        let z: f64 = (0..n.saturating_sub(1))
            .map(|k| {
                let psi_i = 0.5 * (i.psi[k] + i.psi[k + 1]);
                let inverse_mass_j = 2. / (mass_j[k] + mass_j[k + 1]);
                psi_i * (j.psi[k + 1] / mass_i[k + 1] - j.psi[k] / mass_i[k])
                    + inverse_mass_j * psi_i * (j.psi[k + 1] - j.psi[k])
            })
            .sum();
        z * HBAR.powi(2) / (2. * gap * ELECTRON_CHARGE * ELECTRON_MASS) / ANGSTROM
    }

    /// The probability weighted effective mass of `state` in kg over `range`
    fn mean_mass(&self, state: &EigenState, support: std::ops::Range<usize>) -> f64 {
        let mass = self.eff_mass(state.energy);
        let psi = state.psi.slice(s![support.clone()]);
        let density: f64 = psi.iter().map(|p| p * p).sum();
        let weighted: f64 = Zip::from(&psi)
            .and(&mass.slice(s![support]))
            .fold(0., |acc, p, m| acc + m * p * p);
        ELECTRON_MASS * weighted / density
    }

    /// Indices of the first and last points where `|psi|` exceeds the overlap threshold
    ///
    /// Compared as `psi^2 > threshold^2` so the support of a state does not depend on its
    /// overall sign or on the sign of its outermost lobes.
    fn support(&self, psi: ArrayView1<f64>) -> Option<(usize, usize)> {
        let threshold = self.plot.phonon_integral_factor;
        let limit = threshold * threshold;
        let first = psi.iter().position(|&p| p * p > limit)?;
        let last = psi.iter().rposition(|&p| p * p > limit)?;
        Some((first, last))
    }

    /// The longitudinal optical phonon emission rate from `upper` to `lower` in 1 / ps
    pub fn lo_transition_rate(&self, upper: usize, lower: usize) -> f64 {
        let (i, j) = self.ordered(upper, lower);
        let hw_lo = self.bands.hw_lo[0];
        let excess = i.energy - j.energy - hw_lo;
        if excess < 0. {
            return FORBIDDEN_RATE;
        }

        let (support_i, support_j) = match (self.support(i.psi.view()), self.support(j.psi.view()))
        {
            (Some(a), Some(b)) => (a, b),
            _ => return FORBIDDEN_RATE,
        };
        // Disjoint supports cannot overlap
        if support_i.1 < support_j.0 || support_j.1 < support_i.0 {
            return FORBIDDEN_RATE;
        }
        let range = support_i.0.min(support_j.0)..support_i.1.max(support_j.1);
        if range.is_empty() {
            return FORBIDDEN_RATE;
        }

        let mass_i = self.mean_mass(i, range.clone());
        let mass_j = self.mean_mass(j, range.clone());
        let kl = (2. * mass_j / HBAR.powi(2) * excess * ELECTRON_CHARGE).sqrt();

        let x: Vec<f64> = self.grid.points.slice(s![range.clone()]).to_vec();
        let product: Vec<f64> = i
            .psi
            .slice(s![range.clone()])
            .iter()
            .zip(j.psi.slice(s![range]).iter())
            .map(|(a, b)| a * b)
            .collect();
        let cell = (self.grid.xres * ANGSTROM).powi(2);
        let overlap: f64 = product
            .par_iter()
            .zip(x.par_iter())
            .map(|(&outer, &x_outer)| {
                product
                    .iter()
                    .zip(x.iter())
                    .map(|(&inner, &x_inner)| {
                        inner * (-kl * (x_outer - x_inner).abs() * ANGSTROM).exp()
                    })
                    .sum::<f64>()
                    * outer
                    * cell
            })
            .sum();

        let inverse_tau = (mass_j * mass_i).sqrt() * ELECTRON_CHARGE.powi(2) * hw_lo
            * ELECTRON_CHARGE
            / HBAR
            * overlap
            / (4. * HBAR.powi(2) * self.bands.epsrho[0] * EPSILON_0 * kl);
        let rate = inverse_tau / 1e12;
        if rate.is_finite() {
            rate
        } else {
            FORBIDDEN_RATE
        }
    }

    /// The LO phonon limited lifetime of `state` in ps, infinite for the ground state
    pub fn lo_life_time(&self, state: usize) -> f64 {
        let total: f64 = (0..state)
            .into_par_iter()
            .map(|q| self.lo_transition_rate(state, q))
            .sum();
        1. / total
    }

    /// The interface roughness broadening between two states in meV
    pub fn broadening_energy(&self, upper: usize, lower: usize) -> f64 {
        let (i, j) = self.ordered(upper, lower);
        // Interfaces are the cells where the barrier flag changes
        let overlap: f64 = self
            .grid
            .barriers
            .iter()
            .tuple_windows()
            .enumerate()
            .filter(|(_, (left, right))| left != right)
            .map(|(k, _)| (i.psi[k].powi(2) - j.psi[k].powi(2)).powi(2))
            .sum();
        let offset = self.bands.ec_gamma[1] - self.bands.ec_gamma[0];
        PI * self.bands.me[0] * ELECTRON_MASS * ELECTRON_CHARGE.powi(2) / HBAR.powi(2)
            * ROUGHNESS_PRODUCT.powi(2)
            * offset.powi(2)
            * overlap
            / (MEV * ELECTRON_CHARGE)
    }

    /// The intersubband absorption in 1 / cm at the photon energy separating `state_r` and
    /// `lower`, summed over every transition out of `state_r`
    pub fn alpha_isb(&self, state_r: usize, lower: usize) -> f64 {
        let e_r = self.states[state_r].energy;
        let transitions: Vec<(f64, f64, f64)> = (state_r + 1..self.states.len())
            .filter_map(|q| {
                let dipole = self.dipole(q, state_r);
                (dipole.abs() > DIPOLE_CUTOFF).then(|| {
                    let gamma = self.broadening_energy(q, state_r) / 2. / 1000.;
                    let energy = (self.states[q].energy - e_r).abs();
                    (energy, dipole * ANGSTROM, gamma)
                })
            })
            .collect();

        let widths = self.grid.layer_widths.iter().skip(1);
        let period = widths.clone().sum::<f64>() * ANGSTROM;
        if period == 0. {
            return FORBIDDEN_RATE;
        }
        let sheet_density: f64 = widths
            .zip(self.dopings.iter().skip(1))
            .map(|(width, doping)| doping * 1e17 * width * 1e-8)
            .sum::<f64>()
            * 1e4;
        let photon = e_r - self.states[lower].energy;

        let lineshape: f64 = transitions
            .iter()
            .map(|(energy, dipole, gamma)| {
                energy * ELECTRON_CHARGE / PLANCK / SPEED_OF_LIGHT * dipole.powi(2) * gamma
                    / ((energy - photon).powi(2) + gamma.powi(2))
            })
            .sum();
        let alpha = lineshape * 4. * PI * ELECTRON_CHARGE.powi(2)
            / (EPSILON_0 * ABSORPTION_INDEX)
            * PI
            / (2. * period)
            * sheet_density
            / (ELECTRON_CHARGE * 100.);
        if alpha.is_finite() {
            alpha
        } else {
            FORBIDDEN_RATE
        }
    }

    /// The first order coupling energy in eV between two states of adjacent modules
    ///
    /// `states` must be the recombined basis states of `basis` placed on this grid, with
    /// `module_ids` giving the module of each. States in the same or non-adjacent modules do
    /// not couple.
    pub fn coupling_energy(
        &self,
        basis: &BasisSolution,
        module_ids: &[usize],
        upper: usize,
        lower: usize,
    ) -> f64 {
        let (first, second) = if module_ids[upper] > module_ids[lower] {
            (lower, upper)
        } else {
            (upper, lower)
        };
        let (module_i, module_j) = (module_ids[first], module_ids[second]);
        if module_j != module_i + 1 {
            return 0.;
        }
        let (psi_i, state_j) = (&self.states[first].psi, &self.states[second]);

        let grid = self.grid;
        let n = grid.len();
        let template = basis.template_of(module_i);
        let head = (basis.head_padding / grid.xres) as usize;
        let barriers = template.grid.barriers.get(head..).unwrap_or(&[]);
        let begin = (basis.instances[module_i].width_offset / grid.xres).round() as usize;
        let end = begin + barriers.len();

        // The perturbation is the potential missing from the wells of the lower module
        let mut perturbation = Array1::<f64>::zeros(n);
        for (k, &barrier) in barriers.iter().enumerate() {
            if begin + k < n {
                perturbation[begin + k] = if barrier { 0. } else { 1. };
            }
        }
        let material = grid.materials[(end + 1).min(n - 1)];
        let offset = if material > 0 {
            self.bands.ec_gamma[2 * material - 1] - self.bands.ec_gamma[2 * (material - 1)]
        } else {
            0.
        };
        perturbation *= offset / MEV;

        Zip::from(psi_i)
            .and(&perturbation)
            .and(&state_j.psi)
            .fold(0., |acc, a, dv, b| acc + a * (dv + state_j.energy) * b)
            * grid.xres
            * ANGSTROM
    }
}

#[cfg(test)]
mod test {
    use super::Observables;
    use crate::{
        alloy::Substrate,
        app::Configuration,
        basis::BasisPartitioner,
        constants::FORBIDDEN_RATE,
        device::info_desk::MaterialTable,
        eigen::EigenSolverBuilder,
        layers::{Layer, QclLayers},
    };
    use approx::assert_relative_eq;

    fn coupled_wells() -> QclLayers {
        QclLayers::new(
            vec![
                Layer::barrier(50., 1),
                Layer::well(70., 1).active().with_doping(1.),
                Layer::barrier(15., 1).active(),
                Layer::well(35., 1).active(),
                Layer::barrier(50., 1),
            ],
            Substrate::InP,
        )
        .with_xres(0.5)
        .with_vert_res(0.5)
        .with_repeats(1)
    }

    #[test]
    fn dipoles_are_symmetric_and_vanish_on_the_diagonal() {
        let table = MaterialTable::default();
        let configuration = Configuration::default();
        let layers = coupled_wells();
        let bands = layers.band_structure(&table).unwrap();
        let grid = layers.rasterize(&bands).unwrap();
        let spectrum = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build()
            .solve(layers.vert_res)
            .unwrap();
        assert!(spectrum.len() >= 2);

        let dopings = layers.layers.iter().map(|layer| layer.doping).collect();
        let observables = Observables::new(
            &grid,
            &bands,
            &spectrum.states,
            &configuration.plot,
            dopings,
        );
        assert_eq!(observables.dipole(0, 0), 0.);
        let forward = observables.dipole(1, 0);
        assert_relative_eq!(forward, observables.dipole(0, 1));
        assert!(forward.abs() > 1e-3);

        // The ground state has nowhere to relax to
        assert!(observables.lo_life_time(0).is_infinite());
        let rate = observables.lo_transition_rate(1, 0);
        assert!(rate > 0.);
        assert_relative_eq!(rate, observables.lo_transition_rate(0, 1));

        assert!(observables.broadening_energy(1, 0) >= 0.);
        assert!(observables.alpha_isb(0, 1).is_finite());
    }

    #[test]
    fn observables_do_not_depend_on_the_sign_of_a_wavefunction() {
        let table = MaterialTable::default();
        let configuration = Configuration::default();
        let layers = coupled_wells();
        let bands = layers.band_structure(&table).unwrap();
        let grid = layers.rasterize(&bands).unwrap();
        let spectrum = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build()
            .solve(layers.vert_res)
            .unwrap();
        let n = spectrum.len();
        assert!(n >= 3);

        // Excited states carry lobes of both signs above the overlap threshold
        let threshold = configuration.plot.phonon_integral_factor;
        assert!(spectrum.states[1..]
            .iter()
            .any(|state| state.psi.iter().any(|&p| p < -threshold)
                && state.psi.iter().any(|&p| p > threshold)));

        let mut negated_states = spectrum.states.clone();
        negated_states
            .iter_mut().for_each(|state| state.psi.mapv_inplace(|p| -p));
        let mut alternating_states = spectrum.states.clone();
        alternating_states
            .iter_mut()
            .step_by(2)
            .for_each(|state| state.psi.mapv_inplace(|p| -p));

        let dopings: Vec<f64> = layers.layers.iter().map(|layer| layer.doping).collect();
        let reference = Observables::new(
            &grid,
            &bands,
            &spectrum.states,
            &configuration.plot,
            dopings.clone(),
        );
        let negated = Observables::new(
            &grid,
            &bands,
            &negated_states,
            &configuration.plot,
            dopings.clone(),
        );
        let alternating = Observables::new(
            &grid,
            &bands,
            &alternating_states,
            &configuration.plot,
            dopings,
        );

        for upper in 1..n {
            for lower in 0..upper {
                let rate = reference.lo_transition_rate(upper, lower);
                for flipped in [&negated, &alternating] {
                    assert_relative_eq!(
                        rate,
                        flipped.lo_transition_rate(upper, lower),
                        max_relative = 1e-10
                    );
                    assert_relative_eq!(
                        reference.broadening_energy(upper, lower),
                        flipped.broadening_energy(upper, lower),
                        max_relative = 1e-10
                    );
                    assert_relative_eq!(
                        reference.dipole(upper, lower).abs(),
                        flipped.dipole(upper, lower).abs(),
                        max_relative = 1e-10
                    );
                }
                assert_relative_eq!(
                    reference.dipole(upper, lower),
                    negated.dipole(upper, lower),
                    max_relative = 1e-10
                );
            }
            assert_relative_eq!(
                reference.lo_life_time(upper),
                alternating.lo_life_time(upper),
                max_relative = 1e-10
            );
        }
        for state in 0..n - 1 {
            assert_relative_eq!(
                reference.alpha_isb(state, 0),
                alternating.alpha_isb(state, 0),
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn states_closer_than_a_phonon_do_not_scatter() {
        let table = MaterialTable::default();
        let configuration = Configuration::default();
        let layers = coupled_wells();
        let bands = layers.band_structure(&table).unwrap();
        let grid = layers.rasterize(&bands).unwrap();
        let mut spectrum = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build()
            .solve(layers.vert_res)
            .unwrap();
        // Move the second state to just above the first
        spectrum.states[1].energy = spectrum.states[0].energy + 0.5 * bands.hw_lo[0];
        let observables =
            Observables::new(&grid, &bands, &spectrum.states, &configuration.plot, vec![]);
        assert_eq!(observables.lo_transition_rate(1, 0), FORBIDDEN_RATE);
    }

    #[test]
    fn only_adjacent_modules_couple() {
        let table = MaterialTable::default();
        let configuration = Configuration::default();
        let layers = QclLayers::new(
            vec![
                Layer::barrier(40., 1),
                Layer::well(50., 1).active(),
                Layer::barrier(40., 1),
                Layer::well(45., 1),
                Layer::barrier(40., 1),
            ],
            Substrate::InP,
        )
        .with_xres(0.5)
        .with_vert_res(1.)
        .with_repeats(3);
        let bands = layers.band_structure(&table).unwrap();
        let grid = layers.rasterize(&bands).unwrap();
        let partitioner = BasisPartitioner::new(&configuration);
        let solution = partitioner.solve(&layers, &bands).unwrap();
        let basis = partitioner.recombine(&solution, &grid);
        let observables =
            Observables::new(&grid, &bands, &basis.states, &configuration.plot, vec![]);

        let n = basis.states.len();
        for a in 0..n {
            for b in 0..n {
                let (ma, mb) = (basis.module_ids[a], basis.module_ids[b]);
                if ma.abs_diff(mb) != 1 {
                    assert_eq!(
                        observables.coupling_energy(&solution, &basis.module_ids, a, b),
                        0.
                    );
                }
            }
        }
    }
}
