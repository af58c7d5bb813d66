//! Optical mode solver
//!
//! A waveguide is a stack of planar strata, one of which is usually the quantum cascade core.
//! The fundamental guided mode is located by scanning the real part of the propagation
//! constant for zeros of the imaginary part of the dispersion function, using the same
//! bracket and refine machinery as the electronic eigen solver. The complex root is then
//! polished by a pattern search over the complex plane and the mode profile reconstructed by
//! back propagation through the strata.

mod index;
mod performance;
mod transfer;

pub use index::{IndexModel, StrataMaterial};
pub use performance::{reflectivity, Facets, LaserParameters, Performance, PERFECT_AR};

use crate::{
    alloy::BandStructure,
    app::ModeConfiguration,
    device::info_desk::MaterialProvider,
    error::{ConfigurationError, ModeSolverError},
    layers::QclLayers,
    roots::oversampled_zeros,
    utilities::arange,
};
use cascade_mesher::{cells_in_width, create_line_segment_mesh_1d_from_regions, Mesh1d};
use nalgebra::Vector1;
use ndarray::Array1;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Deserialize;
use transfer::TransferStack;

/// A single planar layer of a waveguide
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Stratum {
    pub material: StrataMaterial,
    /// Indium fraction of ternary claddings
    #[serde(default)]
    pub composition: f64,
    /// Thickness in micron
    pub thickness: f64,
    /// Doping in 1e17 cm^-3
    #[serde(default)]
    pub doping: f64,
}

impl Stratum {
    pub fn new(material: StrataMaterial, thickness: f64) -> Self {
        Self {
            material,
            composition: 0.,
            thickness,
            doping: 0.,
        }
    }

    pub fn with_composition(mut self, composition: f64) -> Self {
        self.composition = composition;
        self
    }

    pub fn with_doping(mut self, doping: f64) -> Self {
        self.doping = doping;
        self
    }
}

fn default_wavelength() -> f64 {
    4.7
}

fn default_xres() -> f64 {
    0.01
}

/// A planar waveguide and the laser built from it
#[derive(Clone, Debug, Deserialize)]
pub struct Waveguide {
    pub strata: Vec<Stratum>,
    /// Free space wavelength in micron
    #[serde(default = "default_wavelength")]
    pub wavelength: f64,
    /// Grid spacing in micron
    #[serde(default = "default_xres")]
    pub xres: f64,
    /// Real index of the active core, derived from the layer stack when absent
    #[serde(default)]
    pub core_index: Option<f64>,
    /// Absorption of the active core in 1 / cm
    #[serde(default)]
    pub a_core: f64,
    #[serde(default)]
    pub laser: LaserParameters,
}

impl Waveguide {
    pub fn new(strata: Vec<Stratum>, wavelength: f64) -> Self {
        Self {
            strata,
            wavelength,
            xres: default_xres(),
            core_index: None,
            a_core: 0.,
            laser: LaserParameters::default(),
        }
    }

    pub fn with_core_index(mut self, core_index: f64) -> Self {
        self.core_index = Some(core_index);
        self
    }

    pub fn with_xres(mut self, xres: f64) -> Self {
        self.xres = xres;
        self
    }

    pub fn active_core_count(&self) -> usize {
        self.strata
            .iter()
            .filter(|stratum| stratum.material == StrataMaterial::ActiveCore)
            .count()
    }

    /// The complex index of the active core
    ///
    /// An explicit `core_index` takes precedence, otherwise the index is averaged over the
    /// materials of `layers`.
    pub fn core<P: MaterialProvider>(
        &self,
        provider: &P,
        layers: &QclLayers,
        bands: &BandStructure,
    ) -> Result<Complex64, ConfigurationError> {
        let model = IndexModel::new(provider, self.wavelength);
        match self.core_index {
            Some(n) => Ok(Complex64::new(n, index::extinction(self.a_core, self.wavelength))),
            None => {
                let summary = layers.strain_summary(bands);
                model.core_index(&layers.mole_fractions, &summary.material_width, self.a_core)
            }
        }
    }

    /// The complex index of every stratum, with `core` used for the active core
    pub fn indices<P: MaterialProvider>(
        &self,
        provider: &P,
        core: Complex64,
    ) -> Result<Vec<Complex64>, ConfigurationError> {
        let model = IndexModel::new(provider, self.wavelength);
        self.strata
            .iter()
            .map(|stratum| {
                let name = stratum.material.to_string();
                let doping = if provider.is_dopable(&name) {
                    stratum.doping
                } else {
                    0.
                };
                let composition = if provider.needs_composition(&name) {
                    stratum.composition
                } else {
                    0.
                };
                model.index(stratum.material, composition, doping, core)
            })
            .collect()
    }

    /// Expands the strata onto a uniform grid
    pub fn rasterize(&self, indices: &[Complex64]) -> StrataGrid {
        let cells: Vec<usize> = self
            .strata
            .iter()
            .map(|stratum| cells_in_width(stratum.thickness, self.xres))
            .collect();
        let mesh: Mesh1d<f64> =
            create_line_segment_mesh_1d_from_regions(self.xres, &cells, &Vector1::new(0.));
        let regions: Vec<usize> = mesh.assignments().iter().map(|a| a.region).collect();

        StrataGrid {
            xres: self.xres,
            points: mesh.positions().collect(),
            index: regions.iter().map(|&r| indices[r]).collect(),
            active_core: regions
                .iter()
                .map(|&r| {
                    if self.strata[r].material == StrataMaterial::ActiveCore {
                        1.
                    } else {
                        0.
                    }
                })
                .collect(),
            thicknesses: cells.iter().map(|&c| c as f64 * self.xres).collect(),
            cells,
        }
    }
}

/// Per-cell description of a waveguide
#[derive(Clone, Debug)]
pub struct StrataGrid {
    /// Grid spacing in micron
    pub xres: f64,
    pub points: Array1<f64>,
    pub index: Array1<Complex64>,
    /// One inside the active core, zero elsewhere
    pub active_core: Array1<f64>,
    /// Number of cells of each stratum
    pub cells: Vec<usize>,
    /// Stratum thicknesses rounded onto the grid
    pub thicknesses: Vec<f64>,
}

/// A guided optical mode
#[derive(Clone, Debug)]
pub struct Mode {
    /// Complex effective index
    pub beta: Complex64,
    /// Intensity normalised to its peak
    pub intensity: Array1<f64>,
    /// Fraction of the intensity inside the active core
    pub confinement: f64,
}

/// Locates the guided mode of a waveguide
pub struct ModeSolver<'a> {
    waveguide: &'a Waveguide,
    configuration: &'a ModeConfiguration,
    indices: Vec<Complex64>,
    grid: StrataGrid,
}

impl<'a> ModeSolver<'a> {
    pub fn new(
        waveguide: &'a Waveguide,
        indices: Vec<Complex64>,
        configuration: &'a ModeConfiguration,
    ) -> Self {
        let grid = waveguide.rasterize(&indices);
        Self {
            waveguide,
            configuration,
            indices,
            grid,
        }
    }

    pub fn grid(&self) -> &StrataGrid {
        &self.grid
    }

    fn stack(&self) -> TransferStack<'_> {
        TransferStack::new(&self.indices, &self.grid.thicknesses, self.waveguide.wavelength)
    }

    /// The dispersion function of the waveguide at `beta`
    pub fn chi(&self, beta: Complex64) -> Complex64 {
        self.stack().chi(beta)
    }

    /// An initial estimate of the propagation constant
    ///
    /// The highest zero of `Im chi` between the extremal real indices, with the smallest
    /// imaginary index of the stack as imaginary part.
    fn scan(&self) -> Result<Complex64, ModeSolverError> {
        let configuration = self.configuration;
        let (lowest, highest) = self
            .indices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
                (lo.min(n.re), hi.max(n.re))
            });
        let betas = arange(lowest + configuration.scan_step, highest, configuration.scan_step);
        if betas.len() < 2 {
            return Err(ModeSolverError::NoGuidedMode);
        }
        let stack = self.stack();
        let chi: Vec<f64> = betas
            .par_iter()
            .map(|&beta| stack.chi(Complex64::new(beta, 0.)).im)
            .collect();
        let zeros = oversampled_zeros(
            &betas,
            &chi,
            configuration.oversampling,
            configuration.maximum_brackets,
        )?;
        let real = zeros
            .into_iter()
            .reduce(f64::max)
            .ok_or(ModeSolverError::NoGuidedMode)?;
        let imaginary = self
            .indices
            .iter()
            .map(|n| n.im)
            .fold(f64::INFINITY, f64::min);
        tracing::debug!("Guided mode bracketed at effective index {real}");
        Ok(Complex64::new(real, imaginary))
    }

    /// Polishes `beta` by a pattern search over its eight complex neighbours
    pub fn refine(&self, mut beta: Complex64) -> Result<Complex64, ModeSolverError> {
        let configuration = self.configuration;
        let r = Complex64::new(configuration.real_increment, 0.);
        let i = Complex64::new(0., configuration.imaginary_increment);
        let stack = self.stack();
        let mut smallest = 1.;
        for iteration in 0..configuration.maximum_iterations {
            let candidates = [
                beta,
                beta + r,
                beta - r,
                beta + i,
                beta - i,
                beta + r + i,
                beta - r - i,
                beta + r - i,
                beta - r + i,
            ];
            let (best, value) = candidates
                .iter()
                .map(|&candidate| (candidate, stack.chi(candidate).norm()))
                .fold((beta, f64::INFINITY), |best, next| {
                    if next.1 < best.1 {
                        next
                    } else {
                        best
                    }
                });
            let previous = smallest;
            smallest = value;
            beta = best;
            if (previous - smallest).abs() / previous < configuration.precision {
                tracing::trace!("Propagation constant converged after {iteration} steps");
                return Ok(beta);
            }
        }
        Err(ModeSolverError::RefinementBudgetExceeded(
            configuration.maximum_iterations,
        ))
    }

    /// The complex propagation constant of the guided mode
    #[tracing::instrument(name = "Mode solve", level = "info", skip(self))]
    pub fn beta_find(&self) -> Result<Complex64, ModeSolverError> {
        let estimate = self.scan()?;
        self.refine(estimate)
    }

    /// The intensity profile and confinement factor of the mode `beta`
    pub fn mode(&self, beta: Complex64) -> Mode {
        let intensity =
            Array1::from(self.stack().intensity(beta, &self.grid.cells, self.grid.xres));
        let confinement = (&intensity * &self.grid.active_core).sum() / intensity.sum();
        Mode {
            beta,
            intensity,
            confinement,
        }
    }

    pub fn solve(&self) -> Result<Mode, ModeSolverError> {
        let beta = self.beta_find()?;
        Ok(self.mode(beta))
    }
}
