//! Closed form laser performance estimates from a solved mode

use super::{Mode, StrataGrid, Waveguide};
use crate::{
    constants::{ELECTRON_CHARGE, EPSILON_0, PLANCK, SPEED_OF_LIGHT},
    error::{ConfigurationError, ModeSolverError},
    roots::NaturalCubicSpline,
    utilities::{arange, linspace},
};
use num_complex::Complex64;
use serde::Deserialize;
use std::f64::consts::PI;

/// Reflectivity standing in for a perfect anti-reflection coating
pub const PERFECT_AR: f64 = 1e-9;

/// The reflectivity of an uncoated facet for a mode of effective index `beta`
pub fn reflectivity(beta: Complex64) -> f64 {
    ((beta.re - 1.) / (beta.re + 1.)).powi(2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
/// Front and back facet treatments of a laser cavity
pub enum Facets {
    #[serde(rename = "as-cleaved + as-cleaved")]
    AsCleaved,
    #[serde(rename = "as-cleaved + perfect HR")]
    AsCleavedPerfectHr,
    #[serde(rename = "as-cleaved + perfect AR")]
    AsCleavedPerfectAr,
    #[serde(rename = "perfect AR + perfect HR")]
    PerfectArPerfectHr,
    #[serde(rename = "custom coating + as-cleaved")]
    CustomAsCleaved,
    #[serde(rename = "custom coating + perfect HR")]
    CustomPerfectHr,
    #[serde(rename = "custom coating + perfect AR")]
    CustomPerfectAr,
}

impl Default for Facets {
    fn default() -> Self {
        Facets::AsCleaved
    }
}

impl Facets {
    const ALL: [Facets; 7] = [
        Facets::AsCleaved,
        Facets::AsCleavedPerfectHr,
        Facets::AsCleavedPerfectAr,
        Facets::PerfectArPerfectHr,
        Facets::CustomAsCleaved,
        Facets::CustomPerfectHr,
        Facets::CustomPerfectAr,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Facets::AsCleaved => "as-cleaved + as-cleaved",
            Facets::AsCleavedPerfectHr => "as-cleaved + perfect HR",
            Facets::AsCleavedPerfectAr => "as-cleaved + perfect AR",
            Facets::PerfectArPerfectHr => "perfect AR + perfect HR",
            Facets::CustomAsCleaved => "custom coating + as-cleaved",
            Facets::CustomPerfectHr => "custom coating + perfect HR",
            Facets::CustomPerfectAr => "custom coating + perfect AR",
        }
    }

    /// Front and back reflectivities for a mode `beta`, with `custom` the coated reflectivity
    pub fn reflectivities(&self, beta: Complex64, custom: f64) -> (f64, f64) {
        let cleaved = reflectivity(beta);
        match self {
            Facets::AsCleaved => (cleaved, cleaved),
            Facets::AsCleavedPerfectHr => (cleaved, 1.),
            Facets::AsCleavedPerfectAr => (PERFECT_AR, cleaved),
            Facets::PerfectArPerfectHr => (PERFECT_AR, 1.),
            Facets::CustomAsCleaved => (custom, cleaved),
            Facets::CustomPerfectHr => (custom, 1.),
            Facets::CustomPerfectAr => (PERFECT_AR, custom),
        }
    }
}

impl std::fmt::Display for Facets {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Facets {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facets::ALL
            .into_iter()
            .find(|facets| facets.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownFacets(s.to_string()))
    }
}

/// Cavity and active region figures feeding the performance estimate
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LaserParameters {
    /// Cavity length in mm
    pub length: f64,
    pub facets: Facets,
    /// Reflectivity of a custom coated facet
    pub custom_facet: f64,
    /// Operating field in kV / cm
    pub operating_field: f64,
    /// Length of a single period in angstrom
    pub period_length: f64,
    /// Number of periods in each active core
    pub periods: usize,
    /// Lifetimes of the upper and lower laser levels in ps
    pub tau_upper: f64,
    pub tau_lower: f64,
    /// Scattering time from the upper to the lower laser level in ps
    pub tau_upper_lower: f64,
    /// Dipole of the laser transition in angstrom
    pub optical_dipole: f64,
}

impl Default for LaserParameters {
    fn default() -> Self {
        Self {
            length: 3.,
            facets: Facets::default(),
            custom_facet: 0.,
            operating_field: 0.,
            period_length: 1.,
            periods: 1,
            tau_upper: 0.,
            tau_lower: 0.,
            tau_upper_lower: 1e-3,
            optical_dipole: 0.,
        }
    }
}

/// Figures of merit of a laser
#[derive(Clone, Debug, PartialEq)]
pub struct Performance {
    pub front_facet: f64,
    pub back_facet: f64,
    /// Losses in 1 / cm
    pub waveguide_loss: f64,
    pub mirror_loss: f64,
    /// Transition cross section in m^2
    pub cross_section: f64,
    /// Gain coefficient in cm / A
    pub gain: f64,
    /// Threshold current density in kA / cm^2
    pub threshold_current_density: f64,
    /// Threshold current in A
    pub threshold_current: f64,
    /// Operating voltage in V
    pub operating_voltage: f64,
    pub voltage_efficiency: f64,
    pub extraction_efficiency: f64,
    pub inversion_efficiency: f64,
    pub modal_efficiency: f64,
}

impl Performance {
    /// Evaluates the figures of merit of `waveguide` lasing on `mode`
    pub fn evaluate(
        waveguide: &Waveguide,
        grid: &StrataGrid,
        mode: &Mode,
    ) -> Result<Self, ModeSolverError> {
        let laser = &waveguide.laser;
        let wavelength = waveguide.wavelength;
        let beta = mode.beta;
        let (front_facet, back_facet) = laser.facets.reflectivities(beta, laser.custom_facet);

        let waveguide_loss = 4. * PI * beta.im / (wavelength * 1e-6) * 1e-2;
        let mirror_loss = -1. / (2. * laser.length * 0.1) * (front_facet * back_facet).ln();

        let photon = PLANCK * SPEED_OF_LIGHT / (wavelength * 1e-6);
        let dipole = laser.optical_dipole * 1e-10;
        // The transition linewidth is taken as a tenth of the photon energy
        let linewidth = 0.1 * photon;
        let cross_section = 4. * PI * ELECTRON_CHARGE.powi(2)
            / (PLANCK * SPEED_OF_LIGHT * EPSILON_0 * beta.re)
            * photon
            / linewidth
            * dipole.powi(2);

        let tau_effective = laser.tau_upper * (1. - laser.tau_lower / laser.tau_upper_lower);
        let period = laser.period_length * 1e-10;
        let gain = cross_section * tau_effective * 1e-12 / (ELECTRON_CHARGE * period) * 100.;

        let threshold_current_density =
            (waveguide_loss + mirror_loss) / (gain * mode.confinement) * 1e-3;
        let periods = laser.periods as f64;
        let threshold_current = threshold_current_density
            * 1e3
            * (periods * laser.period_length * 1e-8)
            * laser.length
            * 1e-1;
        let operating_voltage = laser.operating_field * 1e3 * laser.period_length * 1e-8 * periods;
        let voltage_efficiency = 1.24 / wavelength * periods / operating_voltage;
        let extraction_efficiency = mirror_loss / (mirror_loss + waveguide_loss);
        let inversion_efficiency = tau_effective / (tau_effective + laser.tau_lower);

        let modal_efficiency = modal_efficiency(waveguide, grid, mode)?;

        Ok(Self {
            front_facet,
            back_facet,
            waveguide_loss,
            mirror_loss,
            cross_section,
            gain,
            threshold_current_density,
            threshold_current,
            operating_voltage,
            voltage_efficiency,
            extraction_efficiency,
            inversion_efficiency,
            modal_efficiency,
        })
    }
}

/// Overlap of the mode with the individual periods of the active cores
///
/// The intensity over the core cells is interpolated at the centre of every period. The
/// sampling abscissa of the core cells is ambiguous to a cell at either end, so three
/// alignments are tried.
fn modal_efficiency(
    waveguide: &Waveguide,
    grid: &StrataGrid,
    mode: &Mode,
) -> Result<f64, ModeSolverError> {
    let laser = &waveguide.laser;
    let peak = mode.intensity.iter().copied().fold(0., f64::max);
    let core: Vec<f64> = mode
        .intensity
        .iter()
        .zip(grid.active_core.iter())
        .filter(|(_, &flag)| flag != 0.)
        .map(|(&value, _)| value / peak)
        .collect();
    let cores = waveguide.active_core_count();
    if core.is_empty() || cores == 0 {
        return Err(ModeSolverError::NoActiveCore);
    }

    let xres = grid.xres;
    let period = laser.period_length * 1e-4;
    let span = (cores * laser.periods) as f64 * period;
    let alignments = [
        arange(xres, span, xres),
        arange(0., span, xres),
        arange(xres, span - xres, xres),
    ];
    let abscissa = alignments
        .iter()
        .find(|xs| xs.len() == core.len())
        .ok_or_else(|| ModeSolverError::StructuralInconsistency {
            expected: core.len(),
            tried: alignments.iter().map(Vec::len).collect(),
        })?;

    let spline = NaturalCubicSpline::new(abscissa, &core)?;
    let count = cores * laser.periods;
    let centres = linspace(0.5 * period, span - 0.5 * period, count);
    let samples: Vec<f64> = centres.iter().map(|&x| spline.evaluate(x)).collect();
    let sum: f64 = samples.iter().sum();
    let sum_of_squares: f64 = samples.iter().map(|u| u * u).sum();
    Ok(sum.powi(2) / (count as f64 * sum_of_squares))
}

#[cfg(test)]
mod test {
    use super::{reflectivity, Facets, Performance, PERFECT_AR};
    use crate::{
        app::ModeConfiguration,
        device::info_desk::MaterialTable,
        error::ModeSolverError,
        strata::{ModeSolver, Stratum, StrataMaterial, Waveguide},
    };
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn cleaved_facets_of_a_semiconductor_reflect_about_a_quarter() {
        let r = reflectivity(Complex64::new(3.2, 1e-4));
        assert_relative_eq!(r, (2.2f64 / 4.2).powi(2));
        assert!(r > 0.25 && r < 0.3);
    }

    #[test]
    fn facet_combinations() {
        let beta = Complex64::new(3.2, 0.);
        let cleaved = reflectivity(beta);
        assert_eq!(Facets::AsCleaved.reflectivities(beta, 0.5), (cleaved, cleaved));
        assert_eq!(Facets::PerfectArPerfectHr.reflectivities(beta, 0.5), (PERFECT_AR, 1.));
        assert_eq!(Facets::CustomPerfectHr.reflectivities(beta, 0.5), (0.5, 1.));
        assert_eq!(
            "custom coating + perfect AR".parse::<Facets>().unwrap(),
            Facets::CustomPerfectAr
        );
    }

    fn single_core(core_thickness: f64, periods: usize, period_length: f64) -> Waveguide {
        let mut waveguide = Waveguide::new(
            vec![
                Stratum::new(StrataMaterial::Air, 1.),
                Stratum::new(StrataMaterial::InP, 3.),
                Stratum::new(StrataMaterial::ActiveCore, core_thickness),
                Stratum::new(StrataMaterial::InP, 3.),
            ],
            4.7,
        )
        .with_core_index(3.35);
        waveguide.laser.periods = periods;
        waveguide.laser.period_length = period_length;
        waveguide.laser.tau_upper = 1.5;
        waveguide.laser.tau_lower = 0.3;
        waveguide.laser.tau_upper_lower = 3.;
        waveguide.laser.optical_dipole = 15.;
        waveguide.laser.operating_field = 60.;
        waveguide
    }

    #[test]
    fn performance_of_a_simple_laser_is_physical() {
        let table = MaterialTable::default();
        // 30 periods of 500 angstrom fill a 1.5 micron core
        let waveguide = single_core(1.5, 30, 500.);
        let indices = waveguide.indices(&table, Complex64::new(3.35, 0.)).unwrap();
        let configuration = ModeConfiguration::default();
        let solver = ModeSolver::new(&waveguide, indices, &configuration);
        let mode = solver.solve().unwrap();
        let performance = Performance::evaluate(&waveguide, solver.grid(), &mode).unwrap();

        assert!(performance.mirror_loss > 0.);
        assert!(performance.gain > 0.);
        assert!(performance.threshold_current_density > 0.);
        assert!(performance.extraction_efficiency > 0. && performance.extraction_efficiency <= 1.);
        assert!(performance.modal_efficiency > 0. && performance.modal_efficiency <= 1. + 1e-9);
    }

    #[test]
    fn mismatched_core_and_periods_are_reported() {
        let table = MaterialTable::default();
        let waveguide = single_core(1.5, 10, 500.);
        let indices = waveguide.indices(&table, Complex64::new(3.35, 0.)).unwrap();
        let configuration = ModeConfiguration::default();
        let solver = ModeSolver::new(&waveguide, indices, &configuration);
        let mode = solver.mode(Complex64::new(3.2, 0.));
        let result = Performance::evaluate(&waveguide, solver.grid(), &mode);
        assert!(matches!(
            result,
            Err(ModeSolverError::StructuralInconsistency { expected: 150, .. })
        ));
    }
}
