//! Complex refractive indices of waveguide materials
//!
//! III-V claddings take their undoped index from the Sellmeier fits of the material table
//! and are corrected for free carrier absorption with a Drude term. Metals and dielectrics use
//! empirical fits in the wavelength, in micron.

use crate::{
    alloy::NUMBER_OF_SLOTS,
    device::info_desk::{MaterialName, MaterialProvider},
    error::ConfigurationError,
};
use num_complex::Complex64;
use serde::Deserialize;
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
/// Materials a waveguide stratum can be made of
pub enum StrataMaterial {
    InP,
    GaAs,
    InGaAs,
    InAlAs,
    Au,
    SiNx,
    SiO2,
    Air,
    /// The quantum cascade core, with an index supplied by the caller
    #[serde(rename = "Active Core")]
    ActiveCore,
}

impl StrataMaterial {
    const ALL: [StrataMaterial; 9] = [
        StrataMaterial::InP,
        StrataMaterial::GaAs,
        StrataMaterial::InGaAs,
        StrataMaterial::InAlAs,
        StrataMaterial::Au,
        StrataMaterial::SiNx,
        StrataMaterial::SiO2,
        StrataMaterial::Air,
        StrataMaterial::ActiveCore,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            StrataMaterial::InP => "InP",
            StrataMaterial::GaAs => "GaAs",
            StrataMaterial::InGaAs => "InGaAs",
            StrataMaterial::InAlAs => "InAlAs",
            StrataMaterial::Au => "Au",
            StrataMaterial::SiNx => "SiNx",
            StrataMaterial::SiO2 => "SiO2",
            StrataMaterial::Air => "Air",
            StrataMaterial::ActiveCore => "Active Core",
        }
    }
}

impl std::fmt::Display for StrataMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrataMaterial {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrataMaterial::ALL
            .into_iter()
            .find(|material| material.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownMaterial(s.to_string()))
    }
}

/// Applies the free carrier correction for a doping of `doping` 1e17 cm^-3
fn drude(index: f64, me0: f64, doping: f64, wavelength: f64) -> Complex64 {
    let a = 8.97e-5 * wavelength.powi(2) / me0 * doping;
    let eps = Complex64::new(index * index, 0.)
        - a / Complex64::new(1., 5.305e-3 * wavelength.powi(2));
    Complex64::new(
        (0.5 * (eps.norm() + eps.re)).sqrt(),
        (0.5 * (eps.norm() - eps.re)).sqrt(),
    )
}

fn gold(wavelength: f64) -> Complex64 {
    let (c1, c2, c3) = (-0.1933, 0.3321, 0.0938);
    let (d1, d2, d3) = (-0.382, 6.8522, -0.1289);
    Complex64::new(
        c1 + wavelength * c2 + wavelength * c3 * c3,
        d1 + wavelength * d2 + wavelength * d3 * d3,
    )
}

fn silicon_nitride(wavelength: f64) -> Complex64 {
    let (c1, c2, c3) = (2.0019336, 0.15265213, 4.0495557);
    let d = [
        -0.00282,
        0.003029,
        -0.0006982,
        -0.0002839,
        0.0001816,
        -3.948e-5,
        4.276e-6,
        -2.314e-7,
        4.982e-9,
    ];
    let n = c1 + c2 / wavelength.powi(2) + c3 / wavelength.powi(4);
    // Horner evaluation of the absorption polynomial
    let k = d.iter().rev().fold(0., |acc, coefficient| acc * wavelength + coefficient);
    Complex64::new(n, 100. * k)
}

fn silica(wavelength: f64) -> Complex64 {
    let (c1, c2, c3) = (1.41870, 0.12886725, 2.7573641e-5);
    let n = c1 + c2 / wavelength.powi(2) + c3 / wavelength.powi(4);

    // Four peak Lorentzian fit of the absorption in 1 / cm
    let peaks = [
        (2.83043, 6.083822, 10881.9438),
        (8.95338, 1.38389113, 9167.662815),
        (12.3845492, 3.9792077, 12642.72911),
        (15.6387213, 0.6057751177, 3292.325272),
    ];
    let alpha = peaks
        .iter()
        .fold(-797.4627, |acc, &(centre, width, area)| {
            acc + 2. * area / PI * width / (4. * (wavelength - centre).powi(2) + width.powi(2))
        });
    Complex64::new(n, extinction(alpha, wavelength))
}

/// The extinction coefficient of an absorption `alpha` in 1 / cm at `wavelength` in micron
pub(crate) fn extinction(alpha: f64, wavelength: f64) -> f64 {
    alpha * wavelength * 1e-4 / (4. * PI)
}

/// Evaluates material indices at a single wavelength
pub struct IndexModel<'a, P> {
    provider: &'a P,
    wavelength: f64,
}

impl<'a, P: MaterialProvider> IndexModel<'a, P> {
    pub fn new(provider: &'a P, wavelength: f64) -> Self {
        Self {
            provider,
            wavelength,
        }
    }

    fn undoped(&self, name: MaterialName) -> Result<f64, ConfigurationError> {
        Ok(self
            .provider
            .binary(name)?
            .refractive_index(self.wavelength)?
            .into_inner())
    }

    fn mass(&self, name: MaterialName) -> Result<f64, ConfigurationError> {
        Ok(self.provider.binary(name)?.me0)
    }

    /// Linear interpolation of index and mass between two binaries
    fn mixed(
        &self,
        x_name: MaterialName,
        other: MaterialName,
        x: f64,
    ) -> Result<(f64, f64), ConfigurationError> {
        let index = x * self.undoped(x_name)? + (1. - x) * self.undoped(other)?;
        let mass = x * self.mass(x_name)? + (1. - x) * self.mass(other)?;
        Ok((index, mass))
    }

    /// The complex index of `material`
    ///
    /// `composition` is the indium fraction of the ternary claddings, `doping` is in 1e17 cm^-3
    /// and `core` is used verbatim for the active core.
    pub fn index(
        &self,
        material: StrataMaterial,
        composition: f64,
        doping: f64,
        core: Complex64,
    ) -> Result<Complex64, ConfigurationError> {
        let wavelength = self.wavelength;
        Ok(match material {
            StrataMaterial::ActiveCore => core,
            StrataMaterial::InP => drude(
                self.undoped(MaterialName::InP)?,
                self.mass(MaterialName::InP)?,
                doping,
                wavelength,
            ),
            StrataMaterial::GaAs => drude(
                self.undoped(MaterialName::GaAs)?,
                self.mass(MaterialName::GaAs)?,
                doping,
                wavelength,
            ),
            StrataMaterial::InGaAs => {
                let (index, mass) =
                    self.mixed(MaterialName::InAs, MaterialName::GaAs, composition)?;
                drude(index, mass, doping, wavelength)
            }
            StrataMaterial::InAlAs => {
                let (index, mass) =
                    self.mixed(MaterialName::InAs, MaterialName::AlAs, composition)?;
                drude(index, mass, doping, wavelength)
            }
            StrataMaterial::Au => gold(wavelength),
            StrataMaterial::SiNx => silicon_nitride(wavelength),
            StrataMaterial::SiO2 => silica(wavelength),
            StrataMaterial::Air => Complex64::new(1., 0.),
        })
    }

    /// The mean index of a quantum cascade core
    ///
    /// Even slots are indium gallium arsenide and odd slots aluminium indium arsenide, each
    /// weighted by the width of material it occupies. A core without any width falls back to
    /// the unweighted mean. `a_core` is the core absorption in 1 / cm.
    pub fn core_index(
        &self,
        mole_fractions: &[f64; NUMBER_OF_SLOTS],
        material_width: &[f64; NUMBER_OF_SLOTS],
        a_core: f64,
    ) -> Result<Complex64, ConfigurationError> {
        let inas = self.undoped(MaterialName::InAs)?;
        let gaas = self.undoped(MaterialName::GaAs)?;
        let alas = self.undoped(MaterialName::AlAs)?;
        let slot_index = mole_fractions
            .iter()
            .enumerate()
            .map(|(slot, &x)| {
                let other = if slot % 2 == 0 { gaas } else { alas };
                x * inas + (1. - x) * other
            })
            .collect::<Vec<_>>();

        let total: f64 = material_width.iter().sum();
        let n = if total > 0. {
            slot_index
                .iter()
                .zip(material_width.iter())
                .map(|(n, width)| n * width)
                .sum::<f64>()
                / total
        } else {
            slot_index.iter().sum::<f64>() / NUMBER_OF_SLOTS as f64
        };
        Ok(Complex64::new(n, extinction(a_core, self.wavelength)))
    }
}

#[cfg(test)]
mod test {
    use super::{IndexModel, StrataMaterial};
    use crate::device::info_desk::MaterialTable;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn doping_introduces_loss_and_lowers_the_index() {
        let table = MaterialTable::default();
        let model = IndexModel::new(&table, 4.7);
        let core = Complex64::new(3.3, 0.);
        let undoped = model.index(StrataMaterial::InP, 0., 0., core).unwrap();
        let doped = model.index(StrataMaterial::InP, 0., 50., core).unwrap();
        assert_relative_eq!(undoped.im, 0.);
        assert!(doped.im > 0.);
        assert!(doped.re < undoped.re);
    }

    #[test]
    fn ternary_end_points_match_binaries() {
        let table = MaterialTable::default();
        let model = IndexModel::new(&table, 4.7);
        let core = Complex64::new(3.3, 0.);
        let gaas = model.index(StrataMaterial::GaAs, 0., 0., core).unwrap();
        let ingaas = model.index(StrataMaterial::InGaAs, 0., 0., core).unwrap();
        assert_relative_eq!(gaas.re, ingaas.re, epsilon = 1e-12);
    }

    #[test]
    fn the_active_core_is_passed_through() {
        let table = MaterialTable::default();
        let model = IndexModel::new(&table, 4.7);
        let core = Complex64::new(3.3, 1e-3);
        assert_eq!(
            model.index(StrataMaterial::ActiveCore, 0., 0., core).unwrap(),
            core
        );
        assert_eq!(
            model.index(StrataMaterial::Air, 0., 0., core).unwrap(),
            Complex64::new(1., 0.)
        );
    }

    #[test]
    fn an_empty_core_falls_back_to_the_unweighted_mean() {
        let table = MaterialTable::default();
        let model = IndexModel::new(&table, 4.7);
        let fractions = [0.53, 0.52, 0.53, 0.52, 0.53, 0.52, 0.53, 0.52];
        let unweighted = model.core_index(&fractions, &[0.; 8], 0.).unwrap();
        let uniform = model.core_index(&fractions, &[1.; 8], 0.).unwrap();
        assert_relative_eq!(unweighted.re, uniform.re, epsilon = 1e-12);
        assert!(unweighted.re > 3. && unweighted.re < 3.6);
    }

    #[test]
    fn material_names_parse_including_the_core() {
        assert_eq!(
            "Active Core".parse::<StrataMaterial>().unwrap(),
            StrataMaterial::ActiveCore
        );
        assert!("Unobtainium".parse::<StrataMaterial>().is_err());
    }
}
