use super::{Clamped, OutOfRange};
use crate::error::ConfigurationError;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[non_exhaustive]
/// Enum with all implemented material types
///
/// The first seven are binary compounds, the remainder are ternary alloys described by
/// their bowing parameters. As materials may be added in future this is labelled as
/// `non_exhaustive`
pub enum MaterialName {
    GaAs,
    InAs,
    AlAs,
    AlSb,
    GaSb,
    InSb,
    InP,
    InGaAs,
    AlInAs,
    AlGaAs,
    AlAsSb,
    AlGaSb,
    InAsSb,
}

impl MaterialName {
    pub(crate) const BINARIES: [MaterialName; 7] = [
        MaterialName::GaAs,
        MaterialName::InAs,
        MaterialName::AlAs,
        MaterialName::AlSb,
        MaterialName::GaSb,
        MaterialName::InSb,
        MaterialName::InP,
    ];

    pub(crate) const COMPOUNDS: [MaterialName; 6] = [
        MaterialName::InGaAs,
        MaterialName::AlInAs,
        MaterialName::AlGaAs,
        MaterialName::AlAsSb,
        MaterialName::AlGaSb,
        MaterialName::InAsSb,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            MaterialName::GaAs => "GaAs",
            MaterialName::InAs => "InAs",
            MaterialName::AlAs => "AlAs",
            MaterialName::AlSb => "AlSb",
            MaterialName::GaSb => "GaSb",
            MaterialName::InSb => "InSb",
            MaterialName::InP => "InP",
            MaterialName::InGaAs => "InGaAs",
            MaterialName::AlInAs => "AlInAs",
            MaterialName::AlGaAs => "AlGaAs",
            MaterialName::AlAsSb => "AlAsSb",
            MaterialName::AlGaSb => "AlGaSb",
            MaterialName::InAsSb => "InAsSb",
        }
    }
}

impl std::fmt::Display for MaterialName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MaterialName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialName::BINARIES
            .into_iter()
            .chain(MaterialName::COMPOUNDS)
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownMaterial(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The scalar parameters carried by every alloyable material
pub enum BandParameter {
    EgGamma,
    EgL,
    EgX,
    ValenceBandOffset,
    SpinOrbitSplitting,
    Me0,
    AcGamma,
    AcL,
    AcX,
    Ep,
    F,
    XiX,
    B,
    Av,
    AlphaGamma,
    BetaGamma,
    AlphaL,
    EpsStatic,
    EpsInfinity,
    HwLo,
    Alc,
    C11,
    C12,
}

impl BandParameter {
    pub const ALL: [BandParameter; 23] = [
        BandParameter::EgGamma,
        BandParameter::EgL,
        BandParameter::EgX,
        BandParameter::ValenceBandOffset,
        BandParameter::SpinOrbitSplitting,
        BandParameter::Me0,
        BandParameter::AcGamma,
        BandParameter::AcL,
        BandParameter::AcX,
        BandParameter::Ep,
        BandParameter::F,
        BandParameter::XiX,
        BandParameter::B,
        BandParameter::Av,
        BandParameter::AlphaGamma,
        BandParameter::BetaGamma,
        BandParameter::AlphaL,
        BandParameter::EpsStatic,
        BandParameter::EpsInfinity,
        BandParameter::HwLo,
        BandParameter::Alc,
        BandParameter::C11,
        BandParameter::C12,
    ];
}

/// Band, deformation, dielectric and elastic parameters of a material
///
/// Energies are in eV, the lattice constant in angstrom and elastic constants in GPa.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandParameters {
    /// Band gap at Gamma
    pub eg_gamma: f64,
    /// Band gap at L
    pub eg_l: f64,
    /// Band gap at X
    pub eg_x: f64,
    /// Valence band offset
    pub valence_band_offset: f64,
    /// Spin-orbit splitting of the valence band
    pub spin_orbit_splitting: f64,
    /// Band edge effective mass in units of the free electron mass
    pub me0: f64,
    /// Conduction band hydrostatic deformation potentials
    pub ac_gamma: f64,
    pub ac_l: f64,
    pub ac_x: f64,
    /// Kane energy
    pub ep: f64,
    /// Remote band contribution to the effective mass
    pub f: f64,
    /// Uniaxial deformation potential at X
    pub xi_x: f64,
    /// Valence shear deformation potential
    pub b: f64,
    /// Valence hydrostatic deformation potential
    pub av: f64,
    /// Varshni coefficients
    pub alpha_gamma: f64,
    pub beta_gamma: f64,
    pub alpha_l: f64,
    pub eps_static: f64,
    pub eps_infinity: f64,
    /// LO phonon energy
    pub hw_lo: f64,
    pub alc: f64,
    pub c11: f64,
    pub c12: f64,
}

impl BandParameters {
    pub fn get(&self, parameter: BandParameter) -> f64 {
        match parameter {
            BandParameter::EgGamma => self.eg_gamma,
            BandParameter::EgL => self.eg_l,
            BandParameter::EgX => self.eg_x,
            BandParameter::ValenceBandOffset => self.valence_band_offset,
            BandParameter::SpinOrbitSplitting => self.spin_orbit_splitting,
            BandParameter::Me0 => self.me0,
            BandParameter::AcGamma => self.ac_gamma,
            BandParameter::AcL => self.ac_l,
            BandParameter::AcX => self.ac_x,
            BandParameter::Ep => self.ep,
            BandParameter::F => self.f,
            BandParameter::XiX => self.xi_x,
            BandParameter::B => self.b,
            BandParameter::Av => self.av,
            BandParameter::AlphaGamma => self.alpha_gamma,
            BandParameter::BetaGamma => self.beta_gamma,
            BandParameter::AlphaL => self.alpha_l,
            BandParameter::EpsStatic => self.eps_static,
            BandParameter::EpsInfinity => self.eps_infinity,
            BandParameter::HwLo => self.hw_lo,
            BandParameter::Alc => self.alc,
            BandParameter::C11 => self.c11,
            BandParameter::C12 => self.c12,
        }
    }

    fn get_mut(&mut self, parameter: BandParameter) -> &mut f64 {
        match parameter {
            BandParameter::EgGamma => &mut self.eg_gamma,
            BandParameter::EgL => &mut self.eg_l,
            BandParameter::EgX => &mut self.eg_x,
            BandParameter::ValenceBandOffset => &mut self.valence_band_offset,
            BandParameter::SpinOrbitSplitting => &mut self.spin_orbit_splitting,
            BandParameter::Me0 => &mut self.me0,
            BandParameter::AcGamma => &mut self.ac_gamma,
            BandParameter::AcL => &mut self.ac_l,
            BandParameter::AcX => &mut self.ac_x,
            BandParameter::Ep => &mut self.ep,
            BandParameter::F => &mut self.f,
            BandParameter::XiX => &mut self.xi_x,
            BandParameter::B => &mut self.b,
            BandParameter::Av => &mut self.av,
            BandParameter::AlphaGamma => &mut self.alpha_gamma,
            BandParameter::BetaGamma => &mut self.beta_gamma,
            BandParameter::AlphaL => &mut self.alpha_l,
            BandParameter::EpsStatic => &mut self.eps_static,
            BandParameter::EpsInfinity => &mut self.eps_infinity,
            BandParameter::HwLo => &mut self.hw_lo,
            BandParameter::Alc => &mut self.alc,
            BandParameter::C11 => &mut self.c11,
            BandParameter::C12 => &mut self.c12,
        }
    }

    /// Builds a parameter set by evaluating `f` for every parameter
    pub fn try_from_fn<E>(
        mut f: impl FnMut(BandParameter) -> Result<f64, E>,
    ) -> Result<Self, E> {
        let mut parameters = Self::default();
        for parameter in BandParameter::ALL {
            *parameters.get_mut(parameter) = f(parameter)?;
        }
        Ok(parameters)
    }
}

/// Lattice constant at 300K and its linear temperature coefficient, in angstrom
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalLattice {
    pub at_300k: f64,
    pub slope: f64,
}

impl ThermalLattice {
    pub fn at(&self, temperature: f64) -> f64 {
        self.at_300k + self.slope * (temperature - 300.)
    }
}

/// Two-resonance Sellmeier dispersion, with wavelengths in micron
///
/// n^2 = c1 + c2 wl^2 / (wl^2 - c3^2) + c4 wl^2 / (wl^2 - c5^2)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sellmeier {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
    pub c5: f64,
    pub min_wavelength: f64,
    pub max_wavelength: f64,
}

impl Sellmeier {
    fn evaluate(&self, wavelength: f64) -> f64 {
        let wl2 = wavelength.powi(2);
        (self.c1 + self.c2 * wl2 / (wl2 - self.c3.powi(2)) + self.c4 * wl2 / (wl2 - self.c5.powi(2)))
            .sqrt()
    }
}

/// A binary compound
#[derive(Clone, Debug)]
pub struct BinaryMaterial {
    pub name: MaterialName,
    pub me0: f64,
    /// Absent for materials which only act as a substrate
    pub band: Option<BandParameters>,
    pub lattice: ThermalLattice,
    pub dispersion: Option<Sellmeier>,
}

impl BinaryMaterial {
    /// The lattice constant at `temperature`
    pub fn alc(&self, temperature: f64) -> f64 {
        self.lattice.at(temperature)
    }

    pub fn band_parameter(&self, parameter: BandParameter) -> Option<f64> {
        self.band.map(|band| band.get(parameter))
    }

    /// The refractive index at `wavelength`, in micron
    ///
    /// Wavelengths outside the characterised range are clamped to the nearest bound and the
    /// excursion is reported alongside the value.
    pub fn refractive_index(&self, wavelength: f64) -> Result<Clamped<f64>, ConfigurationError> {
        let dispersion = self
            .dispersion
            .as_ref()
            .ok_or(ConfigurationError::MissingDispersion(self.name))?;
        let clamped = wavelength.clamp(dispersion.min_wavelength, dispersion.max_wavelength);
        let warning = (clamped != wavelength).then(|| {
            let warning = OutOfRange {
                material: self.name,
                wavelength,
                min: dispersion.min_wavelength,
                max: dispersion.max_wavelength,
            };
            tracing::warn!("{}", warning);
            warning
        });
        Ok(Clamped {
            value: dispersion.evaluate(clamped),
            warning,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Bowing coefficient of a ternary alloy
pub enum Bowing {
    Constant(f64),
    /// A coefficient which itself varies linearly with the mole fraction
    Linear { constant: f64, slope: f64 },
}

impl Bowing {
    pub fn at(&self, mole_fraction: f64) -> f64 {
        match self {
            Bowing::Constant(value) => *value,
            Bowing::Linear { constant, slope } => constant + slope * mole_fraction,
        }
    }
}

/// A ternary alloy of two binary components
///
/// Parameters interpolate linearly between the components, and are corrected by a bowing term
/// only for the parameters the alloy lists.
#[derive(Clone, Debug)]
pub struct Compound {
    pub name: MaterialName,
    /// The component weighted by the mole fraction, and its complement
    pub components: (MaterialName, MaterialName),
    pub bowing: Vec<(BandParameter, Bowing)>,
}

impl Compound {
    pub fn bowing(&self, parameter: BandParameter) -> Option<&Bowing> {
        self.bowing
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|(_, bowing)| bowing)
    }

    /// Interpolates `parameter` at mole fraction `x` between `first` and `second`
    pub fn interpolate(
        &self,
        parameter: BandParameter,
        x: f64,
        first: &BandParameters,
        second: &BandParameters,
    ) -> f64 {
        let linear = x * first.get(parameter) + (1. - x) * second.get(parameter);
        match self.bowing(parameter) {
            Some(bowing) => linear - x * (1. - x) * bowing.at(x),
            None => linear,
        }
    }
}

impl BinaryMaterial {
    pub(crate) fn gaas() -> Self {
        Self {
            name: MaterialName::GaAs,
            me0: 0.067,
            band: Some(BandParameters {
                eg_gamma: 1.519,
                eg_l: 1.815,
                eg_x: 1.981,
                valence_band_offset: -0.80,
                spin_orbit_splitting: 0.341,
                me0: 0.067,
                ac_gamma: -7.17,
                ac_l: -4.91,
                ac_x: -0.16,
                ep: 28.8,
                f: -1.94,
                xi_x: 14.26,
                b: -2.0,
                av: -1.16,
                alpha_gamma: 0.5405e-3,
                beta_gamma: 204.,
                alpha_l: 0.605e-3,
                eps_static: 12.9,
                eps_infinity: 10.86,
                hw_lo: 35.3e-3,
                alc: 5.65325,
                c11: 1221.,
                c12: 566.,
            }),
            lattice: ThermalLattice {
                at_300k: 5.65325,
                slope: 3.88e-5,
            },
            dispersion: Some(Sellmeier {
                c1: 3.5,
                c2: 7.4969,
                c3: 0.4082,
                c4: 1.9347,
                c5: 37.17,
                min_wavelength: 1.4,
                max_wavelength: 11.,
            }),
        }
    }

    pub(crate) fn inas() -> Self {
        Self {
            name: MaterialName::InAs,
            me0: 0.026,
            band: Some(BandParameters {
                eg_gamma: 0.417,
                eg_l: 1.133,
                eg_x: 1.433,
                valence_band_offset: -0.59,
                spin_orbit_splitting: 0.39,
                me0: 0.026,
                ac_gamma: -5.08,
                ac_l: -3.89,
                ac_x: -0.08,
                ep: 21.5,
                f: -2.9,
                xi_x: 3.7,
                b: -1.8,
                av: -1.00,
                alpha_gamma: 0.276e-3,
                beta_gamma: 93.,
                alpha_l: 0.276e-3,
                eps_static: 14.3,
                eps_infinity: 11.6,
                hw_lo: 29.93e-3,
                alc: 6.0583,
                c11: 832.9,
                c12: 452.6,
            }),
            lattice: ThermalLattice {
                at_300k: 6.0583,
                slope: 2.74e-5,
            },
            dispersion: Some(Sellmeier {
                c1: 11.1,
                c2: 0.71,
                c3: 2.551,
                c4: 2.75,
                c5: 45.66,
                min_wavelength: 3.7,
                max_wavelength: 31.3,
            }),
        }
    }

    pub(crate) fn alas() -> Self {
        Self {
            name: MaterialName::AlAs,
            me0: 0.15,
            band: Some(BandParameters {
                eg_gamma: 3.099,
                eg_l: 2.46,
                eg_x: 2.24,
                valence_band_offset: -1.33,
                spin_orbit_splitting: 0.28,
                me0: 0.15,
                ac_gamma: -5.64,
                ac_l: -3.07,
                ac_x: 2.54,
                ep: 21.1,
                f: -0.48,
                xi_x: 6.11,
                b: -2.3,
                av: -2.47,
                alpha_gamma: 0.855e-3,
                beta_gamma: 530.,
                alpha_l: 0.605e-3,
                eps_static: 10.06,
                eps_infinity: 8.16,
                hw_lo: 49.8e-3,
                alc: 5.6611,
                c11: 1250.,
                c12: 534.,
            }),
            lattice: ThermalLattice {
                at_300k: 5.6611,
                slope: 2.90e-5,
            },
            dispersion: Some(Sellmeier {
                c1: 2.0792,
                c2: 6.0840,
                c3: 0.2822,
                c4: 1.900,
                c5: 27.62,
                min_wavelength: 0.56,
                max_wavelength: 2.2,
            }),
        }
    }

    pub(crate) fn alsb() -> Self {
        Self {
            name: MaterialName::AlSb,
            me0: 0.14,
            band: Some(BandParameters {
                eg_gamma: 2.386,
                eg_l: 2.329,
                eg_x: 1.696,
                valence_band_offset: -0.41,
                spin_orbit_splitting: 0.676,
                me0: 0.14,
                ac_gamma: -4.5,
                ac_l: 0.,
                ac_x: 2.54,
                ep: 18.7,
                f: -0.56,
                xi_x: 6.11,
                b: -1.35,
                av: -1.4,
                alpha_gamma: 0.42e-3,
                beta_gamma: 140.,
                alpha_l: 0.58e-3,
                eps_static: 12.04,
                eps_infinity: 10.24,
                // 42.7 meV
                hw_lo: 42.7e-3,
                alc: 6.1355,
                c11: 876.9,
                c12: 434.1,
            }),
            lattice: ThermalLattice {
                at_300k: 6.1355,
                slope: 2.60e-5,
            },
            dispersion: None,
        }
    }

    pub(crate) fn gasb() -> Self {
        Self {
            name: MaterialName::GaSb,
            me0: 0.039,
            band: Some(BandParameters {
                eg_gamma: 0.812,
                eg_l: 0.875,
                eg_x: 1.141,
                valence_band_offset: -0.03,
                spin_orbit_splitting: 0.76,
                me0: 0.039,
                ac_gamma: -7.5,
                ac_l: 0.,
                ac_x: 0.,
                ep: 27.0,
                f: -1.63,
                xi_x: 0.,
                b: -2.0,
                av: -0.8,
                alpha_gamma: 0.417e-3,
                beta_gamma: 140.,
                alpha_l: 0.597e-3,
                eps_static: 0.,
                eps_infinity: 0.,
                hw_lo: 0.,
                alc: 6.0959,
                c11: 884.2,
                c12: 402.6,
            }),
            lattice: ThermalLattice {
                at_300k: 6.0959,
                slope: 4.72e-5,
            },
            dispersion: None,
        }
    }

    pub(crate) fn insb() -> Self {
        Self {
            name: MaterialName::InSb,
            me0: 0.0135,
            band: Some(BandParameters {
                eg_gamma: 0.235,
                eg_l: 0.93,
                eg_x: 0.63,
                valence_band_offset: 0.,
                spin_orbit_splitting: 0.81,
                me0: 0.0135,
                ac_gamma: -6.94,
                ac_l: 0.,
                ac_x: 0.,
                ep: 23.3,
                f: -0.23,
                xi_x: 0.,
                b: -2.0,
                av: -0.36,
                alpha_gamma: 0.32e-3,
                beta_gamma: 170.,
                alpha_l: 0.,
                eps_static: 0.,
                eps_infinity: 0.,
                hw_lo: 0.,
                alc: 6.4794,
                c11: 684.7,
                c12: 373.5,
            }),
            lattice: ThermalLattice {
                at_300k: 6.4794,
                slope: 3.48e-5,
            },
            dispersion: None,
        }
    }

    pub(crate) fn inp() -> Self {
        Self {
            name: MaterialName::InP,
            me0: 0.0795,
            band: None,
            lattice: ThermalLattice {
                at_300k: 5.8697,
                slope: 2.79e-5,
            },
            dispersion: Some(Sellmeier {
                c1: 7.255,
                c2: 2.316,
                c3: 0.6263,
                c4: 2.765,
                c5: 32.935,
                min_wavelength: 0.95,
                max_wavelength: 10.,
            }),
        }
    }
}

impl Compound {
    fn constant(
        name: MaterialName,
        components: (MaterialName, MaterialName),
        bowing: &[(BandParameter, f64)],
    ) -> Self {
        Self {
            name,
            components,
            bowing: bowing
                .iter()
                .map(|&(parameter, value)| (parameter, Bowing::Constant(value)))
                .collect(),
        }
    }

    pub(crate) fn ingaas() -> Self {
        use BandParameter::*;
        Self::constant(
            MaterialName::InGaAs,
            (MaterialName::InAs, MaterialName::GaAs),
            &[
                (EgGamma, 0.477),
                (EgL, 0.33),
                (EgX, 1.4),
                (ValenceBandOffset, -0.38),
                (SpinOrbitSplitting, 0.15),
                (AcGamma, 2.61),
                (AcL, 2.61),
                (AcX, 2.61),
                (Me0, 0.0091),
                (Ep, -1.48),
                (F, 1.77),
            ],
        )
    }

    pub(crate) fn alinas() -> Self {
        use BandParameter::*;
        Self::constant(
            MaterialName::AlInAs,
            (MaterialName::InAs, MaterialName::AlAs),
            &[
                (EgGamma, 0.70),
                (EgL, 0.),
                (EgX, 0.),
                (ValenceBandOffset, -0.64),
                (SpinOrbitSplitting, 0.15),
                (AcGamma, -1.4),
                (AcL, -1.4),
                (AcX, -1.4),
                (Me0, 0.049),
                (Ep, -4.81),
                (F, -4.44),
            ],
        )
    }

    pub(crate) fn algaas() -> Self {
        use BandParameter::*;
        let mut compound = Self::constant(
            MaterialName::AlGaAs,
            (MaterialName::AlAs, MaterialName::GaAs),
            &[
                (EgL, 0.055),
                (EgX, 0.),
                (ValenceBandOffset, 0.),
                (SpinOrbitSplitting, 0.),
                (AcGamma, 0.),
                (AcL, 0.),
                (AcX, 0.),
                (Me0, 0.),
                (Ep, 0.),
                (F, 0.),
            ],
        );
        // The Gamma gap bows with a coefficient which depends on the Al fraction
        compound.bowing.push((
            EgGamma,
            Bowing::Linear {
                constant: -0.127,
                slope: 1.310,
            },
        ));
        compound
    }

    pub(crate) fn alassb() -> Self {
        use BandParameter::*;
        Self::constant(
            MaterialName::AlAsSb,
            (MaterialName::AlAs, MaterialName::AlSb),
            &[
                (EgGamma, 0.8),
                (EgL, 0.28),
                (EgX, 0.28),
                (SpinOrbitSplitting, 0.15),
                (ValenceBandOffset, -1.71),
            ],
        )
    }

    pub(crate) fn algasb() -> Self {
        use BandParameter::*;
        let mut compound = Self::constant(
            MaterialName::AlGaSb,
            (MaterialName::AlSb, MaterialName::GaSb),
            &[
                (EgL, 0.),
                (EgX, 0.),
                (ValenceBandOffset, 0.),
                (SpinOrbitSplitting, 0.2),
                (AcGamma, 0.),
                (AcL, 0.),
                (AcX, 0.),
                (Me0, 0.),
                (Ep, 0.),
                (F, 0.),
            ],
        );
        compound.bowing.push((
            EgGamma,
            Bowing::Linear {
                constant: -0.044,
                slope: 1.22,
            },
        ));
        compound
    }

    pub(crate) fn inassb() -> Self {
        use BandParameter::*;
        Self::constant(
            MaterialName::InAsSb,
            (MaterialName::InAs, MaterialName::InSb),
            &[
                (EgGamma, 0.67),
                (EgL, 0.6),
                (EgX, 0.6),
                (ValenceBandOffset, 0.),
                (SpinOrbitSplitting, 1.2),
                (AcGamma, 0.),
                (AcL, 0.),
                (AcX, 0.),
                (Me0, 0.035),
                (Ep, 0.),
                (F, 0.),
            ],
        )
    }
}
