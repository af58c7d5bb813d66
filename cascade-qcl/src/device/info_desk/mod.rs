//! Compile-time defined material properties
//!
//! This module defines the binary compounds and ternary alloys available to a structure, and
//! passes their parameters out through the `MaterialProvider` trait. The table is resolved at
//! a single temperature, which fixes the lattice constants of every binary.

mod materials;

pub use materials::{
    BandParameter, BandParameters, BinaryMaterial, Bowing, Compound, MaterialName, Sellmeier,
    ThermalLattice,
};

use crate::error::ConfigurationError;
use miette::Diagnostic;

/// A wavelength requested outside the range a dispersion model was characterised over
#[derive(thiserror::Error, Debug, Clone, PartialEq, Diagnostic)]
#[error("wavelength {wavelength} um lies outside the characterised range {min} to {max} um of {material}")]
pub struct OutOfRange {
    pub material: MaterialName,
    pub wavelength: f64,
    pub min: f64,
    pub max: f64,
}

/// A value computed from clamped inputs, carrying the warning raised by the clamp if any
#[derive(Clone, Debug, PartialEq)]
pub struct Clamped<T> {
    pub value: T,
    pub warning: Option<OutOfRange>,
}

impl<T> Clamped<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Read-only access to the material parameters used by the simulation
///
/// Implementors must be shareable between threads, as the eigen and transition solvers fan
/// out over rayon and read the table concurrently.
pub trait MaterialProvider: Sync {
    /// The temperature the table is resolved at, in Kelvin
    fn temperature(&self) -> f64;
    fn binary(&self, name: MaterialName) -> Result<&BinaryMaterial, ConfigurationError>;
    fn compound(&self, name: MaterialName) -> Result<&Compound, ConfigurationError>;
    /// The binaries which a structure may be grown on
    fn substrates(&self) -> &[MaterialName];
    /// Whether the waveguide material `name` must be given a mole fraction
    fn needs_composition(&self, name: &str) -> bool;
    /// Whether the waveguide material `name` can carry a doping density
    fn is_dopable(&self, name: &str) -> bool;

    /// The band parameters of the binary `name`, with the lattice constant at the table temperature
    fn band_parameters(&self, name: MaterialName) -> Result<BandParameters, ConfigurationError> {
        let binary = self.binary(name)?;
        let mut band = binary
            .band
            .ok_or(ConfigurationError::MissingBandParameters(name))?;
        band.alc = binary.alc(self.temperature());
        Ok(band)
    }

    /// The parameters of the alloy `name` at mole fraction `x` of its first component
    fn alloy(&self, name: MaterialName, x: f64) -> Result<BandParameters, ConfigurationError> {
        let compound = self.compound(name)?;
        let first = self.band_parameters(compound.components.0)?;
        let second = self.band_parameters(compound.components.1)?;
        BandParameters::try_from_fn(|parameter| {
            Ok(compound.interpolate(parameter, x, &first, &second))
        })
    }
}

const SUBSTRATES: [MaterialName; 3] = [MaterialName::InP, MaterialName::GaAs, MaterialName::GaSb];
const NEEDS_COMPOSITION: [&str; 2] = ["InGaAs", "InAlAs"];
const NOT_DOPABLE: [&str; 4] = ["Air", "Au", "SiO2", "SiNx"];

/// The built-in material table
#[derive(Clone, Debug)]
pub struct MaterialTable {
    temperature: f64,
    binaries: Vec<BinaryMaterial>,
    compounds: Vec<Compound>,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new(300.)
    }
}

impl MaterialTable {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            binaries: vec![
                BinaryMaterial::gaas(),
                BinaryMaterial::inas(),
                BinaryMaterial::alas(),
                BinaryMaterial::alsb(),
                BinaryMaterial::gasb(),
                BinaryMaterial::insb(),
                BinaryMaterial::inp(),
            ],
            compounds: vec![
                Compound::ingaas(),
                Compound::alinas(),
                Compound::algaas(),
                Compound::alassb(),
                Compound::algasb(),
                Compound::inassb(),
            ],
        }
    }

    /// Re-resolves every lattice constant at `temperature`
    ///
    /// Taking `&mut self` means no solve can be reading the table while it changes.
    pub fn set_temperature(&mut self, temperature: f64) {
        tracing::debug!("Updating material table temperature to {temperature} K");
        self.temperature = temperature;
    }
}

impl MaterialProvider for MaterialTable {
    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn binary(&self, name: MaterialName) -> Result<&BinaryMaterial, ConfigurationError> {
        self.binaries
            .iter()
            .find(|binary| binary.name == name)
            .ok_or_else(|| ConfigurationError::UnknownMaterial(name.to_string()))
    }

    fn compound(&self, name: MaterialName) -> Result<&Compound, ConfigurationError> {
        self.compounds
            .iter()
            .find(|compound| compound.name == name)
            .ok_or_else(|| ConfigurationError::UnknownMaterial(name.to_string()))
    }

    fn substrates(&self) -> &[MaterialName] {
        &SUBSTRATES
    }

    fn needs_composition(&self, name: &str) -> bool {
        NEEDS_COMPOSITION.contains(&name)
    }

    fn is_dopable(&self, name: &str) -> bool {
        !NOT_DOPABLE.contains(&name)
    }
}
