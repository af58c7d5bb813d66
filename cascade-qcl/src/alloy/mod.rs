//! Alloy mixing
//!
//! A structure is grown on one of a fixed set of substrates, and the substrate decides which
//! ternary alloys may be used for the well and barrier of each of the four material labels.
//! The eight resulting material slots are ordered `[well, barrier] * 4`, so the slot of a
//! layer with material label `m` (1-based) is `2(m - 1)` for a well and `2m - 1` for a barrier.

mod strain;

pub use strain::{BandStructure, StrainCorrector, StrainSummary};

use crate::{
    device::info_desk::{BandParameters, MaterialName, MaterialProvider},
    error::ConfigurationError,
};
use serde::Deserialize;

/// The number of material slots, a well and barrier for each material label
pub const NUMBER_OF_SLOTS: usize = 8;
/// The number of distinct material labels a layer may carry
pub const NUMBER_OF_LABELS: usize = NUMBER_OF_SLOTS / 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
/// The substrates a structure may be grown on
pub enum Substrate {
    InP,
    GaAs,
    GaSb,
}

impl std::str::FromStr for Substrate {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InP" => Ok(Substrate::InP),
            "GaAs" => Ok(Substrate::GaAs),
            "GaSb" => Ok(Substrate::GaSb),
            _ => Err(ConfigurationError::UnsupportedSubstrate(s.to_string())),
        }
    }
}

impl std::fmt::Display for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.material())
    }
}

impl Substrate {
    /// The binary the substrate is made of
    pub fn material(&self) -> MaterialName {
        match self {
            Substrate::InP => MaterialName::InP,
            Substrate::GaAs => MaterialName::GaAs,
            Substrate::GaSb => MaterialName::GaSb,
        }
    }

    /// The alloy used in the well and barrier slots respectively
    pub fn alloys(&self) -> [MaterialName; 2] {
        match self {
            Substrate::InP => [MaterialName::InGaAs, MaterialName::AlInAs],
            Substrate::GaAs => [MaterialName::AlGaAs, MaterialName::AlGaAs],
            Substrate::GaSb => [MaterialName::InAsSb, MaterialName::AlGaSb],
        }
    }

    /// The alloy held in `slot`
    pub fn alloy_for_slot(&self, slot: usize) -> MaterialName {
        self.alloys()[slot % 2]
    }
}

/// Index of the material slot for a layer with 1-based material `label`
pub fn slot_index(label: usize, barrier: bool) -> usize {
    if barrier {
        2 * label - 1
    } else {
        2 * (label - 1)
    }
}

/// The mixed parameters of every material slot
#[derive(Clone, Debug)]
pub struct MixedAlloys {
    pub substrate: Substrate,
    pub slots: [BandParameters; NUMBER_OF_SLOTS],
    /// Effective polar permittivity 1 / (1 / eps_inf - 1 / eps_static) of each slot
    pub epsrho: [f64; NUMBER_OF_SLOTS],
}

impl MixedAlloys {
    /// Collects a single parameter across all slots
    pub fn map(&self, f: impl Fn(&BandParameters) -> f64) -> [f64; NUMBER_OF_SLOTS] {
        let mut values = [0.; NUMBER_OF_SLOTS];
        for (value, slot) in values.iter_mut().zip(self.slots.iter()) {
            *value = f(slot);
        }
        values
    }
}

/// Interpolates the band and elastic parameters of every material slot
///
/// Each parameter is `x P(first) + (1 - x) P(second)`, less the bowing correction for the
/// parameters the slot's alloy lists. The Gamma gap of the GaAs and GaSb barrier alloys bows
/// with a composition dependent coefficient, which the alloy record itself carries.
#[tracing::instrument(name = "Mixing alloys", level = "debug", skip(provider))]
pub fn mix<P: MaterialProvider>(
    provider: &P,
    substrate: Substrate,
    mole_fractions: &[f64; NUMBER_OF_SLOTS],
) -> Result<MixedAlloys, ConfigurationError> {
    let mut slots = [BandParameters::default(); NUMBER_OF_SLOTS];
    for (index, (slot, &x)) in slots.iter_mut().zip(mole_fractions.iter()).enumerate() {
        *slot = provider.alloy(substrate.alloy_for_slot(index), x)?;
    }

    let mut epsrho = [0.; NUMBER_OF_SLOTS];
    for (value, slot) in epsrho.iter_mut().zip(slots.iter()) {
        *value = 1. / (1. / slot.eps_infinity - 1. / slot.eps_static);
    }

    Ok(MixedAlloys {
        substrate,
        slots,
        epsrho,
    })
}
