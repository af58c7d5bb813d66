//! Layer stacks
//!
//! A `QclLayers` is an opaque description of a heterostructure: an ordered list of layers,
//! the substrate they are grown on, the mole fraction of every material slot and the
//! numerical resolutions of the simulation. Layer 0 is the wrap-around layer which closes a
//! period, so the first and last layers should match for repeated structures to be
//! continuous.
//!
//! All quantities derived from a stack are recomputed in full from the stack, there is no
//! incremental update.

mod rasterize;

pub use rasterize::{BandProfile, PositionGrid};
pub(crate) use rasterize::nonparabolic_mass;

use crate::{
    alloy::{mix, slot_index, BandStructure, StrainCorrector, StrainSummary, Substrate,
        NUMBER_OF_LABELS, NUMBER_OF_SLOTS},
    device::info_desk::MaterialProvider,
    error::ConfigurationError,
};
use serde::Deserialize;

/// A single epitaxial layer
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Layer {
    /// Width in angstrom
    pub width: f64,
    /// Material label, from 1 to 4
    pub material: usize,
    #[serde(default)]
    pub barrier: bool,
    /// Whether the layer belongs to an active region rather than an injector
    #[serde(default)]
    pub active: bool,
    /// Volume doping in units of 1e17 cm^-3
    #[serde(default)]
    pub doping: f64,
    #[serde(default)]
    pub divider: bool,
}

impl Layer {
    pub fn well(width: f64, material: usize) -> Self {
        Self {
            width,
            material,
            barrier: false,
            active: false,
            doping: 0.,
            divider: false,
        }
    }

    pub fn barrier(width: f64, material: usize) -> Self {
        Self {
            barrier: true,
            ..Self::well(width, material)
        }
    }

    /// Marks the layer as part of an active region
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn with_doping(mut self, doping: f64) -> Self {
        self.doping = doping;
        self
    }

    /// The material slot of the layer, or `None` when the label is out of range
    pub fn slot(&self) -> Option<usize> {
        (1..=NUMBER_OF_LABELS)
            .contains(&self.material)
            .then(|| slot_index(self.material, self.barrier))
    }
}

fn default_mole_fractions() -> [f64; NUMBER_OF_SLOTS] {
    [0.53, 0.52, 0.53, 0.52, 0.53, 0.52, 0.53, 0.52]
}

fn default_xres() -> f64 {
    0.5
}

fn default_vert_res() -> f64 {
    0.5
}

fn default_repeats() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_substrate() -> Substrate {
    Substrate::InP
}

/// A complete heterostructure description
#[derive(Clone, Debug, Deserialize)]
pub struct QclLayers {
    pub layers: Vec<Layer>,
    #[serde(default = "default_substrate")]
    pub substrate: Substrate,
    #[serde(default = "default_mole_fractions")]
    pub mole_fractions: [f64; NUMBER_OF_SLOTS],
    /// Position resolution in angstrom
    #[serde(default = "default_xres")]
    pub xres: f64,
    /// Energy resolution of the eigen solver sweep in meV
    #[serde(default = "default_vert_res")]
    pub vert_res: f64,
    /// Applied field in kV/cm
    #[serde(default)]
    pub field: f64,
    /// The number of periods simulated
    #[serde(default = "default_repeats")]
    pub repeats: usize,
    /// Split basis modules where an injector gives way to an active region
    #[serde(default = "default_true")]
    pub split_injector_to_active: bool,
    /// Split basis modules where an active region gives way to an injector
    #[serde(default = "default_true")]
    pub split_active_to_injector: bool,
    #[serde(default)]
    pub description: String,
}

impl Default for QclLayers {
    fn default() -> Self {
        Self {
            layers: vec![Layer::well(1., 1), Layer::well(1., 1)],
            substrate: default_substrate(),
            mole_fractions: default_mole_fractions(),
            xres: default_xres(),
            vert_res: default_vert_res(),
            field: 0.,
            repeats: default_repeats(),
            split_injector_to_active: true,
            split_active_to_injector: true,
            description: String::new(),
        }
    }
}

impl QclLayers {
    pub fn new(layers: Vec<Layer>, substrate: Substrate) -> Self {
        Self {
            layers,
            substrate,
            ..Self::default()
        }
    }

    pub fn with_xres(mut self, xres: f64) -> Self {
        self.xres = xres;
        self
    }

    pub fn with_field(mut self, field: f64) -> Self {
        self.field = field;
        self
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_vert_res(mut self, vert_res: f64) -> Self {
        self.vert_res = vert_res;
        self
    }

    pub fn with_mole_fractions(mut self, mole_fractions: [f64; NUMBER_OF_SLOTS]) -> Self {
        self.mole_fractions = mole_fractions;
        self
    }

    /// Checks every layer refers to a valid material label
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.layers
            .iter()
            .enumerate()
            .find(|(_, layer)| layer.slot().is_none())
            .map_or(Ok(()), |(index, layer)| {
                Err(ConfigurationError::InvalidMaterialSlot {
                    layer: index,
                    slot: layer.material,
                })
            })
    }

    /// Mixes the alloys and applies the strain corrections for this stack
    pub fn band_structure<P: MaterialProvider>(
        &self,
        provider: &P,
    ) -> Result<BandStructure, ConfigurationError> {
        let alloys = mix(provider, self.substrate, &self.mole_fractions)?;
        StrainCorrector::new(provider).correct(&alloys)
    }

    pub fn strain_summary(&self, bands: &BandStructure) -> StrainSummary {
        bands.summarize(&self.layers, &self.rounded_widths())
    }

    /// Expands the stack onto a uniform grid of spacing `xres`
    pub fn rasterize(&self, bands: &BandStructure) -> Result<PositionGrid, ConfigurationError> {
        self.validate()?;
        Ok(PositionGrid::from_layers(self, bands))
    }

    /// The number of grid cells of each layer
    pub fn layer_cells(&self) -> Vec<usize> {
        self.layers
            .iter()
            .map(|layer| cascade_mesher::cells_in_width(layer.width, self.xres))
            .collect()
    }

    /// Layer widths rounded onto the grid
    pub fn rounded_widths(&self) -> Vec<f64> {
        self.layer_cells()
            .into_iter()
            .map(|cells| cells as f64 * self.xres)
            .collect()
    }
}
