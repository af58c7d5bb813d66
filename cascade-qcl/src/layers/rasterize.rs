//! Expansion of a sparse layer list onto a uniform position grid

use super::QclLayers;
use crate::{alloy::BandStructure, constants::FIELD_TO_EV_PER_ANGSTROM};
use cascade_mesher::{create_line_segment_mesh_1d_from_regions, tile_periodic, Mesh1d};
use nalgebra::Vector1;
use ndarray::Array1;

/// Per-cell description of a layer stack
///
/// Every array has one entry per grid cell. The band edge potentials include the linear tilt
/// of the applied field.
#[derive(Clone, Debug)]
pub struct PositionGrid {
    /// Grid spacing in angstrom
    pub xres: f64,
    /// Applied field in kV/cm
    pub field: f64,
    /// Cell positions in angstrom
    pub points: Array1<f64>,
    pub barriers: Vec<bool>,
    /// Active region flags, dilated by a cell either side of each active layer
    pub active: Vec<bool>,
    /// Material label of each cell, zero where no label applies
    pub materials: Vec<usize>,
    pub dopings: Array1<f64>,
    /// Index of the source layer of each cell
    pub layer_index: Vec<usize>,
    /// Conduction band edge at Gamma
    pub vc: Array1<f64>,
    pub vx: Array1<f64>,
    pub vl: Array1<f64>,
    pub vlh: Array1<f64>,
    pub vso: Array1<f64>,
    /// Conduction to light-hole gap
    pub eg: Array1<f64>,
    /// Band edge effective mass
    pub mc: Array1<f64>,
    pub eso: Array1<f64>,
    pub ep: Array1<f64>,
    pub f: Array1<f64>,
    /// Number of cells spanned by each layer
    pub layer_cells: Vec<usize>,
    /// Layer widths rounded onto the grid
    pub layer_widths: Vec<f64>,
}

/// The band profiles needed to build a grid from a bare potential
#[derive(Clone, Copy, Debug)]
pub struct BandProfile {
    pub eg: f64,
    pub mc: f64,
    pub eso: f64,
    pub ep: f64,
    pub f: f64,
}

impl PositionGrid {
    pub(crate) fn from_layers(layers: &QclLayers, bands: &BandStructure) -> Self {
        let xres = layers.xres;
        let layer_cells = layers.layer_cells();
        let layer_widths = layers.rounded_widths();

        let mesh: Mesh1d<f64> =
            create_line_segment_mesh_1d_from_regions(xres, &layer_cells, &Vector1::new(0.));
        let seed = mesh.seed_len();
        let single_period = mesh.num_nodes();

        // The active flag is dilated within a single period, before tiling
        let mut active = vec![false; single_period];
        let mut start = 0;
        for (layer, &cells) in layers.layers.iter().zip(layer_cells.iter()) {
            let end = start + cells;
            if layer.active {
                let lower = start.saturating_sub(1);
                let upper = (end + 1).min(single_period);
                active[lower..upper].iter_mut().for_each(|flag| *flag = true);
            }
            start = end;
        }
        let active = tile_periodic(&active, seed, layers.repeats);

        let mesh = mesh.tile(layers.repeats);
        let layer_index: Vec<usize> = mesh.assignments().iter().map(|a| a.region).collect();
        let points: Array1<f64> = mesh.positions().collect();

        let barriers: Vec<bool> = layer_index.iter().map(|&i| layers.layers[i].barrier).collect();
        let materials: Vec<usize> = layer_index
            .iter()
            .map(|&i| layers.layers[i].slot().map_or(0, |_| layers.layers[i].material))
            .collect();
        let dopings: Array1<f64> = layer_index.iter().map(|&i| layers.layers[i].doping).collect();
        let slots: Vec<Option<usize>> = layer_index.iter().map(|&i| layers.layers[i].slot()).collect();

        let tilt = layers.field * FIELD_TO_EV_PER_ANGSTROM;
        let edge = |values: &[f64; crate::alloy::NUMBER_OF_SLOTS]| -> Array1<f64> {
            slots
                .iter()
                .zip(points.iter())
                .map(|(slot, x)| slot.map_or(0., |slot| values[slot] - x * tilt))
                .collect()
        };
        let profile = |values: &[f64; crate::alloy::NUMBER_OF_SLOTS]| -> Array1<f64> {
            slots
                .iter()
                .map(|slot| slot.map_or(0., |slot| values[slot]))
                .collect()
        };

        tracing::trace!(
            "Rasterized {} layers onto {} cells",
            layers.layers.len(),
            points.len()
        );

        Self {
            xres,
            field: layers.field,
            vc: edge(&bands.ec_gamma),
            vx: edge(&bands.ec_x),
            vl: edge(&bands.ec_l),
            vlh: edge(&bands.ev_lh),
            vso: edge(&bands.ev_so),
            eg: profile(&bands.eg_lh),
            mc: profile(&bands.me),
            eso: profile(&bands.eso),
            ep: profile(&bands.ep),
            f: profile(&bands.f),
            points,
            barriers,
            active,
            materials,
            dopings,
            layer_index,
            layer_cells,
            layer_widths,
        }
    }

    /// Builds a grid for an arbitrary conduction band potential with uniform band parameters
    ///
    /// Cells where the potential exceeds `barrier_threshold` are flagged as barriers.
    pub fn from_potential(
        xres: f64,
        vc: Array1<f64>,
        band: BandProfile,
        barrier_threshold: f64,
    ) -> Self {
        let n = vc.len();
        let barriers = vc.iter().map(|&v| v > barrier_threshold).collect();
        Self {
            xres,
            field: 0.,
            points: (0..n).map(|i| i as f64 * xres).collect(),
            barriers,
            active: vec![false; n],
            materials: vec![1; n],
            dopings: Array1::zeros(n),
            layer_index: vec![0; n],
            vx: vc.clone(),
            vl: vc.clone(),
            vlh: vc.mapv(|v| v - band.eg),
            vso: vc.mapv(|v| v - band.eg - band.eso),
            eg: Array1::from_elem(n, band.eg),
            mc: Array1::from_elem(n, band.mc),
            eso: Array1::from_elem(n, band.eso),
            ep: Array1::from_elem(n, band.ep),
            f: Array1::from_elem(n, band.f),
            vc,
            layer_cells: vec![n],
            layer_widths: vec![n as f64 * xres],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The conduction band in the active regions, NaN elsewhere
    pub fn active_profile(&self) -> Array1<f64> {
        self.vc
            .iter()
            .zip(self.active.iter())
            .map(|(&v, &active)| if active { v } else { f64::NAN })
            .collect()
    }

    /// Nonparabolic effective mass of every cell at `energy`, in units of the free electron mass
    pub fn effective_mass(&self, energy: f64) -> Array1<f64> {
        let mut mass = Array1::zeros(self.len());
        ndarray::Zip::from(&mut mass)
            .and(&self.vc)
            .and(&self.eg)
            .and(&self.eso)
            .and(&self.ep)
            .and(&self.f)
            .for_each(|m, &vc, &eg, &eso, &ep, &f| {
                *m = nonparabolic_mass(energy - vc, eg, eso, ep, f);
            });
        mass
    }
}

/// The Kane model mass, in units of the free electron mass, at kinetic energy `kinetic`
pub(crate) fn nonparabolic_mass(kinetic: f64, eg: f64, eso: f64, ep: f64, f: f64) -> f64 {
    1. / (1. + 2. * f + ep / 3. * (2. / (kinetic + eg) + 1. / (kinetic + eg + eso)))
}
