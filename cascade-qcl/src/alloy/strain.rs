//! Strain and temperature corrections to the mixed band parameters
//!
//! Layers are grown pseudomorphically on the substrate, so every slot takes the substrate's
//! in-plane lattice constant. The resulting strain shifts the band edges through the
//! Pikus-Bir and Van de Walle deformation potentials, and the Varshni temperature shift of
//! the gap is shared between the conduction and valence bands in proportion to the band
//! offsets of each well/barrier pair.

use super::{slot_index, MixedAlloys, NUMBER_OF_LABELS, NUMBER_OF_SLOTS};
use crate::{
    constants::BAND_BASELINE, device::info_desk::MaterialProvider, error::ConfigurationError,
    layers::Layer,
};

type Slots = [f64; NUMBER_OF_SLOTS];

/// Strain corrected band edges and masses of every material slot
///
/// All energies are in eV, conduction edges are referenced to the Gamma edge of lattice
/// matched In0.53Ga0.47As.
#[derive(Clone, Debug)]
pub struct BandStructure {
    /// The in-plane lattice constant, fixed by the substrate
    pub a_parallel: f64,
    pub eps_parallel: Slots,
    pub a_perp: Slots,
    pub eps_perp: Slots,
    /// Hydrostatic shift of the conduction band
    pub pec: Slots,
    /// Hydrostatic shift of the valence band
    pub pe: Slots,
    /// Shear shift of the valence band
    pub qe: Slots,
    /// Varshni shift of the gap at the table temperature
    pub varshni: Slots,
    /// Strained spin-orbit splitting
    pub eso: Slots,
    /// Conduction to light-hole gap
    pub eg_lh: Slots,
    /// Conduction to split-off gap
    pub eg_so: Slots,
    /// Band edge effective mass in units of the free electron mass
    pub me: Slots,
    pub ec_gamma: Slots,
    pub ec_l: Slots,
    pub ec_x: Slots,
    pub ev_lh: Slots,
    pub ev_so: Slots,
    pub ep: Slots,
    pub f: Slots,
    pub epsrho: Slots,
    pub hw_lo: Slots,
}

/// Strain quantities which depend on the layer stack rather than the slots alone
#[derive(Clone, Debug, PartialEq)]
pub struct StrainSummary {
    /// Total width of each slot over the structure, the seed layer excluded
    pub material_width: Slots,
    /// Width weighted mean of the perpendicular strain, in percent
    pub net_strain: f64,
    /// Monolayer thickness of each layer
    pub monolayer_thickness: Vec<f64>,
}

/// Applies strain and temperature corrections to a set of mixed alloys
pub struct StrainCorrector<'a, P> {
    provider: &'a P,
}

impl<'a, P: MaterialProvider> StrainCorrector<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    #[tracing::instrument(name = "Strain correction", level = "debug", skip_all)]
    pub fn correct(&self, alloys: &MixedAlloys) -> Result<BandStructure, ConfigurationError> {
        let temperature = self.provider.temperature();
        let a_parallel = self
            .provider
            .binary(alloys.substrate.material())?
            .alc(temperature);

        let alc = alloys.map(|p| p.alc);
        let c11 = alloys.map(|p| p.c11);
        let c12 = alloys.map(|p| p.c12);

        let eps_parallel = each(|n| a_parallel / alc[n] - 1.);
        let a_perp = each(|n| alc[n] * (1. - 2. * c12[n] / c11[n] * eps_parallel[n]));
        let eps_perp = each(|n| a_perp[n] / alc[n] - 1.);
        let hydrostatic = each(|n| 2. * eps_parallel[n] + eps_perp[n]);

        let slots = &alloys.slots;
        let pec = each(|n| hydrostatic[n] * slots[n].ac_gamma);
        let pe = each(|n| hydrostatic[n] * slots[n].av);
        let qe = each(|n| -slots[n].b * (c11[n] + 2. * c12[n]) / c11[n] * eps_parallel[n]);
        let varshni = each(|n| {
            -slots[n].alpha_gamma * temperature.powi(2) / (temperature + slots[n].beta_gamma)
        });

        let mut ec_gamma =
            each(|n| slots[n].valence_band_offset + slots[n].eg_gamma + pec[n] - BAND_BASELINE);
        let mut ec_l = each(|n| {
            slots[n].valence_band_offset + slots[n].eg_l + hydrostatic[n] * (slots[n].ac_l + slots[n].av)
                - BAND_BASELINE
        });
        let mut ec_x = each(|n| {
            slots[n].valence_band_offset
                + slots[n].eg_x
                + hydrostatic[n] * (slots[n].ac_x + slots[n].av)
                + 2. / 3. * slots[n].xi_x * (eps_perp[n] - eps_parallel[n])
                - BAND_BASELINE
        });

        let eso = each(|n| {
            let dso = slots[n].spin_orbit_splitting;
            (9. * qe[n].powi(2) + 2. * qe[n] * dso + dso.powi(2)).sqrt()
        });
        let eg_lh = each(|n| {
            slots[n].eg_gamma + pec[n] + pe[n]
                - 0.5 * (qe[n] - slots[n].spin_orbit_splitting + eso[n])
        });
        let eg_so = each(|n| {
            slots[n].eg_gamma + pec[n] + pe[n]
                - 0.5 * (qe[n] - slots[n].spin_orbit_splitting - eso[n])
        });

        // The Varshni shift is split between the bands by the fractional conduction band
        // offset of each well/barrier pair, and acts on the satellite valleys as on Gamma
        let mut percent_cb = [0.; NUMBER_OF_SLOTS];
        for label in 1..=NUMBER_OF_LABELS {
            let (well, barrier) = (slot_index(label, false), slot_index(label, true));
            let cb_offset = ec_gamma[barrier] - ec_gamma[well];
            let vb_offset =
                (ec_gamma[barrier] - eg_lh[barrier]) - (ec_gamma[well] - eg_lh[well]);
            let total = cb_offset + vb_offset;
            let fraction = if total == 0. { 0.5 } else { cb_offset / total };
            percent_cb[well] = fraction;
            percent_cb[barrier] = fraction;
        }

        for n in 0..NUMBER_OF_SLOTS {
            ec_gamma[n] += percent_cb[n] * varshni[n];
            ec_l[n] += percent_cb[n] * varshni[n];
            ec_x[n] += percent_cb[n] * varshni[n];
        }
        let ev_lh = each(|n| ec_gamma[n] - eg_lh[n] - (1. - percent_cb[n]) * varshni[n]);
        let ev_so = each(|n| ec_gamma[n] - eg_so[n] - (1. - percent_cb[n]) * varshni[n]);

        let me = each(|n| {
            1. / ((1. + 2. * slots[n].f)
                + slots[n].ep / eg_lh[n] * (eg_lh[n] + 2. / 3. * eso[n]) / (eg_lh[n] + eso[n]))
        });

        tracing::trace!("In-plane lattice constant {a_parallel}");

        Ok(BandStructure {
            a_parallel,
            eps_parallel,
            a_perp,
            eps_perp,
            pec,
            pe,
            qe,
            varshni,
            eso,
            eg_lh,
            eg_so,
            me,
            ec_gamma,
            ec_l,
            ec_x,
            ev_lh,
            ev_so,
            ep: alloys.map(|p| p.ep),
            f: alloys.map(|p| p.f),
            epsrho: alloys.epsrho,
            hw_lo: alloys.map(|p| p.hw_lo),
        })
    }
}

impl BandStructure {
    /// Summarises the strain of a layer stack built from these slots
    ///
    /// `widths` are the layer widths as rasterized, one per layer.
    pub fn summarize(&self, layers: &[Layer], widths: &[f64]) -> StrainSummary {
        let mut material_width = [0.; NUMBER_OF_SLOTS];
        for (layer, width) in layers.iter().zip(widths).skip(1) {
            if let Some(slot) = layer.slot() {
                material_width[slot] += width;
            }
        }
        let total: f64 = material_width.iter().sum();
        let net_strain = if total == 0. {
            0.
        } else {
            100. * material_width
                .iter()
                .zip(self.eps_perp.iter())
                .map(|(width, strain)| width * strain)
                .sum::<f64>()
                / total
        };
        let monolayer_thickness = layers
            .iter()
            .map(|layer| layer.slot().map_or(0., |slot| self.a_perp[slot] / 2.))
            .collect();

        StrainSummary {
            material_width,
            net_strain,
            monolayer_thickness,
        }
    }
}

fn each(f: impl Fn(usize) -> f64) -> Slots {
    let mut values = [0.; NUMBER_OF_SLOTS];
    for (n, value) in values.iter_mut().enumerate() {
        *value = f(n);
    }
    values
}

#[cfg(test)]
mod test {
    use super::StrainCorrector;
    use crate::{
        alloy::{mix, Substrate, NUMBER_OF_SLOTS},
        constants::BAND_BASELINE,
        device::info_desk::MaterialTable,
        layers::{Layer, QclLayers},
    };
    use approx::assert_relative_eq;

    #[test]
    fn lattice_matched_slots_are_unstrained() {
        // Pure GaAs on a GaAs substrate is lattice matched in every slot
        let table = MaterialTable::default();
        let alloys = mix(&table, Substrate::GaAs, &[0.; NUMBER_OF_SLOTS]).unwrap();
        let bands = StrainCorrector::new(&table).correct(&alloys).unwrap();
        for n in 0..NUMBER_OF_SLOTS {
            assert_relative_eq!(bands.eps_parallel[n], 0.);
            assert_relative_eq!(bands.eps_perp[n], 0.);
            assert_relative_eq!(bands.pec[n], 0.);
            assert_relative_eq!(bands.pe[n], 0.);
            assert_relative_eq!(bands.qe[n], 0.);
            assert_relative_eq!(bands.eso[n], alloys.slots[n].spin_orbit_splitting);
        }
    }

    #[test]
    fn degenerate_offsets_split_the_temperature_shift_evenly() {
        let table = MaterialTable::default();
        let alloys = mix(&table, Substrate::GaAs, &[0.; NUMBER_OF_SLOTS]).unwrap();
        let bands = StrainCorrector::new(&table).correct(&alloys).unwrap();
        let gaas = &alloys.slots[0];
        let expected = gaas.valence_band_offset + gaas.eg_gamma - BAND_BASELINE
            + 0.5 * bands.varshni[0];
        assert_relative_eq!(bands.ec_gamma[0], expected, epsilon = 1e-12);
        assert!(bands.ec_gamma.iter().all(|e| e.is_finite()));
    }

    #[test]
    fn lattice_matched_ingaas_takes_its_share_of_the_temperature_shift() {
        let table = MaterialTable::default();
        let alloys = mix(&table, Substrate::InP, &[0.53, 0.52, 0.53, 0.52, 0.53, 0.52, 0.53, 0.52])
            .unwrap();
        let bands = StrainCorrector::new(&table).correct(&alloys).unwrap();

        // Band edges before the Varshni shift, from the well and barrier of the first pair
        let unshifted = |n: usize| {
            alloys.slots[n].valence_band_offset + alloys.slots[n].eg_gamma + bands.pec[n]
                - BAND_BASELINE
        };
        let cb_offset = unshifted(1) - unshifted(0);
        let vb_offset = (unshifted(1) - bands.eg_lh[1]) - (unshifted(0) - bands.eg_lh[0]);
        let fraction = cb_offset / (cb_offset + vb_offset);
        // The light hole edges of the pair are staggered, so the fraction exceeds one
        assert!(fraction > 1.5 && fraction < 1.7, "fraction {fraction}");

        assert_relative_eq!(
            bands.ec_gamma[0],
            unshifted(0) + fraction * bands.varshni[0],
            epsilon = 1e-12
        );
        assert_relative_eq!(
            bands.ev_lh[0],
            bands.ec_gamma[0] - bands.eg_lh[0] - (1. - fraction) * bands.varshni[0],
            epsilon = 1e-12
        );
        assert_relative_eq!(bands.ec_gamma[0], -0.1275, epsilon = 1e-3);

        // The barrier conduction offset of InGaAs/AlInAs is roughly half an eV
        let offset = bands.ec_gamma[1] - bands.ec_gamma[0];
        assert!(offset > 0.4 && offset < 0.6, "offset {offset}");
        assert!(bands.me[0] > 0.03 && bands.me[0] < 0.06);
    }

    #[test]
    fn net_strain_skips_the_seed_layer_and_handles_empty_stacks() {
        let table = MaterialTable::default();
        let alloys = mix(&table, Substrate::InP, &[0.6; NUMBER_OF_SLOTS]).unwrap();
        let bands = StrainCorrector::new(&table).correct(&alloys).unwrap();

        let seed_only = vec![Layer::well(40., 1)];
        let summary = bands.summarize(&seed_only, &[40.]);
        assert_relative_eq!(summary.net_strain, 0.);
        assert_eq!(summary.monolayer_thickness.len(), 1);

        let layers = vec![Layer::well(40., 1), Layer::barrier(20., 1), Layer::well(40., 1)];
        let summary = bands.summarize(&layers, &[40., 20., 40.]);
        assert_relative_eq!(summary.material_width[0], 40.);
        assert_relative_eq!(summary.material_width[1], 20.);
        let expected = 100. * (40. * bands.eps_perp[0] + 20. * bands.eps_perp[1]) / 60.;
        assert_relative_eq!(summary.net_strain, expected, epsilon = 1e-12);
        assert_relative_eq!(summary.monolayer_thickness[1], bands.a_perp[1] / 2.);
    }

    #[test]
    fn material_widths_follow_the_grid() {
        let table = MaterialTable::default();
        let layers = QclLayers::new(
            vec![
                Layer::well(40., 1),
                Layer::barrier(20.4, 1),
                Layer::well(40.3, 1),
            ],
            Substrate::InP,
        )
        .with_xres(1.);
        let bands = layers.band_structure(&table).unwrap();
        let summary = layers.strain_summary(&bands);
        assert_relative_eq!(summary.material_width[0], 40.);
        assert_relative_eq!(summary.material_width[1], 20.);
        let expected = 100. * (40. * bands.eps_perp[0] + 20. * bands.eps_perp[1]) / 60.;
        assert_relative_eq!(summary.net_strain, expected, epsilon = 1e-12);
    }
}
