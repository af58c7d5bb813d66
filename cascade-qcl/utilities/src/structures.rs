use cascade_qcl::{
    alloy::Substrate,
    layers::{Layer, QclLayers},
    strata::{Stratum, StrataMaterial, Waveguide},
};
use rand::{thread_rng, Rng};

/// A single lattice matched InGaAs well between InAlAs barriers
pub fn single_well(well: f64, barrier: f64) -> QclLayers {
    QclLayers::new(
        vec![
            Layer::barrier(barrier, 1),
            Layer::well(well, 1),
            Layer::barrier(barrier, 1),
        ],
        Substrate::InP,
    )
    .with_xres(0.5)
    .with_vert_res(0.5)
    .with_repeats(1)
}

/// A period of a simple laser: a coupled double well active region followed by an injector
pub fn two_well_period(field: f64) -> QclLayers {
    QclLayers::new(
        vec![
            Layer::barrier(40., 1),
            Layer::well(50., 1).active(),
            Layer::barrier(15., 1).active(),
            Layer::well(35., 1).active(),
            Layer::barrier(40., 1),
            Layer::well(30., 1).with_doping(1.),
            Layer::barrier(40., 1),
        ],
        Substrate::InP,
    )
    .with_xres(0.5)
    .with_vert_res(1.)
    .with_field(field)
}

/// A random stack of alternating wells and barriers on InP
pub fn random_stack(count: usize) -> QclLayers {
    let mut rng = thread_rng();
    let layers = (0..count)
        .map(|i| {
            let width = rng.gen_range(5..60) as f64;
            if i % 2 == 0 {
                Layer::barrier(width, rng.gen_range(1..=4))
            } else {
                Layer::well(width, rng.gen_range(1..=4))
            }
        })
        .collect();
    QclLayers::new(layers, Substrate::InP).with_repeats(rng.gen_range(1..4))
}

/// A substrate, cladding and core waveguide with an air top
pub fn ridge_waveguide(core_thickness: f64) -> Waveguide {
    Waveguide::new(
        vec![
            Stratum::new(StrataMaterial::Air, 1.),
            Stratum::new(StrataMaterial::InP, 3.).with_doping(0.5),
            Stratum::new(StrataMaterial::InGaAs, 0.3).with_composition(0.53),
            Stratum::new(StrataMaterial::ActiveCore, core_thickness),
            Stratum::new(StrataMaterial::InGaAs, 0.3).with_composition(0.53),
            Stratum::new(StrataMaterial::InP, 3.).with_doping(0.5),
        ],
        4.7,
    )
    .with_core_index(3.35)
}
