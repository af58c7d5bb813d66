pub mod structures;

use cascade_qcl::layers::{BandProfile, PositionGrid};
use ndarray::Array1;
use rand::{thread_rng, Rng};

/// A parabolic band square well grid of depth `depth` eV and width `width` angstrom, with
/// `barrier` angstrom of barrier either side
pub fn square_well_grid(depth: f64, width: f64, barrier: f64, xres: f64) -> PositionGrid {
    let barrier_cells = (barrier / xres).round() as usize;
    let well_cells = (width / xres).round() as usize;
    let vc: Array1<f64> = (0..2 * barrier_cells + well_cells)
        .map(|i| {
            if (barrier_cells..barrier_cells + well_cells).contains(&i) {
                0.
            } else {
                depth
            }
        })
        .collect();
    let mass = 0.067;
    let band = BandProfile {
        eg: 1e4,
        mc: mass,
        eso: 0.,
        ep: 0.,
        f: 0.5 / mass - 0.5,
    };
    PositionGrid::from_potential(xres, vc, band, depth / 2.)
}

/// A square well potential with small random fluctuations on every cell
pub fn rough_well_grid(depth: f64, width: f64, barrier: f64, xres: f64) -> PositionGrid {
    let mut rng = thread_rng();
    let mut grid = square_well_grid(depth, width, barrier, xres);
    grid.vc
        .iter_mut()
        .for_each(|v| *v += rng.gen_range(-1e-4..1e-4));
    grid
}
