use crate::{Assignment, Mesh1d};
use nalgebra::{Point1, RealField, Vector1};

/// The number of cells of size `cell_size` which best fill `width`
///
/// Exact halves round to the nearest even count, so that widths specified on a half-cell
/// grid are not systematically widened. Non-finite or non-positive widths span no cells.
pub fn cells_in_width<T>(width: T, cell_size: T) -> usize
where
    T: Copy + RealField,
{
    let ratio: f64 = match (width / cell_size).to_subset() {
        Some(ratio) => ratio,
        None => return 0,
    };
    if !ratio.is_finite() || ratio <= 0. {
        return 0;
    }
    ratio.round_ties_even() as usize
}

/// Repeats `values[seed..]` so the sequence covers `repeats` periods
///
/// The first `seed` entries describe a wrap-around region which is only present once.
pub fn tile_periodic<V: Clone>(values: &[V], seed: usize, repeats: usize) -> Vec<V> {
    let seed = seed.min(values.len());
    let period = &values[seed..];
    let mut tiled = Vec::with_capacity(values.len() + period.len() * repeats.saturating_sub(1));
    tiled.extend_from_slice(values);
    for _ in 1..repeats.max(1) {
        tiled.extend_from_slice(period);
    }
    tiled
}

fn vertices_from_origin<T>(origin: T, cell_size: T, num_vertices: usize) -> Vec<Point1<T>>
where
    T: Copy + RealField,
{
    (0..num_vertices)
        .map(|i| {
            let i_as_t = T::from_usize(i).expect("Must be able to fit usize in T");
            Point1::new(origin + i_as_t * cell_size)
        })
        .collect()
}

/// Builds a mesh from an ordered list of regions, each spanning `cells_per_region[i]` cells
///
/// Regions of zero cells contribute no vertices but keep their index, so vertex assignments
/// always refer back to the position of the region in the source description.
pub fn create_line_segment_mesh_1d_from_regions<T>(
    cell_size: T,
    cells_per_region: &[usize],
    left: &Vector1<T>,
) -> Mesh1d<T>
where
    T: Copy + RealField,
{
    let num_vertices = cells_per_region.iter().sum();
    let assignments = cells_per_region
        .iter()
        .enumerate()
        .flat_map(|(region, &cells)| std::iter::repeat(Assignment::new(region, 0)).take(cells))
        .collect();

    Mesh1d::from_vertices_and_assignments(
        left.x,
        cell_size,
        vertices_from_origin(left.x, cell_size, num_vertices),
        assignments,
    )
}

impl<T> Mesh1d<T>
where
    T: Copy + RealField,
{
    /// Extends the mesh to `repeats` periods
    ///
    /// The vertices of the first region act as the periodic seed and are not repeated, every
    /// other region is appended `repeats - 1` more times with an incremented period index.
    pub fn tile(&self, repeats: usize) -> Mesh1d<T> {
        let seed = self.seed_len();
        let period = &self.assignments()[seed..];

        let mut assignments = self.assignments().to_vec();
        for repeat in 1..repeats.max(1) {
            assignments.extend(
                period
                    .iter()
                    .map(|assignment| Assignment::new(assignment.region, repeat)),
            );
        }

        Mesh1d::from_vertices_and_assignments(
            self.origin(),
            self.cell_size(),
            vertices_from_origin(self.origin(), self.cell_size(), assignments.len()),
            assignments,
        )
    }
}
