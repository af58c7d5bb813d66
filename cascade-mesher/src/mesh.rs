use crate::Assignment;
use nalgebra::{Point1, RealField};

/// A uniform one dimensional mesh
///
/// Vertices are spaced by `cell_size` starting from `origin`, and each vertex is tagged with
/// the region it belongs to.
#[derive(Clone, Debug)]
pub struct Mesh1d<T: RealField> {
    origin: T,
    cell_size: T,
    vertices: Vec<Point1<T>>,
    assignments: Vec<Assignment>,
}

impl<T> Mesh1d<T>
where
    T: Copy + RealField,
{
    pub fn from_vertices_and_assignments(
        origin: T,
        cell_size: T,
        vertices: Vec<Point1<T>>,
        assignments: Vec<Assignment>,
    ) -> Self {
        debug_assert_eq!(vertices.len(), assignments.len());
        Self {
            origin,
            cell_size,
            vertices,
            assignments,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn origin(&self) -> T {
        self.origin
    }

    pub fn cell_size(&self) -> T {
        self.cell_size
    }

    pub fn vertices(&self) -> &[Point1<T>] {
        &self.vertices
    }

    pub fn vertices_owned(self) -> Vec<Point1<T>> {
        self.vertices
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// The coordinate of each vertex
    pub fn positions(&self) -> impl Iterator<Item = T> + '_ {
        self.vertices.iter().map(|vertex| vertex.x)
    }

    /// The number of leading vertices assigned to the first region
    pub fn seed_len(&self) -> usize {
        self.assignments
            .iter()
            .take_while(|assignment| assignment.region == 0 && assignment.period == 0)
            .count()
    }
}
