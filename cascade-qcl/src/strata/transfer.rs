//! Transfer matrices of a planar stack of strata
//!
//! Each stratum propagates the tangential field pair `(U, V)` with a 2x2 characteristic
//! matrix. A guided mode is a complex propagation constant `beta` for which the fields decay
//! into both outermost strata, the zero of the dispersion function `chi`.

use crate::constants::FREE_SPACE_IMPEDANCE;
use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;

/// Transverse wavevectors and admittances of every stratum at a trial `beta`
struct Admittances {
    alpha: Vec<Complex64>,
    gamma: Vec<Complex64>,
}

impl Admittances {
    fn new(indices: &[Complex64], beta: Complex64) -> Self {
        let mut alpha: Vec<Complex64> = indices
            .iter()
            .map(|n| (n * n - beta * beta).sqrt())
            .collect();
        // The outermost strata must carry decaying fields
        for end in [0, alpha.len().saturating_sub(1)] {
            if let Some(a) = alpha.get_mut(end) {
                if a.im < 0. {
                    *a = a.conj();
                }
            }
        }
        let gamma = alpha
            .iter()
            .zip(indices.iter())
            .map(|(a, n)| FREE_SPACE_IMPEDANCE * *a / (n * n))
            .collect();
        Self { alpha, gamma }
    }
}

fn characteristic_matrix(phi: Complex64, gamma: Complex64) -> Matrix2<Complex64> {
    let i = Complex64::i();
    Matrix2::new(
        phi.cos(),
        -i / gamma * phi.sin(),
        -i * gamma * phi.sin(),
        phi.cos(),
    )
}

/// A stack of strata at a single free space wavenumber
pub(crate) struct TransferStack<'a> {
    indices: &'a [Complex64],
    /// Rounded thicknesses in micron
    thicknesses: &'a [f64],
    /// Free space wavenumber in 1 / micron
    wavenumber: f64,
}

impl<'a> TransferStack<'a> {
    pub(crate) fn new(indices: &'a [Complex64], thicknesses: &'a [f64], wavelength: f64) -> Self {
        Self {
            indices,
            thicknesses,
            wavenumber: 2. * std::f64::consts::PI / wavelength,
        }
    }

    /// The dispersion function, zero at a guided mode
    pub(crate) fn chi(&self, beta: Complex64) -> Complex64 {
        let admittances = Admittances::new(self.indices, beta);
        let m = admittances
            .alpha
            .iter()
            .zip(admittances.gamma.iter())
            .zip(self.thicknesses.iter())
            .fold(Matrix2::<Complex64>::identity(), |m, ((alpha, gamma), thickness)| {
                m * characteristic_matrix(self.wavenumber * thickness * *alpha, *gamma)
            });

        let substrate = admittances.gamma[0];
        let cover = admittances.gamma[admittances.gamma.len() - 1];
        cover * m[(0, 0)] + cover * substrate * m[(0, 1)] + m[(1, 0)] + substrate * m[(1, 1)]
    }

    /// The normalised intensity profile of the mode `beta` on a grid of spacing `xres`
    ///
    /// `cells` holds the number of grid cells of each stratum. The field is propagated from
    /// the last stratum back towards the first, and the outermost strata carry the
    /// exponential tails.
    pub(crate) fn intensity(&self, beta: Complex64, cells: &[usize], xres: f64) -> Vec<f64> {
        let indices: Vec<Complex64> = self.indices.iter().rev().copied().collect();
        let thicknesses: Vec<f64> = self.thicknesses.iter().rev().copied().collect();
        let cells: Vec<usize> = cells.iter().rev().copied().collect();
        let admittances = Admittances::new(&indices, beta);
        let (alpha, gamma) = (&admittances.alpha, &admittances.gamma);
        let k = self.wavenumber;
        let i = Complex64::i();
        let last = cells.len().saturating_sub(1);
        let cover = gamma[gamma.len() - 1];

        let mut offsets = vec![0];
        offsets.extend(cells.iter().scan(0, |total, &c| {
            *total += c;
            Some(*total)
        }));
        let mut field = vec![Complex64::new(0., 0.); offsets[offsets.len() - 1]];

        let mut m = Matrix2::<Complex64>::identity();
        for q in (0..cells.len()).rev() {
            let count = cells[q];
            if count == 0 {
                continue;
            }
            let uv: Vector2<Complex64> = m * Vector2::new(Complex64::new(1., 0.), cover);
            let (u, v) = (uv[0], uv[1]);
            let n2 = indices[q] * indices[q];
            for (j, value) in field[offsets[q]..offsets[q + 1]].iter_mut().enumerate() {
                let x = (count - 1 - j) as f64 * xres;
                *value = if q == 0 || q == last {
                    u.re * (i * k * alpha[q] * x).exp() / n2
                } else {
                    (u * (-k * alpha[q] * x).cos() + i / gamma[q] * v * (-k * alpha[q] * x).sin())
                        / n2
                };
            }
            if q != 0 && q != last {
                m = characteristic_matrix(k * thicknesses[q] * alpha[q], gamma[q]) * m;
            }
        }

        let intensity: Vec<f64> = field.iter().map(|f| f.norm_sqr()).collect();
        let peak = intensity.iter().copied().fold(0., f64::max);
        intensity.into_iter().rev().map(|value| value / peak).collect()
    }
}

#[cfg(test)]
mod test {
    use super::TransferStack;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn slab() -> (Vec<Complex64>, Vec<f64>) {
        (
            vec![
                Complex64::new(3.1, 0.),
                Complex64::new(3.4, 0.),
                Complex64::new(3.1, 0.),
            ],
            vec![2., 2., 2.],
        )
    }

    #[test]
    fn intensity_is_normalised_to_its_peak() {
        let (indices, thicknesses) = slab();
        let stack = TransferStack::new(&indices, &thicknesses, 4.7);
        let cells = [200, 200, 200];
        let intensity = stack.intensity(Complex64::new(3.3, 0.), &cells, 0.01);
        assert_eq!(intensity.len(), 600);
        assert_relative_eq!(intensity.iter().copied().fold(0., f64::max), 1.);
        assert!(intensity.iter().all(|value| value.is_finite() && *value >= 0.));
    }

    #[test]
    fn chi_is_finite_between_cladding_and_core_indices() {
        let (indices, thicknesses) = slab();
        let stack = TransferStack::new(&indices, &thicknesses, 4.7);
        // Between the cladding and core indices the fields are evanescent in the claddings
        let chi = stack.chi(Complex64::new(3.2, 0.));
        assert!(chi.re.is_finite() && chi.im.is_finite());
    }
}
