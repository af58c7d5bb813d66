//! Basis partitioning
//!
//! A periodic structure is split at the boundaries between active regions and injectors
//! into modules, each padded with barrier before and after so that it is physically isolated.
//! Every module of the first period is solved once and stored as a template. Later periods
//! reuse the templates through lightweight instance records carrying the width and field
//! offsets needed to place the local states in the global frame.
//!
//! Coupling between modules is only estimated to first order afterwards, the modules are
//! never diagonalised together.

use crate::{
    alloy::BandStructure,
    app::Configuration,
    constants::FIELD_TO_EV_PER_ANGSTROM,
    eigen::{trim_to_support, EigenSolverBuilder, EigenState, Spectrum, SpectrumPlot},
    error::QclError,
    layers::{Layer, PositionGrid, QclLayers},
    utilities::argsort,
};
use ndarray::Array1;
use rayon::prelude::*;

/// The layers of `layers` at which the structure is split into modules
///
/// Boundaries are placed at the last injector layer before an active region, and at the first
/// injector layer after one, subject to the two toggles of the structure. The first and last
/// layers are always boundaries. The activity of the last layer wraps around to precede the
/// first.
pub fn dividers(layers: &QclLayers) -> Vec<usize> {
    let n = layers.layers.len();
    if n == 0 {
        return vec![];
    }
    let mut active = vec![layers.layers[n - 1].active];
    active.extend(layers.layers.iter().map(|layer| layer.active));

    let mut dividers = vec![0, n - 1];
    for q in 0..n {
        if !active[q] && active[q + 1] && layers.split_injector_to_active {
            dividers.push(q.saturating_sub(1));
        }
        if active[q] && !active[q + 1] && layers.split_active_to_injector {
            dividers.push(q);
        }
    }
    dividers.sort_unstable();
    dividers.dedup();
    dividers
}

/// A module of the first period, solved in isolation
#[derive(Clone, Debug)]
pub struct ModuleTemplate {
    /// Inclusive range of source layers spanned by the module
    pub first_layer: usize,
    pub last_layer: usize,
    /// The padded module structure
    pub layers: QclLayers,
    pub grid: PositionGrid,
    pub spectrum: Spectrum,
    /// Width in angstrom of the source layers preceding the module
    pub width_offset: f64,
}

/// A placement of a template within the full structure
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModuleInstance {
    pub template: usize,
    pub period: usize,
    /// Position in angstrom of the start of the unpadded module
    pub width_offset: f64,
    /// Energy shift in eV of the module's states due to the field
    pub field_offset: f64,
}

/// Templates and their placements over every period
#[derive(Clone, Debug)]
pub struct BasisSolution {
    pub templates: Vec<ModuleTemplate>,
    pub instances: Vec<ModuleInstance>,
    /// Barrier width in angstrom padded before each module
    pub head_padding: f64,
}

impl BasisSolution {
    pub fn number_of_modules(&self) -> usize {
        self.instances.len()
    }

    pub fn template_of(&self, module: usize) -> &ModuleTemplate {
        &self.templates[self.instances[module].template]
    }
}

/// States of every module placed on the global grid
#[derive(Clone, Debug, Default)]
pub struct BasisSpectrum {
    /// States in order of increasing energy
    pub states: Vec<EigenState>,
    /// The module each state belongs to
    pub module_ids: Vec<usize>,
    pub plot: SpectrumPlot,
}

impl BasisSpectrum {
    pub fn energies(&self) -> Vec<f64> {
        self.states.iter().map(|state| state.energy).collect()
    }
}

/// Splits a structure into modules and solves each in isolation
pub struct BasisPartitioner<'a> {
    configuration: &'a Configuration,
}

impl<'a> BasisPartitioner<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        Self { configuration }
    }

    /// The padded structure of the module spanning `first..=last`
    fn module_layers(&self, layers: &QclLayers, first: usize, last: usize) -> QclLayers {
        let basis = &self.configuration.basis;
        let source = &layers.layers[first..=last];
        let mut padded = Vec::with_capacity(source.len() + 2);
        padded.push(Layer::barrier(basis.head_padding, source[0].material));
        padded.extend(source.iter().cloned());
        padded.push(Layer::barrier(basis.tail_padding, source[source.len() - 1].material));
        QclLayers {
            layers: padded,
            repeats: 1,
            ..layers.clone()
        }
    }

    fn field_offset(&self, layers: &QclLayers, width_offset: f64) -> f64 {
        -(width_offset - self.configuration.basis.head_padding)
            * layers.field
            * FIELD_TO_EV_PER_ANGSTROM
    }

    /// Solves every module of the first period and places them over all periods
    #[tracing::instrument(name = "Basis solve", level = "info", skip_all)]
    pub fn solve(
        &self,
        layers: &QclLayers,
        bands: &BandStructure,
    ) -> Result<BasisSolution, QclError> {
        layers.validate()?;
        let dividers = dividers(layers);
        let widths = layers.rounded_widths();

        let templates = dividers
            .par_windows(2)
            .map(|pair| -> Result<ModuleTemplate, QclError> {
                let (first, last) = (pair[0], pair[1]);
                let module = self.module_layers(layers, first, last);
                let grid = module.rasterize(bands)?;
                let spectrum = EigenSolverBuilder::new()
                    .with_grid(&grid)
                    .with_configuration(self.configuration)
                    .build()
                    .solve(module.vert_res)?;
                tracing::debug!(
                    "Module spanning layers {first} to {last} holds {} states",
                    spectrum.len()
                );
                Ok(ModuleTemplate {
                    first_layer: first,
                    last_layer: last,
                    width_offset: widths[..first].iter().sum(),
                    layers: module,
                    grid,
                    spectrum,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let period_width: f64 = widths.iter().skip(1).sum();
        let instances = (0..layers.repeats.max(1))
            .flat_map(|period| {
                templates.iter().enumerate().map(move |(index, template)| {
                    (index, period, period as f64 * period_width + template.width_offset)
                })
            })
            .map(|(template, period, width_offset)| ModuleInstance {
                template,
                period,
                width_offset,
                field_offset: self.field_offset(layers, width_offset),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Solved {} module templates placed as {} modules",
            templates.len(),
            instances.len()
        );

        Ok(BasisSolution {
            templates,
            instances,
            head_padding: self.configuration.basis.head_padding,
        })
    }

    /// Places every module state on `grid`, the grid of the full structure
    ///
    /// Each energy is shifted by its module's field offset and each wavefunction is embedded
    /// at its module's width offset, zero elsewhere. States are then sorted by energy.
    pub fn recombine(&self, solution: &BasisSolution, grid: &PositionGrid) -> BasisSpectrum {
        let plot = &self.configuration.plot;
        let n = grid.len();
        let head = (solution.head_padding / grid.xres) as usize;

        let mut states = Vec::new();
        let mut module_ids = Vec::new();
        for (module, instance) in solution.instances.iter().enumerate() {
            let template = &solution.templates[instance.template];
            let begin = (instance.width_offset / grid.xres).round() as usize;
            for state in template.spectrum.states.iter() {
                let mut psi = Array1::zeros(n);
                for (j, &value) in state.psi.iter().enumerate() {
                    if let Some(index) = (begin + j).checked_sub(head).filter(|&i| i < n) {
                        psi[index] = value;
                    }
                }
                states.push(EigenState {
                    energy: state.energy + instance.field_offset,
                    psi,
                });
                module_ids.push(module);
            }
        }

        let order = argsort(&states.iter().map(|state| state.energy).collect::<Vec<_>>());
        let states: Vec<EigenState> = order.iter().map(|&i| states[i].clone()).collect();
        let module_ids = order.iter().map(|&i| module_ids[i]).collect();

        let densities: Vec<Array1<f64>> = states
            .iter()
            .map(|state| state.psi.mapv(|p| p * p * plot.wf_scale))
            .collect();
        let curves = densities
            .iter()
            .map(|density| {
                let mut curve = density.clone();
                trim_to_support(&mut curve, plot.pretty_plot_factor);
                curve
            })
            .collect();

        BasisSpectrum {
            states,
            module_ids,
            plot: SpectrumPlot {
                points: grid.points.clone(),
                curves,
                densities,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::{dividers, BasisPartitioner};
    use crate::{
        alloy::Substrate,
        app::Configuration,
        device::info_desk::MaterialTable,
        layers::{Layer, QclLayers},
    };

    fn two_module_period() -> QclLayers {
        QclLayers::new(
            vec![
                Layer::barrier(40., 1),
                Layer::well(50., 1).active(),
                Layer::barrier(20., 1).active(),
                Layer::well(50., 1).active(),
                Layer::barrier(40., 1),
                Layer::well(45., 1),
                Layer::barrier(40., 1),
            ],
            Substrate::InP,
        )
        .with_xres(0.5)
        .with_vert_res(1.)
        .with_field(20.)
    }

    #[test]
    fn dividers_sit_either_side_of_active_regions() {
        let layers = two_module_period();
        assert_eq!(dividers(&layers), vec![0, 4, 6]);

        let mut only_entry = layers.clone();
        only_entry.split_active_to_injector = false;
        assert_eq!(dividers(&only_entry), vec![0, 6]);

        let empty = QclLayers::new(vec![], Substrate::InP);
        assert!(dividers(&empty).is_empty());
    }

    #[test]
    fn a_structure_starting_in_an_active_region_does_not_underflow() {
        let layers = QclLayers::new(
            vec![Layer::well(10., 1).active(), Layer::barrier(10., 1), Layer::well(10., 1)],
            Substrate::InP,
        );
        assert_eq!(dividers(&layers), vec![0, 1, 2]);
    }

    #[test]
    fn modules_repeat_with_increasing_offsets() {
        let table = MaterialTable::default();
        let configuration = Configuration::default();
        let layers = two_module_period().with_repeats(3);
        let bands = layers.band_structure(&table).unwrap();
        let partitioner = BasisPartitioner::new(&configuration);
        let solution = partitioner.solve(&layers, &bands).unwrap();

        assert_eq!(solution.templates.len(), 2);
        assert_eq!(solution.number_of_modules(), 3 * 2);
        assert!(solution
            .instances
            .windows(2)
            .all(|pair| pair[1].width_offset > pair[0].width_offset));
        // The field lowers later modules
        assert!(solution.instances[5].field_offset < solution.instances[0].field_offset);

        let grid = layers.rasterize(&bands).unwrap();
        let spectrum = partitioner.recombine(&solution, &grid);
        let expected: usize = solution
            .instances
            .iter()
            .map(|instance| solution.templates[instance.template].spectrum.len())
            .sum();
        assert_eq!(spectrum.states.len(), expected);
        assert!(spectrum.states.iter().all(|state| state.psi.len() == grid.len()));
        let energies = spectrum.energies();
        assert!(energies.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
