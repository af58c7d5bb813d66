use cascade_qcl::{
    app::Configuration,
    basis::BasisPartitioner,
    device::{Device, MaterialTable},
    eigen::EigenSolverBuilder,
    observables::Observables,
    strata::{ModeSolver, Performance},
};
use std::path::PathBuf;
use utilities::{
    rough_well_grid,
    structures::{random_stack, ridge_waveguide, single_well, two_well_period},
};

#[test]
fn a_repeated_single_well_rasterizes_and_binds() {
    let table = MaterialTable::default();
    let configuration = Configuration::default();
    let layers = single_well(60., 30.);
    let bands = layers.band_structure(&table).unwrap();
    let grid = layers.rasterize(&bands).unwrap();
    assert_eq!(grid.len(), 240);

    // The first barrier is the wrap-around layer and is only present once
    let repeated = layers.clone().with_repeats(2).rasterize(&bands).unwrap();
    assert_eq!(repeated.len(), 240 + 180);

    let spectrum = EigenSolverBuilder::new()
        .with_grid(&grid)
        .with_configuration(&configuration)
        .build()
        .solve(layers.vert_res)
        .unwrap();
    assert!(!spectrum.is_empty());
    let energies = spectrum.energies();
    assert!(energies.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn basis_states_agree_with_the_whole_structure_for_weak_coupling() {
    let table = MaterialTable::default();
    let configuration = Configuration::default();
    let layers = two_well_period(0.).with_repeats(1);
    let bands = layers.band_structure(&table).unwrap();
    let grid = layers.rasterize(&bands).unwrap();

    let whole = EigenSolverBuilder::new()
        .with_grid(&grid)
        .with_configuration(&configuration)
        .build()
        .solve(layers.vert_res)
        .unwrap();

    let partitioner = BasisPartitioner::new(&configuration);
    let solution = partitioner.solve(&layers, &bands).unwrap();
    let basis = partitioner.recombine(&solution, &grid);
    assert!(!basis.states.is_empty());

    // The lowest basis state lies within a few meV of a state of the whole structure
    let lowest = basis.states[0].energy;
    assert!(whole
        .energies()
        .iter()
        .any(|energy| (energy - lowest).abs() < 10e-3));
}

#[test]
fn observables_of_a_biased_period() {
    let table = MaterialTable::default();
    let configuration = Configuration::default();
    let layers = two_well_period(30.).with_repeats(2);
    let bands = layers.band_structure(&table).unwrap();
    let grid = layers.rasterize(&bands).unwrap();
    let spectrum = EigenSolverBuilder::new()
        .with_grid(&grid)
        .with_configuration(&configuration)
        .build()
        .solve(layers.vert_res)
        .unwrap();
    assert!(spectrum.len() >= 2);

    let dopings = layers.layers.iter().map(|layer| layer.doping).collect();
    let observables = Observables::new(
        &grid,
        &bands,
        &spectrum.states,
        &configuration.plot,
        dopings,
    );
    for upper in 1..spectrum.len() {
        let rate = observables.lo_transition_rate(upper, upper - 1);
        assert!(rate.is_finite() && rate > 0.);
        assert!(observables.broadening_energy(upper, upper - 1).is_finite());
    }
    assert!(observables.lo_life_time(1) > 0.);
}

#[test]
fn random_stacks_validate_and_rasterize() {
    let table = MaterialTable::default();
    for _ in 0..10 {
        let layers = random_stack(6);
        let bands = layers.band_structure(&table).unwrap();
        let grid = layers.rasterize(&bands).unwrap();
        let cells: usize = layers.layer_cells().iter().sum();
        let period: usize = layers.layer_cells().iter().skip(1).sum();
        assert_eq!(grid.len(), cells + period * (layers.repeats - 1));
    }
}

#[test]
fn small_perturbations_do_not_change_the_ground_state_much() {
    let configuration = Configuration::default();
    let grid = rough_well_grid(0.3, 60., 30., 0.25);
    let spectrum = EigenSolverBuilder::new()
        .with_grid(&grid)
        .with_configuration(&configuration)
        .build()
        .solve(0.5)
        .unwrap();
    assert!((spectrum.states[0].energy - 0.071).abs() < 5e-3);
}

#[test]
fn waveguide_performance_end_to_end() {
    let table = MaterialTable::default();
    let configuration = Configuration::default();
    let mut waveguide = ridge_waveguide(2.);
    waveguide.laser.periods = 40;
    waveguide.laser.period_length = 500.;
    waveguide.laser.tau_upper = 1.5;
    waveguide.laser.tau_lower = 0.3;
    waveguide.laser.tau_upper_lower = 3.;
    waveguide.laser.optical_dipole = 15.;
    waveguide.laser.operating_field = 60.;

    let layers = two_well_period(30.);
    let bands = layers.band_structure(&table).unwrap();
    let core = waveguide.core(&table, &layers, &bands).unwrap();
    assert_eq!(core.re, 3.35);

    let indices = waveguide.indices(&table, core).unwrap();
    let solver = ModeSolver::new(&waveguide, indices, &configuration.mode);
    let mode = solver.solve().unwrap();
    assert!(mode.confinement > 0.3 && mode.confinement < 1.);

    let performance = Performance::evaluate(&waveguide, solver.grid(), &mode).unwrap();
    assert!(performance.threshold_current_density > 0.);
    assert!(performance.voltage_efficiency > 0.);
}

#[test]
fn the_sample_structure_file_runs_through_the_basis_solver() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("utilities/test_structures/two_well.toml");
    let device = Device::build(path).unwrap();
    assert_eq!(device.layers.len(), 7);
    assert_eq!(device.waveguide.as_ref().unwrap().strata.len(), 6);

    let table = MaterialTable::new(device.temperature);
    let configuration = Configuration::default();
    let bands = device.band_structure(&table).unwrap();
    let grid = device.rasterize(&bands).unwrap();
    let partitioner = BasisPartitioner::new(&configuration);
    let solution = partitioner.solve(&device, &bands).unwrap();
    assert_eq!(solution.number_of_modules(), 2 * solution.templates.len());
    let basis = partitioner.recombine(&solution, &grid);
    assert_eq!(basis.states.len(), basis.module_ids.len());
}
