//! # Calculations
//!
//! Delegated functions from `App` which run a single calculation on a structure and write a
//! summary of the results to the terminal

use super::{error::CascadeError, plot, styles::Styles, Configuration, PlotSink};
use crate::{
    basis::BasisPartitioner,
    device::{Device, MaterialTable},
    eigen::EigenSolverBuilder,
    observables::Observables,
    strata::{ModeSolver, Performance},
};
use itertools::iproduct;
use owo_colors::OwoColorize;

/// Solves the full structure as a single potential
pub(crate) fn whole_structure(
    device: &Device,
    table: &MaterialTable,
    configuration: &Configuration,
    sink: &mut impl PlotSink,
    styles: &Styles,
    term: &console::Term,
) -> Result<(), CascadeError> {
    tracing::info!("Whole structure calculation");
    let bands = device.band_structure(table)?;
    let summary = device.strain_summary(&bands);
    tracing::info!("Net strain {:.4} %", summary.net_strain);

    let grid = device.rasterize(&bands)?;
    let spectrum = EigenSolverBuilder::new()
        .with_grid(&grid)
        .with_configuration(configuration)
        .build()
        .solve(device.vert_res)?;
    plot::emit_spectrum(sink, &grid, &spectrum.plot, &spectrum.energies());

    let dopings = device.layers.iter().map(|layer| layer.doping).collect();
    let observables = Observables::new(
        &grid,
        &bands,
        &spectrum.states,
        &configuration.plot,
        dopings,
    );

    term.write_line(&format!(
        "{}",
        format!("{} bound states", spectrum.len()).style(styles.header_style)
    ))?;
    for (index, state) in spectrum.states.iter().enumerate() {
        term.write_line(&format!(
            "{index:>4} {}",
            format!("{:>10.4} eV", state.energy).style(styles.energy_style)
        ))?;
    }

    term.write_line(&format!(
        "{}",
        "pair   dipole (A)   LO lifetime (ps)   broadening (meV)".style(styles.header_style)
    ))?;
    for upper in 1..spectrum.len() {
        let lower = upper - 1;
        term.write_line(&format!(
            "{upper:>2}-{lower:<2} {:>11.3} {:>18.4} {:>18.4}",
            observables.dipole(upper, lower),
            observables.lo_life_time(upper),
            observables.broadening_energy(upper, lower),
        ))?;
    }
    Ok(())
}

/// Solves each module of the structure in isolation and reports the couplings between them
pub(crate) fn basis(
    device: &Device,
    table: &MaterialTable,
    configuration: &Configuration,
    sink: &mut impl PlotSink,
    styles: &Styles,
    term: &console::Term,
) -> Result<(), CascadeError> {
    tracing::info!("Basis calculation");
    let bands = device.band_structure(table)?;
    let grid = device.rasterize(&bands)?;
    let partitioner = BasisPartitioner::new(configuration);
    let solution = partitioner.solve(device, &bands)?;
    let spectrum = partitioner.recombine(&solution, &grid);
    plot::emit_spectrum(sink, &grid, &spectrum.plot, &spectrum.energies());

    term.write_line(&format!(
        "{}",
        format!(
            "{} states in {} modules",
            spectrum.states.len(),
            solution.number_of_modules()
        )
        .style(styles.header_style)
    ))?;
    for (index, (state, module)) in spectrum
        .states
        .iter()
        .zip(spectrum.module_ids.iter())
        .enumerate()
    {
        term.write_line(&format!(
            "{index:>4} {} {}",
            format!("{:>10.4} eV", state.energy).style(styles.energy_style),
            format!("module {module}").style(styles.module_style),
        ))?;
    }

    let dopings = device.layers.iter().map(|layer| layer.doping).collect();
    let observables = Observables::new(
        &grid,
        &bands,
        &spectrum.states,
        &configuration.plot,
        dopings,
    );
    term.write_line(&format!(
        "{}",
        "pair   coupling (meV)".style(styles.header_style)
    ))?;
    let ids = &spectrum.module_ids;
    let count = spectrum.states.len();
    for (upper, lower) in iproduct!(0..count, 0..count).filter(|&(a, b)| ids[b] == ids[a] + 1) {
        let coupling = observables.coupling_energy(&solution, ids, upper, lower);
        term.write_line(&format!("{upper:>2}-{lower:<2} {:>14.4}", coupling / 1e-3))?;
    }
    Ok(())
}

/// Solves for the guided mode of the waveguide and estimates the laser performance
pub(crate) fn waveguide(
    device: &Device,
    table: &MaterialTable,
    configuration: &Configuration,
    styles: &Styles,
    term: &console::Term,
) -> Result<(), CascadeError> {
    tracing::info!("Waveguide calculation");
    let waveguide = device
        .waveguide
        .as_ref()
        .ok_or(CascadeError::MissingWaveguide)?;
    let bands = device.band_structure(table)?;
    let core = waveguide.core(table, device, &bands)?;
    let indices = waveguide.indices(table, core)?;
    let solver = ModeSolver::new(waveguide, indices, &configuration.mode);
    let mode = solver.solve()?;

    term.write_line(&format!(
        "{}",
        "Guided mode".style(styles.header_style)
    ))?;
    term.write_line(&format!(
        "beta {:.5} + {:.3e}i, confinement {:.4}",
        mode.beta.re, mode.beta.im, mode.confinement
    ))?;

    match Performance::evaluate(waveguide, solver.grid(), &mode) {
        Ok(performance) => {
            for (label, value) in [
                ("waveguide loss (1/cm)", performance.waveguide_loss),
                ("mirror loss (1/cm)", performance.mirror_loss),
                ("gain (cm/A)", performance.gain),
                ("threshold current density (kA/cm2)", performance.threshold_current_density),
                ("threshold current (A)", performance.threshold_current),
                ("operating voltage (V)", performance.operating_voltage),
                ("voltage efficiency", performance.voltage_efficiency),
                ("extraction efficiency", performance.extraction_efficiency),
                ("inversion efficiency", performance.inversion_efficiency),
                ("modal efficiency", performance.modal_efficiency),
            ] {
                term.write_line(&format!("{label:<36} {value:>12.4}"))?;
            }
        }
        Err(e) => {
            tracing::warn!("Performance estimate unavailable: {e}");
            term.write_line(&format!(
                "{}",
                format!("performance unavailable: {e}").style(styles.warning_style)
            ))?;
        }
    }
    Ok(())
}
