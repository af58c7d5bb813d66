//! Layered configuration of the numerical parameters
//!
//! Defaults are compiled in, so the library runs without any files on disk. The binary
//! layers `.config/default.toml`, an optional `.config/{RUN_MODE}.toml` and `CASCADE__`
//! prefixed environment variables over the defaults.

use color_eyre::eyre::eyre;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::{env, path::PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
/// All tunable parameters of a run
pub struct Configuration {
    pub solver: SolverConfiguration,
    pub plot: PlotConfiguration,
    pub basis: BasisConfiguration,
    pub mode: ModeConfiguration,
    pub output: OutputConfiguration,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
/// Parameters of the shooting eigensolver
pub struct SolverConfiguration {
    /// Refine every root with a second inverse quadratic pass
    pub refine_roots: bool,
    /// Spline resampling factor of the end value sweep
    pub oversampling: usize,
    /// The refinement pass samples `vert_res / refinement_divisor` either side of a root
    pub refinement_divisor: f64,
    /// States whose penultimate amplitude exceeds `end_amplitude_limit / xres` are discarded
    pub end_amplitude_limit: f64,
    /// The largest number of trial energies in a sweep
    pub maximum_sweep_points: usize,
    /// The largest number of roots a sweep may bracket
    pub maximum_brackets: usize,
    /// Length in angstrom over which the field tilt is removed from the top of the sweep
    pub field_headroom: f64,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            refine_roots: true,
            oversampling: 100,
            refinement_divisor: 1e5,
            end_amplitude_limit: 200.,
            maximum_sweep_points: 2_000_000,
            maximum_brackets: 10_000,
            field_headroom: 115.,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
/// Scales and thresholds of the probability density curves
pub struct PlotConfiguration {
    /// Scale from |psi|^2 in 1 / m to plotted units
    pub wf_scale: f64,
    /// Minimum peak of `wf_scale * |psi|^2` for a state to be retained
    ///
    /// The thresholds are absolute and do not move when `wf_scale` is overridden.
    pub wf_min_height: f64,
    /// Curves of `wf_scale * |psi|^2` are trimmed where they fall below this
    pub pretty_plot_factor: f64,
    /// Plot spacing in angstrom
    pub plot_decimate_factor: f64,
    /// The LO phonon overlap integral runs over the points where `|psi|` exceeds this
    pub phonon_integral_factor: f64,
}

impl Default for PlotConfiguration {
    fn default() -> Self {
        Self {
            wf_scale: 4.5e-10,
            wf_min_height: 0.014,
            pretty_plot_factor: 0.0005,
            plot_decimate_factor: 0.5,
            phonon_integral_factor: 0.0001,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
/// Padding of the isolated modules solved by the basis partitioner
pub struct BasisConfiguration {
    /// Barrier width in angstrom placed before each module
    pub head_padding: f64,
    /// Barrier width in angstrom placed after each module
    pub tail_padding: f64,
}

impl Default for BasisConfiguration {
    fn default() -> Self {
        Self {
            head_padding: 100.,
            tail_padding: 30.,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
/// Parameters of the optical mode solver
pub struct ModeConfiguration {
    /// Step of the scan over the real part of the propagation constant
    pub scan_step: f64,
    pub oversampling: usize,
    pub maximum_brackets: usize,
    /// Pattern search steps of the real and imaginary parts of the propagation constant
    pub real_increment: f64,
    pub imaginary_increment: f64,
    /// The search stops when min |chi| changes by less than this fraction
    pub precision: f64,
    pub maximum_iterations: usize,
}

impl Default for ModeConfiguration {
    fn default() -> Self {
        Self {
            scan_step: 0.01,
            oversampling: 10,
            maximum_brackets: 1_000,
            real_increment: 1e-4,
            imaginary_increment: 1e-6,
            precision: 1e-5,
            maximum_iterations: 100_000,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfiguration {
    pub directory: PathBuf,
    pub log_file: String,
}

impl Default for OutputConfiguration {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("../results"),
            log_file: "log.log".into(),
        }
    }
}

impl Configuration {
    pub(crate) fn build() -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("../.config/default").required(false))
            .add_source(File::with_name(&format!("../.config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("CASCADE").separator("__"))
            .build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use approx::assert_relative_eq;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                "[solver]\noversampling = 20\n[basis]\ntail_padding = 40.0",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let configuration: Configuration = s.try_deserialize().unwrap();
        assert_eq!(configuration.solver.oversampling, 20);
        assert!(configuration.solver.refine_roots);
        assert_relative_eq!(configuration.basis.tail_padding, 40.);
        assert_relative_eq!(configuration.basis.head_padding, 100.);
        assert_relative_eq!(configuration.plot.wf_min_height, 0.014);
    }

    #[test]
    fn rescaling_plots_leaves_state_thresholds_alone() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                "[plot]\nwf_scale = 1e-9",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let configuration: Configuration = s.try_deserialize().unwrap();
        assert_relative_eq!(configuration.plot.wf_scale, 1e-9);
        assert_relative_eq!(configuration.plot.wf_min_height, 0.014);
        assert_relative_eq!(configuration.plot.pretty_plot_factor, 0.0005);
        assert_relative_eq!(configuration.plot.phonon_integral_factor, 0.0001);
    }
}
