/// This module governs the high-level implementation of the simulation
mod calculations;
mod configuration;
mod error;
mod plot;
mod styles;
mod telemetry;

pub use configuration::{
    BasisConfiguration, Configuration, ModeConfiguration, OutputConfiguration,
    PlotConfiguration, SolverConfiguration,
};
pub use plot::{emit_spectrum, PlotSink, TracingSink};

use crate::device::{Device, MaterialTable};
use clap::{ArgEnum, Parser};
use color_eyre::eyre::eyre;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// TOML description of the structure and, optionally, its waveguide
    file_path: Option<PathBuf>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    #[clap(arg_enum, short, long, default_value = "whole")]
    calculation: Calculation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let filter = match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        };
        write!(f, "{}", filter.to_string().to_lowercase())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub(crate) enum Calculation {
    /// Solve the full structure as one potential
    Whole,
    /// Solve each module in isolation and recombine
    Basis,
    /// Solve for the guided optical mode
    Waveguide,
}

pub fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = App::parse();

    let configuration = Configuration::build()?;
    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &configuration.output)?;
    telemetry::init_subscriber(subscriber)?;

    let path = cli
        .file_path
        .ok_or(eyre!("A file path needs to be passed."))?;
    tracing::info!("Reading structure from {}", path.display());
    let device = Device::build(path)?;
    let table = MaterialTable::new(device.temperature);

    let term = console::Term::stdout();
    let mut styles = styles::Styles::default();
    if supports_color::on(supports_color::Stream::Stdout).is_some() {
        styles.colorize();
    }
    let mut sink = TracingSink::default();

    match cli.calculation {
        Calculation::Whole => calculations::whole_structure(
            &device,
            &table,
            &configuration,
            &mut sink,
            &styles,
            &term,
        )?,
        Calculation::Basis => {
            calculations::basis(&device, &table, &configuration, &mut sink, &styles, &term)?
        }
        Calculation::Waveguide => {
            calculations::waveguide(&device, &table, &configuration, &styles, &term)?
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::LogLevel;

    #[test]
    fn log_levels_render_as_filter_directives() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }
}
