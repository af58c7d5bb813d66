use super::{LogLevel, OutputConfiguration};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Opens the JSON log in the output directory, creating the directory if it is missing
fn log_writer(output: &OutputConfiguration) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&output.directory)?;
    let appender = tracing_appender::rolling::never(&output.directory, &output.log_file);
    Ok(tracing_appender::non_blocking(appender))
}

/// A subscriber printing plain events to `console::Term::stdout` and recording every event
/// as JSON in `output.directory/output.log_file`
///
/// `RUST_LOG` overrides the command line level when it is set.
pub(crate) fn get_subscriber(
    level: LogLevel,
    output: &OutputConfiguration,
) -> color_eyre::Result<(impl Subscriber + Send + Sync, WorkerGuard)> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level.to_string()))?;

    let console_layer = fmt::Layer::new()
        .with_writer(console::Term::stdout)
        .with_target(false)
        .without_time();

    let (writer, guard) = log_writer(output)?;
    let file_layer = fmt::Layer::new().with_writer(writer).json();

    let subscriber = Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);
    Ok((subscriber, guard))
}

pub(crate) fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> color_eyre::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
