use clap::Parser;

use service_info_exporter::config::Cli;
use service_info_exporter::lifecycle::startup;
use service_info_exporter::observability::logging;
use service_info_exporter::ExporterError;

#[tokio::main]
async fn main() -> Result<(), ExporterError> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability);

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "service-info-exporter exiting");
        return Err(e);
    }
    Ok(())
}
