// Main entry point - Dependency injection and a headless pipeline run
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use teaplot_pipeline::application::app_state::AppState;
use teaplot_pipeline::domain::mapping::AxisMapping;
use teaplot_pipeline::infrastructure::config::load_config;
use teaplot_pipeline::infrastructure::http_data_source::HttpDataSource;
use teaplot_pipeline::infrastructure::tracing_sink::TracingRenderSink;
use teaplot_pipeline::presentation::commands::{Command, Outcome};
use teaplot_pipeline::presentation::controller::Controller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    let state = AppState::new(config.graph_layout(), config.scales(), config.palette()?);

    // Create data source (infrastructure layer)
    let source = Arc::new(HttpDataSource::new(&config.server.base_url));
    tracing::info!("Using experiment server at {}", config.server.base_url);

    let mut controller = Controller::new(source, TracingRenderSink::default(), state);
    controller.handle(Command::SetGraphCount(config.graph.initial_count))?;

    // Start from the server's preset and the lists it offers
    controller.handle(Command::LoadDefaultView)?;
    controller.handle(Command::RefreshMetricList)?;
    controller.handle(Command::RefreshExperimentList)?;
    for result in controller.settle().await {
        if let Err(e) = result {
            tracing::warn!("{}", e);
        }
    }

    // Plot every flow of every metric on the first graph
    let keys = controller.state().catalog.series_keys();
    for (metric, flow) in keys {
        if let Err(e) = controller.handle(Command::AddMapping(AxisMapping::new(metric, flow, 0))) {
            tracing::warn!("{}", e);
        }
    }

    if let Outcome::RequestStarted { .. } = controller.handle(Command::UpdateView)? {
        for result in controller.settle().await {
            if let Err(e) = result {
                tracing::warn!("{}", e);
            }
        }
    }

    if let Outcome::Exported(command) = controller.handle(Command::ExportView)? {
        println!("{}", command);
    }

    Ok(())
}
