// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_data_source;
pub mod tracing_sink;
