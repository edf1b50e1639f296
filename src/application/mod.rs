// Application layer - pipeline stages and use cases
pub mod app_state;
pub mod catalog_service;
pub mod data_source;
pub mod normalizer;
pub mod render_sink;
pub mod requests;
pub mod view_service;

#[cfg(test)]
pub mod test_support;
