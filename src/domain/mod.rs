// Domain layer - catalog, mappings, graphs and view state
pub mod catalog;
pub mod colour;
pub mod graph;
pub mod mapping;
pub mod metric;
pub mod series;
pub mod view;
pub mod window;
