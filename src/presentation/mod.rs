// Presentation layer - typed command interface over the pipeline
pub mod commands;
pub mod controller;
