//! Client-side mapping and normalization pipeline for the teaplot experiment viewer.
//!
//! Flows fetched from the experiment server are mapped onto 3D graph targets, scaled
//! into each graph's fixed extents and coloured per flow. All state lives in one
//! [`application::app_state::AppState`] value owned by the
//! [`presentation::controller::Controller`], which consumes typed commands and applies
//! server responses in order, discarding superseded ones.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
