//! View components for the V2Scope application.

pub mod chart;
pub mod components;
pub mod dashboard;
pub mod formatting;
pub mod settings;
