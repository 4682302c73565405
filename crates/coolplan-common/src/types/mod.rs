//! Core data types for the Coolplan engine

pub mod allocation;
pub mod intervention;
pub mod mcda;
pub mod optimization;
