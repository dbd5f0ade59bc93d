//! Subcommand implementations

pub mod config;
pub mod doctor;
pub mod invoke;
pub mod serve;
