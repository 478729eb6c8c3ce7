///! Command implementations

pub mod config;
pub mod indicator;
pub mod simulate;
