//! Host power models.

pub mod cpu;
pub mod cpu_models;
pub mod host;
