#![doc = include_str!("../README.md")]

pub mod config;
pub mod core;
pub mod error;
pub mod experiment;
pub mod report;
pub mod scenario;
