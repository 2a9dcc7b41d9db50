pub mod fitness;
pub mod host;
pub mod network;
pub mod placement_algorithm;
pub mod placement_algorithms;
pub mod problem;
pub mod solution;
pub mod vm;

#[cfg(test)]
mod tests;
