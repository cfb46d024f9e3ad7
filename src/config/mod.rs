// Configuration modules for the scan backend

pub mod heuristics;

pub use heuristics::{HeuristicsConfig, HeuristicsError, Thresholds};
