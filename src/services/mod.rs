//! Gateway service layer: fleet operations and raw-record normalization

pub mod fleet;
pub mod normalizer;

pub use fleet::FleetService;
