//! Repository layer for database operations.

pub mod feature;
pub mod graph;

pub use feature::FeatureRepository;
pub use graph::GraphRepository;
