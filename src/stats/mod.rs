//! Statistics reported to the embedder

pub mod metrics;

pub use metrics::BufferStats;
