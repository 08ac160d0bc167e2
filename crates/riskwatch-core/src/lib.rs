//! riskwatch-core: in-memory academic risk engine.
//!
//! This crate defines the student record model and the analytical pieces
//! built on top of it: the prerequisite graph, the deadline queue, the
//! undo/redo history, the course-code prefix index, and the weighted risk
//! engine that combines them. It performs no I/O.

pub mod config;
pub mod deadlines;
pub mod error;
pub mod graph;
pub mod history;
pub mod model;
pub mod prefix;
pub mod risk;
pub mod sweep;

pub use error::RiskError;
