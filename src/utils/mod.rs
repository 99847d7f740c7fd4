//! Helpers shared across layers.
//!
//! - [`deadline`] - Bounded timeouts around storage calls

pub mod deadline;
