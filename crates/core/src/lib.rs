//! Domain logic for the defect-detection backend.
//!
//! Holds the simulated training state machine, the task/model registry and
//! the detection pipeline seams. Nothing in here knows about HTTP.

pub mod clock;
pub mod detection;
pub mod error;
pub mod registry;
pub mod training;
pub mod types;
pub mod validation;
