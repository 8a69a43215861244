//! Client for the external pretrained object detector.
//!
//! The detector runs behind an HTTP prediction endpoint (TorchServe style).
//! This crate preprocesses images, calls the endpoint and converts its
//! response into [`defectlab_core::detection::RawDetection`] values.

pub mod client;
pub mod loader;
pub mod preprocess;

pub use client::FasterRcnnClient;
pub use loader::HttpBackendLoader;
