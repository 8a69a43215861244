pub mod detection;
pub mod models;
pub mod training;
