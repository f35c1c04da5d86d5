pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod playlist;
pub mod prober;
pub mod sources;
pub mod synthesizer;
pub mod utils;
pub mod validation;
