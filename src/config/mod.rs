// src/config/mod.rs
pub mod setup;

pub use setup::Setup;
