//! Synthetic input data.

pub mod sample;

pub use sample::{generate_profile, write_profile_csv};
