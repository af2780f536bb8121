//! Core definitions (errors and results), relied upon by the tessera-* crates.

pub mod error;
pub mod result;

pub use result::Result;
