// src/lib.rs
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod present;
pub mod processing;
pub mod utils;

pub use error::{NdviError, Result};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
