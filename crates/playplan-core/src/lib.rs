pub mod config;
pub mod error;
pub mod glob;
pub mod io;
pub mod paths;
pub mod plan;
pub mod ports;
pub mod resolve;
pub mod summary;
pub mod translate;
pub mod validate;

pub use error::{PlayplanError, Result};
