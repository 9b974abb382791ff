pub mod bril;
pub mod config;
pub mod error;
pub mod ir;

pub use config::{Config, WorklistOrder};
pub use error::{AnalysisError, Result};
