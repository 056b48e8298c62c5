pub mod api;
pub mod config;
pub mod error;
pub mod labels;
pub mod report;
pub mod scan;

pub use config::Config;
pub use error::{Result, VizError};
pub use scan::{load_attempt, scan_attempts, Attempt, GeneMatch};
