pub mod log_sinks;
pub mod rotating_file;

pub use log_sinks::{init, LogGuard};
