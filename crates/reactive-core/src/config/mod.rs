//! Configuration for reactive instances

mod logging_config;
mod reactive_config;

pub use logging_config::{LogFormat, LoggingConfig};
pub use reactive_config::{CommandInheritance, ReactiveConfig};
