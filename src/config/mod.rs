//! Configuration management module

pub mod env;
pub mod parser;
pub mod validation;

pub use env::EnvManager;
pub use parser::{display_config_summary, load_config, ConfigParser, RunConfig};
pub use validation::{validate_config, ConfigValidator};

pub use crate::models::TestOptions;
