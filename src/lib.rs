pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, ResearchConfig};

pub use crate::core::{
    engine::ResearchEngine, export::ReportExporter, framework::ResearchFramework,
    processor::SimulatedProcessor,
};
pub use utils::error::{FrameworkError, Result};
