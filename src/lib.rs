pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, ReportSettings};

pub use core::{
    etl::{EtlEngine, RunSummary},
    pipeline::SheetPipeline,
};
pub use utils::error::{EtlError, Result};
