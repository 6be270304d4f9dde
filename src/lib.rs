pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::{LocalStorage, StdoutStorage};
pub use config::TomlConfig;

pub use app::pipelines::tier1_pipeline::Tier1Pipeline;
pub use core::etl::EtlEngine;
pub use domain::model::{MatchMode, MirrorRecord, Protocol, StatusEntry, TierOneIndex};
pub use utils::error::{EtlError, Result};
