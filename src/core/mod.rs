pub mod correlator;
pub mod etl;
pub mod fetcher;
pub mod parser;

pub use crate::domain::model::{Extracted, MirrorRecord, StatusEntry, TierOneIndex};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
