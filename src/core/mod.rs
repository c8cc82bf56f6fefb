pub mod etl;
pub mod filter;
pub mod pipeline;
pub mod renderer;
pub mod shaper;
pub mod xml_reader;

pub use crate::domain::model::{OutputRow, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
