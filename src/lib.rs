pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod render;
pub mod summary;

pub use config::{RunArgs, RunConfig};
pub use error::{Error, Result};
