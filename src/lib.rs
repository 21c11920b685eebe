pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod naming;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod provisioner;
pub mod storage;

pub use error::{ProvisionError, Result};
