#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod check;
pub mod cli_support;
pub mod conf;
pub mod config;
pub mod error;
pub mod load;
pub mod model;
pub mod preset;
pub mod resolve;

pub use error::ConfigError;
pub use model::{GlobalPolicy, PresetRef, RuleSetting, Severity};
pub use preset::{Preset, PresetRegistry, PresetSource};
pub use resolve::{ResolvedConfig, resolve};
