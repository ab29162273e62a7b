//! Per-format section access

pub mod json;
pub mod toml;
