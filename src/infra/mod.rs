//! Adapters consuming the core: report exporters.

pub mod export;

pub use export::{write_json_report, write_text_report};
