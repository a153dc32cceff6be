//! Report rendering.

pub mod format;
pub mod generator;

pub use generator::{
    channel_title, generate_json_report, generate_markdown_report, write_report, ReportOptions,
};
