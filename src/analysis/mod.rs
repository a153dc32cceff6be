//! Donation statistics.
//!
//! Pure transforms over the collected donation set: headline total,
//! per-channel breakdown, top donors, and the per-channel views the
//! dashboard tables and chart are drawn from.

pub mod summarizer;

pub use summarizer::*;
