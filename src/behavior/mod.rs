//! Behavioral analysis of review batches.
//!
//! Temporal anomalies (bursts, rating spikes, recency bias), reviewer
//! patterns, and rating-distribution shape. Works off posting metadata
//! rather than text.

pub mod dates;
pub mod pipeline;
pub mod rating;
pub mod reviewer;
pub mod temporal;

pub use pipeline::BehaviorAnalyzer;
