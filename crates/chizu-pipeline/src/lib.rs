//! Chizu Pipeline - Orchestration of the extraction and geocoding passes
//!
//! Each pass is sequential and commits per item, so every failure mode
//! downgrades to "skip and continue" and a crashed run loses at most the
//! in-flight unit of work.

pub mod extraction;
pub mod geocoding;
pub mod report;

pub use extraction::{ExtractionPass, ExtractionSummary, SentenceFailure};
pub use geocoding::{GeocodingPass, GeocodingSummary};
pub use report::Report;
