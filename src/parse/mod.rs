//! Extraction and normalization of the league site's HTML tables.

pub mod datetime;
pub mod schedule;
pub mod standings;
pub mod stats;
pub mod tables;
