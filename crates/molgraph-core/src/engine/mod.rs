//! # Engine Module
//!
//! Structural analysis of a [`MolecularGraph`](crate::core::models::graph::MolecularGraph):
//! ring perception and functional-group classification.
//!
//! ## Overview
//!
//! [`analyze`] and [`analyze_with`] are the entry points. They verify the
//! graph, clear earlier annotations, then write ring and group tags onto atoms
//! and bonds. Reading the graph back (or passing it to
//! [`write_listing`](crate::core::io::report::write_listing)) shows the result.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - What to compute, and TOML settings for the whole pipeline
//! - **Rings** ([`rings`]) - Minimum cycle basis of the bond graph, ring kinds
//! - **Groups** ([`groups`]) - The ordered functional-group rule table
//! - **Progress** ([`progress`]) - Callback-based progress events for batch runs
//! - **Error Handling** ([`error`]) - Analysis errors

mod analyzer;
pub mod config;
pub(crate) mod cycle_space;
pub mod error;
pub mod groups;
pub mod progress;
pub mod rings;
#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{AnalysisSummary, analyze, analyze_with};
