//! # Workflows Module
//!
//! End-to-end pipelines built from the `core` and `engine` layers.
//!
//! - **Structure Analysis** ([`analyze`]) - Parse a structure file, then annotate
//!   rings and functional groups. Batches of independent files can be fanned
//!   out over a thread pool with the `parallel` feature.

pub mod analyze;
