//! # Core Module
//!
//! Data structures and file handling shared by the rest of the library.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, adjacency and derived annotations
//! - **Reference Data** ([`elements`]) - Per-element properties keyed by symbol
//! - **File I/O** ([`io`]) - PDB, BGF and XYZ readers plus a plain-text listing writer
//!
//! Everything here is free of analysis state. A freshly parsed graph carries no
//! ring or group annotations until it is passed through [`crate::engine`].

pub mod elements;
pub mod io;
pub mod models;
