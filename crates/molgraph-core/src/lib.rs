//! # molgraph
//!
//! Molecular structure graphs from PDB, BGF and XYZ files, with ring
//! perception and functional-group classification.
//!
//! ## Architecture
//!
//! The library is split into three layers.
//!
//! - **[`core`]: Data and I/O.** The [`MolecularGraph`](core::models::graph::MolecularGraph)
//!   model, the element registry, and the structure-file readers. Nothing here
//!   interprets chemistry beyond what the file states, apart from optional
//!   distance-based bond perception.
//!
//! - **[`engine`]: Analysis.** Smallest-set-of-smallest-rings detection and the
//!   functional-group rule table. Results are written back onto the graph as
//!   tags and annotation lists.
//!
//! - **[`workflows`]: Pipelines.** Parse-then-analyze entry points for single
//!   files and for batches of independent files.
//!
//! ## Example
//!
//! ```ignore
//! use molgraph::core::elements::registry::ElementRegistry;
//! use molgraph::core::io;
//! use molgraph::engine::analyze;
//!
//! let registry = ElementRegistry::bundled()?;
//! let mut graph = io::parse("ligand.pdb".as_ref(), "pdb", &registry)?;
//! let summary = analyze(&mut graph, true)?;
//! println!("{} rings, {} groups", summary.rings, summary.groups);
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
