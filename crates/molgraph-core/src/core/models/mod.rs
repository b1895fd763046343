//! # Core Models Module
//!
//! Data structures for molecular structure graphs.
//!
//! ## Key Components
//!
//! - [`graph`] - [`graph::MolecularGraph`], the owner of atoms, bonds, adjacency and annotations
//! - [`atom`] - Atom records with element, coordinates, charge and tags
//! - [`topology`] - Bonds and bond orders
//! - [`annotations`] - Rings and functional groups derived by the analyzer
//! - [`ids`] - Identifier types for atoms, bonds, rings and groups
//!
//! ## Usage
//!
//! ```ignore
//! use molgraph::core::models::{graph::MolecularGraph, topology::BondOrder};
//! use nalgebra::Point3;
//!
//! let mut graph = MolecularGraph::new();
//! let c = graph.add_atom("C", Point3::new(0.0, 0.0, 0.0), None);
//! let o = graph.add_atom("O", Point3::new(1.43, 0.0, 0.0), None);
//! graph.add_bond(c, o, BondOrder::Single)?;
//! assert_eq!(graph.neighbors(c)?, &[o]);
//! ```

pub mod annotations;
pub mod atom;
pub mod graph;
pub mod ids;
pub mod topology;
