//! # Elements Module
//!
//! Per-element reference data (atomic number, mass, radii, electronegativity)
//! consumed by the structure readers.
//!
//! The registry is loaded once, from a reference data file or from the table
//! bundled with the crate, and never mutated afterwards. It can either be
//! passed around by reference or installed as the process-wide instance.
//!
//! ```ignore
//! use molgraph::core::elements::registry::ElementRegistry;
//!
//! let registry = ElementRegistry::load("elements.dat".as_ref())?;
//! let carbon = registry.lookup("C")?;
//! assert_eq!(carbon.atomic_number, 6);
//! ```

pub mod registry;
