// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # rete-terms
//!
//! Term canonicalization for an RDF-graph driven rule engine. Every resource,
//! blank node and literal met while loading a graph is interned once and
//! replaced by a [`TermId`](term::TermId) handle, so the rule network compares
//! two integers instead of two strings.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): immutable terms and their `TermId` handles
//! - **Term table** (`table`): content ↔ handle maps, one handle per content
//! - **Term manager** (`manager`): validation, meta layering, load/freeze lifecycle
//! - **Well-known resources** (`well_known`): schema handles for the rule built-ins
//! - **Loader** (`loader`): bulk JSON term specs
//!
//! ## Library usage
//!
//! ```no_run
//! use rete_terms::config::TermManagerConfig;
//! use rete_terms::manager::TermManager;
//! use rete_terms::well_known::WellKnownResources;
//!
//! let mut manager = TermManager::new(TermManagerConfig::default()).unwrap();
//! let person = manager.resolve_resource("http://ex.org/Person").unwrap();
//! let mut well_known = WellKnownResources::new();
//! well_known.initialize(Some(&mut manager)).unwrap();
//!
//! let manager = manager.freeze();
//! assert_eq!(manager.try_resolve("http://ex.org/Person"), Some(person));
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod table;
pub mod term;
mod validate;
pub mod vocab;
pub mod well_known;
