//! Domain types for the requirements model's hierarchical keys.
//!
//! This module contains the segment grammar, local name preening, the [`Key`]
//! type with its builder, parser and serializer, and configuration for the
//! `reqkey` tool.

/// Segment kinds, qualifiers and the parent/child adjacency table.
pub mod grammar;
pub use grammar::{Qualifier, SegmentKind};

/// Local names and their canonicalization.
pub mod name;
pub use name::{LocalName, preen};

/// Hierarchical keys: building, parsing and serializing.
pub mod key;
pub use key::{ActionRef, Error as KeyError, Key, Segment, preen_key};

mod config;
pub use config::{Config, OutputFormat};
