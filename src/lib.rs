//! Hierarchical keys for a relationally persisted requirements model.
//!
//! Every entity of the model (domains, subdomains, classes, use cases, states,
//! actions, guards and state actions) is stored under a composite string key
//! such as `domain/shop/subdomain/orders/class/order/state/open`. This crate
//! builds, parses and canonicalizes those keys so that only well-formed,
//! canonical strings reach the store.

pub mod domain;
pub use domain::{Config, Key, KeyError, Qualifier, SegmentKind, preen, preen_key};
