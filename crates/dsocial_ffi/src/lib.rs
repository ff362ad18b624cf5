//! Flutter-facing bindings for the D-Social message store.

pub mod api;
