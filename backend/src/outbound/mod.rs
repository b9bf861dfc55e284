//! Outbound adapters implementing the domain's driven ports.

pub mod blob;
pub mod persistence;
