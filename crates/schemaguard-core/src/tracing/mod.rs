//! Observability for schemaguard.
//! `tracing` crate with `EnvFilter`, configured through `SCHEMAGUARD_LOG`.

pub mod setup;

pub use setup::init_tracing;
