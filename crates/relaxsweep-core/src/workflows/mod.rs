//! # Workflows Module
//!
//! High-level entry points that tie the `engine` and `core` layers together.
//!
//! - **Sweep Workflow** ([`sweep`]) - Resolve the manifest for a configured grid and compute
//!   every pending point, resuming wherever a previous run stopped.
//! - **Collect Workflow** ([`collect`]) - Read back the persisted records of every run
//!   directory, mapping file names back to grid coordinates for downstream fitting.

pub mod collect;
pub mod sweep;
