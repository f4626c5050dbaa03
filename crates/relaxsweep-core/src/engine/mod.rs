//! # Engine Module
//!
//! This module implements the sweep engine: it decides which on-disk manifest a sweep belongs
//! to, walks the grid in a fixed order, hands each pending point to the external simulator and
//! persists the outcome.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Axis definitions, conditions, output layout and the
//!   explicit engine settings handed to every simulation call
//! - **Manifest Resolution** ([`manifest`]) - Matching a requested grid against existing run
//!   directories, creating a new one when none matches
//! - **Simulator Seam** ([`simulator`]) - The contract with the external spin-dynamics engine
//! - **Runner** ([`runner`]) - Per-point compute-and-store with per-condition failure isolation
//! - **Progress Monitoring** ([`progress`]) - Progress events and duration estimates
//! - **Error Handling** ([`error`]) - Engine-level error types
//!
//! ## Guarantees
//!
//! - Completion is derived purely from the existence of a point's record file
//! - A failing condition never discards the other conditions of the same point
//! - Storage failures are never swallowed; they end the sweep

pub mod config;
pub mod error;
pub mod manifest;
pub mod progress;
pub mod runner;
pub mod simulator;
