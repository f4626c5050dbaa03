//! # relaxsweep Core Library
//!
//! A checkpointed, resumable parameter-sweep engine for NMR spin-relaxation studies. Each point
//! of a two-dimensional grid (correlation time × relaxation rate) is handed to an expensive,
//! external spin-dynamics simulation and the result is memoized on disk, keyed by its grid
//! coordinates, so that an interrupted sweep picks up exactly where it stopped.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Grid`, `SweepPoint`, `ResultRecord`)
//!   and the on-disk formats of a sweep manifest (axis files, record files, file naming).
//!
//! - **[`engine`]: The Logic Core.** Manifest resolution, the `Simulator` seam to the external
//!   engine, per-point compute-and-store with per-condition failure isolation, and progress
//!   reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: running a sweep from a
//!   configuration and collecting the persisted results of every manifest for analysis.

pub mod core;
pub mod engine;
pub mod workflows;
