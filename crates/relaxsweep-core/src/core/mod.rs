//! Stateless data models and the on-disk representation of a sweep.

pub mod io;
pub mod models;
