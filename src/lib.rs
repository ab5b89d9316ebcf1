//! Sailing Club - membership and facility rental core
//!
//! This crate manages a nautical club's members, their yearly memberships
//! and the rental of lockers, racks and boat spaces, including the
//! discount pricing engine and per-type waiting lists.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
