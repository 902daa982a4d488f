#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Everything the map UI derives from the working set of records.
//!
//! All derivations are pure functions of the records and the current
//! [`filter::FilterState`]. They are re-run in full on every event, so
//! calling them twice with the same inputs yields the same output.

pub mod filter;
pub mod group;
pub mod palette;
pub mod panel;
pub mod state;
