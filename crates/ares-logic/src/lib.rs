//! Constraint & layout engine for ARES Designer.
//!
//! Given a crew size, a pressure-vessel shape and a selection of functional
//! modules, the engine scores the selection against a per-crew Net
//! Habitable Volume floor and packs every module into the vessel without
//! overlap while honouring zoning rules. Functions take plain data and
//! return results; there is no I/O, threading or global state, so the same
//! code serves a dashboard backend, the headless harness and unit tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`audit`] | Independent containment / overlap / zoning checks on a layout |
//! | [`catalog`] | Module types, zoning categories, adjacency rules |
//! | [`compliance`] | NHV floor, margin and RED/YELLOW/GREEN tiering |
//! | [`config`] | Tunable constants (NHV, buffer, reserve, grid) |
//! | [`error`] | Engine error taxonomy |
//! | [`geometry`] | Vessel shapes, usable volume, box primitives |
//! | [`packer`] | First-fit-decreasing constrained layout |
//! | [`session`] | Mutable design session and combined validation |

pub mod audit;
pub mod catalog;
pub mod compliance;
pub mod config;
pub mod error;
pub mod geometry;
pub mod packer;
pub mod session;

pub use error::{EngineError, Result};
