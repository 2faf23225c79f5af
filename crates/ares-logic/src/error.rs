//! Engine error taxonomy.
//!
//! Every configuration problem is rejected at the boundary where it enters
//! the engine. Layout infeasibility is *not* an error; see
//! [`crate::packer::PackOutcome`].

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to callers of the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A vessel dimension was non-positive or not finite.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Crew size must be at least one.
    #[error("invalid crew size: {0}")]
    InvalidCrewSize(u32),

    /// Module name not present in the catalog.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// Module is in the catalog but not part of the design.
    #[error("module not selected: {0}")]
    ModuleNotSelected(String),

    /// Catalog definition is inconsistent.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// An engine constant is out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
