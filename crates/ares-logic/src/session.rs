//! Mutable in-progress design and its combined validation.
//!
//! A [`DesignSession`] is the only mutable entity in the engine. Mutators
//! are atomic: a rejected change leaves every field (including the cached
//! report) exactly as it was. A successful change drops the cached report.
//! [`DesignSession::validate`] always rescores and repacks from scratch.
//!
//! Sessions do no locking. A host serving several users keeps one session
//! per user and serializes calls on it.
//!
//! ```
//! use std::sync::Arc;
//! use ares_logic::catalog::Catalog;
//! use ares_logic::compliance::ComplianceTier;
//! use ares_logic::geometry::VesselShape;
//! use ares_logic::session::DesignSession;
//!
//! let shape = VesselShape::Cylinder { radius: 3.0, length: 8.0 };
//! let mut session = DesignSession::new(Arc::new(Catalog::standard()), 1, shape).unwrap();
//! session.add_module("Sleep").unwrap();
//! session.add_module("Galley").unwrap();
//! session.add_module("Stowage").unwrap();
//! let report = session.validate().unwrap();
//! assert_eq!(report.compliance.status, ComplianceTier::Green);
//! assert!(report.layout.is_feasible());
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{Catalog, ModuleType};
use crate::compliance::{self, ComplianceResult};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::geometry::{HabitatGeometry, VesselShape};
use crate::packer::{self, PackOutcome};

/// Combined compliance score and layout for the current design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub compliance: ComplianceResult,
    pub layout: PackOutcome,
}

impl ValidationReport {
    /// One-line summary: tier, margin and layout state.
    pub fn summary(&self) -> String {
        let layout = match &self.layout {
            PackOutcome::Placed(p) if p.adjacency_shortfalls.is_empty() => {
                format!("{} modules placed", p.modules.len())
            }
            PackOutcome::Placed(p) => format!(
                "{} modules placed, {} required adjacencies unmet",
                p.modules.len(),
                p.adjacency_shortfalls.len()
            ),
            PackOutcome::Infeasible(i) => format!("layout infeasible ({i})"),
        };
        format!(
            "{} margin {} m³ ({}% of NHV); {}",
            self.compliance.status.label(),
            self.compliance.margin,
            self.compliance.utilization_pct,
            layout
        )
    }
}

/// An in-progress habitat design.
#[derive(Debug, Clone)]
pub struct DesignSession {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    crew_size: u32,
    geometry: HabitatGeometry,
    modules: Vec<ModuleType>,
    last_report: Option<ValidationReport>,
}

impl DesignSession {
    /// Start an empty design with default engine constants.
    pub fn new(catalog: Arc<Catalog>, crew_size: u32, shape: VesselShape) -> Result<Self> {
        Self::with_config(catalog, EngineConfig::default(), crew_size, shape)
    }

    pub fn with_config(
        catalog: Arc<Catalog>,
        config: EngineConfig,
        crew_size: u32,
        shape: VesselShape,
    ) -> Result<Self> {
        config.validate()?;
        check_crew_size(crew_size)?;
        let geometry = HabitatGeometry::with_reserve(shape, config.reserve_fraction)?;
        Ok(Self {
            catalog,
            config,
            crew_size,
            geometry,
            modules: Vec::new(),
            last_report: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn crew_size(&self) -> u32 {
        self.crew_size
    }

    pub fn geometry(&self) -> &HabitatGeometry {
        &self.geometry
    }

    /// Selected modules in insertion order.
    pub fn modules(&self) -> &[ModuleType] {
        &self.modules
    }

    /// Report from the last `validate`, unless a mutation has since dropped it.
    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.last_report.as_ref()
    }

    pub fn set_crew_size(&mut self, crew_size: u32) -> Result<()> {
        check_crew_size(crew_size)?;
        log::debug!("crew size {} -> {}", self.crew_size, crew_size);
        self.crew_size = crew_size;
        self.last_report = None;
        Ok(())
    }

    /// Replace the vessel. Any previous layout is discarded.
    pub fn set_geometry(&mut self, shape: VesselShape) -> Result<()> {
        let geometry = HabitatGeometry::with_reserve(shape, self.config.reserve_fraction)?;
        log::debug!("geometry -> {:?}", shape);
        self.geometry = geometry;
        self.last_report = None;
        Ok(())
    }

    /// Append one instance of a catalog module.
    pub fn add_module(&mut self, name: &str) -> Result<()> {
        let module = self.catalog.lookup(name)?.clone();
        log::debug!("add {}", module.name);
        self.modules.push(module);
        self.last_report = None;
        Ok(())
    }

    /// Append several modules; if any name is unknown none are added.
    pub fn add_modules<'a, I>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let resolved = names
            .into_iter()
            .map(|n| self.catalog.lookup(n).cloned())
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "add {} modules: {}",
            resolved.len(),
            resolved
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.modules.extend(resolved);
        self.last_report = None;
        Ok(())
    }

    /// Remove the most recently added instance of `name`.
    pub fn remove_module(&mut self, name: &str) -> Result<()> {
        self.catalog.lookup(name)?;
        let idx = self
            .modules
            .iter()
            .rposition(|m| m.name == name)
            .ok_or_else(|| EngineError::ModuleNotSelected(name.to_string()))?;
        log::debug!("remove {} (#{idx})", name);
        self.modules.remove(idx);
        self.last_report = None;
        Ok(())
    }

    pub fn clear_modules(&mut self) {
        self.modules.clear();
        self.last_report = None;
    }

    /// (name, volume) per selected module, insertion order.
    pub fn manifest(&self) -> Vec<(String, Decimal)> {
        self.modules
            .iter()
            .map(|m| (m.name.clone(), m.volume))
            .collect()
    }

    pub fn total_volume(&self) -> Result<Decimal> {
        compliance::total_volume(&self.modules)
    }

    /// Rescore and repack the current design.
    pub fn validate(&mut self) -> Result<ValidationReport> {
        let compliance = compliance::score(self.crew_size, &self.modules, &self.config.compliance)?;
        let layout = packer::pack(
            &self.catalog,
            &self.geometry,
            &self.modules,
            &self.config.packer,
        );
        let report = ValidationReport { compliance, layout };
        log::info!("validate: {}", report.summary());
        self.last_report = Some(report.clone());
        Ok(report)
    }
}

fn check_crew_size(crew_size: u32) -> Result<()> {
    if crew_size == 0 {
        return Err(EngineError::InvalidCrewSize(crew_size));
    }
    Ok(())
}
