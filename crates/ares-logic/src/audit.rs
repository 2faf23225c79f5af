//! Independent validation of a finished layout.
//!
//! Pure functions that take a [`Placement`] and return every violation
//! found. They do not trust the packer: tests and the harness use them to
//! check containment, overlap and zoning invariants from scratch.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::geometry::{HabitatGeometry, GEOMETRY_TOLERANCE};
use crate::packer::{adjacency_shortfalls, Placement};

/// A layout audit finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutViolation {
    pub check: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Every placed region must lie inside the vessel wall.
pub fn check_containment(geometry: &HabitatGeometry, placement: &Placement) -> Vec<LayoutViolation> {
    placement
        .modules
        .iter()
        .enumerate()
        .filter(|(_, m)| !geometry.contains_region(&m.region()))
        .map(|(i, m)| LayoutViolation {
            check: "containment",
            severity: Severity::Error,
            message: format!(
                "#{i} {} at ({:.2}, {:.2}, {:.2}) extends outside the vessel",
                m.name, m.position.x, m.position.y, m.position.z
            ),
        })
        .collect()
}

/// No two placed regions may share positive volume.
pub fn check_overlaps(placement: &Placement) -> Vec<LayoutViolation> {
    let mut errors = Vec::new();
    let modules = &placement.modules;
    for i in 0..modules.len() {
        for j in (i + 1)..modules.len() {
            let (a, b) = (&modules[i], &modules[j]);
            let shared = a.region().intersection_volume(&b.region());
            if shared > GEOMETRY_TOLERANCE {
                errors.push(LayoutViolation {
                    check: "overlap",
                    severity: Severity::Error,
                    message: format!(
                        "#{i} {} and #{j} {} share {shared:.3} m³",
                        a.name, b.name
                    ),
                });
            }
        }
    }
    errors
}

/// Exclusive-adjacent categories must not touch; unmet required
/// adjacencies are reported as warnings.
pub fn check_zoning(catalog: &Catalog, placement: &Placement) -> Vec<LayoutViolation> {
    let mut findings = Vec::new();
    let modules = &placement.modules;
    for i in 0..modules.len() {
        for j in (i + 1)..modules.len() {
            let (a, b) = (&modules[i], &modules[j]);
            if catalog.is_exclusive(a.category, b.category) && a.region().touches(&b.region()) {
                findings.push(LayoutViolation {
                    check: "zoning",
                    severity: Severity::Error,
                    message: format!(
                        "#{i} {} ({:?}) touches #{j} {} ({:?})",
                        a.name, a.category, b.name, b.category
                    ),
                });
            }
        }
    }
    for s in adjacency_shortfalls(catalog, modules) {
        findings.push(LayoutViolation {
            check: "zoning",
            severity: Severity::Warning,
            message: format!("no {:?} region touches a {:?} region", s.a, s.b),
        });
    }
    findings
}

/// Footprints together must fit in the usable volume.
pub fn check_usable_volume(geometry: &HabitatGeometry, placement: &Placement) -> Vec<LayoutViolation> {
    let used = placement.footprint_volume();
    let usable = geometry.usable_volume();
    if used > usable + GEOMETRY_TOLERANCE {
        vec![LayoutViolation {
            check: "usable_volume",
            severity: Severity::Error,
            message: format!("footprints use {used:.2} m³ of {usable:.2} m³ usable"),
        }]
    } else {
        Vec::new()
    }
}

/// All checks combined.
pub fn audit_placement(
    catalog: &Catalog,
    geometry: &HabitatGeometry,
    placement: &Placement,
) -> Vec<LayoutViolation> {
    let mut findings = check_containment(geometry, placement);
    findings.extend(check_overlaps(placement));
    findings.extend(check_zoning(catalog, placement));
    findings.extend(check_usable_volume(geometry, placement));
    findings
}

/// Only the findings that invalidate a layout.
pub fn errors_only(findings: &[LayoutViolation]) -> Vec<&LayoutViolation> {
    findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .collect()
}
