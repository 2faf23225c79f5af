//! First-fit-decreasing layout packer.
//!
//! Assigns every selected module an axis-aligned box inside the vessel so
//! that no two boxes overlap and no exclusive-adjacent categories touch.
//! The search is a deterministic heuristic, not an optimizer:
//!
//! 1. Order modules by descending volume, then catalog declaration order,
//!    then selection order.
//! 2. For each module, walk a lattice of candidate min-corners (z outer,
//!    then y, then x; `Yaw0` before `Yaw90`) and take the first candidate
//!    that is contained, overlap-free and zoning-clean. When a
//!    required-adjacent partner is already placed, a candidate touching it
//!    is preferred over the first clean one.
//! 3. The first module with no valid candidate fails the whole pack. There
//!    is no backtracking.
//!
//! ```
//! use ares_logic::catalog::Catalog;
//! use ares_logic::config::PackerConfig;
//! use ares_logic::geometry::HabitatGeometry;
//! use ares_logic::packer::pack;
//!
//! let catalog = Catalog::standard();
//! let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
//! let modules = vec![catalog.lookup("Sleep").unwrap().clone()];
//! let outcome = pack(&catalog, &hab, &modules, &PackerConfig::default());
//! assert_eq!(outcome.placement().unwrap().modules.len(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AdjacencyKind, Catalog, Category, ModuleType};
use crate::config::PackerConfig;
use crate::geometry::{Aabb, HabitatGeometry, Orientation, Vec3, GEOMETRY_TOLERANCE};

/// A module bound to a position inside the vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedModule {
    pub name: String,
    pub category: Category,
    /// Min corner of the occupied box.
    pub position: Vec3,
    pub orientation: Orientation,
    /// Box extents after orientation.
    pub dimensions: Vec3,
}

impl PlacedModule {
    pub fn region(&self) -> Aabb {
        Aabb::from_origin(self.position, self.dimensions)
    }
}

/// A required-adjacent category pair that ended up with no touching regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyShortfall {
    pub a: Category,
    pub b: Category,
}

/// A complete, valid layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    /// Placed modules in packing order.
    pub modules: Vec<PlacedModule>,
    pub adjacency_shortfalls: Vec<AdjacencyShortfall>,
}

impl Placement {
    pub fn footprint_volume(&self) -> f64 {
        self.modules.iter().map(|m| m.region().volume()).sum()
    }

    /// All placed instances of a module name.
    pub fn instances<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PlacedModule> + 'a {
        self.modules.iter().filter(move |m| m.name == name)
    }
}

/// Why a module could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// Every lattice candidate was uncontained, overlapping or zoning-blocked.
    NoValidPosition,
    /// Footprints placed so far plus this one exceed the usable volume.
    ExceedsUsableVolume,
    /// The candidate budget ran out.
    Timeout,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoValidPosition => "no valid position",
            Self::ExceedsUsableVolume => "exceeds usable volume",
            Self::Timeout => "timeout",
        })
    }
}

/// The blocking module and the reason it could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infeasibility {
    pub module: String,
    pub reason: InfeasibleReason,
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.module, self.reason)
    }
}

/// Result of a packing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PackOutcome {
    Placed(Placement),
    Infeasible(Infeasibility),
}

impl PackOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Placed(_))
    }

    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Self::Placed(p) => Some(p),
            Self::Infeasible(_) => None,
        }
    }

    pub fn infeasibility(&self) -> Option<&Infeasibility> {
        match self {
            Self::Placed(_) => None,
            Self::Infeasible(i) => Some(i),
        }
    }
}

/// Indices of `modules` in packing order.
///
/// Descending volume; ties by catalog declaration order, then by position
/// in `modules` (the sort is stable).
pub fn packing_order(catalog: &Catalog, modules: &[ModuleType]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..modules.len()).collect();
    order.sort_by(|&i, &j| {
        let (a, b) = (&modules[i], &modules[j]);
        b.volume.cmp(&a.volume).then_with(|| {
            let rank = |m: &ModuleType| catalog.declaration_index(&m.name).unwrap_or(usize::MAX);
            rank(a).cmp(&rank(b))
        })
    });
    order
}

/// Lattice of candidate min-corners over the vessel bounding box.
///
/// Anchored at the bounds' min corner with pitch `step`; z varies slowest,
/// x fastest.
pub fn candidate_origins(geometry: &HabitatGeometry, step: f64) -> impl Iterator<Item = Vec3> {
    let bounds = geometry.bounds();
    let size = bounds.size();
    // Float-to-int casts saturate, so a degenerate step yields a huge but finite lattice.
    let count = |extent: f64| ((extent / step + 1e-9).floor() as usize).saturating_add(1);
    let (nx, ny, nz) = (count(size.x), count(size.y), count(size.z));
    let min = bounds.min;
    (0..nz).flat_map(move |k| {
        (0..ny).flat_map(move |j| {
            (0..nx).map(move |i| {
                Vec3::new(
                    min.x + i as f64 * step,
                    min.y + j as f64 * step,
                    min.z + k as f64 * step,
                )
            })
        })
    })
}

/// Pack `modules` into `geometry`, honouring the catalog's zoning rules.
pub fn pack(
    catalog: &Catalog,
    geometry: &HabitatGeometry,
    modules: &[ModuleType],
    config: &PackerConfig,
) -> PackOutcome {
    let mut state = PackState {
        catalog,
        geometry,
        config,
        placed: Vec::with_capacity(modules.len()),
        footprint_total: 0.0,
        evaluated: 0,
    };

    for idx in packing_order(catalog, modules) {
        let module = &modules[idx];
        match state.place(module) {
            Ok(placed) => {
                log::debug!(
                    "placed {} at ({:.2}, {:.2}, {:.2}) yaw {}",
                    placed.name,
                    placed.position.x,
                    placed.position.y,
                    placed.position.z,
                    placed.orientation.degrees()
                );
                state.footprint_total += placed.region().volume();
                state.placed.push(placed);
            }
            Err(reason) => {
                log::warn!(
                    "layout infeasible: {} ({reason}) after {} placed, {} candidates evaluated",
                    module.name,
                    state.placed.len(),
                    state.evaluated
                );
                return PackOutcome::Infeasible(Infeasibility {
                    module: module.name.clone(),
                    reason,
                });
            }
        }
    }

    let adjacency_shortfalls = adjacency_shortfalls(catalog, &state.placed);
    for s in &adjacency_shortfalls {
        log::warn!("required adjacency {:?}–{:?} not achieved", s.a, s.b);
    }
    PackOutcome::Placed(Placement {
        modules: state.placed,
        adjacency_shortfalls,
    })
}

struct PackState<'a> {
    catalog: &'a Catalog,
    geometry: &'a HabitatGeometry,
    config: &'a PackerConfig,
    placed: Vec<PlacedModule>,
    footprint_total: f64,
    evaluated: u64,
}

impl PackState<'_> {
    fn place(&mut self, module: &ModuleType) -> Result<PlacedModule, InfeasibleReason> {
        let footprint = module.footprint;
        if self.footprint_total + footprint.volume()
            > self.geometry.usable_volume() + GEOMETRY_TOLERANCE
        {
            return Err(InfeasibleReason::ExceedsUsableVolume);
        }

        let partners = self.catalog.required_partners(module.category);
        let partner_regions: Vec<Aabb> = self
            .placed
            .iter()
            .filter(|p| partners.contains(&p.category))
            .map(PlacedModule::region)
            .collect();

        let mut fallback: Option<(Vec3, Orientation, Vec3)> = None;
        for origin in candidate_origins(self.geometry, self.config.grid_step) {
            for &orientation in footprint.orientations() {
                self.evaluated += 1;
                if let Some(budget) = self.config.candidate_budget {
                    if self.evaluated > budget {
                        return Err(InfeasibleReason::Timeout);
                    }
                }

                let dims = footprint.oriented(orientation);
                let region = Aabb::from_origin(origin, dims);
                if !self.is_valid(module.category, &region) {
                    continue;
                }
                if partner_regions.is_empty() || partner_regions.iter().any(|p| p.touches(&region))
                {
                    return Ok(self.bind(module, origin, orientation, dims));
                }
                if fallback.is_none() {
                    fallback = Some((origin, orientation, dims));
                }
            }
        }

        fallback
            .map(|(origin, orientation, dims)| self.bind(module, origin, orientation, dims))
            .ok_or(InfeasibleReason::NoValidPosition)
    }

    fn is_valid(&self, category: Category, region: &Aabb) -> bool {
        if !self.geometry.contains_region(region) {
            return false;
        }
        self.placed.iter().all(|p| {
            let other = p.region();
            !other.overlaps(region)
                && !(self.catalog.is_exclusive(category, p.category) && other.touches(region))
        })
    }

    fn bind(
        &self,
        module: &ModuleType,
        position: Vec3,
        orientation: Orientation,
        dimensions: Vec3,
    ) -> PlacedModule {
        PlacedModule {
            name: module.name.clone(),
            category: module.category,
            position,
            orientation,
            dimensions,
        }
    }
}

/// Required-adjacent pairs present in `placed` with no touching instances.
pub fn adjacency_shortfalls(catalog: &Catalog, placed: &[PlacedModule]) -> Vec<AdjacencyShortfall> {
    let mut shortfalls: Vec<AdjacencyShortfall> = Vec::new();
    for rule in catalog
        .zoning_rules()
        .iter()
        .filter(|r| r.kind == AdjacencyKind::Required)
    {
        let regions_of = |c: Category| -> Vec<(usize, Aabb)> {
            placed
                .iter()
                .enumerate()
                .filter(|(_, p)| p.category == c)
                .map(|(i, p)| (i, p.region()))
                .collect()
        };
        let (ra, rb) = (regions_of(rule.a), regions_of(rule.b));
        if ra.is_empty() || rb.is_empty() {
            continue;
        }
        let satisfied = ra
            .iter()
            .any(|(i, a)| rb.iter().any(|(j, b)| i != j && a.touches(b)));
        let already = shortfalls
            .iter()
            .any(|s| (s.a == rule.a && s.b == rule.b) || (s.a == rule.b && s.b == rule.a));
        if !satisfied && !already {
            shortfalls.push(AdjacencyShortfall {
                a: rule.a,
                b: rule.b,
            });
        }
    }
    shortfalls
}
