//! Pressure-vessel geometry and the box primitives the packer works with.
//!
//! Everything here is a plain value type with pure methods; there is no
//! shared mutable geometry. Axes are right-handed with x along the vessel's
//! long axis and z "up".
//!
//! ```text
//!   cylinder (side)                 cylinder (cross-section, looking down x)
//!   z                               z
//!   ^   ┌────────────────┐          ^    .-~~~-.
//!   |   │                │          |  /         \
//!   +-->│   x ∈ [0, L]   │          +-|-----+-----|-> y     y² + z² ≤ r²
//!       │                │             \         /
//!       └────────────────┘               '-...-'
//! ```
//!
//! ```
//! use ares_logic::geometry::HabitatGeometry;
//!
//! let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
//! assert!((hab.enclosed_volume() - 226.19).abs() < 0.01);
//! assert!((hab.usable_volume() - 192.27).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{validate_reserve_fraction, DEFAULT_RESERVE_FRACTION};
use crate::error::{EngineError, Result};

/// Absolute tolerance (meters) for contact and containment tests.
pub const GEOMETRY_TOLERANCE: f64 = 1e-9;

/// A point or extent in vessel coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned box, the region a placed module occupies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box with its min corner at `origin` and extents `size`.
    pub fn from_origin(origin: Vec3, size: Vec3) -> Self {
        Self {
            min: origin,
            max: Vec3::new(origin.x + size.x, origin.y + size.y, origin.z + size.z),
        }
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// True when the two boxes share a region of positive volume.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let tol = GEOMETRY_TOLERANCE;
        self.min.x < other.max.x - tol
            && other.min.x < self.max.x - tol
            && self.min.y < other.max.y - tol
            && other.min.y < self.max.y - tol
            && self.min.z < other.max.z - tol
            && other.min.z < self.max.z - tol
    }

    /// True when the boxes are in contact (face, edge or corner) without overlapping.
    pub fn touches(&self, other: &Aabb) -> bool {
        let tol = GEOMETRY_TOLERANCE;
        let closed_intersect = self.min.x <= other.max.x + tol
            && other.min.x <= self.max.x + tol
            && self.min.y <= other.max.y + tol
            && other.min.y <= self.max.y + tol
            && self.min.z <= other.max.z + tol
            && other.min.z <= self.max.z + tol;
        closed_intersect && !self.overlaps(other)
    }

    /// Volume of the intersection (0 for disjoint or touching boxes).
    pub fn intersection_volume(&self, other: &Aabb) -> f64 {
        let span = |a0: f64, a1: f64, b0: f64, b1: f64| (a1.min(b1) - a0.max(b0)).max(0.0);
        span(self.min.x, self.max.x, other.min.x, other.max.x)
            * span(self.min.y, self.max.y, other.min.y, other.max.y)
            * span(self.min.z, self.max.z, other.min.z, other.max.z)
    }
}

/// Rotation of a footprint about the vertical (z) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Footprint width along x, depth along y.
    Yaw0,
    /// Footprint width along y, depth along x.
    Yaw90,
}

impl Orientation {
    /// Candidate orientations in the order the packer tries them.
    pub const ALL: [Orientation; 2] = [Orientation::Yaw0, Orientation::Yaw90];

    pub fn degrees(&self) -> u16 {
        match self {
            Self::Yaw0 => 0,
            Self::Yaw90 => 90,
        }
    }
}

/// Usable shape of the pressure vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VesselShape {
    /// Right circular cylinder lying along x.
    Cylinder { radius: f64, length: f64 },
    /// Rectangular vessel, centred on the x axis.
    Box { length: f64, width: f64, height: f64 },
}

impl VesselShape {
    fn dimensions(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Cylinder { radius, length } => vec![("radius", radius), ("length", length)],
            Self::Box {
                length,
                width,
                height,
            } => vec![("length", length), ("width", width), ("height", height)],
        }
    }
}

/// Validated vessel geometry with its structural/circulation reserve.
///
/// Immutable once built; changing shape means building a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HabitatGeometry {
    shape: VesselShape,
    reserve_fraction: f64,
}

impl HabitatGeometry {
    /// Build with the default reserve fraction.
    pub fn new(shape: VesselShape) -> Result<Self> {
        Self::with_reserve(shape, DEFAULT_RESERVE_FRACTION)
    }

    /// Build with an explicit reserve fraction in `[0, 1)`.
    pub fn with_reserve(shape: VesselShape, reserve_fraction: f64) -> Result<Self> {
        for (name, value) in shape.dimensions() {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidGeometry(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        validate_reserve_fraction(reserve_fraction)?;
        Ok(Self {
            shape,
            reserve_fraction,
        })
    }

    /// Shorthand for a cylinder with the default reserve.
    pub fn cylinder(radius: f64, length: f64) -> Result<Self> {
        Self::new(VesselShape::Cylinder { radius, length })
    }

    pub fn shape(&self) -> &VesselShape {
        &self.shape
    }

    pub fn reserve_fraction(&self) -> f64 {
        self.reserve_fraction
    }

    /// Raw pressurized volume (m³).
    pub fn enclosed_volume(&self) -> f64 {
        match self.shape {
            VesselShape::Cylinder { radius, length } => {
                std::f64::consts::PI * radius * radius * length
            }
            VesselShape::Box {
                length,
                width,
                height,
            } => length * width * height,
        }
    }

    /// Enclosed volume minus the structural/circulation reserve (m³).
    pub fn usable_volume(&self) -> f64 {
        self.enclosed_volume() * (1.0 - self.reserve_fraction)
    }

    /// Smallest axis-aligned box enclosing the vessel interior.
    pub fn bounds(&self) -> Aabb {
        match self.shape {
            VesselShape::Cylinder { radius, length } => Aabb {
                min: Vec3::new(0.0, -radius, -radius),
                max: Vec3::new(length, radius, radius),
            },
            VesselShape::Box {
                length,
                width,
                height,
            } => Aabb {
                min: Vec3::new(0.0, -width / 2.0, -height / 2.0),
                max: Vec3::new(length, width / 2.0, height / 2.0),
            },
        }
    }

    /// True when `region` lies entirely inside the vessel wall.
    pub fn contains_region(&self, region: &Aabb) -> bool {
        let tol = GEOMETRY_TOLERANCE;
        let bounds = self.bounds();
        let in_box = region.min.x >= bounds.min.x - tol
            && region.max.x <= bounds.max.x + tol
            && region.min.y >= bounds.min.y - tol
            && region.max.y <= bounds.max.y + tol
            && region.min.z >= bounds.min.z - tol
            && region.max.z <= bounds.max.z + tol;
        if !in_box {
            return false;
        }
        match self.shape {
            VesselShape::Cylinder { radius, .. } => {
                // The cross-section rectangle is inside the disk iff its farthest corner is.
                let far_y = region.min.y.abs().max(region.max.y.abs());
                let far_z = region.min.z.abs().max(region.max.z.abs());
                far_y.hypot(far_z) <= radius + tol
            }
            VesselShape::Box { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(x: f64, y: f64, z: f64, side: f64) -> Aabb {
        Aabb::from_origin(Vec3::new(x, y, z), Vec3::new(side, side, side))
    }

    #[test]
    fn cylinder_volumes() {
        let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
        let expected = std::f64::consts::PI * 9.0 * 8.0;
        assert!((hab.enclosed_volume() - expected).abs() < 1e-9);
        assert!((hab.usable_volume() - expected * 0.85).abs() < 1e-9);
    }

    #[test]
    fn box_volumes_with_custom_reserve() {
        let shape = VesselShape::Box {
            length: 4.0,
            width: 2.0,
            height: 3.0,
        };
        let hab = HabitatGeometry::with_reserve(shape, 0.25).unwrap();
        assert!((hab.enclosed_volume() - 24.0).abs() < 1e-12);
        assert!((hab.usable_volume() - 18.0).abs() < 1e-12);
    }

    #[test]
    fn zero_reserve_means_usable_equals_enclosed() {
        let hab = HabitatGeometry::with_reserve(
            VesselShape::Cylinder {
                radius: 2.0,
                length: 5.0,
            },
            0.0,
        )
        .unwrap();
        assert_eq!(hab.enclosed_volume(), hab.usable_volume());
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        for (r, l) in [(0.0, 8.0), (3.0, 0.0), (-1.0, 8.0), (3.0, f64::INFINITY)] {
            assert!(
                matches!(
                    HabitatGeometry::cylinder(r, l),
                    Err(EngineError::InvalidGeometry(_))
                ),
                "r={r} l={l} should be rejected"
            );
        }
        let flat = VesselShape::Box {
            length: 4.0,
            width: 2.0,
            height: 0.0,
        };
        assert!(HabitatGeometry::new(flat).is_err());
    }

    #[test]
    fn rejects_bad_reserve() {
        let shape = VesselShape::Cylinder {
            radius: 3.0,
            length: 8.0,
        };
        assert!(matches!(
            HabitatGeometry::with_reserve(shape, 1.0),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn cylinder_contains_centred_box() {
        let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
        let region = Aabb::from_origin(Vec3::new(0.0, -1.0, -1.0), Vec3::new(8.0, 2.0, 2.0));
        assert!(hab.contains_region(&region));
    }

    #[test]
    fn cylinder_rejects_corner_outside_disk() {
        let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
        // 2.5² + 2.5² = 12.5 > 9
        let region = Aabb::from_origin(Vec3::new(0.0, 0.5, 0.5), Vec3::new(1.0, 2.0, 2.0));
        assert!(!hab.contains_region(&region));
    }

    #[test]
    fn cylinder_rejects_overhanging_ends() {
        let hab = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
        assert!(!hab.contains_region(&cube(-0.5, 0.0, 0.0, 1.0)));
        assert!(!hab.contains_region(&cube(7.5, 0.0, 0.0, 1.0)));
        assert!(hab.contains_region(&cube(7.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn box_vessel_bounds_are_centred() {
        let hab = HabitatGeometry::new(VesselShape::Box {
            length: 4.0,
            width: 2.0,
            height: 3.0,
        })
        .unwrap();
        let b = hab.bounds();
        assert_eq!(b.min, Vec3::new(0.0, -1.0, -1.5));
        assert_eq!(b.max, Vec3::new(4.0, 1.0, 1.5));
        assert!(hab.contains_region(&b));
    }

    #[test]
    fn overlap_and_touch_are_exclusive() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let face = cube(1.0, 0.0, 0.0, 1.0);
        let edge = cube(1.0, 1.0, 0.0, 1.0);
        let corner = cube(1.0, 1.0, 1.0, 1.0);
        let apart = cube(1.5, 0.0, 0.0, 1.0);
        let inside = cube(0.5, 0.5, 0.5, 1.0);

        for other in [&face, &edge, &corner] {
            assert!(a.touches(other));
            assert!(!a.overlaps(other));
        }
        assert!(!a.touches(&apart));
        assert!(!a.overlaps(&apart));
        assert!(a.overlaps(&inside));
        assert!(!a.touches(&inside));
    }

    #[test]
    fn intersection_volume_matches_overlap() {
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        assert!((a.intersection_volume(&b) - 1.0).abs() < 1e-12);
        assert_eq!(a.intersection_volume(&cube(2.0, 0.0, 0.0, 2.0)), 0.0);
    }

    #[test]
    fn shape_serializes_with_kind_tag() {
        let json = serde_json::to_string(&VesselShape::Cylinder {
            radius: 3.0,
            length: 8.0,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"cylinder","radius":3.0,"length":8.0}"#);
        let back: VesselShape =
            serde_json::from_str(r#"{"kind":"box","length":4,"width":2,"height":3}"#).unwrap();
        assert!(matches!(back, VesselShape::Box { .. }));
    }
}
