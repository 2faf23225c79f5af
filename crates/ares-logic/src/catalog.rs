//! Module catalog — functional module types and zoning rules.
//!
//! The catalog is configuration: built once (in code or from JSON) and then
//! only read. It is an explicit value handed to the engine, so tests can
//! build as many independent catalogs as they like.
//!
//! ```
//! use ares_logic::catalog::{Catalog, Category};
//!
//! let catalog = Catalog::standard();
//! let sleep = catalog.lookup("Sleep").unwrap();
//! assert_eq!(sleep.category, Category::Sleep);
//! assert!(catalog.is_exclusive(Category::Hygiene, Category::Galley));
//! assert!(catalog.lookup("Airlock").is_err());
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::geometry::{Orientation, Vec3};

/// Zoning class of a module. Closed set; adjacency rules are expressed over these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sleep,
    Hygiene,
    Galley,
    Exercise,
    Stowage,
    Medical,
    LifeSupport,
    Social,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Sleep,
        Category::Hygiene,
        Category::Galley,
        Category::Exercise,
        Category::Stowage,
        Category::Medical,
        Category::LifeSupport,
        Category::Social,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sleep => "Sleep",
            Self::Hygiene => "Hygiene",
            Self::Galley => "Galley",
            Self::Exercise => "Exercise",
            Self::Stowage => "Stowage",
            Self::Medical => "Medical",
            Self::LifeSupport => "Life Support",
            Self::Social => "Social",
        }
    }
}

/// Box a module occupies when placed, before rotation (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Extent along x at `Yaw0`.
    pub width: f64,
    /// Extent along y at `Yaw0`.
    pub depth: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Footprint {
    pub const fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    pub fn volume(&self) -> f64 {
        self.width * self.depth * self.height
    }

    /// Axis extents after rotating about z.
    pub fn oriented(&self, orientation: Orientation) -> Vec3 {
        match orientation {
            Orientation::Yaw0 => Vec3::new(self.width, self.depth, self.height),
            Orientation::Yaw90 => Vec3::new(self.depth, self.width, self.height),
        }
    }

    /// Distinct orientations; a square plan gains nothing from rotating.
    pub fn orientations(&self) -> &'static [Orientation] {
        if self.width == self.depth {
            &[Orientation::Yaw0]
        } else {
            &[Orientation::Yaw0, Orientation::Yaw90]
        }
    }
}

/// A functional module type with its calibrated volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleType {
    pub name: String,
    pub category: Category,
    /// Habitable volume credited towards NHV (m³). Independent of placement.
    pub volume: Decimal,
    pub footprint: Footprint,
}

/// How two categories relate spatially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyKind {
    /// Regions of these categories must never touch.
    Exclusive,
    /// Regions of these categories should touch where possible.
    Required,
}

/// Adjacency rule over an unordered pair of categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoningRule {
    pub a: Category,
    pub b: Category,
    pub kind: AdjacencyKind,
}

impl ZoningRule {
    pub fn exclusive(a: Category, b: Category) -> Self {
        Self {
            a,
            b,
            kind: AdjacencyKind::Exclusive,
        }
    }

    pub fn required(a: Category, b: Category) -> Self {
        Self {
            a,
            b,
            kind: AdjacencyKind::Required,
        }
    }

    /// True if this rule covers `x` and `y` in either order.
    pub fn links(&self, x: Category, y: Category) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// The category paired with `c`, if `c` is part of this rule.
    pub fn partner_of(&self, c: Category) -> Option<Category> {
        if self.a == c {
            Some(self.b)
        } else if self.b == c {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Serialized catalog form: module list plus zoning rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDefinition {
    pub modules: Vec<ModuleType>,
    #[serde(default)]
    pub zoning_rules: Vec<ZoningRule>,
}

/// Immutable registry of module types in declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    modules: Vec<ModuleType>,
    index: HashMap<String, usize>,
    rules: Vec<ZoningRule>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(modules: Vec<ModuleType>, rules: Vec<ZoningRule>) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, m) in modules.iter().enumerate() {
            if m.name.trim().is_empty() {
                return Err(EngineError::InvalidCatalog(format!(
                    "module #{i} has an empty name"
                )));
            }
            if m.volume <= Decimal::ZERO {
                return Err(EngineError::InvalidCatalog(format!(
                    "module {} has non-positive volume {}",
                    m.name, m.volume
                )));
            }
            let f = m.footprint;
            if [f.width, f.depth, f.height]
                .iter()
                .any(|d| !d.is_finite() || *d <= 0.0)
            {
                return Err(EngineError::InvalidCatalog(format!(
                    "module {} has non-positive footprint {}×{}×{}",
                    m.name, f.width, f.depth, f.height
                )));
            }
            if index.insert(m.name.clone(), i).is_some() {
                return Err(EngineError::InvalidCatalog(format!(
                    "duplicate module name {}",
                    m.name
                )));
            }
        }

        for rule in &rules {
            let contradicted = rules
                .iter()
                .any(|other| other.kind != rule.kind && other.links(rule.a, rule.b));
            if contradicted {
                return Err(EngineError::InvalidCatalog(format!(
                    "{:?} and {:?} are declared both exclusive and required",
                    rule.a, rule.b
                )));
            }
        }

        Ok(Self {
            modules,
            index,
            rules,
        })
    }

    pub fn from_definition(definition: CatalogDefinition) -> Result<Self> {
        Self::new(definition.modules, definition.zoning_rules)
    }

    /// Parse a JSON [`CatalogDefinition`].
    pub fn from_json(text: &str) -> Result<Self> {
        let definition: CatalogDefinition = serde_json::from_str(text)?;
        Self::from_definition(definition)
    }

    /// The calibrated default palette.
    pub fn standard() -> Self {
        let (modules, rules) = standard_definition();
        let index = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self {
            modules,
            index,
            rules,
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&ModuleType> {
        self.index
            .get(name)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| EngineError::UnknownModule(name.to_string()))
    }

    /// All module types in declaration order.
    pub fn all(&self) -> &[ModuleType] {
        &self.modules
    }

    /// Position of `name` in declaration order.
    pub fn declaration_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn zoning_rules(&self) -> &[ZoningRule] {
        &self.rules
    }

    /// True if regions of `a` and `b` must not touch.
    pub fn is_exclusive(&self, a: Category, b: Category) -> bool {
        self.rules
            .iter()
            .any(|r| r.kind == AdjacencyKind::Exclusive && r.links(a, b))
    }

    /// Categories that `c` should be placed against.
    pub fn required_partners(&self, c: Category) -> Vec<Category> {
        let mut partners: Vec<Category> = self
            .rules
            .iter()
            .filter(|r| r.kind == AdjacencyKind::Required)
            .filter_map(|r| r.partner_of(c))
            .collect();
        partners.sort();
        partners.dedup();
        partners
    }

    pub fn to_definition(&self) -> CatalogDefinition {
        CatalogDefinition {
            modules: self.modules.clone(),
            zoning_rules: self.rules.clone(),
        }
    }
}

fn module(name: &str, category: Category, volume: Decimal, footprint: Footprint) -> ModuleType {
    ModuleType {
        name: name.to_string(),
        category,
        volume,
        footprint,
    }
}

fn standard_definition() -> (Vec<ModuleType>, Vec<ZoningRule>) {
    use Category::*;
    let modules = vec![
        // Private crew quarters minimum
        module(
            "Sleep",
            Sleep,
            Decimal::new(1396, 2),
            Footprint::new(2.0, 3.5, 2.0),
        ),
        module(
            "Hygiene",
            Hygiene,
            Decimal::new(5, 0),
            Footprint::new(1.25, 2.0, 2.0),
        ),
        module(
            "Galley",
            Galley,
            Decimal::new(10, 0),
            Footprint::new(2.0, 2.5, 2.0),
        ),
        module(
            "Exercise",
            Exercise,
            Decimal::new(15, 0),
            Footprint::new(2.5, 3.0, 2.0),
        ),
        module(
            "Stowage",
            Stowage,
            Decimal::new(8, 0),
            Footprint::new(2.0, 2.0, 2.0),
        ),
        module(
            "Medical",
            Medical,
            Decimal::new(58, 1),
            Footprint::new(1.45, 2.0, 2.0),
        ),
        module(
            "ECLSS",
            LifeSupport,
            Decimal::new(4, 0),
            Footprint::new(1.0, 2.0, 2.0),
        ),
        module(
            "Social",
            Social,
            Decimal::new(182, 1),
            Footprint::new(3.5, 2.6, 2.0),
        ),
    ];
    let rules = vec![
        ZoningRule::exclusive(Hygiene, Galley),
        ZoningRule::exclusive(Sleep, Exercise),
        ZoningRule::exclusive(Sleep, LifeSupport),
        ZoningRule::required(Galley, Stowage),
        ZoningRule::required(Exercise, Hygiene),
    ];
    (modules, rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(name: &str, category: Category) -> ModuleType {
        module(name, category, Decimal::ONE, Footprint::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let (modules, rules) = standard_definition();
        assert!(Catalog::new(modules, rules).is_ok());
    }

    #[test]
    fn standard_calibrated_volumes() {
        let catalog = Catalog::standard();
        let vol = |n: &str| catalog.lookup(n).unwrap().volume;
        assert_eq!(vol("Sleep"), Decimal::new(1396, 2));
        assert_eq!(vol("Galley"), Decimal::new(10, 0));
        assert_eq!(vol("Exercise"), Decimal::new(15, 0));
        assert_eq!(vol("Hygiene"), Decimal::new(5, 0));
        assert_eq!(vol("Stowage"), Decimal::new(8, 0));
    }

    #[test]
    fn all_preserves_declaration_order() {
        let catalog = Catalog::standard();
        let names: Vec<&str> = catalog.all().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names[0], "Sleep");
        assert_eq!(names[1], "Hygiene");
        assert_eq!(catalog.declaration_index("Galley"), Some(2));
        assert_eq!(catalog.declaration_index("Airlock"), None);
    }

    #[test]
    fn lookup_unknown_is_error() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.lookup("Airlock").unwrap_err(),
            EngineError::UnknownModule("Airlock".into())
        );
    }

    #[test]
    fn rules_are_unordered_pairs() {
        let catalog = Catalog::standard();
        assert!(catalog.is_exclusive(Category::Galley, Category::Hygiene));
        assert!(catalog.is_exclusive(Category::Hygiene, Category::Galley));
        assert!(!catalog.is_exclusive(Category::Galley, Category::Stowage));
        assert_eq!(
            catalog.required_partners(Category::Stowage),
            vec![Category::Galley]
        );
        assert!(catalog.required_partners(Category::Medical).is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Catalog::new(
            vec![tiny("Bunk", Category::Sleep), tiny("Bunk", Category::Sleep)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_non_positive_volume_and_footprint() {
        let mut zero_vol = tiny("Bunk", Category::Sleep);
        zero_vol.volume = Decimal::ZERO;
        assert!(Catalog::new(vec![zero_vol], vec![]).is_err());

        let mut flat = tiny("Bunk", Category::Sleep);
        flat.footprint.height = 0.0;
        assert!(Catalog::new(vec![flat], vec![]).is_err());

        assert!(Catalog::new(vec![tiny(" ", Category::Sleep)], vec![]).is_err());
    }

    #[test]
    fn rejects_contradictory_rules() {
        let rules = vec![
            ZoningRule::exclusive(Category::Sleep, Category::Galley),
            ZoningRule::required(Category::Galley, Category::Sleep),
        ];
        assert!(matches!(
            Catalog::new(vec![], rules),
            Err(EngineError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn square_footprint_has_one_orientation() {
        assert_eq!(Footprint::new(2.0, 2.0, 2.0).orientations().len(), 1);
        assert_eq!(Footprint::new(2.0, 3.5, 2.0).orientations().len(), 2);
        let rotated = Footprint::new(2.0, 3.5, 1.0).oriented(Orientation::Yaw90);
        assert_eq!(rotated, Vec3::new(3.5, 2.0, 1.0));
    }

    #[test]
    fn json_roundtrip_through_definition() {
        let catalog = Catalog::standard();
        let json = serde_json::to_string(&catalog.to_definition()).unwrap();
        let back = Catalog::from_json(&json).unwrap();
        assert_eq!(back.all(), catalog.all());
        assert_eq!(back.zoning_rules(), catalog.zoning_rules());
    }

    #[test]
    fn json_accepts_numeric_volumes_and_missing_rules() {
        let catalog = Catalog::from_json(
            r#"{ "modules": [ { "name": "Bunk", "category": "Sleep", "volume": 13.96,
                 "footprint": { "width": 2.0, "depth": 3.5, "height": 2.0 } } ] }"#,
        )
        .unwrap();
        assert_eq!(
            catalog.lookup("Bunk").unwrap().volume,
            Decimal::new(1396, 2)
        );
        assert!(catalog.zoning_rules().is_empty());
    }
}
