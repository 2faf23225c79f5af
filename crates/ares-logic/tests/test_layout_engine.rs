//! Integration tests for the full validation pipeline.
//!
//! Exercises: Catalog → DesignSession → ComplianceResult + PackOutcome,
//! then re-checks every successful layout with the independent audit.
//!
//! All tests are pure logic — no UI, no rendering.

use std::sync::Arc;

use ares_logic::audit::{audit_placement, errors_only};
use ares_logic::catalog::{Catalog, Category, Footprint, ModuleType, ZoningRule};
use ares_logic::compliance::{score, ComplianceTier};
use ares_logic::config::{ComplianceConfig, EngineConfig, PackerConfig};
use ares_logic::geometry::{HabitatGeometry, VesselShape};
use ares_logic::packer::{pack, InfeasibleReason, PackOutcome};
use ares_logic::session::DesignSession;
use proptest::prelude::*;
use rust_decimal::Decimal;

const CATALOG_JSON: &str = include_str!("../../../data/module_catalog.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn scenario_vessel() -> VesselShape {
    VesselShape::Cylinder {
        radius: 3.0,
        length: 8.0,
    }
}

fn session(crew: u32, names: &[&str]) -> DesignSession {
    let mut s = DesignSession::new(Arc::new(Catalog::standard()), crew, scenario_vessel()).unwrap();
    s.add_modules(names.iter().copied()).unwrap();
    s
}

fn with_volume(volume: Decimal) -> ModuleType {
    ModuleType {
        name: "Block".into(),
        category: Category::Stowage,
        volume,
        footprint: Footprint::new(1.0, 1.0, 1.0),
    }
}

/// Hygiene and Galley that must never touch, sized for a 4 × 2 × 3 m box.
fn wet_dry_catalog() -> Catalog {
    Catalog::new(
        vec![
            ModuleType {
                name: "Hygiene".into(),
                category: Category::Hygiene,
                volume: dec("8"),
                footprint: Footprint::new(2.0, 2.0, 2.0),
            },
            ModuleType {
                name: "Galley".into(),
                category: Category::Galley,
                volume: dec("6"),
                footprint: Footprint::new(2.0, 2.0, 2.0),
            },
        ],
        vec![ZoningRule::exclusive(Category::Hygiene, Category::Galley)],
    )
    .unwrap()
}

fn assert_layout_clean(session: &DesignSession, outcome: &PackOutcome) {
    if let PackOutcome::Placed(placement) = outcome {
        let findings = audit_placement(session.catalog(), session.geometry(), placement);
        assert!(
            errors_only(&findings).is_empty(),
            "audit errors: {findings:?}"
        );
        assert_eq!(placement.modules.len(), session.modules().len());
    }
}

// ── Catalog data ───────────────────────────────────────────────────────

#[test]
fn shipped_catalog_matches_standard() {
    let loaded = Catalog::from_json(CATALOG_JSON).unwrap();
    let standard = Catalog::standard();
    assert_eq!(loaded.all(), standard.all());
    assert_eq!(loaded.zoning_rules(), standard.zoning_rules());
}

// ── Calibrated scenarios ───────────────────────────────────────────────

#[test]
fn scenario_a_four_crew_is_red_but_packs() {
    let mut s = session(
        4,
        &["Sleep", "Sleep", "Sleep", "Sleep", "Galley", "Exercise"],
    );
    assert!((s.geometry().enclosed_volume() - 226.19).abs() < 0.01);
    assert!((s.geometry().usable_volume() - 192.27).abs() < 0.01);

    let report = s.validate().unwrap();
    assert_eq!(report.compliance.total_volume, dec("80.84"));
    assert_eq!(report.compliance.nhv_floor, dec("116"));
    assert_eq!(report.compliance.margin, dec("-35.16"));
    assert_eq!(report.compliance.status, ComplianceTier::Red);
    assert!(report.layout.is_feasible());
    assert_layout_clean(&s, &report.layout);
}

#[test]
fn scenario_b_single_crew_is_red() {
    let mut s = session(1, &["Sleep", "Hygiene"]);
    let report = s.validate().unwrap();
    assert_eq!(report.compliance.total_volume, dec("18.96"));
    assert_eq!(report.compliance.nhv_floor, dec("29"));
    assert_eq!(report.compliance.margin, dec("-10.04"));
    assert_eq!(report.compliance.status, ComplianceTier::Red);
    assert_layout_clean(&s, &report.layout);
}

#[test]
fn scenario_c_tier_follows_configured_buffer() {
    let cases = [
        ("0.05", ComplianceTier::Green),
        ("0.10", ComplianceTier::Green),
        ("0.15", ComplianceTier::Yellow),
    ];
    for (fraction, expected) in cases {
        let config = EngineConfig {
            compliance: ComplianceConfig {
                yellow_buffer_fraction: dec(fraction),
                ..ComplianceConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut s =
            DesignSession::with_config(Arc::new(Catalog::standard()), config, 1, scenario_vessel())
                .unwrap();
        s.add_modules(["Sleep", "Galley", "Stowage"]).unwrap();
        let report = s.validate().unwrap();
        assert_eq!(report.compliance.margin, dec("2.96"));
        assert_eq!(
            report.compliance.status, expected,
            "buffer fraction {fraction}"
        );
    }
}

#[test]
fn scenario_d_exclusive_contact_blocks_galley() {
    let shape = VesselShape::Box {
        length: 4.0,
        width: 2.0,
        height: 3.0,
    };
    let mut s = DesignSession::new(Arc::new(wet_dry_catalog()), 1, shape).unwrap();
    s.add_modules(["Galley", "Hygiene"]).unwrap();
    let report = s.validate().unwrap();

    let blocked = report.layout.infeasibility().expect("layout must fail");
    assert_eq!(blocked.module, "Galley");
    assert_eq!(blocked.reason, InfeasibleReason::NoValidPosition);
    assert_eq!(blocked.to_string(), "Galley: no valid position");
    // Scoring is unaffected by the layout failure.
    assert_eq!(report.compliance.total_volume, dec("14"));
}

#[test]
fn scenario_d_longer_vessel_leaves_a_gap() {
    let shape = VesselShape::Box {
        length: 4.5,
        width: 2.0,
        height: 3.0,
    };
    let mut s = DesignSession::new(Arc::new(wet_dry_catalog()), 1, shape).unwrap();
    s.add_modules(["Galley", "Hygiene"]).unwrap();
    let report = s.validate().unwrap();
    assert!(report.layout.is_feasible());
    assert_layout_clean(&s, &report.layout);
}

// ── Session behaviour ──────────────────────────────────────────────────

#[test]
fn replacing_geometry_repacks_from_scratch() {
    let mut s = session(2, &["Social", "Sleep", "Sleep"]);
    assert!(s.validate().unwrap().layout.is_feasible());

    s.set_geometry(VesselShape::Cylinder {
        radius: 1.5,
        length: 3.0,
    })
    .unwrap();
    assert!(s.last_report().is_none());
    let report = s.validate().unwrap();
    assert_eq!(report.layout.infeasibility().unwrap().module, "Social");
}

#[test]
fn report_serializes_for_dashboard() {
    let mut s = session(1, &["Sleep"]);
    let report = s.validate().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["compliance"]["status"], "RED");
    assert_eq!(json["layout"]["outcome"], "placed");
    assert_eq!(json["layout"]["modules"][0]["name"], "Sleep");
}

#[test]
fn direct_pack_matches_session_layout() {
    let mut s = session(3, &["Medical", "Sleep", "ECLSS", "Galley", "Stowage"]);
    let report = s.validate().unwrap();
    let geometry = HabitatGeometry::cylinder(3.0, 8.0).unwrap();
    let direct = pack(
        &Catalog::standard(),
        &geometry,
        s.modules(),
        &PackerConfig::default(),
    );
    assert_eq!(direct, report.layout);
}

// ── Properties ─────────────────────────────────────────────────────────

fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|c| Decimal::new(c, 2))
}

fn buffer_fraction() -> impl Strategy<Value = Decimal> {
    (0i64..=30).prop_map(|p| Decimal::new(p, 2))
}

fn vessel_shape() -> impl Strategy<Value = VesselShape> {
    let half_metres = |lo: u32, hi: u32| (lo..=hi).prop_map(|n| n as f64 * 0.5);
    prop_oneof![
        (half_metres(4, 7), half_metres(8, 20))
            .prop_map(|(radius, length)| VesselShape::Cylinder { radius, length }),
        (half_metres(8, 20), half_metres(4, 12), half_metres(4, 8)).prop_map(
            |(length, width, height)| VesselShape::Box {
                length,
                width,
                height
            }
        ),
    ]
}

fn standard_selection() -> impl Strategy<Value = Vec<&'static str>> {
    let names = vec![
        "Sleep", "Hygiene", "Galley", "Exercise", "Stowage", "Medical", "ECLSS", "Social",
    ];
    prop::collection::vec(prop::sample::select(names), 0..8)
}

proptest! {
    #[test]
    fn at_or_above_buffer_is_green(crew in 1u32..50, extra in cents(), fraction in buffer_fraction()) {
        let config = ComplianceConfig { yellow_buffer_fraction: fraction, ..ComplianceConfig::default() };
        let floor = Decimal::from(crew) * config.nhv_per_crew;
        let total = floor + floor * fraction + extra;
        let r = score(crew, &[with_volume(total)], &config).unwrap();
        prop_assert_eq!(r.status, ComplianceTier::Green);
    }

    #[test]
    fn exactly_at_floor_is_yellow(crew in 1u32..50) {
        let config = ComplianceConfig::default();
        let floor = Decimal::from(crew) * dec("29");
        let r = score(crew, &[with_volume(floor)], &config).unwrap();
        prop_assert_eq!(r.margin, Decimal::ZERO);
        prop_assert_eq!(r.status, ComplianceTier::Yellow);
    }

    #[test]
    fn below_floor_is_red(crew in 1u32..50, short in 1i64..100_000, fraction in buffer_fraction()) {
        let config = ComplianceConfig { yellow_buffer_fraction: fraction, ..ComplianceConfig::default() };
        let floor = Decimal::from(crew) * config.nhv_per_crew;
        let total = (floor - Decimal::new(short, 2)).max(Decimal::new(1, 2));
        let r = score(crew, &[with_volume(total)], &config).unwrap();
        prop_assert_eq!(r.status, ComplianceTier::Red);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn successful_layouts_hold_every_invariant(
        names in standard_selection(),
        shape in vessel_shape(),
        grid_step in prop::sample::select(vec![0.5, 1.0]),
        reserve in prop::sample::select(vec![0.0, 0.10, 0.15]),
    ) {
        let config = EngineConfig {
            packer: PackerConfig { grid_step, candidate_budget: None },
            reserve_fraction: reserve,
            ..EngineConfig::default()
        };
        let mut s = DesignSession::with_config(Arc::new(Catalog::standard()), config, 2, shape).unwrap();
        s.add_modules(names.iter().copied()).unwrap();
        let report = s.validate().unwrap();
        if let PackOutcome::Placed(placement) = &report.layout {
            let findings = audit_placement(s.catalog(), s.geometry(), placement);
            prop_assert!(errors_only(&findings).is_empty(), "audit errors: {:?}", findings);
            prop_assert_eq!(placement.modules.len(), names.len());
            prop_assert!(placement.footprint_volume() <= s.geometry().usable_volume() + 1e-9);
        }
    }

    #[test]
    fn validate_is_idempotent(names in standard_selection(), crew in 1u32..8) {
        let mut s = session(crew, &names);
        let first = s.validate().unwrap();
        let second = s.validate().unwrap();
        prop_assert_eq!(first, second);
    }
}
