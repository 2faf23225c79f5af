//! ARES Headless Validation Harness
//!
//! Runs the constraint & layout engine against the shipped catalog, the
//! calibrated design scenarios and a seeded randomized sweep. Everything is
//! in-process — no dashboard, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p ares-simtest
//!   cargo run -p ares-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p ares-simtest

use std::sync::Arc;

use ares_logic::audit::{audit_placement, errors_only};
use ares_logic::catalog::{Catalog, CatalogDefinition, Category, Footprint, ModuleType, ZoningRule};
use ares_logic::compliance::{self, ComplianceTier};
use ares_logic::config::{ComplianceConfig, EngineConfig, PackerConfig};
use ares_logic::geometry::VesselShape;
use ares_logic::packer::{InfeasibleReason, PackOutcome};
use ares_logic::session::DesignSession;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

// ── Module catalog (same JSON a dashboard backend loads) ────────────────
const CATALOG_JSON: &str = include_str!("../../../data/module_catalog.json");

const SWEEP_SEED: u64 = 0xA2E5;
const SWEEP_DESIGNS: usize = 200;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== ARES Layout Engine Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog data validation
    let catalog = match load_catalog(&mut results) {
        Some(c) => Arc::new(c),
        None => Arc::new(Catalog::standard()),
    };

    // 2. Compliance boundary sweep
    results.extend(validate_compliance_boundaries(verbose));

    // 3. Calibrated design scenarios
    results.extend(validate_scenarios(&catalog, verbose));

    // 4. Randomized layout invariants
    results.extend(validate_random_designs(&catalog, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn load_catalog(results: &mut Vec<TestResult>) -> Option<Catalog> {
    println!("--- Module Catalog ---");

    let definition: CatalogDefinition = match serde_json::from_str(CATALOG_JSON) {
        Ok(d) => d,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    let catalog = match Catalog::from_definition(definition) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_valid".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "catalog_valid".into(),
        passed: true,
        detail: format!(
            "{} module types, {} zoning rules",
            catalog.all().len(),
            catalog.zoning_rules().len()
        ),
    });

    // Every zoning category has at least one module
    let missing: Vec<_> = Category::ALL
        .iter()
        .filter(|c| !catalog.all().iter().any(|m| m.category == **c))
        .map(|c| c.label())
        .collect();
    results.push(TestResult {
        name: "catalog_covers_categories".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "every category has a module".into()
        } else {
            format!("no module for: {}", missing.join(", "))
        },
    });

    // Footprints should not dwarf the declared habitable volume
    let oversized: Vec<_> = catalog
        .all()
        .iter()
        .filter(|m| {
            let declared: f64 = m.volume.try_into().unwrap_or(0.0);
            m.footprint.volume() > declared * 1.5
        })
        .map(|m| m.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_footprints_plausible".into(),
        passed: oversized.is_empty(),
        detail: if oversized.is_empty() {
            "footprints within 1.5× declared volume".into()
        } else {
            format!("oversized footprints: {}", oversized.join(", "))
        },
    });

    let standard = Catalog::standard();
    let matches = catalog.all() == standard.all() && catalog.zoning_rules() == standard.zoning_rules();
    results.push(TestResult {
        name: "catalog_matches_builtin".into(),
        passed: matches,
        detail: if matches {
            "shipped JSON equals built-in catalog".into()
        } else {
            "shipped JSON differs from built-in catalog".into()
        },
    });

    Some(catalog)
}

// ── 2. Compliance Boundaries ────────────────────────────────────────────

fn block(volume: Decimal) -> ModuleType {
    ModuleType {
        name: "Block".into(),
        category: Category::Stowage,
        volume,
        footprint: Footprint::new(1.0, 1.0, 1.0),
    }
}

fn validate_compliance_boundaries(verbose: bool) -> Vec<TestResult> {
    println!("--- Compliance Boundaries ---");
    let mut results = Vec::new();
    let config = ComplianceConfig::default();
    let cent = Decimal::new(1, 2);

    let mut wrong = Vec::new();
    let mut checked = 0;
    for crew in 1..=12u32 {
        let floor = Decimal::from(crew) * config.nhv_per_crew;
        let threshold = floor * config.yellow_buffer_fraction;
        let cases = [
            (floor - cent, ComplianceTier::Red),
            (floor, ComplianceTier::Yellow),
            (floor + threshold - cent, ComplianceTier::Yellow),
            (floor + threshold, ComplianceTier::Green),
        ];
        for (total, expected) in cases {
            checked += 1;
            match compliance::score(crew, &[block(total)], &config) {
                Ok(r) if r.status == expected => {
                    if verbose && crew == 1 {
                        println!("  {}", r.message());
                    }
                }
                Ok(r) => wrong.push(format!("crew {crew} total {total}: {:?}", r.status)),
                Err(e) => wrong.push(format!("crew {crew} total {total}: {e}")),
            }
        }
    }
    results.push(TestResult {
        name: "tier_boundaries".into(),
        passed: wrong.is_empty(),
        detail: if wrong.is_empty() {
            format!("{} boundary totals classified correctly", checked)
        } else {
            wrong.join("; ")
        },
    });

    let empty = compliance::score(1, &[], &config);
    results.push(TestResult {
        name: "empty_selection_red".into(),
        passed: matches!(&empty, Ok(r) if r.status == ComplianceTier::Red),
        detail: match &empty {
            Ok(r) => r.message(),
            Err(e) => e.to_string(),
        },
    });

    let zero = compliance::score(0, &[], &config);
    results.push(TestResult {
        name: "zero_crew_rejected".into(),
        passed: zero.is_err(),
        detail: match zero {
            Ok(_) => "zero crew accepted".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn scenario_vessel() -> VesselShape {
    VesselShape::Cylinder {
        radius: 3.0,
        length: 8.0,
    }
}

fn run_scenario(
    catalog: &Arc<Catalog>,
    config: EngineConfig,
    crew: u32,
    shape: VesselShape,
    names: &[&str],
) -> Result<(DesignSession, ares_logic::session::ValidationReport), String> {
    let mut session = DesignSession::with_config(Arc::clone(catalog), config, crew, shape)
        .map_err(|e| e.to_string())?;
    session
        .add_modules(names.iter().copied())
        .map_err(|e| e.to_string())?;
    let report = session.validate().map_err(|e| e.to_string())?;
    Ok((session, report))
}

fn validate_scenarios(catalog: &Arc<Catalog>, verbose: bool) -> Vec<TestResult> {
    println!("--- Design Scenarios ---");
    let mut results = Vec::new();

    // A: four crew, under-provisioned but physically packable
    let names = ["Sleep", "Sleep", "Sleep", "Sleep", "Galley", "Exercise"];
    match run_scenario(catalog, EngineConfig::default(), 4, scenario_vessel(), &names) {
        Ok((session, report)) => {
            if verbose {
                println!("  A: {}", report.summary());
            }
            let c = &report.compliance;
            results.push(TestResult {
                name: "scenario_a_compliance".into(),
                passed: c.status == ComplianceTier::Red && c.margin == Decimal::new(-3516, 2),
                detail: c.message(),
            });
            let clean = report
                .layout
                .placement()
                .map(|p| errors_only(&audit_placement(session.catalog(), session.geometry(), p)).is_empty())
                .unwrap_or(false);
            results.push(TestResult {
                name: "scenario_a_layout".into(),
                passed: clean,
                detail: format!(
                    "usable {:.2} m³ of {:.2} m³; {}",
                    session.geometry().usable_volume(),
                    session.geometry().enclosed_volume(),
                    report.summary()
                ),
            });
        }
        Err(e) => results.push(TestResult {
            name: "scenario_a".into(),
            passed: false,
            detail: e,
        }),
    }

    // B: single crew, two modules
    match run_scenario(catalog, EngineConfig::default(), 1, scenario_vessel(), &["Sleep", "Hygiene"]) {
        Ok((_, report)) => results.push(TestResult {
            name: "scenario_b".into(),
            passed: report.compliance.status == ComplianceTier::Red
                && report.compliance.margin == Decimal::new(-1004, 2),
            detail: report.summary(),
        }),
        Err(e) => results.push(TestResult {
            name: "scenario_b".into(),
            passed: false,
            detail: e,
        }),
    }

    // C: the tier depends on the configured buffer
    for (percent, expected) in [(10, ComplianceTier::Green), (15, ComplianceTier::Yellow)] {
        let config = EngineConfig {
            compliance: ComplianceConfig {
                yellow_buffer_fraction: Decimal::new(percent, 2),
                ..ComplianceConfig::default()
            },
            ..EngineConfig::default()
        };
        let name = format!("scenario_c_buffer_{}pct", percent);
        match run_scenario(catalog, config, 1, scenario_vessel(), &["Sleep", "Galley", "Stowage"]) {
            Ok((_, report)) => results.push(TestResult {
                name,
                passed: report.compliance.status == expected,
                detail: report.summary(),
            }),
            Err(e) => results.push(TestResult {
                name,
                passed: false,
                detail: e,
            }),
        }
    }

    // D: exclusive zoning leaves no legal spot
    results.push(scenario_d(verbose));

    results
}

fn scenario_d(verbose: bool) -> TestResult {
    let cube = Footprint::new(2.0, 2.0, 2.0);
    let catalog = Catalog::new(
        vec![
            ModuleType {
                name: "Hygiene".into(),
                category: Category::Hygiene,
                volume: Decimal::from(8),
                footprint: cube,
            },
            ModuleType {
                name: "Galley".into(),
                category: Category::Galley,
                volume: Decimal::from(6),
                footprint: cube,
            },
        ],
        vec![ZoningRule::exclusive(Category::Hygiene, Category::Galley)],
    );
    let catalog = match catalog {
        Ok(c) => Arc::new(c),
        Err(e) => {
            return TestResult {
                name: "scenario_d".into(),
                passed: false,
                detail: e.to_string(),
            }
        }
    };
    let shape = VesselShape::Box {
        length: 4.0,
        width: 2.0,
        height: 3.0,
    };
    match run_scenario(&catalog, EngineConfig::default(), 1, shape, &["Galley", "Hygiene"]) {
        Ok((_, report)) => {
            if verbose {
                println!("  D: {}", report.summary());
            }
            let passed = matches!(
                report.layout.infeasibility(),
                Some(i) if i.module == "Galley" && i.reason == InfeasibleReason::NoValidPosition
            );
            TestResult {
                name: "scenario_d".into(),
                passed,
                detail: report.summary(),
            }
        }
        Err(e) => TestResult {
            name: "scenario_d".into(),
            passed: false,
            detail: e,
        },
    }
}

// ── 4. Randomized Designs ───────────────────────────────────────────────

fn validate_random_designs(catalog: &Arc<Catalog>, verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Designs ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SWEEP_SEED);

    let mut placed = 0;
    let mut infeasible = [0usize; 3];
    let mut violations = Vec::new();
    let mut unstable = Vec::new();

    for design in 0..SWEEP_DESIGNS {
        let shape = if rng.gen_bool(0.7) {
            VesselShape::Cylinder {
                radius: rng.gen_range(4..=8) as f64 * 0.5,
                length: rng.gen_range(6..=24) as f64 * 0.5,
            }
        } else {
            VesselShape::Box {
                length: rng.gen_range(6..=24) as f64 * 0.5,
                width: rng.gen_range(4..=12) as f64 * 0.5,
                height: rng.gen_range(4..=8) as f64 * 0.5,
            }
        };
        let config = EngineConfig {
            packer: PackerConfig {
                grid_step: if rng.gen_bool(0.5) { 0.5 } else { 1.0 },
                candidate_budget: None,
            },
            ..EngineConfig::default()
        };
        let crew = rng.gen_range(1..=6);
        let count = rng.gen_range(0..=8);
        let names: Vec<&str> = (0..count)
            .map(|_| catalog.all()[rng.gen_range(0..catalog.all().len())].name.as_str())
            .collect();

        let (mut session, report) = match run_scenario(catalog, config, crew, shape, &names) {
            Ok(r) => r,
            Err(e) => {
                violations.push(format!("design {design}: {e}"));
                continue;
            }
        };

        match &report.layout {
            PackOutcome::Placed(p) => {
                placed += 1;
                let findings = audit_placement(session.catalog(), session.geometry(), p);
                let errors = errors_only(&findings);
                if !errors.is_empty() || p.modules.len() != names.len() {
                    violations.push(format!("design {design}: {:?}", errors));
                }
            }
            PackOutcome::Infeasible(i) => {
                let slot = match i.reason {
                    InfeasibleReason::NoValidPosition => 0,
                    InfeasibleReason::ExceedsUsableVolume => 1,
                    InfeasibleReason::Timeout => 2,
                };
                infeasible[slot] += 1;
            }
        }

        match session.validate() {
            Ok(again) if again == report => {}
            _ => unstable.push(design),
        }
    }

    log::info!(
        "sweep: {} placed, {} no position, {} over volume, {} timeout",
        placed,
        infeasible[0],
        infeasible[1],
        infeasible[2]
    );
    if verbose {
        println!(
            "  {} designs: {} placed, {:?} infeasible (position / volume / timeout)",
            SWEEP_DESIGNS, placed, infeasible
        );
    }

    results.push(TestResult {
        name: "random_layouts_audit_clean".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!("{} of {} designs placed, all audit-clean", placed, SWEEP_DESIGNS)
        } else {
            violations.join("; ")
        },
    });
    results.push(TestResult {
        name: "random_layouts_deterministic".into(),
        passed: unstable.is_empty(),
        detail: if unstable.is_empty() {
            "repeat validation reproduces every report".into()
        } else {
            format!("unstable designs: {:?}", unstable)
        },
    });
    results.push(TestResult {
        name: "random_layouts_no_timeout".into(),
        passed: infeasible[2] == 0,
        detail: format!("{} timeouts without a candidate budget", infeasible[2]),
    });

    results
}
