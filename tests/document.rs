//! End-to-end tests: YAML fixtures through the loader, adapters and
//! document assembly.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use swan_config::config::SECTIONS;
use swan_config::{Bindings, ConfigError, ConfigLoader, RunPeriod, SwanConfig};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap()
}

fn period() -> RunPeriod {
    RunPeriod::new(at(1, 0), at(2, 0), Duration::hours(1)).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn headers(text: &str) -> Vec<&str> {
    text.lines().filter_map(|l| l.strip_prefix("$ ")).collect()
}

fn commands(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('$'))
        .collect()
}

fn cgrid() -> serde_json::Value {
    json!({
        "grid": {"xp": 0.0, "yp": 0.0, "xlen": 10.0, "ylen": 10.0, "mx": 10, "my": 10},
        "spectrum": {"mdc": 36, "flow": 0.04, "fhigh": 1.0}
    })
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn full_run_renders_every_section_in_order() {
    init_tracing();
    let config = ConfigLoader::new(fixtures()).load("full_run.yaml").unwrap();
    let period = period();
    let text = config.assemble(&Bindings::new().period(&period)).unwrap();

    assert_eq!(headers(&text), SECTIONS.to_vec());
    assert!(text.contains("$ boundary and initial conditions\nBOUND SHAPESPEC"));
    assert!(text.contains("INITIAL DEFAULT"));
    assert!(text.contains("OUTPUT tbegblk=20240101.000000 deltblk=1800.0 SEC"));
    assert!(text.contains("OUTPUT tbegtbl=20240101.000000 delttbl=3600.0 SEC"));
    assert!(text.contains("SPECOUT sname='buoys' fname='buoys.spec' OUTPUT tbegspc=20240101.000000 deltspc=3600.0 SEC"));
    assert!(text.ends_with("deltc=1.0 HR tendc=20240102.000000\nSTOP\n"));
    for line in text.lines() {
        assert!(line.len() <= swan_config::MAX_WIDTH, "line too long: {line}");
    }
}

#[test]
fn assembly_is_idempotent() {
    let config = ConfigLoader::new(fixtures()).load("full_run.yaml").unwrap();
    let period = period();
    let bindings = Bindings::new().period(&period);
    assert_eq!(config.assemble(&bindings).unwrap(), config.assemble(&bindings).unwrap());
}

#[test]
fn minimal_grid_startup_and_physics_is_four_commands() {
    let config = ConfigLoader::new(fixtures()).load("minimal.yaml").unwrap();
    let text = config.assemble(&Bindings::new()).unwrap();
    assert_eq!(
        commands(&text),
        vec![
            "MODE STATIONARY TWODIMENSIONAL",
            "COORDINATES CARTESIAN",
            "CGRID REGULAR xpc=110.0 ypc=-35.2 alpc=4.0 xlenc=5.0 ylenc=4.0 mxc=15 myc=10 CIRCLE mdc=36 flow=0.04 fhigh=1.0",
            "GEN3 WESTHUYSEN DRAG WU",
        ]
    );
    assert_eq!(headers(&text), vec!["startup", "computational grid", "physics"]);
}

#[test]
fn unknown_boundary_location_lists_the_legal_tags() {
    let err = ConfigLoader::new(fixtures())
        .load("unknown_location.yaml")
        .unwrap_err();
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::UnknownVariant { path, tag, expected }) => {
            assert_eq!(path, "boundary.location");
            assert_eq!(tag, "corner");
            assert_eq!(expected, &vec!["side", "segment", "points"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

// ============================================================================
// Late binding
// ============================================================================

#[test]
fn output_interval_override_keeps_derived_start() {
    let config = SwanConfig::from_value(json!({
        "cgrid": cgrid(),
        "output": {
            "block": {"sname": "COMPGRID", "fname": "hs.mat", "output": ["hsign"], "times": {"delt": "PT30M"}}
        }
    }))
    .unwrap();
    let period = period();
    let text = config.assemble(&Bindings::new().period(&period)).unwrap();
    assert!(
        text.contains("BLOCK sname='COMPGRID' fname='hs.mat' HSIGN &\n    OUTPUT tbegblk=20240101.000000 deltblk=1800.0 SEC"),
        "{text}"
    );
}

#[test]
fn lockup_step_is_rejected_in_the_override() {
    let err = SwanConfig::from_value(json!({
        "cgrid": cgrid(),
        "startup": {"mode": {"kind": "nonstationary"}},
        "lockup": {"compute": {"model_type": "nonstationary", "times": {"delt": 600}}}
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedField { ref field, .. } if field == "delt"));
}

#[test]
fn same_document_renders_independently_per_period() {
    let config = SwanConfig::from_value(json!({
        "cgrid": cgrid(),
        "startup": {"mode": {"kind": "nonstationary"}},
        "lockup": {"compute": {"model_type": "nonstationary"}}
    }))
    .unwrap();
    let first = period();
    let second = RunPeriod::new(at(3, 0), at(3, 6), Duration::minutes(10)).unwrap();
    let a = config.assemble(&Bindings::new().period(&first)).unwrap();
    let b = config.assemble(&Bindings::new().period(&second)).unwrap();
    assert!(a.contains("tbegc=20240101.000000 deltc=3600.0 SEC tendc=20240102.000000"));
    assert!(b.contains("tbegc=20240103.000000 deltc=600.0 SEC tendc=20240103.060000"));
    assert_eq!(config.assemble(&Bindings::new().period(&first)).unwrap(), a);
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn constant_wind_and_wind_grid_conflict() {
    let config = SwanConfig::from_value(json!({
        "cgrid": cgrid(),
        "inpgrid": {
            "inpgrids": [
                {
                    "model_type": "regular", "grid_type": "wind",
                    "xpinp": 0.0, "ypinp": 0.0, "mxinp": 10, "myinp": 10, "dxinp": 1.0, "dyinp": 1.0,
                    "readinp": {"fname1": "wind.txt"}
                },
                {"model_type": "wind", "vel": 10.0, "dir": 270.0}
            ]
        }
    }))
    .unwrap();
    match config.assemble(&Bindings::new()).unwrap_err() {
        ConfigError::ConflictingCommands { first, second, reason } => {
            assert_eq!(first, "inpgrid.inpgrids[1]");
            assert_eq!(second, "inpgrid.inpgrids[0]");
            assert!(reason.contains("WIND"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

// ============================================================================
// Properties
// ============================================================================

fn fixture_entries() -> Vec<(serde_yaml::Value, serde_yaml::Value)> {
    let content = std::fs::read_to_string(fixtures().join("full_run.yaml")).unwrap();
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(&content).unwrap();
    mapping.into_iter().collect()
}

fn render(entries: Vec<(serde_yaml::Value, serde_yaml::Value)>) -> String {
    let mapping: serde_yaml::Mapping = entries.into_iter().collect();
    let yaml = serde_yaml::to_string(&mapping).unwrap();
    let raw: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
    let period = period();
    SwanConfig::from_value(raw)
        .unwrap()
        .assemble(&Bindings::new().period(&period))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn section_order_ignores_input_key_order(entries in Just(fixture_entries()).prop_shuffle()) {
        let text = render(entries);
        prop_assert_eq!(headers(&text), SECTIONS.to_vec());
        prop_assert_eq!(text, render(fixture_entries()));
    }
}
