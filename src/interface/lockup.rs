//! Lockup adapter: compute times from the run period

use super::RunPeriod;
use crate::group::Lockup;

/// Copy of `lockup` with its compute times resolved against `period`.
///
/// `tbeg` and `tend` fall back to the run span field by field. The time
/// step always comes from the run interval.
pub fn bind_lockup(lockup: &Lockup, period: &RunPeriod) -> Lockup {
    let mut bound = lockup.clone();
    let times = bound
        .compute
        .times()
        .overlay(period.start, period.end, period.interval);
    tracing::debug!(tbeg = ?times.tbeg, tend = ?times.tend, "derived compute times");
    *bound.compute.times_mut() = times;
    bound
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::fixtures::*;
    use super::*;
    use crate::error::ConfigError;
    use crate::group::Group;
    use crate::validate::build;

    #[test]
    fn test_all_times_derived() {
        let lockup: Lockup = build(json!({"compute": {"model_type": "nonstationary"}})).unwrap();
        let bound = bind_lockup(&lockup, &period());
        let times = bound.compute.times();
        assert_eq!(times.tbeg, Some(at("2024-01-01T00:00:00")));
        assert_eq!(times.tend, Some(at("2024-01-02T00:00:00")));
        assert_eq!(times.delt(), Some(Duration::hours(1)));
        assert_eq!(
            bound.render().unwrap(),
            "COMPUTE NONSTATIONARY tbegc=20240101.000000 deltc=3600.0 SEC tendc=20240102.000000\nSTOP"
        );
    }

    #[test]
    fn test_end_override_keeps_derived_start() {
        let lockup: Lockup = build(json!({
            "compute": {"model_type": "nonstationary", "times": {"tend": "2024-01-01T12:00:00", "dfmt": "hr"}}
        }))
        .unwrap();
        let bound = bind_lockup(&lockup, &period());
        assert_eq!(
            bound.render().unwrap(),
            "COMPUTE NONSTATIONARY tbegc=20240101.000000 deltc=1.0 HR tendc=20240101.120000\nSTOP"
        );
    }

    #[test]
    fn test_step_is_not_overridable() {
        let err = build::<Lockup>(json!({
            "compute": {"model_type": "nonstationary", "times": {"delt": "PT30M"}}
        }))
        .unwrap_err();
        match err {
            ConfigError::UnexpectedField { field, expected, .. } => {
                assert_eq!(field, "delt");
                assert!(expected.contains(&"tbeg"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_stationary_takes_run_start() {
        let lockup: Lockup = build(json!({"compute": {"model_type": "stationary"}})).unwrap();
        let bound = bind_lockup(&lockup, &period());
        assert_eq!(bound.render().unwrap(), "COMPUTE STATIONARY time=20240101.000000\nSTOP");
        assert!(lockup.compute.times().tbeg.is_none());
    }
}
