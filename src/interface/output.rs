//! Output adapter: write times from the run period

use super::RunPeriod;
use crate::components::output::Write;
use crate::group::Output;

fn overlay<W: Write>(write: &mut W, period: &RunPeriod) {
    let times = write
        .times()
        .cloned()
        .unwrap_or_default()
        .overlay(period.start, period.interval);
    tracing::debug!(sname = write.sname(), suffix = W::SUFFIX, "derived output times");
    write.set_times(times);
}

/// Copy of `output` with the times of every write resolved against `period`.
///
/// Given time fields win one by one. A write with no times at all gets the
/// run start and interval.
pub fn bind_output(output: &Output, period: &RunPeriod) -> Output {
    let mut bound = output.clone();
    if let Some(block) = bound.block.as_mut() {
        for b in block.blocks_mut() {
            overlay(b, period);
        }
    }
    if let Some(table) = bound.table.as_mut() {
        overlay(table, period);
    }
    if let Some(specout) = bound.specout.as_mut() {
        overlay(specout, period);
    }
    if let Some(nestout) = bound.nestout.as_mut() {
        overlay(nestout, period);
    }
    bound
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::fixtures::*;
    use super::*;
    use crate::group::Group;
    use crate::validate::build;

    #[test]
    fn test_interval_override_keeps_derived_start() {
        let output: Output = build(json!({
            "block": {"sname": "COMPGRID", "fname": "out.mat", "output": ["hsign"], "times": {"delt": "PT30M"}}
        }))
        .unwrap();
        let bound = bind_output(&output, &period());
        let times = bound.block.as_ref().unwrap().blocks()[0].times().unwrap();
        assert_eq!(times.tbeg, Some(at("2024-01-01T00:00:00")));
        assert_eq!(times.delt, Some(Duration::minutes(30)));
        assert_eq!(
            bound.render().unwrap(),
            "BLOCK sname='COMPGRID' fname='out.mat' HSIGN &\n    OUTPUT tbegblk=20240101.000000 deltblk=1800.0 SEC"
        );
    }

    #[test]
    fn test_all_fields_derived_without_override() {
        let output: Output = build(json!({
            "points": {"sname": "outpts", "xp": [1.0], "yp": [2.0]},
            "table": {"sname": "outpts", "fname": "out.txt", "output": ["hsign"]},
            "specout": {"sname": "outpts", "fname": "out.spec"}
        }))
        .unwrap();
        let bound = bind_output(&output, &period());
        for times in [
            bound.table.as_ref().unwrap().times(),
            bound.specout.as_ref().unwrap().times(),
        ] {
            let times = times.unwrap();
            assert_eq!(times.tbeg, Some(at("2024-01-01T00:00:00")));
            assert_eq!(times.delt, Some(Duration::hours(1)));
        }
    }

    #[test]
    fn test_start_override_and_formats_survive() {
        let output: Output = build(json!({
            "ngrid": {"sname": "nest", "grid": {"xp": 0.0, "yp": 0.0, "xlen": 1.0, "ylen": 1.0, "mx": 2, "my": 2}},
            "nestout": {"sname": "nest", "fname": "nest.bnd", "times": {"tbeg": "2024-01-01T06:00:00", "dfmt": "hr"}}
        }))
        .unwrap();
        let bound = bind_output(&output, &period());
        assert_eq!(
            bound.nestout.as_ref().unwrap().times().unwrap().tbeg,
            Some(at("2024-01-01T06:00:00"))
        );
        let text = bound.render().unwrap();
        assert!(text.ends_with("OUTPUT tbegnst=20240101.060000 deltnst=1.0 HR"), "{text}");
    }

    #[test]
    fn test_input_left_untouched() {
        let output: Output = build(json!({
            "block": {"sname": "BOTTGRID", "fname": "bot.mat", "output": ["depth"]}
        }))
        .unwrap();
        let before = output.clone();
        let _ = bind_output(&output, &period());
        assert_eq!(output, before);
    }
}
