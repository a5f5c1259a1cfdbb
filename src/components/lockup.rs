//! COMPUTE, HOTFILE and STOP
//!
//! Compute variants carry [`ComputeTimes`] without a time step. The step is
//! injected from the run period when the document is assembled, so a
//! nonstationary compute rendered without a period is incomplete.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::{ConfigError, Result};
use crate::render::TokenLine;
use crate::subcomponents::time::{datetime, ComputeTimes, Stationary, TimeRangeClosed};
use crate::validate::{Validate, Validator};
use crate::{tagged_struct, tagged_union};

/// Time template appended to the hotfile stem
pub const HOTFILE_SUFFIX: &str = "_%Y%m%dT%H%M%S";

// ============================================================================
// HOTFILE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotFormat {
    Free,
    Unformatted,
}

/// Write the wave field to a restart file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Hotfile {
    pub fname: String,
    #[serde(default)]
    pub format: Option<HotFormat>,
}

tagged_struct!(Hotfile, "hotfile");

impl Hotfile {
    /// Copy of this hotfile with `time` stamped between stem and extension.
    pub fn stamped(&self, time: &NaiveDateTime) -> Self {
        let path = Path::new(&self.fname);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let name = format!("{stem}{}{ext}", time.format(HOTFILE_SUFFIX));
        let fname = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(name).display().to_string(),
            _ => name,
        };
        Self {
            fname,
            format: self.format,
        }
    }

    fn tokens(&self) -> TokenLine {
        let mut line = TokenLine::new("HOTFILE");
        line.quoted("fname", &self.fname);
        match self.format {
            Some(HotFormat::Free) => line.word("FREE"),
            Some(HotFormat::Unformatted) => line.word("UNFORMATTED"),
            None => &mut line,
        };
        line
    }
}

impl Component for Hotfile {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        Ok(vec![self.tokens()])
    }
}

impl Validate for Hotfile {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.fname.is_empty(), "fname", "''", "must not be empty");
        v.max_len("fname", Some(&self.fname), 36);
    }
}

/// When to write a hotfile: an index into the compute times (negative
/// counts from the end) or one of the compute times itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HotTime {
    Index(i64),
    Time(#[serde(with = "datetime")] NaiveDateTime),
}

// ============================================================================
// COMPUTE
// ============================================================================

fn stationary_line(time: Stationary) -> TokenLine {
    let mut line = TokenLine::new("COMPUTE");
    time.write(&mut line);
    line
}

fn nonstationary_line(range: &TimeRangeClosed) -> TokenLine {
    let mut line = TokenLine::new("COMPUTE");
    range.write_nonstationary(&mut line, "c");
    line
}

fn closed_range(times: &ComputeTimes) -> Result<TimeRangeClosed> {
    times.range().ok_or_else(|| {
        ConfigError::incomplete(
            "times",
            "tbeg, tend and the time step need a run period or explicit values",
        )
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeStationary {
    #[serde(default)]
    pub times: ComputeTimes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeNonstationary {
    #[serde(default)]
    pub times: ComputeTimes,
}

/// One stationary compute per time step, hotfiles after the selected ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeStat {
    #[serde(default)]
    pub times: ComputeTimes,
    #[serde(default)]
    pub hotfile: Option<Hotfile>,
    #[serde(default)]
    pub hottimes: Vec<HotTime>,
}

/// Nonstationary computes split at the hotfile times
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeNonstat {
    #[serde(default)]
    pub times: ComputeTimes,
    #[serde(default)]
    pub hotfile: Option<Hotfile>,
    #[serde(default)]
    pub hottimes: Vec<HotTime>,
    /// Run a stationary compute at the start time first
    #[serde(default)]
    pub initstat: bool,
}

/// Positions in `times` at which to write a hotfile, ascending and unique.
fn hot_ids(hottimes: &[HotTime], times: &[NaiveDateTime]) -> Result<Vec<usize>> {
    let n = times.len();
    let mut ids = Vec::with_capacity(hottimes.len());
    for (k, hot) in hottimes.iter().enumerate() {
        let id = match hot {
            HotTime::Index(raw) => {
                let i = if *raw < 0 { *raw + n as i64 } else { *raw };
                usize::try_from(i).ok().filter(|i| *i < n).ok_or_else(|| ConfigError::Invalid {
                    path: format!("hottimes[{k}]"),
                    message: format!("index {raw} is out of range for {n} compute times"),
                })?
            }
            HotTime::Time(t) => times.iter().position(|x| x == t).ok_or_else(|| ConfigError::Invalid {
                path: format!("hottimes[{k}]"),
                message: format!("{t} is not one of the compute times"),
            })?,
        };
        ids.push(id);
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

fn warn_unpaired(hotfile: &Option<Hotfile>, hottimes: &[HotTime]) {
    match (hotfile.is_some(), hottimes.is_empty()) {
        (false, false) => tracing::warn!("hottimes given without a hotfile, no hotfiles are written"),
        (true, true) => tracing::warn!("hotfile given without hottimes, no hotfiles are written"),
        _ => {}
    }
}

impl ComputeStat {
    fn tokens(&self) -> Result<Vec<TokenLine>> {
        let range = closed_range(&self.times)?;
        let times = range.times();
        let ids = match &self.hotfile {
            Some(_) => hot_ids(&self.hottimes, &times)?,
            None => Vec::new(),
        };
        let mut lines = Vec::new();
        for (k, time) in times.iter().enumerate() {
            lines.push(stationary_line(Stationary {
                time: *time,
                tfmt: range.tfmt.clone(),
            }));
            if let (Some(hotfile), true) = (&self.hotfile, ids.contains(&k)) {
                lines.push(hotfile.stamped(time).tokens());
            }
        }
        Ok(lines)
    }
}

impl ComputeNonstat {
    fn tokens(&self) -> Result<Vec<TokenLine>> {
        let range = closed_range(&self.times)?;
        let times = range.times();
        let ids = match &self.hotfile {
            Some(_) => hot_ids(&self.hottimes, &times)?,
            None => Vec::new(),
        };
        let mut lines = Vec::new();
        if self.initstat {
            lines.push(stationary_line(Stationary {
                time: range.tbeg,
                tfmt: range.tfmt.clone(),
            }));
        }
        let mut tbeg = range.tbeg;
        for &id in &ids {
            let tend = times[id];
            lines.push(nonstationary_line(&TimeRangeClosed {
                tbeg,
                tend,
                ..range.clone()
            }));
            if let Some(hotfile) = &self.hotfile {
                lines.push(hotfile.stamped(&tend).tokens());
            }
            tbeg = tend;
        }
        let covered = ids.last().is_some_and(|last| last + 1 >= times.len());
        if !covered {
            lines.push(nonstationary_line(&TimeRangeClosed { tbeg, ..range }));
        }
        Ok(lines)
    }
}

tagged_union! {
    pub enum Compute {
        "stationary" => Stationary(ComputeStationary),
        "nonstationary" => Nonstationary(ComputeNonstationary),
        "stat" => Stat(ComputeStat),
        "nonstat" => Nonstat(ComputeNonstat),
    }
}

impl Compute {
    pub fn times(&self) -> &ComputeTimes {
        match self {
            Self::Stationary(c) => &c.times,
            Self::Nonstationary(c) => &c.times,
            Self::Stat(c) => &c.times,
            Self::Nonstat(c) => &c.times,
        }
    }

    pub fn times_mut(&mut self) -> &mut ComputeTimes {
        match self {
            Self::Stationary(c) => &mut c.times,
            Self::Nonstationary(c) => &mut c.times,
            Self::Stat(c) => &mut c.times,
            Self::Nonstat(c) => &mut c.times,
        }
    }

    /// Whether any COMPUTE line is NONSTATIONARY
    pub fn is_nonstationary(&self) -> bool {
        matches!(self, Self::Nonstationary(_) | Self::Nonstat(_))
    }
}

impl Component for Compute {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        match self {
            Self::Stationary(c) => {
                let time = c.times.stationary().ok_or_else(|| {
                    ConfigError::incomplete("times.tbeg", "stationary compute needs a time or a run period")
                })?;
                Ok(vec![stationary_line(time)])
            }
            Self::Nonstationary(c) => Ok(vec![nonstationary_line(&closed_range(&c.times)?)]),
            Self::Stat(c) => c.tokens(),
            Self::Nonstat(c) => c.tokens(),
        }
    }
}

impl Validate for Compute {
    fn validate(&self, v: &mut Validator) {
        v.nested("times", self.times());
        match self {
            Self::Stat(c) => {
                v.nested("hotfile", &c.hotfile);
                warn_unpaired(&c.hotfile, &c.hottimes);
            }
            Self::Nonstat(c) => {
                v.nested("hotfile", &c.hotfile);
                warn_unpaired(&c.hotfile, &c.hottimes);
            }
            Self::Stationary(c) if c.times.tend.is_some() => {
                tracing::warn!("tend is ignored by a stationary compute");
            }
            _ => {}
        }
    }
}

// ============================================================================
// STOP
// ============================================================================

/// End of the command file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Stop {}

tagged_struct!(Stop, "stop");

impl Validate for Stop {
    fn validate(&self, _v: &mut Validator) {}
}

impl Component for Stop {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        Ok(vec![TokenLine::new("STOP")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subcomponents::time::parse_datetime;
    use crate::validate::build;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(raw: &str) -> NaiveDateTime {
        parse_datetime(raw).unwrap()
    }

    fn bound(raw: serde_json::Value) -> Compute {
        let mut compute: Compute = build(raw).unwrap();
        let times = compute
            .times()
            .overlay(at("1990-01-01T00:00:00"), at("1990-01-01T03:00:00"), Duration::hours(1));
        *compute.times_mut() = times;
        compute
    }

    #[test]
    fn test_compute_requires_discriminator() {
        let err = build::<Compute>(json!({"times": {}})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDiscriminator { .. }));
    }

    #[test]
    fn test_stationary_explicit_time() {
        let compute: Compute = build(json!({
            "model_type": "stationary", "times": {"tbeg": "1990-01-01T00:00:00"}
        }))
        .unwrap();
        assert_eq!(compute.render().unwrap(), "COMPUTE STATIONARY time=19900101.000000");
    }

    #[test]
    fn test_nonstationary_without_period_is_incomplete() {
        let compute: Compute = build(json!({
            "model_type": "nonstationary",
            "times": {"tbeg": "1990-01-01T00:00:00", "tend": "1990-01-02T00:00:00"}
        }))
        .unwrap();
        assert!(matches!(compute.cmd(), Err(ConfigError::IncompleteCommand { .. })));
    }

    #[test]
    fn test_nonstationary_takes_period_step() {
        let compute = bound(json!({"model_type": "NONSTATIONARY", "times": {"dfmt": "hr"}}));
        assert_eq!(
            compute.render().unwrap(),
            "COMPUTE NONSTATIONARY tbegc=19900101.000000 deltc=1.0 HR tendc=19900101.030000"
        );
    }

    #[test]
    fn test_stat_hotfiles_at_selected_times() {
        let compute = bound(json!({
            "model_type": "stat",
            "hotfile": {"fname": "./hotfile.swn"},
            "hottimes": [2, -1]
        }));
        assert_eq!(
            compute.render().unwrap(),
            "COMPUTE STATIONARY time=19900101.000000\n\
             COMPUTE STATIONARY time=19900101.010000\n\
             COMPUTE STATIONARY time=19900101.020000\n\
             HOTFILE fname='./hotfile_19900101T020000.swn'\n\
             COMPUTE STATIONARY time=19900101.030000\n\
             HOTFILE fname='./hotfile_19900101T030000.swn'"
        );
    }

    #[test]
    fn test_nonstat_split_at_hottimes() {
        let compute = bound(json!({
            "model_type": "nonstat",
            "initstat": true,
            "hotfile": {"fname": "hotfile", "format": "free"},
            "hottimes": ["1990-01-01T01:00:00"]
        }));
        assert_eq!(
            compute.render().unwrap(),
            "COMPUTE STATIONARY time=19900101.000000\n\
             COMPUTE NONSTATIONARY tbegc=19900101.000000 deltc=3600.0 SEC tendc=19900101.010000\n\
             HOTFILE fname='hotfile_19900101T010000' FREE\n\
             COMPUTE NONSTATIONARY tbegc=19900101.010000 deltc=3600.0 SEC tendc=19900101.030000"
        );
    }

    #[test]
    fn test_nonstat_last_hottime_closes_run() {
        let compute = bound(json!({
            "model_type": "nonstat",
            "hotfile": {"fname": "hot.dat"},
            "hottimes": [-1]
        }));
        let lines = compute.cmd().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "HOTFILE fname='hot_19900101T030000.dat'");
    }

    #[test]
    fn test_hottime_out_of_range() {
        let compute = bound(json!({
            "model_type": "stat", "hotfile": {"fname": "hot.dat"}, "hottimes": [4]
        }));
        let err = compute.cmd().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref path, .. } if path == "hottimes[0]"));
    }

    #[test]
    fn test_compute_times_reject_step() {
        let err = build::<Compute>(json!({"model_type": "nonstationary", "times": {"delt": "PT1H"}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedField { .. }));
    }

    #[test]
    fn test_stop() {
        let stop: Stop = build(json!({})).unwrap();
        assert_eq!(stop.render().unwrap(), "STOP");
    }
}
