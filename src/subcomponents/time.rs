//! Time subcomponents: instants, steps, ranges and the stationary switch
//!
//! Instants are naive (no timezone) like the command file itself. Time
//! ranges are rendered with a keyword suffix chosen by the owning command,
//! e.g. `tbegblk=` for BLOCK output or `tbegc=` for COMPUTE.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::render::{float, TokenLine};
use crate::validate::{Validate, Validator};

pub fn default_time() -> NaiveDateTime {
    NaiveDateTime::default()
}

pub fn default_tend() -> NaiveDateTime {
    default_time() + Duration::days(1)
}

pub fn default_delt() -> Duration {
    Duration::hours(1)
}

// ============================================================================
// Formats
// ============================================================================

/// Time literal format: one of the numbered command-file formats or a custom
/// strftime pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeFormat {
    Code(u8),
    Custom(String),
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self::Code(1)
    }
}

impl TimeFormat {
    pub fn pattern(&self) -> &str {
        match self {
            Self::Code(2) => "'%d-%b-%y %H:%M:%S'",
            Self::Code(3) => "%m/%d/%y.%H:%M:%S",
            Self::Code(4) => "%H:%M:%S",
            Self::Code(5) => "%y/%m/%d %H:%M:%S'",
            Self::Code(6) => "%y%m%d%H%M",
            Self::Code(_) => "%Y%m%d.%H%M%S",
            Self::Custom(pattern) => pattern,
        }
    }

    pub fn format(&self, time: &NaiveDateTime) -> String {
        let mut out = String::new();
        if write!(out, "{}", time.format(self.pattern())).is_err() {
            out = time.format("%Y%m%d.%H%M%S").to_string();
        }
        out
    }
}

impl Validate for TimeFormat {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Code(code) => v.range("tfmt", *code, 1, 6),
            Self::Custom(pattern) => {
                let ok = !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
                v.check(ok, "tfmt", pattern, "must be a valid strftime pattern");
            }
        }
    }
}

/// Unit a time step is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltFormat {
    #[default]
    Sec,
    Min,
    Hr,
    Day,
}

impl DeltFormat {
    pub fn seconds(self) -> f64 {
        match self {
            Self::Sec => 1.0,
            Self::Min => 60.0,
            Self::Hr => 3600.0,
            Self::Day => 86400.0,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Sec => "SEC",
            Self::Min => "MIN",
            Self::Hr => "HR",
            Self::Day => "DAY",
        }
    }
}

pub fn seconds(delt: &Duration) -> f64 {
    delt.num_milliseconds() as f64 / 1000.0
}

/// `3600.0 SEC`, `1.0 HR`
pub fn delt_literal(delt: &Duration, dfmt: DeltFormat) -> String {
    format!("{} {}", float(seconds(delt) / dfmt.seconds()), dfmt.keyword())
}

// ============================================================================
// Subcomponents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Time {
    #[serde(with = "datetime")]
    pub time: NaiveDateTime,
    #[serde(default)]
    pub tfmt: TimeFormat,
}

impl Time {
    pub fn literal(&self) -> String {
        self.tfmt.format(&self.time)
    }
}

impl Validate for Time {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
    }
}

/// A time step with its output unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delt {
    #[serde(with = "duration")]
    pub delt: Duration,
    #[serde(default)]
    pub dfmt: DeltFormat,
}

impl Delt {
    pub fn literal(&self) -> String {
        delt_literal(&self.delt, self.dfmt)
    }
}

impl Validate for Delt {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.delt > Duration::zero(),
            "delt",
            seconds(&self.delt),
            "must be a positive duration",
        );
    }
}

/// Time range without an end, `tbeg= delt=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeRangeOpen {
    #[serde(default = "default_time", with = "datetime")]
    pub tbeg: NaiveDateTime,
    #[serde(default = "default_delt", with = "duration")]
    pub delt: Duration,
    #[serde(default)]
    pub tfmt: TimeFormat,
    #[serde(default)]
    pub dfmt: DeltFormat,
}

impl Default for TimeRangeOpen {
    fn default() -> Self {
        Self {
            tbeg: default_time(),
            delt: default_delt(),
            tfmt: TimeFormat::default(),
            dfmt: DeltFormat::default(),
        }
    }
}

impl TimeRangeOpen {
    pub fn write(&self, line: &mut TokenLine, suffix: &str) {
        line.word(format!("tbeg{suffix}={}", self.tfmt.format(&self.tbeg)));
        line.word(format!("delt{suffix}={}", delt_literal(&self.delt, self.dfmt)));
    }
}

impl Validate for TimeRangeOpen {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
        v.check(
            self.delt > Duration::zero(),
            "delt",
            seconds(&self.delt),
            "must be a positive duration",
        );
    }
}

/// Time range with an end, `tbeg= delt= tend=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeRangeClosed {
    #[serde(default = "default_time", with = "datetime")]
    pub tbeg: NaiveDateTime,
    #[serde(default = "default_tend", with = "datetime")]
    pub tend: NaiveDateTime,
    #[serde(default = "default_delt", with = "duration")]
    pub delt: Duration,
    #[serde(default)]
    pub tfmt: TimeFormat,
    #[serde(default)]
    pub dfmt: DeltFormat,
}

/// Nonstationary time range, written with a leading `NONSTATIONARY`.
pub type Nonstationary = TimeRangeClosed;

impl Default for TimeRangeClosed {
    fn default() -> Self {
        Self {
            tbeg: default_time(),
            tend: default_tend(),
            delt: default_delt(),
            tfmt: TimeFormat::default(),
            dfmt: DeltFormat::default(),
        }
    }
}

impl TimeRangeClosed {
    pub fn write(&self, line: &mut TokenLine, suffix: &str) {
        line.word(format!("tbeg{suffix}={}", self.tfmt.format(&self.tbeg)));
        line.word(format!("delt{suffix}={}", delt_literal(&self.delt, self.dfmt)));
        line.word(format!("tend{suffix}={}", self.tfmt.format(&self.tend)));
    }

    pub fn write_nonstationary(&self, line: &mut TokenLine, suffix: &str) {
        line.word("NONSTATIONARY");
        self.write(line, suffix);
    }

    /// Every time from `tbeg` to `tend` inclusive at `delt` spacing.
    pub fn times(&self) -> Vec<NaiveDateTime> {
        let mut out = Vec::new();
        if self.delt <= Duration::zero() {
            return out;
        }
        let mut t = self.tbeg;
        while t <= self.tend {
            out.push(t);
            t += self.delt;
        }
        out
    }
}

impl Validate for TimeRangeClosed {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
        v.check(
            self.delt > Duration::zero(),
            "delt",
            seconds(&self.delt),
            "must be a positive duration",
        );
        v.rule(self.tend >= self.tbeg, "tend", "tend must not precede tbeg");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stationary {
    #[serde(default = "default_time", with = "datetime")]
    pub time: NaiveDateTime,
    #[serde(default)]
    pub tfmt: TimeFormat,
}

impl Default for Stationary {
    fn default() -> Self {
        Self {
            time: default_time(),
            tfmt: TimeFormat::default(),
        }
    }
}

impl Stationary {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("STATIONARY");
        line.word(format!("time={}", self.tfmt.format(&self.time)));
    }
}

impl Validate for Stationary {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
    }
}

// ============================================================================
// Late-bound time records
// ============================================================================

/// Times of an output write. Every field is optional; unset fields are
/// filled from the run period when the document is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputTimes {
    #[serde(default, with = "datetime_opt")]
    pub tbeg: Option<NaiveDateTime>,
    #[serde(default, with = "duration_opt")]
    pub delt: Option<Duration>,
    #[serde(default)]
    pub tfmt: Option<TimeFormat>,
    #[serde(default)]
    pub dfmt: Option<DeltFormat>,
}

impl OutputTimes {
    /// Fill unset fields from `tbeg` and `delt`; given fields win.
    pub fn overlay(&self, tbeg: NaiveDateTime, delt: Duration) -> Self {
        Self {
            tbeg: self.tbeg.or(Some(tbeg)),
            delt: self.delt.or(Some(delt)),
            tfmt: self.tfmt.clone(),
            dfmt: self.dfmt,
        }
    }

    /// The complete range, if both `tbeg` and `delt` are known.
    pub fn range(&self) -> Option<TimeRangeOpen> {
        Some(TimeRangeOpen {
            tbeg: self.tbeg?,
            delt: self.delt?,
            tfmt: self.tfmt.clone().unwrap_or_default(),
            dfmt: self.dfmt.unwrap_or_default(),
        })
    }
}

impl Validate for OutputTimes {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
        if let Some(delt) = &self.delt {
            v.check(
                *delt > Duration::zero(),
                "delt",
                seconds(delt),
                "must be a positive duration",
            );
        }
    }
}

/// Times of a COMPUTE command. The time step is not part of the record: it
/// always comes from the run period interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeTimes {
    #[serde(default, with = "datetime_opt")]
    pub tbeg: Option<NaiveDateTime>,
    #[serde(default, with = "datetime_opt")]
    pub tend: Option<NaiveDateTime>,
    #[serde(default)]
    pub tfmt: Option<TimeFormat>,
    #[serde(default)]
    pub dfmt: Option<DeltFormat>,
    #[serde(skip)]
    delt: Option<Duration>,
}

impl ComputeTimes {
    /// Fill unset fields from the run period and take its interval as the
    /// time step.
    pub fn overlay(&self, tbeg: NaiveDateTime, tend: NaiveDateTime, delt: Duration) -> Self {
        Self {
            tbeg: self.tbeg.or(Some(tbeg)),
            tend: self.tend.or(Some(tend)),
            tfmt: self.tfmt.clone(),
            dfmt: self.dfmt,
            delt: Some(delt),
        }
    }

    pub fn delt(&self) -> Option<Duration> {
        self.delt
    }

    pub fn stationary(&self) -> Option<Stationary> {
        Some(Stationary {
            time: self.tbeg?,
            tfmt: self.tfmt.clone().unwrap_or_default(),
        })
    }

    pub fn range(&self) -> Option<TimeRangeClosed> {
        Some(TimeRangeClosed {
            tbeg: self.tbeg?,
            tend: self.tend?,
            delt: self.delt?,
            tfmt: self.tfmt.clone().unwrap_or_default(),
            dfmt: self.dfmt.unwrap_or_default(),
        })
    }
}

impl Validate for ComputeTimes {
    fn validate(&self, v: &mut Validator) {
        self.tfmt.validate(v);
        if let (Some(tbeg), Some(tend)) = (self.tbeg, self.tend) {
            v.rule(tend >= tbeg, "tend", "tend must not precede tbeg");
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%d.%H%M%S",
];

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('Z');
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn from_seconds(value: f64) -> Option<Duration> {
    value
        .is_finite()
        .then(|| Duration::milliseconds((value * 1000.0).round() as i64))
}

/// Parse `PT1H`, `P1DT6H`, `30min`, `1h`, `3600s`, `1d`, `01:30:00` or a
/// bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Some(iso) = raw.strip_prefix('P').or_else(|| raw.strip_prefix('p')) {
        return parse_iso_duration(iso);
    }
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 3 {
        let mut total = 0.0;
        for (part, scale) in parts.iter().zip([3600.0, 60.0, 1.0]) {
            total += part.parse::<f64>().ok()? * scale;
        }
        return from_seconds(total);
    }
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number.parse().ok()?;
    let scale = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        "d" | "day" | "days" => 86400.0,
        _ => return None,
    };
    from_seconds(value * scale)
}

fn parse_iso_duration(body: &str) -> Option<Duration> {
    let (date, time) = body
        .split_once(|c: char| c == 'T' || c == 't')
        .unwrap_or((body, ""));
    let date_units: &[(char, f64)] = &[('W', 604800.0), ('D', 86400.0)];
    let time_units: &[(char, f64)] = &[('H', 3600.0), ('M', 60.0), ('S', 1.0)];
    let mut total = 0.0;
    let mut seen = false;
    for (part, units) in [(date, date_units), (time, time_units)] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let scale = units
                .iter()
                .find(|(u, _)| *u == c.to_ascii_uppercase())?
                .1;
            total += number.parse::<f64>().ok()? * scale;
            number.clear();
            seen = true;
        }
        if !number.is_empty() {
            return None;
        }
    }
    if seen {
        from_seconds(total)
    } else {
        None
    }
}

/// serde adapter for instants
pub mod datetime {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        match Value::deserialize(d)? {
            Value::String(raw) => super::parse_datetime(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid datetime '{raw}'"))),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .map(|t| t.naive_utc())
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp {n}"))),
            other => Err(D::Error::custom(format!("invalid datetime {other}"))),
        }
    }
}

/// serde adapter for optional instants
pub mod datetime_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => super::datetime::serialize(t, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::datetime")] NaiveDateTime);
        Ok(Option::<Wrapped>::deserialize(d)?.map(|w| w.0))
    }
}

/// serde adapter for time steps; serialized as seconds
pub mod duration {
    use chrono::Duration;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(super::seconds(d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_f64()
                .and_then(super::from_seconds)
                .ok_or_else(|| D::Error::custom(format!("invalid duration {n}"))),
            Value::String(raw) => super::parse_duration(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid duration '{raw}'"))),
            other => Err(D::Error::custom(format!("invalid duration {other}"))),
        }
    }
}

/// serde adapter for optional time steps
pub mod duration_opt {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => super::duration::serialize(d, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::duration")] Duration);
        Ok(Option::<Wrapped>::deserialize(d)?.map(|w| w.0))
    }
}
