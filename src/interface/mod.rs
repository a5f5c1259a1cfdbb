//! Interface adapters: late binding of external domain objects
//!
//! The run period, spatial grid, forcing data and boundary spectra belong to
//! the caller. They are borrowed through [`Bindings`] only while a document
//! is assembled. Every adapter is a pure function of its bindings and the
//! configured component, returning a new component and leaving both inputs
//! untouched.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::error::{ConfigError, Result};
use crate::subcomponents::time::seconds;

pub mod boundary;
pub mod grid;
pub mod lockup;
pub mod output;

pub use boundary::{BoundaryCommands, BoundaryFeed, BoundaryInterface};
pub use grid::{DataInterface, InputBinding};
pub use lockup::bind_lockup;
pub use output::bind_output;

// ============================================================================
// Collaborators
// ============================================================================

/// Time span of a run and its default sampling interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval: Duration,
}

impl RunPeriod {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, interval: Duration) -> Result<Self> {
        if end <= start {
            return Err(ConfigError::Invalid {
                path: "period".into(),
                message: format!("end {end} must be after start {start}"),
            });
        }
        if interval <= Duration::zero() {
            return Err(ConfigError::Invalid {
                path: "period.interval".into(),
                message: format!("interval must be positive, got {} s", seconds(&interval)),
            });
        }
        Ok(Self {
            start,
            end,
            interval,
        })
    }

    /// Part of this period that overlaps `other`, if any
    pub fn clip(&self, other: &RunPeriod) -> Option<RunPeriod> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(RunPeriod {
            start,
            end,
            interval: self.interval,
        })
    }
}

/// Regular grid geometry. `nx` and `ny` count points, not cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid {
    pub x0: f64,
    pub y0: f64,
    pub rot: f64,
    pub dx: f64,
    pub dy: f64,
    pub nx: u32,
    pub ny: u32,
    /// Exception value marking missing data
    pub exc: Option<f64>,
}

/// Metadata of one forcing variable as prepared by the data layer
#[derive(Debug, Clone, PartialEq)]
pub struct DataDescriptor {
    /// Grid the values are on, the bound spatial grid when `None`
    pub grid: Option<SpatialGrid>,
    /// File the data layer wrote the values to
    pub fname: String,
    /// Time axis for time-varying data
    pub times: Option<RunPeriod>,
    /// Whether the file holds an x and a y component
    pub vector: bool,
}

/// Source of forcing data, keyed by variable name
pub trait DataSource {
    fn describe(&self, variable: &str) -> Option<DataDescriptor>;
}

impl DataSource for BTreeMap<String, DataDescriptor> {
    fn describe(&self, variable: &str) -> Option<DataDescriptor> {
        self.get(variable).cloned()
    }
}

/// Source of boundary wave spectra
pub trait SpectralSource {
    fn id(&self) -> &str;

    /// Dimension names of the spectral data
    fn dims(&self) -> Vec<String>;

    /// Number of spectral sites
    fn sites(&self) -> usize;
}

/// Dimensions a spectral source must provide
pub const SPECTRAL_DIMS: [&str; 3] = ["site", "freq", "dir"];

/// External objects available to the adapters for one assembly
#[derive(Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub period: Option<&'a RunPeriod>,
    pub grid: Option<&'a SpatialGrid>,
    pub data: Option<&'a dyn DataSource>,
    pub spectra: Option<&'a dyn SpectralSource>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: &'a RunPeriod) -> Self {
        self.period = Some(period);
        self
    }

    pub fn grid(mut self, grid: &'a SpatialGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn data(mut self, data: &'a dyn DataSource) -> Self {
        self.data = Some(data);
        self
    }

    pub fn spectra(mut self, spectra: &'a dyn SpectralSource) -> Self {
        self.spectra = Some(spectra);
        self
    }

    pub(crate) fn require_data(&self, path: &str) -> Result<&'a dyn DataSource> {
        self.data
            .ok_or_else(|| ConfigError::incomplete(path, "needs a data source binding"))
    }

    pub(crate) fn require_spectra(&self, path: &str) -> Result<&'a dyn SpectralSource> {
        self.spectra
            .ok_or_else(|| ConfigError::incomplete(path, "needs a spectral source binding"))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::subcomponents::time::parse_datetime;

    pub fn at(raw: &str) -> NaiveDateTime {
        parse_datetime(raw).unwrap()
    }

    pub fn period() -> RunPeriod {
        RunPeriod::new(at("2024-01-01T00:00:00"), at("2024-01-02T00:00:00"), Duration::hours(1)).unwrap()
    }

    pub fn grid() -> SpatialGrid {
        SpatialGrid {
            x0: 110.0,
            y0: -35.2,
            rot: 0.0,
            dx: 0.5,
            dy: 0.5,
            nx: 21,
            ny: 11,
            exc: Some(-99.0),
        }
    }

    pub struct Spectra {
        pub dims: Vec<&'static str>,
        pub sites: usize,
    }

    impl SpectralSource for Spectra {
        fn id(&self) -> &str {
            "ww3"
        }

        fn dims(&self) -> Vec<String> {
            self.dims.iter().map(|d| d.to_string()).collect()
        }

        fn sites(&self) -> usize {
            self.sites
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_run_period_rejects_reversed_span() {
        let err = RunPeriod::new(at("2024-01-02"), at("2024-01-01"), Duration::hours(1)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref path, .. } if path == "period"));
    }

    #[test]
    fn test_run_period_rejects_zero_interval() {
        assert!(RunPeriod::new(at("2024-01-01"), at("2024-01-02"), Duration::zero()).is_err());
    }

    #[test]
    fn test_clip() {
        let axis = RunPeriod::new(at("2023-12-31T12:00:00"), at("2024-01-01T06:00:00"), Duration::hours(3)).unwrap();
        let clipped = axis.clip(&period()).unwrap();
        assert_eq!(clipped.start, at("2024-01-01T00:00:00"));
        assert_eq!(clipped.end, at("2024-01-01T06:00:00"));
        assert_eq!(clipped.interval, Duration::hours(3));
    }

    #[test]
    fn test_descriptor_map_source() {
        let mut map = BTreeMap::new();
        map.insert(
            "bottom".to_string(),
            DataDescriptor {
                grid: Some(grid()),
                fname: "bottom.grd".into(),
                times: None,
                vector: false,
            },
        );
        assert_eq!(map.describe("bottom").unwrap().fname, "bottom.grd");
        assert!(map.describe("wind").is_none());
    }
}
