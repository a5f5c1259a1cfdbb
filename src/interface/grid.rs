//! Grid/Data adapter: input grids from forcing data descriptors

use serde::{Deserialize, Serialize};

use super::{Bindings, RunPeriod};
use crate::components::inpgrid::{InputGrid, RegularInpgrid};
use crate::error::{ConfigError, Result};
use crate::group::Inpgrids;
use crate::subcomponents::readgrid::{GridOption, ReadInp};
use crate::subcomponents::time::{DeltFormat, TimeFormat, TimeRangeClosed};
use crate::validate::{Validate, Validator};

/// Layout of the files written by the data layer: row by row from the
/// upper-left corner.
pub const DATA_IDLA: u8 = 3;

/// One forcing quantity to read from the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputBinding {
    /// Quantity name, e.g. `wind` or `wlevel`
    pub var: String,
    /// Variable name in the data source, `var` when unset
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fac: Option<f64>,
}

/// Input grids resolved from a data source when the document is assembled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataInterface {
    /// Variable name of the bathymetry in the data source
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub input: Vec<InputBinding>,
}

impl DataInterface {
    fn entries(&self) -> Vec<(String, InputBinding)> {
        let bottom = self.bottom.as_ref().map(|source| {
            (
                "bottom".to_string(),
                InputBinding {
                    var: GridOption::Bottom.name().to_string(),
                    source: Some(source.clone()),
                    fac: None,
                },
            )
        });
        bottom
            .into_iter()
            .chain(
                self.input
                    .iter()
                    .enumerate()
                    .map(|(i, b)| (format!("input[{i}]"), b.clone())),
            )
            .collect()
    }

    /// Build one regular input grid per bound quantity.
    pub fn bind(&self, bindings: &Bindings<'_>) -> Result<Inpgrids> {
        let data = bindings.require_data("data")?;
        let mut inpgrids = Vec::new();
        for (path, binding) in self.entries() {
            let quantity = GridOption::from_name(&binding.var).ok_or_else(|| {
                ConfigError::UnsupportedQuantity {
                    path: format!("{path}.var"),
                    quantity: binding.var.clone(),
                    expected: GridOption::NAMES.to_vec(),
                }
            })?;
            let key = binding.source.as_deref().unwrap_or(&binding.var);
            let descriptor = data.describe(key).ok_or_else(|| {
                ConfigError::incomplete(&path, format!("data source has no variable '{key}'"))
            })?;
            let grid = descriptor
                .grid
                .as_ref()
                .or(bindings.grid)
                .ok_or_else(|| ConfigError::incomplete(&path, "needs a spatial grid binding"))?;
            if quantity.is_vector() != descriptor.vector {
                return Err(ConfigError::Invalid {
                    path,
                    message: format!(
                        "{quantity} is {} but the data for '{key}' is {}",
                        if quantity.is_vector() { "a vector" } else { "a scalar" },
                        if descriptor.vector { "a vector" } else { "a scalar" },
                    ),
                });
            }
            let times = match (descriptor.times, bindings.period) {
                (Some(axis), Some(period)) => Some(axis.clip(period).ok_or_else(|| ConfigError::Invalid {
                    path: path.clone(),
                    message: format!("data for '{key}' does not overlap the run period"),
                })?),
                (axis, _) => axis,
            };

            let mut readinp = ReadInp::new(descriptor.fname.clone());
            readinp.idla = DATA_IDLA;
            readinp.fac = binding.fac.unwrap_or(1.0);
            readinp.nhedt = u32::from(times.is_some());

            tracing::debug!(quantity = %quantity, source = key, fname = %descriptor.fname, "bound input grid");
            inpgrids.push(InputGrid::Regular(RegularInpgrid {
                grid_type: quantity,
                xpinp: grid.x0,
                ypinp: grid.y0,
                alpinp: grid.rot,
                mxinp: grid.nx.saturating_sub(1),
                myinp: grid.ny.saturating_sub(1),
                dxinp: grid.dx,
                dyinp: grid.dy,
                excval: grid.exc,
                nonstationary: times.as_ref().map(nonstationary),
                readinp,
            }));
        }
        Ok(Inpgrids { inpgrids })
    }
}

fn nonstationary(axis: &RunPeriod) -> TimeRangeClosed {
    TimeRangeClosed {
        tbeg: axis.start,
        tend: axis.end,
        delt: axis.interval,
        tfmt: TimeFormat::default(),
        dfmt: DeltFormat::Hr,
    }
}

impl Validate for DataInterface {
    fn validate(&self, v: &mut Validator) {
        let vars: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(_, b)| b.var.to_ascii_lowercase())
            .collect();
        let unique = vars.iter().enumerate().all(|(i, var)| !vars[..i].contains(var));
        v.rule(unique, "input", "each input var must be unique");
        for (i, binding) in self.input.iter().enumerate() {
            v.positive(&format!("input[{i}].fac"), binding.fac);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::fixtures::*;
    use super::super::DataDescriptor;
    use super::*;
    use crate::components::Component;
    use crate::group::Group;
    use crate::validate::build;

    fn source() -> BTreeMap<String, DataDescriptor> {
        let mut map = BTreeMap::new();
        map.insert(
            "depth".to_string(),
            DataDescriptor {
                grid: None,
                fname: "bottom.grd".into(),
                times: None,
                vector: false,
            },
        );
        map.insert(
            "wind".to_string(),
            DataDescriptor {
                grid: None,
                fname: "wind.grd".into(),
                times: Some(
                    RunPeriod::new(at("2023-12-31T12:00:00"), at("2024-01-01T06:00:00"), Duration::hours(3)).unwrap(),
                ),
                vector: true,
            },
        );
        map
    }

    #[test]
    fn test_bottom_from_bound_grid() {
        let iface: DataInterface = build(json!({"bottom": "depth"})).unwrap();
        let (data, grid) = (source(), grid());
        let inpgrids = iface.bind(&Bindings::new().data(&data).grid(&grid)).unwrap();
        assert_eq!(
            inpgrids.render().unwrap(),
            "INPGRID BOTTOM REGULAR xpinp=110.0 ypinp=-35.2 alpinp=0.0 mxinp=20 myinp=10 dxinp=0.5 dyinp=0.5 EXCEPTION excval=-99.0\n\
             READINP BOTTOM fac=1.0 fname1='bottom.grd' idla=3 nhedf=0 nhedt=0 nhedvec=0 FREE"
        );
    }

    #[test]
    fn test_time_varying_input_clipped_to_period() {
        let iface: DataInterface = build(json!({"input": [{"var": "wind"}]})).unwrap();
        let (data, grid, period) = (source(), grid(), period());
        let inpgrids = iface
            .bind(&Bindings::new().data(&data).grid(&grid).period(&period))
            .unwrap();
        let lines = inpgrids.inpgrids[0].cmd().unwrap();
        let words: Vec<_> = lines[0].words().collect();
        assert!(words.contains(&"NONSTATIONARY"));
        assert!(words.contains(&"tbeginp=20240101.000000"));
        assert!(words.contains(&"deltinp=3.0"));
        assert!(words.contains(&"tendinp=20240101.060000"));
        assert!(lines[1].words().any(|w| w == "nhedt=1"));
    }

    #[test]
    fn test_unsupported_quantity() {
        let iface: DataInterface = build(json!({"input": [{"var": "salinity", "source": "wind"}]})).unwrap();
        let (data, grid) = (source(), grid());
        let err = iface.bind(&Bindings::new().data(&data).grid(&grid)).unwrap_err();
        match err {
            ConfigError::UnsupportedQuantity { path, quantity, expected } => {
                assert_eq!(path, "input[0].var");
                assert_eq!(quantity, "salinity");
                assert!(expected.contains(&"wind"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_bindings_are_incomplete() {
        let iface: DataInterface = build(json!({"bottom": "depth"})).unwrap();
        let err = iface.bind(&Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteCommand { ref path, .. } if path == "data"));

        let data = source();
        let err = iface.bind(&Bindings::new().data(&data)).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteCommand { ref path, .. } if path == "bottom"));
    }

    #[test]
    fn test_scalar_data_for_vector_quantity() {
        let iface: DataInterface = build(json!({"input": [{"var": "current", "source": "depth"}]})).unwrap();
        let (data, grid) = (source(), grid());
        assert!(matches!(
            iface.bind(&Bindings::new().data(&data).grid(&grid)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_vars_must_be_unique() {
        let err = build::<DataInterface>(json!({"bottom": "depth", "input": [{"var": "bottom"}]})).unwrap_err();
        assert_eq!(err.field_errors()[0].constraint, "each input var must be unique");
    }
}
