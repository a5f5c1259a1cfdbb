//! INPGRID, READINP and the constant WIND and ICE commands
//!
//! Each input grid emits two adjacent instructions: the INPGRID geometry
//! line and the READINP line telling the model how to read the values.

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::Result;
use crate::render::TokenLine;
use crate::subcomponents::readgrid::{GridOption, ReadInp};
use crate::subcomponents::time::Nonstationary;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegularInpgrid {
    pub grid_type: GridOption,
    pub xpinp: f64,
    pub ypinp: f64,
    #[serde(default)]
    pub alpinp: f64,
    pub mxinp: u32,
    pub myinp: u32,
    pub dxinp: f64,
    pub dyinp: f64,
    #[serde(default)]
    pub excval: Option<f64>,
    #[serde(default)]
    pub nonstationary: Option<Nonstationary>,
    pub readinp: ReadInp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurvilinearInpgrid {
    pub grid_type: GridOption,
    #[serde(default)]
    pub stagrx: f64,
    #[serde(default)]
    pub stagry: f64,
    pub mxinp: u32,
    pub myinp: u32,
    #[serde(default)]
    pub excval: Option<f64>,
    #[serde(default)]
    pub nonstationary: Option<Nonstationary>,
    pub readinp: ReadInp,
}

/// Input grid on the unstructured computational mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnstructuredInpgrid {
    pub grid_type: GridOption,
    #[serde(default)]
    pub excval: Option<f64>,
    #[serde(default)]
    pub nonstationary: Option<Nonstationary>,
    pub readinp: ReadInp,
}

/// Constant wind over the whole domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Wind {
    pub vel: f64,
    pub dir: f64,
}

/// Constant sea ice over the whole domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ice {
    pub aice: f64,
    pub hice: f64,
}

tagged_union! {
    pub enum InputGrid {
        "regular" => Regular(RegularInpgrid),
        "curvilinear" => Curvilinear(CurvilinearInpgrid),
        "unstructured" => Unstructured(UnstructuredInpgrid),
        "wind" => Wind(Wind),
        "ice" => Ice(Ice),
    }
}

impl InputGrid {
    /// Quantity read from file, `None` for the constant commands
    pub fn grid_type(&self) -> Option<GridOption> {
        match self {
            Self::Regular(g) => Some(g.grid_type),
            Self::Curvilinear(g) => Some(g.grid_type),
            Self::Unstructured(g) => Some(g.grid_type),
            Self::Wind(_) | Self::Ice(_) => None,
        }
    }

    /// Quantities a constant command sets over the whole domain
    pub fn constant_quantities(&self) -> &'static [GridOption] {
        match self {
            Self::Wind(_) => &[GridOption::Wind, GridOption::Wx, GridOption::Wy],
            Self::Ice(_) => &[GridOption::Aice, GridOption::Hice],
            _ => &[],
        }
    }

    /// Exception value, time range and read instruction of a file-backed grid
    fn parts(&self) -> Option<(Option<f64>, &Option<Nonstationary>, &ReadInp)> {
        match self {
            Self::Regular(g) => Some((g.excval, &g.nonstationary, &g.readinp)),
            Self::Curvilinear(g) => Some((g.excval, &g.nonstationary, &g.readinp)),
            Self::Unstructured(g) => Some((g.excval, &g.nonstationary, &g.readinp)),
            Self::Wind(_) | Self::Ice(_) => None,
        }
    }
}

impl Component for InputGrid {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::default();
        let grid_type = match self {
            Self::Wind(w) => {
                line.word("WIND").kv("vel", w.vel).kv("dir", w.dir);
                return Ok(vec![line]);
            }
            Self::Ice(i) => {
                line.word("ICE").kv("aice", i.aice).kv("hice", i.hice);
                return Ok(vec![line]);
            }
            Self::Regular(g) => {
                line.word("INPGRID")
                    .word(g.grid_type.to_string())
                    .word("REGULAR")
                    .kv("xpinp", g.xpinp)
                    .kv("ypinp", g.ypinp)
                    .kv("alpinp", g.alpinp)
                    .kv("mxinp", g.mxinp)
                    .kv("myinp", g.myinp)
                    .kv("dxinp", g.dxinp)
                    .kv("dyinp", g.dyinp);
                g.grid_type
            }
            Self::Curvilinear(g) => {
                line.word("INPGRID")
                    .word(g.grid_type.to_string())
                    .word("CURVILINEAR")
                    .kv("stagrx", g.stagrx)
                    .kv("stagry", g.stagry)
                    .kv("mxinp", g.mxinp)
                    .kv("myinp", g.myinp);
                g.grid_type
            }
            Self::Unstructured(g) => {
                line.word("INPGRID")
                    .word(g.grid_type.to_string())
                    .word("UNSTRUCTURED");
                g.grid_type
            }
        };
        let mut lines = Vec::with_capacity(2);
        if let Some((excval, nonstationary, readinp)) = self.parts() {
            if let Some(excval) = excval {
                line.word("EXCEPTION").kv("excval", excval);
            }
            if let Some(times) = nonstationary {
                times.write_nonstationary(&mut line, "inp");
            }
            lines.push(line);
            lines.push(readinp.tokens(grid_type));
        }
        Ok(lines)
    }
}

impl Validate for InputGrid {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Regular(g) => {
                v.positive("dxinp", g.dxinp);
                v.positive("dyinp", g.dyinp);
            }
            Self::Curvilinear(g) => {
                v.positive("mxinp", g.mxinp);
                v.positive("myinp", g.myinp);
            }
            Self::Unstructured(_) => {}
            Self::Wind(w) => {
                v.min("vel", w.vel, 0.0);
                v.range("dir", w.dir, -180.0, 360.0);
            }
            Self::Ice(i) => {
                v.range("aice", i.aice, 0.0, 1.0);
                v.min("hice", i.hice, 0.0);
            }
        }
        if let Some((_, nonstationary, readinp)) = self.parts() {
            v.nested("nonstationary", nonstationary);
            v.nested("readinp", readinp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_regular_bottom() {
        let g: InputGrid = build(json!({
            "model_type": "regular",
            "grid_type": "bottom",
            "xpinp": 172.0, "ypinp": -41.0, "mxinp": 99, "myinp": 99, "dxinp": 0.005, "dyinp": 0.005,
            "excval": -99.0,
            "readinp": {"fname1": "bottom.txt", "idla": 3}
        }))
        .unwrap();
        assert_eq!(
            g.render().unwrap(),
            "INPGRID BOTTOM REGULAR xpinp=172.0 ypinp=-41.0 alpinp=0.0 mxinp=99 myinp=99 dxinp=0.005 dyinp=0.005 EXCEPTION excval=-99.0\n\
             READINP BOTTOM fac=1.0 fname1='bottom.txt' idla=3 nhedf=0 nhedt=0 nhedvec=0 FREE"
        );
    }

    #[test]
    fn test_nonstationary_wind() {
        let g: InputGrid = build(json!({
            "model_type": "unstructured",
            "grid_type": "wind",
            "nonstationary": {"tbeg": "2023-01-01T00:00:00", "tend": "2023-01-02T00:00:00", "delt": "PT30M", "dfmt": "min"},
            "readinp": {"fname1": "wind.txt", "nhedt": 1}
        }))
        .unwrap();
        let lines = g.cmd().unwrap();
        assert_eq!(
            lines[0].to_string(),
            "INPGRID WIND UNSTRUCTURED NONSTATIONARY tbeginp=20230101.000000 deltinp=30.0 MIN tendinp=20230102.000000"
        );
        assert!(lines[1].to_string().starts_with("READINP WIND"));
    }

    #[test]
    fn test_constant_wind() {
        let g: InputGrid = build(json!({"model_type": "wind", "vel": 10.0, "dir": 270.0})).unwrap();
        assert_eq!(g.render().unwrap(), "WIND vel=10.0 dir=270.0");
        assert_eq!(g.grid_type(), None);
        assert!(build::<InputGrid>(json!({"model_type": "ice", "aice": 1.5, "hice": 0.2})).is_err());
    }

    #[test]
    fn test_grid_type_must_be_known() {
        let err = build::<InputGrid>(json!({
            "model_type": "curvilinear", "grid_type": "salinity", "mxinp": 10, "myinp": 10,
            "readinp": {"fname1": "s.txt"}
        }));
        assert!(err.is_err());
    }
}
