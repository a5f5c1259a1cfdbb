//! CGRID: the computational grid and its spectral resolution

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::{ConfigError, Result};
use crate::render::TokenLine;
use crate::subcomponents::readgrid::{GridRegular, ReadCoord};
use crate::subcomponents::spectrum::Spectrum;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegularCgrid {
    pub grid: GridRegular,
    pub spectrum: Spectrum,
}

/// Curvilinear grid; coordinates come from a READGRID COORDINATES file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurvilinearCgrid {
    pub mxc: u32,
    pub myc: u32,
    #[serde(default)]
    pub xexc: Option<f64>,
    #[serde(default)]
    pub yexc: Option<f64>,
    pub readcoord: ReadCoord,
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshType {
    #[default]
    Adcirc,
    Triangle,
    Easymesh,
}

impl MeshType {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Adcirc => "ADCIRC",
            Self::Triangle => "TRIANGLE",
            Self::Easymesh => "EASYMESH",
        }
    }
}

/// Unstructured mesh. ADCIRC reads `fort.14`; the other generators need a
/// file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnstructuredCgrid {
    #[serde(default)]
    pub grid_type: MeshType,
    #[serde(default)]
    pub fname: Option<String>,
    pub spectrum: Spectrum,
}

tagged_union! {
    pub enum Cgrid default "regular" {
        "regular" => Regular(RegularCgrid),
        "curvilinear" => Curvilinear(CurvilinearCgrid),
        "unstructured" => Unstructured(UnstructuredCgrid),
    }
}

impl Cgrid {
    pub fn spectrum(&self) -> &Spectrum {
        match self {
            Self::Regular(g) => &g.spectrum,
            Self::Curvilinear(g) => &g.spectrum,
            Self::Unstructured(g) => &g.spectrum,
        }
    }
}

impl Component for Cgrid {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("CGRID");
        match self {
            Self::Regular(g) => {
                line.word("REGULAR");
                g.grid.write(&mut line, "c");
                g.spectrum.write(&mut line);
                Ok(vec![line])
            }
            Self::Curvilinear(g) => {
                line.word("CURVILINEAR").kv("mxc", g.mxc).kv("myc", g.myc);
                if let (Some(xexc), Some(yexc)) = (g.xexc, g.yexc) {
                    line.word("EXCEPTION").kv("xexc", xexc).kv("yexc", yexc);
                }
                g.spectrum.write(&mut line);
                Ok(vec![line, g.readcoord.tokens()])
            }
            Self::Unstructured(g) => {
                line.word("UNSTRUCTURED");
                g.spectrum.write(&mut line);
                let mut read = TokenLine::new("READGRID");
                read.word("UNSTRUCTURED").word(g.grid_type.keyword());
                match (g.grid_type, &g.fname) {
                    (MeshType::Adcirc, _) => {}
                    (_, Some(fname)) => {
                        read.quoted("fname", fname);
                    }
                    (other, None) => {
                        return Err(ConfigError::incomplete(
                            "fname",
                            format!("{} mesh needs a file name", other.keyword()),
                        ));
                    }
                }
                Ok(vec![line, read])
            }
        }
    }
}

impl Validate for Cgrid {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Regular(g) => {
                v.nested("grid", &g.grid);
                v.nested("spectrum", &g.spectrum);
            }
            Self::Curvilinear(g) => {
                v.positive("mxc", g.mxc);
                v.positive("myc", g.myc);
                v.nested("readcoord", &g.readcoord);
                v.nested("spectrum", &g.spectrum);
                v.rule(
                    g.xexc.is_some() == g.yexc.is_some(),
                    "xexc",
                    "xexc and yexc must be specified together",
                );
            }
            Self::Unstructured(g) => {
                v.max_len("fname", g.fname.as_deref(), 36);
                v.nested("spectrum", &g.spectrum);
                match g.grid_type {
                    MeshType::Adcirc => v.rule(
                        g.fname.is_none(),
                        "fname",
                        "fname must not be specified for an ADCIRC mesh",
                    ),
                    _ => v.rule(
                        g.fname.is_some(),
                        "fname",
                        "fname must be specified for TRIANGLE and EASYMESH meshes",
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn spectrum() -> serde_json::Value {
        json!({"mdc": 36, "flow": 0.04, "fhigh": 1.0})
    }

    #[test]
    fn test_regular_is_default() {
        let cgrid: Cgrid = build(json!({
            "grid": {"xp": 110.0, "yp": -35.2, "alp": 4.0, "xlen": 5.0, "ylen": 4.0, "mx": 15, "my": 10},
            "spectrum": spectrum()
        }))
        .unwrap();
        assert_eq!(
            cgrid.render().unwrap(),
            "CGRID REGULAR xpc=110.0 ypc=-35.2 alpc=4.0 xlenc=5.0 ylenc=4.0 mxc=15 myc=10 CIRCLE mdc=36 flow=0.04 fhigh=1.0"
        );
    }

    #[test]
    fn test_curvilinear_emits_readgrid() {
        let cgrid: Cgrid = build(json!({
            "model_type": "curvilinear",
            "mxc": 199, "myc": 199, "xexc": -999.0, "yexc": -999.0,
            "readcoord": {"fname": "./coords.txt"},
            "spectrum": spectrum()
        }))
        .unwrap();
        let lines = cgrid.cmd().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            cgrid.render().unwrap(),
            "CGRID CURVILINEAR mxc=199 myc=199 EXCEPTION xexc=-999.0 yexc=-999.0 CIRCLE mdc=36 flow=0.04 fhigh=1.0\n\
             READGRID COORDINATES fac=1.0 fname='./coords.txt' idla=1 nhedf=0 nhedvec=0 FREE"
        );
    }

    #[test]
    fn test_unstructured_fname_rules() {
        let cgrid: Cgrid = build(json!({"model_type": "unstructured", "spectrum": spectrum()})).unwrap();
        assert_eq!(
            cgrid.render().unwrap(),
            "CGRID UNSTRUCTURED CIRCLE mdc=36 flow=0.04 fhigh=1.0\nREADGRID UNSTRUCTURED ADCIRC"
        );
        let err = build::<Cgrid>(json!({
            "model_type": "unstructured", "grid_type": "triangle", "spectrum": spectrum()
        }))
        .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "fname");
    }

    #[test]
    fn test_unstructured_incomplete_at_render() {
        let cgrid = Cgrid::Unstructured(UnstructuredCgrid {
            grid_type: MeshType::Easymesh,
            fname: None,
            spectrum: Spectrum {
                mdc: 36,
                flow: Some(0.04),
                fhigh: Some(1.0),
                msc: None,
                dir1: None,
                dir2: None,
            },
        });
        let err = cgrid.cmd().unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteCommand { ref path, .. } if path == "fname"));
    }
}
