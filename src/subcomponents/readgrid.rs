//! Grid geometry and grid-file read instructions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::render::TokenLine;
use crate::validate::{Validate, Validator};

/// Quantity an input grid carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridOption {
    Bottom,
    Wlevel,
    Current,
    Vx,
    Vy,
    Wind,
    Wx,
    Wy,
    Friction,
    Nplants,
    Turbvisc,
    Mudlayer,
    Aice,
    Hice,
    Hss,
    Tss,
}

impl GridOption {
    pub const ALL: [GridOption; 16] = [
        Self::Bottom,
        Self::Wlevel,
        Self::Current,
        Self::Vx,
        Self::Vy,
        Self::Wind,
        Self::Wx,
        Self::Wy,
        Self::Friction,
        Self::Nplants,
        Self::Turbvisc,
        Self::Mudlayer,
        Self::Aice,
        Self::Hice,
        Self::Hss,
        Self::Tss,
    ];

    pub const NAMES: &'static [&'static str] = &[
        "bottom", "wlevel", "current", "vx", "vy", "wind", "wx", "wy", "friction", "nplants",
        "turbvisc", "mudlayer", "aice", "hice", "hss", "tss",
    ];

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| Self::ALL[i])
    }

    /// Whether the quantity has an x and a y component
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Current | Self::Wind)
    }
}

impl fmt::Display for GridOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_ascii_uppercase())
    }
}

/// Regular grid geometry, written with a per-command keyword suffix
/// (`xpc=` for the computational grid, `xpfr=` for output frames).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridRegular {
    pub xp: f64,
    pub yp: f64,
    #[serde(default)]
    pub alp: f64,
    pub xlen: f64,
    pub ylen: f64,
    pub mx: u32,
    pub my: u32,
}

impl GridRegular {
    pub fn dx(&self) -> f64 {
        self.xlen / f64::from(self.mx)
    }

    pub fn dy(&self) -> f64 {
        self.ylen / f64::from(self.my)
    }

    pub fn write(&self, line: &mut TokenLine, suffix: &str) {
        line.kv(&format!("xp{suffix}"), self.xp)
            .kv(&format!("yp{suffix}"), self.yp)
            .kv(&format!("alp{suffix}"), self.alp)
            .kv(&format!("xlen{suffix}"), self.xlen)
            .kv(&format!("ylen{suffix}"), self.ylen)
            .kv(&format!("mx{suffix}"), self.mx)
            .kv(&format!("my{suffix}"), self.my);
    }
}

impl Validate for GridRegular {
    fn validate(&self, v: &mut Validator) {
        v.positive("xlen", self.xlen);
        v.positive("ylen", self.ylen);
        v.positive("mx", self.mx);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Free,
    Fixed,
    Unformatted,
}

/// How a grid file is laid out and encoded. Shared by READGRID and READINP.
#[derive(Debug, Clone, PartialEq)]
struct ReadLayout {
    fac: f64,
    idla: u8,
    format: FileFormat,
    form: Option<String>,
    idfm: Option<u8>,
}

fn default_fac() -> f64 {
    1.0
}

fn default_idla() -> u8 {
    1
}

impl ReadLayout {
    fn write_format(&self, line: &mut TokenLine) {
        match (self.format, &self.form, self.idfm) {
            (FileFormat::Fixed, Some(form), _) => {
                line.word("FORMAT").quoted("form", form);
            }
            (FileFormat::Fixed, None, Some(idfm)) => {
                line.word("FORMAT").kv("idfm", idfm);
            }
            (FileFormat::Unformatted, _, _) => {
                line.word("UNFORMATTED");
            }
            _ => {
                line.word("FREE");
            }
        }
    }

    fn validate_fields(&self, v: &mut Validator) {
        v.positive("fac", self.fac);
        v.one_of("idla", self.idla, &[1, 2, 3, 4, 5, 6]);
        v.one_of("idfm", self.idfm, &[1, 5, 6, 8]);
        let given = usize::from(self.form.is_some()) + usize::from(self.idfm.is_some());
        match self.format {
            FileFormat::Fixed => {
                v.rule(given == 1, "format", "FIXED format requires exactly one of form or idfm");
            }
            FileFormat::Free | FileFormat::Unformatted if given > 0 => {
                tracing::warn!(format = ?self.format, "form/idfm ignored for non-fixed format");
            }
            _ => {}
        }
    }
}

/// `READGRID COORDINATES`: coordinates of a curvilinear computational grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadCoord {
    pub fname: String,
    #[serde(default = "default_fac")]
    pub fac: f64,
    #[serde(default = "default_idla")]
    pub idla: u8,
    #[serde(default)]
    pub nhedf: u32,
    #[serde(default)]
    pub nhedvec: u32,
    #[serde(default)]
    pub format: FileFormat,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub idfm: Option<u8>,
}

impl ReadCoord {
    fn layout(&self) -> ReadLayout {
        ReadLayout {
            fac: self.fac,
            idla: self.idla,
            format: self.format,
            form: self.form.clone(),
            idfm: self.idfm,
        }
    }

    pub fn tokens(&self) -> TokenLine {
        let mut line = TokenLine::new("READGRID");
        line.word("COORDINATES")
            .kv("fac", self.fac)
            .quoted("fname", &self.fname)
            .kv("idla", self.idla)
            .kv("nhedf", self.nhedf)
            .kv("nhedvec", self.nhedvec);
        self.layout().write_format(&mut line);
        line
    }
}

impl Validate for ReadCoord {
    fn validate(&self, v: &mut Validator) {
        self.layout().validate_fields(v);
    }
}

/// `READINP`: values of an input grid. The quantity keyword comes from the
/// owning INPGRID command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadInp {
    pub fname1: String,
    #[serde(default)]
    pub fname2: Option<String>,
    #[serde(default = "default_fac")]
    pub fac: f64,
    #[serde(default = "default_idla")]
    pub idla: u8,
    #[serde(default)]
    pub nhedf: u32,
    #[serde(default)]
    pub nhedt: u32,
    #[serde(default)]
    pub nhedvec: u32,
    #[serde(default)]
    pub format: FileFormat,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub idfm: Option<u8>,
}

impl ReadInp {
    pub fn new(fname1: impl Into<String>) -> Self {
        Self {
            fname1: fname1.into(),
            fname2: None,
            fac: default_fac(),
            idla: default_idla(),
            nhedf: 0,
            nhedt: 0,
            nhedvec: 0,
            format: FileFormat::Free,
            form: None,
            idfm: None,
        }
    }

    fn layout(&self) -> ReadLayout {
        ReadLayout {
            fac: self.fac,
            idla: self.idla,
            format: self.format,
            form: self.form.clone(),
            idfm: self.idfm,
        }
    }

    pub fn tokens(&self, grid_type: GridOption) -> TokenLine {
        let mut line = TokenLine::new("READINP");
        line.word(grid_type.to_string())
            .kv("fac", self.fac)
            .quoted("fname1", &self.fname1);
        if let Some(fname2) = &self.fname2 {
            line.word("SERIES").quoted("fname2", fname2);
        }
        line.kv("idla", self.idla)
            .kv("nhedf", self.nhedf)
            .kv("nhedt", self.nhedt)
            .kv("nhedvec", self.nhedvec);
        self.layout().write_format(&mut line);
        line
    }
}

impl Validate for ReadInp {
    fn validate(&self, v: &mut Validator) {
        self.layout().validate_fields(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::wrap;
    use crate::validate::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_grid_option_names() {
        assert_eq!(GridOption::from_name("WLEVEL"), Some(GridOption::Wlevel));
        assert_eq!(GridOption::from_name("salinity"), None);
        assert_eq!(GridOption::Tss.name(), "tss");
        assert_eq!(GridOption::Mudlayer.to_string(), "MUDLAYER");
    }

    #[test]
    fn test_readinp() {
        let r: ReadInp = build(json!({"fname1": "wind.txt", "fname2": "wind2.txt", "nhedt": 1})).unwrap();
        assert_eq!(
            wrap(&r.tokens(GridOption::Wind)),
            "READINP WIND fac=1.0 fname1='wind.txt' SERIES fname2='wind2.txt' idla=1 nhedf=0 nhedt=1 nhedvec=0 FREE"
        );
    }

    #[test]
    fn test_readcoord_fixed_form() {
        let r: ReadCoord = build(json!({"fname": "coords.txt", "format": "fixed", "form": "(10f12.4)"})).unwrap();
        assert_eq!(
            wrap(&r.tokens()),
            "READGRID COORDINATES fac=1.0 fname='coords.txt' idla=1 nhedf=0 nhedvec=0 FORMAT form='(10f12.4)'"
        );
    }

    #[test]
    fn test_fixed_requires_one_of_form_idfm() {
        let err = build::<ReadCoord>(json!({"fname": "c.txt", "format": "fixed"})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "format");
        let err = build::<ReadCoord>(json!({"fname": "c.txt", "format": "fixed", "form": "(f)", "idfm": 1}))
            .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "format");
    }

    #[test]
    fn test_grid_regular_suffix() {
        let g: GridRegular = build(json!({"xp": 0, "yp": 0, "xlen": 100, "ylen": 50, "mx": 10, "my": 5})).unwrap();
        let mut line = TokenLine::default();
        g.write(&mut line, "c");
        assert_eq!(
            wrap(&line),
            "xpc=0.0 ypc=0.0 alpc=0.0 xlenc=100.0 ylenc=50.0 mxc=10 myc=5"
        );
        assert_eq!(g.dx(), 10.0);
    }
}
