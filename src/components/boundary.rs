//! BOUNDSPEC, BOUNDNEST1/2/3 and INITIAL

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::Result;
use crate::render::TokenLine;
use crate::subcomponents::boundary::{BoundaryData, BoundaryLocation, InitialKind};
use crate::subcomponents::spectrum::Shapespec;
use crate::tagged_struct;
use crate::validate::{Validate, Validator};

/// Wave conditions along a side or segment of the computational grid.
///
/// Emits the `BOUND SHAPESPEC` line followed by the `BOUNDSPEC` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Boundspec {
    #[serde(default)]
    pub shapespec: Shapespec,
    pub location: BoundaryLocation,
    pub data: BoundaryData,
}

impl Component for Boundspec {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("BOUNDSPEC");
        self.location.write(&mut line);
        self.data.write(&mut line);
        Ok(vec![self.shapespec.tokens(), line])
    }
}

impl Validate for Boundspec {
    fn validate(&self, v: &mut Validator) {
        v.nested("shapespec", &self.shapespec);
        v.nested("location", &self.location);
        v.nested("data", &self.data);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rectangle {
    #[default]
    Closed,
    Open,
}

impl Rectangle {
    fn keyword(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
        }
    }
}

fn check_nest_fname(v: &mut Validator, fname: &str) {
    v.check(!fname.is_empty(), "fname", "''", "must not be empty");
    v.max_len("fname", Some(fname), 36);
}

/// Boundary spectra from a coarser SWAN run (NESTOUT file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Boundnest1 {
    pub fname: String,
    #[serde(default)]
    pub rectangle: Rectangle,
}

impl Component for Boundnest1 {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("BOUNDNEST1");
        line.word("NEST")
            .quoted("fname", &self.fname)
            .word(self.rectangle.keyword());
        Ok(vec![line])
    }
}

impl Validate for Boundnest1 {
    fn validate(&self, v: &mut Validator) {
        check_nest_fname(v, &self.fname);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WamFormat {
    Cray,
    Wkstat,
    Free,
}

fn default_lwdate() -> u8 {
    12
}

/// Boundary spectra from a WAM run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Boundnest2 {
    pub fname: String,
    pub format: WamFormat,
    #[serde(default)]
    pub xgc: Option<f64>,
    #[serde(default)]
    pub ygc: Option<f64>,
    /// Length of the date-time stamp in the WAM file
    #[serde(default = "default_lwdate")]
    pub lwdate: u8,
}

impl Component for Boundnest2 {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("BOUNDNEST2");
        line.word("WAMNEST").quoted("fname", &self.fname);
        match self.format {
            WamFormat::Cray => line.word("UNFORMATTED").word("CRAY"),
            WamFormat::Wkstat => line.word("UNFORMATTED").word("WKSTAT"),
            WamFormat::Free => line.word("FREE"),
        };
        line.kv_opt("xgc", self.xgc)
            .kv_opt("ygc", self.ygc)
            .kv("lwdate", self.lwdate);
        Ok(vec![line])
    }
}

impl Validate for Boundnest2 {
    fn validate(&self, v: &mut Validator) {
        check_nest_fname(v, &self.fname);
        v.one_of("lwdate", self.lwdate, &[10, 12, 14]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ww3Format {
    Unformatted,
    Free,
}

/// Boundary spectra from a WAVEWATCH III run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Boundnest3 {
    pub fname: String,
    pub format: Ww3Format,
    #[serde(default)]
    pub rectangle: Rectangle,
    #[serde(default)]
    pub xgc: Option<f64>,
    #[serde(default)]
    pub ygc: Option<f64>,
}

impl Component for Boundnest3 {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("BOUNDNEST3");
        line.word("WW3")
            .quoted("fname", &self.fname)
            .word(match self.format {
                Ww3Format::Unformatted => "UNFORMATTED",
                Ww3Format::Free => "FREE",
            })
            .word(self.rectangle.keyword())
            .kv_opt("xgc", self.xgc)
            .kv_opt("ygc", self.ygc);
        Ok(vec![line])
    }
}

impl Validate for Boundnest3 {
    fn validate(&self, v: &mut Validator) {
        check_nest_fname(v, &self.fname);
    }
}

/// Initial wave field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Initial {
    #[serde(default)]
    pub kind: InitialKind,
}

tagged_struct!(Initial, "initial");

impl Component for Initial {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("INITIAL");
        self.kind.write(&mut line);
        Ok(vec![line])
    }
}

impl Validate for Initial {
    fn validate(&self, v: &mut Validator) {
        v.nested("kind", &self.kind);
    }
}
