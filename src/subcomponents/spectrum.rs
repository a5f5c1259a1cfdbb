//! Spectral discretisation and boundary spectral shapes

use serde::{Deserialize, Serialize};

use crate::render::TokenLine;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

/// Directional and frequency resolution of the computational spectrum.
///
/// Exactly two of `flow`, `fhigh` and `msc` must be given; the third is
/// derived by the model. A sector is defined when both `dir1` and `dir2` are
/// present, otherwise the full circle is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spectrum {
    pub mdc: u32,
    #[serde(default)]
    pub flow: Option<f64>,
    #[serde(default)]
    pub fhigh: Option<f64>,
    #[serde(default)]
    pub msc: Option<u32>,
    #[serde(default)]
    pub dir1: Option<f64>,
    #[serde(default)]
    pub dir2: Option<f64>,
}

impl Spectrum {
    pub fn write(&self, line: &mut TokenLine) {
        match (self.dir1, self.dir2) {
            (Some(d1), Some(d2)) => {
                line.word("SECTOR").num(d1).num(d2);
            }
            _ => {
                line.word("CIRCLE");
            }
        }
        line.kv("mdc", self.mdc)
            .kv_opt("flow", self.flow)
            .kv_opt("fhigh", self.fhigh)
            .kv_opt("msc", self.msc);
    }
}

impl Validate for Spectrum {
    fn validate(&self, v: &mut Validator) {
        v.positive("mdc", self.mdc);
        v.min("msc", self.msc, 3);
        v.positive("flow", self.flow);
        v.positive("fhigh", self.fhigh);

        let given = [self.flow.is_some(), self.fhigh.is_some(), self.msc.is_some()]
            .iter()
            .filter(|g| **g)
            .count();
        v.rule(
            given == 2,
            "flow",
            "exactly 2 of [flow, fhigh, msc] must be specified",
        );
        if let (Some(lo), Some(hi)) = (self.flow, self.fhigh) {
            v.rule(lo < hi, "flow", "flow must be less than fhigh");
        }
        v.rule(
            self.dir1.is_some() == self.dir2.is_some(),
            "dir1",
            "dir1 and dir2 must be specified together",
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Jonswap {
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

fn default_gamma() -> f64 {
    3.3
}

impl Default for Jonswap {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
        }
    }
}

/// JONSWAP shape in finite depth `d`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tma {
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    pub d: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gauss {
    pub sigfr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PiersonMoskowitz {}

/// All energy in a single frequency bin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bin {}

tagged_union! {
    pub enum Shape default "jonswap" {
        "jonswap" => Jonswap(Jonswap),
        "tma" => Tma(Tma),
        "gauss" => Gauss(Gauss),
        "pm" => Pm(PiersonMoskowitz),
        "bin" => Bin(Bin),
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Jonswap(Jonswap::default())
    }
}

impl Shape {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Jonswap(s) => {
                line.word("JONSWAP").kv("gamma", s.gamma);
            }
            Self::Tma(s) => {
                line.word("TMA").kv("gamma", s.gamma).kv("d", s.d);
            }
            Self::Gauss(s) => {
                line.word("GAUSS").kv("sigfr", s.sigfr);
            }
            Self::Pm(_) => {
                line.word("PM");
            }
            Self::Bin(_) => {
                line.word("BIN");
            }
        }
    }
}

impl Validate for Shape {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Jonswap(s) => v.positive("gamma", s.gamma),
            Self::Tma(s) => {
                v.positive("gamma", s.gamma);
                v.positive("d", s.d);
            }
            Self::Gauss(s) => v.positive("sigfr", s.sigfr),
            Self::Pm(_) | Self::Bin(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Peak,
    Mean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadType {
    #[default]
    Power,
    Degrees,
}

/// `BOUND SHAPESPEC`: spectral shape assumed for parametric boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shapespec {
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub per_type: PeriodType,
    #[serde(default)]
    pub dspr_type: SpreadType,
}

impl Shapespec {
    pub fn tokens(&self) -> TokenLine {
        let mut line = TokenLine::new("BOUND");
        line.word("SHAPESPEC");
        self.shape.write(&mut line);
        line.word(match self.per_type {
            PeriodType::Peak => "PEAK",
            PeriodType::Mean => "MEAN",
        });
        line.word("DSPR").word(match self.dspr_type {
            SpreadType::Power => "POWER",
            SpreadType::Degrees => "DEGREES",
        });
        line
    }
}

impl Validate for Shapespec {
    fn validate(&self, v: &mut Validator) {
        v.nested("shape", &self.shape);
    }
}
