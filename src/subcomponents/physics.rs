//! Source-term packages for GEN3, the TRIAD biphase options and the parts of
//! an OBSTACLE command
//!
//! ST6 has five calibrated presets (`st6c1` .. `st6c5`). A preset fixes the
//! dissipation coefficients, the wind scaling and the drag formulation; only
//! the normalisation, stress and wind-speed options remain selectable.

use serde::{Deserialize, Serialize};

use super::keyword_params;
use crate::render::TokenLine;
use crate::validate::{Validate, Validator};
use crate::{tagged_struct, tagged_union};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDrag {
    #[default]
    Wu,
    Fit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum St6Drag {
    #[default]
    Hwang,
    Fan,
    Ecmwf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tau {
    #[default]
    Vectau,
    Scatau,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum U10 {
    #[default]
    U10proxy,
    True10,
}

fn write_agrow(line: &mut TokenLine, agrow: bool, a: Option<f64>) {
    if agrow {
        line.word("AGROW").kv_opt("a", a);
    }
}

macro_rules! source_term {
    ($(#[$meta:meta])* $name:ident $keyword:literal { $($field:ident),* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $( #[serde(default)] pub $field: Option<f64>, )*
            #[serde(default)]
            pub wind_drag: WindDrag,
            #[serde(default)]
            pub agrow: bool,
            /// Linear growth coefficient, only written with `agrow`
            #[serde(default)]
            pub a: Option<f64>,
        }

        impl $name {
            fn write(&self, line: &mut TokenLine) {
                line.word($keyword);
                $( line.kv_opt(stringify!($field), self.$field); )*
                line.word("DRAG").word(match self.wind_drag {
                    WindDrag::Wu => "WU",
                    WindDrag::Fit => "FIT",
                });
                write_agrow(line, self.agrow, self.a);
            }
        }
    };
}

source_term!(
    /// Janssen (1989, 1991) wind input and whitecapping
    Janssen "JANSSEN" { cds1, delta }
);
source_term!(
    /// Komen et al. (1984) wind input and whitecapping
    Komen "KOMEN" { cds2, stpm }
);
source_term!(
    /// Saturation-based whitecapping of Van der Westhuysen et al. (2007)
    Westhuysen "WESTHUYSEN" { cds2, br }
);

fn default_windscaling() -> f64 {
    32.0
}

/// Observation-based ST6 physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct St6 {
    pub a1sds: f64,
    pub a2sds: f64,
    #[serde(default)]
    pub p1sds: Option<f64>,
    #[serde(default)]
    pub p2sds: Option<f64>,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default)]
    pub wind_drag: St6Drag,
    #[serde(default)]
    pub tau: Tau,
    #[serde(default)]
    pub u10: U10,
    #[serde(default = "default_windscaling")]
    pub windscaling: f64,
    /// Drag debias factor, HWANG drag only
    #[serde(default)]
    pub cdfac: Option<f64>,
    #[serde(default)]
    pub agrow: bool,
    #[serde(default)]
    pub a: Option<f64>,
}

impl St6 {
    fn write(&self, line: &mut TokenLine) {
        line.word("ST6")
            .kv("a1sds", self.a1sds)
            .kv("a2sds", self.a2sds)
            .kv_opt("p1sds", self.p1sds)
            .kv_opt("p2sds", self.p2sds);
        line.word(match self.normalization {
            Normalization::Up => "UP",
            Normalization::Down => "DOWN",
        });
        line.word(match self.wind_drag {
            St6Drag::Hwang => "HWANG",
            St6Drag::Fan => "FAN",
            St6Drag::Ecmwf => "ECMWF",
        });
        line.word(match self.tau {
            Tau::Vectau => "VECTAU",
            Tau::Scatau => "SCATAU",
        });
        match self.u10 {
            U10::U10proxy => {
                line.word("U10PROXY").kv("windscaling", self.windscaling);
            }
            U10::True10 => {
                line.word("TRUE10");
            }
        }
        if let Some(cdfac) = self.cdfac {
            line.word("DEBIAS").kv("cdfac", cdfac);
        }
        write_agrow(line, self.agrow, self.a);
    }
}

impl Validate for St6 {
    fn validate(&self, v: &mut Validator) {
        v.positive("cdfac", self.cdfac);
        v.rule(
            self.cdfac.is_none() || self.wind_drag == St6Drag::Hwang,
            "cdfac",
            "debias (cdfac) is only supported with HWANG wind drag",
        );
    }
}

macro_rules! st6_preset {
    (
        $(#[$meta:meta])*
        $name:ident {
            a1sds: $a1:expr,
            a2sds: $a2:expr,
            windscaling: $ws:expr,
            wind_drag: $drag:expr,
            cdfac: $cdfac:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            #[serde(default)]
            pub normalization: Normalization,
            #[serde(default)]
            pub tau: Tau,
            #[serde(default)]
            pub u10: U10,
            #[serde(default)]
            pub a: Option<f64>,
        }

        impl $name {
            /// The full ST6 settings this preset stands for
            pub fn params(&self) -> St6 {
                St6 {
                    a1sds: $a1,
                    a2sds: $a2,
                    p1sds: Some(4.0),
                    p2sds: Some(4.0),
                    normalization: self.normalization,
                    wind_drag: $drag,
                    tau: self.tau,
                    u10: self.u10,
                    windscaling: $ws,
                    cdfac: $cdfac,
                    agrow: true,
                    a: self.a,
                }
            }
        }
    };
}

st6_preset!(
    /// Rogers et al. (2012) calibration
    St6c1 { a1sds: 4.7e-7, a2sds: 6.6e-6, windscaling: 28.0, wind_drag: St6Drag::Hwang, cdfac: None }
);
st6_preset!(
    /// ST6C1 with FAN drag
    St6c2 { a1sds: 4.7e-7, a2sds: 6.6e-6, windscaling: 28.0, wind_drag: St6Drag::Fan, cdfac: None }
);
st6_preset!(
    St6c3 { a1sds: 2.8e-6, a2sds: 3.5e-5, windscaling: 32.0, wind_drag: St6Drag::Hwang, cdfac: None }
);
st6_preset!(
    /// ST6C3 with drag debiasing
    St6c4 { a1sds: 2.8e-6, a2sds: 3.5e-5, windscaling: 32.0, wind_drag: St6Drag::Hwang, cdfac: Some(0.89) }
);
st6_preset!(
    St6c5 { a1sds: 6.5e-6, a2sds: 8.5e-5, windscaling: 35.0, wind_drag: St6Drag::Hwang, cdfac: Some(0.89) }
);

tagged_union! {
    /// Wind input, whitecapping and quadruplet settings of GEN3
    pub enum SourceTerms default "westhuysen" {
        "janssen" => Janssen(Janssen),
        "komen" => Komen(Komen),
        "westhuysen" => Westhuysen(Westhuysen),
        "st6" => St6(St6),
        "st6c1" => St6c1(St6c1),
        "st6c2" => St6c2(St6c2),
        "st6c3" => St6c3(St6c3),
        "st6c4" => St6c4(St6c4),
        "st6c5" => St6c5(St6c5),
    }
}

impl Default for SourceTerms {
    fn default() -> Self {
        Self::Westhuysen(Westhuysen::default())
    }
}

impl SourceTerms {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Janssen(s) => s.write(line),
            Self::Komen(s) => s.write(line),
            Self::Westhuysen(s) => s.write(line),
            Self::St6(s) => s.write(line),
            Self::St6c1(s) => s.params().write(line),
            Self::St6c2(s) => s.params().write(line),
            Self::St6c3(s) => s.params().write(line),
            Self::St6c4(s) => s.params().write(line),
            Self::St6c5(s) => s.params().write(line),
        }
    }
}

impl Validate for SourceTerms {
    fn validate(&self, v: &mut Validator) {
        if let Self::St6(s) = self {
            s.validate(v);
        }
    }
}

// ============================================================================
// Triad biphase
// ============================================================================

/// Biphase parameterisation of Eldeberky (1996)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Eldeberky {
    #[serde(default)]
    pub urcrit: Option<f64>,
}

/// Biphase parameterisation of De Wit (2022)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dewit {
    #[serde(default)]
    pub lpar: Option<f64>,
}

tagged_union! {
    pub enum Biphase {
        "eldeberky" => Eldeberky(Eldeberky),
        "dewit" => Dewit(Dewit),
    }
}

impl Biphase {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("BIPHASE");
        match self {
            Self::Eldeberky(b) => {
                line.word("ELDEBERKY").kv_opt("urcrit", b.urcrit);
            }
            Self::Dewit(b) => {
                line.word("DEWIT").kv_opt("lpar", b.lpar);
            }
        }
    }
}

impl Validate for Biphase {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Eldeberky(b) => v.positive("urcrit", b.urcrit),
            Self::Dewit(b) => v.min("lpar", b.lpar, 0.0),
        }
    }
}

// ============================================================================
// Obstacle transmission and reflection
// ============================================================================

keyword_params!(
    /// Constant transmission coefficient
    pub struct Transm ["TRANSM"] { trcoef: f64 }
);

/// Frequency dependent transmission, one coefficient per frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trans1d {
    pub trcoef: Vec<f64>,
}

/// Frequency-direction dependent transmission. Rows are directions, columns
/// are frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trans2d {
    pub trcoef: Vec<Vec<f64>>,
}

/// DAM transmission of Goda/Seelig (1979)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Goda {
    /// Crest elevation above the reference level, negative when submerged
    pub hgt: f64,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
}

/// DAM transmission of d'Angremond et al. (1996)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dangremond {
    pub hgt: f64,
    /// Slope of the obstacle in degrees
    pub slope: f64,
    /// Crest width
    #[serde(rename = "Bk")]
    pub bk: f64,
}

tagged_union! {
    pub enum Transmission {
        "transm" => Transm(Transm),
        "trans1d" => Trans1d(Trans1d),
        "trans2d" => Trans2d(Trans2d),
        "goda" => Goda(Goda),
        "dangremond" => Dangremond(Dangremond),
    }
}

impl Transmission {
    /// Crest height of the DAM formulations
    pub fn dam_height(&self) -> Option<f64> {
        match self {
            Self::Goda(t) => Some(t.hgt),
            Self::Dangremond(t) => Some(t.hgt),
            _ => None,
        }
    }

    /// Coefficient of the constant formulation
    pub fn constant(&self) -> Option<f64> {
        match self {
            Self::Transm(t) => t.trcoef,
            _ => None,
        }
    }

    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Transm(t) => t.write(line),
            Self::Trans1d(t) => {
                line.word("TRANS1D");
                for coef in &t.trcoef {
                    line.num(*coef);
                }
            }
            Self::Trans2d(t) => {
                line.word("TRANS2D");
                for row in &t.trcoef {
                    line.brk();
                    for coef in row {
                        line.num(*coef);
                    }
                }
                line.brk();
            }
            Self::Goda(t) => {
                line.word("DAM")
                    .word("GODA")
                    .kv("hgt", t.hgt)
                    .kv_opt("alpha", t.alpha)
                    .kv_opt("beta", t.beta);
            }
            Self::Dangremond(t) => {
                line.word("DAM")
                    .word("DANGREMOND")
                    .kv("hgt", t.hgt)
                    .kv("slope", t.slope)
                    .kv("Bk", t.bk);
            }
        }
    }
}

fn coefficients(v: &mut Validator, field: &str, values: &[f64]) {
    for (i, coef) in values.iter().enumerate() {
        v.range(&format!("{field}[{i}]"), *coef, 0.0, 1.0);
    }
}

impl Validate for Transmission {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Transm(t) => v.range("trcoef", t.trcoef, 0.0, 1.0),
            Self::Trans1d(t) => {
                v.check(!t.trcoef.is_empty(), "trcoef", "[]", "must have at least one value");
                coefficients(v, "trcoef", &t.trcoef);
            }
            Self::Trans2d(t) => {
                v.check(!t.trcoef.is_empty(), "trcoef", "[]", "must have at least one row");
                for (i, row) in t.trcoef.iter().enumerate() {
                    coefficients(v, &format!("trcoef[{i}]"), row);
                }
                let columns = t.trcoef.first().map_or(0, Vec::len);
                v.rule(
                    t.trcoef.iter().all(|row| row.len() == columns),
                    "trcoef",
                    "every direction must have the same number of frequencies",
                );
            }
            Self::Goda(_) => {}
            Self::Dangremond(t) => v.range("slope", t.slope, 0.0, 90.0),
        }
    }
}

keyword_params!(
    /// Obstacle reflection
    tagged "refl" pub struct Refl ["REFL"] { reflc: f64 }
);

impl Validate for Refl {
    fn validate(&self, v: &mut Validator) {
        v.min("reflc", self.reflc, 0.0);
    }
}

/// Specular reflection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rspec {}

keyword_params!(
    /// Diffuse reflection, incident waves scattered over `cos^pown`
    pub struct Rdiff ["RDIFF"] { pown: f64 }
);

tagged_union! {
    pub enum ReflectionType {
        "rspec" => Rspec(Rspec),
        "rdiff" => Rdiff(Rdiff),
    }
}

impl ReflectionType {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Rspec(_) => {
                line.word("RSPEC");
            }
            Self::Rdiff(r) => r.write(line),
        }
    }
}

impl Validate for ReflectionType {
    fn validate(&self, v: &mut Validator) {
        if let Self::Rdiff(r) = self {
            v.min("pown", r.pown, 0.0);
        }
    }
}

/// Freeboard dependent transmission and reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Freeboard {
    pub hgt: f64,
    #[serde(default)]
    pub gammat: Option<f64>,
    #[serde(default)]
    pub gammar: Option<f64>,
    /// Coefficients also depend on which side of a quay edge a point lies
    #[serde(default)]
    pub quay: bool,
}

tagged_struct!(Freeboard, "freeboard");

impl Freeboard {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("FREEBOARD")
            .kv("hgt", self.hgt)
            .kv_opt("gammat", self.gammat)
            .kv_opt("gammar", self.gammar)
            .word_if(self.quay, "QUAY");
    }
}

impl Validate for Freeboard {
    fn validate(&self, v: &mut Validator) {
        v.positive("gammat", self.gammat);
        v.positive("gammar", self.gammar);
    }
}

/// Corner points of an obstacle line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Line {
    pub xp: Vec<f64>,
    pub yp: Vec<f64>,
}

tagged_struct!(Line, "line");

impl Line {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("LINE");
        for (xp, yp) in self.xp.iter().zip(&self.yp) {
            line.num(*xp).num(*yp);
        }
    }
}

impl Validate for Line {
    fn validate(&self, v: &mut Validator) {
        v.check(self.xp.len() >= 2, "xp", self.xp.len(), "must have at least 2 points");
        v.check(self.yp.len() >= 2, "yp", self.yp.len(), "must have at least 2 points");
        v.rule(self.xp.len() == self.yp.len(), "xp", "xp and yp must be the same length");
    }
}
