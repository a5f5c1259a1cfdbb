//! Boundary locations, boundary wave data and initial-condition options

use serde::{Deserialize, Serialize};

use super::base::{Points, Xy};
use crate::render::TokenLine;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideName {
    North,
    Nw,
    West,
    Sw,
    South,
    Se,
    East,
    Ne,
}

impl SideName {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::North => "NORTH",
            Self::Nw => "NW",
            Self::West => "WEST",
            Self::Sw => "SW",
            Self::South => "SOUTH",
            Self::Se => "SE",
            Self::East => "EAST",
            Self::Ne => "NE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Ccw,
    Clockwise,
}

/// One side of the computational grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Side {
    pub side: SideName,
    #[serde(default)]
    pub direction: Orientation,
}

impl Side {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("SIDE")
            .word(self.side.keyword())
            .word(match self.direction {
                Orientation::Ccw => "CCW",
                Orientation::Clockwise => "CLOCKWISE",
            });
    }
}

/// Boundary segment through a list of vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Segment {
    pub points: Points,
}

impl Segment {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("SEGMENT");
        self.points.write(line);
    }
}

tagged_union! {
    /// Where along the grid boundary wave data is imposed.
    ///
    /// `points` is a set of boundary stations; it is written as a segment
    /// through the stations in the order given.
    pub enum BoundaryLocation {
        "side" => Side(Side),
        "segment" => Segment(Segment),
        "points" => Points(Xy),
    }
}

impl BoundaryLocation {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Side(s) => s.write(line),
            Self::Segment(s) => s.write(line),
            Self::Points(p) => {
                line.word("SEGMENT").word("XY");
                p.write(line);
            }
        }
    }

    /// Number of stations, or `None` for a whole side
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Side(_) => None,
            Self::Segment(s) => Some(s.points.size()),
            Self::Points(p) => Some(p.size()),
        }
    }
}

impl Validate for BoundaryLocation {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Side(_) => {}
            Self::Segment(s) => {
                v.nested("points", &s.points);
                v.rule(
                    s.points.size() >= 2,
                    "points",
                    "a segment needs at least 2 points",
                );
            }
            Self::Points(p) => {
                p.validate(v);
                v.rule(p.size() >= 2, "x", "a point set needs at least 2 points");
            }
        }
    }
}

// ============================================================================
// Boundary data
// ============================================================================

/// Integral wave parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Par {
    pub hs: f64,
    pub per: f64,
    pub dir: f64,
    #[serde(default)]
    pub dd: Option<f64>,
}

impl Par {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("PAR")
            .kv("hs", self.hs)
            .kv("per", self.per)
            .kv("dir", self.dir)
            .kv_opt("dd", self.dd);
    }
}

impl Validate for Par {
    fn validate(&self, v: &mut Validator) {
        v.positive("hs", self.hs);
        v.positive("per", self.per);
        v.range("dir", self.dir, -360.0, 360.0);
        v.range("dd", self.dd, 0.0, 360.0);
    }
}

/// Parameters varying along the boundary, one row per distance `len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablePar {
    pub hs: Vec<f64>,
    pub per: Vec<f64>,
    pub dir: Vec<f64>,
    pub dd: Vec<f64>,
    #[serde(rename = "len")]
    pub dist: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantFile {
    pub fname: String,
    #[serde(default)]
    pub seq: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableFile {
    pub fname: Vec<String>,
    #[serde(default)]
    pub seq: Option<Vec<u32>>,
    #[serde(rename = "len")]
    pub dist: Vec<f64>,
}

tagged_union! {
    /// Wave data imposed along a boundary location
    pub enum BoundaryData {
        "constantpar" => ConstantPar(Par),
        "constantfile" => ConstantFile(ConstantFile),
        "variablepar" => VariablePar(VariablePar),
        "variablefile" => VariableFile(VariableFile),
    }
}

impl BoundaryData {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::ConstantPar(p) => {
                line.word("CONSTANT");
                p.write(line);
            }
            Self::ConstantFile(f) => {
                line.word("CONSTANT")
                    .word("FILE")
                    .quoted("fname", &f.fname)
                    .kv_opt("seq", f.seq);
            }
            Self::VariablePar(p) => {
                line.word("VARIABLE").word("PAR");
                let rows = p.dist.iter().zip(&p.hs).zip(&p.per).zip(&p.dir).zip(&p.dd);
                for ((((dist, hs), per), dir), dd) in rows {
                    line.brk()
                        .kv("len", dist)
                        .kv("hs", hs)
                        .kv("per", per)
                        .kv("dir", dir)
                        .kv("dd", dd);
                }
            }
            Self::VariableFile(f) => {
                line.word("VARIABLE").word("FILE");
                for (i, (dist, fname)) in f.dist.iter().zip(&f.fname).enumerate() {
                    let seq = f.seq.as_ref().and_then(|s| s.get(i).copied()).unwrap_or(1);
                    line.brk()
                        .kv("len", dist)
                        .quoted("fname", fname)
                        .kv("seq", seq);
                }
            }
        }
    }
}

impl Validate for BoundaryData {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::ConstantPar(p) => p.validate(v),
            Self::ConstantFile(f) => {
                v.max_len("fname", Some(&f.fname), 36);
                v.min("seq", f.seq, 1);
            }
            Self::VariablePar(p) => {
                for (name, values) in [("hs", &p.hs), ("per", &p.per), ("dd", &p.dd)] {
                    for (i, x) in values.iter().enumerate() {
                        v.min(&format!("{name}[{i}]"), *x, 0.0);
                    }
                }
                for (i, x) in p.dir.iter().enumerate() {
                    v.range(&format!("dir[{i}]"), *x, -360.0, 360.0);
                }
                for (i, x) in p.dd.iter().enumerate() {
                    v.range(&format!("dd[{i}]"), *x, 0.0, 360.0);
                }
                for (i, x) in p.dist.iter().enumerate() {
                    v.min(&format!("len[{i}]"), *x, 0.0);
                }
                let n = p.dist.len();
                for (name, len) in [
                    ("hs", p.hs.len()),
                    ("per", p.per.len()),
                    ("dir", p.dir.len()),
                    ("dd", p.dd.len()),
                ] {
                    v.rule(len == n, name, &format!("size of len and {name} must be the same"));
                }
            }
            Self::VariableFile(f) => {
                for (i, fname) in f.fname.iter().enumerate() {
                    v.max_len(&format!("fname[{i}]"), Some(fname), 36);
                }
                if let Some(seq) = &f.seq {
                    for (i, s) in seq.iter().enumerate() {
                        v.min(&format!("seq[{i}]"), *s, 1);
                    }
                    v.rule(
                        seq.len() == f.dist.len(),
                        "seq",
                        "size of len and seq must be the same",
                    );
                }
                for (i, x) in f.dist.iter().enumerate() {
                    v.min(&format!("len[{i}]"), *x, 0.0);
                }
                v.rule(
                    f.fname.len() == f.dist.len(),
                    "fname",
                    "size of len and fname must be the same",
                );
            }
        }
    }
}

// ============================================================================
// Initial conditions
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotFormat {
    #[default]
    Free,
    Unformatted,
}

impl HotFormat {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Unformatted => "UNFORMATTED",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialDefault {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialZero {}

/// Hotstart from one file, or from one file per process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hotstart {
    pub fname: String,
    #[serde(default)]
    pub format: HotFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotstartMultiple {
    pub fname: String,
    #[serde(default)]
    pub format: HotFormat,
}

tagged_union! {
    pub enum InitialKind default "default" {
        "default" => Default(InitialDefault),
        "zero" => Zero(InitialZero),
        "par" => Par(Par),
        "hotsingle" => HotSingle(Hotstart),
        "hotmultiple" => HotMultiple(HotstartMultiple),
    }
}

impl Default for InitialKind {
    fn default() -> Self {
        Self::Default(InitialDefault {})
    }
}

impl InitialKind {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Default(_) => {
                line.word("DEFAULT");
            }
            Self::Zero(_) => {
                line.word("ZERO");
            }
            Self::Par(p) => p.write(line),
            Self::HotSingle(h) => {
                line.word("HOTSTART")
                    .word("SINGLE")
                    .quoted("fname", &h.fname)
                    .word(h.format.keyword());
            }
            Self::HotMultiple(h) => {
                line.word("HOTSTART")
                    .word("MULTIPLE")
                    .quoted("fname", &h.fname)
                    .word(h.format.keyword());
            }
        }
    }
}

impl Validate for InitialKind {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Par(p) => p.validate(v),
            Self::HotSingle(h) => v.max_len("fname", Some(&h.fname), 36),
            Self::HotMultiple(h) => v.max_len("fname", Some(&h.fname), 36),
            Self::Default(_) | Self::Zero(_) => {}
        }
    }
}
