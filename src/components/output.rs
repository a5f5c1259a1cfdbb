//! Output locations, settings and write commands
//!
//! Locations (FRAME, GROUP, CURVE, RAY, ISOLINE, POINTS, NGRID) define named
//! sets of output points. Write commands (BLOCK, TABLE, SPECOUT, NESTOUT)
//! refer to a location by its `sname` and carry optional [`OutputTimes`];
//! the OUTPUT group checks that the references resolve.

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::{ConfigError, Result};
use crate::render::TokenLine;
use crate::subcomponents::base::Points as TestPoints;
use crate::subcomponents::output::{
    check_location_name, write_quantities, OutputQuantity, SpecDim, SpecFreq, WRITE_SPECIAL_NAMES,
};
use crate::subcomponents::readgrid::GridRegular;
use crate::subcomponents::time::OutputTimes;
use crate::validate::{Validate, Validator};
use crate::{tagged_struct, tagged_union};

/// Maximum length of a location name
pub const SNAME_MAX: usize = 8;

/// Maximum length of a file name
pub const FNAME_MAX: usize = 36;

fn check_fname(v: &mut Validator, field: &str, fname: &str) {
    v.check(!fname.is_empty(), field, "''", "must not be empty");
    v.max_len(field, Some(fname), FNAME_MAX);
}

// ============================================================================
// Locations
// ============================================================================

/// Regular output grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Frame {
    pub sname: String,
    pub grid: GridRegular,
}

tagged_struct!(Frame, "frame");

impl Component for Frame {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("FRAME");
        line.quoted("sname", &self.sname);
        self.grid.write(&mut line, "fr");
        Ok(vec![line])
    }
}

impl Validate for Frame {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", &self.sname, SNAME_MAX);
        v.nested("grid", &self.grid);
    }
}

/// Subgrid of the computational grid, by grid indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Group {
    pub sname: String,
    pub ix1: u32,
    pub iy1: u32,
    pub ix2: u32,
    pub iy2: u32,
}

tagged_struct!(Group, "group");

impl Component for Group {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("GROUP");
        line.quoted("sname", &self.sname)
            .word("SUBGRID")
            .kv("ix1", self.ix1)
            .kv("iy1", self.iy1)
            .kv("ix2", self.ix2)
            .kv("iy2", self.iy2);
        Ok(vec![line])
    }
}

impl Validate for Group {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", &self.sname, SNAME_MAX);
        v.rule(self.ix2 >= self.ix1, "ix2", "ix2 must not be less than ix1");
        v.rule(self.iy2 >= self.iy1, "iy2", "iy2 must not be less than iy1");
    }
}

/// Output along a polyline. Segment `k` is split into `npts[k]` intervals
/// and ends at `(xp[k], yp[k])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Curve {
    pub sname: String,
    pub xp1: f64,
    pub yp1: f64,
    pub npts: Vec<u32>,
    pub xp: Vec<f64>,
    pub yp: Vec<f64>,
}

tagged_struct!(Curve, "curve");

/// Segment lists must line up with `npts` before any segment is written.
fn check_segments(npts: usize, lists: &[(&str, usize)]) -> Result<()> {
    match lists.iter().find(|(_, len)| *len != npts) {
        Some((name, len)) => Err(ConfigError::incomplete(
            "npts",
            format!("{npts} segment(s) but {len} {name} value(s)"),
        )),
        None => Ok(()),
    }
}

impl Curve {
    fn tokens(&self) -> Result<TokenLine> {
        check_segments(self.npts.len(), &[("xp", self.xp.len()), ("yp", self.yp.len())])?;
        let mut line = TokenLine::new("CURVE");
        line.quoted("sname", &self.sname)
            .kv("xp1", self.xp1)
            .kv("yp1", self.yp1);
        for ((npts, xp), yp) in self.npts.iter().zip(&self.xp).zip(&self.yp) {
            line.brk().kv("int", npts).kv("xp", xp).kv("yp", yp);
        }
        Ok(line)
    }
}

impl Validate for Curve {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", &self.sname, SNAME_MAX);
        v.check(!self.npts.is_empty(), "npts", "[]", "must have at least one segment");
        v.rule(
            self.xp.len() == self.npts.len() && self.yp.len() == self.npts.len(),
            "npts",
            "npts, xp and yp must be the same size",
        );
    }
}

/// Several curves, one CURVE command each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Curves {
    pub curves: Vec<Curve>,
}

tagged_struct!(Curves, "curves");

impl Curves {
    pub fn snames(&self) -> impl Iterator<Item = &str> {
        self.curves.iter().map(|c| c.sname.as_str())
    }
}

impl Component for Curves {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        self.curves
            .iter()
            .enumerate()
            .map(|(i, c)| c.tokens().map_err(|e| e.at(&format!("curves[{i}]"))))
            .collect()
    }
}

impl Validate for Curves {
    fn validate(&self, v: &mut Validator) {
        v.each("curves", &self.curves);
    }
}

/// Rays from which ISOLINE picks its crossing points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Ray {
    pub rname: String,
    pub xp1: f64,
    pub yp1: f64,
    pub xq1: f64,
    pub yq1: f64,
    pub npts: Vec<u32>,
    pub xp: Vec<f64>,
    pub yp: Vec<f64>,
    pub xq: Vec<f64>,
    pub yq: Vec<f64>,
}

tagged_struct!(Ray, "ray");

impl Component for Ray {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        check_segments(
            self.npts.len(),
            &[
                ("xp", self.xp.len()),
                ("yp", self.yp.len()),
                ("xq", self.xq.len()),
                ("yq", self.yq.len()),
            ],
        )?;
        let mut line = TokenLine::new("RAY");
        line.quoted("rname", &self.rname)
            .kv("xp1", self.xp1)
            .kv("yp1", self.yp1)
            .kv("xq1", self.xq1)
            .kv("yq1", self.yq1);
        let ends = self.xp.iter().zip(&self.yp).zip(self.xq.iter().zip(&self.yq));
        for (npts, ((xp, yp), (xq, yq))) in self.npts.iter().zip(ends) {
            line.brk()
                .kv("int", npts)
                .kv("xp", xp)
                .kv("yp", yp)
                .kv("xq", xq)
                .kv("yq", yq);
        }
        Ok(vec![line])
    }
}

impl Validate for Ray {
    fn validate(&self, v: &mut Validator) {
        v.max_len("rname", Some(&self.rname), 32);
        v.check(!self.npts.is_empty(), "npts", "[]", "must have at least one segment");
        let n = self.npts.len();
        for (name, len) in [
            ("xp", self.xp.len()),
            ("yp", self.yp.len()),
            ("xq", self.xq.len()),
            ("yq", self.yq.len()),
        ] {
            v.rule(len == n, name, &format!("npts and {name} must be the same size"));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsoLevel {
    #[default]
    Depth,
    Bottom,
}

/// Output where a depth (or bottom level) contour crosses a RAY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Isoline {
    pub sname: String,
    pub rname: String,
    #[serde(default)]
    pub level: IsoLevel,
    pub dep: f64,
}

tagged_struct!(Isoline, "isoline");

impl Component for Isoline {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("ISOLINE");
        line.quoted("sname", &self.sname)
            .quoted("rname", &self.rname)
            .word(match self.level {
                IsoLevel::Depth => "DEPTH",
                IsoLevel::Bottom => "BOTTOM",
            })
            .kv("dep", self.dep);
        Ok(vec![line])
    }
}

impl Validate for Isoline {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", &self.sname, SNAME_MAX);
        v.max_len("rname", Some(&self.rname), 32);
    }
}

/// Isolated output points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointsCoords {
    pub sname: String,
    pub xp: Vec<f64>,
    pub yp: Vec<f64>,
}

/// Isolated output points read from file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointsFile {
    pub sname: String,
    pub fname: String,
}

tagged_union! {
    pub enum Points default "points" {
        "points" => Coords(PointsCoords),
        "points_file" => File(PointsFile),
    }
}

impl Points {
    pub fn sname(&self) -> &str {
        match self {
            Self::Coords(p) => &p.sname,
            Self::File(p) => &p.sname,
        }
    }
}

impl Component for Points {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("POINTS");
        line.quoted("sname", self.sname());
        match self {
            Self::Coords(p) => {
                for (xp, yp) in p.xp.iter().zip(&p.yp) {
                    line.brk().kv("xp", xp).kv("yp", yp);
                }
            }
            Self::File(p) => {
                line.quoted("fname", &p.fname);
            }
        }
        Ok(vec![line])
    }
}

impl Validate for Points {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", self.sname(), SNAME_MAX);
        match self {
            Self::Coords(p) => {
                v.check(!p.xp.is_empty(), "xp", "[]", "must have at least one point");
                v.rule(p.xp.len() == p.yp.len(), "yp", "xp and yp must be the same size");
            }
            Self::File(p) => check_fname(v, "fname", &p.fname),
        }
    }
}

/// Regular nested grid for NESTOUT boundary output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NgridRegular {
    pub sname: String,
    pub grid: GridRegular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestMesh {
    Triangle,
    Easy,
}

/// Unstructured nested grid, optionally read from a mesh file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NgridUnstructured {
    pub sname: String,
    #[serde(default)]
    pub kind: Option<NestMesh>,
    #[serde(default)]
    pub fname: Option<String>,
}

tagged_union! {
    pub enum Ngrid default "ngrid" {
        "ngrid" => Regular(NgridRegular),
        "ngrid_unstructured" => Unstructured(NgridUnstructured),
    }
}

impl Ngrid {
    pub fn sname(&self) -> &str {
        match self {
            Self::Regular(n) => &n.sname,
            Self::Unstructured(n) => &n.sname,
        }
    }
}

impl Component for Ngrid {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("NGRID");
        line.quoted("sname", self.sname());
        match self {
            Self::Regular(n) => n.grid.write(&mut line, "n"),
            Self::Unstructured(n) => {
                line.word("UNSTRUCTURED");
                match (n.kind, n.fname.as_deref()) {
                    (Some(NestMesh::Triangle), Some(fname)) => {
                        line.word("TRIANGLE").quoted("fname", fname);
                    }
                    (Some(NestMesh::Easy), Some(fname)) => {
                        line.word("EASY").quoted("fname", fname);
                    }
                    (Some(_), None) => {
                        return Err(ConfigError::incomplete("fname", "mesh kind given without a mesh file"));
                    }
                    (None, _) => {}
                }
            }
        }
        Ok(vec![line])
    }
}

impl Validate for Ngrid {
    fn validate(&self, v: &mut Validator) {
        check_location_name(v, "sname", self.sname(), SNAME_MAX);
        match self {
            Self::Regular(n) => v.nested("grid", &n.grid),
            Self::Unstructured(n) => {
                v.max_len("fname", n.fname.as_deref(), FNAME_MAX);
                v.requires(("kind", n.kind.is_some()), ("fname", n.fname.is_some()));
            }
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCoord {
    Problemcoord,
    Frame,
}

/// Names, units and limits of output quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Quantity {
    pub output: Vec<OutputQuantity>,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub long: Option<String>,
    #[serde(default)]
    pub lexp: Option<f64>,
    #[serde(default)]
    pub hexp: Option<f64>,
    #[serde(default)]
    pub excv: Option<f64>,
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub fswell: Option<f64>,
    #[serde(default)]
    pub noswll: Option<u32>,
    #[serde(default)]
    pub fmin: Option<f64>,
    #[serde(default)]
    pub fmax: Option<f64>,
    #[serde(default)]
    pub coord: Option<OutputCoord>,
}

tagged_struct!(Quantity, "quantity");

impl Quantity {
    fn tokens(&self) -> TokenLine {
        let mut line = TokenLine::new("QUANTITY");
        for q in &self.output {
            line.word(q.to_string());
        }
        line.quoted_opt("short", self.short.as_deref())
            .quoted_opt("long", self.long.as_deref())
            .kv_opt("lexp", self.lexp)
            .kv_opt("hexp", self.hexp)
            .kv_opt("excv", self.excv)
            .kv_opt("power", self.power)
            .quoted_opt("ref", self.reference.as_deref())
            .kv_opt("fswell", self.fswell)
            .kv_opt("noswll", self.noswll)
            .kv_opt("fmin", self.fmin)
            .kv_opt("fmax", self.fmax);
        match self.coord {
            Some(OutputCoord::Problemcoord) => line.word("PROBLEMCOORD"),
            Some(OutputCoord::Frame) => line.word("FRAME"),
            None => &mut line,
        };
        line
    }
}

impl Validate for Quantity {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.output.is_empty(), "output", "[]", "must name at least one quantity");
        v.max_len("short", self.short.as_deref(), 16);
        v.max_len("long", self.long.as_deref(), 16);
        if let (Some(lo), Some(hi)) = (self.lexp, self.hexp) {
            v.rule(lo < hi, "lexp", "lexp must be less than hexp");
        }
        if let (Some(lo), Some(hi)) = (self.fmin, self.fmax) {
            v.rule(lo < hi, "fmin", "fmin must be less than fmax");
        }
    }
}

/// Several QUANTITY commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Quantities {
    pub quantities: Vec<Quantity>,
}

tagged_struct!(Quantities, "quantities");

impl Component for Quantities {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        Ok(self.quantities.iter().map(Quantity::tokens).collect())
    }
}

impl Validate for Quantities {
    fn validate(&self, v: &mut Validator) {
        v.each("quantities", &self.quantities);
    }
}

/// Layout of TABLE, BLOCK and SPECOUT files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct OutputOptions {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub field: Option<u32>,
    #[serde(default)]
    pub ndec_block: Option<u32>,
    #[serde(default)]
    pub len: Option<u32>,
    #[serde(default)]
    pub ndec_spec: Option<u32>,
}

tagged_struct!(OutputOptions, "output_options");

impl Component for OutputOptions {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("OUTPUT");
        line.word("OPTIONS").quoted_opt("comment", self.comment.as_deref());
        if let Some(field) = self.field {
            line.word("TABLE").kv("field", field);
        }
        if self.ndec_block.is_some() || self.len.is_some() {
            line.word("BLOCK")
                .kv_opt("ndec", self.ndec_block)
                .kv_opt("len", self.len);
        }
        if let Some(ndec) = self.ndec_spec {
            line.word("SPEC").kv("ndec", ndec);
        }
        Ok(vec![line])
    }
}

impl Validate for OutputOptions {
    fn validate(&self, v: &mut Validator) {
        if let Some(comment) = &self.comment {
            v.check(
                comment.chars().count() == 1,
                "comment",
                format!("'{comment}'"),
                "must be a single character",
            );
        }
        v.range("field", self.field, 8, 16);
        v.range("ndec_block", self.ndec_block, 0, 9);
        v.range("len", self.len, 1, 9999);
        v.range("ndec_spec", self.ndec_spec, 0, 9);
    }
}

// ============================================================================
// Writes
// ============================================================================

/// Fields shared by every write command
pub trait Write {
    /// Keyword suffix of the `tbeg`/`delt` output times
    const SUFFIX: &'static str;

    fn sname(&self) -> &str;
    fn times(&self) -> Option<&OutputTimes>;
    fn set_times(&mut self, times: OutputTimes);
}

macro_rules! write_fields {
    ($name:ty, $suffix:literal) => {
        impl Write for $name {
            const SUFFIX: &'static str = $suffix;

            fn sname(&self) -> &str {
                &self.sname
            }

            fn times(&self) -> Option<&OutputTimes> {
                self.times.as_ref()
            }

            fn set_times(&mut self, times: OutputTimes) {
                self.times = Some(times);
            }
        }
    };
}

/// Append ` OUTPUT tbeg{suffix}= delt{suffix}=` when the times are known.
fn write_times<W: Write>(w: &W, line: &mut TokenLine) -> Result<()> {
    match w.times() {
        None => Ok(()),
        Some(times) => {
            let range = times.range().ok_or_else(|| {
                ConfigError::incomplete("times", "tbeg and delt need a run period or explicit values")
            })?;
            line.word("OUTPUT");
            range.write(line, W::SUFFIX);
            Ok(())
        }
    }
}

fn validate_write(v: &mut Validator, sname: &str, fname: &str, times: &Option<OutputTimes>) {
    v.max_len("sname", Some(sname), SNAME_MAX);
    check_fname(v, "fname", fname);
    v.nested("times", times);
}

/// Spatial distributions on a FRAME, GROUP or special grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub sname: String,
    #[serde(default)]
    pub header: Option<bool>,
    pub fname: String,
    #[serde(default)]
    pub idla: Option<u8>,
    pub output: Vec<OutputQuantity>,
    #[serde(default)]
    pub unit: Option<f64>,
    #[serde(default)]
    pub times: Option<OutputTimes>,
}

write_fields!(Block, "blk");

impl Block {
    fn tokens(&self) -> Result<TokenLine> {
        let mut line = TokenLine::new("BLOCK");
        line.quoted("sname", &self.sname);
        match self.header {
            Some(true) => line.word("HEADER"),
            Some(false) => line.word("NOHEADER"),
            None => &mut line,
        };
        line.quoted("fname", &self.fname);
        if let Some(idla) = self.idla {
            line.word("LAYOUT").kv("idla", idla);
        }
        write_quantities(&mut line, &self.output);
        if let Some(unit) = self.unit {
            line.brk().kv("unit", unit);
        }
        if self.times.is_some() {
            line.brk();
        }
        write_times(self, &mut line)?;
        Ok(line)
    }
}

impl Validate for Block {
    fn validate(&self, v: &mut Validator) {
        validate_write(v, &self.sname, &self.fname, &self.times);
        v.one_of("idla", self.idla, &[1, 3, 4]);
        v.check(!self.output.is_empty(), "output", "[]", "must name at least one quantity");
    }
}

/// Several BLOCK writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blocks {
    pub components: Vec<Block>,
}

tagged_union! {
    pub enum BlockWrite default "block" {
        "block" => Single(Block),
        "blocks" => Many(Blocks),
    }
}

impl BlockWrite {
    pub fn blocks(&self) -> &[Block] {
        match self {
            Self::Single(b) => std::slice::from_ref(b),
            Self::Many(b) => &b.components,
        }
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        match self {
            Self::Single(b) => std::slice::from_mut(b),
            Self::Many(b) => &mut b.components,
        }
    }
}

impl Component for BlockWrite {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        self.blocks().iter().map(Block::tokens).collect()
    }
}

impl Validate for BlockWrite {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Single(b) => b.validate(v),
            Self::Many(b) => v.each("components", &b.components),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Header,
    Noheader,
    Indexed,
}

/// Quantities at output points in tabular form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Table {
    pub sname: String,
    #[serde(default)]
    pub format: Option<TableFormat>,
    pub fname: String,
    pub output: Vec<OutputQuantity>,
    #[serde(default)]
    pub times: Option<OutputTimes>,
}

tagged_struct!(Table, "table");
write_fields!(Table, "tbl");

impl Component for Table {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("TABLE");
        line.quoted("sname", &self.sname);
        if let Some(format) = self.format {
            line.word(match format {
                TableFormat::Header => "HEADER",
                TableFormat::Noheader => "NOHEADER",
                TableFormat::Indexed => "INDEXED",
            });
        }
        line.quoted("fname", &self.fname);
        write_quantities(&mut line, &self.output);
        if self.times.is_some() {
            line.brk();
        }
        write_times(self, &mut line)?;
        Ok(vec![line])
    }
}

impl Validate for Table {
    fn validate(&self, v: &mut Validator) {
        validate_write(v, &self.sname, &self.fname, &self.times);
        v.check(!self.output.is_empty(), "output", "[]", "must name at least one quantity");
    }
}

/// Spectra at output points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Specout {
    pub sname: String,
    #[serde(default)]
    pub dim: Option<SpecDim>,
    #[serde(default)]
    pub freq: Option<SpecFreq>,
    pub fname: String,
    #[serde(default)]
    pub times: Option<OutputTimes>,
}

tagged_struct!(Specout, "specout");
write_fields!(Specout, "spc");

impl Component for Specout {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("SPECOUT");
        line.quoted("sname", &self.sname);
        if let Some(dim) = &self.dim {
            line.word(dim.keyword());
        }
        if let Some(freq) = &self.freq {
            line.word(freq.keyword());
        }
        line.quoted("fname", &self.fname);
        write_times(self, &mut line)?;
        Ok(vec![line])
    }
}

impl Validate for Specout {
    fn validate(&self, v: &mut Validator) {
        validate_write(v, &self.sname, &self.fname, &self.times);
    }
}

/// Boundary spectra for a nested run on an NGRID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Nestout {
    pub sname: String,
    pub fname: String,
    #[serde(default)]
    pub times: Option<OutputTimes>,
}

tagged_struct!(Nestout, "nestout");
write_fields!(Nestout, "nst");

impl Component for Nestout {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("NESTOUT");
        line.quoted("sname", &self.sname).quoted("fname", &self.fname);
        write_times(self, &mut line)?;
        Ok(vec![line])
    }
}

impl Validate for Nestout {
    fn validate(&self, v: &mut Validator) {
        validate_write(v, &self.sname, &self.fname, &self.times);
    }
}

/// Whether a write command may target `sname` without a location command
pub fn is_write_special(sname: &str) -> bool {
    WRITE_SPECIAL_NAMES.contains(&sname)
}

// ============================================================================
// TEST
// ============================================================================

/// Source-term diagnostics at up to 50 points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Test {
    #[serde(default)]
    pub itest: Option<u32>,
    #[serde(default)]
    pub itrace: Option<u32>,
    pub points: TestPoints,
    #[serde(default)]
    pub fname_par: Option<String>,
    #[serde(default)]
    pub fname_s1d: Option<String>,
    #[serde(default)]
    pub fname_s2d: Option<String>,
}

tagged_struct!(Test, "test");

impl Component for Test {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("TEST");
        line.kv_opt("itest", self.itest)
            .kv_opt("itrace", self.itrace)
            .word("POINTS");
        self.points.write(&mut line);
        for (kw, fname) in [
            ("PAR", &self.fname_par),
            ("S1D", &self.fname_s1d),
            ("S2D", &self.fname_s2d),
        ] {
            if let Some(fname) = fname {
                line.word(kw).quoted("fname", fname);
            }
        }
        Ok(vec![line])
    }
}

impl Validate for Test {
    fn validate(&self, v: &mut Validator) {
        v.nested("points", &self.points);
        let size = self.points.size();
        v.check(size <= 50, "points", size, "at most 50 test points are allowed");
        if self.fname_par.is_none() && self.fname_s1d.is_none() && self.fname_s2d.is_none() {
            tracing::warn!("TEST has no output file, set fname_par, fname_s1d or fname_s2d");
        }
    }
}
