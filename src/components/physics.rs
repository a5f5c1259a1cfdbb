//! Physics commands
//!
//! Every command here is a single line. Commands with model variants are
//! tagged unions whose variant structs only carry that model's parameters.

use serde::{Deserialize, Deserializer, Serialize};

use super::Component;
use crate::error::Result;
use crate::render::TokenLine;
use crate::subcomponents::keyword_params;
use crate::subcomponents::physics::{
    Biphase, Freeboard, Line, Refl, ReflectionType, SourceTerms, Transmission,
};
use crate::validate::{Validate, Validator};
use crate::{tagged_struct, tagged_union};

/// Implement [`Component`] for types that write a single command line.
macro_rules! single_line {
    ($($name:ty),* $(,)?) => {
        $(
            impl Component for $name {
                fn cmd(&self) -> Result<Vec<TokenLine>> {
                    let mut line = TokenLine::default();
                    self.write(&mut line);
                    Ok(vec![line])
                }
            }
        )*
    };
}

// ============================================================================
// GEN
// ============================================================================

keyword_params!(
    /// First generation model
    pub struct Gen1 ["GEN1"] {
        cf10: f64, cf20: f64, cf30: f64, cf40: f64, edmlpm: f64, cdrag: f64, umin: f64, cfpm: f64
    }
);

keyword_params!(
    /// Second generation model
    pub struct Gen2 ["GEN2"] {
        cf10: f64, cf20: f64, cf30: f64, cf40: f64, cf50: f64, cf60: f64,
        edmlpm: f64, cdrag: f64, umin: f64, cfpm: f64
    }
);

/// Third generation model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gen3 {
    #[serde(default)]
    pub source_terms: SourceTerms,
}

tagged_union! {
    pub enum Gen {
        "gen1" => Gen1(Gen1),
        "gen2" => Gen2(Gen2),
        "gen3" => Gen3(Gen3),
    }
}

impl Gen {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Gen1(g) => g.write(line),
            Self::Gen2(g) => g.write(line),
            Self::Gen3(g) => {
                line.word("GEN3");
                g.source_terms.write(line);
            }
        }
    }
}

impl Validate for Gen {
    fn validate(&self, v: &mut Validator) {
        if let Self::Gen3(g) = self {
            v.nested("source_terms", &g.source_terms);
        }
    }
}

// ============================================================================
// SSWELL, NEGATINP, WCAPPING, QUADRUPL
// ============================================================================

keyword_params!(
    /// Swell dissipation of Rogers et al. (2012)
    pub struct Rogers ["SSWELL" "ROGERS"] { cdsv: f64, feswell: f64 }
);

keyword_params!(
    pub struct Ardhuin ["SSWELL" "ARDHUIN"] { cdsv: f64 }
);

keyword_params!(
    /// Swell dissipation of Zieger et al. (2015)
    pub struct Zieger ["SSWELL" "ZIEGER"] { b1: f64 }
);

tagged_union! {
    /// Non-breaking swell dissipation
    pub enum Sswell {
        "rogers" => Rogers(Rogers),
        "ardhuin" => Ardhuin(Ardhuin),
        "zieger" => Zieger(Zieger),
    }
}

impl Sswell {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Rogers(s) => s.write(line),
            Self::Ardhuin(s) => s.write(line),
            Self::Zieger(s) => s.write(line),
        }
    }

    pub fn is_zieger(&self) -> bool {
        matches!(self, Self::Zieger(_))
    }
}

impl Validate for Sswell {
    fn validate(&self, _v: &mut Validator) {}
}

keyword_params!(
    /// Negative wind input
    tagged "negatinp" pub struct Negatinp ["NEGATINP"] { rdcoef: f64 }
);

impl Validate for Negatinp {
    fn validate(&self, v: &mut Validator) {
        v.range("rdcoef", self.rdcoef, 0.0, 1.0);
    }
}

keyword_params!(
    pub struct WcappingKomen ["WCAPPING" "KOMEN"] {
        cds2: f64, stpm: f64, powst: f64, delta: f64, powk: f64
    }
);

/// Saturation-based whitecapping of Alves and Banner (2003)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WcappingAb {
    #[serde(default)]
    pub cds2: Option<f64>,
    #[serde(default)]
    pub br: Option<f64>,
    /// Account for current refraction in the dissipation
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub cds3: Option<f64>,
}

tagged_union! {
    /// Whitecapping dissipation
    pub enum Wcapping {
        "komen" => Komen(WcappingKomen),
        "ab" => Ab(WcappingAb),
    }
}

impl Wcapping {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Komen(w) => w.write(line),
            Self::Ab(w) => {
                line.word("WCAPPING")
                    .word("AB")
                    .kv_opt("cds2", w.cds2)
                    .kv_opt("br", w.br)
                    .word_if(w.current, "CURRENT")
                    .kv_opt("cds3", w.cds3);
            }
        }
    }
}

impl Validate for Wcapping {
    fn validate(&self, v: &mut Validator) {
        if let Self::Ab(w) = self {
            v.requires(("cds3", w.cds3.is_some()), ("current", w.current));
        }
    }
}

keyword_params!(
    /// Quadruplet wave interactions
    tagged "quadrupl" pub struct Quadrupl ["QUADRUPL"] {
        iquad: u8, lambd: f64 as "lambda", cnl4: f64, csh1: f64, csh2: f64, csh3: f64
    }
);

impl Validate for Quadrupl {
    fn validate(&self, v: &mut Validator) {
        v.one_of("iquad", self.iquad, &[1, 2, 3, 8, 4, 51, 52, 53]);
        v.positive("lambd", self.lambd);
    }
}

// ============================================================================
// BREAKING, FRICTION
// ============================================================================

keyword_params!(
    /// Constant breaker index
    pub struct BreakingConstant ["BREAKING" "CONSTANT"] { alpha: f64, gamma: f64 }
);

keyword_params!(
    /// Bottom-slope and normalised-depth dependent breaker index
    pub struct BreakingBkd ["BREAKING" "BKD"] {
        alpha: f64, gamma0: f64, a1: f64, a2: f64, a3: f64
    }
);

tagged_union! {
    /// Depth-induced wave breaking
    pub enum Breaking {
        "constant" => Constant(BreakingConstant),
        "bkd" => Bkd(BreakingBkd),
    }
}

impl Breaking {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Constant(b) => b.write(line),
            Self::Bkd(b) => b.write(line),
        }
    }
}

impl Validate for Breaking {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Constant(b) => {
                v.positive("alpha", b.alpha);
                v.positive("gamma", b.gamma);
            }
            Self::Bkd(b) => {
                v.positive("alpha", b.alpha);
                v.positive("gamma0", b.gamma0);
            }
        }
    }
}

keyword_params!(
    pub struct FrictionJonswap ["FRICTION" "JONSWAP" "CONSTANT"] { cfjon: f64 }
);

keyword_params!(
    pub struct FrictionCollins ["FRICTION" "COLLINS"] { cfw: f64 }
);

keyword_params!(
    /// Equivalent roughness length scale of the bottom
    pub struct FrictionMadsen ["FRICTION" "MADSEN"] { kn: f64 }
);

keyword_params!(
    /// Ripple-dependent friction of Smith et al. (2011)
    pub struct FrictionRipples ["FRICTION" "RIPPLES"] { s: f64 as "S", d: f64 as "D" }
);

tagged_union! {
    /// Bottom friction
    pub enum Friction {
        "jonswap" => Jonswap(FrictionJonswap),
        "collins" => Collins(FrictionCollins),
        "madsen" => Madsen(FrictionMadsen),
        "ripples" => Ripples(FrictionRipples),
    }
}

impl Friction {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Jonswap(f) => f.write(line),
            Self::Collins(f) => f.write(line),
            Self::Madsen(f) => f.write(line),
            Self::Ripples(f) => f.write(line),
        }
    }
}

impl Validate for Friction {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Jonswap(f) => v.min("cfjon", f.cfjon, 0.0),
            Self::Collins(f) => v.min("cfw", f.cfw, 0.0),
            Self::Madsen(f) => v.positive("kn", f.kn),
            Self::Ripples(f) => {
                v.positive("s", f.s);
                v.positive("d", f.d);
            }
        }
    }
}

// ============================================================================
// TRIAD
// ============================================================================

keyword_params!(
    /// Lumped triad approximation with the legacy parameter set
    pub struct TriadLegacy ["TRIAD"] {
        itriad: u8, trfac: f64, cutfr: f64, a: f64, b: f64, urcrit: f64, urslim: f64
    }
);

/// Dissipative collinear (or non-collinear) triad approximation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriadDcta {
    #[serde(default)]
    pub trfac: Option<f64>,
    #[serde(default)]
    pub p: Option<f64>,
    #[serde(default)]
    pub noncolinear: bool,
    #[serde(default)]
    pub biphase: Option<Biphase>,
}

/// Lumped triad approximation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriadLta {
    #[serde(default)]
    pub trfac: Option<f64>,
    #[serde(default)]
    pub cutfr: Option<f64>,
    #[serde(default)]
    pub biphase: Option<Biphase>,
}

/// Stochastic parametric Boussinesq model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriadSpb {
    #[serde(default)]
    pub trfac: Option<f64>,
    #[serde(default)]
    pub a: Option<f64>,
    #[serde(default)]
    pub b: Option<f64>,
    #[serde(default)]
    pub biphase: Option<Biphase>,
}

tagged_union! {
    /// Triad wave-wave interactions
    pub enum Triad default "triad" {
        "triad" => Legacy(TriadLegacy),
        "dcta" => Dcta(TriadDcta),
        "lta" => Lta(TriadLta),
        "spb" => Spb(TriadSpb),
    }
}

fn write_biphase(line: &mut TokenLine, biphase: &Option<Biphase>) {
    if let Some(b) = biphase {
        b.write(line);
    }
}

impl Triad {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Legacy(t) => t.write(line),
            Self::Dcta(t) => {
                line.word("TRIAD")
                    .word("DCTA")
                    .kv_opt("trfac", t.trfac)
                    .kv_opt("p", t.p)
                    .word(if t.noncolinear { "NONC" } else { "COLL" });
                write_biphase(line, &t.biphase);
            }
            Self::Lta(t) => {
                line.word("TRIAD")
                    .word("LTA")
                    .kv_opt("trfac", t.trfac)
                    .kv_opt("cutfr", t.cutfr);
                write_biphase(line, &t.biphase);
            }
            Self::Spb(t) => {
                line.word("TRIAD")
                    .word("SPB")
                    .kv_opt("trfac", t.trfac)
                    .kv_opt("a", t.a)
                    .kv_opt("b", t.b);
                write_biphase(line, &t.biphase);
            }
        }
    }
}

impl Validate for Triad {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Legacy(t) => {
                v.one_of("itriad", t.itriad, &[1, 2]);
                v.positive("trfac", t.trfac);
                v.positive("cutfr", t.cutfr);
            }
            Self::Dcta(t) => {
                v.positive("trfac", t.trfac);
                v.nested("biphase", &t.biphase);
            }
            Self::Lta(t) => {
                v.positive("trfac", t.trfac);
                v.positive("cutfr", t.cutfr);
                v.nested("biphase", &t.biphase);
            }
            Self::Spb(t) => {
                v.positive("trfac", t.trfac);
                v.nested("biphase", &t.biphase);
            }
        }
    }
}

// ============================================================================
// VEGETATION, MUD, SICE, TURBULENCE
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// A per-layer value given either as a scalar (one layer) or a list.
fn layers<'de, D, T>(d: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(d)? {
        OneOrMany::One(x) => vec![x],
        OneOrMany::Many(v) => v,
    })
}

fn default_iveg() -> u8 {
    1
}

fn default_nstems() -> Vec<u32> {
    vec![1]
}

/// Vegetation dissipation, one parameter set per vertical layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Vegetation {
    #[serde(default = "default_iveg")]
    pub iveg: u8,
    #[serde(deserialize_with = "layers")]
    pub height: Vec<f64>,
    #[serde(deserialize_with = "layers")]
    pub diamtr: Vec<f64>,
    #[serde(deserialize_with = "layers")]
    pub drag: Vec<f64>,
    #[serde(default = "default_nstems", deserialize_with = "layers")]
    pub nstems: Vec<u32>,
}

tagged_struct!(Vegetation, "vegetation");

impl Vegetation {
    pub fn layers(&self) -> usize {
        self.height.len()
    }

    pub fn write(&self, line: &mut TokenLine) {
        line.word("VEGETATION").kv("iveg", self.iveg);
        let rows = self.height.iter().zip(&self.diamtr).zip(&self.nstems).zip(&self.drag);
        for (((height, diamtr), nstems), drag) in rows {
            line.kv("height", height)
                .kv("diamtr", diamtr)
                .kv("nstems", nstems)
                .kv("drag", drag);
        }
    }
}

impl Validate for Vegetation {
    fn validate(&self, v: &mut Validator) {
        v.one_of("iveg", self.iveg, &[1, 2]);
        let sizes = [
            self.height.len(),
            self.diamtr.len(),
            self.drag.len(),
            self.nstems.len(),
        ];
        v.check(
            sizes.iter().all(|n| *n == sizes[0]),
            "nstems",
            format!("{sizes:?}"),
            "number of layers must be the same for height, diamtr, drag and nstems",
        );
        v.rule(
            self.iveg != 2 || self.layers() <= 1,
            "iveg",
            "vertical layering is not supported with iveg=2",
        );
    }
}

keyword_params!(
    /// Fluid mud layer
    tagged "mud" pub struct Mud ["MUD"] { layer: f64, rhom: f64, viscm: f64 }
);

impl Validate for Mud {
    fn validate(&self, v: &mut Validator) {
        v.min("layer", self.layer, 0.0);
        v.positive("rhom", self.rhom);
        v.positive("viscm", self.viscm);
    }
}

/// Sea ice dissipation variant: the ice concentration followed by the
/// model keyword and its coefficients.
macro_rules! sice_model {
    ($(#[$meta:meta])* $name:ident $kw:literal { $($field:ident),* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            #[serde(default)]
            pub aice: Option<f64>,
            $( #[serde(default)] pub $field: Option<f64>, )*
        }

        impl $name {
            fn write(&self, line: &mut TokenLine) {
                line.word("SICE").kv_opt("aice", self.aice).word($kw);
                $( line.kv_opt(stringify!($field), self.$field); )*
            }
        }
    };
}

sice_model!(
    /// Model default sea ice dissipation
    SiceDefault "" {}
);
sice_model!(
    /// Empirical polynomial of Rogers et al. (2019)
    SiceR19 "R19" { c0, c1, c2, c3, c4, c5, c6 }
);
sice_model!(SiceD15 "D15" { chf });
sice_model!(SiceM18 "M18" { chf });
sice_model!(SiceR21b "R21B" { chf, npf });

tagged_union! {
    /// Sea ice dissipation
    pub enum Sice default "sice" {
        "sice" => Default(SiceDefault),
        "r19" => R19(SiceR19),
        "d15" => D15(SiceD15),
        "m18" => M18(SiceM18),
        "r21b" => R21b(SiceR21b),
    }
}

impl Sice {
    pub fn aice(&self) -> Option<f64> {
        match self {
            Self::Default(s) => s.aice,
            Self::R19(s) => s.aice,
            Self::D15(s) => s.aice,
            Self::M18(s) => s.aice,
            Self::R21b(s) => s.aice,
        }
    }

    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Default(s) => s.write(line),
            Self::R19(s) => s.write(line),
            Self::D15(s) => s.write(line),
            Self::M18(s) => s.write(line),
            Self::R21b(s) => s.write(line),
        }
    }
}

impl Validate for Sice {
    fn validate(&self, v: &mut Validator) {
        v.range("aice", self.aice(), 0.0, 1.0);
    }
}

fn default_true() -> bool {
    true
}

/// Dissipation by turbulent viscosity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Turbulence {
    #[serde(default)]
    pub ctb: Option<f64>,
    /// Derive the viscosity from the current
    #[serde(default = "default_true")]
    pub current: bool,
    #[serde(default)]
    pub tbcur: Option<f64>,
}

tagged_struct!(Turbulence, "turbulence");

impl Turbulence {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("TURBULENCE")
            .kv_opt("ctb", self.ctb)
            .word_if(self.current, "CURRENT")
            .kv_opt("tbcur", self.tbcur);
    }
}

impl Validate for Turbulence {
    fn validate(&self, v: &mut Validator) {
        v.positive("ctb", self.ctb);
        v.requires(("tbcur", self.tbcur.is_some()), ("current", self.current));
    }
}

// ============================================================================
// BRAGG
// ============================================================================

/// Bragg scattering with the default computation method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BraggDefault {
    #[serde(default)]
    pub ibrag: Option<u8>,
    pub nreg: u32,
    #[serde(default)]
    pub cutoff: Option<f64>,
}

/// Bragg scattering with a Fourier transform of the bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BraggFt {
    #[serde(default)]
    pub ibrag: Option<u8>,
    pub nreg: u32,
    #[serde(default)]
    pub cutoff: Option<f64>,
}

/// Bragg scattering with a bottom spectrum read from file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BraggFile {
    #[serde(default)]
    pub ibrag: Option<u8>,
    pub nreg: u32,
    #[serde(default)]
    pub cutoff: Option<f64>,
    pub fname: String,
    #[serde(default)]
    pub idla: Option<u8>,
    pub mkx: u32,
    #[serde(default)]
    pub mky: Option<u32>,
    pub dkx: f64,
    #[serde(default)]
    pub dky: Option<f64>,
}

tagged_union! {
    /// Bragg scattering
    pub enum Bragg default "bragg" {
        "bragg" => Default(BraggDefault),
        "ft" => Ft(BraggFt),
        "file" => File(BraggFile),
    }
}

impl Bragg {
    fn common(&self) -> (Option<u8>, u32, Option<f64>) {
        match self {
            Self::Default(b) => (b.ibrag, b.nreg, b.cutoff),
            Self::Ft(b) => (b.ibrag, b.nreg, b.cutoff),
            Self::File(b) => (b.ibrag, b.nreg, b.cutoff),
        }
    }

    pub fn write(&self, line: &mut TokenLine) {
        let (ibrag, nreg, cutoff) = self.common();
        line.word("BRAGG")
            .kv_opt("ibrag", ibrag)
            .kv("nreg", nreg)
            .kv_opt("cutoff", cutoff);
        match self {
            Self::Default(_) => {}
            Self::Ft(_) => {
                line.word("FT");
            }
            Self::File(b) => {
                line.word("FILE")
                    .quoted("fname", &b.fname)
                    .kv_opt("idla", b.idla)
                    .kv("mkx", b.mkx)
                    .kv_opt("mky", b.mky)
                    .kv("dkx", b.dkx)
                    .kv_opt("dky", b.dky);
            }
        }
    }
}

impl Validate for Bragg {
    fn validate(&self, v: &mut Validator) {
        let (ibrag, nreg, cutoff) = self.common();
        v.one_of("ibrag", ibrag, &[1, 2, 3]);
        v.positive("nreg", nreg);
        v.positive("cutoff", cutoff);
        if let Self::File(b) = self {
            v.max_len("fname", Some(&b.fname), 36);
            v.one_of("idla", b.idla, &[1, 2, 3, 4, 5, 6]);
            v.positive("mkx", b.mkx);
            v.positive("dkx", b.dkx);
        }
    }
}

// ============================================================================
// LIMITER, SETUP, DIFFRACTION, SURFBEAT, SCAT
// ============================================================================

keyword_params!(
    /// Action density limiter de-activation criteria
    tagged "limiter" pub struct Limiter ["LIMITER"] { ursell: f64, qb: f64 }
);

impl Validate for Limiter {
    fn validate(&self, v: &mut Validator) {
        v.positive("ursell", self.ursell);
        v.range("qb", self.qb, 0.0, 1.0);
    }
}

keyword_params!(
    /// Wave-induced set-up
    tagged "setup" pub struct Setup ["SETUP"] { supcor: f64 }
);

impl Validate for Setup {
    fn validate(&self, _v: &mut Validator) {}
}

/// Phase-decoupled refraction-diffraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Diffraction {
    #[serde(default)]
    pub idiffr: Option<bool>,
    #[serde(default)]
    pub smpar: Option<f64>,
    #[serde(default)]
    pub smnum: Option<u32>,
    #[serde(default)]
    pub cgmod: Option<f64>,
}

tagged_struct!(Diffraction, "diffraction");

impl Diffraction {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("DIFFRACTION")
            .kv_opt("idiffr", self.idiffr.map(u8::from))
            .kv_opt("smpar", self.smpar)
            .kv_opt("smnum", self.smnum)
            .kv_opt("cgmod", self.cgmod);
    }
}

impl Validate for Diffraction {
    fn validate(&self, v: &mut Validator) {
        v.min("smpar", self.smpar, 0.0);
        v.positive("cgmod", self.cgmod);
        let smoothing = self.smpar.is_some() || self.smnum.is_some() || self.cgmod.is_some();
        if self.idiffr == Some(false) && smoothing {
            tracing::warn!("diffraction smoothing parameters have no effect with idiffr=0");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Uniform,
    Logarithmic,
}

/// Infragravity energy from bound long waves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Surfbeat {
    #[serde(default)]
    pub df: Option<f64>,
    #[serde(default)]
    pub nmax: Option<u32>,
    #[serde(default)]
    pub emin: Option<f64>,
    #[serde(default)]
    pub spacing: Option<Spacing>,
}

tagged_struct!(Surfbeat, "surfbeat");

impl Surfbeat {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("SURFBEAT")
            .kv_opt("df", self.df)
            .kv_opt("nmax", self.nmax)
            .kv_opt("emin", self.emin);
        if let Some(spacing) = self.spacing {
            line.word(match spacing {
                Spacing::Uniform => "UNIFORM",
                Spacing::Logarithmic => "LOGARITHMIC",
            });
        }
    }
}

impl Validate for Surfbeat {
    fn validate(&self, v: &mut Validator) {
        v.min("df", self.df, 0.0);
    }
}

/// Scattering of waves by the varying bathymetry and current
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Scat {
    #[serde(default)]
    pub iqcm: Option<u8>,
    #[serde(default)]
    pub rfac: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub qmax: Option<f64>,
}

tagged_struct!(Scat, "scat");

impl Scat {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("SCAT").kv_opt("iqcm", self.iqcm);
        if let Some(rfac) = self.rfac {
            line.word("GRID").kv("rfac", rfac);
        }
        if self.alpha.is_some() || self.qmax.is_some() {
            line.word("TRUNC")
                .kv_opt("alpha", self.alpha)
                .kv_opt("qmax", self.qmax);
        }
    }
}

impl Validate for Scat {
    fn validate(&self, v: &mut Validator) {
        v.one_of("iqcm", self.iqcm, &[0, 1, 2]);
        v.min("rfac", self.rfac, 1.0);
        if self.alpha.is_some() && self.qmax.is_some() {
            tracing::warn!("both alpha and qmax truncate the convolution sum, the smaller limit applies");
        }
    }
}

// ============================================================================
// OBSTACLE
// ============================================================================

/// Sub-grid obstacle transmitting and/or reflecting waves along a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubgridObstacle {
    #[serde(default)]
    pub transmission: Option<Transmission>,
    #[serde(default)]
    pub reflection: Option<Refl>,
    #[serde(default)]
    pub reflection_type: Option<ReflectionType>,
    #[serde(default)]
    pub freeboard: Option<Freeboard>,
    pub line: Line,
}

/// Obstacle radiating free infragravity energy (Ardhuin et al., 2014)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigObstacle {
    /// Radiation rate calibration in 1/s
    pub alpha1: f64,
    /// Sea-swell significant wave height
    pub hss: f64,
    /// Sea-swell mean period
    pub tss: f64,
    #[serde(default)]
    pub reflection: Option<Refl>,
    pub line: Line,
}

tagged_union! {
    pub enum Obstacle {
        "obstacle" => Subgrid(SubgridObstacle),
        "fig" => Fig(FigObstacle),
    }
}

impl Obstacle {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("OBSTACLE");
        match self {
            Self::Subgrid(o) => {
                if let Some(transmission) = &o.transmission {
                    transmission.write(line);
                }
                if let Some(reflection) = &o.reflection {
                    reflection.write(line);
                }
                if let Some(kind) = &o.reflection_type {
                    kind.write(line);
                }
                if let Some(freeboard) = &o.freeboard {
                    freeboard.write(line);
                }
                o.line.write(line);
            }
            Self::Fig(o) => {
                line.word("FIG")
                    .kv("alpha1", o.alpha1)
                    .kv("hss", o.hss)
                    .kv("tss", o.tss);
                if let Some(reflection) = &o.reflection {
                    reflection.write(line);
                }
                o.line.write(line);
            }
        }
    }
}

impl Validate for Obstacle {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Subgrid(o) => {
                v.nested("transmission", &o.transmission);
                v.nested("reflection", &o.reflection);
                v.nested("reflection_type", &o.reflection_type);
                v.nested("freeboard", &o.freeboard);
                v.nested("line", &o.line);

                let trcoef = o.transmission.as_ref().and_then(Transmission::constant);
                let reflc = o.reflection.as_ref().and_then(|r| r.reflc);
                if let (Some(t), Some(r)) = (trcoef, reflc) {
                    v.rule(
                        r * r + t * t <= 1.0,
                        "reflection.reflc",
                        "reflc^2 + trcoef^2 must not exceed 1",
                    );
                }
                let dam = o.transmission.as_ref().and_then(Transmission::dam_height);
                if let (Some(dam), Some(freeboard)) = (dam, &o.freeboard) {
                    if dam != freeboard.hgt {
                        tracing::warn!(dam, freeboard = freeboard.hgt, "hgt differs between DAM and FREEBOARD");
                    }
                }
            }
            Self::Fig(o) => {
                v.min("hss", o.hss, 0.0);
                v.min("tss", o.tss, 0.0);
                v.nested("reflection", &o.reflection);
                v.nested("line", &o.line);
            }
        }
    }
}

/// Obstacles, one command each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Obstacles {
    pub obstacles: Vec<Obstacle>,
}

tagged_struct!(Obstacles, "obstacles");

impl Component for Obstacles {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        Ok(self
            .obstacles
            .iter()
            .map(|obstacle| {
                let mut line = TokenLine::default();
                obstacle.write(&mut line);
                line
            })
            .collect())
    }
}

impl Validate for Obstacles {
    fn validate(&self, v: &mut Validator) {
        v.each("obstacles", &self.obstacles);
    }
}

// ============================================================================
// OFF
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicsOff {
    Windgrowth,
    Quadrupl,
    Wcapping,
    Breaking,
    Refrac,
    Fshift,
    Bndchk,
}

impl PhysicsOff {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Windgrowth => "WINDGROWTH",
            Self::Quadrupl => "QUADRUPL",
            Self::Wcapping => "WCAPPING",
            Self::Breaking => "BREAKING",
            Self::Refrac => "REFRAC",
            Self::Fshift => "FSHIFT",
            Self::Bndchk => "BNDCHK",
        }
    }
}

/// Switch off one default physical process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Off {
    pub physics: PhysicsOff,
}

tagged_struct!(Off, "off");

impl Off {
    pub fn write(&self, line: &mut TokenLine) {
        line.word("OFF").word(self.physics.keyword());
    }
}

/// Several OFF switches, one command each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Offs {
    pub offs: Vec<Off>,
}

tagged_struct!(Offs, "offs");

impl Offs {
    pub fn switches_off(&self, process: PhysicsOff) -> bool {
        self.offs.iter().any(|o| o.physics == process)
    }
}

impl Component for Offs {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        Ok(self
            .offs
            .iter()
            .map(|off| {
                let mut line = TokenLine::default();
                off.write(&mut line);
                line
            })
            .collect())
    }
}

impl Validate for Offs {
    fn validate(&self, _v: &mut Validator) {
        for (i, off) in self.offs.iter().enumerate() {
            let duplicate = self.offs[..i].iter().any(|o| o.physics == off.physics);
            if duplicate {
                tracing::warn!(process = off.physics.keyword(), "process switched off twice");
            }
        }
    }
}

single_line!(
    Gen, Sswell, Negatinp, Wcapping, Quadrupl, Breaking, Friction, Triad, Vegetation, Mud,
    Sice, Turbulence, Bragg, Limiter, Setup, Diffraction, Surfbeat, Scat, Obstacle, Off,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::validate::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render<T: Component>(component: &T) -> String {
        component.render().unwrap()
    }

    #[test]
    fn test_gen3_default_source_terms() {
        let gen: Gen = build(json!({"model_type": "gen3"})).unwrap();
        assert_eq!(render(&gen), "GEN3 WESTHUYSEN DRAG WU");
    }

    #[test]
    fn test_gen2_coefficient_order() {
        let gen: Gen = build(json!({"model_type": "GEN2", "cf60": 0.1, "cf10": 188.0})).unwrap();
        assert_eq!(render(&gen), "GEN2 cf10=188.0 cf60=0.1");
    }

    #[test]
    fn test_gen_requires_discriminator() {
        let err = build::<Gen>(json!({"cf10": 188.0})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDiscriminator { .. }));
    }

    #[test]
    fn test_quadrupl_lambda_keyword() {
        let q: Quadrupl = build(json!({"iquad": 2, "lambd": 0.25})).unwrap();
        assert_eq!(render(&q), "QUADRUPL iquad=2 lambda=0.25");
        assert!(build::<Quadrupl>(json!({"iquad": 5})).is_err());
    }

    #[test]
    fn test_negatinp_range() {
        let err = build::<Negatinp>(json!({"model_type": "negatinp", "rdcoef": 1.5})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "rdcoef");
    }

    #[test]
    fn test_wcapping_ab_current() {
        let w: Wcapping = build(json!({"model_type": "ab", "cds2": 5e-5, "current": true, "cds3": 0.8})).unwrap();
        assert_eq!(render(&w), "WCAPPING AB cds2=5e-05 CURRENT cds3=0.8");
        let err = build::<Wcapping>(json!({"model_type": "ab", "cds3": 0.8})).unwrap_err();
        assert_eq!(err.field_errors()[0].constraint, "'cds3' requires 'current'");
    }

    #[test]
    fn test_friction_variants() {
        let f: Friction = build(json!({"model_type": "jonswap", "cfjon": 0.038})).unwrap();
        assert_eq!(render(&f), "FRICTION JONSWAP CONSTANT cfjon=0.038");
        let f: Friction = build(json!({"model_type": "ripples", "s": 2.65, "d": 0.0001})).unwrap();
        assert_eq!(render(&f), "FRICTION RIPPLES S=2.65 D=0.0001");
    }

    #[test]
    fn test_friction_rejects_sibling_parameter() {
        let err = build::<Friction>(json!({"model_type": "collins", "kn": 0.05})).unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedField { ref field, .. } if field == "kn"));
    }

    #[test]
    fn test_triad_dcta_with_biphase() {
        let t: Triad = build(json!({
            "model_type": "dcta",
            "trfac": 4.4,
            "p": 1.3,
            "biphase": {"model_type": "eldeberky", "urcrit": 0.63}
        }))
        .unwrap();
        assert_eq!(render(&t), "TRIAD DCTA trfac=4.4 p=1.3 COLL BIPHASE ELDEBERKY urcrit=0.63");
    }

    #[test]
    fn test_triad_legacy_default() {
        let t: Triad = build(json!({"itriad": 1, "trfac": 0.8, "cutfr": 2.5})).unwrap();
        assert_eq!(render(&t), "TRIAD itriad=1 trfac=0.8 cutfr=2.5");
    }

    #[test]
    fn test_vegetation_layers() {
        let veg: Vegetation = build(json!({
            "height": [1.2, 0.8],
            "diamtr": [0.01, 0.02],
            "drag": [1.0, 1.0],
            "nstems": [100, 200]
        }))
        .unwrap();
        assert_eq!(
            render(&veg),
            "VEGETATION iveg=1 height=1.2 diamtr=0.01 nstems=100 drag=1.0 height=0.8 diamtr=0.02 nstems=200 drag=1.0"
        );
    }

    #[test]
    fn test_vegetation_scalar_is_one_layer() {
        let veg: Vegetation = build(json!({"height": 1.2, "diamtr": 0.01, "drag": 2.0})).unwrap();
        assert_eq!(veg.layers(), 1);
        assert_eq!(render(&veg), "VEGETATION iveg=1 height=1.2 diamtr=0.01 nstems=1 drag=2.0");
    }

    #[test]
    fn test_vegetation_layer_mismatch() {
        let err = build::<Vegetation>(json!({
            "height": [1.2, 0.8], "diamtr": 0.01, "drag": [1.0, 1.0]
        }))
        .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "nstems");
    }

    #[test]
    fn test_sice_model_keyword_after_aice() {
        let s: Sice = build(json!({"model_type": "r21b", "aice": 0.5, "chf": 0.1, "npf": 3.0})).unwrap();
        assert_eq!(render(&s), "SICE aice=0.5 R21B chf=0.1 npf=3.0");
        let s: Sice = build(json!({})).unwrap();
        assert_eq!(render(&s), "SICE");
    }

    #[test]
    fn test_turbulence_tbcur_needs_current() {
        let t: Turbulence = build(json!({"ctb": 0.01, "tbcur": 0.004})).unwrap();
        assert_eq!(render(&t), "TURBULENCE ctb=0.01 CURRENT tbcur=0.004");
        let err = build::<Turbulence>(json!({"current": false, "tbcur": 0.004})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "tbcur");
    }

    #[test]
    fn test_bragg_file() {
        let b: Bragg = build(json!({
            "model_type": "file", "nreg": 200, "fname": "bottom.txt", "mkx": 100, "dkx": 0.1
        }))
        .unwrap();
        assert_eq!(
            render(&b),
            "BRAGG nreg=200 FILE fname='bottom.txt' mkx=100 dkx=0.1"
        );
        let b: Bragg = build(json!({"model_type": "ft", "ibrag": 2, "nreg": 50})).unwrap();
        assert_eq!(render(&b), "BRAGG ibrag=2 nreg=50 FT");
    }

    #[test]
    fn test_diffraction_flag_as_integer() {
        let d: Diffraction = build(json!({"idiffr": true, "smpar": 0.0})).unwrap();
        assert_eq!(render(&d), "DIFFRACTION idiffr=1 smpar=0.0");
    }

    #[test]
    fn test_surfbeat_and_scat() {
        let s: Surfbeat = build(json!({"df": 0.01, "nmax": 50000, "spacing": "logarithmic"})).unwrap();
        assert_eq!(render(&s), "SURFBEAT df=0.01 nmax=50000 LOGARITHMIC");
        let s: Scat = build(json!({"iqcm": 2, "rfac": 1.0, "alpha": 1.0})).unwrap();
        assert_eq!(render(&s), "SCAT iqcm=2 GRID rfac=1.0 TRUNC alpha=1.0");
        assert!(build::<Scat>(json!({"rfac": 0.5})).is_err());
    }

    #[test]
    fn test_offs_one_line_each() {
        let offs: Offs = build(json!({
            "offs": [{"physics": "windgrowth"}, {"model_type": "off", "physics": "bndchk"}]
        }))
        .unwrap();
        assert_eq!(render(&offs), "OFF WINDGROWTH\nOFF BNDCHK");
        assert!(offs.switches_off(PhysicsOff::Bndchk));
    }

    fn line() -> serde_json::Value {
        json!({"xp": [174.1, 174.2, 174.3], "yp": [-39.1, -39.1, -39.1]})
    }

    #[test]
    fn test_obstacle_transmission_and_reflection() {
        let o: Obstacle = build(json!({
            "model_type": "obstacle",
            "transmission": {"model_type": "transm", "trcoef": 0.5},
            "reflection": {"reflc": 0.5},
            "reflection_type": {"model_type": "rspec"},
            "line": line()
        }))
        .unwrap();
        assert_eq!(
            render(&o),
            "OBSTACLE TRANSM trcoef=0.5 REFL reflc=0.5 RSPEC LINE 174.1 -39.1 174.2 -39.1 174.3 -39.1"
        );
    }

    #[test]
    fn test_obstacle_trans2d_rows_on_own_lines() {
        let o: Obstacle = build(json!({
            "model_type": "obstacle",
            "transmission": {"model_type": "trans2d", "trcoef": [[0.0, 0.1], [0.2, 0.3]]},
            "reflection": {},
            "line": {"xp": [0.0, 1.0], "yp": [0.0, 1.0]}
        }))
        .unwrap();
        assert_eq!(
            render(&o),
            "OBSTACLE TRANS2D &\n    0.0 0.1 &\n    0.2 0.3 &\n    REFL LINE 0.0 0.0 1.0 1.0"
        );
    }

    #[test]
    fn test_obstacles_one_line_each() {
        let obstacles: Obstacles = build(json!({
            "obstacles": [
                {"model_type": "obstacle", "reflection": {"reflc": 1.0}, "line": line()},
                {
                    "model_type": "obstacle",
                    "transmission": {"model_type": "transm"},
                    "line": {"xp": [174.3, 174.3], "yp": [-39.1, -39.2]}
                },
                {"model_type": "fig", "alpha1": 5e-4, "hss": 2.5, "tss": 10.3, "line": line()}
            ]
        }))
        .unwrap();
        assert_eq!(
            render(&obstacles),
            "OBSTACLE REFL reflc=1.0 LINE 174.1 -39.1 174.2 -39.1 174.3 -39.1\n\
             OBSTACLE TRANSM LINE 174.3 -39.1 174.3 -39.2\n\
             OBSTACLE FIG alpha1=0.0005 hss=2.5 tss=10.3 LINE 174.1 -39.1 174.2 -39.1 174.3 -39.1"
        );
    }

    #[test]
    fn test_obstacle_energy_balance() {
        let err = build::<Obstacles>(json!({
            "obstacles": [{
                "model_type": "obstacle",
                "transmission": {"model_type": "transm", "trcoef": 0.8},
                "reflection": {"reflc": 0.8},
                "line": line()
            }]
        }))
        .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "obstacles[0].reflection.reflc");
    }

    #[test]
    fn test_fig_obstacle_checks() {
        let err = build::<Obstacle>(json!({
            "model_type": "fig", "alpha1": 5e-4, "hss": -1.0, "tss": 10.3,
            "line": {"xp": [0.0], "yp": [0.0]}
        }))
        .unwrap_err();
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["hss", "line.xp", "line.yp"]);

        let err = build::<Obstacle>(json!({"model_type": "fig", "hss": 1.0, "tss": 10.0, "line": line()}))
            .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "alpha1");
    }
}
