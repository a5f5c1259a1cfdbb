//! Propagation schemes and NUMERIC sub-settings

use serde::{Deserialize, Serialize};

use super::keyword_params;
use super::time::Delt;
use crate::render::TokenLine;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

// ============================================================================
// Propagation schemes
// ============================================================================

/// First-order backward space, backward time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bsbt {}

/// Garden-sprinkler effect counteraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gse {
    #[serde(default)]
    pub waveage: Option<Delt>,
}

tagged_union! {
    pub enum Scheme {
        "bsbt" => Bsbt(Bsbt),
        "gse" => Gse(Gse),
    }
}

impl Scheme {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Bsbt(_) => {
                line.word("BSBT");
            }
            Self::Gse(g) => {
                line.word("GSE");
                if let Some(waveage) = &g.waveage {
                    line.word(format!("waveage={}", waveage.literal()));
                }
            }
        }
    }
}

impl Validate for Scheme {
    fn validate(&self, v: &mut Validator) {
        if let Self::Gse(g) = self {
            v.nested("waveage", &g.waveage);
        }
    }
}

// ============================================================================
// Stopping criteria
// ============================================================================

keyword_params!(
    /// Iteration limits of a stationary run
    pub struct Stat ["STATIONARY"] { mxitst: u32, alfa: f64 }
);

keyword_params!(
    pub struct Nonstat ["NONSTATIONARY"] { mxitns: u32 }
);

tagged_union! {
    pub enum StopMode {
        "stat" => Stat(Stat),
        "nonstat" => Nonstat(Nonstat),
    }
}

impl StopMode {
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Stat(m) => m.write(line),
            Self::Nonstat(m) => m.write(line),
        }
    }
}

/// Curvature-based stopping criterion of Zijlema and Van der Westhuysen (2005)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stopc {
    #[serde(default)]
    pub dabs: Option<f64>,
    #[serde(default)]
    pub drel: Option<f64>,
    #[serde(default)]
    pub curvat: Option<f64>,
    #[serde(default)]
    pub npnts: Option<f64>,
    #[serde(default)]
    pub mode: Option<StopMode>,
    #[serde(default)]
    pub limiter: Option<f64>,
}

/// Older accuracy criterion kept for backward compatibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Accur {
    #[serde(default)]
    pub drel: Option<f64>,
    #[serde(default)]
    pub dhoval: Option<f64>,
    #[serde(default)]
    pub dtoval: Option<f64>,
    #[serde(default)]
    pub npnts: Option<f64>,
    #[serde(default)]
    pub mode: Option<StopMode>,
    #[serde(default)]
    pub limiter: Option<f64>,
}

tagged_union! {
    pub enum Stop {
        "stopc" => Stopc(Stopc),
        "accur" => Accur(Accur),
    }
}

impl Stop {
    pub fn write(&self, line: &mut TokenLine) {
        let (npnts, mode, limiter) = match self {
            Self::Stopc(s) => {
                line.word("STOPC")
                    .kv_opt("dabs", s.dabs)
                    .kv_opt("drel", s.drel)
                    .kv_opt("curvat", s.curvat);
                (s.npnts, &s.mode, s.limiter)
            }
            Self::Accur(s) => {
                line.word("ACCUR")
                    .kv_opt("drel", s.drel)
                    .kv_opt("dhoval", s.dhoval)
                    .kv_opt("dtoval", s.dtoval);
                (s.npnts, &s.mode, s.limiter)
            }
        };
        line.kv_opt("npnts", npnts);
        if let Some(mode) = mode {
            mode.write(line);
        }
        line.kv_opt("limiter", limiter);
    }
}

impl Validate for Stop {
    fn validate(&self, v: &mut Validator) {
        let npnts = match self {
            Self::Stopc(s) => {
                v.positive("dabs", s.dabs);
                v.positive("drel", s.drel);
                s.npnts
            }
            Self::Accur(s) => {
                v.positive("drel", s.drel);
                s.npnts
            }
        };
        v.range("npnts", npnts, 0.0, 100.0);
    }
}

// ============================================================================
// Implicitness and CFL settings
// ============================================================================

keyword_params!(
    /// Numerical diffusion of the implicit directional scheme
    tagged "dirimpl" pub struct Dirimpl ["DIRIMPL"] { cdd: f64 }
);

keyword_params!(
    /// Implicit scheme in frequency space
    tagged "sigimpl" pub struct Sigimpl ["SIGIMPL"] { css: f64, eps2: f64, outp: u8, niter: u32 }
);

keyword_params!(
    /// Directional CFL limiter
    tagged "ctheta" pub struct Ctheta ["CTHETA"] { cfl: f64 }
);

keyword_params!(
    /// Frequency CFL limiter
    tagged "csigma" pub struct Csigma ["CSIGMA"] { cfl: f64 }
);

keyword_params!(
    /// Solver settings of the wave-induced setup
    tagged "setup" pub struct SetupSolver ["SETUP"] { eps2: f64, outp: u8, niter: u32 }
);

impl Validate for Sigimpl {
    fn validate(&self, v: &mut Validator) {
        v.one_of("outp", self.outp, &[0, 1, 2, 3]);
        v.positive("eps2", self.eps2);
    }
}

impl Validate for SetupSolver {
    fn validate(&self, v: &mut Validator) {
        v.one_of("outp", self.outp, &[0, 1, 2, 3]);
        v.positive("eps2", self.eps2);
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
    fn test_stopc_with_mode() {
        let stop: Stop = build(json!({
            "model_type": "stopc",
            "dabs": 0.005, "drel": 0.01, "curvat": 0.005, "npnts": 99.5,
            "mode": {"model_type": "nonstat", "mxitns": 3},
            "limiter": 0.01
        }))
        .unwrap();
        let mut line = TokenLine::new("NUMERIC");
        stop.write(&mut line);
        assert_eq!(
            wrap(&line),
            "NUMERIC STOPC dabs=0.005 drel=0.01 curvat=0.005 npnts=99.5 NONSTATIONARY mxitns=3 limiter=0.01"
        );
    }

    #[test]
    fn test_npnts_is_a_percentage() {
        let err = build::<Stop>(json!({"model_type": "accur", "npnts": 120.0})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "npnts");
    }

    #[test]
    fn test_gse_waveage() {
        let scheme: Scheme =
            build(json!({"model_type": "gse", "waveage": {"delt": "PT12H", "dfmt": "hr"}})).unwrap();
        let mut line = TokenLine::new("PROP");
        scheme.write(&mut line);
        assert_eq!(wrap(&line), "PROP GSE waveage=12.0 HR");
    }

    #[test]
    fn test_keyword_params_accept_own_tag() {
        let s: Sigimpl = build(json!({"model_type": "sigimpl", "css": 0.5, "niter": 20})).unwrap();
        let mut line = TokenLine::default();
        s.write(&mut line);
        assert_eq!(wrap(&line), "SIGIMPL css=0.5 niter=20");
        assert!(build::<Sigimpl>(json!({"outp": 4})).is_err());
    }
}
