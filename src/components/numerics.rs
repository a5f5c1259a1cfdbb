//! PROP and NUMERIC

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::Result;
use crate::render::TokenLine;
use crate::subcomponents::numerics::{Csigma, Ctheta, Dirimpl, Scheme, SetupSolver, Sigimpl, Stop};
use crate::tagged_struct;
use crate::validate::{Validate, Validator};

/// Propagation scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Prop {
    #[serde(default)]
    pub scheme: Option<Scheme>,
}

tagged_struct!(Prop, "prop");

impl Component for Prop {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("PROP");
        if let Some(scheme) = &self.scheme {
            scheme.write(&mut line);
        }
        Ok(vec![line])
    }
}

impl Validate for Prop {
    fn validate(&self, v: &mut Validator) {
        v.nested("scheme", &self.scheme);
    }
}

/// Solver settings, written as one NUMERIC command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Numeric {
    #[serde(default)]
    pub stop: Option<Stop>,
    #[serde(default)]
    pub dirimpl: Option<Dirimpl>,
    #[serde(default)]
    pub sigimpl: Option<Sigimpl>,
    #[serde(default)]
    pub ctheta: Option<Ctheta>,
    #[serde(default)]
    pub csigma: Option<Csigma>,
    #[serde(default)]
    pub setup: Option<SetupSolver>,
}

tagged_struct!(Numeric, "numeric");

impl Component for Numeric {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("NUMERIC");
        if let Some(stop) = &self.stop {
            stop.write(&mut line);
        }
        if let Some(dirimpl) = &self.dirimpl {
            dirimpl.write(&mut line);
        }
        if let Some(sigimpl) = &self.sigimpl {
            sigimpl.write(&mut line);
        }
        if let Some(ctheta) = &self.ctheta {
            ctheta.write(&mut line);
        }
        if let Some(csigma) = &self.csigma {
            csigma.write(&mut line);
        }
        if let Some(setup) = &self.setup {
            setup.write(&mut line);
        }
        Ok(vec![line])
    }
}

impl Validate for Numeric {
    fn validate(&self, v: &mut Validator) {
        v.nested("stop", &self.stop);
        v.nested("sigimpl", &self.sigimpl);
        v.nested("setup", &self.setup);
        if let Some(ctheta) = &self.ctheta {
            v.positive("ctheta.cfl", ctheta.cfl);
        }
        if let Some(csigma) = &self.csigma {
            v.positive("csigma.cfl", csigma.cfl);
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
    fn test_prop_default_is_bare() {
        let prop: Prop = build(json!({})).unwrap();
        assert_eq!(prop.render().unwrap(), "PROP");
    }

    #[test]
    fn test_prop_gse_waveage() {
        let prop: Prop = build(json!({
            "model_type": "prop",
            "scheme": {"model_type": "gse", "waveage": {"delt": 43200, "dfmt": "hr"}}
        }))
        .unwrap();
        assert_eq!(prop.render().unwrap(), "PROP GSE waveage=12.0 HR");
    }

    #[test]
    fn test_numeric_all_settings() {
        let numeric: Numeric = build(json!({
            "stop": {"model_type": "stopc", "dabs": 0.005, "drel": 0.01, "curvat": 0.005, "npnts": 99.5},
            "dirimpl": {"cdd": 0.5},
            "ctheta": {"cfl": 0.9},
            "csigma": {"model_type": "csigma", "cfl": 0.9},
            "setup": {"niter": 100}
        }))
        .unwrap();
        assert_eq!(
            numeric.render().unwrap(),
            "NUMERIC STOPC dabs=0.005 drel=0.01 curvat=0.005 npnts=99.5 DIRIMPL cdd=0.5 CTHETA cfl=0.9 CSIGMA cfl=0.9 SETUP niter=100"
        );
    }

    #[test]
    fn test_numeric_nested_error_path() {
        let err = build::<Numeric>(json!({"sigimpl": {"outp": 7}})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "sigimpl.outp");
    }
}
