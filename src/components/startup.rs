//! PROJECT, SET, MODE and COORDINATES

use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::Result;
use crate::render::TokenLine;
use crate::subcomponents::startup::CoordinateSystem;
use crate::tagged_struct;
use crate::validate::{Validate, Validator};

/// Run identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Project {
    #[serde(default)]
    pub name: Option<String>,
    pub nr: String,
    #[serde(default)]
    pub title1: Option<String>,
    #[serde(default)]
    pub title2: Option<String>,
    #[serde(default)]
    pub title3: Option<String>,
}

tagged_struct!(Project, "project");

impl Component for Project {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("PROJECT");
        line.quoted_opt("name", self.name.as_deref())
            .quoted("nr", &self.nr)
            .quoted_opt("title1", self.title1.as_deref())
            .quoted_opt("title2", self.title2.as_deref())
            .quoted_opt("title3", self.title3.as_deref());
        Ok(vec![line])
    }
}

impl Validate for Project {
    fn validate(&self, v: &mut Validator) {
        v.max_len("name", self.name.as_deref(), 16);
        v.max_len("nr", Some(&self.nr), 4);
        v.max_len("title1", self.title1.as_deref(), 72);
        v.max_len("title2", self.title2.as_deref(), 72);
        v.max_len("title3", self.title3.as_deref(), 72);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionConvention {
    Nautical,
    Cartesian,
}

/// Global parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Set {
    #[serde(default)]
    pub level: Option<f64>,
    /// Direction of North with respect to the x-axis
    #[serde(default)]
    pub nor: Option<f64>,
    #[serde(default)]
    pub depmin: Option<f64>,
    #[serde(default)]
    pub maxmes: Option<u32>,
    #[serde(default)]
    pub maxerr: Option<u8>,
    #[serde(default)]
    pub grav: Option<f64>,
    #[serde(default)]
    pub rho: Option<f64>,
    #[serde(default)]
    pub cdcap: Option<f64>,
    #[serde(default)]
    pub inrhog: Option<u8>,
    #[serde(default)]
    pub hsrerr: Option<f64>,
    pub direction_convention: DirectionConvention,
    #[serde(default)]
    pub pwtail: Option<u32>,
    #[serde(default)]
    pub froudmax: Option<f64>,
    #[serde(default)]
    pub icewind: Option<u8>,
}

tagged_struct!(Set, "set");

impl Component for Set {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("SET");
        line.kv_opt("level", self.level)
            .kv_opt("nor", self.nor)
            .kv_opt("depmin", self.depmin)
            .kv_opt("maxmes", self.maxmes)
            .kv_opt("maxerr", self.maxerr)
            .kv_opt("grav", self.grav)
            .kv_opt("rho", self.rho)
            .kv_opt("cdcap", self.cdcap)
            .kv_opt("inrhog", self.inrhog)
            .kv_opt("hsrerr", self.hsrerr)
            .word(match self.direction_convention {
                DirectionConvention::Nautical => "NAUTICAL",
                DirectionConvention::Cartesian => "CARTESIAN",
            })
            .kv_opt("pwtail", self.pwtail)
            .kv_opt("froudmax", self.froudmax)
            .kv_opt("icewind", self.icewind);
        Ok(vec![line])
    }
}

impl Validate for Set {
    fn validate(&self, v: &mut Validator) {
        v.range("nor", self.nor, -360.0, 360.0);
        v.min("depmin", self.depmin, 0.0);
        v.one_of("maxerr", self.maxerr, &[1, 2, 3]);
        v.min("grav", self.grav, 0.0);
        v.min("rho", self.rho, 0.0);
        v.min("cdcap", self.cdcap, 0.0);
        v.one_of("inrhog", self.inrhog, &[0, 1]);
        v.min("hsrerr", self.hsrerr, 0.0);
        v.min("froudmax", self.froudmax, 0.0);
        v.one_of("icewind", self.icewind, &[0, 1]);
        if self.pwtail.is_some() {
            tracing::warn!("pwtail only has effect if set after the GEN command");
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Stationary,
    Nonstationary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Onedimensional,
    #[default]
    Twodimensional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Mode {
    #[serde(default)]
    pub kind: ModeKind,
    #[serde(default)]
    pub dim: Dimension,
}

tagged_struct!(Mode, "mode");

impl Component for Mode {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("MODE");
        line.word(match self.kind {
            ModeKind::Stationary => "STATIONARY",
            ModeKind::Nonstationary => "NONSTATIONARY",
        })
        .word(match self.dim {
            Dimension::Onedimensional => "ONEDIMENSIONAL",
            Dimension::Twodimensional => "TWODIMENSIONAL",
        });
        Ok(vec![line])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Coordinates {
    #[serde(default)]
    pub kind: CoordinateSystem,
    /// Periodic in x; only with a regular spherical grid covering 360 degrees
    #[serde(default)]
    pub repeating: bool,
}

tagged_struct!(Coordinates, "coordinates");

impl Validate for Mode {
    fn validate(&self, _: &mut Validator) {}
}

impl Validate for Coordinates {
    fn validate(&self, _: &mut Validator) {}
}

impl Component for Coordinates {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        let mut line = TokenLine::new("COORDINATES");
        self.kind.write(&mut line);
        line.word_if(self.repeating, "REPEATING");
        Ok(vec![line])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::validate::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_project() {
        let p: Project = build(json!({"model_type": "project", "name": "waves", "nr": "01", "title1": "Test run"}))
            .unwrap();
        assert_eq!(
            p.render().unwrap(),
            "PROJECT name='waves' nr='01' title1='Test run'"
        );
    }

    #[test]
    fn test_project_lengths() {
        let err = build::<Project>(json!({"name": "a-name-longer-than-sixteen", "nr": "00001"})).unwrap_err();
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "nr"]);
    }

    #[test]
    fn test_set_requires_direction_convention() {
        let err = build::<Set>(json!({"level": 0.5})).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e[0].path == "direction_convention"));
    }

    #[test]
    fn test_set() {
        let s: Set = build(json!({"level": 0.5, "maxerr": 2, "direction_convention": "nautical"})).unwrap();
        assert_eq!(s.render().unwrap(), "SET level=0.5 maxerr=2 NAUTICAL");
        assert!(build::<Set>(json!({"maxerr": 4, "direction_convention": "nautical"})).is_err());
    }

    #[test]
    fn test_mode_defaults() {
        let m: Mode = build(json!({})).unwrap();
        assert_eq!(m.render().unwrap(), "MODE STATIONARY TWODIMENSIONAL");
    }

    #[test]
    fn test_coordinates_repeating() {
        let c: Coordinates = crate::tagged::from_value(json!({
            "kind": {"model_type": "spherical"},
            "repeating": true
        }))
        .unwrap();
        assert_eq!(c.render().unwrap(), "COORDINATES SPHERICAL CCM REPEATING");
    }
}
