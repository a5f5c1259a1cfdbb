//! Coordinate-system options for the COORDINATES command

use serde::{Deserialize, Serialize};

use crate::render::TokenLine;
use crate::tagged_union;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cartesian {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Central conformal Mercator
    #[default]
    Ccm,
    /// Quasi-cartesian
    Qc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spherical {
    #[serde(default)]
    pub projection: Projection,
}

tagged_union! {
    pub enum CoordinateSystem default "cartesian" {
        "cartesian" => Cartesian(Cartesian),
        "spherical" => Spherical(Spherical),
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::Cartesian(Cartesian {})
    }
}

impl CoordinateSystem {
    pub fn is_spherical(&self) -> bool {
        matches!(self, Self::Spherical(_))
    }

    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Cartesian(_) => {
                line.word("CARTESIAN");
            }
            Self::Spherical(s) => {
                line.word("SPHERICAL").word(match s.projection {
                    Projection::Ccm => "CCM",
                    Projection::Qc => "QC",
                });
            }
        }
    }
}
