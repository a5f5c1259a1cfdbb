//! Output quantities, spectral output options and output-location names

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::render::TokenLine;
use crate::tagged_union;
use crate::validate::Validator;

/// Reserved location names; user locations may not start with these.
pub const SPECIAL_NAMES: &[&str] = &["BOTTGRID", "COMPGRID", "BOUNDARY", "BOUND_"];

/// Special names a write command may target without a location command
pub const WRITE_SPECIAL_NAMES: &[&str] = &["BOTTGRID", "COMPGRID"];

pub fn is_special(sname: &str) -> bool {
    let upper = sname.to_ascii_uppercase();
    SPECIAL_NAMES.iter().any(|name| upper.starts_with(name))
}

/// Length and reserved-prefix checks for a location name.
pub fn check_location_name(v: &mut Validator, field: &str, sname: &str, max: usize) {
    v.max_len(field, Some(sname), max);
    v.check(
        !is_special(sname),
        field,
        format!("'{sname}'"),
        "is a reserved name",
    );
}

/// Quantities that can be written by BLOCK, TABLE and QUANTITY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputQuantity {
    Hsign,
    Hswell,
    Dir,
    Pdir,
    Tdir,
    Tm01,
    Rtm01,
    Rtp,
    Tps,
    Per,
    Rper,
    Tmm10,
    Rtmm10,
    Tm02,
    Fspr,
    Dspr,
    Qp,
    Depth,
    Botlev,
    Watlev,
    Vel,
    Frcoef,
    Wind,
    Dissip,
    Qb,
    Transp,
    Force,
    Ubot,
    Urms,
    Tmbot,
    Wlen,
    Steepness,
    Dhsign,
    Drtm01,
    Leak,
    Time,
    Tsec,
    Xp,
    Yp,
    Dist,
    Setup,
    Aice,
    Hice,
}

impl fmt::Display for OutputQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_ascii_uppercase))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// Write quantities inline when there is one, one per line otherwise.
pub fn write_quantities(line: &mut TokenLine, quantities: &[OutputQuantity]) {
    let multi = quantities.len() > 1;
    for q in quantities {
        if multi {
            line.brk();
        }
        line.word(q.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spec1d {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spec2d {}

tagged_union! {
    /// Frequency-only or full directional spectra
    pub enum SpecDim {
        "spec1d" => Spec1d(Spec1d),
        "spec2d" => Spec2d(Spec2d),
    }
}

impl SpecDim {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Spec1d(_) => "SPEC1D",
            Self::Spec2d(_) => "SPEC2D",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Abs {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rel {}

tagged_union! {
    /// Absolute or relative frequencies
    pub enum SpecFreq {
        "abs" => Abs(Abs),
        "rel" => Rel(Rel),
    }
}

impl SpecFreq {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Abs(_) => "ABS",
            Self::Rel(_) => "REL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::wrap;

    #[test]
    fn test_special_names() {
        assert!(is_special("compgrid"));
        assert!(is_special("BOUND_01"));
        assert!(!is_special("outpts"));
    }

    #[test]
    fn test_quantity_layout() {
        let mut line = TokenLine::new("BLOCK");
        write_quantities(&mut line, &[OutputQuantity::Hsign]);
        assert_eq!(wrap(&line), "BLOCK HSIGN");

        let mut line = TokenLine::new("BLOCK");
        write_quantities(&mut line, &[OutputQuantity::Hsign, OutputQuantity::Tps]);
        assert_eq!(wrap(&line), "BLOCK &\n    HSIGN &\n    TPS");
    }
}
