//! Point lists shared by segment, curve and boundary commands

use serde::{Deserialize, Serialize};

use crate::render::TokenLine;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

/// Problem coordinates, written one point per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Xy {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Xy {
    pub fn size(&self) -> usize {
        self.x.len()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn write(&self, line: &mut TokenLine) {
        for (x, y) in self.points() {
            line.brk().word(format!("{x:.8}")).word(format!("{y:.8}"));
        }
        line.brk();
    }
}

impl Validate for Xy {
    fn validate(&self, v: &mut Validator) {
        v.rule(
            self.x.len() == self.y.len(),
            "y",
            "x and y must be the same size",
        );
    }
}

/// Computational grid indices, written one point per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ij {
    pub i: Vec<u32>,
    pub j: Vec<u32>,
}

impl Ij {
    pub fn size(&self) -> usize {
        self.i.len()
    }

    pub fn write(&self, line: &mut TokenLine) {
        for (i, j) in self.i.iter().zip(&self.j) {
            line.brk().kv("i", i).kv("j", j);
        }
        line.brk();
    }
}

impl Validate for Ij {
    fn validate(&self, v: &mut Validator) {
        v.rule(
            self.i.len() == self.j.len(),
            "j",
            "i and j must be the same size",
        );
    }
}

tagged_union! {
    /// Segment vertices given as coordinates or grid indices
    pub enum Points {
        "xy" => Xy(Xy),
        "ij" => Ij(Ij),
    }
}

impl Points {
    pub fn size(&self) -> usize {
        match self {
            Self::Xy(p) => p.size(),
            Self::Ij(p) => p.size(),
        }
    }

    /// `XY` or `IJ` followed by the point rows
    pub fn write(&self, line: &mut TokenLine) {
        match self {
            Self::Xy(p) => {
                line.word("XY");
                p.write(line);
            }
            Self::Ij(p) => {
                line.word("IJ");
                p.write(line);
            }
        }
    }
}

impl Validate for Points {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Xy(p) => p.validate(v),
            Self::Ij(p) => p.validate(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::wrap;
    use crate::validate::build;
    use serde_json::json;

    #[test]
    fn test_xy_rows() {
        let points: Points = build(json!({"model_type": "xy", "x": [1.0, 2.0], "y": [3.0, 4.5]})).unwrap();
        let mut line = TokenLine::new("SEGMENT");
        points.write(&mut line);
        line.word("CONSTANT");
        assert_eq!(
            wrap(&line),
            "SEGMENT XY &\n    1.00000000 3.00000000 &\n    2.00000000 4.50000000 &\n    CONSTANT"
        );
    }

    #[test]
    fn test_ij_size_mismatch() {
        let err = build::<Points>(json!({"model_type": "ij", "i": [0, 1], "j": [0]})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "j");
    }
}
