//! Boundary adapter: boundary commands from a spectral source
//!
//! The data layer writes one spectra file per boundary piece. This adapter
//! only derives the file names and the commands that read them.

use serde::{Deserialize, Serialize};

use super::{Bindings, SpectralSource, SPECTRAL_DIMS};
use crate::components::boundary::{Boundnest1, Rectangle};
use crate::components::Component;
use crate::error::{ConfigError, Result};
use crate::render::TokenLine;
use crate::subcomponents::base::{Ij, Points, Xy};
use crate::subcomponents::boundary::{BoundaryData, BoundaryLocation, ConstantFile, Segment};
use crate::subcomponents::spectrum::Shapespec;
use crate::tagged_union;
use crate::validate::{Validate, Validator};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestFeed {
    #[serde(default)]
    pub rectangle: Rectangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecFeed {
    #[serde(default)]
    pub shapespec: Shapespec,
    pub location: BoundaryLocation,
}

tagged_union! {
    /// Command the bound spectra are fed through
    pub enum BoundaryFeed default "boundspec" {
        "boundnest1" => Nest(NestFeed),
        "boundspec" => Spec(SpecFeed),
    }
}

/// Boundary resolved from a spectral source when the document is assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryInterface {
    pub kind: BoundaryFeed,
}

/// Commands produced by [`BoundaryInterface::bind`]
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryCommands {
    Nest(Boundnest1),
    /// One shape line shared by all BOUNDSPEC pieces
    Spec {
        shapespec: Shapespec,
        pieces: Vec<(BoundaryLocation, BoundaryData)>,
    },
}

impl Component for BoundaryCommands {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        match self {
            Self::Nest(nest) => nest.cmd(),
            Self::Spec { shapespec, pieces } => {
                let mut lines = vec![shapespec.tokens()];
                for (location, data) in pieces {
                    let mut line = TokenLine::new("BOUNDSPEC");
                    location.write(&mut line);
                    data.write(&mut line);
                    lines.push(line);
                }
                Ok(lines)
            }
        }
    }
}

fn spectra_file(fname: String) -> BoundaryData {
    BoundaryData::ConstantFile(ConstantFile { fname, seq: Some(1) })
}

/// Split a multi-point location into consecutive two-point segments.
fn segments(location: &BoundaryLocation) -> Vec<BoundaryLocation> {
    let pair = |points: Points| BoundaryLocation::Segment(Segment { points });
    match location {
        BoundaryLocation::Side(_) => vec![location.clone()],
        BoundaryLocation::Points(xy) | BoundaryLocation::Segment(Segment { points: Points::Xy(xy) }) => xy
            .x
            .windows(2)
            .zip(xy.y.windows(2))
            .map(|(x, y)| pair(Points::Xy(Xy { x: x.to_vec(), y: y.to_vec() })))
            .collect(),
        BoundaryLocation::Segment(Segment { points: Points::Ij(ij) }) => ij
            .i
            .windows(2)
            .zip(ij.j.windows(2))
            .map(|(i, j)| pair(Points::Ij(Ij { i: i.to_vec(), j: j.to_vec() })))
            .collect(),
    }
}

fn check_shape(spectra: &dyn SpectralSource, location: Option<&BoundaryLocation>) -> Result<()> {
    let dims = spectra.dims();
    let missing: Vec<&str> = SPECTRAL_DIMS
        .iter()
        .copied()
        .filter(|d| !dims.iter().any(|have| have == d))
        .collect();
    let shape_error = |reason: String| ConfigError::IncompatibleSpectralShape {
        path: "spectra".into(),
        source_id: spectra.id().to_string(),
        reason,
    };
    if !missing.is_empty() {
        return Err(shape_error(format!(
            "lacks dimension(s) [{}], has [{}]",
            missing.join(", "),
            dims.join(", ")
        )));
    }
    if spectra.sites() == 0 {
        return Err(shape_error("has no sites".into()));
    }
    if let Some(points) = location.and_then(BoundaryLocation::size) {
        if points != spectra.sites() {
            return Err(shape_error(format!(
                "has {} sites but the location has {points} points",
                spectra.sites()
            )));
        }
    }
    Ok(())
}

impl BoundaryInterface {
    pub fn bind(&self, bindings: &Bindings<'_>) -> Result<BoundaryCommands> {
        let spectra = bindings.require_spectra("spectra")?;
        let id = spectra.id();
        match &self.kind {
            BoundaryFeed::Nest(feed) => {
                check_shape(spectra, None)?;
                let fname = format!("{id}.bnd");
                tracing::debug!(fname = %fname, "bound nested boundary");
                Ok(BoundaryCommands::Nest(Boundnest1 {
                    fname,
                    rectangle: feed.rectangle,
                }))
            }
            BoundaryFeed::Spec(feed) => {
                check_shape(spectra, Some(&feed.location))?;
                let pieces: Vec<_> = match &feed.location {
                    BoundaryLocation::Side(side) => {
                        let name = side.side.keyword().to_ascii_lowercase();
                        vec![(feed.location.clone(), spectra_file(format!("{id}_spec2d_{name}.bnd")))]
                    }
                    location => segments(location)
                        .into_iter()
                        .enumerate()
                        .map(|(k, segment)| (segment, spectra_file(format!("{id}_spec2d_{k:03}.bnd"))))
                        .collect(),
                };
                tracing::debug!(source = id, pieces = pieces.len(), "bound spectral boundary");
                Ok(BoundaryCommands::Spec {
                    shapespec: feed.shapespec.clone(),
                    pieces,
                })
            }
        }
    }
}

impl Validate for BoundaryInterface {
    fn validate(&self, v: &mut Validator) {
        if let BoundaryFeed::Spec(feed) = &self.kind {
            v.nested("kind.shapespec", &feed.shapespec);
            v.nested("kind.location", &feed.location);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::fixtures::Spectra;
    use super::*;
    use crate::validate::build;

    fn spectra(sites: usize) -> Spectra {
        Spectra {
            dims: vec!["site", "freq", "dir"],
            sites,
        }
    }

    #[test]
    fn test_nest_feed() {
        let iface: BoundaryInterface =
            build(json!({"kind": {"model_type": "boundnest1", "rectangle": "open"}})).unwrap();
        let spectra = spectra(4);
        let cmds = iface.bind(&Bindings::new().spectra(&spectra)).unwrap();
        assert_eq!(cmds.render().unwrap(), "BOUNDNEST1 NEST fname='ww3.bnd' OPEN");
    }

    #[test]
    fn test_side_feed() {
        let iface: BoundaryInterface = build(json!({
            "kind": {"location": {"model_type": "side", "side": "west"}}
        }))
        .unwrap();
        let spectra = spectra(1);
        let cmds = iface.bind(&Bindings::new().spectra(&spectra)).unwrap();
        assert_eq!(
            cmds.render().unwrap(),
            "BOUND SHAPESPEC JONSWAP gamma=3.3 PEAK DSPR POWER\n\
             BOUNDSPEC SIDE WEST CCW CONSTANT FILE fname='ww3_spec2d_west.bnd' seq=1"
        );
    }

    #[test]
    fn test_points_feed_one_segment_per_pair() {
        let iface: BoundaryInterface = build(json!({
            "kind": {
                "model_type": "boundspec",
                "location": {"model_type": "points", "x": [110.0, 111.0, 112.0], "y": [-35.0, -35.0, -35.5]}
            }
        }))
        .unwrap();
        let spectra = spectra(3);
        let cmds = iface.bind(&Bindings::new().spectra(&spectra)).unwrap();
        let lines = cmds.cmd().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2].to_string(),
            "BOUNDSPEC SEGMENT XY &\n    111.00000000 -35.00000000 &\n    112.00000000 -35.50000000 &\n    \
             CONSTANT FILE fname='ww3_spec2d_001.bnd' seq=1"
        );
    }

    #[test]
    fn test_site_count_must_match_points() {
        let iface: BoundaryInterface = build(json!({
            "kind": {"location": {"model_type": "points", "x": [0.0, 1.0], "y": [0.0, 0.0]}}
        }))
        .unwrap();
        let spectra = spectra(5);
        let err = iface.bind(&Bindings::new().spectra(&spectra)).unwrap_err();
        assert!(matches!(err, ConfigError::IncompatibleSpectralShape { ref source_id, .. } if source_id == "ww3"));
    }

    #[test]
    fn test_missing_dimension() {
        let iface: BoundaryInterface =
            build(json!({"kind": {"model_type": "boundnest1"}})).unwrap();
        let spectra = Spectra {
            dims: vec!["site", "freq"],
            sites: 2,
        };
        match iface.bind(&Bindings::new().spectra(&spectra)).unwrap_err() {
            ConfigError::IncompatibleSpectralShape { reason, .. } => {
                assert!(reason.contains("[dir]"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_needs_spectra_binding() {
        let iface: BoundaryInterface =
            build(json!({"kind": {"model_type": "boundnest1"}})).unwrap();
        assert!(matches!(
            iface.bind(&Bindings::new()),
            Err(ConfigError::IncompleteCommand { .. })
        ));
    }

    #[test]
    fn test_unknown_location_tag() {
        let err = build::<BoundaryInterface>(json!({
            "kind": {"location": {"model_type": "corner"}}
        }))
        .unwrap_err();
        match err {
            ConfigError::UnknownVariant { expected, .. } => {
                assert_eq!(expected, vec!["side", "segment", "points"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
