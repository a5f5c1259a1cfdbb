//! Groups: ordered aggregates of components emitted together
//!
//! A group owns a fixed slot order. Members render in that order no matter
//! how the input mapping was ordered. STARTUP, PHYSICS and LOCKUP members are
//! written contiguously; INPGRIDS and OUTPUT members are separated by a blank
//! line.

use serde::{Deserialize, Serialize};

use crate::components::inpgrid::InputGrid;
use crate::components::lockup::{Compute, Stop};
use crate::components::output::{
    is_write_special, BlockWrite, Curves, Frame, Group as GroupLocation, Isoline, Nestout, Ngrid,
    OutputOptions, Points, Quantities, Ray, Specout, Table, Test,
};
use crate::components::physics::{
    Bragg, Breaking, Diffraction, Friction, Gen, Limiter, Mud, Negatinp, Obstacles, Offs, Quadrupl,
    Scat, Setup, Sice, Sswell, Surfbeat, Triad, Turbulence, Vegetation, Wcapping,
};
use crate::components::startup::{Coordinates, Mode, Project, Set};
use crate::components::Component;
use crate::error::Result;
use crate::subcomponents::readgrid::GridOption;
use crate::tagged::TaggedUnion;
use crate::tagged_struct;
use crate::validate::{Validate, Validator};

/// A named member of a group
pub type Member<'a> = (String, &'a dyn Component);

pub trait Group {
    /// Whether members are separated by a blank line
    const SPACED: bool;

    /// Present members in emission order, with their slot names.
    fn members(&self) -> Vec<Member<'_>>;

    /// Rendered text of each member. Errors carry the member's slot path.
    fn blocks(&self) -> Result<Vec<String>> {
        self.members()
            .into_iter()
            .map(|(slot, member)| member.render().map_err(|e| e.at(&slot)))
            .collect()
    }

    fn render(&self) -> Result<String> {
        let separator = if Self::SPACED { "\n\n" } else { "\n" };
        Ok(self.blocks()?.join(separator))
    }
}

/// Push `slot` into `members` if it is set.
fn push<'a, T: Component>(members: &mut Vec<Member<'a>>, name: &str, slot: &'a Option<T>) {
    if let Some(component) = slot {
        members.push((name.to_string(), component));
    }
}

// ============================================================================
// STARTUP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Startup {
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub set: Option<Set>,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

tagged_struct!(Startup, "startup");

/// Stationary two-dimensional run in cartesian coordinates
impl Default for Startup {
    fn default() -> Self {
        Self {
            project: None,
            set: None,
            mode: Some(Mode::default()),
            coordinates: Some(Coordinates::default()),
        }
    }
}

impl Group for Startup {
    const SPACED: bool = false;

    fn members(&self) -> Vec<Member<'_>> {
        let mut members = Vec::new();
        push(&mut members, "project", &self.project);
        push(&mut members, "set", &self.set);
        push(&mut members, "mode", &self.mode);
        push(&mut members, "coordinates", &self.coordinates);
        members
    }
}

impl Validate for Startup {
    fn validate(&self, v: &mut Validator) {
        v.nested("project", &self.project);
        v.nested("set", &self.set);
        v.nested("mode", &self.mode);
        v.nested("coordinates", &self.coordinates);
    }
}

// ============================================================================
// INPGRIDS
// ============================================================================

/// Input grids and constant inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Inpgrids {
    pub inpgrids: Vec<InputGrid>,
}

tagged_struct!(Inpgrids, "inpgrids");

impl Inpgrids {
    /// Quantities read from input grid files
    pub fn grid_types(&self) -> Vec<GridOption> {
        self.inpgrids.iter().filter_map(InputGrid::grid_type).collect()
    }

    /// First quantity given both by a constant command and an input grid,
    /// with the constant command's keyword.
    pub fn constant_overlap(&self) -> Option<(&'static str, GridOption)> {
        let grids = self.grid_types();
        self.inpgrids.iter().find_map(|input| {
            let keyword = match input {
                InputGrid::Wind(_) => "WIND",
                InputGrid::Ice(_) => "ICE",
                _ => return None,
            };
            input
                .constant_quantities()
                .iter()
                .find(|q| grids.contains(q))
                .map(|q| (keyword, *q))
        })
    }
}

impl Group for Inpgrids {
    const SPACED: bool = true;

    fn members(&self) -> Vec<Member<'_>> {
        self.inpgrids
            .iter()
            .enumerate()
            .map(|(i, g)| (format!("inpgrids[{i}]"), g as &dyn Component))
            .collect()
    }
}

impl Validate for Inpgrids {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.inpgrids.is_empty(), "inpgrids", "[]", "must have at least one input grid");
        v.each("inpgrids", &self.inpgrids);
        let types = self.grid_types();
        let unique = types.iter().enumerate().all(|(i, t)| !types[..i].contains(t));
        v.rule(unique, "inpgrids", "each input grid type must be unique");
    }
}

// ============================================================================
// PHYSICS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Physics {
    #[serde(default)]
    pub gen: Option<Gen>,
    #[serde(default)]
    pub sswell: Option<Sswell>,
    #[serde(default)]
    pub negatinp: Option<Negatinp>,
    #[serde(default)]
    pub wcapping: Option<Wcapping>,
    #[serde(default)]
    pub quadrupl: Option<Quadrupl>,
    #[serde(default)]
    pub breaking: Option<Breaking>,
    #[serde(default)]
    pub friction: Option<Friction>,
    #[serde(default)]
    pub triad: Option<Triad>,
    #[serde(default)]
    pub vegetation: Option<Vegetation>,
    #[serde(default)]
    pub mud: Option<Mud>,
    #[serde(default)]
    pub sice: Option<Sice>,
    #[serde(default)]
    pub turbulence: Option<Turbulence>,
    #[serde(default)]
    pub bragg: Option<Bragg>,
    #[serde(default)]
    pub limiter: Option<Limiter>,
    #[serde(default)]
    pub obstacle: Option<Obstacles>,
    #[serde(default)]
    pub setup: Option<Setup>,
    #[serde(default)]
    pub diffraction: Option<Diffraction>,
    #[serde(default)]
    pub surfbeat: Option<Surfbeat>,
    #[serde(default)]
    pub scat: Option<Scat>,
    #[serde(default)]
    pub off: Option<Offs>,
}

tagged_struct!(Physics, "physics");

impl Group for Physics {
    const SPACED: bool = false;

    fn members(&self) -> Vec<Member<'_>> {
        let mut m = Vec::new();
        push(&mut m, "gen", &self.gen);
        push(&mut m, "sswell", &self.sswell);
        push(&mut m, "negatinp", &self.negatinp);
        push(&mut m, "wcapping", &self.wcapping);
        push(&mut m, "quadrupl", &self.quadrupl);
        push(&mut m, "breaking", &self.breaking);
        push(&mut m, "friction", &self.friction);
        push(&mut m, "triad", &self.triad);
        push(&mut m, "vegetation", &self.vegetation);
        push(&mut m, "mud", &self.mud);
        push(&mut m, "sice", &self.sice);
        push(&mut m, "turbulence", &self.turbulence);
        push(&mut m, "bragg", &self.bragg);
        push(&mut m, "limiter", &self.limiter);
        push(&mut m, "obstacle", &self.obstacle);
        push(&mut m, "setup", &self.setup);
        push(&mut m, "diffraction", &self.diffraction);
        push(&mut m, "surfbeat", &self.surfbeat);
        push(&mut m, "scat", &self.scat);
        push(&mut m, "off", &self.off);
        m
    }
}

impl Validate for Physics {
    fn validate(&self, v: &mut Validator) {
        v.nested("gen", &self.gen);
        v.nested("sswell", &self.sswell);
        v.nested("negatinp", &self.negatinp);
        v.nested("wcapping", &self.wcapping);
        v.nested("quadrupl", &self.quadrupl);
        v.nested("breaking", &self.breaking);
        v.nested("friction", &self.friction);
        v.nested("triad", &self.triad);
        v.nested("vegetation", &self.vegetation);
        v.nested("mud", &self.mud);
        v.nested("sice", &self.sice);
        v.nested("turbulence", &self.turbulence);
        v.nested("bragg", &self.bragg);
        v.nested("limiter", &self.limiter);
        v.nested("obstacle", &self.obstacle);
        v.nested("setup", &self.setup);
        v.nested("diffraction", &self.diffraction);
        v.nested("surfbeat", &self.surfbeat);
        v.nested("scat", &self.scat);
        v.nested("off", &self.off);

        if self.negatinp.is_some() {
            match &self.sswell {
                None => tracing::warn!("NEGATINP is meant for SSWELL ZIEGER but no SSWELL is set"),
                Some(sswell) if !sswell.is_zieger() => {
                    tracing::warn!(sswell = sswell.tag(), "NEGATINP is meant for SSWELL ZIEGER")
                }
                Some(_) => {}
            }
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Output {
    #[serde(default)]
    pub frame: Option<Frame>,
    #[serde(default)]
    pub group: Option<GroupLocation>,
    #[serde(default)]
    pub curve: Option<Curves>,
    #[serde(default)]
    pub ray: Option<Ray>,
    #[serde(default)]
    pub isoline: Option<Isoline>,
    #[serde(default)]
    pub points: Option<Points>,
    #[serde(default)]
    pub ngrid: Option<Ngrid>,
    #[serde(default)]
    pub quantity: Option<Quantities>,
    #[serde(default)]
    pub output_options: Option<OutputOptions>,
    #[serde(default)]
    pub block: Option<BlockWrite>,
    #[serde(default)]
    pub table: Option<Table>,
    #[serde(default)]
    pub specout: Option<Specout>,
    #[serde(default)]
    pub nestout: Option<Nestout>,
    #[serde(default)]
    pub test: Option<Test>,
}

tagged_struct!(Output, "output");

impl Output {
    /// `(command, sname)` of every location that defines an sname
    pub fn locations(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(frame) = &self.frame {
            out.push(("FRAME", frame.sname.as_str()));
        }
        if let Some(group) = &self.group {
            out.push(("GROUP", group.sname.as_str()));
        }
        if let Some(curves) = &self.curve {
            out.extend(curves.snames().map(|s| ("CURVE", s)));
        }
        if let Some(isoline) = &self.isoline {
            out.push(("ISOLINE", isoline.sname.as_str()));
        }
        if let Some(points) = &self.points {
            out.push(("POINTS", points.sname()));
        }
        if let Some(ngrid) = &self.ngrid {
            out.push(("NGRID", ngrid.sname()));
        }
        out
    }

    /// `(slot, sname)` of every write command
    pub fn writes(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(block) = &self.block {
            out.extend(block.blocks().iter().map(|b| ("block", b.sname.as_str())));
        }
        if let Some(table) = &self.table {
            out.push(("table", table.sname.as_str()));
        }
        if let Some(specout) = &self.specout {
            out.push(("specout", specout.sname.as_str()));
        }
        if let Some(nestout) = &self.nestout {
            out.push(("nestout", nestout.sname.as_str()));
        }
        out
    }

    /// Commands present that need a two-dimensional run
    pub fn two_dimensional_locations(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.frame.is_some() {
            out.push("FRAME");
        }
        if self.group.is_some() {
            out.push("GROUP");
        }
        if self.ray.is_some() {
            out.push("RAY");
        }
        if self.isoline.is_some() {
            out.push("ISOLINE");
        }
        if self.ngrid.is_some() {
            out.push("NGRID");
        }
        out
    }

    fn location_kind(&self, sname: &str) -> Option<&'static str> {
        self.locations()
            .into_iter()
            .find(|(_, s)| *s == sname)
            .map(|(kind, _)| kind)
    }
}

impl Group for Output {
    const SPACED: bool = true;

    fn members(&self) -> Vec<Member<'_>> {
        let mut m = Vec::new();
        push(&mut m, "frame", &self.frame);
        push(&mut m, "group", &self.group);
        push(&mut m, "curve", &self.curve);
        push(&mut m, "ray", &self.ray);
        push(&mut m, "isoline", &self.isoline);
        push(&mut m, "points", &self.points);
        push(&mut m, "ngrid", &self.ngrid);
        push(&mut m, "quantity", &self.quantity);
        push(&mut m, "output_options", &self.output_options);
        push(&mut m, "block", &self.block);
        push(&mut m, "table", &self.table);
        push(&mut m, "specout", &self.specout);
        push(&mut m, "nestout", &self.nestout);
        push(&mut m, "test", &self.test);
        m
    }
}

impl Validate for Output {
    fn validate(&self, v: &mut Validator) {
        v.nested("frame", &self.frame);
        v.nested("group", &self.group);
        v.nested("curve", &self.curve);
        v.nested("ray", &self.ray);
        v.nested("isoline", &self.isoline);
        v.nested("points", &self.points);
        v.nested("ngrid", &self.ngrid);
        v.nested("quantity", &self.quantity);
        v.nested("output_options", &self.output_options);
        v.nested("block", &self.block);
        v.nested("table", &self.table);
        v.nested("specout", &self.specout);
        v.nested("nestout", &self.nestout);
        v.nested("test", &self.test);

        for (slot, sname) in self.writes() {
            if is_write_special(sname) {
                continue;
            }
            match (slot, self.location_kind(sname)) {
                (_, None) => v.rule(
                    false,
                    slot,
                    &format!("sname '{sname}' is not defined by any location command"),
                ),
                ("block", Some(kind)) if kind != "FRAME" && kind != "GROUP" => v.rule(
                    false,
                    slot,
                    &format!("BLOCK sname '{sname}' refers to a {kind}, only FRAME or GROUP are supported"),
                ),
                _ => {}
            }
        }

        let locations = self.locations();
        for (i, (_, sname)) in locations.iter().enumerate() {
            if locations[..i].iter().any(|(_, s)| s == sname) {
                v.rule(false, "", &format!("sname '{sname}' is defined by more than one location"));
            }
        }

        if let Some(isoline) = &self.isoline {
            match &self.ray {
                None => v.rule(
                    false,
                    "isoline",
                    &format!("ISOLINE needs RAY rname '{}' but no RAY is set", isoline.rname),
                ),
                Some(ray) => v.rule(
                    ray.rname == isoline.rname,
                    "isoline.rname",
                    &format!("ISOLINE rname '{}' does not match RAY rname '{}'", isoline.rname, ray.rname),
                ),
            }
        }

        match (&self.ngrid, &self.nestout) {
            (Some(_), None) => v.rule(false, "ngrid", "NGRID is set but no NESTOUT writes it"),
            (None, Some(_)) => v.rule(false, "nestout", "NESTOUT is set but no NGRID defines it"),
            (Some(ngrid), Some(nestout)) => v.rule(
                ngrid.sname() == nestout.sname,
                "nestout.sname",
                &format!(
                    "NGRID sname '{}' does not match NESTOUT sname '{}'",
                    ngrid.sname(),
                    nestout.sname
                ),
            ),
            (None, None) => {}
        }
    }
}

// ============================================================================
// LOCKUP
// ============================================================================

static STOP: Stop = Stop {};

/// Compute commands followed by STOP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", deny_unknown_fields)]
pub struct Lockup {
    pub compute: Compute,
}

tagged_struct!(Lockup, "lockup");

impl Group for Lockup {
    const SPACED: bool = false;

    fn members(&self) -> Vec<Member<'_>> {
        vec![
            ("compute".to_string(), &self.compute as &dyn Component),
            ("stop".to_string(), &STOP as &dyn Component),
        ]
    }
}

impl Validate for Lockup {
    fn validate(&self, v: &mut Validator) {
        v.nested("compute", &self.compute);
    }
}
