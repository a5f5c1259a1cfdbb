//! The command file document
//!
//! [`SwanConfig`] holds one optional or required slot per section of the
//! command file. It is built once from raw key-value input through
//! [`SwanConfigBuilder`] and never changes afterwards.
//! [`SwanConfig::assemble`] pushes the caller's bindings through the
//! interface adapters on a transient copy, runs the document-level conflict
//! checks and renders the sections in their fixed order.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::components::boundary::{Boundnest1, Boundnest2, Boundnest3, Boundspec, Initial};
use crate::components::cgrid::Cgrid;
use crate::components::numerics::{Numeric, Prop};
use crate::components::startup::{Dimension, ModeKind};
use crate::components::Component;
use crate::error::{ConfigError, FieldError, Result, MISSING, REQUIRED};
use crate::group::{Group, Inpgrids, Lockup, Output, Physics, Startup};
use crate::interface::{bind_lockup, bind_output, Bindings, BoundaryInterface, DataInterface};
use crate::subcomponents::readgrid::GridOption;
use crate::tagged::TaggedUnion;
use crate::tagged_union;
use crate::validate::{recover, validate, Validate, Validator};

// ============================================================================
// Slot unions
// ============================================================================

tagged_union! {
    /// Input grids given directly or resolved from a data source
    pub enum InpgridSource default "inpgrids" {
        "inpgrids" => Grids(Inpgrids),
        "data_interface" => Data(DataInterface),
    }
}

impl Validate for InpgridSource {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Grids(g) => g.validate(v),
            Self::Data(d) => d.validate(v),
        }
    }
}

tagged_union! {
    /// Boundary condition mechanism. Only one may be used per run.
    pub enum Boundary {
        "boundspec" => Spec(Boundspec),
        "boundnest1" => Nest1(Boundnest1),
        "boundnest2" => Nest2(Boundnest2),
        "boundnest3" => Nest3(Boundnest3),
        "boundary_interface" => Interface(BoundaryInterface),
    }
}

impl Validate for Boundary {
    fn validate(&self, v: &mut Validator) {
        match self {
            Self::Spec(b) => b.validate(v),
            Self::Nest1(b) => b.validate(v),
            Self::Nest2(b) => b.validate(v),
            Self::Nest3(b) => b.validate(v),
            Self::Interface(b) => b.validate(v),
        }
    }
}

/// Section titles, in emission order
pub const SECTIONS: [&str; 9] = [
    "startup",
    "computational grid",
    "input grids",
    "boundary and initial conditions",
    "physics",
    "propagation",
    "numerics",
    "output",
    "lockup",
];

fn at(slot: &'static str) -> impl Fn(ConfigError) -> ConfigError {
    move |e| e.at(slot)
}

// ============================================================================
// Builder
// ============================================================================

/// Raw, unvalidated document slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwanConfigBuilder {
    #[serde(default)]
    pub startup: Option<Startup>,
    #[serde(default)]
    pub cgrid: Option<Cgrid>,
    #[serde(default)]
    pub inpgrid: Option<InpgridSource>,
    #[serde(default)]
    pub boundary: Option<Boundary>,
    #[serde(default)]
    pub initial: Option<Initial>,
    #[serde(default)]
    pub physics: Option<Physics>,
    #[serde(default)]
    pub prop: Option<Prop>,
    #[serde(default)]
    pub numeric: Option<Numeric>,
    #[serde(default)]
    pub output: Option<Output>,
    #[serde(default)]
    pub lockup: Option<Lockup>,
}

impl SwanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn startup(mut self, startup: Startup) -> Self {
        self.startup = Some(startup);
        self
    }

    pub fn cgrid(mut self, cgrid: Cgrid) -> Self {
        self.cgrid = Some(cgrid);
        self
    }

    pub fn inpgrid(mut self, inpgrid: InpgridSource) -> Self {
        self.inpgrid = Some(inpgrid);
        self
    }

    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn initial(mut self, initial: Initial) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn physics(mut self, physics: Physics) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn prop(mut self, prop: Prop) -> Self {
        self.prop = Some(prop);
        self
    }

    pub fn numeric(mut self, numeric: Numeric) -> Self {
        self.numeric = Some(numeric);
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn lockup(mut self, lockup: Lockup) -> Self {
        self.lockup = Some(lockup);
        self
    }

    /// Validate every slot. Conflicts between slots are left to
    /// [`SwanConfig::assemble`].
    pub fn build(self) -> Result<SwanConfig> {
        self.finish(Vec::new(), &[])
    }

    fn finish(self, earlier: Vec<FieldError>, stand_ins: &[String]) -> Result<SwanConfig> {
        let mut v = Validator::new();
        self.validate(&mut v);
        v.finish_after(earlier, stand_ins)?;
        let cgrid = self
            .cgrid
            .ok_or_else(|| ConfigError::Validation(vec![FieldError::new("cgrid", MISSING, REQUIRED)]))?;
        Ok(SwanConfig {
            startup: self.startup.unwrap_or_default(),
            cgrid,
            inpgrid: self.inpgrid,
            boundary: self.boundary,
            initial: self.initial,
            physics: self.physics,
            prop: self.prop,
            numeric: self.numeric,
            output: self.output,
            lockup: self.lockup,
        })
    }
}

impl Validate for SwanConfigBuilder {
    fn validate(&self, v: &mut Validator) {
        v.check(self.cgrid.is_some(), "cgrid", MISSING, REQUIRED);
        v.nested("startup", &self.startup);
        v.nested("cgrid", &self.cgrid);
        v.nested("inpgrid", &self.inpgrid);
        v.nested("boundary", &self.boundary);
        v.nested("initial", &self.initial);
        v.nested("physics", &self.physics);
        v.nested("prop", &self.prop);
        v.nested("numeric", &self.numeric);
        v.nested("output", &self.output);
        v.nested("lockup", &self.lockup);
    }
}

// ============================================================================
// Document
// ============================================================================

/// A validated SWAN command file
#[derive(Debug, Clone, PartialEq)]
pub struct SwanConfig {
    startup: Startup,
    cgrid: Cgrid,
    inpgrid: Option<InpgridSource>,
    boundary: Option<Boundary>,
    initial: Option<Initial>,
    physics: Option<Physics>,
    prop: Option<Prop>,
    numeric: Option<Numeric>,
    output: Option<Output>,
    lockup: Option<Lockup>,
}

impl SwanConfig {
    pub fn builder() -> SwanConfigBuilder {
        SwanConfigBuilder::new()
    }

    /// Resolve and validate a document from raw key-value input.
    pub fn from_value(raw: serde_json::Value) -> Result<Self> {
        let recovered = recover::<SwanConfigBuilder>(raw)?;
        recovered.value.finish(recovered.errors, &recovered.stand_ins)
    }

    pub fn startup(&self) -> &Startup {
        &self.startup
    }

    pub fn cgrid(&self) -> &Cgrid {
        &self.cgrid
    }

    pub fn inpgrid(&self) -> Option<&InpgridSource> {
        self.inpgrid.as_ref()
    }

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    pub fn initial(&self) -> Option<&Initial> {
        self.initial.as_ref()
    }

    pub fn physics(&self) -> Option<&Physics> {
        self.physics.as_ref()
    }

    pub fn prop(&self) -> Option<&Prop> {
        self.prop.as_ref()
    }

    pub fn numeric(&self) -> Option<&Numeric> {
        self.numeric.as_ref()
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    pub fn lockup(&self) -> Option<&Lockup> {
        self.lockup.as_ref()
    }

    /// Render the command file against `bindings`.
    ///
    /// Nothing is returned unless every section renders.
    pub fn assemble(&self, bindings: &Bindings<'_>) -> Result<String> {
        let inpgrids: Option<Cow<'_, Inpgrids>> = match &self.inpgrid {
            None => None,
            Some(InpgridSource::Grids(grids)) => Some(Cow::Borrowed(grids)),
            Some(InpgridSource::Data(data)) => {
                let bound = data
                    .bind(bindings)
                    .and_then(|g| validate(&g).map(|_| g))
                    .map_err(|e| e.at("inpgrid"))?;
                Some(Cow::Owned(bound))
            }
        };
        self.check_conflicts(inpgrids.as_deref())?;
        self.warn_dubious(inpgrids.as_deref());

        let output = match (&self.output, bindings.period) {
            (Some(output), Some(period)) => Some(Cow::Owned(bind_output(output, period))),
            (output, _) => output.as_ref().map(Cow::Borrowed),
        };
        let lockup = match (&self.lockup, bindings.period) {
            (Some(lockup), Some(period)) => Some(Cow::Owned(bind_lockup(lockup, period))),
            (lockup, _) => lockup.as_ref().map(Cow::Borrowed),
        };

        let sections: [Option<String>; 9] = [
            Some(self.startup.render().map_err(at("startup"))?),
            Some(self.cgrid.render().map_err(at("cgrid"))?),
            inpgrids
                .as_deref()
                .map(|g| g.render().map_err(at("inpgrid")))
                .transpose()?,
            self.boundary_section(bindings)?,
            self.physics
                .as_ref()
                .map(|p| p.render().map_err(at("physics")))
                .transpose()?,
            self.prop
                .as_ref()
                .map(|p| p.render().map_err(at("prop")))
                .transpose()?,
            self.numeric
                .as_ref()
                .map(|n| n.render().map_err(at("numeric")))
                .transpose()?,
            output
                .as_deref()
                .map(|o| o.render().map_err(at("output")))
                .transpose()?,
            lockup
                .as_deref()
                .map(|l| l.render().map_err(at("lockup")))
                .transpose()?,
        ];

        let blocks: Vec<String> = SECTIONS
            .iter()
            .zip(sections)
            .filter_map(|(title, body)| body.filter(|b| !b.is_empty()).map(|b| format!("$ {title}\n{b}")))
            .collect();
        let text = format!("{}\n", blocks.join("\n\n"));
        info!(sections = blocks.len(), bytes = text.len(), "assembled command file");
        Ok(text)
    }

    fn boundary_section(&self, bindings: &Bindings<'_>) -> Result<Option<String>> {
        let boundary = match &self.boundary {
            None => None,
            Some(Boundary::Spec(b)) => Some(b.render()),
            Some(Boundary::Nest1(b)) => Some(b.render()),
            Some(Boundary::Nest2(b)) => Some(b.render()),
            Some(Boundary::Nest3(b)) => Some(b.render()),
            Some(Boundary::Interface(b)) => Some(b.bind(bindings).and_then(|cmds| cmds.render())),
        }
        .transpose()
        .map_err(|e| e.at("boundary"))?;
        let initial = self
            .initial
            .as_ref()
            .map(|i| i.render())
            .transpose()
            .map_err(|e| e.at("initial"))?;
        let parts: Vec<String> = boundary.into_iter().chain(initial).collect();
        Ok((!parts.is_empty()).then(|| parts.join("\n")))
    }

    // ------------------------------------------------------------------------
    // Document-level checks
    // ------------------------------------------------------------------------

    fn check_conflicts(&self, inpgrids: Option<&Inpgrids>) -> Result<()> {
        let conflict = |first: &str, second: String, reason: &str| ConfigError::ConflictingCommands {
            first: first.to_string(),
            second,
            reason: reason.to_string(),
        };

        if let Some(mode) = &self.startup.mode {
            if let Some(lockup) = self.lockup.as_ref().filter(|l| l.compute.is_nonstationary()) {
                if mode.kind == ModeKind::Stationary {
                    return Err(conflict(
                        "startup.mode",
                        format!("lockup.compute.{}", lockup.compute.tag()),
                        "a stationary run cannot have a nonstationary compute",
                    ));
                }
            }
            if mode.dim == Dimension::Onedimensional {
                let located = self
                    .output
                    .as_ref()
                    .map(Output::two_dimensional_locations)
                    .unwrap_or_default();
                if let Some(kind) = located.first() {
                    return Err(conflict(
                        "startup.mode",
                        format!("output.{}", kind.to_ascii_lowercase()),
                        "a one-dimensional run cannot have two-dimensional output locations",
                    ));
                }
            }
        }

        if let Some(coordinates) = &self.startup.coordinates {
            let setup = self.physics.as_ref().is_some_and(|p| p.setup.is_some());
            if coordinates.repeating && setup {
                return Err(conflict(
                    "startup.coordinates",
                    "physics.setup".into(),
                    "wave-induced set-up is not supported in repeating coordinates",
                ));
            }
            let nor = self.startup.set.as_ref().is_some_and(|s| s.nor.is_some());
            if coordinates.kind.is_spherical() && nor {
                return Err(conflict(
                    "startup.coordinates",
                    "startup.set.nor".into(),
                    "north is fixed in spherical coordinates",
                ));
            }
        }

        if let Some(grids) = inpgrids {
            if let Some((keyword, quantity)) = grids.constant_overlap() {
                let slot = |found: Option<usize>| match found {
                    Some(i) => format!("inpgrid.inpgrids[{i}]"),
                    None => "inpgrid".to_string(),
                };
                let constant = grids
                    .inpgrids
                    .iter()
                    .position(|g| g.constant_quantities().contains(&quantity));
                let grid = grids
                    .inpgrids
                    .iter()
                    .position(|g| g.grid_type() == Some(quantity));
                return Err(conflict(
                    &slot(constant),
                    slot(grid),
                    &format!("{quantity} is given both by {keyword} and by an input grid"),
                ));
            }
        }
        Ok(())
    }

    fn warn_dubious(&self, inpgrids: Option<&Inpgrids>) {
        let tbcur = self
            .physics
            .as_ref()
            .and_then(|p| p.turbulence.as_ref())
            .and_then(|t| t.tbcur);
        let current = inpgrids.is_some_and(|g| g.grid_types().contains(&GridOption::Current));
        if let (Some(tbcur), false) = (tbcur, current) {
            warn!(tbcur, "TURBULENCE tbcur is set but no CURRENT input grid is given");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::interface::fixtures::*;
    use crate::interface::DataDescriptor;

    fn cgrid() -> serde_json::Value {
        json!({
            "grid": {"xp": 110.0, "yp": -35.2, "alp": 4.0, "xlen": 5.0, "ylen": 4.0, "mx": 15, "my": 10},
            "spectrum": {"mdc": 36, "flow": 0.04, "fhigh": 1.0}
        })
    }

    fn commands(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with('$'))
            .collect()
    }

    #[test]
    fn test_minimal_document() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "physics": {"gen": {"model_type": "gen3"}}
        }))
        .unwrap();
        let text = config.assemble(&Bindings::new()).unwrap();
        assert_eq!(
            commands(&text),
            vec![
                "MODE STATIONARY TWODIMENSIONAL",
                "COORDINATES CARTESIAN",
                "CGRID REGULAR xpc=110.0 ypc=-35.2 alpc=4.0 xlenc=5.0 ylenc=4.0 mxc=15 myc=10 CIRCLE mdc=36 flow=0.04 fhigh=1.0",
                "GEN3 WESTHUYSEN DRAG WU",
            ]
        );
        assert!(text.starts_with("$ startup\n"));
        assert!(!text.contains("$ lockup"));
    }

    #[test]
    fn test_cgrid_is_required() {
        let err = SwanConfig::from_value(json!({"physics": {}})).unwrap_err();
        assert_eq!(err.field_errors()[0].path, "cgrid");
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let err = SwanConfig::from_value(json!({"cgrid": cgrid(), "physic": {}})).unwrap_err();
        match err {
            ConfigError::UnexpectedField { path, field, .. } => {
                assert_eq!(path, "physic");
                assert_eq!(field, "physic");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_resolution_errors_carry_path() {
        let err = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "physics": {"gen": {"model_type": "gen3", "bogus": 1}}
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedField { ref path, .. } if path == "physics.gen.bogus"));

        let err = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "boundary": {"model_type": "boundspec", "location": {"model_type": "corner"}}
        }))
        .unwrap_err();
        assert!(err.to_string().starts_with("boundary.location: unknown variant 'corner'"));
    }

    #[test]
    fn test_missing_fields_reported_with_siblings() {
        let err = SwanConfig::from_value(json!({
            "cgrid": {
                "grid": {"xp": 0.0, "xlen": 10.0, "ylen": 10.0, "mx": 10},
                "spectrum": {"mdc": 0, "flow": 0.04, "fhigh": 1.0}
            }
        }))
        .unwrap_err();
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["cgrid.grid.yp", "cgrid.grid.my", "cgrid.spectrum.mdc"]);
        assert_eq!(err.field_errors()[0].constraint, "field is required");
    }

    #[test]
    fn test_mistyped_field_does_not_hide_range_error() {
        let err = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {"set": {"direction_convention": "nautical", "maxerr": 7, "level": "high"}}
        }))
        .unwrap_err();
        let errors = err.field_errors();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert_eq!(errors[0].path, "startup.set.level");
        assert_eq!(errors[0].value, "'high'");
        assert_eq!(errors[1].path, "startup.set.maxerr");
    }

    #[test]
    fn test_conflicts_left_to_assembly() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "lockup": {"compute": {"model_type": "nonstationary"}}
        }))
        .unwrap();
        assert!(config.lockup().is_some());
    }

    #[test]
    fn test_slot_errors_carry_path() {
        let err = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {"set": {"direction_convention": "nautical", "maxerr": 7}}
        }))
        .unwrap_err();
        assert_eq!(err.field_errors()[0].path, "startup.set.maxerr");
    }

    #[test]
    fn test_stationary_mode_with_nonstationary_compute() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "lockup": {"compute": {"model_type": "nonstationary"}}
        }))
        .unwrap();
        let err = config.assemble(&Bindings::new()).unwrap_err();
        match err {
            ConfigError::ConflictingCommands { first, second, .. } => {
                assert_eq!(first, "startup.mode");
                assert_eq!(second, "lockup.compute.nonstationary");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_one_dimensional_mode_with_frame() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {"mode": {"kind": "stationary", "dim": "onedimensional"}},
            "output": {
                "frame": {"sname": "outgrid", "grid": {"xp": 0.0, "yp": 0.0, "xlen": 1.0, "ylen": 1.0, "mx": 2, "my": 2}}
            }
        }))
        .unwrap();
        let err = config.assemble(&Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingCommands { ref second, .. } if second == "output.frame"));
    }

    #[test]
    fn test_repeating_coordinates_with_setup() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {"coordinates": {"kind": {"model_type": "spherical"}, "repeating": true}},
            "physics": {"setup": {}}
        }))
        .unwrap();
        let err = config.assemble(&Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingCommands { ref second, .. } if second == "physics.setup"));
    }

    #[test]
    fn test_spherical_with_nor() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {
                "set": {"direction_convention": "nautical", "nor": 90.0},
                "coordinates": {"kind": {"model_type": "spherical"}}
            }
        }))
        .unwrap();
        let err = config.assemble(&Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingCommands { ref second, .. } if second == "startup.set.nor"));
    }

    #[test]
    fn test_period_drives_lockup_and_output() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "startup": {"mode": {"kind": "nonstationary"}},
            "output": {"block": {"sname": "COMPGRID", "fname": "out.mat", "output": ["hsign"], "times": {"delt": "PT30M"}}},
            "lockup": {"compute": {"model_type": "nonstationary", "times": {"dfmt": "hr"}}}
        }))
        .unwrap();
        let period = period();
        let text = config.assemble(&Bindings::new().period(&period)).unwrap();
        assert!(text.contains("OUTPUT tbegblk=20240101.000000 deltblk=1800.0 SEC"), "{text}");
        assert!(text.ends_with(
            "$ lockup\nCOMPUTE NONSTATIONARY tbegc=20240101.000000 deltc=1.0 HR tendc=20240102.000000\nSTOP\n"
        ));
        assert!(matches!(
            config.assemble(&Bindings::new()),
            Err(ConfigError::IncompleteCommand { .. })
        ));
    }

    #[test]
    fn test_data_interface_bound_at_assembly() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "inpgrid": {"model_type": "data_interface", "bottom": "depth"}
        }))
        .unwrap();
        let mut data = BTreeMap::new();
        data.insert(
            "depth".to_string(),
            DataDescriptor {
                grid: None,
                fname: "bottom.grd".into(),
                times: None,
                vector: false,
            },
        );
        let grid = grid();
        let text = config.assemble(&Bindings::new().data(&data).grid(&grid)).unwrap();
        assert!(text.contains("$ input grids\nINPGRID BOTTOM REGULAR"));
        assert!(text.contains("READINP BOTTOM fac=1.0 fname1='bottom.grd' idla=3"));

        let err = config.assemble(&Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteCommand { ref path, .. } if path == "inpgrid.data"));
    }

    #[test]
    fn test_boundary_and_initial_share_a_section() {
        let config = SwanConfig::from_value(json!({
            "cgrid": cgrid(),
            "boundary": {"model_type": "boundnest1", "fname": "outer.nest"},
            "initial": {"kind": {"model_type": "zero"}}
        }))
        .unwrap();
        let text = config.assemble(&Bindings::new()).unwrap();
        assert!(text.contains(
            "$ boundary and initial conditions\nBOUNDNEST1 NEST fname='outer.nest' CLOSED\nINITIAL ZERO"
        ));
    }

    #[test]
    fn test_builder_defaults_startup() {
        let cgrid: Cgrid = crate::validate::build(cgrid()).unwrap();
        let config = SwanConfig::builder().cgrid(cgrid).build().unwrap();
        assert_eq!(config.startup(), &Startup::default());
        assert!(config.lockup().is_none());
    }
}
